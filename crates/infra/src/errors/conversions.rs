//! Conversions from external infrastructure errors into domain errors.

use archivum_domain::ArchivumError;
use reqwest::Error as HttpError;
use roxmltree::Error as XmlError;
use serde_json::Error as JsonError;
use std::io::Error as IoError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ArchivumError);

impl From<InfraError> for ArchivumError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ArchivumError> for InfraError {
    fn from(value: ArchivumError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoArchivumError {
    fn into_archivum(self) -> ArchivumError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ArchivumError */
/* -------------------------------------------------------------------------- */

impl IntoArchivumError for HttpError {
    fn into_archivum(self) -> ArchivumError {
        let url = self.url().map(ToString::to_string).unwrap_or_default();

        if self.is_timeout() {
            return ArchivumError::Network(format!("HTTP request to {url} timed out"));
        }

        if self.is_connect() {
            return ArchivumError::Network(format!("HTTP connection failure for {url}"));
        }

        if self.is_builder() {
            return ArchivumError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            // Only reachable through `error_for_status`, which carries no method.
            return ArchivumError::Http {
                method: String::new(),
                url,
                status: status.as_u16(),
                body: status.canonical_reason().map(str::to_string),
            };
        }

        ArchivumError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_archivum())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → ArchivumError */
/* -------------------------------------------------------------------------- */

impl IntoArchivumError for IoError {
    fn into_archivum(self) -> ArchivumError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::PermissionDenied => {
                ArchivumError::Cache(format!("permission denied: {self}"))
            }
            ErrorKind::NotFound => ArchivumError::Cache(format!("cache path not found: {self}")),
            _ => ArchivumError::Cache(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_archivum())
    }
}

/* -------------------------------------------------------------------------- */
/* roxmltree::Error → ArchivumError */
/* -------------------------------------------------------------------------- */

impl IntoArchivumError for XmlError {
    fn into_archivum(self) -> ArchivumError {
        ArchivumError::Xml {
            message: format!("malformed XML: {self}"),
            fragment: String::new(),
        }
    }
}

impl From<XmlError> for InfraError {
    fn from(value: XmlError) -> Self {
        InfraError(value.into_archivum())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → ArchivumError */
/* -------------------------------------------------------------------------- */

impl IntoArchivumError for JsonError {
    fn into_archivum(self) -> ArchivumError {
        ArchivumError::Response(format!("invalid JSON payload: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_archivum())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
