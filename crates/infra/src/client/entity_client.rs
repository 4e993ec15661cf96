//! Entity API client
//!
//! Wires the token manager, pagination and XML mapper together. Every call
//! is authenticated; listings are drained across all pages before
//! returning.

use std::sync::Arc;

use archivum_core::auth::{resolve_base_url, CachedSecretStore, TokenManager, TokenManagerConfig};
use archivum_core::cache_ports::CacheStore;
use archivum_core::secret_ports::SecretStore;
use archivum_core::session::ApiSession;
use archivum_core::transport_ports::{ApiRequest, Transport};
use archivum_domain::constants::{DEFAULT_API_VERSION, ENTITY_API_PATH};
use archivum_domain::{
    AddEntityRequest, ArchivumError, BitStreamInfo, ClientConfig, Entity, EntityType, EventAction,
    Identifier, IdentifierResponse, Result, UpdateEntityRequest,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::cache::{default_cache_dir, FileCache};
use crate::http::HttpClient;
use crate::secrets::{EnvSecretStore, HttpSecretStore};
use crate::xml::{bitstreams, builders, entities, events, identifiers};

/// Client for the entity endpoints of one API instance.
pub struct EntityClient {
    base_url: String,
    session: ApiSession,
    tokens: Arc<TokenManager>,
    page_size: u32,
    api_version: String,
}

impl EntityClient {
    /// Build a client from configuration using the default adapters:
    /// reqwest transport, on-disk token cache, and the HTTP secret store
    /// when an endpoint is configured (environment variables otherwise).
    ///
    /// # Errors
    /// Returns `ArchivumError::Config` for invalid configuration or when no
    /// base URL can be resolved, or the secret store error.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let transport: Arc<dyn Transport> = Arc::new(HttpClient::from_config(&config)?);
        let cache_dir = config.cache_dir.clone().unwrap_or_else(default_cache_dir);
        let cache: Arc<dyn CacheStore> = Arc::new(FileCache::new(cache_dir));
        let secrets: Arc<dyn SecretStore> = match &config.secrets_endpoint {
            Some(endpoint) => Arc::new(HttpSecretStore::new(endpoint.clone(), transport.clone())),
            None => Arc::new(EnvSecretStore::new()),
        };

        Self::with_components(&config, transport, cache, secrets).await
    }

    /// Build a client from explicit adapters.
    ///
    /// # Errors
    /// Same as [`EntityClient::connect`].
    pub async fn with_components(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheStore>,
        secrets: Arc<dyn SecretStore>,
    ) -> Result<Self> {
        config.validate()?;

        let secrets: Arc<dyn SecretStore> =
            Arc::new(CachedSecretStore::new(secrets, cache.clone(), config.token_cache_duration()));
        let base_url =
            resolve_base_url(config.base_url.as_deref(), secrets.as_ref(), &config.secret_name)
                .await?;

        let tokens = Arc::new(TokenManager::new(
            TokenManagerConfig {
                base_url: base_url.clone(),
                secret_name: config.secret_name.clone(),
                cache_duration: config.token_cache_duration(),
            },
            transport.clone(),
            cache,
            secrets,
        ));
        let session = ApiSession::new(transport, tokens.clone(), config.max_pages);

        info!(base_url = %base_url, "entity client ready");
        Ok(Self {
            base_url,
            session,
            tokens,
            page_size: config.page_size,
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    /// Write request bodies against a different XIP namespace version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    fn entity_url(&self, path: &str) -> String {
        format!("{}{ENTITY_API_PATH}/{path}", self.base_url)
    }

    fn object_url(&self, entity_type: EntityType, entity_ref: Uuid) -> String {
        self.entity_url(&format!("{}/{entity_ref}", entity_type.path()))
    }

    fn paged_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let page_size = self.page_size.to_string();
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().copied())
            .append_pair("start", "0")
            .append_pair("max", &page_size)
            .finish();
        format!("{}?{query}", self.entity_url(path))
    }

    /// Fetch the full metadata of one entity.
    #[instrument(skip(self))]
    pub async fn metadata_for_entity(
        &self,
        entity_type: EntityType,
        entity_ref: Uuid,
    ) -> Result<Entity> {
        let body = self.session.get_text(&self.object_url(entity_type, entity_ref)).await?;
        entities::parse_entity(&body)
    }

    /// Every entity changed since `since`, across all pages.
    #[instrument(skip(self))]
    pub async fn entities_updated_since(&self, since: DateTime<Utc>) -> Result<Vec<Entity>> {
        let date = since.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
        let url = self.paged_url("entities/updated-since", &[("date", date.as_str())]);
        let updated = self.session.drain(&url, entities::parse_entities_page).await?;
        debug!(count = updated.len(), "updated entities listed");
        Ok(updated)
    }

    /// Children of a structural object, or the top-level objects when
    /// `parent_ref` is `None`.
    #[instrument(skip(self))]
    pub async fn children(&self, parent_ref: Option<Uuid>) -> Result<Vec<Entity>> {
        let path = match parent_ref {
            Some(parent) => format!("{}/{parent}/children", EntityType::StructuralObject.path()),
            None => "root/children".to_string(),
        };
        self.session.drain(&self.paged_url(&path, &[]), entities::parse_children_page).await
    }

    /// Identifiers attached to `entity`.
    #[instrument(skip(self, entity), fields(entity_ref = %entity.entity_ref))]
    pub async fn identifiers_for_entity(&self, entity: &Entity) -> Result<Vec<IdentifierResponse>> {
        let path = format!("{}/{}/identifiers", require_path(entity)?, entity.entity_ref);
        self.session.drain(&self.paged_url(&path, &[]), identifiers::parse_identifiers_page).await
    }

    /// Entities carrying the identifier `name` = `value`.
    #[instrument(skip(self))]
    pub async fn entities_by_identifier(&self, name: &str, value: &str) -> Result<Vec<Entity>> {
        let url = self.paged_url("entities/by-identifier", &[("type", name), ("value", value)]);
        self.session.drain(&url, entities::parse_entities_page).await
    }

    /// Attach an identifier and return the id the server assigned to it.
    #[instrument(skip(self, entity), fields(entity_ref = %entity.entity_ref))]
    pub async fn add_identifier(&self, entity: &Entity, identifier: &Identifier) -> Result<String> {
        let url =
            self.entity_url(&format!("{}/{}/identifiers", require_path(entity)?, entity.entity_ref));
        let body = builders::identifier_xml(identifier, &self.api_version)?;
        let response = self.session.send(ApiRequest::post(url).xml_body(body)).await?;
        Ok(identifiers::parse_identifier(&response.text())?.id)
    }

    /// Replace the name and value of an existing identifier.
    #[instrument(skip(self, entity), fields(entity_ref = %entity.entity_ref))]
    pub async fn update_identifier(
        &self,
        entity: &Entity,
        identifier: &IdentifierResponse,
    ) -> Result<()> {
        let url = self.entity_url(&format!(
            "{}/{}/identifiers/{}",
            require_path(entity)?,
            entity.entity_ref,
            identifier.id
        ));
        let body = builders::updated_identifier_xml(identifier, entity.entity_ref, &self.api_version)?;
        self.session.send(ApiRequest::put(url).xml_body(body)).await?;
        Ok(())
    }

    #[instrument(skip(self, entity), fields(entity_ref = %entity.entity_ref))]
    pub async fn delete_identifier(&self, entity: &Entity, identifier_id: &str) -> Result<()> {
        let url = self.entity_url(&format!(
            "{}/{}/identifiers/{identifier_id}",
            require_path(entity)?,
            entity.entity_ref
        ));
        self.session.send(ApiRequest::delete(url)).await?;
        Ok(())
    }

    /// Create a structural or information object and return its reference.
    ///
    /// A random reference is generated when the request carries none.
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn add_entity(&self, request: &AddEntityRequest) -> Result<Uuid> {
        let entity_ref = request.entity_ref.unwrap_or_else(Uuid::new_v4);
        let body = builders::add_entity_xml(request, entity_ref, &self.api_version)?;
        let url = self.entity_url(request.entity_type.path());
        self.session.send(ApiRequest::post(url).xml_body(body)).await?;
        info!(%entity_ref, entity_type = %request.entity_type, "entity created");
        Ok(entity_ref)
    }

    /// Update title, description and security tag; returns the entity as
    /// stored by the server.
    #[instrument(skip(self, request), fields(entity_ref = %request.entity_ref))]
    pub async fn update_entity(&self, request: &UpdateEntityRequest) -> Result<Entity> {
        let body = builders::update_entity_xml(request, &self.api_version)?;
        let url = self.object_url(request.entity_type, request.entity_ref);
        let response = self.session.send(ApiRequest::put(url).xml_body(body)).await?;
        entities::parse_entity(&response.text())
    }

    /// Events recorded against `entity`, newest first.
    #[instrument(skip(self, entity), fields(entity_ref = %entity.entity_ref))]
    pub async fn entity_event_actions(&self, entity: &Entity) -> Result<Vec<EventAction>> {
        let path = format!("{}/{}/event-actions", require_path(entity)?, entity.entity_ref);
        let mut actions =
            self.session.drain(&self.paged_url(&path, &[]), events::parse_event_actions_page).await?;
        EventAction::sort_newest_first(&mut actions);
        Ok(actions)
    }

    /// Every bitstream of every generation of a content object.
    #[instrument(skip(self))]
    pub async fn bitstream_info(&self, content_ref: Uuid) -> Result<Vec<BitStreamInfo>> {
        let url = format!("{}/generations", self.object_url(EntityType::ContentObject, content_ref));
        let generation_urls = bitstreams::parse_generation_urls(&self.session.get_text(&url).await?)?;

        let mut infos = Vec::new();
        for generation_url in generation_urls {
            let body = self.session.get_text(&generation_url).await?;
            let generation = bitstreams::parse_generation(&body, &generation_url)?;
            for bitstream_url in &generation.bitstream_urls {
                let body = self.session.get_text(bitstream_url).await?;
                infos.push(bitstreams::parse_bitstream(&body, &generation)?);
            }
        }

        debug!(count = infos.len(), "bitstreams resolved");
        Ok(infos)
    }

    /// Version of the entity API, read from the namespace of its root
    /// document.
    #[instrument(skip(self))]
    pub async fn api_version(&self) -> Result<f32> {
        let url = format!("{}{ENTITY_API_PATH}", self.base_url);
        crate::xml::api_version(&self.session.get_text(&url).await?)
    }

    /// Drop the cached access token; the next call logs in again.
    pub async fn invalidate_token(&self) -> Result<()> {
        self.tokens.invalidate_token().await
    }
}

fn require_path(entity: &Entity) -> Result<&'static str> {
    entity.path().ok_or_else(|| {
        ArchivumError::InvalidInput(format!("entity {} has no recognized type", entity.entity_ref))
    })
}
