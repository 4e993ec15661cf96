use std::sync::Once;

use archivum_domain::ClientConfig;
use archivum_infra::EntityClient;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SECRET_NAME: &str = "archive";
pub const TOKEN: &str = "token-1";

const API_NS: &str = "http://preservica.com/EntityAPI/v7.7";
const XIP_NS: &str = "http://preservica.com/XIP/v7.7";

static TRACING: Once = Once::new();

/// Route test logs through the fmt subscriber; `RUST_LOG` controls output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Mock API instance with a private cache directory.
pub struct TestArchive {
    pub server: MockServer,
    pub cache_dir: TempDir,
}

impl TestArchive {
    pub async fn start() -> Self {
        init_tracing();
        Self {
            server: MockServer::start().await,
            cache_dir: TempDir::new().expect("temp dir should be created"),
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Config pointing both the API and the secret store at the mock server.
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(SECRET_NAME).with_base_url(self.uri());
        config.secrets_endpoint = Some(self.uri());
        config.cache_dir = Some(self.cache_dir.path().to_path_buf());
        config.page_size = 2;
        config.timeout_secs = 5;
        config
    }

    pub async fn client(&self) -> EntityClient {
        EntityClient::connect(self.config()).await.expect("client should connect")
    }

    /// Mount the credentials secret, expecting at most `fetches` reads.
    pub async fn mount_secret(&self, fetches: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/secrets/{SECRET_NAME}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"username":"archivist","password":"s3cret"}"#,
            ))
            .up_to_n_times(fetches)
            .mount(&self.server)
            .await;
    }

    /// Mount the login endpoint, expecting exactly `logins` calls.
    pub async fn mount_login(&self, logins: u64) {
        Mock::given(method("POST"))
            .and(path("/api/accesstoken/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!(r#"{{"token":"{TOKEN}","validFor":15}}"#)),
            )
            .expect(logins)
            .mount(&self.server)
            .await;
    }
}

pub fn xml_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).insert_header("Content-Type", "application/xml").set_body_string(body)
}

fn paging(next: Option<&str>) -> String {
    match next {
        Some(next) => format!("<Paging><Next>{}</Next></Paging>", next.replace('&', "&amp;")),
        None => "<Paging><TotalResults>0</TotalResults></Paging>".to_string(),
    }
}

/// `EntitiesResponse` page; `entities` are `(ref, type, title, deleted)`.
pub fn entities_page(entities: &[(&str, &str, &str, bool)], next: Option<&str>) -> String {
    let items: String = entities
        .iter()
        .map(|(entity_ref, entity_type, title, deleted)| {
            format!(
                r#"<Entity title="{title}" ref="{entity_ref}" type="{entity_type}" deleted="{deleted}">https://x/{entity_ref}</Entity>"#
            )
        })
        .collect();
    format!(
        r#"<EntitiesResponse xmlns="{API_NS}" xmlns:xip="{XIP_NS}"><Entities>{items}</Entities>{}</EntitiesResponse>"#,
        paging(next)
    )
}

/// `ChildrenResponse` page; `children` are `(ref, type, title)`.
pub fn children_page(children: &[(&str, &str, &str)], next: Option<&str>) -> String {
    let items: String = children
        .iter()
        .map(|(entity_ref, entity_type, title)| {
            format!(r#"<Child title="{title}" ref="{entity_ref}" type="{entity_type}">https://x/{entity_ref}</Child>"#)
        })
        .collect();
    format!(
        r#"<ChildrenResponse xmlns="{API_NS}" xmlns:xip="{XIP_NS}"><Children>{items}</Children>{}</ChildrenResponse>"#,
        paging(next)
    )
}

/// `IdentifiersResponse` page; `identifiers` are `(id, type, value)`.
pub fn identifiers_page(identifiers: &[(&str, &str, &str)], next: Option<&str>) -> String {
    let items: String = identifiers
        .iter()
        .map(|(id, name, value)| {
            format!(
                "<xip:Identifier><xip:ApiId>{id}</xip:ApiId><xip:Type>{name}</xip:Type><xip:Value>{value}</xip:Value></xip:Identifier>"
            )
        })
        .collect();
    format!(
        r#"<IdentifiersResponse xmlns="{API_NS}" xmlns:xip="{XIP_NS}"><Identifiers>{items}</Identifiers>{}</IdentifiersResponse>"#,
        paging(next)
    )
}

pub fn identifier_response(id: &str, name: &str, value: &str) -> String {
    format!(
        r#"<IdentifierResponse xmlns="{API_NS}" xmlns:xip="{XIP_NS}"><xip:Identifier><xip:ApiId>{id}</xip:ApiId><xip:Type>{name}</xip:Type><xip:Value>{value}</xip:Value></xip:Identifier></IdentifierResponse>"#
    )
}

pub fn entity_response(element: &str, entity_ref: &str, title: &str, parent: Option<&str>) -> String {
    let parent = parent.map(|p| format!("<xip:Parent>{p}</xip:Parent>")).unwrap_or_default();
    format!(
        r#"<EntityResponse xmlns="{API_NS}" xmlns:xip="{XIP_NS}"><xip:{element}><xip:Ref>{entity_ref}</xip:Ref><xip:Title>{title}</xip:Title><xip:SecurityTag>open</xip:SecurityTag>{parent}</xip:{element}></EntityResponse>"#
    )
}

/// `EventActionsResponse` page; `events` are `(ref, type, date)`.
pub fn event_actions_page(events: &[(&str, &str, &str)], next: Option<&str>) -> String {
    let items: String = events
        .iter()
        .map(|(event_ref, event_type, date)| {
            format!(
                r#"<xip:EventAction commandType="command"><xip:Event type="{event_type}"><xip:Ref>{event_ref}</xip:Ref><xip:Date>{date}</xip:Date></xip:Event></xip:EventAction>"#
            )
        })
        .collect();
    format!(
        r#"<EventActionsResponse xmlns="{API_NS}" xmlns:xip="{XIP_NS}"><EventActions>{items}</EventActions>{}</EventActionsResponse>"#,
        paging(next)
    )
}

pub fn generations_response(urls: &[String]) -> String {
    let items: String =
        urls.iter().map(|url| format!(r#"<Generation active="true">{url}</Generation>"#)).collect();
    format!(r#"<GenerationsResponse xmlns="{API_NS}"><Generations>{items}</Generations></GenerationsResponse>"#)
}

pub fn generation_response(content_ref: &str, original: bool, bitstream_urls: &[String]) -> String {
    let items: String = bitstream_urls
        .iter()
        .map(|url| format!(r#"<Bitstream filename="f">{url}</Bitstream>"#))
        .collect();
    format!(
        r#"<GenerationResponse xmlns="{API_NS}" xmlns:xip="{XIP_NS}"><xip:Generation original="{original}" active="true"><xip:ContentObject>{content_ref}</xip:ContentObject></xip:Generation><Bitstreams>{items}</Bitstreams></GenerationResponse>"#
    )
}

pub fn bitstream_response(name: &str, size: u64, md5: &str, content_url: &str) -> String {
    format!(
        r#"<BitstreamResponse xmlns="{API_NS}" xmlns:xip="{XIP_NS}"><xip:Bitstream><xip:Filename>{name}</xip:Filename><xip:FileSize>{size}</xip:FileSize><xip:Fixities><xip:Fixity><xip:FixityAlgorithmRef>MD5</xip:FixityAlgorithmRef><xip:FixityValue>{md5}</xip:FixityValue></xip:Fixity></xip:Fixities></xip:Bitstream><AdditionalInformation><Content>{content_url}</Content></AdditionalInformation></BitstreamResponse>"#
    )
}
