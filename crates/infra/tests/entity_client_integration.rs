//! End-to-end tests for `EntityClient` against a mock entity API
//!
//! **Coverage:**
//! - Login followed by a two-page updated-since listing
//! - Children and by-identifier listings across pages
//! - Identifier create/update/delete round trips
//! - Entity creation and update request bodies
//! - Event actions ordered newest first
//! - Bitstream resolution through generations
//! - Pagination bound and error propagation

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use archivum_domain::{
    AddEntityRequest, ArchivumError, EntityType, GenerationType, Identifier, IdentifierResponse,
    SecurityTag, UpdateEntityRequest,
};
use archivum_infra::EntityClient;
use chrono::{TimeZone, Utc};
use support::{
    bitstream_response, children_page, entities_page, entity_response, event_actions_page, generation_response,
    generations_response, identifier_response, identifiers_page, xml_response, TestArchive, TOKEN,
};
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const IO_REF: &str = "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";
const SO_REF: &str = "1b2c3d4e-5f6a-4b7c-9d8e-0f1a2b3c4d5e";
const CO_REF: &str = "2c3d4e5f-6a7b-4c8d-8e9f-1a2b3c4d5e6f";

async fn ready_archive() -> (TestArchive, EntityClient) {
    let archive = TestArchive::start().await;
    archive.mount_secret(10).await;
    archive.mount_login(1).await;
    let client = archive.client().await;
    (archive, client)
}

async fn typed_entity(client: &EntityClient, archive: &TestArchive, entity_ref: &str) -> archivum_domain::Entity {
    Mock::given(method("GET"))
        .and(path(format!("/api/entity/information-objects/{entity_ref}")))
        .respond_with(xml_response(entity_response("InformationObject", entity_ref, "Letters", Some(SO_REF))))
        .mount(&archive.server)
        .await;
    client
        .metadata_for_entity(EntityType::InformationObject, Uuid::parse_str(entity_ref).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn updated_since_collects_every_page_after_login() {
    let (archive, client) = ready_archive().await;
    let next = format!(
        "{}/api/entity/entities/updated-since?date=2024-01-01T00:00:00.000Z&start=2&max=2",
        archive.uri()
    );

    Mock::given(method("GET"))
        .and(path("/api/entity/entities/updated-since"))
        .and(query_param("start", "0"))
        .and(query_param("max", "2"))
        .and(query_param("date", "2024-01-01T00:00:00.000Z"))
        .and(header("Preservica-Access-Token", TOKEN))
        .respond_with(xml_response(entities_page(&[(IO_REF, "IO", "Letters", false)], Some(&next))))
        .expect(1)
        .mount(&archive.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/entity/entities/updated-since"))
        .and(query_param("start", "2"))
        .and(header("Preservica-Access-Token", TOKEN))
        .respond_with(xml_response(entities_page(&[(SO_REF, "SO", "Series", true)], None)))
        .expect(1)
        .mount(&archive.server)
        .await;

    let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let entities = client.entities_updated_since(since).await.unwrap();

    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].entity_ref, Uuid::parse_str(IO_REF).unwrap());
    assert_eq!(entities[0].path(), Some("information-objects"));
    assert!(!entities[0].deleted);
    assert_eq!(entities[1].entity_type, Some(EntityType::StructuralObject));
    assert!(entities[1].deleted);
}

#[tokio::test]
async fn failing_page_discards_the_listing() {
    let (archive, client) = ready_archive().await;
    let next = format!("{}/api/entity/root/children?start=2&max=2", archive.uri());

    Mock::given(method("GET"))
        .and(path("/api/entity/root/children"))
        .and(query_param("start", "0"))
        .respond_with(xml_response(children_page(&[(SO_REF, "SO", "Series")], Some(&next))))
        .expect(1)
        .mount(&archive.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/entity/root/children"))
        .and(query_param("start", "2"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .expect(1)
        .mount(&archive.server)
        .await;

    // The first page on its own yields one child.
    let first_page = archivum_infra::xml::entities::parse_children_page(&children_page(
        &[(SO_REF, "SO", "Series")],
        Some(&next),
    ))
    .unwrap();
    assert_eq!(first_page.items.len(), 1);

    let err = client.children(None).await.unwrap_err();

    assert!(matches!(err, ArchivumError::Http { status: 404, .. }), "got {err:?}");
}

#[tokio::test]
async fn children_of_a_folder_use_structural_object_path() {
    let (archive, client) = ready_archive().await;
    let children = children_page(&[(IO_REF, "IO", "Letters")], None);
    Mock::given(method("GET"))
        .and(path(format!("/api/entity/structural-objects/{SO_REF}/children")))
        .respond_with(xml_response(children))
        .expect(1)
        .mount(&archive.server)
        .await;

    let children = client.children(Some(Uuid::parse_str(SO_REF).unwrap())).await.unwrap();

    assert_eq!(children.len(), 1);
    assert_eq!(children[0].title.as_deref(), Some("Letters"));
}

#[tokio::test]
async fn entities_by_identifier_passes_name_and_value() {
    let (archive, client) = ready_archive().await;
    Mock::given(method("GET"))
        .and(path("/api/entity/entities/by-identifier"))
        .and(query_param("type", "code"))
        .and(query_param("value", "MS 42"))
        .respond_with(xml_response(entities_page(&[(IO_REF, "IO", "Letters", false)], None)))
        .expect(1)
        .mount(&archive.server)
        .await;

    let found = client.entities_by_identifier("code", "MS 42").await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].entity_type, Some(EntityType::InformationObject));
}

#[tokio::test]
async fn identifier_lifecycle() {
    let (archive, client) = ready_archive().await;
    let entity = typed_entity(&client, &archive, IO_REF).await;
    let base = format!("/api/entity/information-objects/{IO_REF}/identifiers");

    Mock::given(method("GET"))
        .and(path(base.clone()))
        .respond_with(xml_response(identifiers_page(&[("7", "code", "MS 42"), ("8", "isbn", "978")], None)))
        .mount(&archive.server)
        .await;
    Mock::given(method("POST"))
        .and(path(base.clone()))
        .and(body_string_contains("<Type>code</Type><Value>MS 43</Value>"))
        .respond_with(xml_response(identifier_response("9", "code", "MS 43")))
        .expect(1)
        .mount(&archive.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{base}/7")))
        .and(body_string_contains(&format!("<Entity>{IO_REF}</Entity>")))
        .respond_with(xml_response(identifier_response("7", "code", "MS 44")))
        .expect(1)
        .mount(&archive.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{base}/8")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&archive.server)
        .await;

    let identifiers = client.identifiers_for_entity(&entity).await.unwrap();
    assert_eq!(identifiers.len(), 2);
    assert_eq!(identifiers[0].identifier_name, "code");

    let id = client.add_identifier(&entity, &Identifier::new("code", "MS 43")).await.unwrap();
    assert_eq!(id, "9");

    let updated =
        IdentifierResponse { id: "7".into(), identifier_name: "code".into(), value: "MS 44".into() };
    client.update_identifier(&entity, &updated).await.unwrap();
    client.delete_identifier(&entity, "8").await.unwrap();
}

#[tokio::test]
async fn add_entity_posts_xip_document() {
    let (archive, client) = ready_archive().await;
    let new_ref = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/api/entity/information-objects"))
        .and(body_string_contains(&format!("<Ref>{new_ref}</Ref>")))
        .and(body_string_contains("<Parent>"))
        .and(body_string_contains("<SecurityTag>open</SecurityTag>"))
        .respond_with(xml_response(entity_response(
            "InformationObject",
            &new_ref.to_string(),
            "Diary",
            Some(SO_REF),
        )))
        .expect(1)
        .mount(&archive.server)
        .await;

    let request = AddEntityRequest {
        entity_ref: Some(new_ref),
        title: "Diary".into(),
        description: None,
        entity_type: EntityType::InformationObject,
        security_tag: SecurityTag::Open,
        parent_ref: Some(Uuid::parse_str(SO_REF).unwrap()),
    };

    assert_eq!(client.add_entity(&request).await.unwrap(), new_ref);
}

#[tokio::test]
async fn update_entity_returns_stored_entity() {
    let (archive, client) = ready_archive().await;
    Mock::given(method("PUT"))
        .and(path(format!("/api/entity/structural-objects/{SO_REF}")))
        .and(body_string_contains("<Title>Renamed</Title>"))
        .respond_with(xml_response(entity_response("StructuralObject", SO_REF, "Renamed", None)))
        .expect(1)
        .mount(&archive.server)
        .await;

    let request = UpdateEntityRequest {
        entity_ref: Uuid::parse_str(SO_REF).unwrap(),
        title: "Renamed".into(),
        description: Some("Top level".into()),
        entity_type: EntityType::StructuralObject,
        security_tag: SecurityTag::Open,
        parent_ref: None,
    };

    let entity = client.update_entity(&request).await.unwrap();
    assert_eq!(entity.title.as_deref(), Some("Renamed"));
    assert_eq!(entity.entity_type, Some(EntityType::StructuralObject));
}

#[tokio::test]
async fn event_actions_are_sorted_newest_first() {
    let (archive, client) = ready_archive().await;
    let entity = typed_entity(&client, &archive, IO_REF).await;
    let events_path = format!("/api/entity/information-objects/{IO_REF}/event-actions");
    let next = format!("{}{events_path}?start=2&max=2", archive.uri());

    Mock::given(method("GET"))
        .and(path(events_path.clone()))
        .and(query_param("start", "0"))
        .respond_with(xml_response(event_actions_page(
            &[
                ("a0000000-0000-4000-8000-000000000001", "Ingest", "2023-05-01T10:00:00.000Z"),
                ("a0000000-0000-4000-8000-000000000002", "Modified", "2024-02-01T10:00:00.000Z"),
            ],
            Some(&next),
        )))
        .mount(&archive.server)
        .await;
    Mock::given(method("GET"))
        .and(path(events_path))
        .and(query_param("start", "2"))
        .respond_with(xml_response(event_actions_page(
            &[("a0000000-0000-4000-8000-000000000003", "Characterise", "2023-09-01T10:00:00.000Z")],
            None,
        )))
        .mount(&archive.server)
        .await;

    let actions = client.entity_event_actions(&entity).await.unwrap();

    let types: Vec<&str> = actions.iter().map(|a| a.event_type.as_str()).collect();
    assert_eq!(types, vec!["Modified", "Characterise", "Ingest"]);
}

#[tokio::test]
async fn bitstreams_are_resolved_through_generations() {
    let (archive, client) = ready_archive().await;
    let co_path = format!("/api/entity/content-objects/{CO_REF}");
    let generation_urls: Vec<String> =
        (1..=2).map(|n| format!("{}{co_path}/generations/{n}", archive.uri())).collect();
    let bitstream_url = |g: u32| format!("{}{co_path}/generations/{g}/bitstreams/1", archive.uri());

    Mock::given(method("GET"))
        .and(path(format!("{co_path}/generations")))
        .respond_with(xml_response(generations_response(&generation_urls)))
        .mount(&archive.server)
        .await;
    for (generation, original) in [(1, true), (2, false)] {
        Mock::given(method("GET"))
            .and(path(format!("{co_path}/generations/{generation}")))
            .respond_with(xml_response(generation_response(
                CO_REF,
                original,
                &[bitstream_url(generation)],
            )))
            .mount(&archive.server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{co_path}/generations/{generation}/bitstreams/1")))
            .respond_with(xml_response(bitstream_response(
                &format!("scan-{generation}.tif"),
                1024 * u64::from(generation),
                "9e107d9d372bb6826bd81d3542a419d6",
                &format!("{}/content", bitstream_url(generation)),
            )))
            .mount(&archive.server)
            .await;
    }

    let infos = client.bitstream_info(Uuid::parse_str(CO_REF).unwrap()).await.unwrap();

    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].name, "scan-1.tif");
    assert_eq!(infos[0].generation_type, GenerationType::Original);
    assert_eq!(infos[1].generation_version, 2);
    assert_eq!(infos[1].generation_type, GenerationType::Derived);
    assert_eq!(infos[1].file_size, 2048);
    assert_eq!(infos[1].parent_ref, Some(Uuid::parse_str(CO_REF).unwrap()));
    assert_eq!(infos[0].fixities.len(), 1);
}

#[tokio::test]
async fn max_pages_bounds_runaway_listings() {
    let archive = TestArchive::start().await;
    archive.mount_secret(10).await;
    archive.mount_login(1).await;
    let mut config = archive.config();
    config.max_pages = Some(3);
    let client = EntityClient::connect(config).await.unwrap();

    let looping = format!("{}/api/entity/root/children?start=0&max=2", archive.uri());
    Mock::given(method("GET"))
        .and(path("/api/entity/root/children"))
        .respond_with(xml_response(children_page(&[(SO_REF, "SO", "Series")], Some(&looping))))
        .expect(3)
        .mount(&archive.server)
        .await;

    let err = client.children(None).await.unwrap_err();

    assert!(matches!(err, ArchivumError::Pagination(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_listing_is_an_xml_error() {
    let (archive, client) = ready_archive().await;
    Mock::given(method("GET"))
        .and(path("/api/entity/entities/by-identifier"))
        .respond_with(xml_response("<EntitiesResponse><Entities>".to_string()))
        .mount(&archive.server)
        .await;

    let err = client.entities_by_identifier("code", "x").await.unwrap_err();

    assert!(matches!(err, ArchivumError::Xml { .. }), "got {err:?}");
}
