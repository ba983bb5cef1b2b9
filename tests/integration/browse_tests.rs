//! End-to-end browse: resolution, page fetching, early exit and dedup

use ra_transcripts::browse::{browse, resolve_manifest_id, BrowseRequest, Resolution};
use ra_transcripts::models::PageFailureReason;
use ra_transcripts::session::{PageEntry, Session};
use ra_transcripts::RaError;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::*;

const REF: &str = "SE/RA/420422/01";
const MANIFEST: &str = "R0000001";

async fn digitized_document(server: &MockServer) {
    let manifest = format!("{}/arkis!{}/manifest", server.uri(), MANIFEST);
    mount_reference_lookup(server, REF, vec![record("rec-1", REF, Some(&manifest), &[1])]).await;
}

#[tokio::test]
async fn test_browse_fetches_requested_pages() {
    let server = MockServer::start().await;
    digitized_document(&server).await;
    mount_alto_page(&server, MANIFEST, 1, &["Anno", "1676"]).await;
    mount_alto_page(&server, MANIFEST, 2, &["trolldom"]).await;

    let clients = test_clients(&server);
    let request = BrowseRequest::new(REF)
        .with_pages("1-2")
        .with_highlight("trolldom");
    let result = browse(&clients, &request).await.unwrap();

    assert!(result.is_digitized());
    assert_eq!(result.manifest_id.as_deref(), Some(MANIFEST));
    assert_eq!(result.page_numbers, vec![1, 2]);
    assert_eq!(result.contexts.len(), 2);
    assert!(result.failures.is_empty());
    assert!(!result.stopped_early);

    let first = &result.contexts[0];
    assert_eq!(first.page_number, 1);
    assert_eq!(first.page_id, "00001");
    assert_eq!(first.full_text, "Anno 1676");
    assert_eq!(first.reference_code, REF);
    assert!(first.alto_url.ends_with(&alto_path(MANIFEST, 1)));
    assert!(first
        .image_url
        .as_deref()
        .is_some_and(|url| url.contains("arkis!R0000001_00001")));
    assert!(first
        .bildvisning_url
        .as_deref()
        .is_some_and(|url| url.ends_with("R0000001_00001#?q=trolldom")));

    let metadata = result.metadata.as_ref().unwrap();
    assert_eq!(metadata.unitid.as_deref(), Some(REF));
}

#[tokio::test]
async fn test_stops_after_three_missing_pages() {
    let server = MockServer::start().await;
    digitized_document(&server).await;
    for page in 1..=3 {
        mount_alto_missing(&server, MANIFEST, page).await;
    }
    Mock::given(method("GET"))
        .and(path(alto_path(MANIFEST, 4)))
        .respond_with(ResponseTemplate::new(200).set_body_string(alto_xml(&["never"])))
        .expect(0)
        .mount(&server)
        .await;

    let clients = test_clients(&server);
    let result = browse(&clients, &BrowseRequest::new(REF).with_pages("1-4"))
        .await
        .unwrap();

    assert!(result.contexts.is_empty());
    assert!(result.stopped_early);
    assert_eq!(result.failures.len(), 3);
    assert!(result
        .failures
        .iter()
        .all(|failure| failure.reason == PageFailureReason::Missing));
    assert_eq!(result.pages_not_attempted(), 1);
}

#[tokio::test]
async fn test_stops_after_three_server_errors() {
    let server = MockServer::start().await;
    digitized_document(&server).await;
    for page in 1..=3 {
        Mock::given(method("GET"))
            .and(path(alto_path(MANIFEST, page)))
            .respond_with(ResponseTemplate::new(500))
            .expect(4)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(alto_path(MANIFEST, 4)))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let clients = test_clients(&server);
    let result = browse(&clients, &BrowseRequest::new(REF).with_pages("1-4"))
        .await
        .unwrap();

    assert!(result.contexts.is_empty());
    assert!(result.stopped_early);
    assert_eq!(result.failures.len(), 3);
    assert!(result
        .failures
        .iter()
        .all(|failure| matches!(failure.reason, PageFailureReason::Error(_))));
    assert_eq!(result.pages_not_attempted(), 1);
}

#[tokio::test]
async fn test_mixed_failures_count_as_consecutive() {
    let server = MockServer::start().await;
    digitized_document(&server).await;
    mount_alto_missing(&server, MANIFEST, 1).await;
    Mock::given(method("GET"))
        .and(path(alto_path(MANIFEST, 2)))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_alto_missing(&server, MANIFEST, 3).await;
    Mock::given(method("GET"))
        .and(path(alto_path(MANIFEST, 4)))
        .respond_with(ResponseTemplate::new(200).set_body_string(alto_xml(&["never"])))
        .expect(0)
        .mount(&server)
        .await;

    let clients = test_clients(&server);
    let result = browse(&clients, &BrowseRequest::new(REF).with_pages("1-4"))
        .await
        .unwrap();

    assert!(result.stopped_early);
    let reasons: Vec<&PageFailureReason> = result.failures.iter().map(|f| &f.reason).collect();
    assert_eq!(reasons[0], &PageFailureReason::Missing);
    assert!(matches!(reasons[1], PageFailureReason::Error(_)));
    assert_eq!(reasons[2], &PageFailureReason::Missing);
}

#[tokio::test]
async fn test_blank_page_spec_selects_first_pages() {
    let server = MockServer::start().await;
    digitized_document(&server).await;
    for page in 1..=2 {
        mount_alto_page(&server, MANIFEST, page, &["text"]).await;
    }

    let clients = test_clients(&server);
    let mut request = BrowseRequest::new(REF).with_pages("");
    request.max_pages = 2;
    let result = browse(&clients, &request).await.unwrap();

    assert_eq!(result.page_numbers, vec![1, 2]);
    assert_eq!(result.contexts.len(), 2);
}

#[tokio::test]
async fn test_missing_pages_after_a_success_do_not_stop() {
    let server = MockServer::start().await;
    digitized_document(&server).await;
    mount_alto_page(&server, MANIFEST, 1, &["first"]).await;
    for page in 2..=4 {
        mount_alto_missing(&server, MANIFEST, page).await;
    }
    mount_alto_page(&server, MANIFEST, 5, &["fifth"]).await;

    let clients = test_clients(&server);
    let result = browse(&clients, &BrowseRequest::new(REF).with_pages("1-5"))
        .await
        .unwrap();

    assert!(!result.stopped_early);
    let pages: Vec<u32> = result.contexts.iter().map(|c| c.page_number).collect();
    assert_eq!(pages, vec![1, 5]);
    assert_eq!(result.failures.len(), 3);
}

#[tokio::test]
async fn test_blank_page_is_kept() {
    let server = MockServer::start().await;
    digitized_document(&server).await;
    mount_alto_page(&server, MANIFEST, 1, &[""]).await;

    let clients = test_clients(&server);
    let result = browse(&clients, &BrowseRequest::new(REF).with_pages("1"))
        .await
        .unwrap();

    assert_eq!(result.contexts.len(), 1);
    assert!(result.contexts[0].is_blank());
    assert_eq!(result.blank_pages(), 1);
}

#[tokio::test]
async fn test_default_pages_are_capped() {
    let server = MockServer::start().await;
    digitized_document(&server).await;
    for page in 1..=3 {
        mount_alto_page(&server, MANIFEST, page, &["text"]).await;
    }

    let clients = test_clients(&server);
    let mut request = BrowseRequest::new(REF);
    request.max_pages = 3;
    let result = browse(&clients, &request).await.unwrap();

    assert_eq!(result.page_numbers, vec![1, 2, 3]);
    assert_eq!(result.contexts.len(), 3);
}

#[tokio::test]
async fn test_invalid_pages_make_no_requests() {
    let server = MockServer::start().await;
    let clients = test_clients(&server);

    let error = browse(&clients, &BrowseRequest::new(REF).with_pages("abc,x-y"))
        .await
        .unwrap_err();

    assert!(matches!(error, RaError::Validation(_)));
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_not_digitized_document_returns_metadata() {
    let server = MockServer::start().await;
    mount_reference_lookup(&server, REF, vec![]).await;
    mount_oai(&server, oai_record_xml(REF, "")).await;

    let clients = test_clients(&server);
    let result = browse(&clients, &BrowseRequest::new(REF).with_pages("1-3"))
        .await
        .unwrap();

    assert!(!result.is_digitized());
    assert!(result.contexts.is_empty());
    let metadata = result.metadata.as_ref().unwrap();
    assert_eq!(metadata.unitid.as_deref(), Some(REF));
    assert_eq!(metadata.title.as_deref(), Some("Konseljakt"));
    assert_eq!(metadata.repository.as_deref(), Some("Riksarkivet"));
}

#[tokio::test]
async fn test_oai_manifest_link_resolves() {
    let server = MockServer::start().await;
    mount_reference_lookup(&server, REF, vec![]).await;
    mount_oai(
        &server,
        oai_record_xml(
            REF,
            r#"<dao xlink:role="MANIFEST" xlink:href="https://lbiiif.riksarkivet.se/arkis!R0000001/manifest"/>"#,
        ),
    )
    .await;
    mount_alto_page(&server, MANIFEST, 1, &["via", "oai"]).await;

    let clients = test_clients(&server);
    let result = browse(&clients, &BrowseRequest::new(REF).with_pages("1"))
        .await
        .unwrap();

    assert_eq!(result.manifest_id.as_deref(), Some(MANIFEST));
    assert_eq!(result.contexts[0].full_text, "via oai");
}

#[tokio::test]
async fn test_unknown_reference_code_is_not_found() {
    let server = MockServer::start().await;
    mount_reference_lookup(&server, "SE/XX/0", vec![]).await;
    mount_oai(&server, oai_error_xml("idDoesNotExist")).await;

    let clients = test_clients(&server);
    let error = browse(&clients, &BrowseRequest::new("SE/XX/0"))
        .await
        .unwrap_err();

    match error {
        RaError::DocumentNotFound { reference_code } => assert_eq!(reference_code, "SE/XX/0"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_resolves_through_nested_collections() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_reference_lookup(&server, REF, vec![record("rec-9", REF, None, &[1])]).await;

    Mock::given(method("GET"))
        .and(path("/collection/arkiv/rec-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "label": {"sv": ["Serie"]},
            "items": [
                {"id": format!("{}/collection/sub-a", uri), "type": "Collection"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collection/sub-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": format!("{}/collection/arkiv/rec-9", uri), "type": "Collection"},
                {"id": format!("{}/arkis!R0000009/manifest", uri), "type": "Manifest",
                 "label": {"en": ["Volume 9"]}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clients = test_clients(&server);

    let collection = clients.iiif.get_collection("rec-9").await.unwrap().unwrap();
    assert_eq!(collection.title, "Serie");
    assert_eq!(collection.sub_collections.len(), 1);
    assert_eq!(collection.manifests.len(), 1);
    assert_eq!(collection.manifests[0].id, "R0000009");
    assert_eq!(collection.manifests[0].label, "Volume 9");

    server.verify().await;
    server.reset().await;
    mount_reference_lookup(&server, REF, vec![record("rec-9", REF, None, &[1])]).await;
    Mock::given(method("GET"))
        .and(path("/collection/arkiv/rec-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": format!("{}/arkis!R0000009/manifest", uri), "type": "Manifest"}]
        })))
        .mount(&server)
        .await;

    let resolution = resolve_manifest_id(&clients, REF).await.unwrap();
    assert_eq!(resolution.manifest_id(), Some("R0000009"));
    assert!(matches!(resolution, Resolution::Digitized { .. }));
}

#[tokio::test]
async fn test_session_stubs_repeated_pages() {
    let server = MockServer::start().await;
    digitized_document(&server).await;
    for page in 1..=3 {
        mount_alto_page(&server, MANIFEST, page, &["page", page.to_string().as_str()]).await;
    }

    let clients = test_clients(&server);
    let mut session = Session::new();

    let first = browse(&clients, &BrowseRequest::new(REF).with_pages("1-2"))
        .await
        .unwrap();
    let plan = session.plan_browse(&first);
    assert_eq!(plan.new_pages(), 2);
    assert_eq!(plan.previously_shown(), 0);

    let second = browse(&clients, &BrowseRequest::new(REF).with_pages("2-3"))
        .await
        .unwrap();
    let plan = session.plan_browse(&second);
    assert_eq!(plan.new_pages(), 1);
    assert_eq!(plan.previously_shown(), 1);
    assert_eq!(plan.entries[0], PageEntry::Stub { page_number: 2 });
    assert!(matches!(plan.entries[1], PageEntry::Full(context) if context.page_number == 3));
}
