//! End-to-end search: flattening, grouping, pagination, enrichment and dedup

use ra_transcripts::clients::SearchQuery;
use ra_transcripts::search::{enrich_hits, expand_with_padding, search, search_transcribed};
use ra_transcripts::session::Session;
use ra_transcripts::RaError;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::*;

/// Three digitized documents with 3, 2 and 2 page hits, plus one extra record
async fn mount_trolldom_search(server: &MockServer) {
    let uri = server.uri();
    let items = vec![
        record("doc-1", "SE/RA/1", Some(&format!("{}/arkis!R0000001/manifest", uri)), &[5, 6, 9]),
        record("doc-2", "SE/RA/2", Some(&format!("{}/arkis!R0000002/manifest", uri)), &[1, 2]),
        record("doc-3", "SE/RA/3", None, &[40, 41]),
        record("doc-4", "SE/RA/4", None, &[7]),
    ];

    Mock::given(method("GET"))
        .and(path("/api/records"))
        .and(query_param("transcribed_text", "trolldom"))
        .and(query_param("only_digitised_materials", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records_response(items, 120)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_groups_page_hits_by_document() {
    let server = MockServer::start().await;
    mount_trolldom_search(&server).await;
    let clients = test_clients(&server);

    let result = search_transcribed(&clients, "trolldom", 0, 3, None)
        .await
        .unwrap();

    assert_eq!(result.documents_returned, 3);
    assert_eq!(result.hits.len(), 7);
    assert_eq!(result.total_hits, 120);
    assert_eq!(result.keyword, "trolldom");

    let summary = result.summary();
    assert_eq!(summary.total_documents, 3);
    assert_eq!(summary.total_page_hits, 7);
    let first = summary.group("SE/RA/1").unwrap();
    assert_eq!(first.page_numbers(), vec![5, 6, 9]);
    assert_eq!(first.hit_count_label(), "3 pages");
    assert_eq!(first.first().unwrap().snippet_text, "om trolldom på sidan 5");

    let pagination = result.pagination();
    assert!(pagination.has_more);
    assert_eq!(pagination.next_offset, Some(3));
    assert_eq!(pagination.range_start, 1);
    assert_eq!(pagination.range_end, 3);
}

#[tokio::test]
async fn test_snippet_cap_per_document() {
    let server = MockServer::start().await;
    mount_trolldom_search(&server).await;
    let clients = test_clients(&server);

    let result = search_transcribed(&clients, "trolldom", 0, 3, Some(1))
        .await
        .unwrap();

    assert_eq!(result.hits.len(), 3);
    let summary = result.summary();
    let first = summary.group("SE/RA/1").unwrap();
    assert_eq!(first.page_numbers(), vec![5]);
    assert_eq!(first.hit_count_label(), "1 shown (3 total)");
}

#[tokio::test]
async fn test_empty_search_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records_response(vec![], 0)))
        .mount(&server)
        .await;
    let clients = test_clients(&server);

    let result = search_transcribed(&clients, "xyzzy", 0, 25, None)
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.summary().total_documents, 0);
    let pagination = result.pagination();
    assert!(!pagination.has_more);
    assert_eq!(pagination.next_offset, None);
}

#[tokio::test]
async fn test_transcribed_search_requires_digitised_materials() {
    let server = MockServer::start().await;
    let clients = test_clients(&server);

    let query = SearchQuery {
        only_digitised: false,
        ..SearchQuery::transcribed("trolldom")
    };
    let error = search(&clients, &query).await.unwrap_err();

    assert!(matches!(error, RaError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/records"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .expect(1)
        .mount(&server)
        .await;
    let clients = test_clients(&server);

    let error = search_transcribed(&clients, "trolldom", 0, 25, None)
        .await
        .unwrap_err();

    assert!(matches!(error, RaError::Json { .. }));
}

#[tokio::test]
async fn test_enrichment_adds_page_text_and_links() {
    let server = MockServer::start().await;
    mount_trolldom_search(&server).await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/collection/arkiv/doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": format!("{}/arkis!R0000001/manifest", uri), "type": "Manifest"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collection/arkiv/doc-2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_alto_page(&server, "R0000001", 5, &["hela", "sidan", "fem"]).await;
    mount_alto_missing(&server, "R0000001", 6).await;

    let clients = test_clients(&server);
    let result = search_transcribed(&clients, "trolldom", 0, 3, None)
        .await
        .unwrap();
    let enriched = enrich_hits(&clients, &result.hits, 4, Some("trolldom")).await;

    assert_eq!(enriched.len(), 4);
    assert_eq!(enriched[0].full_text.as_deref(), Some("hela sidan fem"));
    assert!(enriched[0]
        .alto_url
        .as_deref()
        .is_some_and(|url| url.ends_with(&alto_path("R0000001", 5))));
    assert!(enriched[0]
        .bildvisning_url
        .as_deref()
        .is_some_and(|url| url.ends_with("#?q=trolldom")));

    // ALTO 404 and missing collections fall back to the snippet
    assert_eq!(enriched[1].full_text.as_deref(), Some("om trolldom på sidan 6"));
    assert_eq!(enriched[3].reference_code, "SE/RA/2");
    assert_eq!(enriched[3].full_text.as_deref(), Some("om trolldom på sidan 1"));
}

#[tokio::test]
async fn test_padding_adds_context_pages() {
    let server = MockServer::start().await;
    mount_trolldom_search(&server).await;
    let clients = test_clients(&server);

    let result = search_transcribed(&clients, "trolldom", 0, 3, Some(1))
        .await
        .unwrap();
    let padded = expand_with_padding(&result.hits, 1);

    let doc_1: Vec<(u32, bool)> = padded
        .iter()
        .filter(|hit| hit.reference_code == "SE/RA/1")
        .map(|hit| (hit.page_number, hit.is_context))
        .collect();
    assert_eq!(doc_1, vec![(4, true), (5, false), (6, true)]);
}

#[tokio::test]
async fn test_session_omits_documents_already_shown() {
    let server = MockServer::start().await;
    mount_trolldom_search(&server).await;
    let clients = test_clients(&server);
    let mut session = Session::new();

    let result = search_transcribed(&clients, "trolldom", 0, 3, None)
        .await
        .unwrap();

    let first = session.plan_search(&result, 20);
    assert_eq!(first.documents.len(), 3);
    assert_eq!(first.omitted_documents, 0);

    let again = session.plan_search(&result, 20);
    assert!(again.documents.is_empty());
    assert_eq!(again.omitted_documents, 3);
}

#[tokio::test]
async fn test_session_shows_only_new_pages() {
    let server = MockServer::start().await;
    mount_trolldom_search(&server).await;
    let clients = test_clients(&server);
    let mut session = Session::new();
    session.search.mark_seen("SE/RA/1", [5, 6]);

    let result = search_transcribed(&clients, "trolldom", 0, 3, None)
        .await
        .unwrap();
    let plan = session.plan_search(&result, 2);

    assert_eq!(plan.documents.len(), 2);
    let partial = &plan.documents[0];
    assert!(partial.partially_seen);
    assert_eq!(partial.hits.len(), 1);
    assert_eq!(partial.hits[0].page_number, 9);
    assert_eq!(plan.not_displayed, 1);
}
