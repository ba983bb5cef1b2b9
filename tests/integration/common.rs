//! Shared fixtures for the integration tests

use ra_transcripts::clients::Clients;
use ra_transcripts::config::{Config, EndpointConfig, HttpConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Configuration with every endpoint on the mock server and short backoff
pub fn test_config(server: &MockServer) -> Config {
    Config {
        http: HttpConfig {
            timeout_secs: 5,
            connect_timeout_secs: 2,
            max_retries: 3,
            backoff_base_ms: 10,
            user_agent: "ra-transcripts-tests".to_string(),
        },
        endpoints: EndpointConfig::with_base(&server.uri()),
        ..Config::default()
    }
}

pub fn test_clients(server: &MockServer) -> Clients {
    Clients::from_config(&test_config(server)).expect("Failed to build clients")
}

/// ALTO v4 document with one `String` per word
pub fn alto_xml(words: &[&str]) -> String {
    let strings: String = words
        .iter()
        .map(|word| format!(r#"<String CONTENT="{}"/><SP/>"#, word))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<alto xmlns="http://www.loc.gov/standards/alto/ns-v4#">
  <Layout><Page><PrintSpace><TextBlock><TextLine>{}</TextLine></TextBlock></PrintSpace></Page></Layout>
</alto>"#,
        strings
    )
}

/// Path of one ALTO page below the mock server
pub fn alto_path(manifest_id: &str, page: u32) -> String {
    format!(
        "/dokument/alto/{}/{}/{}_{:05}.xml",
        &manifest_id[..4],
        manifest_id,
        manifest_id,
        page
    )
}

pub async fn mount_alto_page(server: &MockServer, manifest_id: &str, page: u32, words: &[&str]) {
    Mock::given(method("GET"))
        .and(path(alto_path(manifest_id, page)))
        .respond_with(ResponseTemplate::new(200).set_body_string(alto_xml(words)))
        .mount(server)
        .await;
}

pub async fn mount_alto_missing(server: &MockServer, manifest_id: &str, page: u32) {
    Mock::given(method("GET"))
        .and(path(alto_path(manifest_id, page)))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

/// Search record for a digitized document
pub fn record(id: &str, reference_code: &str, manifest: Option<&str>, pages: &[u32]) -> Value {
    let snippets: Vec<Value> = pages
        .iter()
        .map(|page| {
            json!({
                "text": format!("om <em>trolldom</em> på sidan {}", page),
                "score": 1.5,
                "pages": [{"id": format!("_{:05}", page)}]
            })
        })
        .collect();

    let mut record = json!({
        "id": id,
        "objectType": "Record",
        "type": "Volume",
        "caption": format!("Volym {}", reference_code),
        "metadata": {
            "referenceCode": reference_code,
            "date": "1668 - 1676",
            "archivalInstitution": [{"caption": "Riksarkivet (Stockholm)"}]
        },
        "transcribedText": {"numTotal": pages.len(), "snippets": snippets}
    });
    if let Some(manifest) = manifest {
        record["_links"] = json!({ "image": [manifest] });
    }
    record
}

pub fn records_response(items: Vec<Value>, total_hits: u64) -> Value {
    json!({
        "totalHits": total_hits,
        "hits": items.len(),
        "offset": 0,
        "items": items
    })
}

/// Mounts the metadata lookup the resolver makes for `reference_code`
pub async fn mount_reference_lookup(server: &MockServer, reference_code: &str, items: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api/records"))
        .and(query_param("text", format!("\"{}\"", reference_code)))
        .respond_with(ResponseTemplate::new(200).set_body_json(records_response(items, 1)))
        .mount(server)
        .await;
}

/// OAI-PMH `GetRecord` response carrying the given `dao` elements
pub fn oai_record_xml(reference_code: &str, daos: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <GetRecord>
    <record>
      <header>
        <identifier>{code}</identifier>
        <datestamp>2024-01-15</datestamp>
      </header>
      <metadata>
        <ead xmlns="urn:isbn:1-931666-22-9" xmlns:xlink="http://www.w3.org/1999/xlink">
          <archdesc>
            <did>
              <unittitle>Konseljakt</unittitle>
              <unitid>{code}</unitid>
              <unitdate>1809</unitdate>
              <repository>Riksarkivet</repository>
            </did>
            {daos}
          </archdesc>
        </ead>
      </metadata>
    </record>
  </GetRecord>
</OAI-PMH>"#,
        code = reference_code,
        daos = daos
    )
}

pub fn oai_error_xml(code: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"><error code="{}">Unknown identifier</error></OAI-PMH>"#,
        code
    )
}

pub async fn mount_oai(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/OAI"))
        .and(query_param("verb", "GetRecord"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}
