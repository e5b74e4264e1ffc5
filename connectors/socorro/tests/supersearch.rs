//! SuperSearch facet searches against a fake HTTP server.

use chrono::NaiveDate;
use nocrash_core::config::SocorroSettings;
use nocrash_core::{CrashOccurrenceService, FacetQuery, FacetTerm};
use nocrash_socorro::{SocorroError, SuperSearchClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SuperSearchClient {
    SuperSearchClient::new(&SocorroSettings {
        url: server.uri(),
        ..SocorroSettings::default()
    })
    .unwrap()
}

fn query(signatures: &[&str]) -> FacetQuery {
    FacetQuery {
        date_from: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
        date_to: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        signatures: signatures.iter().map(ToString::to_string).collect(),
        facet_size: signatures.len(),
    }
}

#[tokio::test]
async fn facets_report_crashing_signatures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/SuperSearch/"))
        .and(query_param("_results_number", "0"))
        .and(query_param("_facets", "signature"))
        .and(query_param("_facets_size", "3"))
        .and(query_param("signature", "=sig2"))
        .and(query_param("date", ">=2024-01-08"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [],
            "total": 12,
            "facets": {
                "signature": [ { "term": "sig2", "count": 12 } ]
            },
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .signature_facets(&query(&["sig1", "sig2", "sig3"]))
        .await
        .unwrap();

    assert!(!response.has_errors());
    assert_eq!(
        response.signatures,
        vec![FacetTerm {
            term: "sig2".into(),
            count: 12
        }]
    );

    let requests = server.received_requests().await.unwrap();
    let signatures: Vec<String> = requests[0]
        .url
        .query_pairs()
        .filter(|(k, _)| k == "signature")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(signatures, vec!["=sig1", "=sig2", "=sig3"]);
}

#[tokio::test]
async fn logical_errors_are_passed_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/SuperSearch/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [],
            "total": 0,
            "facets": {},
            "errors": [ { "type": "shards", "index": "socorro201402" } ]
        })))
        .mount(&server)
        .await;

    let response = client(&server)
        .signature_facets(&query(&["a"]))
        .await
        .unwrap();

    assert!(response.has_errors());
    assert!(response.signatures.is_empty());
}

#[tokio::test]
async fn http_failure_is_a_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/SuperSearch/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).facets(&query(&["a"])).await.unwrap_err();
    assert!(matches!(&err, SocorroError::Status { status: 500, body } if body == "boom"));

    let core = client(&server)
        .signature_facets(&query(&["a"]))
        .await
        .unwrap_err();
    assert!(matches!(
        core,
        nocrash_core::Error::Service {
            service: "socorro",
            status_code: Some(500),
            ..
        }
    ));
}

#[tokio::test]
async fn malformed_body_is_a_json_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/SuperSearch/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client(&server).facets(&query(&["a"])).await.unwrap_err();
    assert!(matches!(err, SocorroError::Json(_)));
}
