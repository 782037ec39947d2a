use std::time::Duration;

use unisync_core::SourceConfig;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::{parse_records, truncate};
use crate::{InstitutionSource, SourceClient, SourceError};

fn config_for(server: &MockServer) -> SourceConfig {
    SourceConfig {
        url: format!("{}/search", server.uri()),
        name_filter: "Middle".to_owned(),
        timeout: Duration::from_secs(5),
    }
}

fn example_payload() -> serde_json::Value {
    serde_json::json!([
        {
            "name": "Example University",
            "alpha_two_code": "US",
            "country": "United States",
            "state-province": "CA",
            "web_pages": ["https://example.edu/"],
            "domains": ["example.edu"]
        },
        {
            "name": "Middlesex College",
            "alpha_two_code": "GB",
            "country": "United Kingdom",
            "state-province": null
        }
    ])
}

#[tokio::test]
async fn fetch_sends_name_filter_and_decodes_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "Middle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(example_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let client = SourceClient::new(&config_for(&server)).unwrap();
    let records = client.fetch().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Example University");
    assert_eq!(records[0].state_province.as_deref(), Some("CA"));
    assert_eq!(records[1].state_province, None);
}

#[tokio::test]
async fn custom_filter_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("name", "Polytechnic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.name_filter = "Polytechnic".to_owned();
    let records = SourceClient::new(&config).unwrap().fetch().await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn empty_array_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let records = SourceClient::new(&config_for(&server)).unwrap().fetch().await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn missing_key_fails_whole_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "Good College", "alpha_two_code": "US", "country": "US", "state-province": null},
            {"name": "No Code University", "country": "US", "state-province": null}
        ])))
        .mount(&server)
        .await;

    let err = SourceClient::new(&config_for(&server)).unwrap().fetch().await.unwrap_err();
    assert!(err.is_parse(), "expected parse error, got {err}");
    assert!(err.to_string().contains("alpha_two_code"));
}

#[tokio::test]
async fn html_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = SourceClient::new(&config_for(&server)).unwrap().fetch().await.unwrap_err();
    assert!(matches!(err, SourceError::Parse { .. }));
}

#[tokio::test]
async fn non_success_status_is_a_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = SourceClient::new(&config_for(&server)).unwrap().fetch().await.unwrap_err();
    match err {
        SourceError::HttpStatus { code, body } => {
            assert_eq!(code, 503);
            assert_eq!(body, "Service Unavailable");
        },
        other => panic!("expected HttpStatus, got {other}"),
    }
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("[]")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.timeout = Duration::from_millis(50);
    let err = SourceClient::new(&config).unwrap().fetch().await.unwrap_err();
    assert!(matches!(err, SourceError::Fetch(ref e) if e.is_timeout()), "got {err}");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_fetch_failure() {
    let config = SourceConfig {
        url: "http://127.0.0.1:1/search".to_owned(),
        name_filter: "Middle".to_owned(),
        timeout: Duration::from_secs(2),
    };
    let err = SourceClient::new(&config).unwrap().fetch().await.unwrap_err();
    assert!(matches!(err, SourceError::Fetch(_)), "got {err}");
}

#[test]
fn trailing_slash_is_trimmed() {
    let config = SourceConfig {
        url: "http://127.0.0.1:5000/search/".to_owned(),
        name_filter: "Middle".to_owned(),
        timeout: Duration::from_secs(1),
    };
    let client = SourceClient::new(&config).unwrap();
    assert_eq!(client.url(), "http://127.0.0.1:5000/search");
    assert_eq!(client.name_filter(), "Middle");
}

#[test]
fn parse_error_quotes_truncated_body() {
    let body = format!("{{\"oops\": \"{}\"}}", "x".repeat(2000));
    let err = parse_records(&body).unwrap_err();
    match err {
        SourceError::Parse { body: quoted, .. } => assert_eq!(quoted.len(), 500),
        other => panic!("expected Parse, got {other}"),
    }
}

#[test]
fn truncate_respects_char_boundaries() {
    assert_eq!(truncate("héllo", 2), "h");
    assert_eq!(truncate("short", 100), "short");
}
