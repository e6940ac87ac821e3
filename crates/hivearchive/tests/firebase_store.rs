//! REST contract tests for `FirebaseStore` against a mock server.

use std::time::{Duration, Instant};

use hivearchive::config::StoreConfig;
use hivearchive::record::now_millis;
use hivearchive::store::push_id::decode_time;
use hivearchive::{FirebaseStore, RecordStore, StoreConnection};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> FirebaseStore {
    let config = StoreConfig {
        max_retries: 0,
        request_timeout_secs: 5,
        ..StoreConfig::default()
    };
    let connection = StoreConnection::new(server.uri()).unwrap();
    FirebaseStore::new(connection, &config).unwrap()
}

#[tokio::test]
async fn fetch_of_empty_collection_returns_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/text.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let records = store_for(&server).fetch_recent(10).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn fetch_orders_by_created_at_and_limits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/text.json"))
        .and(query_param("orderBy", "\"createdAt\""))
        .and(query_param("limitToLast", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "-NC": {"text": "Alpha2", "createdAt": 300},
            "-NA": {"text": "alpha", "createdAt": 100},
            "-NB": {"text": "beta", "createdAt": 200},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = store_for(&server).fetch_recent(10).await.unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["-NA", "-NB", "-NC"]);
    assert_eq!(records[2].text, "Alpha2");
    assert_eq!(records[2].created_at, 300);
}

#[tokio::test]
async fn fetch_skips_malformed_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/text.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "-NA": {"text": "kept", "createdAt": 100},
            "-NB": {"createdAt": 200},
            "-NC": "just a string",
        })))
        .mount(&server)
        .await;

    let records = store_for(&server).fetch_recent(10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "kept");
}

#[tokio::test]
async fn fetch_falls_back_when_index_is_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/text.json"))
        .and(query_param("orderBy", "\"createdAt\""))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Index not defined, add \".indexOn\": \"createdAt\", for path \"/uploads/text\", to the rules"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uploads/text.json"))
        .and(query_param_is_missing("orderBy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "-N1": {"text": "one", "createdAt": 1},
            "-N2": {"text": "two", "createdAt": 2},
            "-N3": {"text": "three", "createdAt": 3},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = store_for(&server).fetch_recent(2).await.unwrap();
    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["two", "three"]);
}

#[tokio::test]
async fn server_error_maps_to_store_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/text.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = store_for(&server).fetch_recent(10).await.unwrap_err();
    assert!(err.is_store_unavailable());
}

#[tokio::test]
async fn fetch_of_integer_keyed_collection_reads_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/text.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"text": "zero", "createdAt": 5},
            null,
            {"text": "two", "createdAt": 7},
        ])))
        .mount(&server)
        .await;

    let records = store_for(&server).fetch_recent(10).await.unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["0", "2"]);
}

#[tokio::test]
async fn slow_response_times_out_as_store_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/text.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("null")
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let config = StoreConfig {
        max_retries: 0,
        request_timeout_secs: 1,
        ..StoreConfig::default()
    };
    let store = FirebaseStore::new(StoreConnection::new(server.uri()).unwrap(), &config).unwrap();

    let started = Instant::now();
    let err = store.fetch_recent(10).await.unwrap_err();
    assert!(err.is_store_unavailable());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn transient_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/text.json"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uploads/text.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let config = StoreConfig {
        max_retries: 2,
        retry_delay_ms: 1,
        ..StoreConfig::default()
    };
    let store = FirebaseStore::new(StoreConnection::new(server.uri()).unwrap(), &config).unwrap();
    assert!(store.fetch_recent(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn append_puts_document_under_push_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/uploads/text/[-0-9A-Za-z_]{20}\.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "hello"})))
        .expect(1)
        .mount(&server)
        .await;

    let before = now_millis();
    let record = store_for(&server).append("hello").await.unwrap();

    assert_eq!(record.text, "hello");
    assert!(record.created_at >= before);
    assert_eq!(decode_time(&record.id), Some(record.created_at));

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, json!({"text": "hello", "createdAt": record.created_at}));
}

#[tokio::test]
async fn append_empty_text_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = store_for(&server).append("").await.unwrap_err();
    assert!(err.is_empty_input());
}

#[tokio::test]
async fn append_rejected_maps_to_store_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Permission denied"})))
        .mount(&server)
        .await;

    let err = store_for(&server).append("hello").await.unwrap_err();
    assert!(err.is_store_unavailable());
    assert!(err.to_string().contains("Permission denied"));
}

#[tokio::test]
async fn retried_append_reuses_push_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = StoreConfig {
        max_retries: 2,
        retry_delay_ms: 1,
        ..StoreConfig::default()
    };
    let store = FirebaseStore::new(StoreConnection::new(server.uri()).unwrap(), &config).unwrap();
    let record = store.append("hello").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    let expected = format!("/uploads/text/{}.json", record.id);
    assert_eq!(paths, vec![expected.clone(), expected]);
}
