//! Tests for stream module

use super::*;
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig};
use crate::pagination::{PaginationConfig, PaginationState};
use crate::partition::{StreamSlice, SubstreamSlicer, WholeSlicer};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer) -> Fetcher {
    let config = HttpClientConfig::builder().base_url(server.uri()).build();
    Fetcher::new(Arc::new(HttpClient::with_config(config).unwrap()))
}

fn reader(definition: StreamDefinition, fetcher: &Fetcher) -> RecordReader {
    RecordReader::new(
        Arc::new(HttpStream::new(definition)),
        fetcher.clone(),
        Box::new(WholeSlicer::new()),
    )
}

async fn drain(reader: &mut RecordReader) -> Vec<serde_json::Value> {
    let mut out = Vec::new();
    while let Some(record) = reader.next().await.unwrap() {
        out.push(record);
    }
    out
}

async fn mount_guild_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users/@me/guilds"))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}, {"id": "2"}])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/@me/guilds"))
        .and(query_param("after", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "3"}])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/@me/guilds"))
        .and(query_param("after", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

// ============================================================================
// StreamDefinition Tests
// ============================================================================

#[test]
fn test_definition_defaults() {
    let def = StreamDefinition::new("current_user", "users/@me");
    assert_eq!(def.primary_key, vec!["id".to_string()]);
    assert_eq!(def.pagination, PaginationConfig::None);
    assert!(def.parent().is_none());
    assert!(!def.use_cache);
}

#[test]
fn test_definition_builders() {
    let def = StreamDefinition::new("guilds", "guilds/{{ parent.id }}")
        .child_of("current_user_guilds", "id")
        .with_data_field("data")
        .cacheable();

    assert_eq!(def.parent(), Some("current_user_guilds"));
    assert_eq!(def.data_field.as_deref(), Some("data"));
    assert!(def.use_cache);
}

// ============================================================================
// Request Tests
// ============================================================================

#[test]
fn test_request_signature_sorted_query() {
    let mut query = BTreeMap::new();
    query.insert("limit".to_string(), "2".to_string());
    query.insert("after".to_string(), "9".to_string());

    let request = Request::new("/users/@me/guilds").with_query(query);
    assert_eq!(
        request.signature().as_str(),
        "users/@me/guilds?after=9&limit=2"
    );
    assert_eq!(Request::new("users/@me").signature().to_string(), "users/@me");
}

#[test]
fn test_request_to_request_config() {
    let mut query = BTreeMap::new();
    query.insert("limit".to_string(), "5".to_string());

    let config = Request::new("x").with_query(query).to_request_config();
    assert_eq!(config.query.get("limit"), Some(&"5".to_string()));
    assert!(config.headers.is_empty());
}

// ============================================================================
// HttpStream Tests
// ============================================================================

#[test]
fn test_http_stream_renders_parent_path() {
    let stream = HttpStream::new(
        StreamDefinition::new("guilds", "guilds/{{ parent.id }}").child_of("parents", "id"),
    );
    let slice = StreamSlice::parent(json!({"id": "42"}), StreamSlice::Whole);

    let request = stream
        .build_request(&slice, &PaginationState::new())
        .unwrap();
    assert_eq!(request.path, "guilds/42");
    assert!(request.query.is_empty());
}

#[test]
fn test_http_stream_missing_parent_field() {
    let stream = HttpStream::new(StreamDefinition::new("guilds", "guilds/{{ parent.id }}"));
    let err = stream
        .build_request(&StreamSlice::Whole, &PaginationState::new())
        .unwrap_err();
    assert!(matches!(err, Error::UndefinedVariable { .. }));
}

#[test]
fn test_http_stream_config_values() {
    let stream = HttpStream::new(StreamDefinition::new("s", "{{ config.prefix }}/users/@me"))
        .with_config_values(json!({"prefix": "v10"}));
    let request = stream
        .build_request(&StreamSlice::Whole, &PaginationState::new())
        .unwrap();
    assert_eq!(request.path, "v10/users/@me");
}

#[test]
fn test_http_stream_pagination_params() {
    let stream = HttpStream::new(
        StreamDefinition::new("current_user_guilds", "users/@me/guilds")
            .with_pagination(PaginationConfig::after_id(2)),
    );
    let mut state = PaginationState::new();

    let first = stream.build_request(&StreamSlice::Whole, &state).unwrap();
    assert_eq!(first.query.get("limit"), Some(&"2".to_string()));
    assert!(!first.query.contains_key("after"));

    let (records, next) = stream.parse_page(&json!([{"id": "1"}, {"id": "2"}]), &mut state);
    assert_eq!(records.len(), 2);
    assert!(next.is_continue());

    let second = stream.build_request(&StreamSlice::Whole, &state).unwrap();
    assert_eq!(second.query.get("after"), Some(&"2".to_string()));
}

#[test]
fn test_http_stream_missing_data_field_is_empty_page() {
    let stream = HttpStream::new(
        StreamDefinition::new("s", "p")
            .with_data_field("data")
            .with_pagination(PaginationConfig::after_id(2)),
    );
    let mut state = PaginationState::new();

    let (records, next) = stream.parse_page(&json!({"unexpected": true}), &mut state);
    assert!(records.is_empty());
    assert!(next.is_done());
}

// ============================================================================
// Cache Tests
// ============================================================================

#[tokio::test]
async fn test_response_cache_hits_and_misses() {
    let cache = ResponseCache::new();
    let sig = Request::new("users/@me").signature();

    assert!(cache.get(&sig).await.is_none());
    cache.insert(sig.clone(), json!({"id": "1"})).await;
    assert_eq!(cache.get(&sig).await, Some(json!({"id": "1"})));

    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 1);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_response_cache_clones_share_entries() {
    let cache = ResponseCache::new();
    let clone = cache.clone();
    clone
        .insert(Request::new("a").signature(), json!([]))
        .await;
    assert!(!cache.is_empty().await);
}

#[tokio::test]
async fn test_fetcher_uses_cache_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let request = Request::new("users/@me");

    let a = fetcher.fetch(&request, true).await.unwrap();
    let b = fetcher.fetch(&request, true).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(fetcher.requests(), 1);
    assert_eq!(fetcher.cache().hits(), 1);
}

#[tokio::test]
async fn test_fetcher_bypasses_cache_when_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let request = Request::new("users/@me");
    fetcher.fetch(&request, false).await.unwrap();
    fetcher.fetch(&request, false).await.unwrap();

    assert_eq!(fetcher.requests(), 2);
    assert!(fetcher.cache().is_empty().await);
}

#[tokio::test]
async fn test_fetcher_does_not_cache_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let request = Request::new("users/@me");
    assert!(fetcher.fetch(&request, true).await.is_err());
    assert!(fetcher.fetch(&request, true).await.is_err());
    assert!(fetcher.cache().is_empty().await);
}

// ============================================================================
// RecordReader Tests
// ============================================================================

#[tokio::test]
async fn test_reader_single_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "80351110224678912", "username": "Nelly"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let mut reader = reader(StreamDefinition::new("current_user", "users/@me"), &fetcher);

    let records = drain(&mut reader).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["username"], "Nelly");
    assert_eq!(reader.pages(), 1);
    assert_eq!(reader.records(), 1);

    // Exhausted readers stay exhausted.
    assert!(reader.next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_reader_paginates_until_empty_page() {
    let server = MockServer::start().await;
    mount_guild_pages(&server).await;

    let fetcher = fetcher_for(&server);
    let mut reader = reader(
        StreamDefinition::new("current_user_guilds", "users/@me/guilds")
            .with_pagination(PaginationConfig::after_id(2)),
        &fetcher,
    );

    let ids: Vec<String> = drain(&mut reader)
        .await
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(reader.pages(), 3);
    assert_eq!(fetcher.requests(), 3);
}

#[tokio::test]
async fn test_reader_repeated_cursor_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/guilds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}, {"id": "2"}])))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let mut reader = reader(
        StreamDefinition::new("current_user_guilds", "users/@me/guilds")
            .with_pagination(PaginationConfig::after_id(2)),
        &fetcher,
    );

    assert!(reader.next().await.unwrap().is_some());
    assert!(reader.next().await.unwrap().is_some());

    let err = reader.next().await.unwrap_err();
    match err {
        Error::PaginationLoop { stream, cursor } => {
            assert_eq!(stream, "current_user_guilds");
            assert_eq!(cursor, "2");
        }
        other => panic!("Expected PaginationLoop, got {other:?}"),
    }
    assert!(reader.next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_reader_propagates_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("401: Unauthorized"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let mut reader = reader(StreamDefinition::new("current_user", "users/@me"), &fetcher);

    let err = reader.next().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_reader_child_stream_fans_out_in_parent_order() {
    let server = MockServer::start().await;
    mount_guild_pages(&server).await;

    for id in ["1", "2", "3"] {
        Mock::given(method("GET"))
            .and(path(format!("/guilds/{id}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": id, "name": format!("guild {id}")})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let fetcher = fetcher_for(&server);
    let parent = reader(
        StreamDefinition::new("current_user_guilds", "users/@me/guilds")
            .with_pagination(PaginationConfig::after_id(2)),
        &fetcher,
    );
    let mut child = RecordReader::new(
        Arc::new(HttpStream::new(
            StreamDefinition::new("guilds", "guilds/{{ parent.id }}").child_of("current_user_guilds", "id"),
        )),
        fetcher.clone(),
        Box::new(SubstreamSlicer::new("guilds", parent, "id")),
    );

    let first = child.next().await.unwrap().unwrap();
    assert_eq!(first["name"], "guild 1");
    match child.current_slice() {
        StreamSlice::Parent(slice) => {
            assert_eq!(slice.parent["id"], "1");
            assert_eq!(*slice.sub_parent, StreamSlice::Whole);
        }
        StreamSlice::Whole => panic!("Expected parent slice"),
    }

    let mut names = vec![first["name"].as_str().unwrap().to_string()];
    names.extend(
        drain(&mut child)
            .await
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_string()),
    );
    assert_eq!(names, vec!["guild 1", "guild 2", "guild 3"]);

    let guild_paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .filter(|p| p.starts_with("/guilds/"))
        .collect();
    assert_eq!(guild_paths, vec!["/guilds/1", "/guilds/2", "/guilds/3"]);
}

#[tokio::test]
async fn test_reader_child_error_aborts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/guilds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}, {"id": "2"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guilds/1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guilds/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "2"})))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let parent = reader(
        StreamDefinition::new("current_user_guilds", "users/@me/guilds"),
        &fetcher,
    );
    let mut child = RecordReader::new(
        Arc::new(HttpStream::new(StreamDefinition::new("guilds", "guilds/{{ parent.id }}"))),
        fetcher.clone(),
        Box::new(SubstreamSlicer::new("guilds", parent, "id")),
    );

    let err = child.next().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(child.next().await.unwrap().is_none());
}
