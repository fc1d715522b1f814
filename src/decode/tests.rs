//! Tests for decoder module

use super::*;
use serde_json::json;

#[test]
fn test_whole_body_array() {
    let decoder = JsonDecoder::new();
    let records = decoder.decode_value(&json!([{"id": "1"}, {"id": "2"}, {"id": "3"}]));

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["id"], "1");
    assert_eq!(records[2]["id"], "3");
}

#[test]
fn test_whole_body_single_object() {
    let decoder = JsonDecoder::new();
    let records =
        decoder.decode_value(&json!({"id": "80351110224678912", "username": "Nelly"}));

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["username"], "Nelly");
}

#[test]
fn test_whole_body_empty_array() {
    let decoder = JsonDecoder::new();
    assert!(decoder.decode_value(&json!([])).is_empty());
}

#[test]
fn test_null_body_is_empty_page() {
    let decoder = JsonDecoder::new();
    assert!(decoder.decode_value(&serde_json::Value::Null).is_empty());
}

#[test]
fn test_data_field() {
    let decoder = JsonDecoder::with_field("data");
    let records = decoder.decode_value(&json!({
        "data": [{"id": 1}, {"id": 2}],
        "meta": {"count": 2}
    }));

    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["id"], 2);
}

#[test]
fn test_nested_data_field() {
    let decoder = JsonDecoder::with_field("$.result.items");
    let records = decoder.decode_value(&json!({
        "result": {"items": [{"id": "a"}]}
    }));

    assert_eq!(records, vec![json!({"id": "a"})]);
}

#[test]
fn test_missing_data_field_is_empty_page() {
    let decoder = JsonDecoder::with_field("data");
    let records = decoder.decode_value(&json!({"message": "nothing here"}));
    assert!(records.is_empty());
}

#[test]
fn test_data_field_on_array_body_is_empty_page() {
    let decoder = JsonDecoder::with_field("data");
    let records = decoder.decode_value(&json!([{"id": 1}]));
    assert!(records.is_empty());
}

#[test]
fn test_data_field_single_object() {
    let decoder = JsonDecoder::with_field("user");
    let records = decoder.decode_value(&json!({"user": {"id": "9"}}));
    assert_eq!(records, vec![json!({"id": "9"})]);
}

#[test]
fn test_data_field_accessor() {
    assert_eq!(JsonDecoder::new().data_field(), None);
    assert_eq!(JsonDecoder::with_field("data").data_field(), Some("data"));
}
