//! Tests for lenient payload deserializers.

use super::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Sample {
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, deserialize_with = "datetime")]
    at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "id_string")]
    id: String,
}

fn sample(json: &str) -> Sample {
    serde_json::from_str(json).expect("sample decodes")
}

#[test]
fn test_nullable_turns_null_and_missing_into_default() {
    assert_eq!(sample(r#"{"name":null}"#).name, "");
    assert_eq!(sample(r#"{}"#).name, "");
    assert_eq!(sample(r#"{"name":"x"}"#).name, "x");
}

#[test]
fn test_datetime_accepts_provider_formats() {
    let expected = Utc.with_ymd_and_hms(2019, 4, 30, 13, 54, 46).single();

    assert_eq!(sample(r#"{"at":"2019-04-30T13:54:46Z"}"#).at, expected);
    assert_eq!(sample(r#"{"at":"2019-04-30T15:54:46+02:00"}"#).at, expected);
    assert_eq!(sample(r#"{"at":"2019-04-30 13:54:46 UTC"}"#).at, expected);
    assert_eq!(sample(r#"{"at":"2019-04-30 21:54:46 +0800"}"#).at, expected);
    assert_eq!(sample(r#"{"at":"2019-04-30T23:54:46.000+1000"}"#).at, expected);
    assert_eq!(sample(r#"{"at":1556632486}"#).at, expected);
    assert_eq!(sample(r#"{"at":1556632486000}"#).at, expected);
}

#[test]
fn test_datetime_is_none_for_unusable_values() {
    assert_eq!(sample(r#"{"at":null}"#).at, None);
    assert_eq!(sample(r#"{"at":"yesterday"}"#).at, None);
    assert_eq!(sample(r#"{"at":0}"#).at, None);
    assert_eq!(sample(r#"{}"#).at, None);
}

#[test]
fn test_id_string_accepts_numbers_and_strings() {
    assert_eq!(sample(r#"{"id":42}"#).id, "42");
    assert_eq!(sample(r#"{"id":"abc"}"#).id, "abc");
    assert_eq!(sample(r#"{"id":null}"#).id, "");
}
