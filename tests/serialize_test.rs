//! Serialization of value types (requires the `serialize` feature).

#![cfg(feature = "serialize")]

mod common;

use avview::{ChromaSubsampling, Discard, FormatContext, Rational, StreamInfo};

#[test]
fn rational_serializes_as_fields() {
    let json = serde_json::to_value(Rational::new(30000, 1001)).unwrap();
    assert_eq!(json, serde_json::json!({ "num": 30000, "den": 1001 }));
}

#[test]
fn discard_uses_snake_case() {
    assert_eq!(serde_json::to_string(&Discard::NonKey).unwrap(), "\"non_key\"");
    let parsed: Discard = serde_json::from_str("\"all\"").unwrap();
    assert_eq!(parsed, Discard::All);
}

#[test]
fn subsampling_round_trips() {
    let json = serde_json::to_string(&ChromaSubsampling::Yuv420).unwrap();
    let back: ChromaSubsampling = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ChromaSubsampling::Yuv420);
}

#[test]
fn stream_info_round_trips() {
    common::init();
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_wav(dir.path(), 16_000, 1, 1600);
    let ctx = FormatContext::open(&path).unwrap();
    let info = ctx.stream(0).unwrap().info();

    let json = serde_json::to_string(&info).unwrap();
    let back: StreamInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(back, info);
    assert_eq!(back.time_base, Rational::new(1, 16_000));
}
