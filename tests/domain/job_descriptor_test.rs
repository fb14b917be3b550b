use whispai::domain::{JobDescriptor, TranscriptionMode};

const AUDIO_ID: &str = "6f1c2b9e-0d4a-4e55-9f43-2a7c1d0b8e11";

#[test]
fn given_minimal_message_when_decoding_then_defaults_apply() {
    let body = format!(
        r#"{{"audio_id":"{AUDIO_ID}","object_name":"{AUDIO_ID}.wav"}}"#
    );

    let descriptor = JobDescriptor::from_json(body.as_bytes()).unwrap();

    assert_eq!(descriptor.audio_id.to_string(), AUDIO_ID);
    assert_eq!(descriptor.object_name.as_str(), format!("{AUDIO_ID}.wav"));
    assert_eq!(descriptor.mode, TranscriptionMode::Accurate);
    assert_eq!(descriptor.output_format, "text");
}

#[test]
fn given_unknown_mode_when_decoding_then_auto_is_used() {
    let body = format!(
        r#"{{"audio_id":"{AUDIO_ID}","object_name":"a.mp3","mode":"whatever","output_format":"summary"}}"#
    );

    let descriptor = JobDescriptor::from_json(body.as_bytes()).unwrap();

    assert_eq!(descriptor.mode, TranscriptionMode::Auto);
    assert_eq!(descriptor.output_format, "summary");
}

#[test]
fn given_missing_object_name_when_decoding_then_fails() {
    let body = format!(r#"{{"audio_id":"{AUDIO_ID}"}}"#);
    assert!(JobDescriptor::from_json(body.as_bytes()).is_err());
}

#[test]
fn given_invalid_audio_id_when_decoding_then_fails() {
    let body = r#"{"audio_id":"not-a-uuid","object_name":"a.wav"}"#;
    assert!(JobDescriptor::from_json(body.as_bytes()).is_err());
}

#[test]
fn given_non_json_body_when_decoding_then_fails() {
    assert!(JobDescriptor::from_json(b"\xff\xfe garbage").is_err());
}

#[test]
fn given_descriptor_when_encoding_then_wire_fields_are_lowercase_strings() {
    let body = format!(r#"{{"audio_id":"{AUDIO_ID}","object_name":"x.ogg","mode":"fast"}}"#);
    let descriptor = JobDescriptor::from_json(body.as_bytes()).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&descriptor.to_json().unwrap()).unwrap();

    assert_eq!(value["audio_id"], AUDIO_ID);
    assert_eq!(value["object_name"], "x.ogg");
    assert_eq!(value["mode"], "fast");
    assert_eq!(value["output_format"], "text");
}
