use whispai::domain::{AudioId, ObjectName, audio_extension};

#[test]
fn given_audio_id_when_naming_upload_then_name_is_id_with_extension() {
    let id = AudioId::new();
    let name = ObjectName::for_upload(&id, "mp3");

    assert_eq!(name.as_str(), format!("{}.mp3", id));
    assert_eq!(name.extension(), Some("mp3"));
}

#[test]
fn given_supported_filenames_when_extracting_extension_then_lowercased() {
    assert_eq!(audio_extension("Meeting.WAV").as_deref(), Some("wav"));
    assert_eq!(audio_extension("a.b.m4a").as_deref(), Some("m4a"));
    assert_eq!(audio_extension("voice.ogg").as_deref(), Some("ogg"));
}

#[test]
fn given_unsupported_filenames_when_extracting_extension_then_none() {
    assert_eq!(audio_extension("notes.txt"), None);
    assert_eq!(audio_extension("noextension"), None);
    assert_eq!(audio_extension("video.mp4"), None);
}

#[test]
fn given_raw_name_without_extension_when_reading_extension_then_none() {
    assert_eq!(ObjectName::from_raw("blob").extension(), None);
}
