use std::sync::Arc;

use bytes::Bytes;

use whispai::application::ports::{AudioStore, JobPublisher, JobRepository};
use whispai::application::services::{AudioSubmission, SubmissionError, SubmissionService};
use whispai::domain::{JobStatus, TranscriptionMode};

use crate::helpers::{EventLog, FakeAudioStore, FakeJobRepository, FakePublisher, event_log};

const MAX_BYTES: u64 = 1024;

struct Harness {
    events: EventLog,
    store: Arc<FakeAudioStore>,
    repository: Arc<FakeJobRepository>,
    publisher: Arc<FakePublisher>,
    service: SubmissionService,
}

fn harness(publisher: FakePublisher, store: FakeAudioStore, events: EventLog) -> Harness {
    let store = Arc::new(store);
    let repository = Arc::new(FakeJobRepository::with_events(Arc::clone(&events)));
    let publisher = Arc::new(publisher);
    let service = SubmissionService::new(
        Arc::clone(&store) as Arc<dyn AudioStore>,
        Arc::clone(&repository) as Arc<dyn JobRepository>,
        Arc::clone(&publisher) as Arc<dyn JobPublisher>,
        MAX_BYTES,
    );
    Harness {
        events,
        store,
        repository,
        publisher,
        service,
    }
}

fn default_harness() -> Harness {
    let events = event_log();
    harness(
        FakePublisher::with_events(Arc::clone(&events)),
        FakeAudioStore::with_events(Arc::clone(&events)),
        events,
    )
}

fn submission(filename: &str, data: &'static [u8]) -> AudioSubmission {
    AudioSubmission {
        owner_id: "owner-1".to_string(),
        filename: filename.to_string(),
        content_type: "audio/mpeg".to_string(),
        data: Bytes::from_static(data),
        mode: None,
        output_format: None,
        generate_llm_output: false,
    }
}

#[tokio::test]
async fn given_valid_upload_when_submitting_then_stores_creates_record_then_publishes() {
    let h = default_harness();

    let audio_id = h.service.submit(submission("Talk.MP3", b"ID3data")).await.unwrap();

    assert_eq!(
        *h.events.lock().unwrap(),
        vec!["store.put", "repo.create", "broker.publish"]
    );
    let job = h.repository.get(audio_id).await;
    assert_eq!(job.status, JobStatus::Processing);
    assert_eq!(job.language, "unknown");
    assert_eq!(job.output_format, "text");
    assert_eq!(job.object_name.as_str(), format!("{}.mp3", audio_id));
    assert!(h.store.contains(&job.object_name));

    let published = h.publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].audio_id, audio_id);
    assert_eq!(published[0].mode, TranscriptionMode::Auto);
    assert_eq!(published[0].object_name, job.object_name);
}

#[tokio::test]
async fn given_explicit_options_when_submitting_then_descriptor_carries_them() {
    let h = default_harness();
    let mut upload = submission("a.wav", b"RIFF");
    upload.mode = Some("fast".to_string());
    upload.output_format = Some("interview".to_string());
    upload.generate_llm_output = true;

    let audio_id = h.service.submit(upload).await.unwrap();

    let descriptor = &h.publisher.published()[0];
    assert_eq!(descriptor.mode, TranscriptionMode::Fast);
    assert_eq!(descriptor.output_format, "interview");
    assert!(h.repository.get(audio_id).await.generate_llm_output);
}

#[tokio::test]
async fn given_broker_down_when_submitting_then_broker_unavailable_after_record_exists() {
    let events = event_log();
    let h = harness(
        FakePublisher::default().unavailable(),
        FakeAudioStore::with_events(Arc::clone(&events)),
        events,
    );

    let result = h.service.submit(submission("a.ogg", b"OggS")).await;

    assert!(matches!(result, Err(SubmissionError::BrokerUnavailable(_))));
    assert_eq!(*h.events.lock().unwrap(), vec!["store.put", "repo.create"]);
}

#[tokio::test]
async fn given_unsupported_extension_when_submitting_then_rejected_before_storage() {
    let h = default_harness();

    let result = h.service.submit(submission("notes.txt", b"hello")).await;

    assert!(matches!(result, Err(SubmissionError::UnsupportedFileType(_))));
    assert!(h.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn given_unknown_output_format_when_submitting_then_rejected() {
    let h = default_harness();
    let mut upload = submission("a.m4a", b"ftyp");
    upload.output_format = Some("haiku".to_string());

    let result = h.service.submit(upload).await;

    assert!(matches!(result, Err(SubmissionError::InvalidOutputFormat(f)) if f == "haiku"));
}

#[tokio::test]
async fn given_oversized_or_empty_file_when_submitting_then_rejected() {
    let h = default_harness();
    static LARGE: [u8; 2048] = [0u8; 2048];

    let too_large = h.service.submit(submission("a.wav", &LARGE)).await;
    let empty = h.service.submit(submission("a.wav", b"")).await;

    assert!(matches!(
        too_large,
        Err(SubmissionError::TooLarge {
            size_bytes: 2048,
            max_bytes: MAX_BYTES
        })
    ));
    assert!(matches!(empty, Err(SubmissionError::EmptyFile)));
    assert_eq!(h.repository.writes(), 0);
}

#[tokio::test]
async fn given_storage_failure_when_submitting_then_no_record_is_created() {
    let events = event_log();
    let h = harness(
        FakePublisher::with_events(Arc::clone(&events)),
        FakeAudioStore::new().failing_puts(),
        events,
    );

    let result = h.service.submit(submission("a.wav", b"RIFF")).await;

    assert!(matches!(result, Err(SubmissionError::Storage(_))));
    assert_eq!(h.repository.writes(), 0);
    assert!(h.publisher.published().is_empty());
}
