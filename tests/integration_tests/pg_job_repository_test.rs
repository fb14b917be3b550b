use whispai::application::ports::{JobRepository, RepositoryError};
use whispai::domain::{AudioId, JobFieldsUpdate, JobStatus, ObjectName};

use crate::helpers::{OWNER, TestPostgres, sample_job};

fn new_object() -> ObjectName {
    ObjectName::for_upload(&AudioId::new(), "wav")
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_new_job_when_creating_and_finding_then_record_roundtrips() {
    let test_pg = TestPostgres::new().await;
    let job = sample_job(&new_object(), "summary", true);

    test_pg.job_repository.create(&job).await.unwrap();
    let found = test_pg
        .job_repository
        .find(job.id)
        .await
        .unwrap()
        .expect("job not found");

    assert_eq!(found.id, job.id);
    assert_eq!(found.object_name, job.object_name);
    assert_eq!(found.status, JobStatus::Processing);
    assert_eq!(found.language, "unknown");
    assert_eq!(found.output_format, "summary");
    assert!(found.generate_llm_output);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_results_when_completing_then_fields_and_status_are_persisted() {
    let test_pg = TestPostgres::new().await;
    let job = sample_job(&new_object(), "text", false);
    test_pg.job_repository.create(&job).await.unwrap();

    test_pg
        .job_repository
        .update_fields(
            job.id,
            &JobFieldsUpdate {
                transcription: Some("hello".to_string()),
                output_text: Some("hello".to_string()),
                language: Some("en".to_string()),
                model_used: Some("small".to_string()),
                llm_model_used: Some(None),
                duration: Some(3.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    test_pg
        .job_repository
        .set_status(job.id, JobStatus::Completed, None)
        .await
        .unwrap();

    let found = test_pg.job_repository.find(job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Completed);
    assert_eq!(found.transcription.as_deref(), Some("hello"));
    assert_eq!(found.language, "en");
    assert_eq!(found.duration, Some(3.5));
    assert_eq!(found.llm_model_used, None);
    assert!(found.satisfies_status_invariant());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_no_transcription_when_marking_completed_then_constraint_rejects() {
    let test_pg = TestPostgres::new().await;
    let job = sample_job(&new_object(), "text", false);
    test_pg.job_repository.create(&job).await.unwrap();

    let result = test_pg
        .job_repository
        .set_status(job.id, JobStatus::Completed, None)
        .await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_failed_job_when_status_reset_to_completed_then_error_is_cleared() {
    let test_pg = TestPostgres::new().await;
    let job = sample_job(&new_object(), "text", false);
    test_pg.job_repository.create(&job).await.unwrap();

    test_pg
        .job_repository
        .set_status(job.id, JobStatus::Failed, Some("fetch failed"))
        .await
        .unwrap();
    test_pg
        .job_repository
        .update_fields(
            job.id,
            &JobFieldsUpdate {
                transcription: Some("retry worked".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    test_pg
        .job_repository
        .set_status(job.id, JobStatus::Completed, None)
        .await
        .unwrap();

    let found = test_pg.job_repository.find(job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Completed);
    assert_eq!(found.error_message, None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_unknown_id_when_updating_then_returns_not_found() {
    let test_pg = TestPostgres::new().await;

    let result = test_pg
        .job_repository
        .set_status(AudioId::new(), JobStatus::Failed, Some("x"))
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_jobs_of_two_owners_when_listing_then_only_owner_jobs_are_returned() {
    let test_pg = TestPostgres::new().await;
    let mine = sample_job(&new_object(), "text", false);
    let mut theirs = sample_job(&new_object(), "text", false);
    theirs.owner_id = "other".to_string();
    test_pg.job_repository.create(&mine).await.unwrap();
    test_pg.job_repository.create(&theirs).await.unwrap();

    let listed = test_pg.job_repository.list_by_owner(OWNER).await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mine.id);

    test_pg.job_repository.delete(mine.id).await.unwrap();
    assert!(test_pg.job_repository.find(mine.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_completed_job_when_recording_failure_then_results_are_reset() {
    let test_pg = TestPostgres::new().await;
    let job = sample_job(&new_object(), "summary", true);
    test_pg.job_repository.create(&job).await.unwrap();
    test_pg
        .job_repository
        .update_fields(
            job.id,
            &JobFieldsUpdate {
                transcription: Some("first run".to_string()),
                output_text: Some("summary of first run".to_string()),
                language: Some("en".to_string()),
                model_used: Some("small".to_string()),
                llm_model_used: Some(Some("summary".to_string())),
                duration: Some(4.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    test_pg
        .job_repository
        .set_status(job.id, JobStatus::Completed, None)
        .await
        .unwrap();

    test_pg
        .job_repository
        .record_failure(job.id, "fetch failed")
        .await
        .unwrap();

    let found = test_pg.job_repository.find(job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Failed);
    assert_eq!(found.error_message.as_deref(), Some("fetch failed"));
    assert_eq!(found.transcription, None);
    assert_eq!(found.output_text, None);
    assert_eq!(found.language, "unknown");
    assert_eq!(found.model_used, None);
    assert_eq!(found.llm_model_used, None);
    assert_eq!(found.duration, None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_deleted_job_when_recording_failure_then_returns_not_found() {
    let test_pg = TestPostgres::new().await;
    let job = sample_job(&new_object(), "text", false);
    test_pg.job_repository.create(&job).await.unwrap();
    test_pg.job_repository.delete(job.id).await.unwrap();

    let result = test_pg.job_repository.record_failure(job.id, "x").await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_row_with_negative_size_when_finding_then_returns_query_failed() {
    let test_pg = TestPostgres::new().await;
    let job = sample_job(&new_object(), "text", false);
    test_pg.job_repository.create(&job).await.unwrap();
    sqlx::query("UPDATE audio_jobs SET size_bytes = -1 WHERE id = $1")
        .bind(job.id.as_uuid())
        .execute(&test_pg.pool)
        .await
        .unwrap();

    let result = test_pg.job_repository.find(job.id).await;

    assert!(matches!(result, Err(RepositoryError::QueryFailed(_))));
}
