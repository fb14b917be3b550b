use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{
    AudioId, AudioJob, JobFieldsUpdate, JobStatus, ObjectName, UNKNOWN_LANGUAGE,
};

const SELECT_COLUMNS: &str = r#"
    SELECT id, owner_id, filename, content_type, object_name, size_bytes, status,
           output_format, generate_llm_output, transcription, output_text, language,
           model_used, llm_model_used, duration, error_message, created_at, updated_at
    FROM audio_jobs
"#;

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23514") => {
            RepositoryError::ConstraintViolation(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            RepositoryError::ConstraintViolation(db.message().to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::ConnectionFailed(e.to_string())
        }
        _ => RepositoryError::QueryFailed(e.to_string()),
    }
}

fn row_to_job(row: &PgRow) -> Result<AudioJob, RepositoryError> {
    let get_err = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());

    let status: String = row.try_get("status").map_err(get_err)?;
    let status = status
        .parse::<JobStatus>()
        .map_err(RepositoryError::QueryFailed)?;
    let size_bytes: i64 = row.try_get("size_bytes").map_err(get_err)?;
    let object_name: String = row.try_get("object_name").map_err(get_err)?;
    let id: Uuid = row.try_get("id").map_err(get_err)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(get_err)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(get_err)?;

    Ok(AudioJob {
        id: AudioId::from_uuid(id),
        owner_id: row.try_get("owner_id").map_err(get_err)?,
        filename: row.try_get("filename").map_err(get_err)?,
        content_type: row.try_get("content_type").map_err(get_err)?,
        object_name: ObjectName::from_raw(object_name),
        size_bytes: u64::try_from(size_bytes).map_err(|_| {
            RepositoryError::QueryFailed(format!("negative size_bytes {}", size_bytes))
        })?,
        status,
        output_format: row.try_get("output_format").map_err(get_err)?,
        generate_llm_output: row.try_get("generate_llm_output").map_err(get_err)?,
        transcription: row.try_get("transcription").map_err(get_err)?,
        output_text: row.try_get("output_text").map_err(get_err)?,
        language: row.try_get("language").map_err(get_err)?,
        model_used: row.try_get("model_used").map_err(get_err)?,
        llm_model_used: row.try_get("llm_model_used").map_err(get_err)?,
        duration: row.try_get("duration").map_err(get_err)?,
        error_message: row.try_get("error_message").map_err(get_err)?,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(audio_id = %job.id))]
    async fn create(&self, job: &AudioJob) -> Result<(), RepositoryError> {
        let size_bytes = i64::try_from(job.size_bytes)
            .map_err(|e| RepositoryError::ConstraintViolation(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO audio_jobs (
                id, owner_id, filename, content_type, object_name, size_bytes, status,
                output_format, generate_llm_output, transcription, output_text, language,
                model_used, llm_model_used, duration, error_message, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(&job.owner_id)
        .bind(&job.filename)
        .bind(&job.content_type)
        .bind(job.object_name.as_str())
        .bind(size_bytes)
        .bind(job.status.as_str())
        .bind(&job.output_format)
        .bind(job.generate_llm_output)
        .bind(&job.transcription)
        .bind(&job.output_text)
        .bind(&job.language)
        .bind(&job.model_used)
        .bind(&job.llm_model_used)
        .bind(job.duration)
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(audio_id = %id))]
    async fn find(&self, id: AudioId) -> Result<Option<AudioJob>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_job).transpose()
    }

    #[instrument(skip(self, fields), fields(audio_id = %id))]
    async fn update_fields(
        &self,
        id: AudioId,
        fields: &JobFieldsUpdate,
    ) -> Result<(), RepositoryError> {
        let (set_llm_model, llm_model_used) = match &fields.llm_model_used {
            Some(value) => (true, value.clone()),
            None => (false, None),
        };

        let result = sqlx::query(
            r#"
            UPDATE audio_jobs
            SET transcription = COALESCE($1, transcription),
                output_text = COALESCE($2, output_text),
                output_format = COALESCE($3, output_format),
                language = COALESCE($4, language),
                model_used = COALESCE($5, model_used),
                llm_model_used = CASE WHEN $6 THEN $7 ELSE llm_model_used END,
                duration = COALESCE($8, duration),
                updated_at = $9
            WHERE id = $10
            "#,
        )
        .bind(&fields.transcription)
        .bind(&fields.output_text)
        .bind(&fields.output_format)
        .bind(&fields.language)
        .bind(&fields.model_used)
        .bind(set_llm_model)
        .bind(llm_model_used)
        .bind(fields.duration)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self, error_message), fields(audio_id = %id, status = %status))]
    async fn set_status(
        &self,
        id: AudioId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE audio_jobs
            SET status = $1, error_message = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(status.as_str())
        .bind(error_message)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self, error_message), fields(audio_id = %id))]
    async fn record_failure(
        &self,
        id: AudioId,
        error_message: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE audio_jobs
            SET status = $1, error_message = $2,
                transcription = NULL, output_text = NULL, language = $3,
                model_used = NULL, llm_model_used = NULL, duration = NULL,
                updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(JobStatus::Failed.as_str())
        .bind(error_message)
        .bind(UNKNOWN_LANGUAGE)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<AudioJob>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{} WHERE owner_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_job).collect()
    }

    #[instrument(skip(self), fields(audio_id = %id))]
    async fn delete(&self, id: AudioId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM audio_jobs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
