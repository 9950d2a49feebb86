//! Repository for the `jobs` table.

use sqlx::PgPool;
use polyseg_core::types::DbId;

use crate::models::job::{Job, SubmitJob};
use crate::models::status::JobStatus;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, job_type, status_id, submitted_by, parameters, error_message, \
    submitted_at, completed_at, created_at, updated_at";

/// Provides submit and query operations for background jobs.
pub struct JobRepo;

impl JobRepo {
    /// Create a new pending job. Returns immediately with the job row.
    pub async fn submit(pool: &PgPool, input: &SubmitJob) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (job_type, status_id, submitted_by, parameters) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(&input.job_type)
            .bind(JobStatus::Pending.id())
            .bind(input.submitted_by)
            .bind(&input.parameters)
            .fetch_one(pool)
            .await
    }

    /// Find a job by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List pending jobs of one type, oldest first.
    pub async fn list_pending(
        pool: &PgPool,
        job_type: &str,
        limit: i64,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE job_type = $1 AND status_id = $2 \
             ORDER BY submitted_at ASC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_type)
            .bind(JobStatus::Pending.id())
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
