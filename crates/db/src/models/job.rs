//! Background job models.
//!
//! Jobs are queued rows consumed by an out-of-process worker. This crate
//! only submits them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use polyseg_core::shape::ShapeType;
use polyseg_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// Job type for triangulating newly submitted shapes.
pub const JOB_TYPE_TRIANGULATE: &str = "triangulate_submitted_shapes";

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub job_type: String,
    pub status_id: StatusId,
    pub submitted_by: DbId,
    pub parameters: serde_json::Value,
    pub error_message: Option<String>,
    pub submitted_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a new job.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitJob {
    pub job_type: String,
    pub submitted_by: DbId,
    pub parameters: serde_json::Value,
}

/// Parameters of a triangulation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangulationJob {
    pub photo_id: DbId,
    pub user_id: DbId,
    pub mturk_assignment: Option<String>,
    pub shape_type: ShapeType,
    pub shape_ids: Vec<DbId>,
}

impl TriangulationJob {
    pub fn into_submit_job(self) -> Result<SubmitJob, serde_json::Error> {
        let submitted_by = self.user_id;
        Ok(SubmitJob {
            job_type: JOB_TYPE_TRIANGULATE.to_string(),
            submitted_by,
            parameters: serde_json::to_value(self)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangulation_job_parameters() {
        let job = TriangulationJob {
            photo_id: 7,
            user_id: 2,
            mturk_assignment: Some("A1".into()),
            shape_type: ShapeType::Object,
            shape_ids: vec![10, 11],
        };
        let submit = job.clone().into_submit_job().unwrap();
        assert_eq!(submit.job_type, JOB_TYPE_TRIANGULATE);
        assert_eq!(submit.submitted_by, 2);
        assert_eq!(submit.parameters["shape_type"], "object");
        assert_eq!(submit.parameters["shape_ids"], serde_json::json!([10, 11]));

        let back: TriangulationJob = serde_json::from_value(submit.parameters).unwrap();
        assert_eq!(back, job);
    }
}
