//! Worker submission workflow.
//!
//! Validates a raw HIT submission, get-or-creates one submitted shape per
//! polygon, and queues triangulation for the shapes that are new. Storage
//! and the job queue sit behind traits so the workflow can run against
//! PostgreSQL or an in-memory double.

use std::collections::HashMap;

use async_trait::async_trait;
use polyseg_core::submission::{validate_submission, ContentKey, SubmissionPayload, SubmitError};
use polyseg_core::types::DbId;
use sqlx::PgPool;

use crate::models::job::TriangulationJob;
use crate::models::picture::Picture;
use crate::models::submitted_shape::{CreateSubmittedShape, SubmittedShape};
use crate::repositories::{JobRepo, PictureRepo, SubmittedShapeRepo};

/// Newly created shapes keyed by the photo they belong to.
pub type SubmitOutcome = HashMap<ContentKey, Vec<SubmittedShape>>;

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Persistence for submitted shapes.
#[async_trait]
pub trait ShapeStore: Send + Sync {
    /// Atomically get-or-create every shape. Returns each row with `true`
    /// when it was created by this call. Either all shapes are persisted or
    /// none are.
    async fn get_or_create_shapes(
        &self,
        shapes: &[CreateSubmittedShape],
    ) -> Result<Vec<(SubmittedShape, bool)>, SubmitError>;
}

/// Fire-and-forget queue for triangulation work.
#[async_trait]
pub trait TriangulationQueue: Send + Sync {
    async fn enqueue(&self, job: TriangulationJob) -> Result<(), SubmitError>;
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Add new submitted shapes from a HIT after the worker clicks submit.
///
/// Only the first picture in `hit_contents` is processed. Nothing is
/// persisted unless every polygon validates. Re-submitting identical
/// polygons creates nothing and queues nothing.
pub async fn mturk_submit<S, Q>(
    store: &S,
    queue: &Q,
    user_id: DbId,
    hit_contents: &[Picture],
    payload: &SubmissionPayload,
    experiment_slug: &str,
) -> Result<SubmitOutcome, SubmitError>
where
    S: ShapeStore + ?Sized,
    Q: TriangulationQueue + ?Sized,
{
    let photo_ids: Vec<DbId> = hit_contents.iter().map(|p| p.id).collect();
    let submission = validate_submission(&photo_ids, payload, experiment_slug)?;

    let inputs: Vec<CreateSubmittedShape> = submission
        .shapes
        .iter()
        .map(|shape| CreateSubmittedShape::from_validated(user_id, &submission, shape))
        .collect();

    let new_shapes: Vec<SubmittedShape> = store
        .get_or_create_shapes(&inputs)
        .await?
        .into_iter()
        .filter_map(|(shape, created)| created.then_some(shape))
        .collect();

    tracing::info!(
        photo_id = submission.photo_id,
        user_id,
        submitted = inputs.len(),
        created = new_shapes.len(),
        shape_type = %submission.shape_type,
        "Shapes submitted",
    );

    if new_shapes.is_empty() {
        return Ok(HashMap::new());
    }

    let job = TriangulationJob {
        photo_id: submission.photo_id,
        user_id,
        mturk_assignment: submission.mturk_assignment.clone(),
        shape_type: submission.shape_type,
        shape_ids: new_shapes.iter().map(|s| s.id).collect(),
    };
    if let Err(e) = queue.enqueue(job).await {
        tracing::error!(
            photo_id = submission.photo_id,
            error = %e,
            "Failed to queue triangulation",
        );
    }

    Ok(HashMap::from([(
        ContentKey::picture(submission.photo_id),
        new_shapes,
    )]))
}

/// Load the pictures a HIT refers to, in the given order.
pub async fn load_hit_contents(
    pool: &PgPool,
    picture_ids: &[DbId],
) -> Result<Vec<Picture>, SubmitError> {
    let mut pictures = Vec::with_capacity(picture_ids.len());
    for &id in picture_ids {
        let picture = PictureRepo::find_by_id(pool, id)
            .await
            .map_err(|e| SubmitError::Storage(e.to_string()))?
            .ok_or(SubmitError::NotFound {
                entity: "picture",
                id,
            })?;
        pictures.push(picture);
    }
    Ok(pictures)
}

// ---------------------------------------------------------------------------
// PostgreSQL implementations
// ---------------------------------------------------------------------------

/// [`ShapeStore`] backed by the `submitted_shapes` table.
#[derive(Debug, Clone)]
pub struct PgShapeStore {
    pool: PgPool,
}

impl PgShapeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShapeStore for PgShapeStore {
    async fn get_or_create_shapes(
        &self,
        shapes: &[CreateSubmittedShape],
    ) -> Result<Vec<(SubmittedShape, bool)>, SubmitError> {
        SubmittedShapeRepo::get_or_create_batch(&self.pool, shapes)
            .await
            .map_err(|e| SubmitError::Storage(e.to_string()))
    }
}

/// [`TriangulationQueue`] backed by the `jobs` table.
#[derive(Debug, Clone)]
pub struct PgJobQueue {
    pool: PgPool,
}

impl PgJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TriangulationQueue for PgJobQueue {
    async fn enqueue(&self, job: TriangulationJob) -> Result<(), SubmitError> {
        let submit = job
            .into_submit_job()
            .map_err(|e| SubmitError::Queue(e.to_string()))?;
        let row = JobRepo::submit(&self.pool, &submit)
            .await
            .map_err(|e| SubmitError::Queue(e.to_string()))?;
        tracing::debug!(job_id = row.id, job_type = %row.job_type, "Job queued");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use polyseg_core::shape::ShapeType;

    use super::*;

    /// In-memory store enforcing the same identity key as the unique index.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<SubmittedShape>>,
    }

    #[async_trait]
    impl ShapeStore for MemoryStore {
        async fn get_or_create_shapes(
            &self,
            shapes: &[CreateSubmittedShape],
        ) -> Result<Vec<(SubmittedShape, bool)>, SubmitError> {
            let mut rows = self.rows.lock().unwrap();
            let mut out = Vec::new();
            for s in shapes {
                let existing = rows.iter().find(|r| {
                    r.picture_id == s.picture_id
                        && r.user_id == s.user_id
                        && r.mturk_assignment == s.mturk_assignment
                        && r.time_ms == s.time_ms
                        && r.time_active_ms == s.time_active_ms
                        && r.vertices == s.vertices
                        && r.num_vertices == s.num_vertices
                        && r.shape_type == s.shape_type.code()
                });
                match existing {
                    Some(r) => out.push((r.clone(), false)),
                    None => {
                        let now = chrono::Utc::now();
                        let row = SubmittedShape {
                            id: rows.len() as DbId + 1,
                            picture_id: s.picture_id,
                            user_id: s.user_id,
                            mturk_assignment: s.mturk_assignment.clone(),
                            time_ms: s.time_ms,
                            time_active_ms: s.time_active_ms,
                            vertices: s.vertices.clone(),
                            num_vertices: s.num_vertices,
                            shape_type: s.shape_type.code().to_string(),
                            created_at: now,
                            updated_at: now,
                        };
                        rows.push(row.clone());
                        out.push((row, true));
                    }
                }
            }
            Ok(out)
        }
    }

    #[derive(Default)]
    struct RecordingQueue {
        jobs: Mutex<Vec<TriangulationJob>>,
    }

    #[async_trait]
    impl TriangulationQueue for RecordingQueue {
        async fn enqueue(&self, job: TriangulationJob) -> Result<(), SubmitError> {
            self.jobs.lock().unwrap().push(job);
            Ok(())
        }
    }

    struct FailingQueue;

    #[async_trait]
    impl TriangulationQueue for FailingQueue {
        async fn enqueue(&self, _job: TriangulationJob) -> Result<(), SubmitError> {
            Err(SubmitError::Queue("broker unavailable".into()))
        }
    }

    fn picture(id: DbId) -> Picture {
        let now = chrono::Utc::now();
        Picture {
            id,
            file_path: format!("pictures/00/{id}.jpg"),
            name: format!("{id}.jpg"),
            content_hash: "00".repeat(32),
            created_at: now,
            updated_at: now,
        }
    }

    fn payload(polygons: Vec<Vec<f64>>) -> SubmissionPayload {
        let n = polygons.len();
        SubmissionPayload {
            results: HashMap::from([("1".to_string(), polygons)]),
            time_ms: HashMap::from([("1".to_string(), vec![2000; n])]),
            time_active_ms: HashMap::from([("1".to_string(), vec![1500; n])]),
            version: "1.0".into(),
            mturk_assignment: Some("ASSIGN".into()),
        }
    }

    fn triangle() -> Vec<f64> {
        vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0]
    }

    #[tokio::test]
    async fn creates_material_shape_and_queues_job() {
        let store = MemoryStore::default();
        let queue = RecordingQueue::default();

        let out = mturk_submit(
            &store,
            &queue,
            42,
            &[picture(1)],
            &payload(vec![triangle()]),
            "segment_material",
        )
        .await
        .unwrap();

        let shapes = &out[&ContentKey::picture(1)];
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].num_vertices, 3);
        assert_eq!(shapes[0].vertices, "0,0,1,0,1,1");
        assert_eq!(shapes[0].shape_type().unwrap(), ShapeType::Material);
        assert_eq!(shapes[0].user_id, 42);

        let jobs = queue.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].photo_id, 1);
        assert_eq!(jobs[0].shape_type, ShapeType::Material);
        assert_eq!(jobs[0].shape_ids, vec![shapes[0].id]);
        assert_eq!(jobs[0].mturk_assignment.as_deref(), Some("ASSIGN"));
    }

    #[tokio::test]
    async fn resubmission_is_idempotent() {
        let store = MemoryStore::default();
        let queue = RecordingQueue::default();
        let p = payload(vec![triangle()]);

        mturk_submit(&store, &queue, 42, &[picture(1)], &p, "segment_object")
            .await
            .unwrap();
        let second = mturk_submit(&store, &queue, 42, &[picture(1)], &p, "segment_object")
            .await
            .unwrap();

        assert!(second.is_empty());
        assert_eq!(store.rows.lock().unwrap().len(), 1);
        assert_eq!(queue.jobs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn partially_new_batch_only_reports_new_shapes() {
        let store = MemoryStore::default();
        let queue = RecordingQueue::default();

        mturk_submit(
            &store,
            &queue,
            42,
            &[picture(1)],
            &payload(vec![triangle()]),
            "segment_object",
        )
        .await
        .unwrap();

        let square = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        let out = mturk_submit(
            &store,
            &queue,
            42,
            &[picture(1)],
            &payload(vec![triangle(), square]),
            "segment_object",
        )
        .await
        .unwrap();

        let shapes = &out[&ContentKey::picture(1)];
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].num_vertices, 4);
        assert_eq!(queue.jobs.lock().unwrap()[1].shape_ids, vec![shapes[0].id]);
    }

    #[tokio::test]
    async fn odd_polygon_persists_nothing() {
        let store = MemoryStore::default();
        let queue = RecordingQueue::default();

        let result = mturk_submit(
            &store,
            &queue,
            42,
            &[picture(1)],
            &payload(vec![triangle(), vec![0.0, 0.0, 1.0, 0.0, 1.0]]),
            "segment_material",
        )
        .await;

        assert_matches!(result, Err(SubmitError::OddVertexCount { index: 1, count: 5 }));
        assert!(store.rows.lock().unwrap().is_empty());
        assert!(queue.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn version_mismatch_is_rejected() {
        let store = MemoryStore::default();
        let queue = RecordingQueue::default();
        let mut p = payload(vec![triangle()]);
        p.version = "0.9".into();

        let result = mturk_submit(&store, &queue, 42, &[picture(1)], &p, "segment_material").await;
        assert_matches!(result, Err(SubmitError::VersionMismatch(_)));
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_slug_is_rejected() {
        let store = MemoryStore::default();
        let queue = RecordingQueue::default();

        let result = mturk_submit(
            &store,
            &queue,
            42,
            &[picture(1)],
            &payload(vec![triangle()]),
            "label_material",
        )
        .await;
        assert_matches!(result, Err(SubmitError::UnknownSlug(_)));
    }

    #[tokio::test]
    async fn queue_failure_does_not_fail_submission() {
        let store = MemoryStore::default();

        let out = mturk_submit(
            &store,
            &FailingQueue,
            42,
            &[picture(1)],
            &payload(vec![triangle()]),
            "segment_material",
        )
        .await
        .unwrap();

        assert_eq!(out[&ContentKey::picture(1)].len(), 1);
    }
}
