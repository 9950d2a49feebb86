//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod job_repo;
pub mod picture_repo;
pub mod polygon_result_repo;
pub mod submitted_shape_repo;

pub use job_repo::JobRepo;
pub use picture_repo::PictureRepo;
pub use polygon_result_repo::PolygonResultRepo;
pub use submitted_shape_repo::SubmittedShapeRepo;
