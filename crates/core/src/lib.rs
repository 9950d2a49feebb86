//! Domain logic for polygon segmentation of pictures.
//!
//! No database access lives here; see `polyseg-db` for persistence.

pub mod error;
pub mod hashing;
pub mod importer;
pub mod picture;
pub mod polygon;
pub mod result;
pub mod reward;
pub mod shape;
pub mod storage;
pub mod submission;
pub mod types;
