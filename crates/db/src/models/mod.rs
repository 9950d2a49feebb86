//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Where the client renders the record, a slim `*Entry` summary

pub mod job;
pub mod picture;
pub mod polygon_result;
pub mod status;
pub mod submitted_shape;
