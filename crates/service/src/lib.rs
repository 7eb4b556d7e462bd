//! Domain layer for the grade store.
//! - `domain`: the `UserGrade` record and its wire decoding.
//! - `store`: the storage seam and the in-memory implementation.

pub mod errors;
pub mod domain;
pub mod store;

pub use domain::UserGrade;
pub use errors::ServiceError;
pub use store::{GradeStore, MemoryGradeStore};
