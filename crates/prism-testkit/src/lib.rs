//! # prism-testkit
//!
//! In-memory repository implementations and mock clients shared by the
//! workspace test suites. Not intended for production use: storage is a
//! plain `Vec` behind a mutex and lookups are linear scans.

mod jobs;
mod model;
mod repos;

pub use jobs::MockJobRunner;
pub use model::MockModelClient;
pub use repos::{
    InMemoryConfigRepo, InMemoryInsightRepo, InMemoryResultRepo, InMemoryTransformationRepo,
};
