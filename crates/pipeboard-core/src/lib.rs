//! Projection model and reconciliation engine for the pipeline dashboard.
//!
//! The snapshot seeds the projection once; push events are normalized and
//! upserted against it. Transport (HTTP, websocket) lives in
//! `integration-gitlab`; this crate is pure state.

pub mod engine;
pub mod identifiers;
pub mod model;
pub mod push;
pub mod status;

pub use engine::{ApplyOutcome, EngineLifecycle, ReconcileEngine, SeedError};
pub use identifiers::{PipelineId, ProjectId};
pub use model::{CommitInfo, PipelineRecord, ProjectRecord, Projection};
pub use push::{NormalizeError, PipelinePush, PushAttributes, PushAuthor, PushCommit, PushProject};
pub use status::PipelineStatus;
