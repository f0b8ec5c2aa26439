use thiserror::Error;

use crate::identifiers::ProjectId;
use crate::model::{PipelineRecord, Projection};

/// Lifecycle of the owned projection. Events that arrive while
/// `Uninitialized` are buffered and replayed once the snapshot seeds the
/// engine; after `Failed` they are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineLifecycle {
    Uninitialized,
    Ready,
    Failed { message: String },
}

/// What `apply_event` did with one normalized event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Existing pipeline updated in place; display order untouched.
    Updated,
    /// New pipeline inserted; the project's pipelines were re-sorted.
    Inserted,
    /// Snapshot not applied yet; event held for replay.
    Buffered,
    /// Snapshot fetch failed; event discarded.
    Dropped,
    /// No project with this id exists; event discarded. Projects are only
    /// created via the snapshot, never from an event.
    UnknownProject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("projection is already seeded; seed replaces wholesale and is never merged")]
    AlreadySeeded,
    #[error("projection already failed: {0}")]
    AlreadyFailed(String),
}

/// Owns the authoritative projection. Single mutation point: the snapshot
/// seeds it once, every push event is applied as an upsert, and readers only
/// ever get defensive copies via `view`.
#[derive(Debug, Default)]
pub struct ReconcileEngine {
    lifecycle: EngineLifecycle,
    projection: Projection,
    pending: Vec<(ProjectId, PipelineRecord)>,
}

impl Default for EngineLifecycle {
    fn default() -> Self {
        Self::Uninitialized
    }
}

impl ReconcileEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> EngineLifecycle {
        self.lifecycle.clone()
    }

    /// Applies the snapshot, transitioning uninitialized → ready, then
    /// replays any events buffered while the fetch was outstanding, in
    /// arrival order. Seeding twice is an error and leaves state untouched.
    pub fn seed(&mut self, projection: Projection) -> Result<(), SeedError> {
        match &self.lifecycle {
            EngineLifecycle::Ready => Err(SeedError::AlreadySeeded),
            EngineLifecycle::Failed { message } => {
                Err(SeedError::AlreadyFailed(message.clone()))
            }
            EngineLifecycle::Uninitialized => {
                self.projection = projection;
                self.lifecycle = EngineLifecycle::Ready;
                for (project_id, record) in std::mem::take(&mut self.pending) {
                    self.upsert(project_id, record);
                }
                Ok(())
            }
        }
    }

    /// Records a terminal snapshot failure. Buffered events are dropped:
    /// with no projection there is nothing they could apply to. No-op once
    /// the engine is ready.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.lifecycle == EngineLifecycle::Uninitialized {
            self.pending.clear();
            self.lifecycle = EngineLifecycle::Failed {
                message: message.into(),
            };
        }
    }

    /// Upserts one normalized event into the matching project's pipeline
    /// list. Status updates are position-stable; only a genuinely new
    /// pipeline re-sorts the list (newest id first). Idempotent for repeated
    /// delivery of the same event.
    pub fn apply_event(&mut self, project_id: ProjectId, record: PipelineRecord) -> ApplyOutcome {
        match self.lifecycle {
            EngineLifecycle::Uninitialized => {
                self.pending.push((project_id, record));
                ApplyOutcome::Buffered
            }
            EngineLifecycle::Failed { .. } => ApplyOutcome::Dropped,
            EngineLifecycle::Ready => self.upsert(project_id, record),
        }
    }

    /// Defensive copy for the rendering layer; the live storage is never
    /// handed out.
    pub fn view(&self) -> Projection {
        self.projection.clone()
    }

    fn upsert(&mut self, project_id: ProjectId, record: PipelineRecord) -> ApplyOutcome {
        let Some(project) = self.projection.project_mut(project_id) else {
            return ApplyOutcome::UnknownProject;
        };

        match project
            .pipelines
            .iter_mut()
            .find(|pipeline| pipeline.id == record.id)
        {
            Some(existing) => {
                existing.status = record.status;
                if record.duration.is_some() {
                    existing.duration = record.duration;
                }
                ApplyOutcome::Updated
            }
            None => {
                project.pipelines.push(record);
                project.pipelines.sort_by(|a, b| b.id.cmp(&a.id));
                ApplyOutcome::Inserted
            }
        }
    }
}
