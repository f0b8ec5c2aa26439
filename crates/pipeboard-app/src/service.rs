use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use integration_gitlab::FetchError;
use pipeboard_core::{ApplyOutcome, PipelinePush, Projection, ReconcileEngine};

/// What the rendering layer sees. A new value is published only after a
/// mutation fully completes, so no partially-updated projection is ever
/// observable.
#[derive(Debug, Clone)]
pub enum ProjectionView {
    Loading,
    Ready(Arc<Projection>),
    Failed(String),
}

/// Single consumer of snapshot and push events. Seeds or fails the engine
/// exactly once, then applies pushes one at a time in arrival order,
/// publishing a fresh immutable view after every successful mutation.
/// Returns when the push channel closes.
pub async fn run_projection_loop(
    snapshot: impl Future<Output = Result<Projection, FetchError>>,
    mut pushes: mpsc::Receiver<PipelinePush>,
    view_tx: watch::Sender<ProjectionView>,
) {
    let mut engine = ReconcileEngine::new();
    tokio::pin!(snapshot);
    let mut snapshot_resolved = false;

    loop {
        tokio::select! {
            result = &mut snapshot, if !snapshot_resolved => {
                snapshot_resolved = true;
                match result {
                    Ok(projection) => match engine.seed(projection) {
                        Ok(()) => {
                            let view = Arc::new(engine.view());
                            info!(projects = view.projects.len(), "snapshot applied");
                            let _ = view_tx.send(ProjectionView::Ready(view));
                        }
                        Err(error) => warn!(error = %error, "snapshot seed rejected"),
                    },
                    Err(error) => {
                        warn!(error = %error, "snapshot fetch failed");
                        let message = error.to_string();
                        engine.fail(message.clone());
                        let _ = view_tx.send(ProjectionView::Failed(message));
                    }
                }
            }
            maybe_push = pushes.recv() => {
                let Some(push) = maybe_push else { break };
                apply_push(&mut engine, push, &view_tx);
            }
        }
    }
}

fn apply_push(
    engine: &mut ReconcileEngine,
    push: PipelinePush,
    view_tx: &watch::Sender<ProjectionView>,
) {
    let (project_id, record) = match push.normalize() {
        Ok(normalized) => normalized,
        Err(error) => {
            warn!(error = %error, "discarding malformed push event");
            return;
        }
    };

    match engine.apply_event(project_id, record) {
        ApplyOutcome::Updated | ApplyOutcome::Inserted => {
            let _ = view_tx.send(ProjectionView::Ready(Arc::new(engine.view())));
        }
        ApplyOutcome::Buffered => {
            debug!(project = %project_id, "buffered push while snapshot is outstanding");
        }
        ApplyOutcome::UnknownProject => {
            debug!(project = %project_id, "discarding push for unknown project");
        }
        ApplyOutcome::Dropped => {
            debug!(project = %project_id, "dropping push after failed snapshot");
        }
    }
}
