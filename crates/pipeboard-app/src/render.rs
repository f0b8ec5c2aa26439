use std::io::Write;

use crate::service::ProjectionView;

/// Minimal stand-in for the rendering layer: a pure function of the
/// published view, re-invoked on every change. Anything fancier (colors,
/// layout) plugs in here without touching the engine.
pub fn render_view(out: &mut impl Write, view: &ProjectionView) -> std::io::Result<()> {
    match view {
        ProjectionView::Loading => writeln!(out, "loading projects..."),
        ProjectionView::Failed(message) => writeln!(out, "error: {message}"),
        ProjectionView::Ready(projection) => {
            for project in &projection.projects {
                writeln!(out, "{} (modified {})", project.name, project.last_activity)?;
                for pipeline in &project.pipelines {
                    let duration = pipeline
                        .duration
                        .map(|secs| format!(" {secs}s"))
                        .unwrap_or_default();
                    writeln!(
                        out,
                        "  #{} {} [{}]{} {} : {}",
                        pipeline.id,
                        pipeline.branch,
                        pipeline.status,
                        duration,
                        pipeline.commit.author,
                        pipeline.commit.title,
                    )?;
                }
            }
            Ok(())
        }
    }
}
