use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::warn;

use integration_gitlab::{PushStreamClient, SnapshotClient};
use pipeboard_app::{render_view, run_projection_loop, ProjectionView};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = pipeboard_config::load_from_env()?;
    let snapshot_client = SnapshotClient::new(&config.gitlab.base_api_url, config.fetch_timeout())?;
    let stream_url = config.stream_url();
    let retry_delay = config.stream_retry_delay();

    let (push_tx, push_rx) = mpsc::channel(config.runtime.push_buffer_capacity);
    let (view_tx, view_rx) = watch::channel(ProjectionView::Loading);

    tokio::spawn(async move {
        let client = PushStreamClient::new(stream_url);
        loop {
            match client.run(push_tx.clone()).await {
                Ok(()) => warn!(url = client.url(), "push stream closed; reconnecting"),
                Err(error) => warn!(error = %error, "push stream failed; reconnecting"),
            }
            tokio::time::sleep(retry_delay).await;
        }
    });

    tokio::spawn(render_loop(view_rx));

    run_projection_loop(
        async move { snapshot_client.load().await },
        push_rx,
        view_tx,
    )
    .await;

    Ok(())
}

async fn render_loop(mut view_rx: watch::Receiver<ProjectionView>) {
    loop {
        let view = view_rx.borrow_and_update().clone();
        let mut stdout = std::io::stdout();
        if let Err(error) = render_view(&mut stdout, &view) {
            warn!(error = %error, "render failed");
        }
        if view_rx.changed().await.is_err() {
            break;
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
