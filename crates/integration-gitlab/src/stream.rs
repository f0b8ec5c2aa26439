use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::warn;

use pipeboard_core::PipelinePush;

use crate::error::StreamError;

/// Consumes the persistent push stream and forwards every decodable pipeline
/// push into the reconciliation queue. Malformed frames are reported and
/// skipped; they never take the stream down.
pub struct PushStreamClient {
    url: String,
}

impl PushStreamClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Runs until the server closes the connection, the transport fails, or
    /// the receiving side of `tx` goes away. Reconnection is the caller's
    /// decision.
    pub async fn run(&self, tx: mpsc::Sender<PipelinePush>) -> Result<(), StreamError> {
        let (socket, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|err| StreamError::Connect(err.to_string()))?;
        let (_write, mut read) = socket.split();

        while let Some(frame) = read.next().await {
            let frame = frame.map_err(|err| StreamError::Transport(err.to_string()))?;
            let payload = match frame {
                Message::Text(text) => text,
                Message::Binary(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(_) => {
                        warn!("skipping non-utf8 binary push frame");
                        continue;
                    }
                },
                Message::Close(_) => break,
                // Ping/pong and raw frames carry no pushes.
                _ => continue,
            };

            if !forward_frame(&payload, &tx).await {
                break;
            }
        }

        Ok(())
    }
}

/// Decodes one frame payload and forwards it. Returns false once the
/// consumer is gone and the stream should stop.
async fn forward_frame(payload: &str, tx: &mpsc::Sender<PipelinePush>) -> bool {
    match serde_json::from_str::<PipelinePush>(payload) {
        Ok(push) => tx.send(push).await.is_ok(),
        Err(error) => {
            warn!(error = %error, "skipping malformed push frame");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeboard_core::ProjectId;

    const VALID_FRAME: &str = r#"
    {
        "object_kind": "pipeline",
        "project": {"id": 42},
        "object_attributes": {"id": 9, "ref": "main", "status": "running"},
        "commit": {"url": "https://gitlab.example.com/c/abc", "author": {"name": "rdeniro"}}
    }"#;

    #[tokio::test]
    async fn malformed_frame_is_skipped_and_later_frames_still_deliver() {
        let (tx, mut rx) = mpsc::channel(8);

        assert!(forward_frame("{truncated", &tx).await);
        assert!(forward_frame(VALID_FRAME, &tx).await);

        let push = rx.try_recv().expect("one push delivered");
        assert_eq!(rx.try_recv().ok(), None);
        let (project_id, _) = push.normalize().expect("normalize push");
        assert_eq!(project_id, ProjectId::new(42));
    }

    #[tokio::test]
    async fn closed_consumer_stops_forwarding() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);

        assert!(!forward_frame(VALID_FRAME, &tx).await);
    }
}
