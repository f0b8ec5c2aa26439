use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use pipeboard_core::{ProjectRecord, Projection};

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHttpResponse {
    pub status: u16,
    pub body: String,
}

/// Transport seam for the projects endpoint so tests can inject canned
/// responses instead of a live server.
#[async_trait]
pub trait SnapshotTransport: Send + Sync {
    async fn get_projects(&self) -> Result<SnapshotHttpResponse, FetchError>;
}

pub struct ReqwestSnapshotTransport {
    client: reqwest::Client,
    projects_url: String,
}

impl ReqwestSnapshotTransport {
    pub fn new(base_api_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            projects_url: format!("{}/projects", base_api_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl SnapshotTransport for ReqwestSnapshotTransport {
    async fn get_projects(&self) -> Result<SnapshotHttpResponse, FetchError> {
        let response = self
            .client
            .get(&self.projects_url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(SnapshotHttpResponse { status, body })
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    #[serde(default)]
    projects: Vec<ProjectRecord>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Fetches the session's one authoritative snapshot of projects and their
/// recent pipelines.
pub struct SnapshotClient {
    transport: Arc<dyn SnapshotTransport>,
}

impl SnapshotClient {
    pub fn new(base_api_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let transport = ReqwestSnapshotTransport::new(base_api_url, timeout)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn SnapshotTransport>) -> Self {
        Self { transport }
    }

    pub async fn load(&self) -> Result<Projection, FetchError> {
        let response = self.transport.get_projects().await?;

        if response.status != 200 {
            let message = serde_json::from_str::<ErrorBody>(&response.body)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| {
                    format!("projects request returned status {}", response.status)
                });
            return Err(FetchError::Status {
                status: response.status,
                message,
            });
        }

        let snapshot: SnapshotResponse = serde_json::from_str(&response.body)
            .map_err(|err| FetchError::Decode(err.to_string()))?;
        Ok(Projection::from_snapshot(snapshot.projects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeboard_core::{PipelineId, PipelineStatus, ProjectId};

    struct FakeTransport {
        response: SnapshotHttpResponse,
    }

    impl FakeTransport {
        fn client(status: u16, body: &str) -> SnapshotClient {
            SnapshotClient::with_transport(Arc::new(Self {
                response: SnapshotHttpResponse {
                    status,
                    body: body.to_owned(),
                },
            }))
        }
    }

    #[async_trait]
    impl SnapshotTransport for FakeTransport {
        async fn get_projects(&self) -> Result<SnapshotHttpResponse, FetchError> {
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn successful_fetch_decodes_and_normalizes_projects() {
        let body = r#"
        {
            "projects": [
                {
                    "id": 1,
                    "name": "billing",
                    "pipelines": [
                        {"id": 3, "branch": "main", "status": "success", "web_url": ""},
                        {"id": 9, "branch": "main", "status": "running", "web_url": ""}
                    ]
                }
            ]
        }"#;
        let client = FakeTransport::client(200, body);

        let projection = client.load().await.expect("load snapshot");

        let project = projection.project(ProjectId::new(1)).expect("project");
        assert_eq!(project.pipelines[0].id, PipelineId::new(9));
        assert_eq!(project.pipelines[0].status, PipelineStatus::Running);
        assert_eq!(project.pipelines[1].id, PipelineId::new(3));
    }

    #[tokio::test]
    async fn server_error_surfaces_body_message() {
        let client = FakeTransport::client(500, r#"{"message": "db down"}"#);

        let error = client.load().await.expect_err("load should fail");

        assert_eq!(
            error,
            FetchError::Status {
                status: 500,
                message: "db down".to_owned()
            }
        );
        assert_eq!(error.to_string(), "db down");
    }

    #[tokio::test]
    async fn server_error_without_message_gets_generic_description() {
        let client = FakeTransport::client(502, "upstream gone");

        let error = client.load().await.expect_err("load should fail");

        match error {
            FetchError::Status { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("502"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_decode_error() {
        let client = FakeTransport::client(200, "{not json");

        let error = client.load().await.expect_err("load should fail");

        assert!(matches!(error, FetchError::Decode(_)));
    }
}
