use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifiers::{PipelineId, ProjectId};
use crate::model::{CommitInfo, PipelineRecord};
use crate::status::PipelineStatus;

/// One pipeline push notification as delivered on the stream. Every block is
/// optional at the serde layer; `normalize` decides what is actually
/// required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinePush {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<PushProject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_attributes: Option<PushAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<PushCommit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushCommit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<PushAuthor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("push event carries no project id")]
    MissingProjectId,
    #[error("push event carries no pipeline id")]
    MissingPipelineId,
    #[error("push event carries no pipeline status")]
    MissingStatus,
}

impl PipelinePush {
    /// Converts the push into the project it targets plus a fully-populated
    /// pipeline record. Project id, pipeline id, and status are required;
    /// everything else degrades to defaults. Status strings outside the
    /// known enum become `PipelineStatus::Unknown` rather than an error.
    pub fn normalize(self) -> Result<(ProjectId, PipelineRecord), NormalizeError> {
        let project_id = self
            .project
            .as_ref()
            .and_then(|project| project.id)
            .ok_or(NormalizeError::MissingProjectId)?;

        let attributes = self
            .object_attributes
            .ok_or(NormalizeError::MissingPipelineId)?;
        let pipeline_id = attributes.id.ok_or(NormalizeError::MissingPipelineId)?;
        let status = attributes
            .status
            .filter(|status| !status.trim().is_empty())
            .ok_or(NormalizeError::MissingStatus)?;

        let commit = self.commit.unwrap_or_default();
        let record = PipelineRecord {
            id: PipelineId::new(pipeline_id),
            sha: attributes.sha.unwrap_or_default(),
            branch: attributes.branch.unwrap_or_default(),
            status: PipelineStatus::parse(&status),
            web_url: commit.url.clone().unwrap_or_default(),
            duration: attributes.duration,
            commit: CommitInfo {
                author: commit
                    .author
                    .and_then(|author| author.name)
                    .unwrap_or_default(),
                title: commit.message.unwrap_or_default(),
                created_at: commit.timestamp.unwrap_or_default(),
            },
        };

        Ok((ProjectId::new(project_id), record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_push() -> PipelinePush {
        PipelinePush {
            object_kind: Some("pipeline".to_owned()),
            project: Some(PushProject {
                id: Some(42),
                name: Some("billing".to_owned()),
            }),
            object_attributes: Some(PushAttributes {
                id: Some(9),
                branch: Some("main".to_owned()),
                sha: Some("abc123".to_owned()),
                status: Some("running".to_owned()),
                duration: Some(75),
            }),
            commit: Some(PushCommit {
                message: Some("fix invoice rounding".to_owned()),
                timestamp: Some("2026-03-01T09:55:00Z".to_owned()),
                url: Some("https://gitlab.example.com/platform/billing/commit/abc123".to_owned()),
                author: Some(PushAuthor {
                    name: Some("rdeniro".to_owned()),
                }),
            }),
        }
    }

    #[test]
    fn normalize_produces_target_project_and_record() {
        let (project_id, record) = sample_push().normalize().expect("normalize push");

        assert_eq!(project_id, ProjectId::new(42));
        assert_eq!(record.id, PipelineId::new(9));
        assert_eq!(record.branch, "main");
        assert_eq!(record.status, PipelineStatus::Running);
        assert_eq!(record.duration, Some(75));
        assert_eq!(record.commit.author, "rdeniro");
        assert_eq!(record.commit.title, "fix invoice rounding");
        assert_eq!(
            record.web_url,
            "https://gitlab.example.com/platform/billing/commit/abc123"
        );
    }

    #[test]
    fn unknown_status_string_normalizes_instead_of_failing() {
        let mut push = sample_push();
        push.object_attributes.as_mut().expect("attributes").status = Some("queued".to_owned());

        let (_, record) = push.normalize().expect("normalize push");
        assert_eq!(record.status, PipelineStatus::Unknown);
    }

    #[test]
    fn missing_project_id_is_rejected() {
        let mut push = sample_push();
        push.project = Some(PushProject {
            id: None,
            name: None,
        });

        assert_eq!(
            push.normalize().expect_err("should reject push"),
            NormalizeError::MissingProjectId
        );
    }

    #[test]
    fn missing_attributes_block_is_rejected() {
        let mut push = sample_push();
        push.object_attributes = None;

        assert_eq!(
            push.normalize().expect_err("should reject push"),
            NormalizeError::MissingPipelineId
        );
    }

    #[test]
    fn blank_status_is_rejected() {
        let mut push = sample_push();
        push.object_attributes.as_mut().expect("attributes").status = Some("  ".to_owned());

        assert_eq!(
            push.normalize().expect_err("should reject push"),
            NormalizeError::MissingStatus
        );
    }

    #[test]
    fn absent_commit_block_degrades_to_empty_commit_info() {
        let mut push = sample_push();
        push.commit = None;

        let (_, record) = push.normalize().expect("normalize push");
        assert_eq!(record.commit, CommitInfo::default());
        assert_eq!(record.web_url, "");
    }

    #[test]
    fn push_decodes_from_webhook_payload() {
        let raw = r#"
        {
            "object_kind": "pipeline",
            "project": {"id": 42, "name": "billing"},
            "object_attributes": {"id": 9, "ref": "main", "status": "running", "sha": "abc123"},
            "commit": {
                "url": "https://gitlab.example.com/platform/billing/commit/abc123",
                "message": "fix invoice rounding",
                "timestamp": "2026-03-01T09:55:00Z",
                "author": {"name": "rdeniro"}
            }
        }"#;

        let push: PipelinePush = serde_json::from_str(raw).expect("decode push");
        let (project_id, record) = push.normalize().expect("normalize push");
        assert_eq!(project_id, ProjectId::new(42));
        assert_eq!(record.branch, "main");
    }
}
