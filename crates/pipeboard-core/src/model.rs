use serde::{Deserialize, Serialize};

use crate::identifiers::{PipelineId, ProjectId};
use crate::status::PipelineStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub id: PipelineId,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub branch: String,
    pub status: PipelineStatus,
    #[serde(default)]
    pub web_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default)]
    pub commit: CommitInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub last_activity: String,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub pipelines: Vec<PipelineRecord>,
}

/// In-memory "projects → pipelines" state derived from the snapshot plus
/// every push event applied so far. Projects keep snapshot order; each
/// project's pipelines are unique by id and sorted newest-first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub projects: Vec<ProjectRecord>,
}

impl Projection {
    /// Builds a projection from raw snapshot projects: duplicate project ids
    /// collapse last-write-wins into the first occurrence's position, each
    /// project's pipelines are deduplicated the same way and sorted
    /// descending by id, the order the engine maintains from then on.
    pub fn from_snapshot(raw_projects: Vec<ProjectRecord>) -> Self {
        let mut projects: Vec<ProjectRecord> = Vec::with_capacity(raw_projects.len());
        for mut project in raw_projects {
            project.pipelines = normalize_pipelines(std::mem::take(&mut project.pipelines));
            match projects.iter().position(|existing| existing.id == project.id) {
                Some(index) => projects[index] = project,
                None => projects.push(project),
            }
        }
        Self { projects }
    }

    pub fn project(&self, id: ProjectId) -> Option<&ProjectRecord> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub(crate) fn project_mut(&mut self, id: ProjectId) -> Option<&mut ProjectRecord> {
        self.projects.iter_mut().find(|project| project.id == id)
    }
}

fn normalize_pipelines(raw: Vec<PipelineRecord>) -> Vec<PipelineRecord> {
    let mut pipelines: Vec<PipelineRecord> = Vec::with_capacity(raw.len());
    for pipeline in raw {
        match pipelines.iter().position(|existing| existing.id == pipeline.id) {
            Some(index) => pipelines[index] = pipeline,
            None => pipelines.push(pipeline),
        }
    }
    pipelines.sort_by(|a, b| b.id.cmp(&a.id));
    pipelines
}
