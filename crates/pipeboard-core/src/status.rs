use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Pipeline status as reported by the CI server. Wire values outside the
/// known set decode as `Unknown` so new upstream statuses never break the
/// event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStatus {
    Running,
    Pending,
    Success,
    Failed,
    Canceled,
    Skipped,
    Unknown,
}

impl PipelineStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "running" => Self::Running,
            "pending" => Self::Pending,
            "success" => Self::Success,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            "skipped" => Self::Skipped,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PipelineStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PipelineStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_round_trip() {
        for status in [
            PipelineStatus::Running,
            PipelineStatus::Pending,
            PipelineStatus::Success,
            PipelineStatus::Failed,
            PipelineStatus::Canceled,
            PipelineStatus::Skipped,
        ] {
            assert_eq!(PipelineStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn unrecognized_wire_status_decodes_as_unknown() {
        assert_eq!(PipelineStatus::parse("queued"), PipelineStatus::Unknown);

        let decoded: PipelineStatus =
            serde_json::from_str("\"queued\"").expect("deserialize status");
        assert_eq!(decoded, PipelineStatus::Unknown);
    }

    #[test]
    fn status_serializes_as_lowercase_string() {
        let serialized =
            serde_json::to_string(&PipelineStatus::Running).expect("serialize status");
        assert_eq!(serialized, "\"running\"");
    }
}
