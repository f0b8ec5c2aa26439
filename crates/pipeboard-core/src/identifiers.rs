use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(ProjectId);
numeric_id!(PipelineId);

// Pipelines are displayed newest-first; their ids are numerically orderable.
// Project ids are compared for equality only.
impl PartialOrd for PipelineId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PipelineId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_id_round_trips_as_json_number() {
        let id = PipelineId::new(42);
        let serialized = serde_json::to_string(&id).expect("serialize pipeline id");
        let deserialized: PipelineId =
            serde_json::from_str(&serialized).expect("deserialize pipeline id");

        assert_eq!(serialized, "42");
        assert_eq!(deserialized, id);
    }

    #[test]
    fn pipeline_ids_order_numerically() {
        assert!(PipelineId::new(9) > PipelineId::new(5));
        assert!(PipelineId::new(5) < PipelineId::new(10));
    }
}
