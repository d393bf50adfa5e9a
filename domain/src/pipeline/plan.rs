//! Pipeline plan: which agent runs at which position.

use crate::agent::value_objects::AgentHandle;
use serde::{Deserialize, Serialize};

/// The part an agent plays in the review pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineRole {
    /// Gathers material; the caller-visible primary agent.
    Researcher,
    /// Drafts and revises the report.
    Writer,
    /// Critiques the latest draft.
    Reviewer,
}

impl std::fmt::Display for PipelineRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineRole::Researcher => "researcher",
            PipelineRole::Writer => "writer",
            PipelineRole::Reviewer => "reviewer",
        };
        write!(f, "{}", s)
    }
}

/// Stage order. Two drafting rounds, each followed by a review, then a final write.
pub const PIPELINE_ROLES: [PipelineRole; 6] = [
    PipelineRole::Researcher,
    PipelineRole::Writer,
    PipelineRole::Reviewer,
    PipelineRole::Writer,
    PipelineRole::Reviewer,
    PipelineRole::Writer,
];

/// Positional stage identifier (`agent_0` .. `agent_5`).
///
/// Unique per position even when the same agent runs at several positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    pub fn at(position: usize) -> Self {
        Self(format!("agent_{}", position))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One position in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStage {
    pub id: StageId,
    pub role: PipelineRole,
    pub agent: AgentHandle,
}

/// The assembled pipeline for one request.
#[derive(Debug, Clone)]
pub struct PipelinePlan {
    stages: Vec<PipelineStage>,
}

impl PipelinePlan {
    /// Lay the three agents out in [`PIPELINE_ROLES`] order.
    pub fn assemble(researcher: AgentHandle, writer: AgentHandle, reviewer: AgentHandle) -> Self {
        let stages = PIPELINE_ROLES
            .iter()
            .enumerate()
            .map(|(position, role)| {
                let agent = match role {
                    PipelineRole::Researcher => researcher.clone(),
                    PipelineRole::Writer => writer.clone(),
                    PipelineRole::Reviewer => reviewer.clone(),
                };
                PipelineStage {
                    id: StageId::at(position),
                    role: *role,
                    agent,
                }
            })
            .collect();
        Self { stages }
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::value_objects::{AgentId, Retention};
    use std::collections::HashSet;

    fn plan() -> PipelinePlan {
        PipelinePlan::assemble(
            AgentHandle::attached(AgentId::new("asst_r"), "WorkshopAssistant"),
            AgentHandle::created(AgentId::new("asst_w"), "WorkshopWriter", Retention::Ephemeral),
            AgentHandle::created(AgentId::new("asst_v"), "WorkshopReviewer", Retention::Ephemeral),
        )
    }

    #[test]
    fn test_plan_has_six_stages() {
        assert_eq!(plan().len(), 6);
    }

    #[test]
    fn test_stage_ids_are_positional_and_distinct() {
        let plan = plan();
        let ids: Vec<&str> = plan.stages().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["agent_0", "agent_1", "agent_2", "agent_3", "agent_4", "agent_5"]
        );
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_agents_repeat_in_fixed_order() {
        let plan = plan();
        let agents: Vec<&str> = plan.stages().iter().map(|s| s.agent.id.as_str()).collect();
        assert_eq!(
            agents,
            vec!["asst_r", "asst_w", "asst_v", "asst_w", "asst_v", "asst_w"]
        );
        assert_eq!(plan.stages()[5].role, PipelineRole::Writer);
    }
}
