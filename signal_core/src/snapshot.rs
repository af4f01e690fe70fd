//! Save/load surface for a session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::discovery::DiscoveryState;
use signal_rules::{ProgressionStage, ThreadId, WorldFacts};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything needed to put a session back where it was.
///
/// Thread state is not stored; it is re-derived from `discoveries` on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub frequency: f32,
    pub radio_on: bool,
    pub discoveries: Vec<DiscoveryState>,
    pub stage: ProgressionStage,
    pub game_progress: u32,
    pub facts: WorldFacts,
    #[serde(default)]
    pub active_thread: Option<ThreadId>,
    #[serde(default)]
    pub clock: u64,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
