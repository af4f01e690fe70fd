//! The main-story state machine.
//!
//! Stages only move forward one step at a time through `advance` or
//! `check_requirements`. `set_stage` is the one unconditional jump and exists
//! for save/load and tests.

use std::collections::HashMap;
use tracing::info;

use signal_rules::{
    default_requirements, default_unlocks, ProgressionStage, StageRequirement, StageUnlocks,
    WorldFacts,
};

#[derive(Debug, Clone)]
pub struct GameProgressionManager {
    stage: ProgressionStage,
    /// Externally visible progress number. Signals gate on it.
    game_progress: u32,
    requirements: HashMap<ProgressionStage, StageRequirement>,
    unlocks: HashMap<ProgressionStage, StageUnlocks>,
}

impl Default for GameProgressionManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl GameProgressionManager {
    /// Requirements and unlocks are keyed by the stage being entered.
    pub fn new(
        requirements: HashMap<ProgressionStage, StageRequirement>,
        unlocks: HashMap<ProgressionStage, StageUnlocks>,
    ) -> Self {
        Self {
            stage: ProgressionStage::Beginning,
            game_progress: 0,
            requirements,
            unlocks,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(default_requirements(), default_unlocks())
    }

    pub fn stage(&self) -> ProgressionStage {
        self.stage
    }

    pub fn game_progress(&self) -> u32 {
        self.game_progress
    }

    /// Move to the next stage. Returns the new stage, or `None` at `Endgame`.
    pub fn advance(&mut self) -> Option<ProgressionStage> {
        let next = self.stage.next()?;
        self.enter(next);
        Some(next)
    }

    /// Jump straight to `stage`, resetting game progress to its ordinal.
    ///
    /// Returns `true` if the stage changed.
    pub fn set_stage(&mut self, stage: ProgressionStage) -> bool {
        let changed = self.stage != stage;
        self.enter(stage);
        changed
    }

    /// Advance one stage if the next stage's requirement is met.
    ///
    /// Never skips: a second satisfied requirement waits for the next check.
    /// A stage with no configured requirement is never entered this way.
    pub fn check_requirements(&mut self, facts: &WorldFacts) -> Option<ProgressionStage> {
        let (target, requirement) = self.next_requirement()?;
        if !requirement.is_met(facts) {
            return None;
        }
        self.enter(target);
        Some(target)
    }

    /// The next stage and what it takes to get there.
    pub fn next_requirement(&self) -> Option<(ProgressionStage, &StageRequirement)> {
        let target = self.stage.next()?;
        self.requirements
            .get(&target)
            .map(|requirement| (target, requirement))
    }

    /// Host-supplied or main-story progress. Does not move the stage.
    pub fn set_game_progress(&mut self, progress: u32) {
        self.game_progress = progress;
    }

    /// What entering `stage` hands out, if anything.
    pub fn unlocks_for(&self, stage: ProgressionStage) -> Option<&StageUnlocks> {
        self.unlocks.get(&stage)
    }

    /// Unlocks for every stage from the first step up to and including `stage`.
    pub fn unlocks_through(&self, stage: ProgressionStage) -> impl Iterator<Item = &StageUnlocks> {
        ProgressionStage::ALL
            .into_iter()
            .take_while(move |candidate| *candidate <= stage)
            .filter_map(move |candidate| self.unlocks.get(&candidate))
    }

    /// Put back a saved stage and progress value without side effects.
    pub fn restore(&mut self, stage: ProgressionStage, game_progress: u32) {
        self.stage = stage;
        self.game_progress = game_progress;
    }

    fn enter(&mut self, stage: ProgressionStage) {
        info!(
            target: "signal_core::progression",
            from = %self.stage,
            to = %stage,
            "stage.changed"
        );
        self.stage = stage;
        self.game_progress = stage.ordinal();
    }
}
