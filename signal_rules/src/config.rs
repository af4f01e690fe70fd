//! Signal pack - the TOML seed data behind the catalog, equipment and threads.
//!
//! The builtin pack is compiled in from `data/signal_pack.toml`. A replacement
//! can be pointed to with the `SIGNAL_PACK_PATH` environment variable.

use std::{
    collections::HashMap,
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::equipment::{EffectEntry, EquipmentEffectsResolver};
use crate::ids::{LocationId, QuestId};
use crate::narrative::NarrativeThread;
use crate::progression::{
    default_requirements, default_unlocks, ProgressionStage, StageRequirement, StageUnlocks,
};
use crate::signals::{CatalogError, FrequencyBand, SignalCatalog, SignalDefinition, StaticProfile};

pub const BUILTIN_SIGNAL_PACK: &str = include_str!("data/signal_pack.toml");

pub const SIGNAL_PACK_PATH_VAR: &str = "SIGNAL_PACK_PATH";

/// Requirement override as written in the pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementEntry {
    pub stage: ProgressionStage,
    pub requirement: StageRequirement,
}

/// Unlock override as written in the pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockEntry {
    pub stage: ProgressionStage,
    #[serde(default)]
    pub locations: Vec<LocationId>,
    #[serde(default)]
    pub quests: Vec<QuestId>,
}

/// Root of a signal pack file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SignalPack {
    pub band: FrequencyBand,
    pub static_profile: StaticProfile,
    pub signals: Vec<SignalDefinition>,
    pub effects: Vec<EffectEntry>,
    pub threads: Vec<NarrativeThread>,
    pub requirements: Vec<RequirementEntry>,
    pub unlocks: Vec<UnlockEntry>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse signal pack: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read signal pack from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("signal pack has an invalid signal: {0}")]
    Catalog(#[from] CatalogError),
}

impl SignalPack {
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_SIGNAL_PACK).expect("builtin signal pack should parse")
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build the catalog, rejecting the pack on the first invalid signal.
    pub fn build_catalog(&self) -> Result<SignalCatalog, ConfigError> {
        Ok(SignalCatalog::from_definitions(
            self.band,
            self.signals.iter().cloned(),
        )?)
    }

    pub fn build_resolver(&self) -> EquipmentEffectsResolver {
        EquipmentEffectsResolver::from_entries(self.effects.iter().cloned())
    }

    /// Thread definitions, with empty member lists gathered from `catalog`.
    pub fn build_threads(&self, catalog: &SignalCatalog) -> Vec<NarrativeThread> {
        self.threads
            .iter()
            .cloned()
            .map(|mut thread| {
                if thread.members.is_empty() {
                    thread.collect_members(catalog);
                }
                thread
            })
            .collect()
    }

    /// Code defaults with the pack's overrides applied.
    pub fn requirements(&self) -> HashMap<ProgressionStage, StageRequirement> {
        let mut requirements = default_requirements();
        for entry in &self.requirements {
            requirements.insert(entry.stage, entry.requirement.clone());
        }
        requirements
    }

    /// Code defaults with the pack's overrides applied.
    pub fn unlocks(&self) -> HashMap<ProgressionStage, StageUnlocks> {
        let mut unlocks = default_unlocks();
        for entry in &self.unlocks {
            unlocks.insert(
                entry.stage,
                StageUnlocks {
                    locations: entry.locations.clone(),
                    quests: entry.quests.clone(),
                },
            );
        }
        unlocks
    }
}

/// Load the pack named by `SIGNAL_PACK_PATH`, falling back to the builtin one.
pub fn load_signal_pack_from_env() -> (SignalPack, Option<PathBuf>) {
    if let Some(path) = env::var(SIGNAL_PACK_PATH_VAR).ok().map(PathBuf::from) {
        match SignalPack::from_file(&path) {
            Ok(pack) => {
                info!(
                    target: "signal_rules::config",
                    path = %path.display(),
                    signals = pack.signals.len(),
                    "signal_pack.loaded=file"
                );
                return (pack, Some(path));
            }
            Err(err) => {
                warn!(
                    target: "signal_rules::config",
                    path = %path.display(),
                    error = %err,
                    "signal_pack.load_failed"
                );
            }
        }
    }

    let pack = SignalPack::builtin();
    info!(
        target: "signal_rules::config",
        signals = pack.signals.len(),
        "signal_pack.loaded=builtin"
    );
    (pack, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ItemId, SignalId, ThreadId};

    #[test]
    fn test_builtin_pack_parses() {
        let pack = SignalPack::builtin();
        assert_eq!(pack.band, FrequencyBand::new(85.0, 165.0));
        assert!(!pack.signals.is_empty());
        assert_eq!(pack.effects.len(), 3);
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let pack = SignalPack::builtin();
        let catalog = pack.build_catalog().unwrap();
        assert_eq!(catalog.len(), pack.signals.len());

        let beacon = catalog.get(&SignalId::from("mysterious_signal")).unwrap();
        assert!(beacon.is_hidden);
        assert_eq!(beacon.story_progress_required, 5);
    }

    #[test]
    fn test_builtin_threads_collect_members_in_sequence() {
        let pack = SignalPack::builtin();
        let catalog = pack.build_catalog().unwrap();
        let threads = pack.build_threads(&catalog);

        let main = threads
            .iter()
            .find(|t| t.id == ThreadId::from("main_story"))
            .unwrap();
        assert!(main.is_main_story);
        let members: Vec<_> = main.members.iter().map(|id| id.as_str()).collect();
        assert_eq!(
            members,
            vec![
                "emergency_broadcast",
                "mysterious_signal",
                "research_data",
                "distress_signal",
                "final_message"
            ]
        );
    }

    #[test]
    fn test_builtin_resolver_matches_effect_table() {
        let resolver = SignalPack::builtin().build_resolver();
        let crystal = resolver.effect_for(&ItemId::from("strange_crystal")).unwrap();
        assert_eq!(crystal.signal_boost, 1.5);
        assert!(crystal.can_detect_hidden_signals);
    }

    #[test]
    fn test_pack_overrides_requirements_and_unlocks() {
        let pack = SignalPack::from_toml_str(
            r#"
            [[requirements]]
            stage = "RadioRepair"
            requirement = { kind = "item_held", item = "soldering_iron" }

            [[unlocks]]
            stage = "FirstSignal"
            locations = ["ridge"]
            "#,
        )
        .unwrap();

        let requirements = pack.requirements();
        assert_eq!(
            requirements[&ProgressionStage::RadioRepair],
            StageRequirement::ItemHeld {
                item: ItemId::from("soldering_iron")
            }
        );
        assert_eq!(
            requirements[&ProgressionStage::FirstSignal],
            StageRequirement::FrequencyDiscovered
        );

        let unlocks = pack.unlocks();
        assert_eq!(
            unlocks[&ProgressionStage::FirstSignal].locations,
            vec![LocationId::from("ridge")]
        );
        assert!(unlocks[&ProgressionStage::FirstSignal].quests.is_empty());
    }

    #[test]
    fn test_invalid_signal_rejects_pack() {
        let pack = SignalPack::from_toml_str(
            r#"
            [[signals]]
            id = "broken"
            name = "Broken"
            frequency = 100.0
            bandwidth = 0.0
            "#,
        )
        .unwrap();

        assert!(matches!(
            pack.build_catalog(),
            Err(ConfigError::Catalog(CatalogError::InvalidBandwidth { .. }))
        ));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        assert!(matches!(
            SignalPack::from_toml_str("[[signals]\nid = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let result = SignalPack::from_file(Path::new("/nonexistent/signal_pack.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_inverted_band_rejects_pack() {
        let pack = SignalPack::from_toml_str("[band]\nmin = 165.0\nmax = 85.0\n").unwrap();

        assert!(matches!(
            pack.build_catalog(),
            Err(ConfigError::Catalog(CatalogError::InvalidBand { .. }))
        ));
    }
}
