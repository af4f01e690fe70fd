//! Progression stages - the ordered checkpoints of the main story.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::{ItemId, LocationId, QuestId};
use crate::world_state::WorldFacts;

/// Story checkpoints, in the only order they can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ProgressionStage {
    #[default]
    Beginning,
    RadioRepair,
    FirstSignal,
    ForestExploration,
    TownDiscovery,
    SurvivorContact,
    FactoryAccess,
    Endgame,
}

impl ProgressionStage {
    pub const ALL: [ProgressionStage; 8] = [
        ProgressionStage::Beginning,
        ProgressionStage::RadioRepair,
        ProgressionStage::FirstSignal,
        ProgressionStage::ForestExploration,
        ProgressionStage::TownDiscovery,
        ProgressionStage::SurvivorContact,
        ProgressionStage::FactoryAccess,
        ProgressionStage::Endgame,
    ];

    pub fn ordinal(self) -> u32 {
        self as u32
    }

    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// The following stage, or `None` at `Endgame`.
    pub fn next(self) -> Option<Self> {
        Self::from_ordinal(self.ordinal() + 1)
    }

    pub fn is_terminal(self) -> bool {
        self == ProgressionStage::Endgame
    }

    pub fn name(self) -> &'static str {
        match self {
            ProgressionStage::Beginning => "Beginning",
            ProgressionStage::RadioRepair => "RadioRepair",
            ProgressionStage::FirstSignal => "FirstSignal",
            ProgressionStage::ForestExploration => "ForestExploration",
            ProgressionStage::TownDiscovery => "TownDiscovery",
            ProgressionStage::SurvivorContact => "SurvivorContact",
            ProgressionStage::FactoryAccess => "FactoryAccess",
            ProgressionStage::Endgame => "Endgame",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ProgressionStage::Beginning => {
                "You've just arrived at the emergency bunker. Your radio is damaged and needs repair."
            }
            ProgressionStage::RadioRepair => {
                "You've repaired your radio. Now you can search for signals and try to make contact with other survivors."
            }
            ProgressionStage::FirstSignal => {
                "You've found your first signal. It seems to be coming from the forest."
            }
            ProgressionStage::ForestExploration => {
                "You've explored the forest and found some useful items. There are rumors of a town nearby."
            }
            ProgressionStage::TownDiscovery => {
                "You've discovered the abandoned town. There might be survivors hiding somewhere nearby."
            }
            ProgressionStage::SurvivorContact => {
                "You've made contact with survivors. They're hiding in the old factory, but you need a key to get in."
            }
            ProgressionStage::FactoryAccess => {
                "You've gained access to the factory. The survivors have a plan to escape the area."
            }
            ProgressionStage::Endgame => {
                "You've completed your mission. The survivors are safe, and you've found a way out of the area."
            }
        }
    }

    pub fn objective(self) -> &'static str {
        match self {
            ProgressionStage::Beginning => "Repair your radio by finding the necessary components.",
            ProgressionStage::RadioRepair => "Find and tune into a radio signal.",
            ProgressionStage::FirstSignal => "Explore the forest to find signs of other survivors.",
            ProgressionStage::ForestExploration => "Find the abandoned town.",
            ProgressionStage::TownDiscovery => "Decode the survivor's message and locate them.",
            ProgressionStage::SurvivorContact => {
                "Find the factory key to access the survivor's hideout."
            }
            ProgressionStage::FactoryAccess => {
                "Help the survivors complete their final transmission."
            }
            ProgressionStage::Endgame => "You've completed all objectives.",
        }
    }
}

impl std::fmt::Display for ProgressionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Condition that must hold before a stage can be entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageRequirement {
    QuestCompleted { quest: QuestId },
    /// At least one signal frequency has been discovered.
    FrequencyDiscovered,
    LocationDiscovered { location: LocationId },
    ItemHeld { item: ItemId },
    All { requirements: Vec<StageRequirement> },
}

impl StageRequirement {
    /// Unknown quests, locations and items simply read as unmet.
    pub fn is_met(&self, facts: &WorldFacts) -> bool {
        match self {
            StageRequirement::QuestCompleted { quest } => facts.is_quest_completed(quest),
            StageRequirement::FrequencyDiscovered => facts.has_discovered_frequency(),
            StageRequirement::LocationDiscovered { location } => {
                facts.is_location_discovered(location)
            }
            StageRequirement::ItemHeld { item } => facts.has_item(item),
            StageRequirement::All { requirements } => {
                requirements.iter().all(|requirement| requirement.is_met(facts))
            }
        }
    }
}

/// What entering a stage hands to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StageUnlocks {
    #[serde(default)]
    pub locations: Vec<LocationId>,
    #[serde(default)]
    pub quests: Vec<QuestId>,
}

impl StageUnlocks {
    fn new(locations: &[&str], quests: &[&str]) -> Self {
        Self {
            locations: locations.iter().map(|id| LocationId::from(*id)).collect(),
            quests: quests.iter().map(|id| QuestId::from(*id)).collect(),
        }
    }
}

fn quest(id: &str) -> StageRequirement {
    StageRequirement::QuestCompleted {
        quest: QuestId::from(id),
    }
}

fn location(id: &str) -> StageRequirement {
    StageRequirement::LocationDiscovered {
        location: LocationId::from(id),
    }
}

/// Requirements for entering each stage after `Beginning`.
pub fn default_requirements() -> HashMap<ProgressionStage, StageRequirement> {
    let mut requirements = HashMap::new();
    requirements.insert(ProgressionStage::RadioRepair, quest("quest_radio_repair"));
    requirements.insert(
        ProgressionStage::FirstSignal,
        StageRequirement::FrequencyDiscovered,
    );
    requirements.insert(
        ProgressionStage::ForestExploration,
        quest("quest_explore_forest"),
    );
    requirements.insert(ProgressionStage::TownDiscovery, location("town"));
    requirements.insert(
        ProgressionStage::SurvivorContact,
        quest("quest_survivor_message"),
    );
    requirements.insert(
        ProgressionStage::FactoryAccess,
        StageRequirement::All {
            requirements: vec![
                location("factory"),
                StageRequirement::ItemHeld {
                    item: ItemId::from("factory_key"),
                },
            ],
        },
    );
    requirements.insert(ProgressionStage::Endgame, quest("quest_final_transmission"));
    requirements
}

/// Locations and quests handed out on entering each stage.
pub fn default_unlocks() -> HashMap<ProgressionStage, StageUnlocks> {
    let mut unlocks = HashMap::new();
    unlocks.insert(
        ProgressionStage::RadioRepair,
        StageUnlocks::new(&[], &["quest_find_signal"]),
    );
    unlocks.insert(
        ProgressionStage::FirstSignal,
        StageUnlocks::new(&["forest"], &["quest_explore_forest"]),
    );
    unlocks.insert(
        ProgressionStage::ForestExploration,
        StageUnlocks::new(&["cabin", "lake", "road"], &["quest_find_town"]),
    );
    unlocks.insert(
        ProgressionStage::TownDiscovery,
        StageUnlocks::new(&[], &["quest_decode_signal"]),
    );
    unlocks.insert(
        ProgressionStage::SurvivorContact,
        StageUnlocks::new(&["factory"], &["quest_factory_key"]),
    );
    unlocks.insert(
        ProgressionStage::FactoryAccess,
        StageUnlocks::new(&[], &["quest_final_transmission"]),
    );
    unlocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(ProgressionStage::Beginning.ordinal(), 0);
        assert_eq!(ProgressionStage::Endgame.ordinal(), 7);
        assert_eq!(
            ProgressionStage::Beginning.next(),
            Some(ProgressionStage::RadioRepair)
        );
        assert_eq!(ProgressionStage::Endgame.next(), None);
        assert!(ProgressionStage::FirstSignal < ProgressionStage::TownDiscovery);
    }

    #[test]
    fn test_from_ordinal_round_trips() {
        for stage in ProgressionStage::ALL {
            assert_eq!(ProgressionStage::from_ordinal(stage.ordinal()), Some(stage));
        }
        assert_eq!(ProgressionStage::from_ordinal(8), None);
    }

    #[test]
    fn test_every_stage_after_beginning_has_a_requirement() {
        let requirements = default_requirements();
        for stage in ProgressionStage::ALL.iter().skip(1) {
            assert!(requirements.contains_key(stage), "missing {stage}");
        }
        assert!(!requirements.contains_key(&ProgressionStage::Beginning));
    }

    #[test]
    fn test_composite_requirement() {
        let requirement = default_requirements()
            .remove(&ProgressionStage::FactoryAccess)
            .unwrap();
        let mut facts = WorldFacts::new();

        facts.discover_location(LocationId::from("factory"));
        assert!(!requirement.is_met(&facts));

        facts.inventory.insert(ItemId::from("factory_key"));
        assert!(requirement.is_met(&facts));
    }

    #[test]
    fn test_requirement_parses_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            requirement: StageRequirement,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
            [requirement]
            kind = "all"
            requirements = [
                { kind = "location_discovered", location = "factory" },
                { kind = "item_held", item = "factory_key" },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(
            parsed.requirement,
            default_requirements()
                .remove(&ProgressionStage::FactoryAccess)
                .unwrap()
        );
    }
}
