//! # Signal Rules
//!
//! The "signal bible" crate - the data model and pure rules behind Signal Lost.
//! This crate is the single source of truth for what signals exist, what held
//! equipment does to reception, and what each progression stage demands. It
//! holds no session state and runs no detection.
//!
//! ## Contents
//!
//! - **signals**: signal definitions, the catalog, the tunable band and static profile
//! - **equipment**: inventory-driven reception modifiers
//! - **narrative**: narrative thread definitions
//! - **progression**: the ordered story stages and their requirements
//! - **world_state**: externally supplied quest, location and inventory facts
//! - **config**: the TOML signal pack that seeds all of the above

pub mod config;
pub mod equipment;
mod ids;
pub mod narrative;
pub mod progression;
pub mod signals;
pub mod world_state;

pub use config::*;
pub use equipment::*;
pub use ids::*;
pub use narrative::*;
pub use progression::*;
pub use signals::*;
pub use world_state::*;
