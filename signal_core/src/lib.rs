//! # Signal Core
//!
//! The engine behind the radio. This crate consumes the catalog and rules in
//! `signal_rules`, decides what the player hears at the tuned frequency, keeps
//! track of what has been discovered and decoded, and drives narrative threads
//! and the main-story progression from those discoveries.
//!
//! ## Core Components
//!
//! - **detection**: strength, eligibility and static at the tuned frequency
//! - **discovery**: which signals have been discovered and decoded
//! - **narrative**: thread discovery, progress and completion
//! - **progression**: the stage state machine
//! - **events**: the typed events handed to UI, audio and persistence layers
//! - **session**: wires the above into one synchronous pipeline per input
//!
//! ## Design Philosophy
//!
//! - **Event-Driven**: the core reacts to host inputs and never owns the game loop
//! - **Injected**: every component is constructed once and handed to the session
//! - **Total**: gameplay operations report "nothing happened" instead of failing

pub mod detection;
pub mod discovery;
pub mod events;
pub mod narrative;
pub mod progression;
pub mod session;
pub mod snapshot;

pub use detection::*;
pub use discovery::*;
pub use events::*;
pub use narrative::*;
pub use progression::*;
pub use session::*;
pub use snapshot::*;
