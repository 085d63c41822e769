//! Session state module
//!
//! Run data and the cooperative scheduler. Pure and deterministic:
//! - Time only moves through `Clock::advance`
//! - No engine, rendering or platform dependencies

pub mod scheduler;
pub mod state;

pub use scheduler::{Clock, Scheduler, Wake};
pub use state::{
    ContentDisplay, GameMode, PlayerRuntimeData, RunningState, RuntimeSessionData, SessionState,
    SpawnZone,
};
