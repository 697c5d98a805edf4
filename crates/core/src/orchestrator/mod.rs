//! Intercept orchestrator: one pick-and-place cycle per tick.
//!
//! The orchestrator drives each task through the segment pipeline:
//! - **Approach** and **Place** run on the transport group
//! - **Pick** and **Retreat** run on the manipulator group
//! - **Return** to the safe pose always runs, on every exit path
//!
//! Only one cycle runs at a time; ticks that arrive while a cycle is in
//! flight leave the queue untouched.

mod config;
mod guard;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::InterceptOrchestrator;
pub use types::{
    CycleReport, CycleState, OrchestratorError, OrchestratorStatus, ProceedFlag, TickOutcome,
};
