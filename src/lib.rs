//! Scheduling decision engine for a university course portal.
//!
//! Two independent parts:
//! - [`planner`]: conflict-aware search over a student's class options,
//!   ranking feasible timetables by attendance days and idle time.
//! - [`gateway`]: delegation of institution-wide problems to an external
//!   solver process through JSON files, under a deadline.
//!
//! [`SchedulingEngine`] wires both to an [`EngineConfig`].

pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod planner;

pub use config::EngineConfig;
pub use engine::SchedulingEngine;
pub use error::EngineError;
