//! Delegated optimization through an external solver process.
//!
//! The gateway writes the problem to a JSON file, launches the solver with
//! the file locations in its environment, supervises it under a deadline and
//! classifies the JSON document it leaves behind.

pub mod error;
pub mod job;
pub mod output;
pub mod runner;
pub mod state;

pub use error::GatewayError;
pub use job::{SolverJob, SolverRequest, SolverStatus};
pub use output::{SolverOutput, parse_output};
pub use runner::{ENV_INPUT_PATH, ENV_OUTPUT_PATH, SolverGateway};
pub use state::GatewayState;
