//! Command line interface built on clap.
//!
//! [`Cli`] exposes the `plan`, `solve` and `config` subcommands plus the
//! global `--verbose` and `--max-candidates` flags.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Course scheduling decision engine.
#[derive(Debug, Parser)]
#[command(name = "course-planner", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Cap on candidate schedules enumerated per plan.
    #[arg(long, global = true)]
    pub max_candidates: Option<usize>,

    /// Enable debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recommend a timetable from a JSON map of course id to class options.
    Plan {
        /// Path to the course option set.
        file: PathBuf,

        /// Print every feasible candidate instead of only the best one.
        #[arg(long, default_value_t = false)]
        all: bool,
    },

    /// Hand a JSON problem to the configured external solver.
    Solve {
        /// Path to the problem payload.
        payload: PathBuf,

        /// Deadline in seconds (0 waits forever); defaults to the config value.
        #[arg(long)]
        timeout: Option<u64>,

        /// Identifier used to name the handoff files.
        #[arg(long)]
        job_id: Option<String>,
    },

    /// Print the effective configuration.
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_plan_subcommand() {
        let cli = Cli::parse_from(["course-planner", "plan", "options.json"]);
        match cli.command {
            Command::Plan { file, all } => {
                assert_eq!(file, PathBuf::from("options.json"));
                assert!(!all);
            }
            _ => panic!("expected Plan command"),
        }
    }

    #[test]
    fn cli_parses_solve_flags() {
        let cli = Cli::parse_from([
            "course-planner",
            "solve",
            "problem.json",
            "--timeout",
            "30",
            "--job-id",
            "fall-2026",
        ]);
        match cli.command {
            Command::Solve {
                payload,
                timeout,
                job_id,
            } => {
                assert_eq!(payload, PathBuf::from("problem.json"));
                assert_eq!(timeout, Some(30));
                assert_eq!(job_id.as_deref(), Some("fall-2026"));
            }
            _ => panic!("expected Solve command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "course-planner",
            "--max-candidates",
            "50",
            "--verbose",
            "config",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.max_candidates, Some(50));
        assert!(matches!(cli.command, Command::Config));
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
