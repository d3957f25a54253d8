//! Engine configuration loaded from `course-planner.toml`.
//!
//! [`EngineConfig`] holds every tunable. Keys missing from the file fall back
//! to sensible defaults, and the solver location can be overridden with the
//! `COURSE_PLANNER_SOLVER_EXECUTABLE` / `COURSE_PLANNER_SOLVER_SCRIPT`
//! environment variables, which take precedence over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::planner::SearchLimits;

pub const CONFIG_FILE: &str = "course-planner.toml";
pub const ENV_SOLVER_EXECUTABLE: &str = "COURSE_PLANNER_SOLVER_EXECUTABLE";
pub const ENV_SOLVER_SCRIPT: &str = "COURSE_PLANNER_SOLVER_SCRIPT";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub solver: SolverConfig,
}

/// Limits for the per-student candidate search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Stop enumerating after this many candidate schedules.
    #[serde(default)]
    pub max_candidates: Option<usize>,
}

impl SearchConfig {
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_candidates: self.max_candidates,
        }
    }
}

/// How to reach the external solver and where to exchange files with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    #[serde(default = "default_script")]
    pub script: PathBuf,

    /// Extra arguments placed between the executable and the script.
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Deadline for one solver run in seconds; 0 disables it.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How long to keep collecting output after the solver has exited.
    #[serde(default = "default_drain_grace_ms")]
    pub drain_grace_ms: u64,

    /// Maximum characters of raw output quoted in diagnostics.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

fn default_executable() -> PathBuf {
    PathBuf::from("python3")
}

fn default_script() -> PathBuf {
    PathBuf::from("solver/main.py")
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("solver/data/input")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("solver/data/output")
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_drain_grace_ms() -> u64 {
    2000
}

fn default_excerpt_chars() -> usize {
    500
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            script: default_script(),
            args: Vec::new(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            timeout_secs: default_timeout_secs(),
            drain_grace_ms: default_drain_grace_ms(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

impl SolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }
}

impl EngineConfig {
    /// Load `course-planner.toml` from the current directory, or defaults
    /// when it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Self::parse(&contents).with_context(|| format!("invalid {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, EngineError> {
        Ok(toml::from_str::<EngineConfig>(contents)?)
    }

    /// Reject settings the gateway cannot work with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.solver.script.as_os_str().is_empty() {
            return Err(EngineError::Config("solver.script must not be empty".into()));
        }
        if self.solver.executable.as_os_str().is_empty() {
            return Err(EngineError::Config("solver.executable must not be empty".into()));
        }
        if self.search.max_candidates == Some(0) {
            return Err(EngineError::Config("search.max_candidates must be at least 1".into()));
        }
        Ok(())
    }

    // Environment variables win over the file for the solver location.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(exe) = lookup(ENV_SOLVER_EXECUTABLE).filter(|v| !v.is_empty()) {
            self.solver.executable = PathBuf::from(exe);
        }
        if let Some(script) = lookup(ENV_SOLVER_SCRIPT).filter(|v| !v.is_empty()) {
            self.solver.script = PathBuf::from(script);
        }
    }
}
