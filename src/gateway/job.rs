use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::state::GatewayState;

/// Final classification of a solver invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    /// The solver exited cleanly and reported success.
    Succeeded,
    /// The solver could not be launched, crashed or exited non-zero.
    FailedProcess,
    /// The solver outlived its deadline and was killed.
    FailedTimeout,
    /// Handoff files could not be written, found, read or parsed.
    FailedIo,
    /// The solver finished but reported its own failure.
    FailedLogic,
}

impl SolverStatus {
    /// Whether running the same request again may succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, SolverStatus::FailedTimeout | SolverStatus::FailedIo)
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverStatus::Succeeded => write!(f, "succeeded"),
            SolverStatus::FailedProcess => write!(f, "process failure"),
            SolverStatus::FailedTimeout => write!(f, "timed out"),
            SolverStatus::FailedIo => write!(f, "I/O failure"),
            SolverStatus::FailedLogic => write!(f, "solver reported failure"),
        }
    }
}

/// Everything needed to hand one problem to the external solver.
#[derive(Debug, Clone)]
pub struct SolverRequest {
    pub job_id: String,
    /// Program to launch, e.g. `python3`.
    pub executable: PathBuf,
    /// Script passed to the program; its directory becomes the working directory.
    pub script: PathBuf,
    pub input_payload: Value,
    pub input_file_name: String,
    pub output_file_name: String,
    /// Wall-clock limit; `Duration::ZERO` waits forever.
    pub timeout: Duration,
}

impl SolverRequest {
    pub fn new(
        executable: impl Into<PathBuf>,
        script: impl Into<PathBuf>,
        input_payload: Value,
        input_file_name: impl Into<String>,
        output_file_name: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            executable: executable.into(),
            script: script.into(),
            input_payload,
            input_file_name: input_file_name.into(),
            output_file_name: output_file_name.into(),
            timeout,
        }
    }

    /// A request whose handoff files are named after a fresh job id, so
    /// concurrent runs never read each other's output.
    pub fn for_job(
        executable: impl Into<PathBuf>,
        script: impl Into<PathBuf>,
        input_payload: Value,
        timeout: Duration,
    ) -> Self {
        Self::for_job_id(
            &Uuid::new_v4().to_string(),
            executable,
            script,
            input_payload,
            timeout,
        )
    }

    pub fn for_job_id(
        job_id: &str,
        executable: impl Into<PathBuf>,
        script: impl Into<PathBuf>,
        input_payload: Value,
        timeout: Duration,
    ) -> Self {
        Self {
            job_id: job_id.to_string(),
            executable: executable.into(),
            script: script.into(),
            input_payload,
            input_file_name: format!("input_{job_id}.json"),
            output_file_name: format!("output_{job_id}.json"),
            timeout,
        }
    }
}

/// Record of one solver invocation, returned whatever the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverJob {
    pub job_id: String,
    pub status: SolverStatus,
    pub state: GatewayState,
    pub state_history: Vec<GatewayState>,
    /// Solver's own message on completion, otherwise a diagnostic.
    pub message: String,
    pub input_payload: Value,
    pub output_payload: Option<Value>,
    pub exit_code: Option<i32>,
    pub pid: Option<u32>,
    pub stdout_log: String,
    pub stderr_log: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: i64,
}

impl SolverJob {
    pub fn new(request: &SolverRequest) -> Self {
        Self {
            job_id: request.job_id.clone(),
            // Overwritten by `finish`; a job that never finishes is not returned.
            status: SolverStatus::FailedProcess,
            state: GatewayState::Idle,
            state_history: Vec::new(),
            message: String::new(),
            input_payload: request.input_payload.clone(),
            output_payload: None,
            exit_code: None,
            pid: None,
            stdout_log: String::new(),
            stderr_log: String::new(),
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: 0,
        }
    }

    /// Move to `next`, remembering the state being left.
    pub fn advance(&mut self, next: GatewayState) {
        self.state_history.push(self.state);
        self.state = next;
    }

    /// Close the job with its final classification.
    ///
    /// `Succeeded` and `FailedLogic` end in FINISHED since the solver ran to
    /// completion; every other status ends in FAILED.
    pub fn finish(mut self, status: SolverStatus, message: impl Into<String>) -> Self {
        debug_assert!(
            !self.state.is_terminal(),
            "solver job {} finished twice",
            self.job_id
        );
        let terminal = match status {
            SolverStatus::Succeeded | SolverStatus::FailedLogic => GatewayState::Finished,
            _ => GatewayState::Failed,
        };
        self.advance(terminal);
        self.status = status;
        self.message = message.into();
        let now = Utc::now();
        self.duration_ms = (now - self.started_at).num_milliseconds();
        self.finished_at = Some(now);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == SolverStatus::Succeeded
    }

    /// The `data` field of the solver's output document, if any.
    pub fn data(&self) -> Option<&Value> {
        self.output_payload.as_ref()?.get("data")
    }

    /// Every state visited, ending with the current one.
    pub fn transitions(&self) -> Vec<GatewayState> {
        let mut all = self.state_history.clone();
        all.push(self.state);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> SolverRequest {
        SolverRequest::for_job_id(
            "abc",
            "python3",
            "solver/main.py",
            json!({"rooms": 2}),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn for_job_derives_file_names_from_id() {
        let req = request();
        assert_eq!(req.input_file_name, "input_abc.json");
        assert_eq!(req.output_file_name, "output_abc.json");
    }

    #[test]
    fn for_job_names_are_unique() {
        let a = SolverRequest::for_job("sh", "a.sh", json!({}), Duration::ZERO);
        let b = SolverRequest::for_job("sh", "a.sh", json!({}), Duration::ZERO);
        assert_ne!(a.job_id, b.job_id);
        assert_ne!(a.output_file_name, b.output_file_name);
    }

    #[test]
    fn job_creation_defaults() {
        let job = SolverJob::new(&request());
        assert_eq!(job.job_id, "abc");
        assert_eq!(job.state, GatewayState::Idle);
        assert!(job.state_history.is_empty());
        assert!(job.output_payload.is_none());
        assert!(job.finished_at.is_none());
    }

    #[test]
    fn finish_records_transitions() {
        let mut job = SolverJob::new(&request());
        job.advance(GatewayState::WritingInput);
        job.advance(GatewayState::Spawned);
        job.advance(GatewayState::Polling);
        let job = job.finish(SolverStatus::FailedLogic, "infeasible");

        assert_eq!(
            job.transitions(),
            vec![
                GatewayState::Idle,
                GatewayState::WritingInput,
                GatewayState::Spawned,
                GatewayState::Polling,
                GatewayState::Finished,
            ]
        );
        assert!(job.finished_at.is_some());
        assert!(!job.is_success());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "finished twice")]
    fn finishing_twice_is_a_bug() {
        let job = SolverJob::new(&request()).finish(SolverStatus::Succeeded, "done");
        assert!(job.state.is_terminal());
        job.finish(SolverStatus::FailedIo, "again");
    }

    #[test]
    fn failures_end_in_failed_state() {
        let job = SolverJob::new(&request()).finish(SolverStatus::FailedTimeout, "too slow");
        assert_eq!(job.state, GatewayState::Failed);
        assert_eq!(job.message, "too slow");
    }

    #[test]
    fn data_reads_output_field() {
        let mut job = SolverJob::new(&request());
        assert!(job.data().is_none());
        job.output_payload = Some(json!({"status": "success", "data": [1, 2]}));
        assert_eq!(job.data(), Some(&json!([1, 2])));
    }

    #[test]
    fn retryable_statuses() {
        assert!(SolverStatus::FailedTimeout.is_retryable());
        assert!(SolverStatus::FailedIo.is_retryable());
        assert!(!SolverStatus::FailedLogic.is_retryable());
        assert!(!SolverStatus::FailedProcess.is_retryable());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SolverStatus::FailedIo).unwrap(),
            "\"failed_io\""
        );
    }

    #[test]
    fn job_serialization_roundtrip() {
        let job = SolverJob::new(&request()).finish(SolverStatus::Succeeded, "ok");
        let json = serde_json::to_string(&job).unwrap();
        let back: SolverJob = serde_json::from_str(&json).unwrap();
        assert_eq!(back.job_id, "abc");
        assert_eq!(back.status, SolverStatus::Succeeded);
        assert_eq!(back.state, GatewayState::Finished);
    }
}
