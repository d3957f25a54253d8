use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::gateway::{SolverGateway, SolverJob, SolverRequest};
use crate::planner::{CourseOptionSet, Plan, PlanError, plan};

/// Entry point used by callers: per-student planning and delegated solving.
pub struct SchedulingEngine {
    config: EngineConfig,
    gateway: SolverGateway,
}

/// Read and deserialize a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, EngineError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

impl SchedulingEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let gateway = SolverGateway::from_config(&config.solver);
        Ok(Self { config, gateway })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recommend one timetable for the given selections.
    pub fn plan(&self, options: &CourseOptionSet) -> Result<Plan, PlanError> {
        plan(options, &self.config.search.limits())
    }

    pub fn plan_file(&self, path: &Path) -> Result<Plan, EngineError> {
        let options: CourseOptionSet = load_json(path)?;
        info!(path = %path.display(), courses = options.len(), "planning from file");
        Ok(self.plan(&options)?)
    }

    /// Build a request for the configured solver with unique handoff names.
    ///
    /// `timeout` and `job_id` default to the configured deadline and a fresh
    /// UUID.
    pub fn solver_request(
        &self,
        payload: Value,
        timeout: Option<Duration>,
        job_id: Option<&str>,
    ) -> SolverRequest {
        let solver = &self.config.solver;
        let timeout = timeout.unwrap_or_else(|| solver.timeout());
        match job_id {
            Some(id) => SolverRequest::for_job_id(
                id,
                &solver.executable,
                &solver.script,
                payload,
                timeout,
            ),
            None => SolverRequest::for_job(&solver.executable, &solver.script, payload, timeout),
        }
    }

    pub async fn solve(&self, request: &SolverRequest) -> Result<SolverJob, EngineError> {
        Ok(self.gateway.run(request).await?)
    }

    pub async fn solve_file(
        &self,
        path: &Path,
        timeout: Option<Duration>,
        job_id: Option<&str>,
    ) -> Result<SolverJob, EngineError> {
        let payload: Value = load_json(path)?;
        let request = self.solver_request(payload, timeout, job_id);
        self.solve(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::SolverStatus;
    use serde_json::json;
    use tempfile::TempDir;

    fn engine_in(dir: &Path, script_body: &str) -> SchedulingEngine {
        let script = dir.join("solver.sh");
        std::fs::write(&script, script_body).unwrap();
        let mut config = EngineConfig::default();
        config.solver.executable = "sh".into();
        config.solver.script = script;
        config.solver.input_dir = dir.join("input");
        config.solver.output_dir = dir.join("output");
        config.solver.timeout_secs = 10;
        SchedulingEngine::new(config).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.search.max_candidates = Some(0);
        assert!(matches!(
            SchedulingEngine::new(config),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn plan_file_reads_option_set() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(
            &path,
            json!({
                "CS101": [{"course_id": "CS101", "day": "Mon", "start": "09:00", "end": "10:30"}],
                "MA101": [{"course_id": "MA101", "day": "Mon", "start": "10:30", "end": "12:00"}]
            })
            .to_string(),
        )
        .unwrap();
        let engine = engine_in(dir.path(), "exit 0\n");

        let plan = engine.plan_file(&path).unwrap();
        assert_eq!(plan.schedule.course_ids(), vec!["CS101", "MA101"]);
        assert_eq!(plan.candidates, 1);
    }

    #[test]
    fn plan_file_surfaces_conflicts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(
            &path,
            json!({
                "CS101": [{"course_id": "CS101", "day": "Mon", "start": "09:00", "end": "10:30"}],
                "MA101": [{"course_id": "MA101", "day": "Mon", "start": "10:00", "end": "11:00"}]
            })
            .to_string(),
        )
        .unwrap();
        let engine = engine_in(dir.path(), "exit 0\n");

        let err = engine.plan_file(&path).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Plan(PlanError::NoFeasibleCombination { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(dir.path(), "exit 0\n");
        let err = engine.plan_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }

    #[test]
    fn solver_request_uses_config_defaults() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(dir.path(), "exit 0\n");

        let req = engine.solver_request(json!({}), None, Some("run-7"));
        assert_eq!(req.timeout, Duration::from_secs(10));
        assert_eq!(req.input_file_name, "input_run-7.json");
        assert_eq!(req.executable, Path::new("sh"));

        let req = engine.solver_request(json!({}), Some(Duration::from_secs(2)), None);
        assert_eq!(req.timeout, Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn solve_file_runs_configured_solver() {
        let dir = TempDir::new().unwrap();
        let payload_path = dir.path().join("problem.json");
        std::fs::write(&payload_path, r#"{"semester": "2026-1"}"#).unwrap();
        let engine = engine_in(
            dir.path(),
            r#"printf '{"status": "success", "data": %s}' "$(cat "$SOLVER_INPUT_PATH")" > "$SOLVER_OUTPUT_PATH""#,
        );

        let job = engine.solve_file(&payload_path, None, None).await.unwrap();
        assert_eq!(job.status, SolverStatus::Succeeded);
        assert_eq!(job.data(), Some(&json!({"semester": "2026-1"})));
    }
}
