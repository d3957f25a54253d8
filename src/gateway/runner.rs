use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, warn};

use super::error::GatewayError;
use super::job::{SolverJob, SolverRequest, SolverStatus};
use super::output::{excerpt, parse_output};
use super::state::GatewayState;
use crate::config::SolverConfig;

/// Environment variable carrying the absolute input file path to the solver.
pub const ENV_INPUT_PATH: &str = "SOLVER_INPUT_PATH";
/// Environment variable carrying the absolute output file path to the solver.
pub const ENV_OUTPUT_PATH: &str = "SOLVER_OUTPUT_PATH";

const READ_CHUNK: usize = 4096;

/// Hands problems to an external solver process through JSON files.
///
/// One gateway can serve many concurrent runs as long as each request uses
/// its own file names (see [`SolverRequest::for_job`]).
#[derive(Debug, Clone)]
pub struct SolverGateway {
    input_dir: PathBuf,
    output_dir: PathBuf,
    args: Vec<String>,
    drain_grace: Duration,
    excerpt_chars: usize,
}

/// How waiting on the child ended.
enum Exit {
    Exited(ExitStatus),
    TimedOut,
    WaitFailed(std::io::Error),
}

impl SolverGateway {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let defaults = SolverConfig::default();
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            args: defaults.args.clone(),
            drain_grace: defaults.drain_grace(),
            excerpt_chars: defaults.excerpt_chars,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            input_dir: config.input_dir.clone(),
            output_dir: config.output_dir.clone(),
            args: config.args.clone(),
            drain_grace: config.drain_grace(),
            excerpt_chars: config.excerpt_chars,
        }
    }

    /// Arguments placed between the executable and the script.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    pub fn with_excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = chars;
        self
    }

    pub fn input_path(&self, request: &SolverRequest) -> PathBuf {
        self.input_dir.join(&request.input_file_name)
    }

    pub fn output_path(&self, request: &SolverRequest) -> PathBuf {
        self.output_dir.join(&request.output_file_name)
    }

    /// Run the solver for `request` and classify what it produced.
    ///
    /// Only a failure to prepare the handoff directories is returned as an
    /// error; every other outcome is described by the returned job's status.
    /// Dropping the future kills the solver.
    pub async fn run(&self, request: &SolverRequest) -> Result<SolverJob, GatewayError> {
        let mut job = SolverJob::new(request);
        info!(job_id = %job.job_id, executable = %request.executable.display(), "starting solver job");

        job.advance(GatewayState::WritingInput);
        let input_dir = prepare_dir(&self.input_dir).await?;
        let output_dir = prepare_dir(&self.output_dir).await?;
        let input_path = input_dir.join(&request.input_file_name);
        let output_path = output_dir.join(&request.output_file_name);

        if let Err(e) = write_input(&input_path, &request.input_payload).await {
            let message = format!("failed to write solver input {}: {e}", input_path.display());
            warn!(job_id = %job.job_id, "{message}");
            return Ok(job.finish(SolverStatus::FailedIo, message));
        }
        remove_stale_output(&output_path).await;

        let mut child = match self.spawn(request, &input_path, &output_path) {
            Ok(child) => child,
            Err(message) => {
                warn!(job_id = %job.job_id, "{message}");
                return Ok(job.finish(SolverStatus::FailedProcess, message));
            }
        };
        job.pid = child.id();
        job.advance(GatewayState::Spawned);

        // Nothing is sent interactively; closing stdin lets readers see EOF.
        drop(child.stdin.take());
        let stdout = child.stdout.take().map(spawn_drain);
        let stderr = child.stderr.take().map(spawn_drain);

        job.advance(GatewayState::Polling);
        debug!(job_id = %job.job_id, pid = ?job.pid, "polling solver");
        let exit = supervise(&mut child, request.timeout).await;

        let deadline = Instant::now() + self.drain_grace;
        let (stdout_log, stderr_log) = tokio::join!(collect(stdout, deadline), collect(stderr, deadline));
        job.stdout_log = stdout_log;
        job.stderr_log = stderr_log;

        let status = match exit {
            Exit::Exited(status) => status,
            Exit::TimedOut => {
                let note = format!(
                    "solver exceeded its {}s deadline and was terminated",
                    request.timeout.as_secs_f64()
                );
                if !job.stderr_log.is_empty() && !job.stderr_log.ends_with('\n') {
                    job.stderr_log.push('\n');
                }
                job.stderr_log.push_str(&note);
                warn!(job_id = %job.job_id, "{note}");
                return Ok(job.finish(SolverStatus::FailedTimeout, note));
            }
            Exit::WaitFailed(e) => {
                let message = format!("failed to wait for solver: {e}");
                warn!(job_id = %job.job_id, "{message}");
                return Ok(job.finish(SolverStatus::FailedProcess, message));
            }
        };

        job.exit_code = status.code();
        if !status.success() {
            let code = status
                .code()
                .map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string());
            let message = format!(
                "solver exited with code {code}: {}",
                captured(&job, self.excerpt_chars)
            );
            warn!(job_id = %job.job_id, exit_code = ?job.exit_code, "solver process failed");
            return Ok(job.finish(SolverStatus::FailedProcess, message));
        }

        Ok(self.read_result(job, &output_path).await)
    }

    fn spawn(
        &self,
        request: &SolverRequest,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<Child, String> {
        let script = std::path::absolute(&request.script)
            .map_err(|e| format!("cannot resolve solver script {}: {e}", request.script.display()))?;
        let executable = resolve_program(&request.executable)
            .map_err(|e| format!("cannot resolve solver executable {}: {e}", request.executable.display()))?;

        let mut command = Command::new(&executable);
        command
            .args(&self.args)
            .arg(&script)
            .env(ENV_INPUT_PATH, input_path)
            .env(ENV_OUTPUT_PATH, output_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // The solver leads its own process group so a timeout can take down
        // anything it started.
        #[cfg(unix)]
        command.process_group(0);
        if let Some(dir) = script.parent() {
            command.current_dir(dir);
        }

        command
            .spawn()
            .map_err(|e| format!("failed to launch solver {}: {e}", executable.display()))
    }

    async fn read_result(&self, job: SolverJob, output_path: &Path) -> SolverJob {
        let bytes = match tokio::fs::read(output_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let message = format!(
                    "solver exited successfully but wrote no output at {}: {}",
                    output_path.display(),
                    captured(&job, self.excerpt_chars)
                );
                warn!(job_id = %job.job_id, "{message}");
                return job.finish(SolverStatus::FailedIo, message);
            }
            Err(e) => {
                let message = format!("cannot read solver output {}: {e}", output_path.display());
                warn!(job_id = %job.job_id, "{message}");
                return job.finish(SolverStatus::FailedIo, message);
            }
        };
        let raw = match String::from_utf8(bytes) {
            Ok(raw) => raw,
            Err(e) => {
                let message = format!(
                    "solver output is not valid UTF-8 ({}); content: {}",
                    e.utf8_error(),
                    excerpt(&String::from_utf8_lossy(e.as_bytes()), self.excerpt_chars)
                );
                warn!(job_id = %job.job_id, "{message}");
                return job.finish(SolverStatus::FailedIo, message);
            }
        };

        let output = match parse_output(&raw, self.excerpt_chars) {
            Ok(output) => output,
            Err(message) => {
                warn!(job_id = %job.job_id, "{message}");
                return job.finish(SolverStatus::FailedIo, message);
            }
        };

        let mut job = job;
        let (status, message) = if output.is_success() {
            let message = output
                .message
                .clone()
                .unwrap_or_else(|| "solver completed successfully".to_string());
            (SolverStatus::Succeeded, message)
        } else {
            let message = output
                .message
                .clone()
                .unwrap_or_else(|| format!("solver reported status `{}`", output.status));
            (SolverStatus::FailedLogic, message)
        };
        job.output_payload = Some(output.document);
        let job = job.finish(status, message);
        info!(job_id = %job.job_id, status = %job.status, duration_ms = job.duration_ms, "solver job finished");
        job
    }
}

// Creates the directory when missing and returns its absolute path, which is
// what the solver sees since it runs from a different working directory.
async fn prepare_dir(dir: &Path) -> Result<PathBuf, GatewayError> {
    let workspace_err = |source| GatewayError::Workspace {
        path: dir.to_path_buf(),
        source,
    };
    tokio::fs::create_dir_all(dir).await.map_err(workspace_err)?;
    tokio::fs::canonicalize(dir).await.map_err(workspace_err)
}

async fn write_input(path: &Path, payload: &serde_json::Value) -> std::io::Result<()> {
    let body = serde_json::to_vec_pretty(payload)?;
    tokio::fs::write(path, body).await
}

async fn remove_stale_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed stale solver output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove stale solver output"),
    }
}

// Bare names go through PATH lookup; anything with a directory part is made
// absolute so the changed working directory does not affect it.
fn resolve_program(program: &Path) -> std::io::Result<PathBuf> {
    if program.components().count() > 1 {
        std::path::absolute(program)
    } else {
        Ok(program.to_path_buf())
    }
}

async fn supervise(child: &mut Child, limit: Duration) -> Exit {
    let waited = if limit.is_zero() {
        Ok(child.wait().await)
    } else {
        timeout(limit, child.wait()).await
    };

    match waited {
        Ok(Ok(status)) => Exit::Exited(status),
        Ok(Err(e)) => Exit::WaitFailed(e),
        Err(_) => {
            #[cfg(unix)]
            if let Some(pid) = child.id() {
                kill_process_group(pid).await;
            }
            // `kill` also reaps the child, so it is gone once this returns.
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill timed out solver");
            }
            Exit::TimedOut
        }
    }
}

// A negative pid addresses the whole group led by the solver.
#[cfg(unix)]
async fn kill_process_group(pid: u32) {
    let result = Command::new("kill")
        .arg("-KILL")
        .arg("--")
        .arg(format!("-{pid}"))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    match result {
        Ok(status) if status.success() => debug!(pid, "killed solver process group"),
        Ok(status) => debug!(pid, %status, "solver process group already gone"),
        Err(e) => warn!(pid, error = %e, "failed to signal solver process group"),
    }
}

/// Background reader forwarding chunks of one pipe as they arrive.
struct Drain {
    chunks: mpsc::UnboundedReceiver<Vec<u8>>,
    task: JoinHandle<()>,
}

fn spawn_drain<R>(mut reader: R) -> Drain
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, chunks) = mpsc::unbounded_channel();
    let task = tokio::spawn(async move {
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "solver pipe read failed");
                    break;
                }
            }
        }
    });
    Drain { chunks, task }
}

// Gathers everything a pipe produced until EOF or `deadline`. A grandchild
// that inherited the pipe may keep it open forever, hence the deadline.
async fn collect(drain: Option<Drain>, deadline: Instant) -> String {
    let Some(Drain { mut chunks, task }) = drain else {
        return String::new();
    };
    let mut bytes = Vec::new();
    loop {
        match timeout_at(deadline, chunks.recv()).await {
            Ok(Some(chunk)) => bytes.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(_) => {
                debug!("solver pipe still open after drain grace period");
                task.abort();
                break;
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

// Captured logs for diagnostics, stderr first.
fn captured(job: &SolverJob, max_chars: usize) -> String {
    let log = if job.stderr_log.trim().is_empty() {
        &job.stdout_log
    } else {
        &job.stderr_log
    };
    let log = log.trim();
    if log.is_empty() {
        "no output captured".to_string()
    } else {
        excerpt(log, max_chars)
    }
}
