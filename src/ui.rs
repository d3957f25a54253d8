//! Terminal output: spinners and coloured summaries.
//!
//! Uses `indicatif` for the progress spinner and `console` for colours.
//! [`SolverProgress`] follows one solver run in the terminal.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use course_planner::gateway::{SolverJob, SolverStatus};
use course_planner::planner::{Conflict, Plan, Schedule, ScheduleScore};

/// Spinner shown while the external solver runs.
///
/// Finishes with a green line on success, yellow for retryable failures and
/// red otherwise.
pub struct SolverProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl SolverProgress {
    pub fn start(job_id: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(format!("solver job {job_id}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Clear the spinner and print the outcome line.
    pub fn complete(&self, job: &SolverJob) {
        self.pb.finish_and_clear();
        match job.status {
            SolverStatus::Succeeded => {
                println!("  {} Solver succeeded: {}", self.green.apply_to("✓"), job.message);
            }
            status if status.is_retryable() => {
                println!(
                    "  {} Solver {status} (retry may help): {}",
                    self.yellow.apply_to("↻"),
                    job.message
                );
            }
            status => {
                println!("  {} Solver {status}: {}", self.red.apply_to("✗"), job.message);
            }
        }
    }

    /// Print the job record as pretty JSON.
    pub fn print_record(&self, job: &SolverJob) {
        let style = if job.is_success() { &self.green } else { &self.red };
        println!();
        println!("{}", style.apply_to("─── Solver Job ───"));
        println!("{}", serde_json::to_string_pretty(job).unwrap_or_default());
    }
}

pub fn print_plan(plan: &Plan) {
    let bold = Style::new().bold();
    println!(
        "{} ({} candidate{})",
        bold.apply_to("Recommended schedule"),
        plan.candidates,
        if plan.candidates == 1 { "" } else { "s" }
    );
    print_schedule(&plan.schedule, &plan.score);
}

pub fn print_candidates(candidates: &[(Schedule, ScheduleScore)]) {
    for (i, (schedule, score)) in candidates.iter().enumerate() {
        println!("{}", Style::new().bold().apply_to(format!("Candidate {}", i + 1)));
        print_schedule(schedule, score);
    }
}

fn print_schedule(schedule: &Schedule, score: &ScheduleScore) {
    for entry in schedule.entries() {
        println!(
            "  {:<10} {:<4} {}-{}  {}",
            entry.course_id,
            entry.time.day.as_deref().unwrap_or("?"),
            fmt_time(entry.time.start),
            fmt_time(entry.time.end),
            entry.room.as_deref().unwrap_or("")
        );
    }
    println!(
        "  {} day(s), {} minute(s) between classes",
        score.distinct_days, score.total_gap_minutes
    );
}

pub fn print_conflicts(conflicts: &[Conflict]) {
    let red = Style::new().red().bold();
    println!("{} the selected classes cannot all be attended", red.apply_to("✗"));
    for c in conflicts {
        println!(
            "  {} ({} {}-{}) overlaps {} ({} {}-{})",
            c.first.course_id,
            c.first.time.day.as_deref().unwrap_or("?"),
            fmt_time(c.first.time.start),
            fmt_time(c.first.time.end),
            c.second.course_id,
            c.second.time.day.as_deref().unwrap_or("?"),
            fmt_time(c.second.time.start),
            fmt_time(c.second.time.end),
        );
    }
}

fn fmt_time(t: Option<chrono::NaiveTime>) -> String {
    t.map_or_else(|| "??:??".to_string(), |t| t.format("%H:%M").to_string())
}
