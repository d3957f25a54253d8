mod cli;
mod ui;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use course_planner::planner::{self, PlanError};
use course_planner::{EngineConfig, EngineError, SchedulingEngine, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = EngineConfig::load()?;
    if let Some(max) = cli.max_candidates {
        config.search.max_candidates = Some(max);
    }
    let engine = SchedulingEngine::new(config)?;

    match cli.command {
        Command::Plan { file, all } => {
            if all {
                let options = course_planner::engine::load_json(&file)?;
                let candidates = planner::generate_with_limits(&options, &engine.config().search.limits());
                let scored: Vec<_> = candidates
                    .into_iter()
                    .map(|s| {
                        let score = planner::score(&s);
                        (s, score)
                    })
                    .collect();
                ui::print_candidates(&scored);
                if scored.is_empty() {
                    ui::print_conflicts(&planner::find_conflicts(&options));
                    std::process::exit(2);
                }
                return Ok(());
            }
            match engine.plan_file(&file) {
                Ok(plan) => ui::print_plan(&plan),
                Err(EngineError::Plan(PlanError::NoFeasibleCombination { conflicts })) => {
                    ui::print_conflicts(&conflicts);
                    std::process::exit(2);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Solve {
            payload,
            timeout,
            job_id,
        } => {
            let payload = course_planner::engine::load_json(&payload)?;
            let request = engine.solver_request(payload, timeout.map(Duration::from_secs), job_id.as_deref());
            let progress = ui::SolverProgress::start(&request.job_id);
            let job = engine.solve(&request).await?;
            progress.complete(&job);
            progress.print_record(&job);
            if !job.is_success() {
                std::process::exit(1);
            }
        }
        Command::Config => {
            println!("{}", toml::to_string_pretty(engine.config())?);
        }
    }

    Ok(())
}
