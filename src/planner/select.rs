use serde::Serialize;
use thiserror::Error;
use tracing::info;

use super::generator::{Conflict, SearchLimits, find_conflicts, generate_with_limits};
use super::model::{CourseOptionSet, Schedule};
use super::score::{ScheduleScore, score};

/// Pick the schedule with the fewest attendance days, then the least idle time.
///
/// Full ties keep the earliest candidate, so the result is deterministic for a
/// given input order. Returns `None` for an empty slice.
pub fn select_best(schedules: &[Schedule]) -> Option<&Schedule> {
    let mut best: Option<(&Schedule, ScheduleScore)> = None;
    for candidate in schedules {
        let candidate_score = score(candidate);
        match best {
            Some((_, best_score)) if candidate_score >= best_score => {}
            _ => best = Some((candidate, candidate_score)),
        }
    }
    best.map(|(schedule, _)| schedule)
}

/// The recommended timetable for one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub schedule: Schedule,
    pub score: ScheduleScore,
    /// How many feasible combinations were compared.
    pub candidates: usize,
}

#[derive(Debug, Error)]
pub enum PlanError {
    /// The selected classes cannot all be attended.
    #[error("selections conflict: no feasible combination ({} conflicting pairs)", .conflicts.len())]
    NoFeasibleCombination { conflicts: Vec<Conflict> },
    #[error("search limit of zero candidates leaves nothing to choose from")]
    ZeroCandidateLimit,
}

/// Generate candidates for `options` and return the best one.
///
/// A zero candidate cap is rejected up front so it is never mistaken for an
/// infeasible selection.
pub fn plan(options: &CourseOptionSet, limits: &SearchLimits) -> Result<Plan, PlanError> {
    if limits.max_candidates == Some(0) {
        return Err(PlanError::ZeroCandidateLimit);
    }
    let candidates = generate_with_limits(options, limits);
    let Some(best) = select_best(&candidates) else {
        let conflicts = find_conflicts(options);
        info!(
            conflicts = conflicts.len(),
            "no feasible combination for selected courses"
        );
        return Err(PlanError::NoFeasibleCombination { conflicts });
    };

    let plan = Plan {
        schedule: best.clone(),
        score: score(best),
        candidates: candidates.len(),
    };
    info!(
        candidates = plan.candidates,
        days = plan.score.distinct_days,
        gap_minutes = plan.score.total_gap_minutes,
        "selected best schedule"
    );
    Ok(plan)
}
