//! Per-student timetable search.
//!
//! [`generate`] enumerates conflict-free combinations of class options,
//! [`select_best`] ranks them by [`ScheduleScore`] and [`plan`] ties both
//! together for the common "recommend one timetable" case.

mod generator;
mod interval;
mod model;
mod score;
mod select;

pub use generator::{Conflict, SearchLimits, find_conflicts, generate, generate_with_limits};
pub use interval::{TimeInterval, overlaps, second_of_day};
pub use model::{ClassOption, CourseOptionSet, Schedule};
pub use score::{ScheduleScore, distinct_days, score, total_gap_minutes};
pub use select::{Plan, PlanError, plan, select_best};
