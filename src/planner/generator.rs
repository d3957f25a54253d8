use serde::Serialize;
use tracing::debug;

use super::interval::overlaps;
use super::model::{ClassOption, CourseOptionSet, Schedule};

/// Bounds on how much of the search space is enumerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Stop after this many schedules; `None` enumerates everything.
    pub max_candidates: Option<usize>,
}

impl SearchLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Stop after `max_candidates` schedules. A cap of zero yields no
    /// candidates at all, which [`plan`](super::plan) rejects as a caller error.
    pub fn capped(max_candidates: usize) -> Self {
        Self {
            max_candidates: Some(max_candidates),
        }
    }

    fn remaining(&self, emitted: usize) -> usize {
        self.max_candidates
            .map_or(usize::MAX, |max| max.saturating_sub(emitted))
    }
}

/// Two options from different courses that cannot be taken together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub first: ClassOption,
    pub second: ClassOption,
}

/// Enumerate every conflict-free combination picking one option per course.
///
/// Courses with no options are skipped. When nothing is left to place the
/// result is a single empty schedule; an empty result means no combination
/// survived.
pub fn generate(options: &CourseOptionSet) -> Vec<Schedule> {
    generate_with_limits(options, &SearchLimits::unbounded())
}

/// Depth-first enumeration stopping once `limits` is reached.
///
/// The output is always a prefix of what [`generate`] returns.
pub fn generate_with_limits(options: &CourseOptionSet, limits: &SearchLimits) -> Vec<Schedule> {
    let courses = options.active_courses();
    if courses.is_empty() {
        return vec![Schedule::empty()];
    }

    let slots: Vec<&[ClassOption]> = courses.iter().map(|(_, opts)| *opts).collect();
    let schedules = extend(&slots, &[], limits, 0);
    debug!(
        courses = slots.len(),
        candidates = schedules.len(),
        "candidate generation finished"
    );
    schedules
}

// Returns the schedules reachable from `placed` by filling the remaining
// courses in order. `emitted` counts schedules already produced by earlier
// siblings so the limit applies to the whole search.
fn extend(
    remaining: &[&[ClassOption]],
    placed: &[ClassOption],
    limits: &SearchLimits,
    emitted: usize,
) -> Vec<Schedule> {
    let Some((current, rest)) = remaining.split_first() else {
        return vec![Schedule::from(placed.to_vec())];
    };

    let mut found = Vec::new();
    for option in current.iter() {
        if limits.remaining(emitted + found.len()) == 0 {
            break;
        }
        if placed.iter().any(|p| overlaps(&p.time, &option.time)) {
            continue;
        }
        let mut next = placed.to_vec();
        next.push(option.clone());
        found.extend(extend(rest, &next, limits, emitted + found.len()));
    }
    found
}

/// Every pair of options from different courses whose times overlap.
///
/// Used to explain to a student why no schedule could be built.
pub fn find_conflicts(options: &CourseOptionSet) -> Vec<Conflict> {
    let courses = options.active_courses();
    let mut conflicts = Vec::new();
    for (i, (_, left)) in courses.iter().enumerate() {
        for (_, right) in &courses[i + 1..] {
            for a in left.iter() {
                for b in right.iter() {
                    if overlaps(&a.time, &b.time) {
                        conflicts.push(Conflict {
                            first: a.clone(),
                            second: b.clone(),
                        });
                    }
                }
            }
        }
    }
    conflicts
}
