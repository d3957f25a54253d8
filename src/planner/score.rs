use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::model::Schedule;

/// Summary metrics of a schedule, compared lexicographically.
///
/// Field order matters: the derived `Ord` ranks fewer attendance days first,
/// then less idle time between classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ScheduleScore {
    pub distinct_days: usize,
    pub total_gap_minutes: u32,
}

/// Number of distinct weekdays with at least one class.
pub fn distinct_days(schedule: &Schedule) -> usize {
    schedule
        .entries()
        .iter()
        .filter_map(|e| e.time.day_key())
        .collect::<HashSet<_>>()
        .len()
}

/// Idle minutes between consecutive classes on the same day, summed over
/// the week. Back-to-back or overlapping classes add nothing.
///
/// Gaps are summed in seconds; the total is rounded down to whole minutes.
pub fn total_gap_minutes(schedule: &Schedule) -> u32 {
    let mut by_day: BTreeMap<String, Vec<(u32, u32)>> = BTreeMap::new();
    for entry in schedule.entries() {
        if let (Some(day), Some(span)) = (entry.time.day_key(), entry.time.seconds()) {
            by_day.entry(day).or_default().push(span);
        }
    }

    let gap_seconds: u32 = by_day
        .into_values()
        .map(|mut spans| {
            spans.sort_unstable();
            spans
                .windows(2)
                .map(|pair| pair[1].0.saturating_sub(pair[0].1))
                .sum::<u32>()
        })
        .sum();
    gap_seconds / 60
}

pub fn score(schedule: &Schedule) -> ScheduleScore {
    ScheduleScore {
        distinct_days: distinct_days(schedule),
        total_gap_minutes: total_gap_minutes(schedule),
    }
}
