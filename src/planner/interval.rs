use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A weekly meeting slot: a weekday label plus a start and end time.
///
/// Every field is optional because upstream records are not guaranteed to be
/// complete. Intervals with missing parts never conflict with anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    /// Weekday label as supplied upstream ("Mon", "monday", "MON", ...).
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default, with = "clock")]
    pub start: Option<NaiveTime>,
    #[serde(default, with = "clock")]
    pub end: Option<NaiveTime>,
}

impl TimeInterval {
    /// Build a complete interval from `"HH:MM"` strings.
    ///
    /// Unparseable times are stored as absent, mirroring deserialization.
    pub fn new(day: &str, start: &str, end: &str) -> Self {
        Self {
            day: Some(day.to_string()),
            start: clock::parse(start),
            end: clock::parse(end),
        }
    }

    /// Lowercased, trimmed weekday label used for every day comparison.
    pub fn day_key(&self) -> Option<String> {
        self.day
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_lowercase)
    }

    /// Start and end as second-of-day, when both are present.
    pub fn seconds(&self) -> Option<(u32, u32)> {
        Some((second_of_day(self.start?), second_of_day(self.end?)))
    }
}

pub fn second_of_day(t: NaiveTime) -> u32 {
    t.num_seconds_from_midnight()
}

/// Whether two intervals conflict.
///
/// Missing fields on either side yield `false`: a conflict that cannot be
/// proven is not reported. Same-day intervals are half-open, so a class
/// ending at 10:00 does not clash with one starting at 10:00.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    let (Some(day_a), Some(day_b)) = (a.day_key(), b.day_key()) else {
        return false;
    };
    if day_a != day_b {
        return false;
    }
    let (Some((start_a, end_a)), Some((start_b, end_b))) = (a.seconds(), b.seconds()) else {
        return false;
    };
    start_a.max(start_b) < end_a.min(end_b)
}

/// Lenient `"HH:MM[:SS]"` (de)serialization for optional times. Seconds are
/// written back only when non-zero.
mod clock {
    use super::*;

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok()
    }

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) if t.second() == 0 => s.serialize_str(&t.format("%H:%M").to_string()),
            Some(t) => s.serialize_str(&t.format("%H:%M:%S").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().and_then(parse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_overlaps_itself() {
        let a = TimeInterval::new("Mon", "09:00", "10:00");
        assert!(overlaps(&a, &a));
    }

    #[test]
    fn different_days_never_overlap() {
        let a = TimeInterval::new("Mon", "09:00", "10:00");
        let b = TimeInterval::new("Tue", "09:00", "10:00");
        assert!(!overlaps(&a, &b));
        assert!(!overlaps(&b, &a));
    }

    #[test]
    fn shared_boundary_is_not_a_conflict() {
        let a = TimeInterval::new("Mon", "09:00", "10:00");
        let b = TimeInterval::new("Mon", "10:00", "11:00");
        assert!(!overlaps(&a, &b));
        assert!(!overlaps(&b, &a));
    }

    #[test]
    fn partial_and_nested_overlap() {
        let a = TimeInterval::new("Wed", "09:00", "10:30");
        let b = TimeInterval::new("Wed", "10:00", "11:00");
        let inner = TimeInterval::new("Wed", "09:15", "09:45");
        assert!(overlaps(&a, &b));
        assert!(overlaps(&a, &inner));
        assert!(!overlaps(&b, &inner));
    }

    #[test]
    fn day_comparison_ignores_case_and_whitespace() {
        let a = TimeInterval::new("MON", "09:00", "10:00");
        let b = TimeInterval::new(" mon ", "09:30", "10:30");
        assert!(overlaps(&a, &b));
    }

    #[test]
    fn missing_fields_are_fail_safe() {
        let full = TimeInterval::new("Mon", "09:00", "10:00");
        let no_day = TimeInterval {
            day: None,
            ..full.clone()
        };
        let no_end = TimeInterval {
            end: None,
            ..full.clone()
        };
        assert!(!overlaps(&full, &no_day));
        assert!(!overlaps(&no_end, &full));
        assert!(!overlaps(&TimeInterval::default(), &TimeInterval::default()));
    }

    #[test]
    fn inverted_interval_never_conflicts() {
        let inverted = TimeInterval::new("Mon", "11:00", "09:00");
        let normal = TimeInterval::new("Mon", "08:00", "12:00");
        assert!(!overlaps(&inverted, &normal));
    }

    #[test]
    fn deserializes_lenient_times() {
        let json = r#"{"day": "Fri", "start": "08:15", "end": "09:45:00"}"#;
        let t: TimeInterval = serde_json::from_str(json).unwrap();
        assert_eq!(t.seconds(), Some((29_700, 35_100)));

        let broken: TimeInterval =
            serde_json::from_str(r#"{"day": "Fri", "start": "late", "end": null}"#).unwrap();
        assert_eq!(broken.start, None);
        assert_eq!(broken.end, None);

        let empty: TimeInterval = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, TimeInterval::default());
    }

    #[test]
    fn serializes_as_hh_mm() {
        let t = TimeInterval::new("Thu", "13:05", "14:00");
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["start"], "13:05");
        assert_eq!(json["end"], "14:00");

        let precise = TimeInterval::new("Thu", "13:05:30", "14:00");
        let json = serde_json::to_value(&precise).unwrap();
        assert_eq!(json["start"], "13:05:30");
    }

    #[test]
    fn seconds_are_not_truncated() {
        let short = TimeInterval::new("Mon", "09:00:10", "09:00:50");
        assert!(overlaps(&short, &short));

        let a = TimeInterval::new("Mon", "09:00:00", "10:00:30");
        let b = TimeInterval::new("Mon", "10:00:15", "11:00:00");
        assert!(overlaps(&a, &b));
        assert!(overlaps(&b, &a));

        let c = TimeInterval::new("Mon", "10:00:30", "11:00:00");
        assert!(!overlaps(&a, &c));
    }
}
