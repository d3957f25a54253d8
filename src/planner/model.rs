use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::interval::TimeInterval;

/// One offered meeting of a course that a student could attend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassOption {
    pub course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(flatten)]
    pub time: TimeInterval,
    /// Upstream fields the engine does not interpret (instructor, capacity, ...).
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ClassOption {
    pub fn new(course_id: &str, time: TimeInterval) -> Self {
        Self {
            course_id: course_id.to_string(),
            section: None,
            room: None,
            time,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_room(mut self, room: &str) -> Self {
        self.room = Some(room.to_string());
        self
    }

    pub fn with_section(mut self, section: &str) -> Self {
        self.section = Some(section.to_string());
        self
    }
}

/// Candidate options keyed by course id, iterated in key order.
///
/// An empty option list means the course has no class chosen and is skipped
/// by the search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseOptionSet(BTreeMap<String, Vec<ClassOption>>);

impl CourseOptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the options for `course_id`.
    pub fn insert(&mut self, course_id: impl Into<String>, options: Vec<ClassOption>) {
        self.0.insert(course_id.into(), options);
    }

    pub fn with(mut self, course_id: impl Into<String>, options: Vec<ClassOption>) -> Self {
        self.insert(course_id, options);
        self
    }

    /// Courses that actually have something to place, in search order.
    pub fn active_courses(&self) -> Vec<(&str, &[ClassOption])> {
        self.0
            .iter()
            .filter(|(_, options)| !options.is_empty())
            .map(|(id, options)| (id.as_str(), options.as_slice()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<ClassOption>)> for CourseOptionSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<ClassOption>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A conflict-free selection of class options, at most one per course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    entries: Vec<ClassOption>,
}

impl Schedule {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ClassOption] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn course_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.course_id.as_str()).collect()
    }
}

impl From<Vec<ClassOption>> for Schedule {
    fn from(entries: Vec<ClassOption>) -> Self {
        Self { entries }
    }
}
