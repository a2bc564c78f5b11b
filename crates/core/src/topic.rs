use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Learning state of a single roadmap topic.
///
/// `NotStarted` is never stored; it is what [`Progress`] reports for a topic
/// it has no entry for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopicStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicStatus::NotStarted => write!(f, "Not Started"),
            TopicStatus::InProgress => write!(f, "in-progress"),
            TopicStatus::Completed => write!(f, "completed"),
        }
    }
}

/// The ordered list of topics produced once for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roadmap {
    subject: String,
    topics: Vec<String>,
}

impl Roadmap {
    pub fn new(subject: impl Into<String>, topics: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            topics,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Looks up a topic by its 1-based menu number.
    pub fn by_number(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.topics.get(idx))
            .map(String::as_str)
    }
}

/// Per-topic learning state for the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    statuses: HashMap<String, TopicStatus>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, topic: &str) -> TopicStatus {
        self.statuses
            .get(topic)
            .copied()
            .unwrap_or(TopicStatus::NotStarted)
    }

    /// Whether `topic` has an entry at all.
    pub fn is_tracked(&self, topic: &str) -> bool {
        self.statuses.contains_key(topic)
    }

    pub fn is_completed(&self, topic: &str) -> bool {
        self.status(topic) == TopicStatus::Completed
    }

    /// Records that a session for `topic` has started. An existing entry is kept.
    pub fn mark_started(&mut self, topic: &str) {
        self.statuses
            .entry(topic.to_string())
            .or_insert(TopicStatus::InProgress);
    }

    pub fn set(&mut self, topic: &str, status: TopicStatus) {
        self.statuses.insert(topic.to_string(), status);
    }

    /// Completed topics, in roadmap order.
    pub fn completed<'a>(&self, roadmap: &'a Roadmap) -> Vec<&'a str> {
        roadmap
            .topics()
            .iter()
            .filter(|t| self.is_completed(t))
            .map(String::as_str)
            .collect()
    }

    /// Topics not yet completed, in roadmap order.
    pub fn remaining<'a>(&self, roadmap: &'a Roadmap) -> Vec<&'a str> {
        roadmap
            .topics()
            .iter()
            .filter(|t| !self.is_completed(t))
            .map(String::as_str)
            .collect()
    }

    /// Status of every roadmap topic, in roadmap order.
    pub fn report(&self, roadmap: &Roadmap) -> Vec<(String, TopicStatus)> {
        roadmap
            .topics()
            .iter()
            .map(|t| (t.clone(), self.status(t)))
            .collect()
    }

    /// JSON snapshot of the tracked entries, for logging.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.statuses)
    }
}
