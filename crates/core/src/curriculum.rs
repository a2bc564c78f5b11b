//! Roadmap Generation Service
//!
//! This module turns a learner's subject into an ordered roadmap of topics.
//! It serves as the foundation for every tutoring run: nothing else can
//! happen until a usable roadmap exists.

use crate::llm_client::{CompletionError, LLMClient};
use crate::prompts::Prompts;
use crate::topic::Roadmap;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Reasons a roadmap could not be produced. Both are fatal for a run.
#[derive(Debug, Error)]
pub enum RoadmapError {
    #[error("roadmap request failed: {0}")]
    Completion(#[from] CompletionError),
    #[error("the response did not contain a numbered list of topics")]
    NoTopics,
}

/// Defines the contract for any service that can generate a roadmap.
///
/// This abstraction allows the controller to be bootstrapped from an
/// AI-powered generator or a fixed one without caring which.
#[async_trait]
pub trait CurriculumService: Send + Sync {
    /// Generates the ordered topic list for `subject`.
    ///
    /// # Returns
    ///
    /// A non-empty [`Roadmap`], or a [`RoadmapError`] if none could be built.
    async fn generate_roadmap(&self, subject: &str) -> Result<Roadmap, RoadmapError>;
}

/// An implementation of `CurriculumService` backed by an [`LLMClient`].
pub struct LLMCurriculumService {
    client: Arc<dyn LLMClient>,
    prompts: Prompts,
}

impl LLMCurriculumService {
    pub fn new(client: Arc<dyn LLMClient>, prompts: Prompts) -> Self {
        Self { client, prompts }
    }
}

#[async_trait]
impl CurriculumService for LLMCurriculumService {
    async fn generate_roadmap(&self, subject: &str) -> Result<Roadmap, RoadmapError> {
        let prompt = self.prompts.roadmap(subject);
        let answer = self.client.complete(&prompt).await?;

        let topics = parse_roadmap(&answer);
        if topics.is_empty() {
            warn!(response_len = answer.len(), "Roadmap response had no numbered topics");
            return Err(RoadmapError::NoTopics);
        }

        info!(subject, topics = topics.len(), "Roadmap generated");
        Ok(Roadmap::new(subject, topics))
    }
}

/// Extracts topic names from a numbered list such as `"1. Algebra Basics"`.
///
/// A line qualifies when, once trimmed, the text before its first `.` is all
/// digits and the text after it is not blank. The topic is that remainder,
/// trimmed, with any trailing `:` removed. Every other line is dropped.
pub fn parse_roadmap(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let (number, rest) = line.trim().split_once('.')?;
            if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let topic = rest.trim().trim_end_matches(':').trim_end();
            (!topic.is_empty()).then(|| topic.to_string())
        })
        .collect()
}

/// A fixed `CurriculumService` for development and testing.
pub struct MockCurriculumService;

#[async_trait]
impl CurriculumService for MockCurriculumService {
    /// Generates a standard 4-topic roadmap for any subject.
    async fn generate_roadmap(&self, subject: &str) -> Result<Roadmap, RoadmapError> {
        Ok(Roadmap::new(
            subject,
            vec![
                format!("Introduction to {}", subject),
                "Core Concepts".to_string(),
                "Practical Applications".to_string(),
                "Advanced Topics".to_string(),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::MockLLMClient;

    #[test]
    fn test_parse_keeps_numbered_lines_only() {
        let text = "1. Algebra Basics\n2. Geometry:\nSome prose\n";
        assert_eq!(parse_roadmap(text), vec!["Algebra Basics", "Geometry"]);
    }

    #[test]
    fn test_parse_handles_indentation_and_descriptions() {
        let text = "Here is your roadmap:\n\n  1. Intro to Node.js:\n     - what it is\n10. Streams\n3) Wrong format\nA. Lettered\n4.   \n";
        assert_eq!(parse_roadmap(text), vec!["Intro to Node.js", "Streams"]);
    }

    #[test]
    fn test_parse_without_numbered_lines_is_empty() {
        assert!(parse_roadmap("").is_empty());
        assert!(parse_roadmap("No list here.\nStill none.").is_empty());
        assert!(parse_roadmap("An error occurred: connection refused").is_empty());
    }

    #[tokio::test]
    async fn test_llm_service_builds_roadmap_from_reply() {
        let mut client = MockLLMClient::new();
        client
            .expect_complete()
            .withf(|prompt| prompt.contains("'Chemistry'"))
            .times(1)
            .returning(|_| Ok("1. Atoms:\n2. Bonds\nGood luck!".to_string()));

        let service = LLMCurriculumService::new(Arc::new(client), Prompts::default());
        let roadmap = service.generate_roadmap("Chemistry").await.unwrap();

        assert_eq!(roadmap.subject(), "Chemistry");
        assert_eq!(roadmap.topics(), ["Atoms", "Bonds"]);
    }

    #[tokio::test]
    async fn test_llm_service_rejects_unparseable_reply() {
        let mut client = MockLLMClient::new();
        client
            .expect_complete()
            .returning(|_| Ok("I cannot help with that.".to_string()));

        let service = LLMCurriculumService::new(Arc::new(client), Prompts::default());
        let err = service.generate_roadmap("Chemistry").await.unwrap_err();
        assert!(matches!(err, RoadmapError::NoTopics));
    }

    #[tokio::test]
    async fn test_llm_service_propagates_completion_failure() {
        let mut client = MockLLMClient::new();
        client
            .expect_complete()
            .returning(|_| Err(CompletionError::EmptyResponse));

        let service = LLMCurriculumService::new(Arc::new(client), Prompts::default());
        let err = service.generate_roadmap("Chemistry").await.unwrap_err();
        assert!(matches!(err, RoadmapError::Completion(_)));
    }

    #[tokio::test]
    async fn test_mock_service_is_deterministic() {
        let roadmap = MockCurriculumService.generate_roadmap("Rust").await.unwrap();
        assert_eq!(roadmap.len(), 4);
        assert_eq!(roadmap.by_number(1), Some("Introduction to Rust"));
    }
}
