//! Prompt Templates
//!
//! Every request the tutor sends is rendered from one of these templates by
//! substituting `{placeholder}` markers. The built-in wording can be overridden
//! per template from a directory of `<key>.md` files.

use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Failed to read prompts from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

const ROADMAP: &str = "Create a simple, step-by-step learning roadmap for a high school student to master the subject: '{subject}'.
Break it down into 5-7 main topics with a brief description for each.
Present the roadmap as a numbered list.";

const NOTES: &str = "Provide a detailed and comprehensive explanation of the topic: '{topic}' for a new learner. Include definitions, key concepts, and simple, relevant examples. Structure the explanation with headings and bullet points for clarity.";

const DOUBT: &str = "The user asked: '{question}'. Please provide a clear and concise answer related to the topic '{topic}'.";

const QUIZ_QUESTION: &str = "You are a tutor. Ask a new, different, and unique question about the topic '{topic}'. Do not ask any of these questions: {asked}. Keep it basic, easy, short and one liner.";

const QUIZ_EVALUATION: &str = "The user's answer to the question '{question}' was: '{answer}'. Is this answer correct? If not, provide the correct answer and a brief explanation. Keep the response concise.";

const TEST_QUESTION: &str = "Generate a unique and different multiple choice question about the topic '{topic}' with four options (A, B, C, D). Ensure the output does NOT contain the correct answer.";

const TEST_ANSWER_KEY: &str = "For the question: '{question}', what is the correct option? Provide only the option letter (e.g., 'A').";

const TEST_EXPLANATION: &str = "For the question: '{question}', what is the correct answer? Provide the option letter followed by the correct answer text.";

/// The full set of templates used by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub roadmap: String,
    pub notes: String,
    pub doubt: String,
    pub quiz_question: String,
    pub quiz_evaluation: String,
    pub test_question: String,
    pub test_answer_key: String,
    pub test_explanation: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            roadmap: ROADMAP.to_string(),
            notes: NOTES.to_string(),
            doubt: DOUBT.to_string(),
            quiz_question: QUIZ_QUESTION.to_string(),
            quiz_evaluation: QUIZ_EVALUATION.to_string(),
            test_question: TEST_QUESTION.to_string(),
            test_answer_key: TEST_ANSWER_KEY.to_string(),
            test_explanation: TEST_EXPLANATION.to_string(),
        }
    }
}

impl Prompts {
    /// Loads the built-in templates, then replaces any that have a matching
    /// `<key>.md` file in `dir` (e.g. `notes.md`).
    pub fn load(dir: &Path) -> Result<Self, PromptError> {
        let io_err = |source| PromptError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut prompts = Self::default();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("md") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path).map_err(io_err)?;
            if prompts.slot(key).map(|slot| *slot = content).is_some() {
                debug!(key, "Loaded prompt override");
            } else {
                warn!(key, "Ignoring unknown prompt file");
            }
        }
        Ok(prompts)
    }

    fn slot(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "roadmap" => Some(&mut self.roadmap),
            "notes" => Some(&mut self.notes),
            "doubt" => Some(&mut self.doubt),
            "quiz_question" => Some(&mut self.quiz_question),
            "quiz_evaluation" => Some(&mut self.quiz_evaluation),
            "test_question" => Some(&mut self.test_question),
            "test_answer_key" => Some(&mut self.test_answer_key),
            "test_explanation" => Some(&mut self.test_explanation),
            _ => None,
        }
    }

    pub fn roadmap(&self, subject: &str) -> String {
        render(&self.roadmap, &[("subject", subject)])
    }

    pub fn notes(&self, topic: &str) -> String {
        render(&self.notes, &[("topic", topic)])
    }

    pub fn doubt(&self, topic: &str, question: &str) -> String {
        render(&self.doubt, &[("topic", topic), ("question", question)])
    }

    pub fn quiz_question(&self, topic: &str, asked: &[String]) -> String {
        let asked = asked.join(", ");
        render(
            &self.quiz_question,
            &[("topic", topic), ("asked", asked.as_str())],
        )
    }

    pub fn quiz_evaluation(&self, question: &str, answer: &str) -> String {
        render(
            &self.quiz_evaluation,
            &[("question", question), ("answer", answer)],
        )
    }

    pub fn test_question(&self, topic: &str) -> String {
        render(&self.test_question, &[("topic", topic)])
    }

    pub fn test_answer_key(&self, question: &str) -> String {
        render(&self.test_answer_key, &[("question", question)])
    }

    pub fn test_explanation(&self, question: &str) -> String {
        render(&self.test_explanation, &[("question", question)])
    }
}

/// Substitutes `{name}` markers in a single pass, so substituted text is never
/// re-scanned for markers.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let value = after.find('}').and_then(|end| {
            let name = &after[..end];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
