//! Scripted stand-ins for the console and the completion service.

use crate::console::{Console, ConsoleError};
use crate::llm_client::{CompletionError, LLMClient};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned input lines and records everything shown.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> String {
        self.output.join("\n")
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError> {
        self.prompts.push(prompt.to_string());
        self.inputs.pop_front().ok_or(ConsoleError::Closed)
    }

    fn say(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}

type Reply = Option<String>;

struct Rule {
    needle: String,
    replies: VecDeque<Reply>,
}

/// Answers prompts by the first rule whose needle occurs in the prompt.
///
/// A rule holding several replies hands them out in order and repeats the last
/// one. `None` stands for a failed completion.
#[derive(Default)]
pub struct ScriptedClient {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, needle: &str, reply: &str) -> Self {
        self.respond_seq(needle, &[reply])
    }

    pub fn respond_seq(self, needle: &str, replies: &[&str]) -> Self {
        self.push_rule(needle, replies.iter().map(|r| Some(r.to_string())).collect())
    }

    pub fn fail(self, needle: &str) -> Self {
        self.push_rule(needle, VecDeque::from([None]))
    }

    fn push_rule(self, needle: &str, replies: VecDeque<Reply>) -> Self {
        self.rules.lock().unwrap().push(Rule {
            needle: needle.to_string(),
            replies,
        });
        self
    }

    /// Every prompt received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_containing(&self, needle: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.contains(needle))
            .collect()
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.calls.lock().unwrap().push(prompt.to_string());

        let mut rules = self.rules.lock().unwrap();
        let reply = match rules.iter_mut().find(|r| prompt.contains(&r.needle)) {
            Some(rule) if rule.replies.len() > 1 => rule.replies.pop_front().flatten(),
            Some(rule) => rule.replies.front().cloned().flatten(),
            None => Some("OK.".to_string()),
        };
        reply.ok_or(CompletionError::EmptyResponse)
    }
}
