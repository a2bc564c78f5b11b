//! Tutoring Session
//!
//! One pass over a single topic: notes, then open questions, then a short
//! quiz. The outcome of the quiz decides whether the topic is completed.

use crate::console::{Console, ConsoleError};
use crate::llm_client::{CompletionError, ErrorPolicy, LLMClient};
use crate::prompts::Prompts;
use crate::topic::{Progress, TopicStatus};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Number of quiz questions offered per session.
pub const QUIZ_ROUNDS: usize = 3;
/// Answered quiz questions needed to complete a topic.
pub const COMPLETION_THRESHOLD: usize = 2;

/// Knobs shared by the tutoring session and the final test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub policy: ErrorPolicy,
    /// Pause after each quiz or test round.
    pub round_pause: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::default(),
            round_pause: Duration::from_secs(1),
        }
    }
}

/// A line typed during the open Q&A phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QaInput {
    StartQuiz,
    Quit,
    Question(String),
}

impl QaInput {
    pub fn parse(input: &str) -> Self {
        let command = input.trim();
        if command.eq_ignore_ascii_case("test") {
            QaInput::StartQuiz
        } else if command.eq_ignore_ascii_case("quit") {
            QaInput::Quit
        } else {
            QaInput::Question(input.to_string())
        }
    }
}

/// A line typed in reply to a quiz question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizAnswer {
    Quit,
    Answer(String),
}

impl QuizAnswer {
    pub fn parse(input: &str) -> Self {
        if input.trim().eq_ignore_ascii_case("quit") {
            QuizAnswer::Quit
        } else {
            QuizAnswer::Answer(input.to_string())
        }
    }
}

/// Status a topic ends in after `answered` quiz questions.
pub fn status_for_answered(answered: usize) -> TopicStatus {
    if answered >= COMPLETION_THRESHOLD {
        TopicStatus::Completed
    } else {
        TopicStatus::InProgress
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The learner quit during open Q&A.
    Aborted,
    /// The quiz ran, possibly cut short, with this many answers.
    Quizzed { answered: usize },
}

impl SessionOutcome {
    pub fn status(&self) -> TopicStatus {
        match self {
            SessionOutcome::Aborted => TopicStatus::InProgress,
            SessionOutcome::Quizzed { answered } => status_for_answered(*answered),
        }
    }
}

/// Shows a failed completion to the learner.
pub(crate) fn report_failure(console: &mut dyn Console, context: &str, err: &CompletionError) {
    console.say(&format!("Bot: Sorry, {context}. ({err})"));
}

pub struct TutoringSession<'a> {
    client: &'a dyn LLMClient,
    prompts: &'a Prompts,
    settings: SessionSettings,
}

impl<'a> TutoringSession<'a> {
    pub fn new(client: &'a dyn LLMClient, prompts: &'a Prompts, settings: SessionSettings) -> Self {
        Self {
            client,
            prompts,
            settings,
        }
    }

    async fn ask(&self, prompt: &str) -> Result<String, CompletionError> {
        self.settings.policy.resolve(self.client.complete(prompt).await)
    }

    /// Runs notes, Q&A and quiz for `topic`, recording the result in `progress`.
    #[instrument(name = "tutoring_session", skip_all, fields(topic = %topic))]
    pub async fn run(
        &self,
        topic: &str,
        progress: &mut Progress,
        console: &mut dyn Console,
    ) -> Result<SessionOutcome, ConsoleError> {
        console.say("\n--- Tutoring Session Started ---");
        console.say(&format!("Let's learn about: {topic}"));

        let notes = self.ask(&self.prompts.notes(topic)).await;
        console.say("\n--- Notes ---");
        match notes {
            Ok(notes) => console.say(&notes),
            Err(e) => report_failure(console, "the notes for this topic could not be loaded", &e),
        }

        progress.mark_started(topic);

        if !self.open_questions(topic, console).await? {
            console.say("Bot: Okay, session ended. This topic remains 'in-progress'.");
            info!("Session ended during Q&A");
            return Ok(SessionOutcome::Aborted);
        }

        let answered = self.quiz(topic, console).await?;
        let outcome = SessionOutcome::Quizzed { answered };
        progress.set(topic, outcome.status());

        if outcome.status() == TopicStatus::Completed {
            console.say(
                "\nBot: You've completed a few questions. This topic is now marked as 'completed'.",
            );
        } else {
            console.say("\nBot: Session ended. This topic remains 'in-progress'.");
        }
        info!(answered, status = %outcome.status(), "Session finished");
        Ok(outcome)
    }

    /// Answers questions until the learner asks for the quiz (`true`) or quits (`false`).
    async fn open_questions(
        &self,
        topic: &str,
        console: &mut dyn Console,
    ) -> Result<bool, ConsoleError> {
        console.say("\nDo you have any questions about this topic, or should we move on to a quick test? Type your question, or type 'test' to begin the quiz.");
        loop {
            let line = console.read_line("You: ").await?;
            let question = match QaInput::parse(&line) {
                QaInput::StartQuiz => return Ok(true),
                QaInput::Quit => return Ok(false),
                QaInput::Question(question) => question,
            };

            debug!("Answering learner question");
            match self.ask(&self.prompts.doubt(topic, &question)).await {
                Ok(answer) => console.say(&format!("Bot: {answer}")),
                Err(e) => report_failure(console, "that question could not be answered", &e),
            }
            console.say("\nDo you have any more questions, or should we move on to the test? Type your question, or type 'test' to begin.");
        }
    }

    /// Runs up to [`QUIZ_ROUNDS`] questions and returns how many were answered.
    async fn quiz(&self, topic: &str, console: &mut dyn Console) -> Result<usize, ConsoleError> {
        console.say("\nNow, let's test your knowledge with a few questions. Type 'quit' to end this session anytime.");

        let mut asked: Vec<String> = Vec::new();
        let mut answered = 0;

        for round in 1..=QUIZ_ROUNDS {
            let question = match self.ask(&self.prompts.quiz_question(topic, &asked)).await {
                Ok(question) => question,
                Err(e) => {
                    report_failure(console, "a quiz question could not be generated", &e);
                    tokio::time::sleep(self.settings.round_pause).await;
                    continue;
                }
            };
            console.say(&format!("\nBot (Tutor): {question}"));
            asked.push(question.clone());

            let line = console.read_line("Your Answer: ").await?;
            let QuizAnswer::Answer(answer) = QuizAnswer::parse(&line) else {
                debug!(round, "Quiz ended early");
                break;
            };

            match self.ask(&self.prompts.quiz_evaluation(&question, &answer)).await {
                Ok(evaluation) => console.say(&format!("Bot (Tutor): {evaluation}")),
                Err(e) => report_failure(console, "your answer could not be evaluated", &e),
            }
            answered += 1;
            tokio::time::sleep(self.settings.round_pause).await;
        }

        Ok(answered)
    }
}
