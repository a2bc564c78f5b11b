//! Session Controller
//!
//! Owns everything a run needs, including the roadmap, the progress map and
//! the client, and drives the top-level menu until every topic is completed.

use crate::console::{Console, ConsoleError};
use crate::final_test::{FinalTest, Score};
use crate::llm_client::LLMClient;
use crate::prompts::Prompts;
use crate::topic::{Progress, Roadmap, TopicStatus};
use crate::tutor::{SessionSettings, TutoringSession};
use std::num::IntErrorKind;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MENU_PROMPT: &str =
    "Enter the number of the topic you want to learn, 'test' for final test, or 'P' to check progress: ";

/// A parsed line from the top-level menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    ShowProgress,
    FinalTest,
    /// A valid 1-based topic number.
    Select(usize),
    /// An integer outside the roadmap's numbering.
    OutOfRange,
    Unrecognized,
}

impl MenuCommand {
    pub fn parse(input: &str, topic_count: usize) -> Self {
        let input = input.trim();
        if input.eq_ignore_ascii_case("p") {
            return MenuCommand::ShowProgress;
        }
        if input.eq_ignore_ascii_case("test") {
            return MenuCommand::FinalTest;
        }
        match input.parse::<i64>() {
            Ok(n) => usize::try_from(n)
                .ok()
                .filter(|n| (1..=topic_count).contains(n))
                .map_or(MenuCommand::OutOfRange, MenuCommand::Select),
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                MenuCommand::OutOfRange
            }
            Err(_) => MenuCommand::Unrecognized,
        }
    }
}

/// What the controller will do in response to a menu line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    ShowProgress(Vec<(String, TopicStatus)>),
    RunFinalTest(Vec<String>),
    NoCompletedTopics,
    StartSession(String),
    AlreadyCompleted(String),
    InvalidNumber,
    InvalidInput,
}

pub struct SessionController {
    roadmap: Roadmap,
    progress: Progress,
    client: Arc<dyn LLMClient>,
    prompts: Prompts,
    settings: SessionSettings,
}

impl SessionController {
    pub fn new(
        roadmap: Roadmap,
        client: Arc<dyn LLMClient>,
        prompts: Prompts,
        settings: SessionSettings,
    ) -> Self {
        Self {
            roadmap,
            progress: Progress::new(),
            client,
            prompts,
            settings,
        }
    }

    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Maps a menu line to an action without touching any state.
    pub fn decide(&self, input: &str) -> MenuAction {
        match MenuCommand::parse(input, self.roadmap.len()) {
            MenuCommand::ShowProgress => MenuAction::ShowProgress(self.progress.report(&self.roadmap)),
            MenuCommand::FinalTest => {
                let completed = self.progress.completed(&self.roadmap);
                if completed.is_empty() {
                    MenuAction::NoCompletedTopics
                } else {
                    MenuAction::RunFinalTest(completed.into_iter().map(str::to_string).collect())
                }
            }
            MenuCommand::Select(number) => match self.roadmap.by_number(number) {
                Some(topic) if self.progress.is_completed(topic) => {
                    MenuAction::AlreadyCompleted(topic.to_string())
                }
                Some(topic) => MenuAction::StartSession(topic.to_string()),
                None => MenuAction::InvalidNumber,
            },
            MenuCommand::OutOfRange => MenuAction::InvalidNumber,
            MenuCommand::Unrecognized => MenuAction::InvalidInput,
        }
    }

    /// Runs the menu loop. Returns the score of the final test taken once all
    /// topics are completed.
    pub async fn run(&mut self, console: &mut dyn Console) -> Result<Score, ConsoleError> {
        loop {
            if self.progress.remaining(&self.roadmap).is_empty() {
                console.say("\nCongratulations! You have completed all the topics in your roadmap.");
                info!("All topics completed, starting final test");
                let topics = self.roadmap.topics().to_vec();
                return self.final_test().run(&topics, console).await;
            }

            console.say("\n--- Progress ---");
            console.say(&format!(
                "Topics Completed: {}/{}",
                self.progress.completed(&self.roadmap).len(),
                self.roadmap.len()
            ));

            let input = console.read_line(MENU_PROMPT).await?;
            match self.decide(&input) {
                MenuAction::ShowProgress(report) => {
                    console.say("\n--- Your Current Progress ---");
                    for (topic, status) in report {
                        console.say(&format!("- {topic}: {status}"));
                    }
                }
                MenuAction::RunFinalTest(topics) => {
                    self.final_test().run(&topics, console).await?;
                }
                MenuAction::NoCompletedTopics => {
                    console.say("You need to complete at least one topic before taking a test.");
                }
                MenuAction::StartSession(topic) => self.tutor(&topic, console).await?,
                MenuAction::AlreadyCompleted(_) => {
                    console.say("This topic is already completed. Please choose a different one.");
                }
                MenuAction::InvalidNumber => {
                    console.say("Invalid number. Please choose a number from the roadmap.");
                }
                MenuAction::InvalidInput => {
                    console.say("Invalid input. Please enter a number, 'test', or 'P'.");
                }
            }
        }
    }

    fn final_test(&self) -> FinalTest<'_> {
        FinalTest::new(self.client.as_ref(), &self.prompts, self.settings)
    }

    async fn tutor(&mut self, topic: &str, console: &mut dyn Console) -> Result<(), ConsoleError> {
        let session = TutoringSession::new(self.client.as_ref(), &self.prompts, self.settings);
        let outcome = session.run(topic, &mut self.progress, console).await?;
        match self.progress.snapshot_json() {
            Ok(snapshot) => debug!(?outcome, %snapshot, "Progress updated"),
            Err(e) => warn!(error = %e, "Could not serialize progress"),
        }
        Ok(())
    }
}
