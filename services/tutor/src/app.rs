//! Startup wiring: everything between a loaded [`Config`] and a running
//! [`SessionController`].

use crate::config::Config;
use async_openai::config::OpenAIConfig;
use pathfinder_core::{
    SessionController,
    console::{Console, ConsoleError},
    curriculum::{CurriculumService, LLMCurriculumService, RoadmapError},
    final_test::Score,
    llm_client::{ErrorPolicy, LLMClient, OpenAICompatibleClient},
    prompts::{PromptError, Prompts},
    topic::Roadmap,
    tutor::SessionSettings,
};
use std::sync::Arc;
use tracing::info;

const RULE: &str = "------------------------------------------------------------------";

/// Failures that end a run before or instead of the tutoring loop.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("An unexpected error occurred during API initialization: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Prompts(#[from] PromptError),
    #[error(transparent)]
    Roadmap(#[from] RoadmapError),
    #[error(transparent)]
    Console(#[from] ConsoleError),
}

/// Builds the completion client for the configured provider.
pub fn build_client(config: &Config) -> Result<Arc<dyn LLMClient>, StartupError> {
    let mut http = reqwest::Client::builder();
    if let Some(timeout) = config.request_timeout {
        http = http.timeout(timeout);
    }
    let http = http.build()?;

    let openai_config = OpenAIConfig::new()
        .with_api_key(&config.api_key)
        .with_api_base(&config.api_base);

    info!(provider = ?config.provider, model = %config.chat_model, "Completion client ready");
    Ok(Arc::new(OpenAICompatibleClient::with_http_client(
        openai_config,
        config.chat_model.clone(),
        http,
    )))
}

pub fn load_prompts(config: &Config) -> Result<Prompts, StartupError> {
    match &config.prompts_path {
        Some(path) => Ok(Prompts::load(path)?),
        None => Ok(Prompts::default()),
    }
}

pub fn session_settings(config: &Config) -> SessionSettings {
    SessionSettings {
        policy: if config.lenient_errors {
            ErrorPolicy::Lenient
        } else {
            ErrorPolicy::Surface
        },
        round_pause: config.round_pause,
    }
}

/// Runs a complete session against the configured provider.
pub async fn run(
    config: &Config,
    subject: Option<String>,
    console: &mut dyn Console,
) -> Result<Score, StartupError> {
    let client = build_client(config)?;
    let prompts = load_prompts(config)?;
    run_with(client, prompts, session_settings(config), subject, console).await
}

/// Greets the learner, builds the roadmap and hands over to the controller.
pub async fn run_with(
    client: Arc<dyn LLMClient>,
    prompts: Prompts,
    settings: SessionSettings,
    subject: Option<String>,
    console: &mut dyn Console,
) -> Result<Score, StartupError> {
    console.say(RULE);
    console.say("Welcome to PathFinder AI! Your Personalized Study Companion.");
    console.say(RULE);

    let subject = match subject {
        Some(subject) => subject,
        None => console.read_line("What do you want to learn today?\nYou: ").await?,
    };

    console.say("Generating your personalized roadmap...");
    let curriculum = LLMCurriculumService::new(client.clone(), prompts.clone());
    let roadmap = curriculum.generate_roadmap(subject.trim()).await?;
    show_roadmap(console, &roadmap);

    console.say("\nLet's start your learning journey! Choose a topic by entering its number.");
    let mut controller = SessionController::new(roadmap, client, prompts, settings);
    Ok(controller.run(console).await?)
}

fn show_roadmap(console: &mut dyn Console, roadmap: &Roadmap) {
    console.say("\n--- Your Personalized Roadmap ---");
    for (i, topic) in roadmap.topics().iter().enumerate() {
        console.say(&format!("{}. {}", i + 1, topic));
    }
    console.say("-----------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provider;
    use pathfinder_core::testing::{ScriptedClient, ScriptedConsole};
    use std::time::Duration;
    use tracing::Level;

    fn config() -> Config {
        Config {
            provider: Provider::OpenAI,
            api_key: "test-key".to_string(),
            api_base: "http://127.0.0.1:9/v1".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            log_level: Level::WARN,
            prompts_path: None,
            round_pause: Duration::ZERO,
            request_timeout: Some(Duration::from_secs(5)),
            lenient_errors: false,
        }
    }

    #[test]
    fn test_builds_client_and_settings_from_config() {
        let mut config = config();
        assert!(build_client(&config).is_ok());
        assert_eq!(session_settings(&config).policy, ErrorPolicy::Surface);

        config.lenient_errors = true;
        let settings = session_settings(&config);
        assert_eq!(settings.policy, ErrorPolicy::Lenient);
        assert_eq!(settings.round_pause, Duration::ZERO);
    }

    #[test]
    fn test_missing_prompts_dir_is_fatal() {
        let mut config = config();
        config.prompts_path = Some("/no/such/prompts".into());
        assert!(matches!(load_prompts(&config), Err(StartupError::Prompts(_))));
    }

    #[tokio::test]
    async fn test_unusable_roadmap_ends_the_run() {
        let client = Arc::new(ScriptedClient::new().respond("learning roadmap", "Sorry, no."));
        let mut console = ScriptedConsole::new(&["Chemistry"]);

        let result = run_with(
            client,
            Prompts::default(),
            session_settings(&config()),
            None,
            &mut console,
        )
        .await;

        assert!(matches!(result, Err(StartupError::Roadmap(RoadmapError::NoTopics))));
        assert!(!console.transcript().contains("Your Personalized Roadmap"));
    }

    #[tokio::test]
    async fn test_failed_roadmap_request_ends_the_run() {
        let client = Arc::new(ScriptedClient::new().fail("learning roadmap"));
        let mut console = ScriptedConsole::new(&[]);

        let result = run_with(
            client,
            Prompts::default(),
            session_settings(&config()),
            Some("Chemistry".to_string()),
            &mut console,
        )
        .await;

        assert!(matches!(
            result,
            Err(StartupError::Roadmap(RoadmapError::Completion(_)))
        ));
    }

    #[tokio::test]
    async fn test_full_run_over_single_topic_roadmap() {
        let client = Arc::new(
            ScriptedClient::new()
                .respond("learning roadmap", "Roadmap:\n1. Atoms: the basics\n   Start here.")
                .respond("multiple choice question", "Q? A) a B) b C) c D) d")
                .respond("Provide only the option letter", "D"),
        );
        let mut console = ScriptedConsole::new(&["1", "test", "x", "y", "z", "d", "d"]);

        let score = run_with(
            client.clone(),
            Prompts::default(),
            session_settings(&config()),
            Some("Chemistry".to_string()),
            &mut console,
        )
        .await
        .unwrap();

        assert_eq!(score, Score { correct: 2, total: 2 });
        let transcript = console.transcript();
        assert!(transcript.contains("1. Atoms: the basics"));
        assert!(client.calls()[0].contains("master the subject: 'Chemistry'"));
    }
}
