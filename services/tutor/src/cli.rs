use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// PathFinder: a personalized study companion in your terminal.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// Subject to study; asked interactively when omitted.
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Chat model to use (overrides CHAT_MODEL).
    #[arg(long)]
    pub model: Option<String>,

    /// Directory of `<key>.md` prompt overrides (overrides PROMPTS_PATH).
    #[arg(long, value_name = "DIR")]
    pub prompts: Option<PathBuf>,

    /// Pause between quiz and test rounds, in milliseconds (overrides ROUND_PAUSE_MS).
    #[arg(long, value_name = "MS")]
    pub pause_ms: Option<u64>,

    /// Show failed requests as ordinary replies instead of reporting them.
    #[arg(long)]
    pub lenient_errors: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the environment configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.chat_model = model.clone();
        }
        if let Some(prompts) = &self.prompts {
            config.prompts_path = Some(prompts.clone());
        }
        if let Some(ms) = self.pause_ms {
            config.round_pause = Duration::from_millis(ms);
        }
        if self.lenient_errors {
            config.lenient_errors = true;
        }
    }
}
