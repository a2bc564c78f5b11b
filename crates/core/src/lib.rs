//! PathFinder Core
//!
//! Domain logic for the interactive study companion: roadmap generation,
//! per-topic tutoring sessions, the final test and the menu controller that
//! ties them together. Terminal and network access sit behind the
//! [`console::Console`] and [`llm_client::LLMClient`] traits.

pub mod console;
pub mod controller;
pub mod curriculum;
pub mod llm_client;
pub mod prompts;
pub mod topic;
pub mod tutor;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use controller::SessionController;
pub use llm_client::{CompletionError, ErrorPolicy, LLMClient};
pub use topic::{Progress, Roadmap, TopicStatus};
pub use tutor::SessionSettings;
