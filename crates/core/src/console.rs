//! Line-based terminal I/O behind a trait, so session logic can be driven by
//! scripted input in tests.

use async_trait::async_trait;
use std::io::Write;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The input stream reached end-of-file.
    #[error("input stream closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait Console: Send {
    /// Shows `prompt` without a newline and waits for one line of input.
    ///
    /// The returned line has its line terminator removed but is otherwise raw.
    async fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError>;

    /// Prints one block of text followed by a newline.
    fn say(&mut self, text: &str);
}

/// The process's stdin and stdout.
pub struct StdConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        self.lines.next_line().await?.ok_or(ConsoleError::Closed)
    }

    fn say(&mut self, text: &str) {
        println!("{text}");
    }
}
