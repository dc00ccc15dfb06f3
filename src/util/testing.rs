//! Test support: logging setup and scripted terminal doubles

use std::collections::VecDeque;
use std::env;
use std::io;
use std::sync::{Mutex, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::infrastructure::traits::{InputSource, Prompter};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "passkc=debug");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Prompter answering from a script.
///
/// Inputs and passwords are popped in order; an exhausted queue is an
/// `UnexpectedEof` error. Prompts are recorded for assertions.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    inputs: Mutex<VecDeque<String>>,
    passwords: Mutex<VecDeque<String>>,
    confirms: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(self, value: &str) -> Self {
        lock(&self.inputs).push_back(value.to_string());
        self
    }

    pub fn with_password(self, value: &str) -> Self {
        lock(&self.passwords).push_back(value.to_string());
        self
    }

    pub fn with_confirm(self, value: bool) -> Self {
        lock(&self.confirms).push_back(value);
        self
    }

    /// Every prompt shown so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    fn record(&self, prompt: &str) {
        lock(&self.prompts).push(prompt.to_string());
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, prompt: &str) -> io::Result<String> {
        self.record(prompt);
        lock(&self.inputs).pop_front().ok_or_else(exhausted)
    }

    fn password(&self, prompt: &str) -> io::Result<String> {
        self.record(prompt);
        lock(&self.passwords).pop_front().ok_or_else(exhausted)
    }

    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        self.record(prompt);
        lock(&self.confirms).pop_front().ok_or_else(exhausted)
    }
}

/// Standard input double: either a terminal or a pipe carrying fixed lines.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    piped: bool,
    lines: Mutex<VecDeque<String>>,
}

impl ScriptedInput {
    /// Interactive terminal, nothing piped.
    pub fn terminal() -> Self {
        Self::default()
    }

    /// Pipe delivering `content` line by line.
    pub fn piped(content: &str) -> Self {
        Self {
            piped: true,
            lines: Mutex::new(content.lines().map(str::to_string).collect()),
        }
    }
}

impl InputSource for ScriptedInput {
    fn is_piped(&self) -> bool {
        self.piped
    }

    fn read_line(&self) -> io::Result<Option<String>> {
        Ok(lock(&self.lines).pop_front())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn exhausted() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left")
}
