//! Operator confirmation for destructive runs.
//!
//! The yes/no decision is a pure predicate; reading the answer is behind
//! [`Prompter`] so the gate runs without a terminal in tests.

use super::{CleanupError, CleanupStep};
use crate::config::DorConfig;
use std::io::{BufRead, Write};

/// True only for `y` or `yes`, ignoring case and surrounding whitespace
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asks the operator a question and returns the raw answer
pub trait Prompter {
    fn ask(&mut self, message: &str) -> std::io::Result<String>;
}

/// Prompts on stdout, answers from stdin
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, message: &str) -> std::io::Result<String> {
        println!("{message}");
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().lock().read_line(&mut input)?;
        Ok(input)
    }
}

/// Prompter that answers from a fixed list and records every question
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Vec<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, message: &str) -> std::io::Result<String> {
        self.asked.push(message.to_string());
        if self.answers.is_empty() {
            return Ok(String::new());
        }
        Ok(self.answers.remove(0))
    }
}

fn confirm(prompter: &mut dyn Prompter, message: String) -> Result<(), CleanupError> {
    let answer = prompter.ask(&message)?;
    if is_affirmative(&answer) {
        Ok(())
    } else {
        Err(CleanupError::Declined { prompt: message })
    }
}

/// Ask for the environment, again on production, then once per step.
///
/// The first answer that is not affirmative stops the gate.
pub fn confirm_cleanup(
    prompter: &mut dyn Prompter,
    config: &DorConfig,
    steps: &[CleanupStep],
) -> Result<(), CleanupError> {
    confirm(
        prompter,
        format!(
            "Run on '{}'? Any response other than 'y' or 'yes' will stop the cleanup now.",
            config.environment
        ),
    )?;

    if config.environment.is_production() {
        confirm(
            prompter,
            "Are you really sure you want to run on production?  CLEANUP IS NOT REVERSIBLE".to_string(),
        )?;
    }

    for step in steps {
        confirm(
            prompter,
            format!(
                "Run step '{}'?  {}.  Any response other than 'y' or 'yes' will stop the cleanup now.",
                step.name(),
                step.description(config)
            ),
        )?;
    }

    Ok(())
}
