//! Interactive questions asked by `cp` and `storage add`.

use anyhow::{Context, Result};

/// Source of answers for interactive questions.
///
/// [`ConsolePrompter`] asks on the terminal; [`AssumeYes`] accepts every confirmation and
/// [`ScriptedPrompter`] replays canned answers in tests.
pub trait Prompter: Send + Sync {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Free text; an empty answer is only accepted when `default` is given.
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Hidden text; `allow_empty` lets optional secrets be skipped.
    fn password(&self, prompt: &str, allow_empty: bool) -> Result<String>;

    /// Index of the chosen item
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize>;
}

/// Terminal prompts
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .context("failed to read confirmation")
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = dialoguer::Input::<String>::new().with_prompt(prompt);
        if let Some(default) = default {
            input = input.default(default.to_string()).allow_empty(true);
        }
        input
            .interact_text()
            .with_context(|| format!("failed to read {prompt:?}"))
    }

    fn password(&self, prompt: &str, allow_empty: bool) -> Result<String> {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(allow_empty)
            .interact()
            .with_context(|| format!("failed to read {prompt:?}"))
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        dialoguer::Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()
            .with_context(|| format!("failed to read {prompt:?}"))
    }
}

/// Non-interactive answers for `--yes`: confirmations are accepted, anything else is an error.
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        tracing::info!("{prompt} yes (assumed)");
        Ok(true)
    }

    fn input(&self, prompt: &str, _default: Option<&str>) -> Result<String> {
        anyhow::bail!("cannot ask {prompt:?} when running non-interactively")
    }

    fn password(&self, prompt: &str, _allow_empty: bool) -> Result<String> {
        anyhow::bail!("cannot ask {prompt:?} when running non-interactively")
    }

    fn select(&self, prompt: &str, _items: &[String], _default: usize) -> Result<usize> {
        anyhow::bail!("cannot ask {prompt:?} when running non-interactively")
    }
}

/// One canned reply of a [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Confirm(bool),
    Text(String),
    /// Select the item with this label
    Choice(String),
    /// Accept whatever default the question offers
    Default,
}

impl Answer {
    pub fn text(text: &str) -> Self {
        Answer::Text(text.to_string())
    }

    pub fn choice(label: &str) -> Self {
        Answer::Choice(label.to_string())
    }
}

/// Replays answers in order and records every question asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: std::sync::Mutex<std::collections::VecDeque<Answer>>,
    asked: std::sync::Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: std::sync::Mutex::new(answers.into_iter().collect()),
            asked: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Questions asked so far
    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }

    /// Answers not consumed
    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|answers| answers.len()).unwrap_or(0)
    }

    fn next(&self, prompt: &str) -> Result<Answer> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(prompt.to_string());
        }
        let mut answers = self
            .answers
            .lock()
            .map_err(|_| anyhow::anyhow!("scripted answers poisoned"))?;
        answers
            .pop_front()
            .with_context(|| format!("no scripted answer for {prompt:?}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        match self.next(prompt)? {
            Answer::Confirm(answer) => Ok(answer),
            Answer::Default => Ok(default),
            other => anyhow::bail!("expected a confirmation for {prompt:?}, got {other:?}"),
        }
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        match (self.next(prompt)?, default) {
            (Answer::Text(text), _) => Ok(text),
            (Answer::Default, Some(default)) => Ok(default.to_string()),
            (other, _) => anyhow::bail!("expected text for {prompt:?}, got {other:?}"),
        }
    }

    fn password(&self, prompt: &str, allow_empty: bool) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text(text) => Ok(text),
            Answer::Default if allow_empty => Ok(String::new()),
            other => anyhow::bail!("expected a secret for {prompt:?}, got {other:?}"),
        }
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        match self.next(prompt)? {
            Answer::Choice(label) => items
                .iter()
                .position(|item| *item == label)
                .with_context(|| format!("{label:?} is not one of {items:?}")),
            Answer::Default => Ok(default),
            other => anyhow::bail!("expected a choice for {prompt:?}, got {other:?}"),
        }
    }
}
