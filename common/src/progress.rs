use std::io::IsTerminal;

/// How batch progress is shown while transfers are polled
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ProgressType {
    /// Pick `ProgressBar` when stderr is a terminal, `TextUpdates` otherwise
    #[default]
    #[value(alias = "Auto")]
    Auto,
    /// Animated progress bar
    #[value(name = "ProgressBar", alias = "progress-bar")]
    ProgressBar,
    /// Periodic text lines, appropriate for logging
    #[value(name = "TextUpdates", alias = "text-updates")]
    TextUpdates,
}

/// Point-in-time counts of a batch being tracked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStatus {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
}

impl BatchStatus {
    pub fn finished(&self) -> u64 {
        self.completed + self.failed
    }

    pub fn pending(&self) -> u64 {
        self.total.saturating_sub(self.finished())
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}/{} files done (completed: {}, failed: {}, pending: {})",
            self.finished(),
            self.total,
            self.completed,
            self.failed,
            self.pending()
        )
    }
}

enum Display {
    Bar(indicatif::ProgressBar),
    Text {
        delay: std::time::Duration,
        last_update: Option<std::time::Instant>,
    },
    Hidden,
}

/// Progress reporter for a batch of transfer units.
///
/// Progress goes to stderr so that stdout only carries the final summary.
pub struct BatchProgress {
    display: Display,
}

impl BatchProgress {
    pub fn new(progress_type: ProgressType, total: u64, text_delay: std::time::Duration) -> Self {
        let progress_type = match progress_type {
            ProgressType::Auto if std::io::stderr().is_terminal() => ProgressType::ProgressBar,
            ProgressType::Auto => ProgressType::TextUpdates,
            other => other,
        };
        let display = match progress_type {
            ProgressType::ProgressBar => {
                let bar = indicatif::ProgressBar::new(total);
                match indicatif::ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                ) {
                    Ok(style) => bar.set_style(style.progress_chars("#>-")),
                    Err(error) => tracing::debug!("invalid progress template: {error}"),
                }
                Display::Bar(bar)
            }
            _ => Display::Text {
                delay: text_delay,
                last_update: None,
            },
        };
        Self { display }
    }

    pub fn hidden() -> Self {
        Self {
            display: Display::Hidden,
        }
    }

    pub fn update(&mut self, status: &BatchStatus) {
        match &mut self.display {
            Display::Bar(bar) => {
                bar.set_position(status.finished());
                bar.set_message(format!("completed {}, failed {}", status.completed, status.failed));
            }
            Display::Text { delay, last_update } => {
                let now = std::time::Instant::now();
                let due = last_update.is_none_or(|last| now.duration_since(last) >= *delay);
                if due {
                    eprintln!("{status}");
                    *last_update = Some(now);
                }
            }
            Display::Hidden => {}
        }
    }

    pub fn finish(self) {
        if let Display::Bar(bar) = self.display {
            bar.finish_and_clear();
        }
    }
}
