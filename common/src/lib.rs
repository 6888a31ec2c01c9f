//! Common utilities shared by the MFT client tools
//!
//! This crate carries the ambient pieces every tool needs and none of the transfer logic:
//!
//! - [`run`]: sets up logging, builds the async runtime, runs the tool and reports the outcome
//! - [`config`]: output, tracing and backend connection settings
//! - [`progress`]: progress display while batch transfers are polled
//!
//! # Logging
//!
//! Logs are emitted with `tracing` and filtered by the verbosity level passed in
//! [`OutputConfig`]: 0 = ERROR, 1 = INFO, 2 = DEBUG, 3+ = TRACE. The `RUST_LOG` environment
//! variable takes precedence when set. Logs are written to stderr (or to the debug log file)
//! so that tables and summaries printed on stdout can be piped.
//!
//! # Error reporting
//!
//! [`run`] returns `None` when the tool failed; the error chain has already been printed to
//! stderr (unless quiet) and the caller is expected to exit with a non-zero status.

pub mod config;
pub mod progress;

pub use config::OutputConfig;
pub use config::ServiceEndpoints;
pub use config::TimeoutConfig;
pub use config::TracingConfig;
pub use progress::ProgressType;

fn level_for_verbosity(verbose: u8) -> tracing::Level {
    match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

fn init_tracing(output: &OutputConfig, tracing_config: &TracingConfig) -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(level_for_verbosity(output.verbose).as_str())
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);
    let result = if let Some(path) = &tracing_config.debug_log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| anyhow::anyhow!("failed to open debug log file {path:?}: {err}"))?;
        builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .try_init()
    } else {
        builder.with_writer(std::io::stderr).try_init()
    };
    // a subscriber may already be installed, e.g. when running inside tests
    if let Err(error) = result {
        tracing::debug!("tracing subscriber already set: {error}");
    }
    Ok(())
}

/// Runs `func` on a single-threaded tokio runtime and reports its outcome.
///
/// The MFT workflow issues one RPC at a time, so a current-thread runtime is sufficient; the
/// only concurrency is the backend executing transfers while the client polls.
///
/// Returns `Some(summary)` on success (printing it when `output.print_summary` is set) and
/// `None` on failure after printing the error chain to stderr unless `output.quiet` is set.
pub fn run<Fut, Summary>(
    output: OutputConfig,
    tracing_config: TracingConfig,
    func: impl FnOnce() -> Fut,
) -> Option<Summary>
where
    Summary: std::fmt::Display,
    Fut: std::future::Future<Output = anyhow::Result<Summary>>,
{
    if let Err(error) = init_tracing(&output, &tracing_config) {
        if !output.quiet {
            eprintln!("{error:#}");
        }
        return None;
    }
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            if !output.quiet {
                eprintln!("failed to start the async runtime: {error}");
            }
            return None;
        }
    };
    let res = runtime.block_on(func());
    match res {
        Ok(summary) => {
            if output.print_summary || output.verbose > 0 {
                println!("{summary}");
            }
            Some(summary)
        }
        Err(error) => {
            tracing::error!("{:#}", &error);
            if !output.quiet {
                eprintln!("{error:#}");
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for_verbosity(0), tracing::Level::ERROR);
        assert_eq!(level_for_verbosity(1), tracing::Level::INFO);
        assert_eq!(level_for_verbosity(2), tracing::Level::DEBUG);
        assert_eq!(level_for_verbosity(3), tracing::Level::TRACE);
        assert_eq!(level_for_verbosity(9), tracing::Level::TRACE);
    }

    #[test]
    fn run_returns_summary_on_success() {
        let output = OutputConfig {
            quiet: true,
            ..Default::default()
        };
        let res = run(output, TracingConfig::default(), || async {
            Ok::<_, anyhow::Error>(42)
        });
        assert_eq!(res, Some(42));
    }

    #[test]
    fn run_returns_none_on_failure() {
        let output = OutputConfig {
            quiet: true,
            ..Default::default()
        };
        let res: Option<u32> = run(output, TracingConfig::default(), || async {
            Err(anyhow::anyhow!("backend is down"))
        });
        assert!(res.is_none());
    }
}
