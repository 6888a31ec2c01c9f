use anyhow::anyhow;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use mft_tools_cli::metadata::Listing;
use mft_tools_cli::prompt::{AssumeYes, ConsolePrompter, Prompter};
use mft_tools_cli::storage::{Registered, StorageKind, StorageList};
use mft_tools_cli::transfer::PollSettings;
use mft_tools_cli::Summary;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "mft",
    version,
    about = "Browse registered storages and run batch transfers through an MFT backend",
    long_about = "`mft` is a client for a managed file transfer (MFT) backend.

The backend keeps a registry of storages (S3, GCS, Azure, Swift, SCP, HTTP and agent local
storages) and their credentials, and moves the data. Paths are written as
`<storage-name-or-id>/<path-inside-the-storage>`.

EXAMPLES:
    # Register a new storage interactively
    mft storage add --kind s3

    # List registered storages
    mft storage list

    # Browse a directory
    mft ls s3test/dir1/

    # Copy a directory (note the trailing / on the destination)
    mft cp s3test/dir1/ dest/out/ --progress

    # Copy a single file without the confirmation prompt
    mft cp s3test/file.txt dest/ --yes"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    endpoints: common::ServiceEndpoints,

    #[command(flatten)]
    timeouts: common::TimeoutConfig,

    /// Verbose level: -v INFO / -vv DEBUG / -vvv TRACE (default: ERROR)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true, help_heading = "Progress & output")]
    verbose: u8,

    /// Quiet mode, don't report errors
    #[arg(short = 'q', long = "quiet", global = true, help_heading = "Progress & output")]
    quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true, help_heading = "Progress & output")]
    debug_log_file: Option<std::path::PathBuf>,
}

#[derive(clap::Subcommand, Debug, Clone)]
enum Command {
    /// List the contents of a storage path
    Ls {
        /// Path to list, `<storage>/<path>`
        path: String,
    },
    /// Copy a file or a directory between storages
    Cp(CpArgs),
    /// Manage registered storages
    #[command(subcommand)]
    Storage(StorageCommand),
}

#[derive(clap::Args, Debug, Clone)]
struct CpArgs {
    /// Source path, `<storage>/<path>`; a directory source is copied recursively
    source: String,

    /// Destination path, `<storage>/<path>`; must end with `/` when the source is a directory
    destination: String,

    /// Start the transfer without asking for confirmation
    #[arg(short = 'y', long, help_heading = "Transfer options")]
    yes: bool,

    /// Delay between two polls of the transfer states
    ///
    /// Accepts human-readable durations like "500ms", "1s", "5s".
    #[arg(
        long,
        default_value = "1s",
        value_name = "DELAY",
        value_parser = humantime::parse_duration,
        help_heading = "Transfer options"
    )]
    poll_interval: std::time::Duration,

    /// Show progress
    #[arg(long, help_heading = "Progress & output")]
    progress: bool,

    /// Set the type of progress display
    ///
    /// If specified, --progress flag is implied.
    #[arg(long, value_name = "TYPE", help_heading = "Progress & output")]
    progress_type: Option<common::ProgressType>,

    /// Set delay between text progress updates
    ///
    /// Default is 10s. Only applies to the non-interactive (`TextUpdates`) display.
    #[arg(
        long,
        value_name = "DELAY",
        value_parser = humantime::parse_duration,
        help_heading = "Progress & output"
    )]
    progress_delay: Option<std::time::Duration>,
}

#[derive(clap::Subcommand, Debug, Clone)]
enum StorageCommand {
    /// List registered storages
    List,
    /// Register a new storage interactively
    Add {
        /// Kind of storage, asked interactively when omitted
        #[arg(long, value_enum)]
        kind: Option<StorageKind>,
    },
}

/// What a subcommand prints on success
enum Outcome {
    Listing(Listing),
    Copied(Summary),
    Storages(StorageList),
    Registered(Registered),
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Outcome::Listing(listing) => write!(f, "{listing}"),
            Outcome::Copied(summary) => write!(f, "{summary}"),
            Outcome::Storages(storages) => write!(f, "{storages}"),
            Outcome::Registered(registered) => write!(f, "{registered}"),
        }
    }
}

/// Cancels `cancel` on the first Ctrl-C and exits on the second.
fn watch_interrupts(cancel: CancellationToken) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if cancel.is_cancelled() {
                eprintln!("interrupted again, exiting without waiting for cancellation");
                std::process::exit(130);
            }
            eprintln!("interrupted, cancelling unfinished transfers (press Ctrl-C again to exit)");
            cancel.cancel();
        }
    });
}

async fn copy(client: &remote::MftClient, args: CpArgs) -> anyhow::Result<Summary> {
    let settings = PollSettings {
        interval: args.poll_interval,
        show_progress: args.progress || args.progress_type.is_some(),
        progress_type: args.progress_type.unwrap_or_default(),
        text_delay: args
            .progress_delay
            .unwrap_or(std::time::Duration::from_secs(10)),
    };
    let prompter: &dyn Prompter = if args.yes { &AssumeYes } else { &ConsolePrompter };
    let cancel = CancellationToken::new();
    watch_interrupts(cancel.clone());
    let summary = mft_tools_cli::copy::copy(
        client,
        prompter,
        &args.source,
        &args.destination,
        &settings,
        &cancel,
    )
    .await?;
    Ok(summary)
}

#[instrument(skip_all)]
async fn async_main(args: Args) -> anyhow::Result<Outcome> {
    args.timeouts.validate().map_err(|error| anyhow!(error))?;
    let client = remote::MftClient::new(args.endpoints.clone(), args.timeouts);
    let outcome = match args.command {
        Command::Ls { path } => mft_tools_cli::metadata::ls(&client, &path)
            .await
            .map(Outcome::Listing)
            .map_err(anyhow::Error::from),
        Command::Cp(cp_args) => copy(&client, cp_args).await.map(Outcome::Copied),
        Command::Storage(StorageCommand::List) => mft_tools_cli::storage::list(&client)
            .await
            .map(Outcome::Storages)
            .map_err(anyhow::Error::from),
        Command::Storage(StorageCommand::Add { kind }) => {
            mft_tools_cli::storage::add_storage(&client, &ConsolePrompter, kind)
                .await
                .map(Outcome::Registered)
                .map_err(anyhow::Error::from)
        }
    };
    client.close().await;
    outcome
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    let func = {
        let args = args.clone();
        || async_main(args)
    };
    let output = common::OutputConfig {
        quiet: args.quiet,
        verbose: args.verbose,
        print_summary: true,
    };
    let tracing = common::TracingConfig {
        debug_log_file: args.debug_log_file.clone(),
    };
    let res = common::run(output, tracing, func);
    if res.is_none() {
        std::process::exit(1);
    }
    Ok(())
}
