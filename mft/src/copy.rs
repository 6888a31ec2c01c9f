use remote::MftService;
use remote::protocol::ResourceMetadata;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::Result;
use crate::metadata::fetch_metadata;
use crate::path::StoragePath;
use crate::prompt::Prompter;
use crate::request::build;
use crate::resolve::resolve;
use crate::transfer::{PollSettings, Summary, submit_and_track};

/// Copies `source` to `destination`, both given as `<storage>/<path>`.
///
/// Both storages are resolved before the source is inspected, so an unknown destination fails
/// without any metadata lookup.
#[instrument(skip(service, prompter, settings, cancel))]
pub async fn copy(
    service: &dyn MftService,
    prompter: &dyn Prompter,
    source: &str,
    destination: &str,
    settings: &PollSettings,
    cancel: &CancellationToken,
) -> Result<Summary> {
    let source_path = StoragePath::parse(source);
    let destination_path = StoragePath::parse(destination);
    let source_storage = resolve(service, source_path.storage()).await?;
    let destination_storage = resolve(service, destination_path.storage()).await?;
    let metadata = fetch_metadata(service, &source_storage, source_path.relative_path()).await?;
    if let ResourceMetadata::Directory(directory) = &metadata {
        tracing::debug!(
            "{source} is a directory with {} files and {} subdirectories at the top level",
            directory.files.len(),
            directory.directories.len()
        );
    }
    let plan = build(
        &source_storage,
        &destination_storage,
        &destination_path,
        &metadata,
    )?;
    for unit in plan.units() {
        tracing::debug!("{} -> {}", unit.source_path, unit.destination_path);
    }
    submit_and_track(service, prompter, plan, settings, cancel).await
}
