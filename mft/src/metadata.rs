use remote::MftService;
use remote::protocol::{MetadataRequest, ResourceMetadata};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::path::StoragePath;
use crate::resolve::{StorageRef, resolve};

/// Asks the backend what lives at `relative_path` inside a resolved storage.
///
/// One request, no caching. The reply may be the `Error` variant; callers decide what that means.
#[instrument(skip(service))]
pub async fn fetch_metadata(
    service: &dyn MftService,
    storage: &StorageRef,
    relative_path: &str,
) -> Result<ResourceMetadata> {
    let request = MetadataRequest::Ids {
        storage_id: storage.storage_id.clone(),
        secret_id: storage.secret_id.clone(),
        resource_path: relative_path.to_string(),
    };
    let metadata = service.fetch_resource_metadata(request).await?;
    tracing::debug!("metadata for {relative_path:?}: {metadata:?}");
    Ok(metadata)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum EntryKind {
    #[strum(serialize = "DIR")]
    Directory,
    #[strum(serialize = "FILE")]
    File,
}

/// One line of `mft ls` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub name: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
}

/// Immediate children of a directory (directories first), or the file itself.
pub fn listing_rows(path: &str, metadata: &ResourceMetadata) -> Result<Vec<ListingRow>> {
    match metadata {
        ResourceMetadata::Directory(directory) => {
            let directories = directory.directories.iter().map(|dir| ListingRow {
                name: dir.friendly_name.clone(),
                kind: EntryKind::Directory,
                size: None,
            });
            let files = directory.files.iter().map(|file| ListingRow {
                name: file.friendly_name.clone(),
                kind: EntryKind::File,
                size: Some(file.resource_size),
            });
            Ok(directories.chain(files).collect())
        }
        ResourceMetadata::File(file) => Ok(vec![ListingRow {
            name: file.friendly_name.clone(),
            kind: EntryKind::File,
            size: Some(file.resource_size),
        }]),
        ResourceMetadata::Error(error) => Err(Error::SourceResolution(format!("{path}: {error}"))),
    }
}

pub fn listing_table(rows: &[ListingRow]) -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Name", "Type", "Size"]);
    for row in rows {
        table.add_row(vec![
            comfy_table::Cell::new(&row.name).add_attribute(comfy_table::Attribute::Bold),
            comfy_table::Cell::new(row.kind).set_alignment(comfy_table::CellAlignment::Center),
            comfy_table::Cell::new(row.size.map(|size| size.to_string()).unwrap_or_default())
                .set_alignment(comfy_table::CellAlignment::Center),
        ]);
    }
    table
}

/// Result of `mft ls`, printed as a table
#[derive(Debug)]
pub struct Listing {
    pub rows: Vec<ListingRow>,
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", listing_table(&self.rows))
    }
}

/// Lists `raw_path` (`<storage>/<path>`).
pub async fn ls(service: &dyn MftService, raw_path: &str) -> Result<Listing> {
    let path = StoragePath::parse(raw_path);
    let storage = resolve(service, path.storage()).await?;
    let metadata = fetch_metadata(service, &storage, path.relative_path()).await?;
    let rows = listing_rows(raw_path, &metadata)?;
    Ok(Listing { rows })
}
