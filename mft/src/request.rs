use remote::protocol::{BatchTransferRequest, EndpointPaths, ResourceMetadata};

use crate::error::{Error, Result};
use crate::flatten::flatten;
use crate::path::StoragePath;
use crate::resolve::StorageRef;

/// A batch ready for submission plus what the user is asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub request: BatchTransferRequest,
    /// Sum of the sizes of all units, in bytes
    pub total_volume: u64,
}

impl TransferPlan {
    pub fn units(&self) -> &[EndpointPaths] {
        &self.request.endpoint_paths
    }

    pub fn len(&self) -> usize {
        self.request.endpoint_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.request.endpoint_paths.is_empty()
    }
}

/// Turns the source metadata into one transfer unit per file.
///
/// A directory source requires a destination ending with `/`; each file lands at the destination
/// path joined with its path relative to the source directory. A file source copied to a
/// directory destination keeps its own name.
pub fn build(
    source: &StorageRef,
    destination: &StorageRef,
    destination_path: &StoragePath,
    metadata: &ResourceMetadata,
) -> Result<TransferPlan> {
    let mut total_volume = 0;
    let endpoint_paths = match metadata {
        ResourceMetadata::Directory(directory) => {
            if !destination_path.ends_with_separator() {
                return Err(Error::InvalidDestination(destination_path.to_string()));
            }
            flatten(directory)
                .into_iter()
                .map(|(file, relative_path)| {
                    total_volume += file.resource_size;
                    EndpointPaths {
                        source_path: file.resource_path,
                        destination_path: destination_path.join(&relative_path).relative_path().to_string(),
                    }
                })
                .collect()
        }
        ResourceMetadata::File(file) => {
            let target = if destination_path.is_directory_target() {
                destination_path.join(&file.friendly_name)
            } else {
                destination_path.clone()
            };
            total_volume = file.resource_size;
            vec![EndpointPaths {
                source_path: file.resource_path.clone(),
                destination_path: target.relative_path().to_string(),
            }]
        }
        ResourceMetadata::Error(error) => {
            return Err(Error::SourceResolution(error.to_string()));
        }
    };
    Ok(TransferPlan {
        request: BatchTransferRequest {
            source_storage_id: source.storage_id.clone(),
            source_secret_id: source.secret_id.clone(),
            destination_storage_id: destination.storage_id.clone(),
            destination_secret_id: destination.secret_id.clone(),
            endpoint_paths,
            optimize_transfer_path: false,
        },
        total_volume,
    })
}
