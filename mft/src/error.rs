use crate::transfer::Summary;

/// Reasons a workflow invocation stops.
///
/// Every variant is terminal for the current invocation; the only thing ever repeated is the
/// "is it done yet" question of the poll loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "No storage with name or id {0} was found. Please register the storage with `mft storage add`"
    )]
    NotFound(String),
    #[error(
        "More than one storage ({count}) with name {name} was found. Please use the storage id, you can fetch it with `mft storage list`"
    )]
    AmbiguousName { name: String, count: usize },
    #[error("Could not fetch the secret for storage {storage_id} (error code {code})")]
    SecretUnavailable { storage_id: String, code: i32 },
    #[error("Source is a directory path so destination path {0:?} should end with /")]
    InvalidDestination(String),
    #[error("Failed while fetching source details: {0}")]
    SourceResolution(String),
    #[error("Transfer cancelled, nothing was submitted")]
    Declined,
    #[error("Transfer interrupted, cancellation requested for unfinished files\n\n{0}")]
    Interrupted(Summary),
    #[error(transparent)]
    Transport(#[from] remote::RpcError),
    #[error(transparent)]
    Interaction(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
