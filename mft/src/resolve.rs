use remote::MftService;
use remote::protocol::StorageSearch;
use tracing::instrument;

use crate::error::{Error, Result};

/// Identifiers the backend needs to act on a registered storage.
///
/// Valid for the current invocation only, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRef {
    pub storage_id: String,
    pub secret_id: String,
}

/// Resolves a user supplied storage name (or, failing that, id) to a [`StorageRef`].
///
/// Exactly one match is accepted: none is [`Error::NotFound`], several are
/// [`Error::AmbiguousName`]. A secret reply carrying a non-zero error code is
/// [`Error::SecretUnavailable`].
#[instrument(skip(service))]
pub async fn resolve(service: &dyn MftService, name_or_id: &str) -> Result<StorageRef> {
    let mut matches = service
        .search_storages(StorageSearch::ByName(name_or_id.to_string()))
        .await?;
    if matches.is_empty() {
        tracing::debug!("no storage named {name_or_id:?}, searching by id");
        matches = service
            .search_storages(StorageSearch::ById(name_or_id.to_string()))
            .await?;
    }
    let storage = match matches.as_slice() {
        [] => return Err(Error::NotFound(name_or_id.to_string())),
        [storage] => storage,
        many => {
            return Err(Error::AmbiguousName {
                name: name_or_id.to_string(),
                count: many.len(),
            });
        }
    };
    let secret = service.get_secret_for_storage(&storage.storage_id).await?;
    if secret.error != 0 {
        return Err(Error::SecretUnavailable {
            storage_id: storage.storage_id.clone(),
            code: secret.error,
        });
    }
    tracing::info!(
        "resolved {name_or_id:?} to storage {} ({})",
        storage.storage_id,
        storage.storage_type
    );
    Ok(StorageRef {
        storage_id: storage.storage_id.clone(),
        secret_id: secret.secret_id,
    })
}
