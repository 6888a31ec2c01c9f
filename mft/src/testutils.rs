//! In-memory MFT backend used by unit and integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use remote::RpcError;
use remote::protocol::{
    BatchTransferRequest, MetadataRequest, ResourceMetadata, SecretForStorage, SecretSpec,
    StorageRecord, StorageSearch, StorageSpec, StorageType, TransferState, TransferStateReply,
};

/// Scripted [`remote::MftService`] implementation.
///
/// Storages, secrets and metadata are configured up front; every call is recorded so tests can
/// assert on what the workflow asked for and in which order.
#[derive(Debug, Default)]
pub struct MockService {
    storages: Vec<StorageRecord>,
    secrets: HashMap<String, SecretForStorage>,
    metadata: HashMap<(String, String), ResourceMetadata>,
    direct_metadata: HashMap<String, ResourceMetadata>,
    // per source path: states returned by consecutive polls, the last one repeats
    transfer_scripts: HashMap<String, Vec<TransferStateReply>>,
    // overrides how many transfer ids a submission hands back
    returned_ids: Option<usize>,
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<&'static str>,
    submitted: Vec<BatchTransferRequest>,
    transfers: Vec<(String, String)>,
    polls: HashMap<String, usize>,
    cancelled: Vec<String>,
    created_storages: Vec<(String, StorageSpec)>,
    created_secrets: Vec<SecretSpec>,
    registered: Vec<(String, String, StorageType)>,
    direct_requests: Vec<MetadataRequest>,
}

pub fn state_reply(state: TransferState) -> TransferStateReply {
    TransferStateReply {
        state,
        percentage: if state == TransferState::Completed { 1.0 } else { 0.0 },
        description: None,
    }
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a storage together with the secret the backend hands out for it.
    pub fn with_storage(
        mut self,
        storage_id: &str,
        storage_name: &str,
        storage_type: StorageType,
        secret_id: &str,
    ) -> Self {
        self.storages.push(StorageRecord {
            storage_id: storage_id.to_string(),
            storage_name: storage_name.to_string(),
            storage_type,
        });
        self.secrets.insert(
            storage_id.to_string(),
            SecretForStorage {
                storage_id: storage_id.to_string(),
                secret_id: secret_id.to_string(),
                storage_type,
                error: 0,
            },
        );
        self
    }

    pub fn with_secret_error(mut self, storage_id: &str, error: i32) -> Self {
        if let Some(secret) = self.secrets.get_mut(storage_id) {
            secret.error = error;
        }
        self
    }

    pub fn with_metadata(
        mut self,
        storage_id: &str,
        resource_path: &str,
        metadata: ResourceMetadata,
    ) -> Self {
        self.metadata.insert(
            (storage_id.to_string(), resource_path.to_string()),
            metadata,
        );
        self
    }

    /// Metadata returned for direct (unregistered storage) requests on `resource_path`.
    pub fn with_direct_metadata(mut self, resource_path: &str, metadata: ResourceMetadata) -> Self {
        self.direct_metadata
            .insert(resource_path.to_string(), metadata);
        self
    }

    /// Makes every submission return `count` transfer ids whatever the batch size.
    pub fn with_returned_ids(mut self, count: usize) -> Self {
        self.returned_ids = Some(count);
        self
    }

    /// States reported for the unit copying `source_path`; units without a script complete on
    /// the first poll.
    pub fn with_transfer_script(
        mut self,
        source_path: &str,
        script: Vec<TransferStateReply>,
    ) -> Self {
        self.transfer_scripts
            .insert(source_path.to_string(), script);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // a panicking test thread must not hide the state from the remaining assertions
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: &'static str) {
        self.lock().calls.push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn submitted(&self) -> Vec<BatchTransferRequest> {
        self.lock().submitted.clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.lock().cancelled.clone()
    }

    /// Number of `GetTransferState` calls made for `transfer_id`
    pub fn polls(&self, transfer_id: &str) -> usize {
        self.lock().polls.get(transfer_id).copied().unwrap_or(0)
    }

    pub fn created_storages(&self) -> Vec<(String, StorageSpec)> {
        self.lock().created_storages.clone()
    }

    pub fn created_secrets(&self) -> Vec<SecretSpec> {
        self.lock().created_secrets.clone()
    }

    pub fn registered(&self) -> Vec<(String, String, StorageType)> {
        self.lock().registered.clone()
    }

    pub fn direct_requests(&self) -> Vec<MetadataRequest> {
        self.lock().direct_requests.clone()
    }
}

#[async_trait::async_trait]
impl remote::MftService for MockService {
    async fn search_storages(
        &self,
        search: StorageSearch,
    ) -> Result<Vec<StorageRecord>, RpcError> {
        self.record("SearchStorages");
        let found = self
            .storages
            .iter()
            .filter(|storage| match &search {
                StorageSearch::ByName(name) => &storage.storage_name == name,
                StorageSearch::ById(id) => &storage.storage_id == id,
            })
            .cloned()
            .collect();
        Ok(found)
    }

    async fn list_storages(&self) -> Result<Vec<StorageRecord>, RpcError> {
        self.record("ListStorages");
        Ok(self.storages.clone())
    }

    async fn get_secret_for_storage(
        &self,
        storage_id: &str,
    ) -> Result<SecretForStorage, RpcError> {
        self.record("GetSecretForStorage");
        self.secrets
            .get(storage_id)
            .cloned()
            .ok_or_else(|| RpcError::Remote {
                message: format!("no secret registered for storage {storage_id}"),
            })
    }

    async fn create_storage(&self, name: &str, spec: StorageSpec) -> Result<String, RpcError> {
        self.record("CreateStorage");
        let mut state = self.lock();
        state.created_storages.push((name.to_string(), spec));
        Ok(format!("storage-{}", state.created_storages.len()))
    }

    async fn create_secret(&self, secret: SecretSpec) -> Result<String, RpcError> {
        self.record("CreateSecret");
        let mut state = self.lock();
        state.created_secrets.push(secret);
        Ok(format!("secret-{}", state.created_secrets.len()))
    }

    async fn register_secret_for_storage(
        &self,
        storage_id: &str,
        secret_id: &str,
        storage_type: StorageType,
    ) -> Result<(), RpcError> {
        self.record("RegisterSecretForStorage");
        self.lock().registered.push((
            storage_id.to_string(),
            secret_id.to_string(),
            storage_type,
        ));
        Ok(())
    }

    async fn fetch_resource_metadata(
        &self,
        request: MetadataRequest,
    ) -> Result<ResourceMetadata, RpcError> {
        self.record("FetchResourceMetadata");
        let found = match &request {
            MetadataRequest::Ids {
                storage_id,
                resource_path,
                ..
            } => self
                .metadata
                .get(&(storage_id.clone(), resource_path.clone()))
                .cloned(),
            MetadataRequest::Direct { resource_path, .. } => {
                self.lock().direct_requests.push(request.clone());
                self.direct_metadata.get(resource_path).cloned()
            }
        };
        Ok(found.unwrap_or_else(|| {
            ResourceMetadata::Error(remote::protocol::MetadataError {
                code: 404,
                description: "resource not found".to_string(),
            })
        }))
    }

    async fn submit_batch_transfer(
        &self,
        request: BatchTransferRequest,
    ) -> Result<Vec<String>, RpcError> {
        self.record("SubmitBatchTransfer");
        let mut state = self.lock();
        let mut ids = Vec::with_capacity(request.endpoint_paths.len());
        for unit in &request.endpoint_paths {
            let id = format!("transfer-{}", state.transfers.len());
            state.transfers.push((id.clone(), unit.source_path.clone()));
            ids.push(id);
        }
        if let Some(count) = self.returned_ids {
            ids.resize_with(count, || format!("extra-{count}"));
        }
        state.submitted.push(request);
        Ok(ids)
    }

    async fn get_transfer_state(
        &self,
        transfer_id: &str,
    ) -> Result<TransferStateReply, RpcError> {
        self.record("GetTransferState");
        let mut state = self.lock();
        let source_path = state
            .transfers
            .iter()
            .find(|(id, _)| id == transfer_id)
            .map(|(_, source_path)| source_path.clone())
            .ok_or_else(|| RpcError::Remote {
                message: format!("unknown transfer {transfer_id}"),
            })?;
        let poll = state.polls.entry(transfer_id.to_string()).or_insert(0);
        let index = *poll;
        *poll += 1;
        let reply = match self.transfer_scripts.get(&source_path) {
            Some(script) if !script.is_empty() => {
                script[index.min(script.len() - 1)].clone()
            }
            _ => state_reply(TransferState::Completed),
        };
        Ok(reply)
    }

    async fn cancel_transfer(&self, transfer_id: &str) -> Result<(), RpcError> {
        self.record("CancelTransfer");
        self.lock().cancelled.push(transfer_id.to_string());
        Ok(())
    }
}
