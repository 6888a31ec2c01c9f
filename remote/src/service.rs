use crate::error::RpcError;
use crate::pool::ConnectionPool;
use crate::protocol::{
    BatchTransferRequest, MetadataRequest, Request, ResourceMetadata, Response, SecretForStorage,
    SecretSpec, Service, StorageRecord, StorageSearch, StorageSpec, StorageType,
    TransferStateReply,
};

/// Operations the MFT backend offers to the client.
///
/// [`MftClient`] implements it over the network; tests substitute in-memory backends.
#[async_trait::async_trait]
pub trait MftService: Send + Sync {
    async fn search_storages(&self, search: StorageSearch)
    -> Result<Vec<StorageRecord>, RpcError>;

    async fn list_storages(&self) -> Result<Vec<StorageRecord>, RpcError>;

    async fn get_secret_for_storage(&self, storage_id: &str)
    -> Result<SecretForStorage, RpcError>;

    async fn create_storage(&self, name: &str, spec: StorageSpec) -> Result<String, RpcError>;

    async fn create_secret(&self, secret: SecretSpec) -> Result<String, RpcError>;

    async fn register_secret_for_storage(
        &self,
        storage_id: &str,
        secret_id: &str,
        storage_type: StorageType,
    ) -> Result<(), RpcError>;

    async fn fetch_resource_metadata(
        &self,
        request: MetadataRequest,
    ) -> Result<ResourceMetadata, RpcError>;

    /// Submits every unit of the batch at once and returns one transfer id per unit, in order.
    async fn submit_batch_transfer(
        &self,
        request: BatchTransferRequest,
    ) -> Result<Vec<String>, RpcError>;

    async fn get_transfer_state(&self, transfer_id: &str)
    -> Result<TransferStateReply, RpcError>;

    async fn cancel_transfer(&self, transfer_id: &str) -> Result<(), RpcError>;
}

/// Network client for the MFT backend services
#[derive(Debug)]
pub struct MftClient {
    endpoints: common::ServiceEndpoints,
    pool: ConnectionPool,
}

impl MftClient {
    pub fn new(endpoints: common::ServiceEndpoints, timeouts: common::TimeoutConfig) -> Self {
        Self {
            endpoints,
            pool: ConnectionPool::new(timeouts),
        }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn addr(&self, service: Service) -> &str {
        match service {
            Service::Transfer => &self.endpoints.transfer_api,
            Service::Resource => &self.endpoints.resource_service,
            Service::Secret => &self.endpoints.secret_service,
        }
    }

    async fn call(&self, request: Request) -> Result<Response, RpcError> {
        let addr = self.addr(request.service());
        match self.pool.call(addr, &request).await? {
            Response::Error { message } => Err(RpcError::Remote { message }),
            response => Ok(response),
        }
    }

    /// Closes all connections; the client reconnects lazily if used again.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn unexpected(request: &'static str, response: &Response) -> RpcError {
    RpcError::UnexpectedResponse {
        request,
        got: response.name(),
    }
}

#[async_trait::async_trait]
impl MftService for MftClient {
    async fn search_storages(
        &self,
        search: StorageSearch,
    ) -> Result<Vec<StorageRecord>, RpcError> {
        match self.call(Request::SearchStorages(search)).await? {
            Response::Storages(storages) => Ok(storages),
            other => Err(unexpected("SearchStorages", &other)),
        }
    }

    async fn list_storages(&self) -> Result<Vec<StorageRecord>, RpcError> {
        match self.call(Request::ListStorages).await? {
            Response::Storages(storages) => Ok(storages),
            other => Err(unexpected("ListStorages", &other)),
        }
    }

    async fn get_secret_for_storage(
        &self,
        storage_id: &str,
    ) -> Result<SecretForStorage, RpcError> {
        let request = Request::GetSecretForStorage {
            storage_id: storage_id.to_string(),
        };
        match self.call(request).await? {
            Response::SecretForStorage(secret) => Ok(secret),
            other => Err(unexpected("GetSecretForStorage", &other)),
        }
    }

    async fn create_storage(&self, name: &str, spec: StorageSpec) -> Result<String, RpcError> {
        let request = Request::CreateStorage {
            name: name.to_string(),
            spec,
        };
        match self.call(request).await? {
            Response::StorageCreated { storage_id } => Ok(storage_id),
            other => Err(unexpected("CreateStorage", &other)),
        }
    }

    async fn create_secret(&self, secret: SecretSpec) -> Result<String, RpcError> {
        match self.call(Request::CreateSecret(secret)).await? {
            Response::SecretCreated { secret_id } => Ok(secret_id),
            other => Err(unexpected("CreateSecret", &other)),
        }
    }

    async fn register_secret_for_storage(
        &self,
        storage_id: &str,
        secret_id: &str,
        storage_type: StorageType,
    ) -> Result<(), RpcError> {
        let request = Request::RegisterSecretForStorage {
            storage_id: storage_id.to_string(),
            secret_id: secret_id.to_string(),
            storage_type,
        };
        match self.call(request).await? {
            Response::SecretRegistered => Ok(()),
            other => Err(unexpected("RegisterSecretForStorage", &other)),
        }
    }

    async fn fetch_resource_metadata(
        &self,
        request: MetadataRequest,
    ) -> Result<ResourceMetadata, RpcError> {
        match self.call(Request::FetchResourceMetadata(request)).await? {
            Response::Metadata(metadata) => Ok(metadata),
            other => Err(unexpected("FetchResourceMetadata", &other)),
        }
    }

    async fn submit_batch_transfer(
        &self,
        request: BatchTransferRequest,
    ) -> Result<Vec<String>, RpcError> {
        match self.call(Request::SubmitBatchTransfer(request)).await? {
            Response::TransferIds(ids) => Ok(ids),
            other => Err(unexpected("SubmitBatchTransfer", &other)),
        }
    }

    async fn get_transfer_state(
        &self,
        transfer_id: &str,
    ) -> Result<TransferStateReply, RpcError> {
        let request = Request::GetTransferState {
            transfer_id: transfer_id.to_string(),
        };
        match self.call(request).await? {
            Response::TransferState(state) => Ok(state),
            other => Err(unexpected("GetTransferState", &other)),
        }
    }

    async fn cancel_transfer(&self, transfer_id: &str) -> Result<(), RpcError> {
        let request = Request::CancelTransfer {
            transfer_id: transfer_id.to_string(),
        };
        match self.call(request).await? {
            Response::TransferCancelled => Ok(()),
            other => Err(unexpected("CancelTransfer", &other)),
        }
    }
}
