//! Messages exchanged with the MFT backend services.
//!
//! Every service address accepts TCP connections carrying length-delimited frames, each frame
//! holding one bincode encoded [`Request`] or [`Response`]. A connection carries strictly one
//! response per request, in order.

use serde::{Deserialize, Serialize};

/// Kind of a registered storage as reported by the backend
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum StorageType {
    S3,
    Gcs,
    Azure,
    Swift,
    Scp,
    Http,
    Local,
    Ftp,
    #[strum(serialize = "BOX")]
    BoxCom,
    Dropbox,
    Odata,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageRecord {
    pub storage_id: String,
    pub storage_name: String,
    pub storage_type: StorageType,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum StorageSearch {
    ByName(String),
    ById(String),
}

/// Reply to a secret lookup; `error` is non-zero when the backend could not find the secret
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SecretForStorage {
    pub storage_id: String,
    pub secret_id: String,
    pub storage_type: StorageType,
    pub error: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileMetadata {
    pub friendly_name: String,
    /// Backend specific path of the file inside its storage
    pub resource_path: String,
    pub resource_size: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DirectoryMetadata {
    pub friendly_name: String,
    pub resource_path: String,
    pub files: Vec<FileMetadata>,
    pub directories: Vec<DirectoryMetadata>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetadataError {
    pub code: i32,
    pub description: String,
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} (code {})", self.description, self.code)
    }
}

/// Metadata of a remote resource, exactly one variant per reply
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum ResourceMetadata {
    File(FileMetadata),
    Directory(DirectoryMetadata),
    Error(MetadataError),
}

/// Storage description used both for registration and for probing an unregistered storage
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum StorageSpec {
    S3 {
        endpoint: String,
        region: String,
        bucket_name: String,
    },
    Gcs {
        project_id: String,
        bucket_name: String,
    },
    Azure {
        container: String,
    },
    Swift {
        region: String,
        container: String,
    },
    Scp {
        host: String,
        port: u16,
    },
    Http {
        base_url: String,
    },
    Local {
        agent_id: String,
    },
}

impl StorageSpec {
    pub fn storage_type(&self) -> StorageType {
        match self {
            StorageSpec::S3 { .. } => StorageType::S3,
            StorageSpec::Gcs { .. } => StorageType::Gcs,
            StorageSpec::Azure { .. } => StorageType::Azure,
            StorageSpec::Swift { .. } => StorageType::Swift,
            StorageSpec::Scp { .. } => StorageType::Scp,
            StorageSpec::Http { .. } => StorageType::Http,
            StorageSpec::Local { .. } => StorageType::Local,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum HttpAuth {
    Basic { user_name: String, password: String },
    Token { access_token: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum SwiftAuth {
    V2 {
        tenant: String,
        user_name: String,
        password: String,
    },
    V3 {
        user_name: String,
        password: String,
        project_name: String,
        project_domain_name: String,
        user_domain_name: String,
    },
}

/// Credential material, sent only once when a storage is registered
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum SecretSpec {
    S3 {
        access_key: String,
        secret_key: String,
        session_token: Option<String>,
    },
    Gcs {
        client_email: String,
        private_key: String,
        project_id: String,
    },
    Azure {
        connection_string: String,
    },
    Swift {
        endpoint: String,
        auth: SwiftAuth,
    },
    Scp {
        user: String,
        private_key: String,
        public_key: String,
        passphrase: Option<String>,
    },
    Http(HttpAuth),
}

// secrets must never end up in logs
impl std::fmt::Debug for SecretSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let kind = match self {
            SecretSpec::S3 { .. } => "S3",
            SecretSpec::Gcs { .. } => "Gcs",
            SecretSpec::Azure { .. } => "Azure",
            SecretSpec::Swift { .. } => "Swift",
            SecretSpec::Scp { .. } => "Scp",
            SecretSpec::Http(_) => "Http",
        };
        write!(f, "SecretSpec::{kind}(<redacted>)")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum MetadataRequest {
    /// Resource of a registered storage
    Ids {
        storage_id: String,
        secret_id: String,
        resource_path: String,
    },
    /// Resource of a storage that is not registered yet, e.g. to discover its buckets
    Direct {
        storage: StorageSpec,
        secret: Option<SecretSpec>,
        resource_path: String,
    },
}

/// One file level transfer unit
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointPaths {
    pub source_path: String,
    pub destination_path: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatchTransferRequest {
    pub source_storage_id: String,
    pub source_secret_id: String,
    pub destination_storage_id: String,
    pub destination_secret_id: String,
    pub endpoint_paths: Vec<EndpointPaths>,
    pub optimize_transfer_path: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferState {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Completed | TransferState::Failed)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TransferStateReply {
    pub state: TransferState,
    pub percentage: f64,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, strum::IntoStaticStr)]
pub enum Request {
    SearchStorages(StorageSearch),
    ListStorages,
    GetSecretForStorage {
        storage_id: String,
    },
    CreateStorage {
        name: String,
        spec: StorageSpec,
    },
    RegisterSecretForStorage {
        storage_id: String,
        secret_id: String,
        storage_type: StorageType,
    },
    CreateSecret(SecretSpec),
    FetchResourceMetadata(MetadataRequest),
    SubmitBatchTransfer(BatchTransferRequest),
    GetTransferState {
        transfer_id: String,
    },
    CancelTransfer {
        transfer_id: String,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, strum::IntoStaticStr)]
pub enum Response {
    Storages(Vec<StorageRecord>),
    SecretForStorage(SecretForStorage),
    StorageCreated { storage_id: String },
    SecretRegistered,
    SecretCreated { secret_id: String },
    Metadata(ResourceMetadata),
    TransferIds(Vec<String>),
    TransferState(TransferStateReply),
    TransferCancelled,
    Error { message: String },
}

/// Which backend service handles a request
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Service {
    Transfer,
    Resource,
    Secret,
}

impl Request {
    pub fn service(&self) -> Service {
        match self {
            Request::SearchStorages(_)
            | Request::ListStorages
            | Request::GetSecretForStorage { .. }
            | Request::CreateStorage { .. }
            | Request::RegisterSecretForStorage { .. } => Service::Resource,
            Request::CreateSecret(_) => Service::Secret,
            Request::FetchResourceMetadata(_)
            | Request::SubmitBatchTransfer(_)
            | Request::GetTransferState { .. }
            | Request::CancelTransfer { .. } => Service::Transfer,
        }
    }

    /// Short name of the request, safe to log
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl Response {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}
