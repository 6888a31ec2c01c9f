//! Registering new storages with the backend and listing the registered ones.
//!
//! Each [`StorageKind`] knows how to interview the user for its storage and secret details
//! through a [`StorageRegistrar`]; [`register`] then creates both on the backend and links them.

use anyhow::Context;
use remote::MftService;
use remote::protocol::{MetadataRequest, ResourceMetadata, SecretSpec, StorageRecord, StorageSpec};
use tracing::instrument;

use crate::error::Result;
use crate::prompt::Prompter;

mod azure;
mod gcs;
mod http;
mod local;
mod s3;
mod scp;
mod swift;

/// Storage kinds that can be registered from the command line
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, strum::Display, strum::EnumIter, clap::ValueEnum,
)]
pub enum StorageKind {
    #[strum(serialize = "S3")]
    S3,
    #[strum(serialize = "Google Cloud Storage (GCS)")]
    Gcs,
    #[strum(serialize = "Azure Storage")]
    Azure,
    #[strum(serialize = "Openstack SWIFT")]
    Swift,
    #[strum(serialize = "SCP")]
    Scp,
    #[strum(serialize = "HTTP")]
    Http,
    #[strum(serialize = "Local (agent)")]
    Local,
}

impl StorageKind {
    fn registrar(self) -> &'static dyn StorageRegistrar {
        match self {
            StorageKind::S3 => &s3::S3Registrar,
            StorageKind::Gcs => &gcs::GcsRegistrar,
            StorageKind::Azure => &azure::AzureRegistrar,
            StorageKind::Swift => &swift::SwiftRegistrar,
            StorageKind::Scp => &scp::ScpRegistrar,
            StorageKind::Http => &http::HttpRegistrar,
            StorageKind::Local => &local::LocalRegistrar,
        }
    }
}

/// A storage and its credentials, ready to be created on the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStorage {
    pub name: String,
    pub storage: StorageSpec,
    /// Local storages are served by an agent and carry no secret
    pub secret: Option<SecretSpec>,
}

/// Collects everything needed to register one kind of storage.
#[async_trait::async_trait]
pub trait StorageRegistrar: Send + Sync {
    async fn collect(
        &self,
        service: &dyn MftService,
        prompter: &dyn Prompter,
    ) -> anyhow::Result<NewStorage>;
}

/// A storage that was just registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub name: String,
    pub storage_id: String,
    pub secret_id: Option<String>,
}

impl std::fmt::Display for Registered {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Successfully added storage {} with id {}",
            self.name, self.storage_id
        )
    }
}

/// Creates the storage, then its secret, and links the two.
#[instrument(skip_all, fields(name = %new.name))]
pub async fn register(service: &dyn MftService, new: NewStorage) -> Result<Registered> {
    let storage_type = new.storage.storage_type();
    let storage_id = service.create_storage(&new.name, new.storage).await?;
    tracing::info!("created {storage_type} storage {storage_id}");
    let secret_id = match new.secret {
        Some(secret) => {
            let secret_id = service.create_secret(secret).await?;
            service
                .register_secret_for_storage(&storage_id, &secret_id, storage_type)
                .await?;
            tracing::info!("registered secret {secret_id} for storage {storage_id}");
            Some(secret_id)
        }
        None => None,
    };
    Ok(Registered {
        name: new.name,
        storage_id,
        secret_id,
    })
}

/// Interactive `storage add`: asks for the kind unless given, then for its details.
pub async fn add_storage(
    service: &dyn MftService,
    prompter: &dyn Prompter,
    kind: Option<StorageKind>,
) -> Result<Registered> {
    let kind = match kind {
        Some(kind) => kind,
        None => {
            use strum::IntoEnumIterator;
            let kinds: Vec<StorageKind> = StorageKind::iter().collect();
            let labels: Vec<String> = kinds.iter().map(ToString::to_string).collect();
            let index = prompter.select("Select storage type", &labels, 0)?;
            *kinds
                .get(index)
                .with_context(|| format!("no storage type at index {index}"))?
        }
    };
    tracing::debug!("adding a {kind} storage");
    let new = kind.registrar().collect(service, prompter).await?;
    register(service, new).await
}

const MANUAL_ENTRY: &str = "Manually enter";

/// Lets the user pick a bucket or container visible with the given credentials.
///
/// The backend is asked directly, before anything is registered. When it cannot list anything
/// only manual entry is offered.
async fn pick_container(
    service: &dyn MftService,
    prompter: &dyn Prompter,
    storage: StorageSpec,
    secret: SecretSpec,
    what: &str,
) -> anyhow::Result<String> {
    let request = MetadataRequest::Direct {
        storage,
        secret: Some(secret),
        resource_path: String::new(),
    };
    let mut options = vec![MANUAL_ENTRY.to_string()];
    match service.fetch_resource_metadata(request).await? {
        ResourceMetadata::Directory(root) => {
            options.extend(root.directories.into_iter().map(|dir| dir.friendly_name));
        }
        ResourceMetadata::Error(error) => {
            tracing::warn!("could not list {what}s: {error}");
        }
        ResourceMetadata::File(file) => {
            tracing::warn!("expected a list of {what}s, got file {}", file.friendly_name);
        }
    }
    let index = prompter.select(&format!("Select the {what}"), &options, 0)?;
    if index == 0 {
        return prompter.input(&format!("Enter {what} name"), None);
    }
    options
        .into_iter()
        .nth(index)
        .with_context(|| format!("no {what} at index {index}"))
}

async fn read_key_file(path: &str) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {path:?}"))
}

/// Registered storages, printed as a table
#[derive(Debug)]
pub struct StorageList {
    pub storages: Vec<StorageRecord>,
}

impl std::fmt::Display for StorageList {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut table = comfy_table::Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["Storage Name", "Type", "Storage ID"]);
        for storage in &self.storages {
            table.add_row(vec![
                comfy_table::Cell::new(&storage.storage_name)
                    .add_attribute(comfy_table::Attribute::Bold),
                comfy_table::Cell::new(storage.storage_type)
                    .set_alignment(comfy_table::CellAlignment::Center),
                comfy_table::Cell::new(&storage.storage_id)
                    .set_alignment(comfy_table::CellAlignment::Center),
            ]);
        }
        write!(f, "{table}")
    }
}

pub async fn list(service: &dyn MftService) -> Result<StorageList> {
    let storages = service.list_storages().await?;
    Ok(StorageList { storages })
}
