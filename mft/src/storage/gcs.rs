use anyhow::Context;
use remote::MftService;
use remote::protocol::{SecretSpec, StorageSpec};

use super::{NewStorage, StorageRegistrar, pick_container, read_key_file};
use crate::prompt::Prompter;

/// Fields of a service account JSON key that the backend needs
#[derive(Debug, serde::Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    project_id: String,
}

fn parse_service_account_key(json: &str) -> anyhow::Result<ServiceAccountKey> {
    serde_json::from_str(json).context("not a service account JSON key")
}

pub struct GcsRegistrar;

#[async_trait::async_trait]
impl StorageRegistrar for GcsRegistrar {
    async fn collect(
        &self,
        service: &dyn MftService,
        prompter: &dyn Prompter,
    ) -> anyhow::Result<NewStorage> {
        println!(
            "MFT accesses Google Cloud Storage with a service account. Create one at \
             https://console.cloud.google.com/iam-admin/serviceaccounts and download its JSON key."
        );
        let key_path = prompter.input("Service Account Credential JSON path", None)?;
        let key = parse_service_account_key(&read_key_file(&key_path).await?)
            .with_context(|| format!("failed to load {key_path:?}"))?;
        let secret = SecretSpec::Gcs {
            client_email: key.client_email,
            private_key: key.private_key,
            project_id: key.project_id.clone(),
        };
        let bucket_name = pick_container(
            service,
            prompter,
            StorageSpec::Gcs {
                project_id: key.project_id.clone(),
                bucket_name: String::new(),
            },
            secret.clone(),
            "bucket",
        )
        .await?;
        let name = prompter.input("Name of the storage", Some(&bucket_name))?;
        Ok(NewStorage {
            name,
            storage: StorageSpec::Gcs {
                project_id: key.project_id,
                bucket_name,
            },
            secret: Some(secret),
        })
    }
}
