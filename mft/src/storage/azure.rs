use remote::MftService;
use remote::protocol::{SecretSpec, StorageSpec};

use super::{NewStorage, StorageRegistrar, pick_container};
use crate::prompt::Prompter;

pub struct AzureRegistrar;

#[async_trait::async_trait]
impl StorageRegistrar for AzureRegistrar {
    async fn collect(
        &self,
        service: &dyn MftService,
        prompter: &dyn Prompter,
    ) -> anyhow::Result<NewStorage> {
        let connection_string = prompter.password("Connection String", false)?;
        let secret = SecretSpec::Azure { connection_string };
        let container = pick_container(
            service,
            prompter,
            StorageSpec::Azure {
                container: String::new(),
            },
            secret.clone(),
            "container",
        )
        .await?;
        let name = prompter.input("Name of the storage", Some(&container))?;
        Ok(NewStorage {
            name,
            storage: StorageSpec::Azure { container },
            secret: Some(secret),
        })
    }
}
