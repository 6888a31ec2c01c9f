use anyhow::Context;
use remote::MftService;
use remote::protocol::{SecretSpec, StorageSpec};

use super::{NewStorage, StorageRegistrar, read_key_file};
use crate::prompt::Prompter;

const DEFAULT_SSH_PORT: &str = "22";

pub struct ScpRegistrar;

#[async_trait::async_trait]
impl StorageRegistrar for ScpRegistrar {
    async fn collect(
        &self,
        _service: &dyn MftService,
        prompter: &dyn Prompter,
    ) -> anyhow::Result<NewStorage> {
        let private_key = read_key_file(&prompter.input("Private Key File Location", None)?).await?;
        let public_key = read_key_file(&prompter.input("Public Key File Location", None)?).await?;
        let passphrase = if prompter.confirm("Is there a passphrase to Private Key?", false)? {
            Some(prompter.password("Passphrase to Private Key", false)?)
        } else {
            None
        };
        let host = prompter.input("Hostname / IP", None)?;
        let user = prompter.input("User Name", None)?;
        let port = prompter.input("Port", Some(DEFAULT_SSH_PORT))?;
        let port = port
            .trim()
            .parse::<u16>()
            .with_context(|| format!("invalid port {port:?}"))?;
        let name = prompter.input("Storage Name", Some(&host))?;
        Ok(NewStorage {
            name,
            storage: StorageSpec::Scp { host, port },
            secret: Some(SecretSpec::Scp {
                user,
                private_key,
                public_key,
                passphrase,
            }),
        })
    }
}
