use remote::MftService;
use remote::protocol::{HttpAuth, SecretSpec, StorageSpec};

use super::{NewStorage, StorageRegistrar};
use crate::prompt::Prompter;

pub struct HttpRegistrar;

#[async_trait::async_trait]
impl StorageRegistrar for HttpRegistrar {
    async fn collect(
        &self,
        _service: &dyn MftService,
        prompter: &dyn Prompter,
    ) -> anyhow::Result<NewStorage> {
        let base_url = prompter.input("Base URL", None)?;
        let name = prompter.input("Storage Name", Some(&base_url))?;
        let methods = vec!["Basic Auth".to_string(), "Token".to_string()];
        let auth = if prompter.select("What is the authentication method", &methods, 0)? == 0 {
            HttpAuth::Basic {
                user_name: prompter.input("User Name", None)?,
                password: prompter.password("Password", false)?,
            }
        } else {
            HttpAuth::Token {
                access_token: prompter.password("Token", false)?,
            }
        };
        Ok(NewStorage {
            name,
            storage: StorageSpec::Http { base_url },
            secret: Some(SecretSpec::Http(auth)),
        })
    }
}
