use remote::MftService;
use remote::protocol::StorageSpec;

use super::{NewStorage, StorageRegistrar};
use crate::prompt::Prompter;

/// Storage on the host of an MFT agent; the agent itself holds any credentials.
pub struct LocalRegistrar;

#[async_trait::async_trait]
impl StorageRegistrar for LocalRegistrar {
    async fn collect(
        &self,
        _service: &dyn MftService,
        prompter: &dyn Prompter,
    ) -> anyhow::Result<NewStorage> {
        let agent_id = prompter.input("Agent identifier", None)?;
        let name = prompter.input("Storage name", Some(&agent_id))?;
        Ok(NewStorage {
            name,
            storage: StorageSpec::Local { agent_id },
            secret: None,
        })
    }
}
