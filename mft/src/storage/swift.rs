use remote::MftService;
use remote::protocol::{SecretSpec, StorageSpec, SwiftAuth};

use super::{NewStorage, StorageRegistrar};
use crate::prompt::Prompter;

pub struct SwiftRegistrar;

fn keystone_auth(prompter: &dyn Prompter) -> anyhow::Result<SwiftAuth> {
    let versions = vec!["v3".to_string(), "v2".to_string()];
    let auth = if prompter.select("Select Keystone Auth Version", &versions, 0)? == 0 {
        SwiftAuth::V3 {
            user_name: prompter.input("User Name", None)?,
            password: prompter.password("Password", false)?,
            project_name: prompter.input("Project Name", None)?,
            project_domain_name: prompter.input("Project Domain Name", Some("Default"))?,
            user_domain_name: prompter.input("User Domain Name", Some("Default"))?,
        }
    } else {
        SwiftAuth::V2 {
            tenant: prompter.input("Tenant Name", None)?,
            user_name: prompter.input("User Name", None)?,
            password: prompter.password("Password", false)?,
        }
    };
    Ok(auth)
}

#[async_trait::async_trait]
impl StorageRegistrar for SwiftRegistrar {
    async fn collect(
        &self,
        _service: &dyn MftService,
        prompter: &dyn Prompter,
    ) -> anyhow::Result<NewStorage> {
        let auth = keystone_auth(prompter)?;
        let endpoint = prompter.input("Auth URL", None)?;
        let region = prompter.input("Region Name", None)?;
        let container = prompter.input("Container", None)?;
        let name = prompter.input("Name of the storage", Some(&container))?;
        Ok(NewStorage {
            name,
            storage: StorageSpec::Swift { region, container },
            secret: Some(SecretSpec::Swift { endpoint, auth }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Answer, ScriptedPrompter};
    use crate::testutils::MockService;

    #[tokio::test]
    async fn v3_domains_default_to_default() {
        let prompter = ScriptedPrompter::new([
            Answer::choice("v3"),
            Answer::text("alice"),
            Answer::text("pw"),
            Answer::text("research"),
            Answer::Default,
            Answer::Default,
            Answer::text("https://keystone.example.org/v3"),
            Answer::text("RegionOne"),
            Answer::text("results"),
            Answer::Default,
        ]);
        let new = SwiftRegistrar
            .collect(&MockService::new(), &prompter)
            .await
            .unwrap();
        assert_eq!(new.name, "results");
        assert_eq!(
            new.secret,
            Some(SecretSpec::Swift {
                endpoint: "https://keystone.example.org/v3".to_string(),
                auth: SwiftAuth::V3 {
                    user_name: "alice".to_string(),
                    password: "pw".to_string(),
                    project_name: "research".to_string(),
                    project_domain_name: "Default".to_string(),
                    user_domain_name: "Default".to_string(),
                },
            })
        );
    }

    #[tokio::test]
    async fn v2_asks_for_tenant() {
        let prompter = ScriptedPrompter::new([
            Answer::choice("v2"),
            Answer::text("tenant-1"),
            Answer::text("bob"),
            Answer::text("pw"),
            Answer::text("https://keystone.example.org/v2.0"),
            Answer::text("RegionTwo"),
            Answer::text("c1"),
            Answer::text("swift-c1"),
        ]);
        let new = SwiftRegistrar
            .collect(&MockService::new(), &prompter)
            .await
            .unwrap();
        assert_eq!(
            new.storage,
            StorageSpec::Swift {
                region: "RegionTwo".to_string(),
                container: "c1".to_string(),
            }
        );
        assert!(matches!(
            new.secret,
            Some(SecretSpec::Swift { auth: SwiftAuth::V2 { ref tenant, .. }, .. }) if tenant == "tenant-1"
        ));
    }
}
