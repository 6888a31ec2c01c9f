use remote::MftService;
use remote::protocol::{SecretSpec, StorageSpec};

use super::{NewStorage, StorageRegistrar, pick_container};
use crate::prompt::Prompter;

const AWS_REGIONS: &[&str] = &[
    "us-east-2",
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "af-south-1",
    "ap-east-1",
    "ap-southeast-3",
    "ap-south-1",
    "ap-northeast-3",
    "ap-northeast-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "ca-central-1",
    "cn-north-1",
    "cn-northwest-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-south-1",
    "eu-west-3",
    "eu-north-1",
    "eu-south-2",
    "eu-central-2",
    "sa-east-1",
    "me-south-1",
    "me-central-1",
    "us-gov-east-1",
    "us-gov-west-1",
];

pub fn aws_endpoint(region: &str) -> String {
    format!("https://s3.{region}.amazonaws.com")
}

pub struct S3Registrar;

#[async_trait::async_trait]
impl StorageRegistrar for S3Registrar {
    async fn collect(
        &self,
        service: &dyn MftService,
        prompter: &dyn Prompter,
    ) -> anyhow::Result<NewStorage> {
        let access_key = prompter.input("Access Key ID", None)?;
        let secret_key = prompter.password("Secret Access Key", false)?;
        let session_token = if prompter.confirm("Do you have a session token?", false)? {
            Some(prompter.password("Session Token", false)?)
        } else {
            None
        };
        let (endpoint, region) = if prompter.confirm("Is this an AWS S3 bucket?", true)? {
            let regions: Vec<String> = AWS_REGIONS.iter().map(ToString::to_string).collect();
            let index = prompter.select("Select the AWS Region", &regions, 0)?;
            let region = regions
                .into_iter()
                .nth(index)
                .ok_or_else(|| anyhow::anyhow!("no AWS region at index {index}"))?;
            (aws_endpoint(&region), region)
        } else {
            let endpoint = prompter.input("What is the S3 endpoint URL?", None)?;
            let region = prompter.input("What is the region of the bucket?", None)?;
            (endpoint, region)
        };
        let secret = SecretSpec::S3 {
            access_key,
            secret_key,
            session_token,
        };
        let bucket_name = pick_container(
            service,
            prompter,
            StorageSpec::S3 {
                endpoint: endpoint.clone(),
                region: region.clone(),
                bucket_name: String::new(),
            },
            secret.clone(),
            "bucket",
        )
        .await?;
        let name = prompter.input("Name of the storage", Some(&bucket_name))?;
        Ok(NewStorage {
            name,
            storage: StorageSpec::S3 {
                endpoint,
                region,
                bucket_name,
            },
            secret: Some(secret),
        })
    }
}
