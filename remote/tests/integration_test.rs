use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use remote::protocol::{
    BatchTransferRequest, EndpointPaths, FileMetadata, MetadataRequest, Request, ResourceMetadata,
    Response, SecretForStorage, StorageRecord, StorageSearch, StorageType, TransferState,
    TransferStateReply,
};
use remote::streams::Connection;
use remote::{MftClient, MftService, RpcError};

/// Minimal in-process backend: answers every request with `handler`, optionally hanging up
/// after `max_requests_per_connection` requests.
struct TestServer {
    addr: String,
    accepted: Arc<AtomicUsize>,
}

async fn start_server(
    handler: fn(Request) -> Response,
    max_requests_per_connection: Option<usize>,
) -> Result<TestServer> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut connection = Connection::new(stream);
                let mut served = 0;
                while let Ok(Some(request)) = connection.recv_mut().recv_object::<Request>().await
                {
                    if connection
                        .send_mut()
                        .send_message(&handler(request))
                        .await
                        .is_err()
                    {
                        break;
                    }
                    served += 1;
                    if max_requests_per_connection.is_some_and(|max| served >= max) {
                        break;
                    }
                }
            });
        }
    });
    Ok(TestServer { addr, accepted })
}

fn backend(request: Request) -> Response {
    match request {
        Request::SearchStorages(StorageSearch::ByName(name)) if name == "s3test" => {
            Response::Storages(vec![StorageRecord {
                storage_id: "abc".to_string(),
                storage_name: "s3test".to_string(),
                storage_type: StorageType::S3,
            }])
        }
        Request::SearchStorages(_) => Response::Storages(vec![]),
        Request::GetSecretForStorage { storage_id } => {
            Response::SecretForStorage(SecretForStorage {
                storage_id,
                secret_id: "xyz".to_string(),
                storage_type: StorageType::S3,
                error: 0,
            })
        }
        Request::FetchResourceMetadata(MetadataRequest::Ids { resource_path, .. }) => {
            Response::Metadata(ResourceMetadata::File(FileMetadata {
                friendly_name: "file.txt".to_string(),
                resource_path,
                resource_size: 5,
            }))
        }
        Request::SubmitBatchTransfer(batch) => Response::TransferIds(
            (0..batch.endpoint_paths.len())
                .map(|idx| format!("t{idx}"))
                .collect(),
        ),
        Request::GetTransferState { .. } => Response::TransferState(TransferStateReply {
            state: TransferState::Completed,
            percentage: 1.0,
            description: None,
        }),
        Request::ListStorages => Response::SecretRegistered,
        _ => Response::Error {
            message: "not supported by the test backend".to_string(),
        },
    }
}

fn client_for(server: &TestServer) -> MftClient {
    MftClient::new(
        common::ServiceEndpoints::single(&server.addr),
        common::TimeoutConfig::default(),
    )
}

#[tokio::test]
async fn test_resolve_calls_round_trip() -> Result<()> {
    let server = start_server(backend, None).await?;
    let client = client_for(&server);
    let storages = client
        .search_storages(StorageSearch::ByName("s3test".to_string()))
        .await?;
    assert_eq!(storages.len(), 1);
    assert_eq!(storages[0].storage_id, "abc");
    let secret = client.get_secret_for_storage("abc").await?;
    assert_eq!(secret.secret_id, "xyz");
    assert_eq!(secret.error, 0);
    let none = client
        .search_storages(StorageSearch::ById("missing".to_string()))
        .await?;
    assert!(none.is_empty());
    client.close().await;
    Ok(())
}

#[tokio::test]
async fn test_batch_submission_round_trip() -> Result<()> {
    let server = start_server(backend, None).await?;
    let client = client_for(&server);
    let metadata = client
        .fetch_resource_metadata(MetadataRequest::Ids {
            storage_id: "abc".to_string(),
            secret_id: "xyz".to_string(),
            resource_path: "dir1/file.txt".to_string(),
        })
        .await?;
    assert!(matches!(
        metadata,
        ResourceMetadata::File(FileMetadata { resource_size: 5, .. })
    ));
    let ids = client
        .submit_batch_transfer(BatchTransferRequest {
            source_storage_id: "abc".to_string(),
            source_secret_id: "xyz".to_string(),
            destination_storage_id: "def".to_string(),
            destination_secret_id: "uvw".to_string(),
            endpoint_paths: vec![
                EndpointPaths {
                    source_path: "a.txt".to_string(),
                    destination_path: "out/a.txt".to_string(),
                },
                EndpointPaths {
                    source_path: "sub/b.txt".to_string(),
                    destination_path: "out/sub/b.txt".to_string(),
                },
            ],
            optimize_transfer_path: false,
        })
        .await?;
    assert_eq!(ids, vec!["t0".to_string(), "t1".to_string()]);
    let state = client.get_transfer_state("t0").await?;
    assert_eq!(state.state, TransferState::Completed);
    Ok(())
}

#[tokio::test]
async fn test_connection_is_reused_across_calls() -> Result<()> {
    let server = start_server(backend, None).await?;
    let client = client_for(&server);
    for _ in 0..5 {
        client.get_transfer_state("t0").await?;
    }
    assert_eq!(server.accepted.load(Ordering::SeqCst), 1);
    assert_eq!(client.pool().open_connections().await, 1);
    client.close().await;
    assert_eq!(client.pool().open_connections().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_error_reply_is_a_remote_error() -> Result<()> {
    let server = start_server(backend, None).await?;
    let client = client_for(&server);
    let error = client.cancel_transfer("t0").await.unwrap_err();
    assert!(matches!(error, RpcError::Remote { .. }), "got {error:?}");
    assert!(!error.is_transport());
    // the connection is still healthy after an error reply
    client.get_transfer_state("t0").await?;
    assert_eq!(server.accepted.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_mismatched_reply_is_reported() -> Result<()> {
    let server = start_server(backend, None).await?;
    let client = client_for(&server);
    let error = client.list_storages().await.unwrap_err();
    assert!(
        matches!(
            error,
            RpcError::UnexpectedResponse {
                request: "ListStorages",
                got: "SecretRegistered"
            }
        ),
        "got {error:?}"
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server() -> Result<()> {
    // grab a free port and release it so nothing listens there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    drop(listener);
    let client = MftClient::new(
        common::ServiceEndpoints::single(&addr),
        common::TimeoutConfig::default(),
    );
    let error = client.list_storages().await.unwrap_err();
    assert!(matches!(error, RpcError::Unreachable { .. }), "got {error:?}");
    assert!(error.to_string().contains("make sure the MFT server is running"));
    assert_eq!(client.pool().open_connections().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_broken_connection_is_replaced() -> Result<()> {
    let server = start_server(backend, Some(1)).await?;
    let client = client_for(&server);
    client.get_transfer_state("t0").await?;
    // the server hung up after the first reply
    let error = client.get_transfer_state("t0").await.unwrap_err();
    assert!(error.is_transport(), "got {error:?}");
    assert_eq!(client.pool().open_connections().await, 0);
    client.get_transfer_state("t0").await?;
    assert_eq!(server.accepted.load(Ordering::SeqCst), 2);
    Ok(())
}
