//! End-to-end copy scenarios against an in-memory backend

use mft_tools_cli::Error;
use mft_tools_cli::copy::copy;
use mft_tools_cli::prompt::{Answer, AssumeYes, ScriptedPrompter};
use mft_tools_cli::testutils::{MockService, state_reply};
use mft_tools_cli::transfer::PollSettings;
use remote::protocol::{
    DirectoryMetadata, EndpointPaths, FileMetadata, MetadataError, ResourceMetadata, StorageType,
    TransferState, TransferStateReply,
};
use tokio_util::sync::CancellationToken;

fn file(name: &str, path: &str, size: u64) -> FileMetadata {
    FileMetadata {
        friendly_name: name.to_string(),
        resource_path: path.to_string(),
        resource_size: size,
    }
}

/// `s3test` (abc/xyz) holding `dir1/` and `file.txt`, and an empty `dest` (def/uvw)
fn backend() -> MockService {
    MockService::new()
        .with_storage("abc", "s3test", StorageType::S3, "xyz")
        .with_storage("def", "dest", StorageType::Gcs, "uvw")
        .with_metadata(
            "abc",
            "dir1/",
            ResourceMetadata::Directory(DirectoryMetadata {
                friendly_name: "dir1".to_string(),
                resource_path: "dir1/".to_string(),
                files: vec![file("a.txt", "dir1/a.txt", 10)],
                directories: vec![DirectoryMetadata {
                    friendly_name: "sub".to_string(),
                    resource_path: "dir1/sub/".to_string(),
                    files: vec![file("b.txt", "dir1/sub/b.txt", 20)],
                    directories: vec![],
                }],
            }),
        )
        .with_metadata(
            "abc",
            "file.txt",
            ResourceMetadata::File(file("file.txt", "file.txt", 5)),
        )
        .with_metadata(
            "abc",
            "empty/",
            ResourceMetadata::Directory(DirectoryMetadata::default()),
        )
}

fn unit(source: &str, destination: &str) -> EndpointPaths {
    EndpointPaths {
        source_path: source.to_string(),
        destination_path: destination.to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_directory_copy() {
    let service = backend();
    let prompter = ScriptedPrompter::new([Answer::Confirm(true)]);
    let summary = copy(
        &service,
        &prompter,
        "s3test/dir1/",
        "dest/out/",
        &PollSettings::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total_volume, 30);
    assert_eq!(summary.to_string(), "Processed 2 files. Completed 2, Failed 0.");

    let submitted = service.submitted();
    assert_eq!(submitted.len(), 1);
    let batch = &submitted[0];
    assert_eq!(batch.source_storage_id, "abc");
    assert_eq!(batch.source_secret_id, "xyz");
    assert_eq!(batch.destination_storage_id, "def");
    assert_eq!(batch.destination_secret_id, "uvw");
    assert_eq!(
        batch.endpoint_paths,
        vec![
            unit("dir1/sub/b.txt", "out/sub/b.txt"),
            unit("dir1/a.txt", "out/a.txt"),
        ]
    );
    let asked = prompter.asked();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].contains("Total number of 2 files"), "{}", asked[0]);
    assert!(asked[0].contains("30 bytes"), "{}", asked[0]);
}

#[tokio::test(start_paused = true)]
async fn test_single_file_copy() {
    let service = backend();
    let summary = copy(
        &service,
        &AssumeYes,
        "s3test/file.txt",
        "dest/",
        &PollSettings::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(summary.to_string(), "Processed 1 files. Completed 1, Failed 0.");
    assert_eq!(summary.total_volume, 5);
    let submitted = service.submitted();
    assert_eq!(submitted[0].endpoint_paths, vec![unit("file.txt", "file.txt")]);
}

#[tokio::test]
async fn test_destination_is_resolved_before_source_is_inspected() {
    let service = backend();
    let error = copy(
        &service,
        &AssumeYes,
        "s3test/dir1/",
        "nowhere/out/",
        &PollSettings::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(&error, Error::NotFound(name) if name == "nowhere"), "got {error:?}");
    assert!(!service.calls().contains(&"FetchResourceMetadata"));
    assert!(service.submitted().is_empty());
}

#[tokio::test]
async fn test_unknown_source_storage() {
    let service = backend();
    let error = copy(
        &service,
        &AssumeYes,
        "missing/file.txt",
        "dest/",
        &PollSettings::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(error, Error::NotFound(_)), "got {error:?}");
    assert!(error.to_string().contains("mft storage add"));
}

#[tokio::test]
async fn test_ambiguous_storage_name() {
    let service = backend().with_storage("ghi", "dest", StorageType::Azure, "rst");
    let error = copy(
        &service,
        &AssumeYes,
        "s3test/file.txt",
        "dest/",
        &PollSettings::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(
        matches!(&error, Error::AmbiguousName { name, count: 2 } if name == "dest"),
        "got {error:?}"
    );
    assert!(service.submitted().is_empty());
}

#[tokio::test]
async fn test_directory_without_trailing_separator() {
    let service = backend();
    let prompter = ScriptedPrompter::new([]);
    let error = copy(
        &service,
        &prompter,
        "s3test/dir1/",
        "dest/out",
        &PollSettings::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(error, Error::InvalidDestination(_)), "got {error:?}");
    assert!(error.to_string().contains("should end with /"));
    assert!(prompter.asked().is_empty());
    assert!(service.submitted().is_empty());
}

#[tokio::test]
async fn test_missing_source_path() {
    let service = backend();
    let error = copy(
        &service,
        &AssumeYes,
        "s3test/nope.txt",
        "dest/",
        &PollSettings::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(error, Error::SourceResolution(_)), "got {error:?}");
    assert!(service.submitted().is_empty());
}

#[tokio::test]
async fn test_source_error_metadata_is_reported() {
    let service = backend().with_metadata(
        "abc",
        "locked/",
        ResourceMetadata::Error(MetadataError {
            code: 403,
            description: "access denied".to_string(),
        }),
    );
    let error = copy(
        &service,
        &AssumeYes,
        "s3test/locked/",
        "dest/",
        &PollSettings::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(error.to_string().contains("access denied (code 403)"), "got {error}");
}

#[tokio::test]
async fn test_declining_submits_nothing() {
    let service = backend();
    let prompter = ScriptedPrompter::new([Answer::Confirm(false)]);
    let error = copy(
        &service,
        &prompter,
        "s3test/dir1/",
        "dest/out/",
        &PollSettings::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(error, Error::Declined), "got {error:?}");
    assert!(!service.calls().contains(&"SubmitBatchTransfer"));
}

#[tokio::test]
async fn test_empty_directory() {
    let service = backend();
    let summary = copy(
        &service,
        &ScriptedPrompter::new([]),
        "s3test/empty/",
        "dest/out/",
        &PollSettings::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(summary.to_string(), "Processed 0 files. Completed 0, Failed 0.");
    assert!(service.submitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_counted() {
    let failed = TransferStateReply {
        state: TransferState::Failed,
        percentage: 0.0,
        description: Some("permission denied on destination".to_string()),
    };
    let service = backend()
        .with_transfer_script(
            "dir1/sub/b.txt",
            vec![state_reply(TransferState::InProgress), failed],
        )
        .with_transfer_script(
            "dir1/a.txt",
            vec![
                state_reply(TransferState::Pending),
                state_reply(TransferState::InProgress),
                state_reply(TransferState::InProgress),
                state_reply(TransferState::Completed),
            ],
        );
    let start = tokio::time::Instant::now();
    let summary = copy(
        &service,
        &AssumeYes,
        "s3test/dir1/",
        "dest/out/",
        &PollSettings::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(summary.to_string(), "Processed 2 files. Completed 1, Failed 1.");
    assert!(summary.completed + summary.failed <= summary.total);
    // four passes, one second apart
    assert_eq!(start.elapsed(), std::time::Duration::from_secs(3));
    assert_eq!(service.polls("transfer-0"), 4);
    assert_eq!(service.polls("transfer-1"), 4);
}
