//! Command-line client for a managed file transfer (MFT) backend
//!
//! The backend registers storages (S3 buckets, GCS buckets, Azure containers, SCP hosts, ...)
//! together with their credentials and moves data between them. This crate drives it:
//!
//! - [`path`]: `<storage>/<relative-path>` strings as typed by users
//! - [`resolve`]: storage name or id to the `(storage id, secret id)` pair the backend needs
//! - [`metadata`]: what lives at a path, and the `ls` listing built from it
//! - [`flatten`]: a directory tree to the ordered list of files it contains
//! - [`request`]: source metadata plus destination to a batch of per-file transfer units
//! - [`transfer`]: confirmation, batch submission and polling until every unit is done
//! - [`copy`]: the `cp` workflow tying the above together
//! - [`storage`]: interactive registration of new storages and the storage listing
//! - [`prompt`]: questions asked to the user, with terminal and scripted implementations
//!
//! # Copy semantics
//!
//! A directory source must be copied into a destination ending with `/`; every file keeps its
//! path relative to the source directory. A file copied into a destination ending with `/` (or
//! naming just a storage) keeps its name. Nothing is submitted before the user confirmed the
//! number of files and the total volume.
//!
//! # Example
//!
//! ```no_run
//! use mft_tools_cli::{copy::copy, prompt::ConsolePrompter, transfer::PollSettings};
//!
//! # async fn example() -> Result<(), mft_tools_cli::Error> {
//! let client = remote::MftClient::new(Default::default(), Default::default());
//! let cancel = tokio_util::sync::CancellationToken::new();
//! let summary = copy(
//!     &client,
//!     &ConsolePrompter,
//!     "s3test/dir1/",
//!     "dest/out/",
//!     &PollSettings::default(),
//!     &cancel,
//! )
//! .await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

pub mod copy;
pub mod error;
pub mod flatten;
pub mod metadata;
pub mod path;
pub mod prompt;
pub mod request;
pub mod resolve;
pub mod storage;
pub mod testutils;
pub mod transfer;

pub use error::Error;
pub use error::Result;
pub use transfer::Summary;
