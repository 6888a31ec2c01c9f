//! Remote access to the MFT backend services
//!
//! The backend owns credentials, resource resolution, scheduling and data movement; this
//! crate only knows how to ask it things:
//!
//! - [`protocol`]: request and reply messages, including the metadata union and transfer states
//! - [`streams`]: length-delimited framing of bincode messages over TCP
//! - [`pool`]: reusable connections keyed by `host:port`
//! - [`service`]: the [`MftService`] trait and its network implementation [`MftClient`]
//!
//! # Example
//!
//! ```no_run
//! use remote::{MftClient, MftService};
//!
//! # async fn example() -> Result<(), remote::RpcError> {
//! let client = MftClient::new(Default::default(), Default::default());
//! for storage in client.list_storages().await? {
//!     println!("{} ({})", storage.storage_name, storage.storage_id);
//! }
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod pool;
pub mod protocol;
pub mod service;
pub mod streams;

pub use error::RpcError;
pub use pool::ConnectionPool;
pub use service::MftClient;
pub use service::MftService;
