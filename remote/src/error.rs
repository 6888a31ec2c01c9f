/// Errors raised while talking to the MFT backend.
///
/// Anything that is not [`RpcError::Remote`] means the request never got a proper answer, most
/// often because the backend server is not running.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error(
        "MFT server at {addr} is unreachable: {source}. Please make sure the MFT server is running"
    )]
    Unreachable {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("MFT server at {addr} did not answer within {after:?}")]
    Timeout {
        addr: String,
        after: std::time::Duration,
    },
    #[error("MFT server at {addr} closed the connection")]
    ConnectionClosed { addr: String },
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode or decode a message: {0}")]
    Codec(#[from] bincode::Error),
    #[error("MFT server returned an error: {message}")]
    Remote { message: String },
    #[error("unexpected reply to {request}: {got}")]
    UnexpectedResponse {
        request: &'static str,
        got: &'static str,
    },
    #[error("MFT server returned {returned} transfer ids for {submitted} submitted files")]
    TransferCountMismatch { submitted: usize, returned: usize },
}

impl RpcError {
    /// True when the backend could not be reached at all
    pub fn is_transport(&self) -> bool {
        !matches!(
            self,
            RpcError::Remote { .. }
                | RpcError::UnexpectedResponse { .. }
                | RpcError::TransferCountMismatch { .. }
        )
    }
}
