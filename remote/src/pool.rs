use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;

use crate::error::RpcError;
use crate::protocol::{Request, Response};
use crate::streams::Connection;

type SharedConnection = Arc<tokio::sync::Mutex<Connection>>;

/// Reusable connections to backend services, keyed by `host:port`.
///
/// Connections are opened lazily on first use and stay open until [`ConnectionPool::close`] is
/// called or a request on them fails, in which case the broken connection is dropped and the
/// next request opens a fresh one. The pool is owned by its client; nothing is shared between
/// pools.
#[derive(Debug)]
pub struct ConnectionPool {
    timeouts: common::TimeoutConfig,
    connections: tokio::sync::Mutex<HashMap<String, SharedConnection>>,
}

impl ConnectionPool {
    pub fn new(timeouts: common::TimeoutConfig) -> Self {
        Self {
            timeouts,
            connections: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    async fn connect(&self, addr: &str) -> Result<Connection, RpcError> {
        tracing::debug!("connecting to {addr}");
        let stream = match tokio::time::timeout(
            self.timeouts.connect_timeout,
            tokio::net::TcpStream::connect(addr),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(RpcError::Unreachable {
                    addr: addr.to_string(),
                    source,
                });
            }
            Err(_) => {
                return Err(RpcError::Timeout {
                    addr: addr.to_string(),
                    after: self.timeouts.connect_timeout,
                });
            }
        };
        stream.set_nodelay(true)?;
        Ok(Connection::new(stream))
    }

    async fn connection(&self, addr: &str) -> Result<SharedConnection, RpcError> {
        let mut connections = self.connections.lock().await;
        if let Some(connection) = connections.get(addr) {
            return Ok(connection.clone());
        }
        let connection = Arc::new(tokio::sync::Mutex::new(self.connect(addr).await?));
        connections.insert(addr.to_string(), connection.clone());
        Ok(connection)
    }

    async fn evict(&self, addr: &str) {
        if self.connections.lock().await.remove(addr).is_some() {
            tracing::debug!("dropped connection to {addr}");
        }
    }

    /// Sends `request` to the service at `addr` and waits for its reply.
    #[instrument(level = "debug", skip(self, request), fields(request = request.name()))]
    pub async fn call(&self, addr: &str, request: &Request) -> Result<Response, RpcError> {
        let connection = self.connection(addr).await?;
        let mut connection = connection.lock().await;
        let exchange = async {
            connection.send_mut().send_message(request).await?;
            connection.recv_mut().recv_object::<Response>().await
        };
        let result = match tokio::time::timeout(self.timeouts.request_timeout, exchange).await {
            Ok(Ok(Some(response))) => return Ok(response),
            Ok(Ok(None)) => Err(RpcError::ConnectionClosed {
                addr: addr.to_string(),
            }),
            Ok(Err(error)) => Err(error),
            Err(_) => Err(RpcError::Timeout {
                addr: addr.to_string(),
                after: self.timeouts.request_timeout,
            }),
        };
        // the stream may hold a half-read reply, never reuse it
        drop(connection);
        self.evict(addr).await;
        result
    }

    /// Number of connections currently held open
    pub async fn open_connections(&self) -> usize {
        self.connections.lock().await.len()
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        let connections: Vec<(String, SharedConnection)> =
            self.connections.lock().await.drain().collect();
        for (addr, connection) in connections {
            if let Err(error) = connection.lock().await.close().await {
                tracing::debug!("failed closing connection to {addr}: {error}");
            }
        }
    }
}
