use futures::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::error::RpcError;

fn frame_codec() -> tokio_util::codec::LengthDelimitedCodec {
    tokio_util::codec::LengthDelimitedCodec::new()
}

/// Writing half of a service connection; each message is one bincode frame.
///
/// Defaults to a TCP write half, tests plug in an in-memory duplex.
#[derive(Debug)]
pub struct SendStream<W = OwnedWriteHalf> {
    framed: tokio_util::codec::FramedWrite<W, tokio_util::codec::LengthDelimitedCodec>,
}

impl<W: AsyncWrite + Unpin> SendStream<W> {
    pub fn new(writer: W) -> Self {
        Self {
            framed: tokio_util::codec::FramedWrite::new(writer, frame_codec()),
        }
    }

    /// Serializes `obj` into a single frame and flushes it.
    pub async fn send_message<T: serde::Serialize>(&mut self, obj: &T) -> Result<(), RpcError> {
        let bytes = bincode::serialize(obj)?;
        self.framed.send(bytes::Bytes::from(bytes)).await?;
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), RpcError> {
        SinkExt::<bytes::Bytes>::close(&mut self.framed).await?;
        Ok(())
    }
}

/// Reading half of a service connection, yielding one decoded message per frame
#[derive(Debug)]
pub struct RecvStream<R = OwnedReadHalf> {
    framed: tokio_util::codec::FramedRead<R, tokio_util::codec::LengthDelimitedCodec>,
}

impl<R: AsyncRead + Unpin> RecvStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            framed: tokio_util::codec::FramedRead::new(reader, frame_codec()),
        }
    }

    /// Next message, or `None` once the peer closed its side.
    pub async fn recv_object<T: serde::de::DeserializeOwned>(
        &mut self,
    ) -> Result<Option<T>, RpcError> {
        match futures::StreamExt::next(&mut self.framed).await {
            Some(frame) => Ok(Some(bincode::deserialize(&frame?)?)),
            None => Ok(None),
        }
    }
}

/// Bidirectional framed connection to one service
#[derive(Debug)]
pub struct Connection {
    send: SendStream,
    recv: RecvStream,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            send: SendStream::new(write_half),
            recv: RecvStream::new(read_half),
        }
    }

    pub fn send_mut(&mut self) -> &mut SendStream {
        &mut self.send
    }

    pub fn recv_mut(&mut self) -> &mut RecvStream {
        &mut self.recv
    }

    pub async fn close(&mut self) -> Result<(), RpcError> {
        self.send.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_round_trip_over_duplex() -> Result<(), RpcError> {
        let (client, server) = tokio::io::duplex(1024);
        let mut send = SendStream::new(client);
        let mut recv = RecvStream::new(server);
        send.send_message(&("files", 2u32)).await?;
        send.send_message(&vec!["a.txt".to_string(), "sub/b.txt".to_string()])
            .await?;
        send.close().await?;
        let first: Option<(String, u32)> = recv.recv_object().await?;
        assert_eq!(first, Some(("files".to_string(), 2)));
        let second: Option<Vec<String>> = recv.recv_object().await?;
        assert_eq!(
            second,
            Some(vec!["a.txt".to_string(), "sub/b.txt".to_string()])
        );
        let eof: Option<Vec<String>> = recv.recv_object().await?;
        assert!(eof.is_none());
        Ok(())
    }
}
