use std::net::SocketAddrV4;
use std::time::Duration;

use async_std::io::{ReadExt, WriteExt};
use async_std::net::TcpStream;
use thiserror::Error;

use crate::endpoint::Endpoint;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect to {0} failed: {1}")]
    ConnectFailure(SocketAddrV4, std::io::Error),
    #[error("connect to {0} timed out")]
    ConnectTimeout(SocketAddrV4),
    #[error("send to {0} failed: {1}")]
    SendFailure(SocketAddrV4, std::io::Error),
    #[error("read from {0} timed out")]
    ReadTimeout(SocketAddrV4),
    #[error("read from {0} failed: {1}")]
    ReadFailure(SocketAddrV4, std::io::Error),
}

/// One Gopher request's connection. Gopher is one-shot per request (spec.md
/// §4.1), so a `Session` wraps exactly one `TcpStream` and is dropped after
/// a single send/recv cycle. `Drop` gives the "close on every exit path"
/// discipline spec.md §4.1/§9 asks for without an explicit close() at the
/// end of every call site.
pub struct Session {
    addr: SocketAddrV4,
    stream: TcpStream,
}

impl Session {
    pub async fn open(endpoint: &Endpoint, connect_timeout: Duration) -> Result<Session, TransportError> {
        let addr = endpoint.addr;
        let connect = TcpStream::connect(addr);
        let stream = match async_std::future::timeout(connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(TransportError::ConnectFailure(addr, e)),
            Err(_) => return Err(TransportError::ConnectTimeout(addr)),
        };
        Ok(Session { addr, stream })
    }

    /// Sends `selector || CRLF` as a single write, per spec.md §4.1.
    pub async fn send(&mut self, selector: &str) -> Result<(), TransportError> {
        let mut req = Vec::with_capacity(selector.len() + 2);
        req.extend_from_slice(selector.as_bytes());
        req.extend_from_slice(b"\r\n");
        self.stream
            .write_all(&req)
            .await
            .map_err(|e| TransportError::SendFailure(self.addr, e))
    }

    /// Reads into `buf`, applying `timeout` as the deadline. Returns 0 on
    /// clean close, per spec.md §4.1.
    pub async fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        match async_std::future::timeout(timeout, self.stream.read(buf)).await {
            Ok(Ok(n)) => Ok(n),
            Ok(Err(e)) => Err(TransportError::ReadFailure(self.addr, e)),
            Err(_) => Err(TransportError::ReadTimeout(self.addr)),
        }
    }
}
