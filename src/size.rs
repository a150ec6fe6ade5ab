use crate::endpoint::Endpoint;
use crate::registry::{ItemKind, Registry};
use crate::timeouts::Timeouts;
use crate::transport::{Session, TransportError};

/// Hard cap on file transfer size, per spec.md §4.5.
pub const FILE_LIMIT: usize = 65536;

const SCRATCH: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeterResult {
    Size(usize),
    TooLarge,
    TimedOut,
}

/// Opens a fresh session, sends `selector`, and drains the response until
/// EOF or `FILE_LIMIT`, counting bytes without buffering content (spec.md
/// §4.5: "never buffers content beyond a 4 KiB scratch"). Pushes a
/// `TooLarge` or `Timeout` entry into `registry` on those outcomes, since
/// spec.md §4.5 treats that push as part of the meter's own contract.
pub async fn measure(
    endpoint: &Endpoint,
    selector: &str,
    timeouts: &Timeouts,
    registry: &mut Registry,
) -> MeterResult {
    let mut session = match Session::open(endpoint, timeouts.connect).await {
        Ok(s) => s,
        Err(_) => {
            registry.insert(ItemKind::Timeout, selector, None);
            return MeterResult::TimedOut;
        }
    };
    if session.send(selector).await.is_err() {
        registry.insert(ItemKind::Timeout, selector, None);
        return MeterResult::TimedOut;
    }

    let mut total = 0usize;
    let mut buf = [0u8; SCRATCH];
    let mut first = true;

    loop {
        let deadline = if first { timeouts.per_recv } else { timeouts.inter_chunk };
        let n = match session.recv(&mut buf, deadline).await {
            Ok(n) => n,
            Err(TransportError::ReadTimeout(_)) => {
                registry.insert(ItemKind::Timeout, selector, None);
                return MeterResult::TimedOut;
            }
            Err(_) => {
                registry.insert(ItemKind::Timeout, selector, None);
                return MeterResult::TimedOut;
            }
        };
        first = false;
        if n == 0 {
            break;
        }
        total += n;
        if total >= FILE_LIMIT {
            registry.insert(ItemKind::TooLarge, selector, None);
            return MeterResult::TooLarge;
        }
    }

    MeterResult::Size(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;
    use async_std::io::{ReadExt, WriteExt};
    use async_std::net::TcpListener;
    use async_std::task;

    async fn serve_once(listener: TcpListener, body: Vec<u8>) {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream.write_all(&body).await;
            let _ = stream.flush().await;
        }
    }

    async fn endpoint_for(listener: &TcpListener) -> Endpoint {
        let addr = listener.local_addr().unwrap();
        Endpoint::resolve("127.0.0.1", addr.port()).await.unwrap()
    }

    #[async_std::test]
    async fn measures_small_file() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = endpoint_for(&listener).await;
        task::spawn(serve_once(listener, b"hi\n".to_vec()));

        let mut registry = Registry::new();
        let timeouts = Timeouts::default();
        let result = measure(&endpoint, "/hello", &timeouts, &mut registry).await;
        assert_eq!(result, MeterResult::Size(3));
        assert_eq!(registry.len(), 0);
    }

    #[async_std::test]
    async fn flags_oversize_file() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = endpoint_for(&listener).await;
        let body = vec![b'x'; FILE_LIMIT];
        task::spawn(serve_once(listener, body));

        let mut registry = Registry::new();
        let timeouts = Timeouts::default();
        let result = measure(&endpoint, "/big", &timeouts, &mut registry).await;
        assert_eq!(result, MeterResult::TooLarge);
        assert_eq!(registry.iter_kind(ItemKind::TooLarge).count(), 1);
    }

    #[async_std::test]
    async fn boundary_file_limit_minus_one_is_exact() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = endpoint_for(&listener).await;
        let body = vec![b'x'; FILE_LIMIT - 1];
        task::spawn(serve_once(listener, body));

        let mut registry = Registry::new();
        let timeouts = Timeouts::default();
        let result = measure(&endpoint, "/almost-big", &timeouts, &mut registry).await;
        assert_eq!(result, MeterResult::Size(FILE_LIMIT - 1));
    }
}
