use async_std::net::{TcpStream, ToSocketAddrs};

use crate::endpoint::Endpoint;
use crate::registry::{ItemKind, Registry};
use crate::timeouts::Timeouts;

#[derive(Clone, Debug)]
pub struct ProbeResult {
    pub host: String,
    pub port: String,
    pub up: bool,
}

/// Attempts a TCP connect to every `ExternalRef` in `registry`, with a
/// short timeout, per spec.md §4.7. Success means `connect` completed
/// within the deadline — the async runtime's own connect future only
/// resolves `Ok` once the three-way handshake finishes, which is the
/// async equivalent of the C-level "non-blocking connect then check
/// `SO_ERROR == 0`" spec.md describes. External directories are never
/// descended, only reachability-tested (spec.md §1 Non-goals).
///
/// Runs sequentially rather than with the bounded worker pool spec.md §5
/// allows — see SPEC_FULL.md §12 for why.
pub async fn probe_externals(registry: &Registry, primary: &Endpoint, timeouts: &Timeouts) -> Vec<ProbeResult> {
    let mut results = Vec::new();
    for item in registry.iter_kind(ItemKind::ExternalRef) {
        let Some((host, port)) = item.record.split_once('\t') else {
            continue;
        };
        if primary.is_same_server(host, port.parse().unwrap_or(0)) {
            continue;
        }
        let up = probe_one(host, port, timeouts).await;
        results.push(ProbeResult {
            host: host.to_string(),
            port: port.to_string(),
            up,
        });
    }
    results
}

async fn probe_one(host: &str, port: &str, timeouts: &Timeouts) -> bool {
    let Ok(port) = port.parse::<u16>() else {
        return false;
    };
    let Ok(mut addrs) = (host, port).to_socket_addrs().await else {
        return false;
    };
    let Some(addr) = addrs.next() else {
        return false;
    };

    matches!(
        async_std::future::timeout(timeouts.probe, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}
