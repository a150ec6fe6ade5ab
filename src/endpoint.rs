use std::net::{SocketAddr, SocketAddrV4};

use async_std::net::ToSocketAddrs;
use thiserror::Error;

/// An immutable (host, port, resolved address) triple, per spec.md §3.
/// Built once for the primary endpoint named on the command line; every
/// request against the primary server reuses `addr` rather than
/// re-resolving the hostname.
#[derive(Clone, Debug)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub addr: SocketAddrV4,
}

#[derive(Debug, Error)]
pub enum DnsError {
    #[error("could not resolve {host}:{port}: {source}")]
    Lookup {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("{host}:{port} did not resolve to an IPv4 address")]
    NoIpv4 { host: String, port: u16 },
}

impl Endpoint {
    /// Resolves `host` to a single IPv4 address, per spec.md §1's assumed
    /// resolver contract ("maps a hostname to one IPv4 address").
    pub async fn resolve(host: &str, port: u16) -> Result<Endpoint, DnsError> {
        let mut addrs = (host, port)
            .to_socket_addrs()
            .await
            .map_err(|source| DnsError::Lookup {
                host: host.to_string(),
                port,
                source,
            })?;

        let addr = addrs
            .find_map(|a| match a {
                SocketAddr::V4(v4) => Some(v4),
                SocketAddr::V6(_) => None,
            })
            .ok_or_else(|| DnsError::NoIpv4 {
                host: host.to_string(),
                port,
            })?;

        Ok(Endpoint {
            host: host.to_string(),
            port,
            addr,
        })
    }

    /// True if `(host, port)` names the same server as this endpoint,
    /// used by the reachability prober (spec.md §4.7) to short-circuit
    /// self-references without an extra DNS lookup.
    pub fn is_same_server(&self, host: &str, port: u16) -> bool {
        self.port == port && self.host.eq_ignore_ascii_case(host)
    }
}
