use thiserror::Error;

use crate::classify::{classify, Classified};
use crate::clock::now_ts;
use crate::endpoint::{DnsError, Endpoint};
use crate::menu::{parse_line, read_lines};
use crate::registry::{ItemKind, Registry};
use crate::timeouts::Timeouts;
use crate::transport::{Session, TransportError};

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("DNS resolution failed: {0}")]
    Dns(#[from] DnsError),
    #[error("primary endpoint unreachable: {0}")]
    PrimaryUnreachable(#[from] TransportError),
}

/// Root-first, sequential BFS over every directory reachable from the
/// primary endpoint's root selector, per spec.md §4.6. Recursion
/// protection comes entirely from `Registry::insert`'s dedup: a directory
/// already present is never re-inserted, hence never re-descended, so
/// self-referential menus cannot loop (spec.md §8 property 3).
pub struct Crawler {
    endpoint: Endpoint,
    timeouts: Timeouts,
    registry: Registry,
}

impl Crawler {
    pub fn new(endpoint: Endpoint, timeouts: Timeouts) -> Self {
        Crawler {
            endpoint,
            timeouts,
            registry: Registry::new(),
        }
    }

    /// Runs the crawl to completion and hands back the populated registry.
    /// Fails only if the *root* fetch hits a hard transport failure
    /// (spec.md §7: `ConnectFailure` on the primary endpoint is fatal);
    /// every other request's hard failures are demoted to `Timeout`
    /// entries, per the decision recorded in SPEC_FULL.md §12.
    pub async fn run(mut self) -> Result<Registry, CrawlError> {
        log::info!("Request sent at {}: (root)", now_ts());
        self.fetch_and_ingest("", true).await?;

        let mut i = 0;
        while i < self.registry.len() {
            let descend = self
                .registry
                .get(i)
                .filter(|item| item.kind == ItemKind::Directory)
                .map(|item| item.record.clone());
            if let Some(selector) = descend {
                log::info!("Request sent at {}: {}", now_ts(), selector);
                // fatal_on_hard_failure is false here, so handle_failure never
                // constructs an Err; nothing to propagate.
                let _ = self.fetch_and_ingest(&selector, false).await;
            }
            i += 1;
        }

        Ok(self.registry)
    }

    async fn fetch_and_ingest(&mut self, request_selector: &str, fatal_on_hard_failure: bool) -> Result<(), CrawlError> {
        let mut session = match Session::open(&self.endpoint, self.timeouts.connect).await {
            Ok(s) => s,
            Err(e) => return self.handle_failure(request_selector, e, fatal_on_hard_failure),
        };
        if let Err(e) = session.send(request_selector).await {
            return self.handle_failure(request_selector, e, fatal_on_hard_failure);
        }
        let lines = match read_lines(&mut session, &self.timeouts).await {
            Ok(lines) => lines,
            Err(e) => return self.handle_failure(request_selector, e, fatal_on_hard_failure),
        };

        for line in lines {
            self.ingest_line(request_selector, &line);
        }
        Ok(())
    }

    fn handle_failure(
        &mut self,
        request_selector: &str,
        err: TransportError,
        fatal_on_hard_failure: bool,
    ) -> Result<(), CrawlError> {
        match err {
            // The initial-recv deadline firing is non-fatal even on the
            // primary endpoint (spec.md §7: "ReadTimeout (primary) ...
            // Record Timeout item, continue"). A *connect* deadline firing
            // is classified with ConnectFailure below, since spec.md §4.1
            // treats the connect timeout as part of that same failure.
            TransportError::ReadTimeout(_) => {
                log::warn!("timed out fetching {}", request_selector);
                self.registry.insert(ItemKind::Timeout, request_selector, None);
                Ok(())
            }
            hard if fatal_on_hard_failure => {
                log::error!("primary endpoint unreachable: {}", hard);
                Err(CrawlError::PrimaryUnreachable(hard))
            }
            hard => {
                log::warn!("demoting failed fetch of {} to timeout: {}", request_selector, hard);
                self.registry.insert(ItemKind::Timeout, request_selector, None);
                Ok(())
            }
        }
    }

    fn ingest_line(&mut self, request_selector: &str, raw_line: &str) {
        let Some(entry) = parse_line(raw_line) else {
            return;
        };
        log::debug!(
            "parsed line from {}: type={} display={:?} selector={} host={} port={}",
            request_selector,
            entry.item_type,
            entry.display,
            entry.selector,
            entry.host,
            entry.port
        );

        match classify(entry.item_type, &entry.selector) {
            Classified::Invalid => {
                self.registry.insert(ItemKind::InvalidRef, request_selector, None);
            }
            Classified::ExternalRef => {
                let record = format!("{}\t{}", entry.host, entry.port);
                self.registry.insert(ItemKind::ExternalRef, record, Some(entry.display));
            }
            Classified::Directory if entry.selector.starts_with('/') => {
                self.registry
                    .insert(ItemKind::Directory, entry.selector, Some(entry.display));
            }
            Classified::Text if entry.selector.starts_with('/') => {
                self.registry.insert(ItemKind::Text, entry.selector, Some(entry.display));
            }
            Classified::Binary if entry.selector.starts_with('/') => {
                self.registry.insert(ItemKind::Binary, entry.selector, Some(entry.display));
            }
            // Selector is neither external nor server-absolute: malformed
            // or relative, discarded per spec.md §4.2's edge policy.
            Classified::Directory | Classified::Text | Classified::Binary => {}
            Classified::Ignored => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_std::io::{ReadExt, WriteExt};
    use async_std::net::{TcpListener, TcpStream};
    use async_std::task;

    async fn respond(mut stream: TcpStream, body: &str) {
        let mut buf = [0u8; 1024];
        let _ = stream.read(&mut buf).await;
        let _ = stream.write_all(body.as_bytes()).await;
        let _ = stream.flush().await;
    }

    async fn endpoint_for(listener: &TcpListener) -> Endpoint {
        let addr = listener.local_addr().unwrap();
        Endpoint::resolve("127.0.0.1", addr.port()).await.unwrap()
    }

    #[async_std::test]
    async fn single_level_root_indexes_one_text_file() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = endpoint_for(&listener).await;

        task::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            respond(stream, "0hello\t/hello\tlocalhost\t70\r\n.\r\n").await;
        });

        let crawler = Crawler::new(endpoint, Timeouts::default());
        let registry = crawler.run().await.unwrap();

        assert_eq!(registry.iter_kind(ItemKind::Text).count(), 1);
        assert_eq!(registry.iter_kind(ItemKind::Directory).count(), 0);
    }

    #[async_std::test]
    async fn self_referential_menu_descends_once() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = endpoint_for(&listener).await;

        task::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                respond(stream, "1root\t/\tlocalhost\t70\r\n.\r\n").await;
            }
        });

        let crawler = Crawler::new(endpoint, Timeouts::default());
        let registry = crawler.run().await.unwrap();

        assert_eq!(registry.iter_kind(ItemKind::Directory).count(), 1);
    }

    #[async_std::test]
    async fn invalid_reference_is_recorded_once() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = endpoint_for(&listener).await;

        task::spawn(async move {
            // root lists /bad, then /bad answers with an error line
            let (stream, _) = listener.accept().await.unwrap();
            respond(stream, "1bad dir\t/bad\tlocalhost\t70\r\n.\r\n").await;
            let (stream, _) = listener.accept().await.unwrap();
            respond(stream, "3no such selector\t/bad\tlocalhost\t70\r\n.\r\n").await;
        });

        let crawler = Crawler::new(endpoint, Timeouts::default());
        let registry = crawler.run().await.unwrap();

        let invalid: Vec<_> = registry.iter_kind(ItemKind::InvalidRef).collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].record, "/bad");
    }
}
