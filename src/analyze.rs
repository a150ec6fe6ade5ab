use std::collections::HashMap;

use crate::content;
use crate::endpoint::Endpoint;
use crate::probe::{self, ProbeResult};
use crate::registry::{Item, ItemKind, Registry};
use crate::size::{self, MeterResult};
use crate::timeouts::Timeouts;

/// The end-of-run summary spec.md §4.8 asks for. `counts` covers every
/// kind that can appear straight out of a crawl (not `Timeout`/`TooLarge`,
/// which only exist as issues).
pub struct Analysis {
    pub counts: HashMap<ItemKind, usize>,
    pub min_text: Option<usize>,
    pub max_text: Option<usize>,
    pub min_binary: Option<usize>,
    pub max_binary: Option<usize>,
    pub smallest_text_selector: Option<String>,
    pub smallest_text_content: Option<Vec<u8>>,
    pub external: Vec<ProbeResult>,
    pub issues: Vec<Item>,
    /// Directory/Text/Binary items with their menu display name, in
    /// registry (discovery) order — SPEC_FULL.md §11's supplemented
    /// display-name retention, surfaced for the report sink.
    pub entries: Vec<Item>,
}

const REPORTED_KINDS: [ItemKind; 5] = [
    ItemKind::Directory,
    ItemKind::Text,
    ItemKind::Binary,
    ItemKind::InvalidRef,
    ItemKind::ExternalRef,
];

/// Walks the completed registry once (spec.md §4.8): counts items per
/// kind, meters every Text/Binary file, fetches and returns the smallest
/// text file's content, probes every external reference, and collects the
/// issues list. Size metering reopens sessions against `endpoint` rather
/// than reusing the crawl's sessions, since spec.md §4.1 makes every
/// Gopher request a fresh one-shot connection.
pub async fn analyze(endpoint: &Endpoint, timeouts: &Timeouts, registry: &mut Registry) -> Analysis {
    let counts = REPORTED_KINDS
        .iter()
        .map(|&kind| (kind, registry.iter_kind(kind).count()))
        .collect();

    let text_selectors: Vec<String> = registry.iter_kind(ItemKind::Text).map(|i| i.record.clone()).collect();
    let binary_selectors: Vec<String> = registry.iter_kind(ItemKind::Binary).map(|i| i.record.clone()).collect();

    let mut min_text = None;
    let mut max_text = None;
    let mut smallest_text: Option<(String, usize)> = None;
    for selector in &text_selectors {
        if let MeterResult::Size(n) = size::measure(endpoint, selector, timeouts, registry).await {
            min_text = Some(min_text.map_or(n, |m: usize| m.min(n)));
            max_text = Some(max_text.map_or(n, |m: usize| m.max(n)));
            if smallest_text.as_ref().map_or(true, |(_, best)| n < *best) {
                smallest_text = Some((selector.clone(), n));
            }
        }
    }

    let mut min_binary = None;
    let mut max_binary = None;
    for selector in &binary_selectors {
        if let MeterResult::Size(n) = size::measure(endpoint, selector, timeouts, registry).await {
            min_binary = Some(min_binary.map_or(n, |m: usize| m.min(n)));
            max_binary = Some(max_binary.map_or(n, |m: usize| m.max(n)));
        }
    }

    let (smallest_text_selector, smallest_text_content) = match smallest_text {
        Some((selector, _)) => {
            let content = content::fetch_content(endpoint, &selector, timeouts).await.ok();
            (Some(selector), content)
        }
        None => (None, None),
    };

    let external = probe::probe_externals(registry, endpoint, timeouts).await;

    let issues = registry
        .iter()
        .filter(|i| matches!(i.kind, ItemKind::InvalidRef | ItemKind::Timeout | ItemKind::TooLarge))
        .cloned()
        .collect();

    let entries = registry
        .iter()
        .filter(|i| matches!(i.kind, ItemKind::Directory | ItemKind::Text | ItemKind::Binary))
        .cloned()
        .collect();

    Analysis {
        counts,
        min_text,
        max_text,
        min_binary,
        max_binary,
        smallest_text_selector,
        smallest_text_content,
        external,
        entries,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;
    use async_std::io::{ReadExt, WriteExt};
    use async_std::net::{TcpListener, TcpStream};
    use async_std::task;

    async fn respond(mut stream: TcpStream, body: &[u8]) {
        let mut buf = [0u8; 256];
        let _ = stream.read(&mut buf).await;
        let _ = stream.write_all(body).await;
        let _ = stream.flush().await;
    }

    #[async_std::test]
    async fn empty_registry_yields_no_smallest_text() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let endpoint = Endpoint::resolve("127.0.0.1", addr.port()).await.unwrap();
        drop(listener);

        let mut registry = Registry::new();
        let analysis = analyze(&endpoint, &Timeouts::default(), &mut registry).await;

        assert_eq!(analysis.counts[&ItemKind::Text], 0);
        assert!(analysis.smallest_text_selector.is_none());
        assert!(analysis.issues.is_empty());
    }

    #[async_std::test]
    async fn finds_min_max_and_smallest_text_content() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let endpoint = Endpoint::resolve("127.0.0.1", addr.port()).await.unwrap();

        task::spawn(async move {
            // metering /small, then /big, then the analyzer reopens /small
            // a third time to fetch its content for the report.
            let (stream, _) = listener.accept().await.unwrap();
            respond(stream, b"hi\n").await;
            let (stream, _) = listener.accept().await.unwrap();
            respond(stream, b"a whole lot more bytes than the other one").await;
            let (stream, _) = listener.accept().await.unwrap();
            respond(stream, b"hi\n").await;
        });

        let mut registry = Registry::new();
        registry.insert(ItemKind::Text, "/small", None);
        registry.insert(ItemKind::Text, "/big", None);

        let analysis = analyze(&endpoint, &Timeouts::default(), &mut registry).await;

        assert_eq!(analysis.min_text, Some(3));
        assert_eq!(analysis.smallest_text_selector.as_deref(), Some("/small"));
        assert_eq!(analysis.smallest_text_content.as_deref(), Some(&b"hi\n"[..]));
    }
}
