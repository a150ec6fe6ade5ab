use std::io::Write;

use crate::analyze::Analysis;
use crate::endpoint::Endpoint;
use crate::registry::{Item, ItemKind};

/// Pure sink: formats an `Analysis` as the human-readable summary block
/// spec.md §6 describes and writes it to `out`. No crawl/analysis logic
/// lives here (spec.md §2, L9: "Pure sink; no logic.").
pub fn write_report(out: &mut impl Write, endpoint: &Endpoint, analysis: &Analysis) -> std::io::Result<()> {
    writeln!(out, "=== crawl70 report for {}:{} ===", endpoint.host, endpoint.port)?;
    writeln!(out)?;

    writeln!(out, "counts:")?;
    for kind in [
        ItemKind::Directory,
        ItemKind::Text,
        ItemKind::Binary,
        ItemKind::InvalidRef,
        ItemKind::ExternalRef,
    ] {
        writeln!(out, "  {:<20} {}", kind_label(kind), analysis.counts.get(&kind).copied().unwrap_or(0))?;
    }
    writeln!(out, "  {:<20} {}", "total", analysis.counts.values().sum::<usize>())?;
    writeln!(out)?;

    writeln!(out, "items, in discovery order:")?;
    if analysis.entries.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for entry in &analysis.entries {
        writeln!(out, "  {}", format_entry(entry))?;
    }
    writeln!(out)?;

    writeln!(out, "text file sizes:")?;
    writeln!(out, "  min: {}", optional_size(analysis.min_text))?;
    writeln!(out, "  max: {}", optional_size(analysis.max_text))?;
    writeln!(out, "binary file sizes:")?;
    writeln!(out, "  min: {}", optional_size(analysis.min_binary))?;
    writeln!(out, "  max: {}", optional_size(analysis.max_binary))?;
    writeln!(out)?;

    match (&analysis.smallest_text_selector, &analysis.smallest_text_content) {
        (Some(selector), Some(content)) => {
            writeln!(out, "smallest text file ({}):", selector)?;
            writeln!(out, "---")?;
            out.write_all(content)?;
            if !content.ends_with(b"\n") {
                writeln!(out)?;
            }
            writeln!(out, "---")?;
        }
        (Some(selector), None) => {
            writeln!(out, "smallest text file ({}): could not be fetched", selector)?;
        }
        (None, _) => {
            writeln!(out, "no text files found")?;
        }
    }
    writeln!(out)?;

    writeln!(out, "external connectivity:")?;
    if analysis.external.is_empty() {
        writeln!(out, "  (none referenced)")?;
    }
    for probe in &analysis.external {
        writeln!(
            out,
            "  {}:{} {}",
            probe.host,
            probe.port,
            if probe.up { "up" } else { "down" }
        )?;
    }
    writeln!(out)?;

    writeln!(out, "issues:")?;
    if analysis.issues.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for issue in &analysis.issues {
        writeln!(out, "  {}", format_issue(issue))?;
    }

    Ok(())
}

fn kind_label(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Directory => "directories",
        ItemKind::Text => "text files",
        ItemKind::Binary => "binary files",
        ItemKind::InvalidRef => "invalid refs",
        ItemKind::ExternalRef => "external refs",
        ItemKind::Timeout => "timeouts",
        ItemKind::TooLarge => "oversize files",
    }
}

fn optional_size(size: Option<usize>) -> String {
    size.map(|n| n.to_string()).unwrap_or_else(|| "n/a".to_string())
}

fn format_entry(item: &Item) -> String {
    match &item.display {
        Some(display) if !display.is_empty() => format!("[{}] {} ({})", kind_tag(item.kind), display, item.record),
        _ => format!("[{}] {}", kind_tag(item.kind), item.record),
    }
}

fn kind_tag(kind: ItemKind) -> char {
    match kind {
        ItemKind::Directory => '1',
        ItemKind::Text => '0',
        ItemKind::Binary => '9',
        ItemKind::InvalidRef => '3',
        ItemKind::ExternalRef => '1',
        ItemKind::Timeout => '?',
        ItemKind::TooLarge => '?',
    }
}

fn format_issue(item: &Item) -> String {
    match item.kind {
        ItemKind::InvalidRef => format!("invalid reference: {}", item.record),
        ItemKind::Timeout => format!("timeout: {}", item.record),
        ItemKind::TooLarge => format!("too large: {}", item.record),
        _ => format!("{}: {}", kind_label(item.kind), item.record),
    }
}
