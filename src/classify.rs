/// Outcome of mapping a raw menu line onto the internal taxonomy, per
/// spec.md §4.3. `Invalid` and `ExternalRef` are surfaced so the crawl
/// engine can attach the right record (request selector, or `host\tport`)
/// before inserting into the registry — neither carries enough
/// information on its own to build an `Item`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classified {
    Directory,
    Text,
    Binary,
    ExternalRef,
    Invalid,
    Ignored,
}

/// Maps a Gopher type character plus the line's selector onto a
/// `Classified` outcome, per the table in spec.md §4.3.
pub fn classify(item_type: char, selector: &str) -> Classified {
    match item_type {
        '3' => Classified::Invalid,
        '1' if selector.is_empty() => Classified::ExternalRef,
        '1' => Classified::Directory,
        '0' => Classified::Text,
        '9' | '4' | '5' | '6' | 'g' | 'I' | ':' | ';' | '<' | 'd' | 'h' | 'p' | 'r' | 's' | 'P' | 'X' => {
            Classified::Binary
        }
        _ => Classified::Ignored,
    }
}
