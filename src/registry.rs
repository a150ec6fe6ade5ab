/// The closed sum of item kinds, per spec.md §3. `Timeout` and `TooLarge`
/// are post-hoc labels attached during crawl/metering, never produced by
/// the parser directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Directory,
    Text,
    Binary,
    InvalidRef,
    ExternalRef,
    Timeout,
    TooLarge,
}

impl ItemKind {
    fn label(self) -> &'static str {
        match self {
            ItemKind::Directory => "directory",
            ItemKind::Text => "text file",
            ItemKind::Binary => "binary file",
            ItemKind::InvalidRef => "invalid reference",
            ItemKind::ExternalRef => "external reference",
            ItemKind::Timeout => "timeout",
            ItemKind::TooLarge => "oversize file",
        }
    }
}

/// One registry entry. `record` means different things per kind, per
/// spec.md §3: a server-absolute selector for Directory/Text/Binary, the
/// *request* selector for InvalidRef/Timeout/TooLarge, and `host\tport`
/// for ExternalRef. `display` is the supplemented field from SPEC_FULL.md
/// §11 — carried through for reporting, never part of the dedup key.
#[derive(Clone, Debug)]
pub struct Item {
    pub kind: ItemKind,
    pub record: String,
    pub display: Option<String>,
}

/// A deduplicating, insertion-ordered collection of items, per spec.md
/// §4.4. A growable `Vec` plus index-based iteration (spec.md §9) gives
/// O(1) append and lets the crawl engine keep scanning while it appends,
/// since indices — unlike held references — survive reallocation.
#[derive(Default)]
pub struct Registry {
    items: Vec<Item>,
}

impl Registry {
    pub fn new() -> Self {
        Registry { items: Vec::new() }
    }

    /// Inserts `item` unless an item with the same `(kind, record)` is
    /// already present. Returns whether the insertion happened. Logs a
    /// one-line "Indexed <kind>: <record>" entry on first insertion, per
    /// spec.md §4.4.
    pub fn insert(&mut self, kind: ItemKind, record: impl Into<String>, display: Option<String>) -> bool {
        let record = record.into();
        if self.items.iter().any(|i| i.kind == kind && i.record == record) {
            return false;
        }
        log::info!("Indexed {}: {}", kind.label(), record);
        self.items.push(Item { kind, record, display });
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn iter_kind(&self, kind: ItemKind) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |i| i.kind == kind)
    }
}
