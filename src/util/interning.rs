//! String interning for repeated log payloads.
//!
//! Build logs repeat the same messages, paths and property values thousands
//! of times. `StringInterner` hands out one shared `Arc<str>` per distinct
//! text so the model only stores each payload once.

use std::borrow::Cow;
use std::sync::Arc;

use dashmap::DashMap;

/// Concurrent string interner.
///
/// Text is normalized before lookup: `\r\n` and lone `\r` become `\n`, so
/// messages that only differ in line-ending style share one instance.
#[derive(Debug, Default)]
pub struct StringInterner {
    strings: DashMap<Arc<str>, ()>,
}

impl StringInterner {
    /// Create an empty interner.
    pub fn new() -> Self {
        StringInterner {
            strings: DashMap::new(),
        }
    }

    /// Return the canonical instance for `text`.
    pub fn intern(&self, text: &str) -> Arc<str> {
        let normalized = normalize_line_endings(text);

        // Fast path: already interned (shard read lock only)
        if let Some(existing) = self.strings.get(normalized.as_ref()) {
            return existing.key().clone();
        }

        // Insert-if-absent. A racing writer may have inserted the same text in
        // between; `or_insert` then yields the key that is already stored.
        let entry = self
            .strings
            .entry(Arc::from(normalized.as_ref()))
            .or_insert(());
        entry.key().clone()
    }

    /// Intern an optional string; `None` stays `None`.
    pub fn intern_opt(&self, text: Option<&str>) -> Option<Arc<str>> {
        text.map(|t| self.intern(t))
    }

    /// Number of distinct strings stored.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}
