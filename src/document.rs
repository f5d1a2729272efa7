//! Editor document handling: position mapping and per-version result cache
//!
//! The core works in absolute byte offsets; documents translate between
//! offsets and line/character positions. The cache short-circuits re-parsing
//! of an already-seen `(uri, version)` pair, mirroring how an editor sends
//! the same document version repeatedly.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::parser::Analysis;

/// One version of an open text document.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: String,
    pub version: i32,
    text: String,
}

impl Document {
    pub fn new(uri: impl Into<String>, version: i32, text: impl Into<String>) -> Self {
        Document {
            uri: uri.into(),
            version,
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of a 0-based line/character position, clamped to the
    /// document end.
    pub fn offset_at(&self, line: u32, character: u32) -> u32 {
        let mut remaining = line;
        let mut offset = 0usize;
        for (i, c) in self.text.char_indices() {
            if remaining == 0 {
                break;
            }
            if c == '\n' {
                remaining -= 1;
                offset = i + 1;
            }
        }
        if remaining > 0 {
            return self.text.len() as u32;
        }
        let line_end = self.text[offset..]
            .find('\n')
            .map_or(self.text.len(), |n| offset + n);
        (offset + (character as usize).min(line_end - offset)).min(self.text.len()) as u32
    }

    /// 0-based line/character position of a byte offset.
    pub fn position_at(&self, offset: u32) -> (u32, u32) {
        let offset = (offset as usize).min(self.text.len());
        let mut line = 0u32;
        let mut line_start = 0usize;
        for (i, c) in self.text.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                line_start = i + 1;
            }
        }
        (line, (offset - line_start) as u32)
    }
}

/// Analysis results keyed by `(uri, version)`.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: HashMap<(String, i32), Arc<Analysis>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached analysis for this document version, parsing it only
    /// on first sight.
    pub fn analyze(&mut self, document: &Document) -> Arc<Analysis> {
        let key = (document.uri.clone(), document.version);
        if let Some(cached) = self.entries.get(&key) {
            debug!(uri = %document.uri, version = document.version, "analysis cache hit");
            return Arc::clone(cached);
        }
        let analysis = Arc::new(crate::analyze(document.text()));
        self.entries.insert(key, Arc::clone(&analysis));
        analysis
    }

    /// Drop cached results for every version of `uri` except `latest`.
    pub fn retain_latest(&mut self, uri: &str, latest: i32) {
        self.entries
            .retain(|(u, v), _| u != uri || *v == latest);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_position_round_trip() {
        let doc = Document::new("file:///t.sql", 1, "SELECT 1\nFROM t\n");
        assert_eq!(doc.offset_at(1, 0), 9);
        assert_eq!(doc.position_at(9), (1, 0));
        assert_eq!(doc.position_at(7), (0, 7));
    }

    #[test]
    fn offset_at_clamps_past_line_end() {
        let doc = Document::new("file:///t.sql", 1, "ab\ncd");
        assert_eq!(doc.offset_at(0, 99), 2);
        assert_eq!(doc.offset_at(9, 0), 5);
    }

    #[test]
    fn cache_reuses_same_version() {
        let mut cache = AnalysisCache::new();
        let doc = Document::new("file:///t.sql", 3, "SELECT a FROM t;");
        let first = cache.analyze(&doc);
        let second = cache.analyze(&doc);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
