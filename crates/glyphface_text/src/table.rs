//! Code point to render record lookup

use crate::geometry::INDEX_SIZE;
use crate::{FaceError, Result};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Code point whose record answers lookups for anything not loaded
pub const FALLBACK_CODE_POINT: u32 = 0;

/// What a caller needs to draw one glyph and advance past it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderRecord {
    /// Byte offset of the glyph's six indices in the index buffer
    pub index_offset: usize,
    /// Horizontal advance in pixels
    pub advance: f32,
}

impl RenderRecord {
    /// Index (not byte) position of the glyph's first index, for draw ranges
    pub fn first_index(&self) -> u32 {
        (self.index_offset / INDEX_SIZE) as u32
    }
}

/// Render records keyed by code point
#[derive(Debug, Clone, Default)]
pub struct GlyphTable {
    records: FxHashMap<u32, RenderRecord>,
}

impl GlyphTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any earlier one for the same code point
    pub fn insert(&mut self, code_point: u32, record: RenderRecord) {
        if let Some(previous) = self.records.insert(code_point, record) {
            debug!(
                "Replaced record for U+{:04X} (index offset {} -> {})",
                code_point, previous.index_offset, record.index_offset
            );
        }
    }

    /// Look up a code point, falling back to the record for code point 0
    pub fn lookup(&self, code_point: u32) -> Result<RenderRecord> {
        self.records
            .get(&code_point)
            .or_else(|| self.records.get(&FALLBACK_CODE_POINT))
            .copied()
            .ok_or(FaceError::MissingFallback)
    }

    /// Exact lookup without fallback
    pub fn get(&self, code_point: u32) -> Option<&RenderRecord> {
        self.records.get(&code_point)
    }

    /// Whether a record exists for exactly this code point
    pub fn contains(&self, code_point: u32) -> bool {
        self.records.contains_key(&code_point)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all (code point, record) pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &RenderRecord)> {
        self.records.iter().map(|(cp, record)| (*cp, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index_offset: usize, advance: f32) -> RenderRecord {
        RenderRecord {
            index_offset,
            advance,
        }
    }

    #[test]
    fn test_lookup_exact() {
        let mut table = GlyphTable::new();
        table.insert(0, record(0, 5.0));
        table.insert('A' as u32, record(24, 9.5));

        assert_eq!(table.lookup('A' as u32).unwrap(), record(24, 9.5));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_lookup_falls_back_to_zero() {
        let mut table = GlyphTable::new();
        table.insert(0, record(0, 5.0));
        table.insert('A' as u32, record(24, 9.5));

        let fallback = table.lookup(0).unwrap();
        assert_eq!(table.lookup('Z' as u32).unwrap(), fallback);
        assert_eq!(table.lookup(0x1F600).unwrap(), fallback);
        assert!(table.get('Z' as u32).is_none());
    }

    #[test]
    fn test_missing_fallback_is_error() {
        let mut table = GlyphTable::new();
        table.insert('A' as u32, record(0, 9.5));

        assert!(table.lookup('A' as u32).is_ok());
        assert!(matches!(
            table.lookup('B' as u32),
            Err(FaceError::MissingFallback)
        ));
    }

    #[test]
    fn test_insert_last_write_wins() {
        let mut table = GlyphTable::new();
        table.insert(0, record(0, 5.0));
        table.insert('A' as u32, record(24, 9.5));
        table.insert('A' as u32, record(48, 10.0));

        assert_eq!(table.lookup('A' as u32).unwrap(), record(48, 10.0));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_first_index() {
        assert_eq!(record(0, 0.0).first_index(), 0);
        assert_eq!(record(24, 0.0).first_index(), 6);
        assert_eq!(record(48, 0.0).first_index(), 12);
    }

    #[test]
    fn test_empty_table() {
        let table = GlyphTable::new();
        assert!(table.is_empty());
        assert!(!table.contains(0));
        assert_eq!(table.iter().count(), 0);
    }
}
