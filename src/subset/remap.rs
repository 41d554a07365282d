use std::collections::BTreeSet;

/// Renumbering of the glyphs retained in a subset font.
///
/// Retained glyphs keep their relative order and are numbered densely from 0. The `.notdef`
/// glyph is always retained so it always maps 0 → 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphIdRemap {
    /// Old glyph ids, indexed by new glyph id. Sorted.
    old_ids: Vec<u16>,
}

impl GlyphIdRemap {
    /// Create a remap for the glyphs in `glyph_ids` plus `.notdef`.
    pub fn new(glyph_ids: impl IntoIterator<Item = u16>) -> Self {
        let mut glyph_ids = glyph_ids.into_iter().collect::<BTreeSet<_>>();
        glyph_ids.insert(0);
        GlyphIdRemap {
            old_ids: glyph_ids.into_iter().collect(),
        }
    }

    /// Number of glyphs retained.
    pub fn len(&self) -> usize {
        self.old_ids.len()
    }

    /// A remap is never empty, `new` always retains `.notdef`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The retained old glyph ids in new glyph id order.
    pub fn old_ids(&self) -> &[u16] {
        &self.old_ids
    }

    /// Return the old glyph id for the supplied new glyph id
    pub fn old_id(&self, new_id: u16) -> Option<u16> {
        self.old_ids.get(usize::from(new_id)).copied()
    }

    /// Return the new glyph id for the supplied old glyph id, `None` if it was not retained.
    pub fn new_id(&self, old_id: u16) -> Option<u16> {
        // The index is < 65536 as there is one entry per distinct u16
        self.old_ids
            .binary_search(&old_id)
            .ok()
            .map(|index| index as u16)
    }

    /// Iterate `(old_id, new_id)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.old_ids.iter().copied().zip(0u16..)
    }
}
