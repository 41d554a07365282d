use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rustc_hash::FxHashMap;

use super::{GlyfRecord, GlyfTable, ParseError};
use crate::binary::write_u16be;
use crate::subset::GlyphIdRemap;

#[derive(Debug, Clone)]
pub struct SubsetGlyph<'a> {
    pub old_id: u16,
    pub record: GlyfRecord<'a>,
}

/// The records of a subset `glyf` table in new glyph id order.
///
/// Glyph ids are translated with the `GlyphIdRemap` the table was subset with.
#[derive(Debug, Clone)]
pub struct SubsetGlyf<'a> {
    glyphs: Vec<SubsetGlyph<'a>>,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

impl<'a> GlyfTable<'a> {
    /// Returns the set of glyphs needed to render `glyph_ids`.
    ///
    /// This is `glyph_ids` plus every glyph reachable from them through composite glyph
    /// components. Glyph ids outside the table are an error, as are composite glyphs that
    /// refer back to themselves.
    pub fn closure(
        &self,
        glyph_ids: impl IntoIterator<Item = u16>,
    ) -> Result<BTreeSet<u16>, ParseError> {
        let mut retained = BTreeSet::new();
        let mut queue = VecDeque::new();
        let mut components = BTreeMap::new();

        for glyph_id in glyph_ids {
            if retained.insert(glyph_id) {
                queue.push_back(glyph_id);
            }
        }

        while let Some(glyph_id) = queue.pop_front() {
            let record = self
                .records
                .get(usize::from(glyph_id))
                .ok_or(ParseError::BadIndex)?;
            let Some(composite) = record.composite()? else {
                continue;
            };

            let children = composite
                .components
                .iter()
                .map(|component| component.glyph_index)
                .collect::<Vec<_>>();
            for &child in &children {
                if retained.insert(child) {
                    queue.push_back(child);
                }
            }
            components.insert(glyph_id, children);
        }

        check_acyclic(&components)?;
        Ok(retained)
    }

    /// Returns a copy of this table that only contains the glyphs in `remap`, in their new
    /// order.
    ///
    /// Composite glyphs have their component glyph ids rewritten to the new ids. All other
    /// bytes are copied unchanged.
    pub fn subset(&self, remap: &GlyphIdRemap) -> Result<SubsetGlyf<'a>, ParseError> {
        let mut glyphs = Vec::with_capacity(remap.len());

        for &old_id in remap.old_ids() {
            let record = self
                .records
                .get(usize::from(old_id))
                .ok_or(ParseError::BadIndex)?;
            let record = match record.composite()? {
                Some(composite) => {
                    let mut data = record.data().to_vec();
                    for component in &composite.components {
                        let new_id = remap
                            .new_id(component.glyph_index)
                            .ok_or(ParseError::BadIndex)?;
                        write_u16be(&mut data, component.glyph_index_offset, new_id)
                            .map_err(|_| ParseError::BadOffset)?;
                    }
                    GlyfRecord::Remapped {
                        number_of_contours: record.number_of_contours(),
                        data,
                    }
                }
                None => record.clone(),
            };
            glyphs.push(SubsetGlyph { old_id, record });
        }

        Ok(SubsetGlyf { glyphs })
    }
}

/// Depth-first walk of the composite graph, failing on the first back edge.
fn check_acyclic(components: &BTreeMap<u16, Vec<u16>>) -> Result<(), ParseError> {
    let mut state: FxHashMap<u16, Visit> = FxHashMap::default();

    for &root in components.keys() {
        if state.contains_key(&root) {
            continue;
        }

        state.insert(root, Visit::InProgress);
        let mut stack = vec![(root, 0usize)];
        while let Some(frame) = stack.last_mut() {
            let glyph_id = frame.0;
            let children = components.get(&glyph_id).map_or(&[][..], Vec::as_slice);
            match children.get(frame.1) {
                Some(&child) => {
                    frame.1 += 1;
                    match state.get(&child) {
                        Some(Visit::InProgress) => return Err(ParseError::CompositeCycle(child)),
                        Some(Visit::Done) => {}
                        None => {
                            state.insert(child, Visit::InProgress);
                            stack.push((child, 0));
                        }
                    }
                }
                None => {
                    state.insert(glyph_id, Visit::Done);
                    stack.pop();
                }
            }
        }
    }

    Ok(())
}

impl<'a> SubsetGlyf<'a> {
    /// The retained glyphs, the new glyph id of each is its index.
    pub fn glyphs(&self) -> &[SubsetGlyph<'a>] {
        &self.glyphs
    }
}

impl<'a> From<SubsetGlyf<'a>> for GlyfTable<'a> {
    fn from(subset_glyphs: SubsetGlyf<'a>) -> Self {
        let records = subset_glyphs
            .glyphs
            .into_iter()
            .map(|subset_record| subset_record.record)
            .collect();

        GlyfTable { records }
    }
}
