//! Synthesis of a format 4 `cmap` sub-table for a subset font.

use std::collections::BTreeMap;
use std::convert::TryFrom;

use log::warn;

use crate::error::ParseError;
use crate::size;
use crate::tables::cmap::{owned, EncodingId, PlatformId};

/// Highest character code a format 4 sub-table can map alongside the final 0xFFFF segment.
const MAX_FORMAT4_CODE: u32 = 0xFFFE;

/// The `length` of a format 4 sub-table is a `u16`.
const MAX_FORMAT4_LENGTH: usize = 0xFFFF;

/// Fixed fields of a format 4 sub-table, `reservedPad` included.
const FORMAT4_HEADER_SIZE: usize = 8 * size::U16;

/// One entry in each of the four segment arrays.
const FORMAT4_SEGMENT_SIZE: usize = 4 * size::U16;

/// A run of consecutive character codes.
#[derive(Debug)]
struct CmapSubtableFormat4Segment {
    start: u16,
    end: u16,
    glyph_ids: Vec<u16>,
    consecutive_glyph_ids: bool,
}

impl CmapSubtableFormat4Segment {
    fn new(start: u16, gid: u16) -> Self {
        CmapSubtableFormat4Segment {
            start,
            end: start,
            glyph_ids: vec![gid],
            consecutive_glyph_ids: true,
        }
    }

    /// Extend the segment with `ch`, returns `false` if `ch` does not directly follow it.
    fn add(&mut self, ch: u16, gid: u16) -> bool {
        if self.end.checked_add(1) != Some(ch) {
            return false;
        }

        let prev = self.glyph_ids.last().copied();
        self.consecutive_glyph_ids &= prev.and_then(|prev| prev.checked_add(1)) == Some(gid);
        self.glyph_ids.push(gid);
        self.end = ch;
        true
    }

    /// Bytes the segment adds to the sub-table.
    fn size(&self) -> usize {
        if self.consecutive_glyph_ids {
            FORMAT4_SEGMENT_SIZE
        } else {
            FORMAT4_SEGMENT_SIZE + self.glyph_ids.len() * size::U16
        }
    }
}

/// Group mappings, sorted by character code, into runs of consecutive codes.
fn segments(mappings: impl IntoIterator<Item = (u16, u16)>) -> Vec<CmapSubtableFormat4Segment> {
    let mut segments: Vec<CmapSubtableFormat4Segment> = Vec::new();
    for (ch, gid) in mappings {
        let extended = match segments.last_mut() {
            Some(segment) => segment.add(ch, gid),
            None => false,
        };
        if !extended {
            segments.push(CmapSubtableFormat4Segment::new(ch, gid));
        }
    }
    segments
}

impl owned::Cmap {
    /// Build a `cmap` table with a single Windows Unicode BMP (3, 1) sub-table from a mapping
    /// of character code to glyph id.
    ///
    /// Codes that format 4 can't represent are left out. So are the highest codes when the
    /// sub-table would otherwise outgrow its 16-bit length.
    pub fn from_mappings(mappings: &BTreeMap<u32, u16>) -> Result<owned::Cmap, ParseError> {
        let bmp_mappings = mappings.iter().filter_map(|(&ch, &gid)| match u16::try_from(ch) {
            Ok(ch) if u32::from(ch) <= MAX_FORMAT4_CODE => Some((ch, gid)),
            _ => {
                warn!(
                    "character U+{:04X} can't be stored in a format 4 cmap, omitting",
                    ch
                );
                None
            }
        });
        let mut segments = segments(bmp_mappings);

        // The final 0xFFFF segment is always present
        let mut length = FORMAT4_HEADER_SIZE + FORMAT4_SEGMENT_SIZE;
        let fits = segments
            .iter()
            .take_while(|segment| {
                length += segment.size();
                length <= MAX_FORMAT4_LENGTH
            })
            .count();
        let omitted = segments.split_off(fits);
        if let Some(first) = omitted.first() {
            let count = omitted
                .iter()
                .map(|segment| segment.glyph_ids.len())
                .sum::<usize>();
            warn!(
                "{} characters from U+{:04X} don't fit in a format 4 cmap, omitting",
                count, first.start
            );
        }

        let sub_table = owned::CmapSubtableFormat4::from_segments(segments)?;
        Ok(owned::Cmap {
            encoding_records: vec![owned::EncodingRecord {
                platform_id: PlatformId::WINDOWS.0,
                encoding_id: EncodingId::WINDOWS_UNICODE_BMP_UCS2.0,
                sub_table,
            }],
        })
    }

    /// The first and last character code mapped, `None` if there are none.
    pub fn code_range(&self) -> Option<(u16, u16)> {
        let sub_table = &self.encoding_records.first()?.sub_table;
        // Leave out the final 0xFFFF segment
        let count = sub_table.start_codes.len().checked_sub(1)?;
        let first = sub_table.start_codes.get(..count)?.first()?;
        let last = sub_table.end_codes.get(..count)?.last()?;
        Some((*first, *last))
    }
}

impl owned::CmapSubtableFormat4 {
    /// Group the mappings into runs of consecutive codes.
    ///
    /// A run that maps to consecutive glyph ids is stored as a delta, any other run is stored
    /// in the glyph id array. The required final 0xFFFF segment is appended.
    pub fn from_mappings(
        mappings: &BTreeMap<u16, u16>,
    ) -> Result<owned::CmapSubtableFormat4, ParseError> {
        let segments = segments(mappings.iter().map(|(&ch, &gid)| (ch, gid)));
        owned::CmapSubtableFormat4::from_segments(segments)
    }

    fn from_segments(
        segments: Vec<CmapSubtableFormat4Segment>,
    ) -> Result<owned::CmapSubtableFormat4, ParseError> {
        let mut table = owned::CmapSubtableFormat4::default();
        let mut id_range_offset_fixup_indices = Vec::new();
        for segment in segments {
            table.add_segment(segment, &mut id_range_offset_fixup_indices)?;
        }

        // Final start code and endCode values must be 0xFFFF.
        table.start_codes.push(0xFFFF);
        table.end_codes.push(0xFFFF);
        table.id_deltas.push(0);
        table.id_range_offsets.push(0);

        // Fix up the id_range_offsets now that all segments have been added. The offset is
        // relative to the location of the id_range_offset itself.
        let num_segments = table.end_codes.len();
        for index in id_range_offset_fixup_indices {
            let id_range_offset = &mut table.id_range_offsets[index];
            let count = num_segments - index + usize::from(*id_range_offset);
            // ×2 because we need to skip over `count` 16-bit values
            *id_range_offset = u16::try_from(2 * count)?;
        }

        Ok(table)
    }

    fn add_segment(
        &mut self,
        segment: CmapSubtableFormat4Segment,
        id_range_offset_fixups: &mut Vec<usize>,
    ) -> Result<(), ParseError> {
        self.start_codes.push(segment.start);
        self.end_codes.push(segment.end);

        if segment.consecutive_glyph_ids {
            let first_glyph_id = segment.glyph_ids.first().copied().unwrap_or(0);
            // The delta is applied modulo 65536
            self.id_deltas
                .push(first_glyph_id.wrapping_sub(segment.start) as i16);
            self.id_range_offsets.push(0);
        } else {
            self.id_deltas.push(0);
            // Holds the start of this segment's glyph ids until the fix up pass
            id_range_offset_fixups.push(self.id_range_offsets.len());
            self.id_range_offsets
                .push(u16::try_from(self.glyph_id_array.len())?);
            self.glyph_id_array.extend_from_slice(&segment.glyph_ids);
        }

        Ok(())
    }
}
