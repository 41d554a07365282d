//! Parsing and writing of the `cmap` table.
//!
//! Only the segment mapping to delta values sub-table (format 4) is understood.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/cmap>

pub mod subset;

use std::convert::TryFrom;

use crate::binary::read::{ReadArray, ReadBinary, ReadCtxt, ReadFrom, ReadScope};
use crate::binary::{I16Be, U16Be, U32Be};
use crate::error::{ParseError, WriteError};
use crate::size;
use crate::subset::max_power_of_2;

/// Platform of an encoding record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PlatformId(pub u16);

impl PlatformId {
    pub const WINDOWS: PlatformId = PlatformId(3);
}

/// Platform specific encoding of an encoding record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EncodingId(pub u16);

impl EncodingId {
    /// Unicode BMP with the Windows platform.
    pub const WINDOWS_UNICODE_BMP_UCS2: EncodingId = EncodingId(1);
}

/// `cmap` table, with its sub-tables left unparsed until they are looked up.
pub struct Cmap<'a> {
    pub scope: ReadScope<'a>,
    encoding_records: ReadArray<'a, EncodingRecord>,
}

/// Locates the sub-table for one platform and encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    /// From the start of the `cmap` table.
    pub offset: u32,
}

/// Segment mapping to delta values
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values>
#[derive(Debug, Clone)]
pub struct CmapSubtableFormat4<'a> {
    pub language: u16,
    pub end_codes: ReadArray<'a, U16Be>,
    pub start_codes: ReadArray<'a, U16Be>,
    pub id_deltas: ReadArray<'a, I16Be>,
    pub id_range_offsets: ReadArray<'a, U16Be>,
    pub glyph_id_array: ReadArray<'a, U16Be>,
}

/// The binary search hints of a format 4 header, derived from the segment count.
#[derive(Debug, PartialEq, Eq)]
struct SearchParams {
    seg_count_x2: u16,
    search_range: u16,
    entry_selector: u16,
    range_shift: u16,
}

impl ReadBinary for Cmap<'_> {
    type HostType<'a> = Cmap<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Cmap<'a>, ParseError> {
        let scope = ctxt.scope();
        let (version, num_tables) = ctxt.read::<(U16Be, U16Be)>()?;
        ctxt.check_version(version == 0)?;

        Ok(Cmap {
            scope,
            encoding_records: ctxt.read_array(usize::from(num_tables))?,
        })
    }
}

impl ReadFrom for EncodingRecord {
    type ReadType = (U16Be, U16Be, U32Be);

    fn read_from((platform_id, encoding_id, offset): (u16, u16, u32)) -> Self {
        EncodingRecord {
            platform_id,
            encoding_id,
            offset,
        }
    }
}

impl ReadBinary for CmapSubtableFormat4<'_> {
    type HostType<'a> = CmapSubtableFormat4<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<CmapSubtableFormat4<'a>, ParseError> {
        let (format, length, language, seg_count_x2) =
            ctxt.read::<(U16Be, U16Be, U16Be, U16Be)>()?;
        ctxt.check_version(format == 4)?;
        ctxt.check(seg_count_x2 != 0 && seg_count_x2 % 2 == 0)?;
        let seg_count = usize::from(seg_count_x2 / 2);
        // The search hints are recomputed when writing
        ctxt.skip(3 * size::U16)?;
        let end_codes = ctxt.read_array(seg_count)?;
        ctxt.skip(size::U16)?; // reservedPad
        let start_codes = ctxt.read_array(seg_count)?;
        let id_deltas = ctxt.read_array(seg_count)?;
        let id_range_offsets = ctxt.read_array(seg_count)?;

        // The glyph id array fills the rest of the sub-table
        let arrays_size = usize::from(length)
            .checked_sub((8 + 4 * seg_count) * size::U16)
            .ok_or(ParseError::BadValue)?;
        ctxt.check(arrays_size % size::U16 == 0)?;
        let glyph_id_array = ctxt.read_array(arrays_size / size::U16)?;

        Ok(CmapSubtableFormat4 {
            language,
            end_codes,
            start_codes,
            id_deltas,
            id_range_offsets,
            glyph_id_array,
        })
    }
}

impl SearchParams {
    /// `seg_count_x2` is a `u16` and a sub-table needs at least its final segment.
    fn new(seg_count: usize) -> Result<Self, WriteError> {
        let seg_count = match u16::try_from(seg_count) {
            Ok(seg_count @ 1..=0x7FFF) => seg_count,
            _ => return Err(WriteError::BadValue),
        };
        let entry_selector = max_power_of_2(seg_count);
        let search_range = 2 << entry_selector;
        let seg_count_x2 = 2 * seg_count;

        Ok(SearchParams {
            seg_count_x2,
            search_range,
            entry_selector,
            range_shift: seg_count_x2 - search_range,
        })
    }
}

impl<'a> Cmap<'a> {
    /// The first encoding record for `platform_id` and `encoding_id`.
    pub fn find_subtable(
        &self,
        platform_id: PlatformId,
        encoding_id: EncodingId,
    ) -> Option<EncodingRecord> {
        let wanted = (platform_id.0, encoding_id.0);
        self.encoding_records
            .iter()
            .find(|record| (record.platform_id, record.encoding_id) == wanted)
    }

    /// The data of the sub-table referenced by `record`, starting at its format field.
    pub fn subtable_scope(&self, record: EncodingRecord) -> Result<ReadScope<'a>, ParseError> {
        let offset = usize::try_from(record.offset)?;
        if offset > self.scope.data().len() {
            return Err(ParseError::BadOffset);
        }
        Ok(self.scope.offset(offset))
    }

    /// Read the format number of the sub-table referenced by `record`.
    pub fn subtable_format(&self, record: EncodingRecord) -> Result<u16, ParseError> {
        self.subtable_scope(record)?.ctxt().read_u16be()
    }
}

impl CmapSubtableFormat4<'_> {
    /// Map a character code to a glyph id.
    ///
    /// Returns `None` if no segment covers `ch`, `Some(0)` if the segment explicitly maps it
    /// to the missing glyph.
    pub fn map_glyph(&self, ch: u32) -> Result<Option<u16>, ParseError> {
        let Ok(ch) = u16::try_from(ch) else {
            return Ok(None);
        };

        // End codes are sorted, the first one >= ch selects the segment
        let (Ok(i) | Err(i)) = self.end_codes.binary_search_by(|end_code| end_code.cmp(&ch));
        let segment = (
            self.start_codes.get_item(i),
            self.id_deltas.get_item(i),
            self.id_range_offsets.get_item(i),
        );
        let (Some(start_code), Some(id_delta), Some(id_range_offset)) = segment else {
            return Ok(None);
        };
        if ch < start_code {
            Ok(None)
        } else if id_range_offset == 0 {
            // The idDelta arithmetic is modulo 65536
            Ok(Some(ch.wrapping_add_signed(id_delta)))
        } else {
            // id_range_offset is relative to its own position in the id_range_offsets array
            let index = (usize::from(id_range_offset / 2) + usize::from(ch - start_code) + i)
                .checked_sub(self.id_range_offsets.len())
                .ok_or(ParseError::BadIndex)?;
            match self.glyph_id_array.get_item(index) {
                Some(0) => Ok(Some(0)),
                Some(glyph_id) => Ok(Some(glyph_id.wrapping_add_signed(id_delta))),
                None => Err(ParseError::BadIndex),
            }
        }
    }

    /// Iterate the segments as `(start_code, end_code)` pairs.
    pub fn segments(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.start_codes.iter().zip(self.end_codes.iter())
    }
}

pub mod owned {
    use std::convert::TryFrom;

    use super::SearchParams;
    use crate::binary::write::{WriteBinary, WriteContext};
    use crate::binary::{I16Be, U16Be, U32Be};
    use crate::error::WriteError;
    use crate::size;

    /// A `cmap` table to be written.
    #[derive(Debug, PartialEq, Eq)]
    pub struct Cmap {
        pub encoding_records: Vec<EncodingRecord>,
    }

    #[derive(Debug, PartialEq, Eq)]
    pub struct EncodingRecord {
        pub platform_id: u16,
        pub encoding_id: u16,
        pub sub_table: CmapSubtableFormat4,
    }

    /// Segment arrays of a format 4 sub-table, the final 0xFFFF segment included.
    #[derive(Debug, Default, PartialEq, Eq)]
    pub struct CmapSubtableFormat4 {
        pub language: u16,
        pub end_codes: Vec<u16>,
        pub start_codes: Vec<u16>,
        pub id_deltas: Vec<i16>,
        pub id_range_offsets: Vec<u16>,
        pub glyph_id_array: Vec<u16>,
    }

    impl WriteBinary for Cmap {
        type Output = ();

        /// Sub-tables follow the encoding records in the same order.
        fn write<C: WriteContext>(ctxt: &mut C, cmap: Cmap) -> Result<(), WriteError> {
            let start = ctxt.bytes_written();
            ctxt.write_vec::<U16Be, u16>(vec![0, u16::try_from(cmap.encoding_records.len())?])?;
            let offsets = cmap
                .encoding_records
                .iter()
                .map(|record| {
                    ctxt.write_vec::<U16Be, _>(vec![record.platform_id, record.encoding_id])?;
                    ctxt.placeholder::<U32Be, u32>()
                })
                .collect::<Result<Vec<_>, _>>()?;

            for (record, offset) in cmap.encoding_records.into_iter().zip(offsets) {
                let sub_table_offset = u32::try_from(ctxt.bytes_written() - start)?;
                ctxt.write_placeholder(offset, sub_table_offset)?;
                CmapSubtableFormat4::write(ctxt, record.sub_table)?;
            }

            Ok(())
        }
    }

    impl WriteBinary for CmapSubtableFormat4 {
        type Output = ();

        /// Fails with `WriteError::BadValue` when the segment count or the length don't fit
        /// their 16-bit fields.
        fn write<C: WriteContext>(
            ctxt: &mut C,
            sub_table: CmapSubtableFormat4,
        ) -> Result<(), WriteError> {
            let start = ctxt.bytes_written();
            let search = SearchParams::new(sub_table.end_codes.len())?;

            U16Be::write(ctxt, 4u16)?;
            let length = ctxt.placeholder::<U16Be, u16>()?;
            ctxt.write_vec::<U16Be, _>(vec![
                sub_table.language,
                search.seg_count_x2,
                search.search_range,
                search.entry_selector,
                search.range_shift,
            ])?;
            ctxt.write_vec::<U16Be, _>(sub_table.end_codes)?;
            ctxt.write_zeros(size::U16)?; // reservedPad
            ctxt.write_vec::<U16Be, _>(sub_table.start_codes)?;
            ctxt.write_vec::<I16Be, _>(sub_table.id_deltas)?;
            ctxt.write_vec::<U16Be, _>(sub_table.id_range_offsets)?;
            ctxt.write_vec::<U16Be, _>(sub_table.glyph_id_array)?;

            let written = u16::try_from(ctxt.bytes_written() - start)?;
            ctxt.write_placeholder(length, written)
        }
    }
}
