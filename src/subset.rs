#![deny(missing_docs)]

//! Font subsetting.

mod cid_set;
mod remap;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::convert::TryFrom;
use std::hash::BuildHasher;
use std::iter;
use std::num::Wrapping;

use log::debug;

use crate::binary::read::{ReadBinary, ReadFixed, ReadScope};
use crate::binary::write::{Placeholder, WriteBinary, WriteBuffer, WriteContext};
use crate::binary::{long_align, read_u32be, U16Be, U32Be};
use crate::error::{ParseError, SubsetError, UnsupportedFormat, WriteError};
use crate::post::PostTable;
use crate::tables::cmap::{self, Cmap, CmapSubtableFormat4, EncodingId, PlatformId};
use crate::tables::glyf::GlyfTable;
use crate::tables::loca::{self, LocaTable};
use crate::tables::hmtx::owned;
use crate::tables::os2::Os2;
use crate::tables::{
    self, FontTableProvider, HeadTable, HheaTable, HmtxTable, IndexToLocFormat, MaxpTable,
    OffsetTableFontProvider, OpenTypeFont, TableRecord,
};
use crate::{checksum, size, tag};

pub use cid_set::CidSet;
pub use remap::GlyphIdRemap;

/// Tables that must be present in a font for it to be subset.
const REQUIRED_TABLES: [u32; 9] = [
    tag::LOCA,
    tag::GLYF,
    tag::MAXP,
    tag::HEAD,
    tag::CMAP,
    tag::HHEA,
    tag::OS_2,
    tag::HMTX,
    tag::POST,
];

/// Size of the offset table that precedes the table records.
const OFFSET_TABLE_SIZE: usize = size::U32 + 4 * size::U16;

/// Options that control subsetting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetOptions {
    /// Index of the face to subset when the data is a font collection.
    ///
    /// When `None` a collection is rejected. Ignored for single fonts.
    pub face_index: Option<usize>,
    /// Copy the `cvt `, `fpgm` and `prep` hinting tables into the subset font.
    pub keep_hinting: bool,
    /// Copy the `name` table into the subset font.
    pub keep_name: bool,
}

/// Resolves a character code to a glyph id in the font being subset.
pub trait GlyphLookup {
    /// Returns the glyph id for `code`, 0 if the font does not map it.
    fn lookup(&self, code: u32) -> Result<u16, ParseError>;
}

/// A subset font and the information needed to reference its glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetFont {
    /// The subset font program.
    pub data: Vec<u8>,
    /// The glyphs present in the subset font.
    pub cid_set: CidSet,
    /// Maps each retained glyph id of the source font to its id in the subset font.
    pub glyph_mapping: BTreeMap<u16, u16>,
    /// Maps each character code that resolved to a glyph to its id in the subset font.
    pub code_mapping: BTreeMap<u32, u16>,
}

/// Collects the tables of the subset font, keyed and so ordered by tag.
struct FontBuilder {
    sfnt_version: u32,
    tables: BTreeMap<u32, WriteBuffer>,
}

/// A `FontBuilder` holding the `head` table, which has to be patched once the font is complete.
struct FontBuilderWithHead {
    inner: FontBuilder,
    check_sum_adjustment: Placeholder<U32Be, u32>,
}

impl Default for SubsetOptions {
    fn default() -> Self {
        SubsetOptions {
            face_index: None,
            keep_hinting: true,
            keep_name: true,
        }
    }
}

impl GlyphLookup for CmapSubtableFormat4<'_> {
    fn lookup(&self, code: u32) -> Result<u16, ParseError> {
        Ok(self.map_glyph(code)?.unwrap_or(0))
    }
}

impl GlyphLookup for BTreeMap<u32, u16> {
    fn lookup(&self, code: u32) -> Result<u16, ParseError> {
        Ok(self.get(&code).copied().unwrap_or(0))
    }
}

impl<S: BuildHasher> GlyphLookup for HashMap<u32, u16, S> {
    fn lookup(&self, code: u32) -> Result<u16, ParseError> {
        Ok(self.get(&code).copied().unwrap_or(0))
    }
}

/// Subset the font in `data` so that it only contains the glyphs needed to display `codes`.
///
/// Character codes are resolved with the font's Windows Unicode BMP (3, 1) character map, which
/// must be format 4. `codes` may be in any order and contain duplicates.
pub fn subset(
    data: &[u8],
    codes: &[u32],
    options: &SubsetOptions,
) -> Result<SubsetFont, SubsetError> {
    let font = read_font(data)?;
    let provider = select_face(&font, options)?;
    check_required_tables(&provider)?;

    let cmap_data = provider.read_table_data(tag::CMAP)?;
    let cmap = ReadScope::new(&cmap_data).read::<Cmap<'_>>()?;
    let sub_table = unicode_bmp_subtable(&cmap)?;

    subset_tables(&provider, codes, &sub_table, options)
}

/// Subset the font in `data`, resolving `codes` through `lookup` instead of the font's own
/// character map.
pub fn subset_with_lookup(
    data: &[u8],
    codes: &[u32],
    lookup: &impl GlyphLookup,
    options: &SubsetOptions,
) -> Result<SubsetFont, SubsetError> {
    let font = read_font(data)?;
    let provider = select_face(&font, options)?;
    check_required_tables(&provider)?;

    subset_tables(&provider, codes, lookup, options)
}

fn read_font(data: &[u8]) -> Result<OpenTypeFont<'_>, SubsetError> {
    match read_u32be(data, 0)? {
        tables::TTF_MAGIC | tables::TRUE_MAGIC | tables::TTCF_MAGIC => {
            Ok(ReadScope::new(data).read::<OpenTypeFont<'_>>()?)
        }
        tables::CFF_MAGIC => Err(UnsupportedFormat::CffOutlines.into()),
        sfnt_version => Err(UnsupportedFormat::SfntVersion(sfnt_version).into()),
    }
}

fn select_face<'a>(
    font: &'a OpenTypeFont<'a>,
    options: &SubsetOptions,
) -> Result<OffsetTableFontProvider<'a>, SubsetError> {
    let index = match (font.is_collection(), options.face_index) {
        (true, None) => return Err(UnsupportedFormat::FontCollection.into()),
        (true, Some(index)) => index,
        (false, _) => 0,
    };
    let provider = font.table_provider(index)?;

    let cff_outlines = !provider.has_table(tag::GLYF)
        && (provider.has_table(tag::CFF) || provider.has_table(tag::CFF2));
    if provider.sfnt_version() == tables::CFF_MAGIC || cff_outlines {
        return Err(UnsupportedFormat::CffOutlines.into());
    }

    Ok(provider)
}

fn check_required_tables(provider: &impl FontTableProvider) -> Result<(), ParseError> {
    match REQUIRED_TABLES.iter().find(|&&tag| !provider.has_table(tag)) {
        Some(&tag) => Err(ParseError::MissingTable(tag)),
        None => Ok(()),
    }
}

fn unicode_bmp_subtable<'a>(cmap: &Cmap<'a>) -> Result<CmapSubtableFormat4<'a>, SubsetError> {
    let record = cmap
        .find_subtable(PlatformId::WINDOWS, EncodingId::WINDOWS_UNICODE_BMP_UCS2)
        .ok_or(SubsetError::UnsupportedEncoding)?;
    match cmap.subtable_format(record)? {
        4 => Ok(cmap
            .subtable_scope(record)?
            .read::<CmapSubtableFormat4<'_>>()?),
        format => Err(UnsupportedFormat::CmapFormat(format).into()),
    }
}

/// Subset the font supplied by `provider`.
///
/// This is the work behind [subset] and [subset_with_lookup] for callers that already have a
/// `FontTableProvider`. The font must have TrueType outlines and every required table.
pub fn subset_tables(
    provider: &impl FontTableProvider,
    codes: &[u32],
    lookup: &impl GlyphLookup,
    options: &SubsetOptions,
) -> Result<SubsetFont, SubsetError> {
    let head = read_owned_table::<HeadTable>(provider, tag::HEAD)?;
    let mut maxp = read_owned_table::<MaxpTable>(provider, tag::MAXP)?;
    let mut hhea = read_owned_table::<HheaTable>(provider, tag::HHEA)?;
    let mut os2 = read_owned_table::<Os2>(provider, tag::OS_2)?;
    // Glyph names refer to the old glyph ids, version 3 has none
    let post = read_owned_table::<PostTable>(provider, tag::POST)?.to_version3();

    let loca_data = provider.read_table_data(tag::LOCA)?;
    let loca = ReadScope::new(&loca_data)
        .read_dep::<LocaTable<'_>>((maxp.num_glyphs, head.index_to_loc_format))?;
    let glyf_data = provider.read_table_data(tag::GLYF)?;
    let glyf = ReadScope::new(&glyf_data).read_dep::<GlyfTable<'_>>(&loca)?;
    let hmtx_data = provider.read_table_data(tag::HMTX)?;
    let hmtx = ReadScope::new(&hmtx_data).read_dep::<HmtxTable<'_>>((
        usize::from(maxp.num_glyphs),
        usize::from(hhea.num_h_metrics),
    ))?;

    // Resolve the character codes, codes without a glyph are left out
    let mut code_glyphs = BTreeMap::new();
    for code in codes.iter().copied().collect::<BTreeSet<_>>() {
        let glyph_id = lookup.lookup(code)?;
        if glyph_id != 0 {
            code_glyphs.insert(code, glyph_id);
        }
    }

    // Subset the glyphs
    let closure = glyf.closure(iter::once(0).chain(code_glyphs.values().copied()))?;
    let remap = GlyphIdRemap::new(closure);
    let subset_glyphs = glyf.subset(&remap)?;
    debug!(
        "subsetting {} codes to {} of {} glyphs",
        code_glyphs.len(),
        remap.len(),
        maxp.num_glyphs
    );

    let num_glyphs = u16::try_from(remap.len()).map_err(ParseError::from)?;
    maxp.num_glyphs = num_glyphs;
    hhea.num_h_metrics = num_glyphs;
    let hmtx = create_hmtx_table(&hmtx, &remap)?;

    let code_mapping = code_glyphs
        .iter()
        .map(|(&code, &old_id)| {
            remap
                .new_id(old_id)
                .map(|new_id| (code, new_id))
                .ok_or(ParseError::BadIndex)
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    let cmap = cmap::owned::Cmap::from_mappings(&code_mapping)?;
    if let Some((first, last)) = cmap.code_range() {
        os2.set_char_range(u32::from(first), u32::from(last));
    }

    let glyph_mapping = remap.iter().collect::<BTreeMap<_, _>>();
    let glyf = GlyfTable::from(subset_glyphs);

    // Build the new font
    let mut builder = FontBuilder::new(tables::TTF_MAGIC);
    builder.add_table::<_, cmap::owned::Cmap>(tag::CMAP, cmap)?;
    if options.keep_hinting {
        for tag in [tag::CVT, tag::FPGM, tag::PREP] {
            if let Some(data) = provider.table_data(tag)? {
                builder.add_table::<_, ReadScope<'_>>(tag, ReadScope::new(&data))?;
            }
        }
    }
    builder.add_table::<_, HheaTable>(tag::HHEA, &hhea)?;
    builder.add_table::<_, owned::HmtxTable>(tag::HMTX, &hmtx)?;
    builder.add_table::<_, MaxpTable>(tag::MAXP, &maxp)?;
    if options.keep_name {
        if let Some(name) = provider.table_data(tag::NAME)? {
            builder.add_table::<_, ReadScope<'_>>(tag::NAME, ReadScope::new(&name))?;
        }
    }
    builder.add_table::<_, Os2>(tag::OS_2, &os2)?;
    builder.add_table::<_, PostTable>(tag::POST, &post)?;
    let mut builder = builder.add_head_table(&head)?;
    builder.add_glyf_table(glyf)?;
    let data = builder.data()?;
    debug!("subset font is {} bytes", data.len());

    Ok(SubsetFont {
        data,
        cid_set: CidSet::new(usize::from(num_glyphs)),
        glyph_mapping,
        code_mapping,
    })
}

/// Read a table that holds no borrowed data.
fn read_owned_table<T>(provider: &impl FontTableProvider, tag: u32) -> Result<T, ParseError>
where
    T: for<'a> ReadBinary<HostType<'a> = T>,
{
    let data = provider.read_table_data(tag)?;
    ReadScope::new(&data).read::<T>()
}

/// One full metric per retained glyph, in new glyph id order.
fn create_hmtx_table(
    hmtx: &HmtxTable<'_>,
    remap: &GlyphIdRemap,
) -> Result<owned::HmtxTable, SubsetError> {
    let mut h_metrics = Vec::new();
    h_metrics.try_reserve(remap.len())?;
    for &old_id in remap.old_ids() {
        h_metrics.push(hmtx.metric(old_id)?);
    }

    Ok(owned::HmtxTable { h_metrics })
}

impl FontBuilder {
    pub fn new(sfnt_version: u32) -> Self {
        FontBuilder {
            sfnt_version,
            tables: BTreeMap::new(),
        }
    }

    pub fn add_table<HostType, T: WriteBinary<HostType>>(
        &mut self,
        tag: u32,
        table: HostType,
    ) -> Result<T::Output, SubsetError> {
        debug_assert_ne!(tag, tag::HEAD, "head table must use add_head_table");
        debug_assert_ne!(tag, tag::GLYF, "glyf table must use add_glyf_table");

        self.add_table_inner::<HostType, T>(tag, table)
    }

    fn add_table_inner<HostType, T: WriteBinary<HostType>>(
        &mut self,
        tag: u32,
        table: HostType,
    ) -> Result<T::Output, SubsetError> {
        let mut buffer = WriteBuffer::new();
        let output = T::write(&mut buffer, table)?;
        debug!("{}: {} bytes", tag::DisplayTag(tag), buffer.len());
        self.tables.insert(tag, buffer);

        Ok(output)
    }

    /// Add the `head` table. It is written declaring long `loca` offsets, the only kind
    /// `add_glyf_table` produces.
    pub fn add_head_table(mut self, table: &HeadTable) -> Result<FontBuilderWithHead, SubsetError> {
        let table = HeadTable {
            index_to_loc_format: IndexToLocFormat::Long,
            ..table.clone()
        };
        let placeholder = self.add_table_inner::<_, HeadTable>(tag::HEAD, &table)?;

        Ok(FontBuilderWithHead {
            inner: self,
            check_sum_adjustment: placeholder,
        })
    }
}

impl FontBuilderWithHead {
    pub fn add_glyf_table(&mut self, table: GlyfTable<'_>) -> Result<(), SubsetError> {
        let loca = self
            .inner
            .add_table_inner::<_, GlyfTable<'_>>(tag::GLYF, table)?;
        self.inner
            .add_table_inner::<_, loca::owned::LocaTable>(tag::LOCA, loca)?;

        Ok(())
    }

    /// Lay out the font: the offset table, one record per table, then the tables in the same
    /// tag order, each padded to a multiple of four bytes.
    pub fn data(self) -> Result<Vec<u8>, SubsetError> {
        let FontBuilderWithHead {
            inner: FontBuilder {
                sfnt_version,
                mut tables,
            },
            check_sum_adjustment,
        } = self;
        let directory_size = OFFSET_TABLE_SIZE + tables.len() * TableRecord::SIZE;

        let mut offset = long_align(directory_size);
        let mut records = Vec::with_capacity(tables.len());
        for (&table_tag, table) in tables.iter_mut() {
            let length = table.len();
            table.write_zeros(long_align(length) - length)?;
            records.push(TableRecord {
                table_tag,
                checksum: checksum::table_checksum(table.bytes())?.0,
                offset: u32::try_from(offset)?,
                length: u32::try_from(length)?,
            });
            offset += table.len();
        }

        let mut font = WriteBuffer::new();
        font.try_reserve(offset)?;
        write_offset_table(&mut font, sfnt_version, records.len())?;
        font.write_iter::<TableRecord, _>(records.iter())?;
        font.write_zeros(long_align(directory_size) - directory_size)?;

        // Table checksums were taken with checkSumAdjustment still zero
        let font_checksum = checksum::table_checksum(font.bytes())?
            + records
                .iter()
                .map(|record| Wrapping(record.checksum))
                .sum::<Wrapping<u32>>();
        let head = tables
            .get_mut(&tag::HEAD)
            .ok_or(ParseError::MissingTable(tag::HEAD))?;
        head.write_placeholder(
            check_sum_adjustment,
            checksum::checksum_adjustment(font_checksum),
        )?;
        for table in tables.values() {
            font.write_bytes(table.bytes())?;
        }
        debug!("laid out {} tables", records.len());

        Ok(font.into_inner())
    }
}

/// The offset table that starts the font, binary search hints included.
fn write_offset_table(
    font: &mut WriteBuffer,
    sfnt_version: u32,
    num_tables: usize,
) -> Result<(), WriteError> {
    let num_tables = u16::try_from(num_tables)?;
    let entry_selector = max_power_of_2(num_tables);
    let search_range = 16 * (1u32 << entry_selector);
    let range_shift = (16 * u32::from(num_tables))
        .checked_sub(search_range)
        .ok_or(WriteError::BadValue)?;

    U32Be::write(font, sfnt_version)?;
    font.write_vec::<U16Be, u16>(vec![
        num_tables,
        u16::try_from(search_range)?,
        entry_selector,
        u16::try_from(range_shift)?,
    ])
}

/// Calculate the exponent of the largest power of 2 that is <= num
pub(crate) fn max_power_of_2(num: u16) -> u16 {
    15u16.saturating_sub(num.leading_zeros() as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read_u16be;
    use crate::tables::OpenTypeData;
    use crate::tag::DisplayTag;
    use crate::tests::{TestFontBuilder, TestGlyph};

    #[test]
    fn font_builder() {
        // Test that reading a font in, adding all its tables and writing it out equals the
        // original font
        let buffer = TestFontBuilder::new(TestFontBuilder::simple_glyphs(4)).build();
        let fontfile = ReadScope::new(&buffer)
            .read::<OpenTypeFont<'_>>()
            .expect("error reading OpenTypeFile");
        let provider = fontfile.table_provider(0).unwrap();
        let head = ReadScope::new(&provider.read_table_data(tag::HEAD).unwrap())
            .read::<HeadTable>()
            .unwrap();
        let maxp = ReadScope::new(&provider.read_table_data(tag::MAXP).unwrap())
            .read::<MaxpTable>()
            .unwrap();
        let loca_data = provider.read_table_data(tag::LOCA).unwrap();
        let loca = ReadScope::new(&loca_data)
            .read_dep::<LocaTable<'_>>((maxp.num_glyphs, head.index_to_loc_format))
            .unwrap();
        let glyf_data = provider.read_table_data(tag::GLYF).unwrap();
        let glyf = ReadScope::new(&glyf_data)
            .read_dep::<GlyfTable<'_>>(&loca)
            .unwrap();

        let mut builder = FontBuilder::new(tables::TTF_MAGIC);
        builder
            .add_table::<_, MaxpTable>(tag::MAXP, &maxp)
            .unwrap();
        let records = provider.table_records().collect::<Vec<_>>();
        for record in &records {
            match record.table_tag {
                tag::HEAD | tag::GLYF | tag::LOCA | tag::MAXP => continue,
                table_tag => {
                    let table = provider.read_table_data(table_tag).unwrap();
                    builder
                        .add_table::<_, ReadScope<'_>>(table_tag, ReadScope::new(&table))
                        .unwrap();
                }
            }
        }

        let mut builder = builder.add_head_table(&head).unwrap();
        builder.add_glyf_table(glyf).unwrap();
        let data = builder.data().unwrap();

        let new_fontfile = ReadScope::new(&data)
            .read::<OpenTypeFont<'_>>()
            .expect("error reading new OpenTypeFile");
        let new_font = match new_fontfile.data {
            OpenTypeData::Single(font) => font,
            OpenTypeData::Collection(_) => unreachable!(),
        };

        assert_eq!(new_font.table_records.len(), records.len());
        for record in &records {
            let new_record = new_font.find_table_record(record.table_tag).unwrap();
            let tag = DisplayTag(record.table_tag);
            assert_eq!((tag, new_record.checksum), (tag, record.checksum));
        }
        assert_eq!(
            checksum::table_checksum(&data).unwrap().0,
            checksum::CHECKSUM_MAGIC
        );
    }

    #[test]
    fn test_offset_table() {
        let data = TestFontBuilder::new(TestFontBuilder::simple_glyphs(2)).build();
        let font = subset(&data, &[], &SubsetOptions::default()).unwrap();
        // cmap glyf head hhea hmtx loca maxp name OS/2 post
        assert_eq!(read_u16be(&font.data, 4), Ok(10));
        assert_eq!(read_u16be(&font.data, 6), Ok(128));
        assert_eq!(read_u16be(&font.data, 8), Ok(3));
        assert_eq!(read_u16be(&font.data, 10), Ok(32));
    }

    #[test]
    fn test_offset_table_search_fields() {
        let mut font = WriteBuffer::new();
        write_offset_table(&mut font, tables::TTF_MAGIC, 4095).unwrap();
        assert_eq!(read_u16be(font.bytes(), 6), Ok(0x8000));
        assert_eq!(read_u16be(font.bytes(), 8), Ok(11));
        assert_eq!(read_u16be(font.bytes(), 10), Ok(0x7FF0));

        let mut font = WriteBuffer::new();
        assert_eq!(
            write_offset_table(&mut font, tables::TTF_MAGIC, 4096),
            Err(WriteError::BadValue)
        );
    }

    #[test]
    fn test_create_hmtx_table() {
        let glyphs = vec![
            TestGlyph::Empty,
            TestGlyph::simple(1),
            TestGlyph::simple(2),
            TestGlyph::simple(3),
            TestGlyph::simple(4),
        ];
        let data = TestFontBuilder::new(glyphs).num_h_metrics(2).build();
        let fontfile = ReadScope::new(&data).read::<OpenTypeFont<'_>>().unwrap();
        let provider = fontfile.table_provider(0).unwrap();
        let hmtx_data = provider.read_table_data(tag::HMTX).unwrap();
        let hmtx = ReadScope::new(&hmtx_data)
            .read_dep::<HmtxTable<'_>>((5, 2))
            .unwrap();

        let hmtx = create_hmtx_table(&hmtx, &GlyphIdRemap::new([1, 3])).unwrap();

        // Glyphs past num_h_metrics take the last advance and their own bearing
        let expected = vec![
            tables::LongHorMetric {
                advance_width: 500,
                lsb: 0,
            },
            tables::LongHorMetric {
                advance_width: 510,
                lsb: 1,
            },
            tables::LongHorMetric {
                advance_width: 510,
                lsb: 3,
            },
        ];
        assert_eq!(hmtx.h_metrics, expected);
    }

    #[test]
    fn test_max_power_of_2() {
        assert_eq!(max_power_of_2(0), 0);
        assert_eq!(max_power_of_2(1), 0);
        assert_eq!(max_power_of_2(2), 1);
        assert_eq!(max_power_of_2(4), 2);
        assert_eq!(max_power_of_2(8), 3);
        assert_eq!(max_power_of_2(16), 4);
        assert_eq!(max_power_of_2(49), 5);
        assert_eq!(max_power_of_2(u16::MAX), 15);
    }

    #[test]
    fn test_lookup_impls() {
        let btree: BTreeMap<u32, u16> = vec![(0x41, 3)].into_iter().collect();
        assert_eq!(btree.lookup(0x41), Ok(3));
        assert_eq!(btree.lookup(0x42), Ok(0));

        let hash: HashMap<u32, u16> = vec![(0x41, 3)].into_iter().collect();
        assert_eq!(hash.lookup(0x41), Ok(3));
        assert_eq!(hash.lookup(0x42), Ok(0));
    }
}
