//! Font files and the tables the subsetter reads.
//!
//! A font file holds one font or a collection of them. Each font starts with a directory of
//! table records, the tables themselves are decoded by the submodules.

pub mod cmap;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod loca;
pub mod maxp;
pub mod os2;

use std::borrow::Cow;
use std::convert::TryFrom;

use crate::binary::read::{ReadArray, ReadBinary, ReadCtxt, ReadFrom, ReadScope};
use crate::binary::write::{WriteBinary, WriteContext};
use crate::binary::{I16Be, I32Be, U16Be, U32Be};
use crate::error::{ParseError, WriteError};
use crate::tag;

pub use head::HeadTable;
pub use hhea::HheaTable;
pub use hmtx::{HmtxTable, LongHorMetric};
pub use maxp::MaxpTable;

/// sfnt version of a font with CFF outlines (`OTTO`).
pub const CFF_MAGIC: u32 = tag::OTTO;

/// sfnt version of a font with TrueType outlines, 1.0 in 16.16 fixed point.
pub const TTF_MAGIC: u32 = 0x00010000;

/// sfnt version Apple uses for TrueType outlines (`true`).
pub const TRUE_MAGIC: u32 = tag::TRUE;

/// First four bytes of a font collection (`ttcf`).
pub const TTCF_MAGIC: u32 = tag::TTCF;

/// 32-bit signed fixed-point number (16.16)
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Fixed(i32);

/// Size of the offsets in the `loca` table, as given by `head.indexToLocFormat`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexToLocFormat {
    /// 16-bit offsets holding half the byte offset.
    Short = 0,
    /// 32-bit byte offsets.
    Long = 1,
}

/// Access to the tables of a single font by tag.
pub trait FontTableProvider {
    /// The data of table `tag`, `None` if the font has no such table.
    fn table_data<'a>(&'a self, tag: u32) -> Result<Option<Cow<'a, [u8]>>, ParseError>;

    fn has_table(&self, tag: u32) -> bool;

    /// Like `table_data`, but a missing table is `ParseError::MissingTable`.
    fn read_table_data<'a>(&'a self, tag: u32) -> Result<Cow<'a, [u8]>, ParseError> {
        self.table_data(tag)?.ok_or(ParseError::MissingTable(tag))
    }
}

/// A parsed font file.
pub struct OpenTypeFont<'a> {
    pub scope: ReadScope<'a>,
    pub data: OpenTypeData<'a>,
}

pub enum OpenTypeData<'a> {
    Single(OffsetTable<'a>),
    Collection(TTCHeader<'a>),
}

/// Header of a font collection.
///
/// The digital signature fields of version 2 headers are not read.
pub struct TTCHeader<'a> {
    /// Major and minor version.
    pub version: (u16, u16),
    /// Offset of each font's table directory from the start of the file.
    pub offset_tables: ReadArray<'a, U32Be>,
}

/// Table directory of one font.
///
/// `searchRange`, `entrySelector` and `rangeShift` follow from the number of tables and are
/// not kept.
#[derive(Clone)]
pub struct OffsetTable<'a> {
    pub sfnt_version: u32,
    pub table_records: ReadArray<'a, TableRecord>,
}

/// A `FontTableProvider` for one font of a parsed font file.
///
/// Every table record has been checked to lie within the file.
pub struct OffsetTableFontProvider<'a> {
    scope: ReadScope<'a>,
    offset_table: Cow<'a, OffsetTable<'a>>,
}

/// Location of a table in the font file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TableRecord {
    pub table_tag: u32,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

impl ReadBinary for OpenTypeFont<'_> {
    type HostType<'a> = OpenTypeFont<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<OpenTypeFont<'a>, ParseError> {
        let scope = ctxt.scope();
        let data = match ctxt.clone().read_u32be()? {
            TTCF_MAGIC => OpenTypeData::Collection(ctxt.read::<TTCHeader<'_>>()?),
            _ => OpenTypeData::Single(ctxt.read::<OffsetTable<'_>>()?),
        };

        Ok(OpenTypeFont { scope, data })
    }
}

impl<'a> OpenTypeFont<'a> {
    pub fn is_collection(&self) -> bool {
        matches!(self.data, OpenTypeData::Collection(_))
    }

    /// The tables of font `index` of a collection. `index` is ignored for a single font.
    ///
    /// Fails if any table record of the font points outside the file.
    pub fn table_provider(
        &'a self,
        index: usize,
    ) -> Result<OffsetTableFontProvider<'a>, ParseError> {
        let offset_table = match &self.data {
            OpenTypeData::Single(offset_table) => Cow::Borrowed(offset_table),
            OpenTypeData::Collection(ttc) => {
                let offset = ttc
                    .offset_tables
                    .get_item(index)
                    .ok_or(ParseError::BadIndex)?;
                let directory = self.scope.offset(usize::try_from(offset)?);
                Cow::Owned(directory.read::<OffsetTable<'_>>()?)
            }
        };

        let provider = OffsetTableFontProvider {
            scope: self.scope,
            offset_table,
        };
        for record in provider.table_records() {
            record.read_table(&provider.scope)?;
        }
        Ok(provider)
    }
}

impl ReadBinary for TTCHeader<'_> {
    type HostType<'a> = TTCHeader<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<TTCHeader<'a>, ParseError> {
        let (ttc_tag, major, minor) = ctxt.read::<(U32Be, U16Be, U16Be)>()?;
        ctxt.check_version(ttc_tag == TTCF_MAGIC)?;
        ctxt.check(matches!(major, 1 | 2))?;
        let num_fonts = usize::try_from(ctxt.read_u32be()?)?;

        Ok(TTCHeader {
            version: (major, minor),
            offset_tables: ctxt.read_array(num_fonts)?,
        })
    }
}

impl ReadBinary for OffsetTable<'_> {
    type HostType<'a> = OffsetTable<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<OffsetTable<'a>, ParseError> {
        let sfnt_version = ctxt.read_u32be()?;
        ctxt.check_version(matches!(
            sfnt_version,
            TTF_MAGIC | TRUE_MAGIC | CFF_MAGIC
        ))?;
        let (num_tables, _search_range, _entry_selector, _range_shift) =
            ctxt.read::<(U16Be, U16Be, U16Be, U16Be)>()?;

        Ok(OffsetTable {
            sfnt_version,
            table_records: ctxt.read_array(usize::from(num_tables))?,
        })
    }
}

impl OffsetTable<'_> {
    pub fn find_table_record(&self, tag: u32) -> Option<TableRecord> {
        self.table_records
            .iter()
            .find(|record| record.table_tag == tag)
    }
}

impl OffsetTableFontProvider<'_> {
    /// `TTF_MAGIC`, `TRUE_MAGIC` or `CFF_MAGIC`.
    pub fn sfnt_version(&self) -> u32 {
        self.offset_table.sfnt_version
    }

    /// Records in directory order.
    pub fn table_records(&self) -> impl Iterator<Item = TableRecord> + '_ {
        self.offset_table.table_records.iter()
    }
}

impl FontTableProvider for OffsetTableFontProvider<'_> {
    fn table_data<'b>(&'b self, tag: u32) -> Result<Option<Cow<'b, [u8]>>, ParseError> {
        self.offset_table
            .find_table_record(tag)
            .map(|record| record.read_table(&self.scope))
            .transpose()
            .map(|scope| scope.map(|scope| Cow::Borrowed(scope.data())))
    }

    fn has_table(&self, tag: u32) -> bool {
        self.offset_table.find_table_record(tag).is_some()
    }
}

impl TableRecord {
    /// The table's bytes within `scope`, the whole font file.
    pub fn read_table<'a>(&self, scope: &ReadScope<'a>) -> Result<ReadScope<'a>, ParseError> {
        scope.offset_length(usize::try_from(self.offset)?, usize::try_from(self.length)?)
    }
}

impl ReadFrom for TableRecord {
    type ReadType = (U32Be, U32Be, U32Be, U32Be);

    fn read_from((table_tag, checksum, offset, length): (u32, u32, u32, u32)) -> Self {
        TableRecord {
            table_tag,
            checksum,
            offset,
            length,
        }
    }
}

impl WriteBinary<&Self> for TableRecord {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, record: &TableRecord) -> Result<(), WriteError> {
        ctxt.write_vec::<U32Be, _>(vec![
            record.table_tag,
            record.checksum,
            record.offset,
            record.length,
        ])
    }
}

impl ReadBinary for IndexToLocFormat {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        match ctxt.read_i16be()? {
            0 => Ok(IndexToLocFormat::Short),
            1 => Ok(IndexToLocFormat::Long),
            _ => Err(ParseError::BadValue),
        }
    }
}

impl WriteBinary for IndexToLocFormat {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, format: Self) -> Result<(), WriteError> {
        I16Be::write(ctxt, format as i16)
    }
}

impl ReadFrom for Fixed {
    type ReadType = I32Be;

    fn read_from(value: i32) -> Self {
        Fixed(value)
    }
}

impl WriteBinary for Fixed {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, val: Self) -> Result<(), WriteError> {
        I32Be::write(ctxt, val.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::writer;
    use crate::tests::TestFontBuilder;

    #[test]
    fn test_table_provider() {
        let font_data = TestFontBuilder::new(TestFontBuilder::simple_glyphs(3)).build();
        let font = ReadScope::new(&font_data).read::<OpenTypeFont<'_>>().unwrap();
        assert!(!font.is_collection());
        let provider = font.table_provider(0).unwrap();

        assert_eq!(provider.sfnt_version(), TTF_MAGIC);
        assert!(provider.has_table(tag::GLYF));
        assert!(!provider.has_table(tag::CFF));
        let head = provider.read_table_data(tag::HEAD).unwrap();
        assert_eq!(head.len(), 54);
        assert_eq!(provider.table_data(tag::CFF), Ok(None));
        assert_eq!(
            provider.read_table_data(tag::CFF).unwrap_err(),
            ParseError::MissingTable(tag::CFF)
        );
    }

    #[test]
    fn test_table_record_out_of_bounds() {
        let mut font_data = TestFontBuilder::new(TestFontBuilder::simple_glyphs(3)).build();
        // Push the length of the first table record far past the end of the data
        writer::patch_u32(&mut font_data, 12 + 12, 0x00FF_FFFF);
        let font = ReadScope::new(&font_data).read::<OpenTypeFont<'_>>().unwrap();
        assert!(font.table_provider(0).is_err());
    }

    #[test]
    fn test_collection_faces() {
        let fonts = [
            TestFontBuilder::new(TestFontBuilder::simple_glyphs(2)),
            TestFontBuilder::new(TestFontBuilder::simple_glyphs(3)).short_loca(),
        ];
        let data = TestFontBuilder::collection(&fonts);
        let font = ReadScope::new(&data).read::<OpenTypeFont<'_>>().unwrap();
        assert!(font.is_collection());

        let provider = font.table_provider(1).unwrap();
        let maxp = ReadScope::new(&provider.read_table_data(tag::MAXP).unwrap())
            .read::<MaxpTable>()
            .unwrap();
        assert_eq!(maxp.num_glyphs, 3);
        assert_eq!(
            font.table_provider(2).err(),
            Some(ParseError::BadIndex)
        );
    }

    #[test]
    fn test_unknown_sfnt_version() {
        let data = [0x12, 0x34, 0x56, 0x78, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            ReadScope::new(&data).read::<OpenTypeFont<'_>>().err(),
            Some(ParseError::BadVersion)
        );
    }

    #[test]
    fn test_write_table_record() {
        let record = TableRecord {
            table_tag: tag::HEAD,
            checksum: 1,
            offset: 0x100,
            length: 54,
        };
        let mut ctxt = crate::binary::write::WriteBuffer::new();
        TableRecord::write(&mut ctxt, &record).unwrap();
        let bytes = ctxt.into_inner();
        assert_eq!(&bytes[..4], b"head");
        assert_eq!(ReadScope::new(&bytes).read::<TableRecord>(), Ok(record));
    }
}
