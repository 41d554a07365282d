//! The `head` font header.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/head>

use crate::binary::read::{ReadBinary, ReadCtxt, ReadFrom};
use crate::binary::write::{Placeholder, WriteBinary, WriteContext};
use crate::binary::{I16Be, I64Be, U16Be, U32Be};
use crate::error::{ParseError, WriteError};
use crate::tables::{Fixed, IndexToLocFormat};

/// Value of the `magicNumber` field.
pub const HEAD_MAGIC: u32 = 0x5F0F3CF5;

/// Seconds since 12:00 midnight, January 1, 1904.
pub type LongDateTime = i64;

/// `head` table
///
/// `magicNumber` is checked when reading and written as `HEAD_MAGIC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeadTable {
    /// Major and minor version.
    pub version: (u16, u16),
    pub font_revision: Fixed,
    pub check_sum_adjustment: u32,
    pub flags: u16,
    pub units_per_em: u16,
    pub created: LongDateTime,
    pub modified: LongDateTime,
    /// Union of the bounding boxes of every glyph.
    pub bounding_box: BoundingBox,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    pub index_to_loc_format: IndexToLocFormat,
    pub glyph_data_format: i16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

impl ReadBinary for HeadTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let version = ctxt.read::<(U16Be, U16Be)>()?;
        let font_revision = ctxt.read::<Fixed>()?;
        let (check_sum_adjustment, magic) = ctxt.read::<(U32Be, U32Be)>()?;
        ctxt.check(magic == HEAD_MAGIC)?;
        let (flags, units_per_em) = ctxt.read::<(U16Be, U16Be)>()?;
        let (created, modified) = ctxt.read::<(I64Be, I64Be)>()?;
        let bounding_box = ctxt.read::<BoundingBox>()?;
        let (mac_style, lowest_rec_ppem, font_direction_hint) =
            ctxt.read::<(U16Be, U16Be, I16Be)>()?;
        let index_to_loc_format = ctxt.read::<IndexToLocFormat>()?;
        let glyph_data_format = ctxt.read_i16be()?;

        Ok(HeadTable {
            version,
            font_revision,
            check_sum_adjustment,
            flags,
            units_per_em,
            created,
            modified,
            bounding_box,
            mac_style,
            lowest_rec_ppem,
            font_direction_hint,
            index_to_loc_format,
            glyph_data_format,
        })
    }
}

impl WriteBinary<&Self> for HeadTable {
    type Output = Placeholder<U32Be, u32>;

    /// The `checkSumAdjustment` field is left zeroed. The returned placeholder fills it in
    /// once the whole font has been written.
    fn write<C: WriteContext>(ctxt: &mut C, head: &HeadTable) -> Result<Self::Output, WriteError> {
        let (major, minor) = head.version;
        ctxt.write_vec::<U16Be, _>(vec![major, minor])?;
        Fixed::write(ctxt, head.font_revision)?;
        let check_sum_adjustment = ctxt.placeholder()?;
        U32Be::write(ctxt, HEAD_MAGIC)?;
        ctxt.write_vec::<U16Be, _>(vec![head.flags, head.units_per_em])?;
        ctxt.write_vec::<I64Be, _>(vec![head.created, head.modified])?;
        BoundingBox::write(ctxt, head.bounding_box)?;
        ctxt.write_vec::<U16Be, _>(vec![head.mac_style, head.lowest_rec_ppem])?;
        I16Be::write(ctxt, head.font_direction_hint)?;
        IndexToLocFormat::write(ctxt, head.index_to_loc_format)?;
        I16Be::write(ctxt, head.glyph_data_format)?;

        Ok(check_sum_adjustment)
    }
}

impl ReadFrom for BoundingBox {
    type ReadType = (I16Be, I16Be, I16Be, I16Be);

    fn read_from((x_min, y_min, x_max, y_max): (i16, i16, i16, i16)) -> Self {
        BoundingBox {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }
}

impl WriteBinary for BoundingBox {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, bbox: BoundingBox) -> Result<(), WriteError> {
        ctxt.write_vec::<I16Be, _>(vec![bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max])
    }
}
