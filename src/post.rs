//! `post` table parsing and writing.
//!
//! Only the 32 byte header is read. Whatever follows it, such as the glyph names of version 2,
//! describes the glyphs of the source font and is dropped, so any version is accepted.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/post>

use crate::binary::read::{ReadBinary, ReadCtxt};
use crate::binary::write::{WriteBinary, WriteContext};
use crate::binary::{I16Be, I32Be, U32Be};
use crate::error::{ParseError, WriteError};
use crate::size;
use crate::tables::Fixed;

/// Version 3 tables carry no glyph names.
pub const VERSION_3: u32 = 0x00030000;

/// The PostScript header fields that describe the font as a whole.
///
/// The memory usage hints of the header are not kept, they are written as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTable {
    pub version: u32,
    pub italic_angle: Fixed,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: u32,
}

impl ReadBinary for PostTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let version = ctxt.read_u32be()?;
        let italic_angle = ctxt.read::<Fixed>()?;
        let underline_position = ctxt.read_i16be()?;
        let underline_thickness = ctxt.read_i16be()?;
        let is_fixed_pitch = ctxt.read_u32be()?;
        ctxt.skip(4 * size::U32)?; // memory usage hints

        Ok(PostTable {
            version,
            italic_angle,
            underline_position,
            underline_thickness,
            is_fixed_pitch,
        })
    }
}

impl WriteBinary<&Self> for PostTable {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, table: &PostTable) -> Result<(), WriteError> {
        U32Be::write(ctxt, table.version)?;
        Fixed::write(ctxt, table.italic_angle)?;
        I16Be::write(ctxt, table.underline_position)?;
        I16Be::write(ctxt, table.underline_thickness)?;
        U32Be::write(ctxt, table.is_fixed_pitch)?;
        ctxt.write_zeros(4 * size::U32)
    }
}

impl PostTable {
    /// This table relabelled as version 3, which is complete without glyph names.
    pub fn to_version3(&self) -> PostTable {
        PostTable {
            version: VERSION_3,
            ..self.clone()
        }
    }
}
