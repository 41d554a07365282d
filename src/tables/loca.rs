//! Glyph locations of the `loca` table, byte offsets into `glyf`.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/loca>
//!
//! Both offset sizes are read. Subset fonts are always written with long offsets.

use itertools::Either;

use crate::binary::read::{ReadArray, ReadBinaryDep, ReadCtxt};
use crate::binary::{U16Be, U32Be};
use crate::error::ParseError;
use crate::tables::IndexToLocFormat;

/// The `num_glyphs + 1` offsets of a font, glyph `i` spanning offsets `i` and `i + 1`.
#[derive(Clone, Debug)]
pub struct LocaTable<'a> {
    pub offsets: LocaOffsets<'a>,
}

/// Glyph offsets as stored in the font. Short offsets are half the byte offset.
#[derive(Clone, Debug)]
pub enum LocaOffsets<'a> {
    Short(ReadArray<'a, U16Be>),
    Long(ReadArray<'a, U32Be>),
}

impl ReadBinaryDep for LocaTable<'_> {
    type Args<'a> = (u16, IndexToLocFormat);
    type HostType<'a> = LocaTable<'a>;

    /// Read the `num_glyphs + 1` offsets of a font with `num_glyphs` glyphs, in the size given
    /// by `head.indexToLocFormat`.
    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        (num_glyphs, index_to_loc_format): (u16, IndexToLocFormat),
    ) -> Result<Self::HostType<'a>, ParseError> {
        let count = usize::from(num_glyphs) + 1;
        let offsets = match index_to_loc_format {
            IndexToLocFormat::Short => LocaOffsets::Short(ctxt.read_array(count)?),
            IndexToLocFormat::Long => LocaOffsets::Long(ctxt.read_array(count)?),
        };

        Ok(LocaTable { offsets })
    }
}

impl<'a> LocaOffsets<'a> {
    /// Iterate the offsets in bytes.
    pub fn iter(&self) -> impl Iterator<Item = u32> + 'a {
        match self {
            LocaOffsets::Short(halves) => Either::Left(halves.iter().map(|half| u32::from(half) * 2)),
            LocaOffsets::Long(offsets) => Either::Right(offsets.iter()),
        }
    }

    /// Number of offsets, one more than the number of glyphs.
    pub fn len(&self) -> usize {
        match self {
            LocaOffsets::Short(halves) => halves.len(),
            LocaOffsets::Long(offsets) => offsets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub mod owned {
    use crate::binary::write::{WriteBinary, WriteContext};
    use crate::binary::U32Be;
    use crate::error::WriteError;

    /// `loca` table of a subset font, offsets in bytes.
    #[derive(Debug, Default, PartialEq, Eq)]
    pub struct LocaTable {
        pub offsets: Vec<u32>,
    }

    impl WriteBinary for LocaTable {
        type Output = ();

        /// Writes long offsets, the `head` table of the font must say so.
        fn write<C: WriteContext>(ctxt: &mut C, loca: LocaTable) -> Result<(), WriteError> {
            ctxt.write_vec::<U32Be, _>(loca.offsets)
        }
    }
}
