//! Glyph data of the `glyf` table.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/glyf>
//!
//! Glyph outlines are never decoded. Records are kept as raw byte ranges and only composite
//! glyphs are walked, far enough to find the glyphs they reference.

mod subset;

use std::convert::TryFrom;

use bitflags::bitflags;
use itertools::Itertools;

use crate::binary::read::{ReadBinary, ReadBinaryDep, ReadCtxt, ReadFrom, ReadScope};
use crate::binary::write::{WriteBinary, WriteContext};
use crate::binary::{I16Be, U16Be};
use crate::error::{ParseError, WriteError};
use crate::size;
use crate::tables::loca::{owned, LocaTable};

pub use subset::{SubsetGlyf, SubsetGlyph};

bitflags! {
    /// Flags of one component of a composite glyph.
    ///
    /// Only the flags that determine the size of a component are named. Other bits are kept
    /// as read.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct CompositeGlyphFlag: u16 {
        /// The two arguments are 16-bit, otherwise 8-bit.
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        /// The arguments are an x, y offset rather than point numbers.
        const ARGS_ARE_XY_VALUES = 0x0002;
        /// One F2Dot14 scale follows the arguments.
        const WE_HAVE_A_SCALE = 0x0008;
        /// Another component follows this one.
        const MORE_COMPONENTS = 0x0020;
        /// Separate x and y F2Dot14 scales follow the arguments.
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        /// A 2x2 F2Dot14 matrix follows the arguments.
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        /// Instructions for the whole glyph follow the last component.
        const WE_HAVE_INSTRUCTIONS = 0x0100;
    }
}

/// Size of the glyph header: number of contours and bounding box.
const GLYPH_HEADER_SIZE: usize = 5 * size::I16;

/// One record per glyph, in glyph id order.
#[derive(Debug, PartialEq)]
pub struct GlyfTable<'a> {
    pub records: Vec<GlyfRecord<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum GlyfRecord<'a> {
    Empty,
    /// Glyph data exactly as it appears in the source font.
    Present {
        number_of_contours: i16,
        scope: ReadScope<'a>,
    },
    /// A composite glyph whose component glyph ids have been rewritten.
    Remapped {
        number_of_contours: i16,
        data: Vec<u8>,
    },
}

/// A reference from a composite glyph to one of its components.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct CompositeGlyphComponent {
    pub flags: CompositeGlyphFlag,
    pub glyph_index: u16,
    /// Offset of the `glyph_index` field from the start of the glyph record.
    pub glyph_index_offset: usize,
}

/// The components of a composite glyph.
///
/// Arguments and transforms are skipped over, only the referenced glyphs are kept.
#[derive(Debug, PartialEq, Clone)]
pub struct CompositeGlyph<'a> {
    pub components: Vec<CompositeGlyphComponent>,
    pub instructions: &'a [u8],
}

impl ReadBinaryDep for GlyfTable<'_> {
    type Args<'a> = &'a LocaTable<'a>;
    type HostType<'a> = GlyfTable<'a>;

    /// Split the `glyf` table into records using the offsets in `loca`.
    ///
    /// Offsets must be non-decreasing and lie within the table.
    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        loca: Self::Args<'a>,
    ) -> Result<Self::HostType<'a>, ParseError> {
        if loca.offsets.len() < 2 {
            return Err(ParseError::BadIndex);
        }

        let scope = ctxt.scope();
        let records = loca
            .offsets
            .iter()
            .tuple_windows()
            .map(|(start, end)| match end.checked_sub(start) {
                Some(0) => Ok(GlyfRecord::Empty),
                Some(length) => {
                    let offset = usize::try_from(start)?;
                    let scope = scope.offset_length(offset, usize::try_from(length)?)?;
                    let number_of_contours = scope.read::<I16Be>()?;
                    Ok(GlyfRecord::Present {
                        number_of_contours,
                        scope,
                    })
                }
                None => Err(ParseError::BadOffset),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GlyfTable { records })
    }
}

impl<'a> WriteBinary for GlyfTable<'a> {
    type Output = owned::LocaTable;

    /// Write the records back to back, returning the long `loca` offsets that locate them.
    fn write<C: WriteContext>(ctxt: &mut C, table: GlyfTable<'a>) -> Result<Self::Output, WriteError> {
        let start = ctxt.bytes_written();
        let mut offsets = Vec::with_capacity(table.records.len() + 1);
        offsets.push(0);
        for record in table.records {
            ctxt.write_bytes(record.data())?;
            offsets.push(u32::try_from(ctxt.bytes_written() - start)?);
        }

        Ok(owned::LocaTable { offsets })
    }
}

impl<'a> GlyfRecord<'a> {
    pub fn number_of_contours(&self) -> i16 {
        match self {
            GlyfRecord::Empty => 0,
            GlyfRecord::Present {
                number_of_contours, ..
            }
            | GlyfRecord::Remapped {
                number_of_contours, ..
            } => *number_of_contours,
        }
    }

    /// Composite glyphs are marked by a negative number of contours.
    pub fn is_composite(&self) -> bool {
        self.number_of_contours() < 0
    }

    /// The raw bytes of this record.
    pub fn data(&self) -> &[u8] {
        match self {
            GlyfRecord::Empty => &[],
            GlyfRecord::Present { scope, .. } => scope.data(),
            GlyfRecord::Remapped { data, .. } => data,
        }
    }

    /// Walk the components of a composite glyph.
    ///
    /// Returns `None` for empty and simple glyphs.
    pub fn composite(&self) -> Result<Option<CompositeGlyph<'_>>, ParseError> {
        if self.is_composite() {
            ReadScope::new(self.data()).read::<CompositeGlyph<'_>>().map(Some)
        } else {
            Ok(None)
        }
    }
}

impl ReadBinary for CompositeGlyph<'_> {
    type HostType<'a> = CompositeGlyph<'a>;

    /// Read the component list of a composite glyph, `ctxt` positioned at the start of the
    /// glyph record.
    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let number_of_contours = ctxt.read_i16be()?;
        ctxt.check(number_of_contours < 0)?;
        ctxt.skip(GLYPH_HEADER_SIZE - size::I16)?; // bounding box

        let mut components = Vec::<CompositeGlyphComponent>::new();
        let mut more = true;
        while more {
            let flags = ctxt.read::<CompositeGlyphFlag>()?;
            let glyph_index_offset = ctxt.position();
            let glyph_index = ctxt.read_u16be()?;
            ctxt.skip(flags.arguments_size() + flags.transform_size())?;
            components.push(CompositeGlyphComponent {
                flags,
                glyph_index,
                glyph_index_offset,
            });
            more = flags.contains(CompositeGlyphFlag::MORE_COMPONENTS);
        }

        // Any component may carry the flag, the instructions follow the last one
        let instructions = if components
            .iter()
            .any(|component| component.flags.contains(CompositeGlyphFlag::WE_HAVE_INSTRUCTIONS))
        {
            let length = ctxt.read_u16be()?;
            ctxt.read_slice(usize::from(length))?
        } else {
            &[]
        };

        Ok(CompositeGlyph {
            components,
            instructions,
        })
    }
}

impl ReadFrom for CompositeGlyphFlag {
    type ReadType = U16Be;

    fn read_from(flag: u16) -> Self {
        CompositeGlyphFlag::from_bits_retain(flag)
    }
}

impl CompositeGlyphFlag {
    /// Number of bytes taken by the two component arguments.
    pub fn arguments_size(self) -> usize {
        if self.contains(Self::ARG_1_AND_2_ARE_WORDS) {
            2 * size::U16
        } else {
            2 * size::U8
        }
    }

    /// Number of bytes taken by the optional transform, in F2Dot14 values.
    pub fn transform_size(self) -> usize {
        // A single scale takes precedence when several transform flags are set
        let values = if self.contains(Self::WE_HAVE_A_SCALE) {
            1
        } else if self.contains(Self::WE_HAVE_AN_X_AND_Y_SCALE) {
            2
        } else if self.contains(Self::WE_HAVE_A_TWO_BY_TWO) {
            4
        } else {
            0
        };
        values * size::U16
    }
}
