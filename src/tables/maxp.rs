//! `maxp` maximum profile.
//!
//! Fonts with TrueType outlines use version 1.0, which adds limits on glyph complexity to the
//! glyph count of version 0.5.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/maxp>

use crate::binary::read::{ReadBinary, ReadCtxt};
use crate::binary::write::{WriteBinary, WriteContext};
use crate::binary::{U16Be, U32Be};
use crate::error::{ParseError, WriteError};

const VERSION_0_5: u32 = 0x00005000;
const VERSION_1_0: u32 = 0x00010000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaxpTable {
    pub num_glyphs: u16,
    /// Present in version 1.0 tables.
    pub version1_sub_table: Option<MaxpVersion1SubTable>,
}

/// The version 1.0 fields from `maxPoints` through `maxComponentDepth`, in table order.
///
/// Each is an upper bound over all glyphs, so it also holds for any subset of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaxpVersion1SubTable {
    pub limits: [u16; 13],
}

impl ReadBinary for MaxpTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let (version, num_glyphs) = ctxt.read::<(U32Be, U16Be)>()?;
        let version1_sub_table = match version {
            VERSION_1_0 => Some(ctxt.read::<MaxpVersion1SubTable>()?),
            _ => None,
        };

        Ok(MaxpTable {
            num_glyphs,
            version1_sub_table,
        })
    }
}

impl WriteBinary<&Self> for MaxpTable {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, maxp: &MaxpTable) -> Result<(), WriteError> {
        match &maxp.version1_sub_table {
            Some(sub_table) => {
                U32Be::write(ctxt, VERSION_1_0)?;
                U16Be::write(ctxt, maxp.num_glyphs)?;
                ctxt.write_iter::<U16Be, _>(sub_table.limits.iter().copied())
            }
            None => {
                U32Be::write(ctxt, VERSION_0_5)?;
                U16Be::write(ctxt, maxp.num_glyphs)
            }
        }
    }
}

impl ReadBinary for MaxpVersion1SubTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let mut limits = [0; 13];
        let values = ctxt.read_array::<U16Be>(limits.len())?;
        for (limit, value) in limits.iter_mut().zip(values.iter()) {
            *limit = value;
        }

        Ok(MaxpVersion1SubTable { limits })
    }
}
