//! Font table tags.

use std::fmt;

/// The tag spelled by four ASCII bytes, first byte most significant.
pub const fn from_bytes(name: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*name)
}

/// Shows a tag as text when its bytes are printable ASCII, as hex otherwise.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct DisplayTag(pub u32);

impl fmt::Display for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.0.to_be_bytes();
        if name.iter().all(|&b| (0x20..0x7F).contains(&b)) {
            name.iter().try_for_each(|&b| write!(f, "{}", char::from(b)))
        } else {
            write!(f, "0x{:08x}", self.0)
        }
    }
}

impl fmt::Debug for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

// Tables the subsetter reads or copies
pub const CMAP: u32 = from_bytes(b"cmap");
pub const CVT: u32 = from_bytes(b"cvt ");
pub const FPGM: u32 = from_bytes(b"fpgm");
pub const GLYF: u32 = from_bytes(b"glyf");
pub const HEAD: u32 = from_bytes(b"head");
pub const HHEA: u32 = from_bytes(b"hhea");
pub const HMTX: u32 = from_bytes(b"hmtx");
pub const LOCA: u32 = from_bytes(b"loca");
pub const MAXP: u32 = from_bytes(b"maxp");
pub const NAME: u32 = from_bytes(b"name");
pub const OS_2: u32 = from_bytes(b"OS/2");
pub const POST: u32 = from_bytes(b"post");
pub const PREP: u32 = from_bytes(b"prep");

// Outline tables of fonts that can't be subset
pub const CFF: u32 = from_bytes(b"CFF ");
pub const CFF2: u32 = from_bytes(b"CFF2");

/// sfnt version of a font with CFF outlines.
pub const OTTO: u32 = from_bytes(b"OTTO");
/// Apple's sfnt version for TrueType outlines.
pub const TRUE: u32 = from_bytes(b"true");
/// Header tag of a TrueType collection.
pub const TTCF: u32 = from_bytes(b"ttcf");
