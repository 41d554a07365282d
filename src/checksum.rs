#![deny(missing_docs)]

//! OpenType table checksums.

use std::num::Wrapping;

use crate::binary::read::ReadScope;
use crate::binary::U32Be;
use crate::error::ParseError;

/// The value the checksum of a whole font file is adjusted to via `head.checkSumAdjustment`.
pub const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

/// Calculate a checksum of `data` according to the OpenType table checksum algorithm
///
/// `data` is treated as if it were zero padded to a multiple of four bytes.
///
/// https://docs.microsoft.com/en-us/typography/opentype/spec/otff#calculating-checksums
pub fn table_checksum(data: &[u8]) -> Result<Wrapping<u32>, ParseError> {
    let words = data.len() / 4;
    let mut ctxt = ReadScope::new(data).ctxt();
    let array = ctxt.read_array::<U32Be>(words)?;
    let sum: Wrapping<u32> = array.iter().map(Wrapping).sum();

    let tail = &data[words * 4..];
    if tail.is_empty() {
        Ok(sum)
    } else {
        let mut last = [0u8; 4];
        last[..tail.len()].copy_from_slice(tail);
        Ok(sum + Wrapping(u32::from_be_bytes(last)))
    }
}

/// Calculate the value for `head.checkSumAdjustment` given the checksum of the whole font
/// computed with the adjustment set to zero.
pub fn checksum_adjustment(font_checksum: Wrapping<u32>) -> u32 {
    (Wrapping(CHECKSUM_MAGIC) - font_checksum).0
}
