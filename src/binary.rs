//! Big-endian primitives shared by every table codec.
//!
//! Larger structures are decoded with the cursor types in [read] and encoded with the
//! [write] contexts. The free functions here read or patch a single value at a byte offset,
//! which is what the subsetter needs when rewriting a few fields of an otherwise verbatim
//! record.

use crate::error::{ParseError, WriteError};

/// Read binary data
pub mod read;

/// Write binary data
pub mod write;

/// Calculate the length required to 32-bit (long) align data of length `len`
///
/// Example:
///
/// ```
/// use ttfsubset::binary::long_align;
///
/// let length = 123;
/// let padded_length = long_align(length);
/// assert_eq!(padded_length, 124);
/// ```
pub const fn long_align(len: usize) -> usize {
    (len + 3) / 4 * 4
}

fn bytes_at<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], ParseError> {
    let end = offset.checked_add(N).ok_or(ParseError::BadOffset)?;
    let bytes = data.get(offset..end).ok_or(ParseError::BadEof)?;
    let mut array = [0; N];
    array.copy_from_slice(bytes);
    Ok(array)
}

fn put_bytes<const N: usize>(
    data: &mut [u8],
    offset: usize,
    bytes: [u8; N],
) -> Result<(), WriteError> {
    let end = offset.checked_add(N).ok_or(WriteError::BadValue)?;
    let dest = data.get_mut(offset..end).ok_or(WriteError::BadValue)?;
    dest.copy_from_slice(&bytes);
    Ok(())
}

/// Read a big-endian `u16` at `offset`.
///
/// ```
/// use ttfsubset::binary::read_u16be;
///
/// assert_eq!(read_u16be(&[0xAB, 0x12, 0x34], 1), Ok(0x1234));
/// assert!(read_u16be(&[0xAB, 0x12], 1).is_err());
/// ```
pub fn read_u16be(data: &[u8], offset: usize) -> Result<u16, ParseError> {
    bytes_at(data, offset).map(u16::from_be_bytes)
}

/// Read a big-endian `i16` at `offset`.
pub fn read_i16be(data: &[u8], offset: usize) -> Result<i16, ParseError> {
    bytes_at(data, offset).map(i16::from_be_bytes)
}

/// Read a big-endian `u32` at `offset`.
pub fn read_u32be(data: &[u8], offset: usize) -> Result<u32, ParseError> {
    bytes_at(data, offset).map(u32::from_be_bytes)
}

/// Read a big-endian `i32` at `offset`.
pub fn read_i32be(data: &[u8], offset: usize) -> Result<i32, ParseError> {
    bytes_at(data, offset).map(i32::from_be_bytes)
}

/// Overwrite the big-endian `u16` at `offset`.
///
/// ```
/// use ttfsubset::binary::write_u16be;
///
/// let mut data = [0u8; 4];
/// write_u16be(&mut data, 2, 0xBEEF).unwrap();
/// assert_eq!(data, [0, 0, 0xBE, 0xEF]);
/// assert!(write_u16be(&mut data, 3, 1).is_err());
/// ```
pub fn write_u16be(data: &mut [u8], offset: usize, value: u16) -> Result<(), WriteError> {
    put_bytes(data, offset, value.to_be_bytes())
}

/// Overwrite the big-endian `i16` at `offset`.
pub fn write_i16be(data: &mut [u8], offset: usize, value: i16) -> Result<(), WriteError> {
    put_bytes(data, offset, value.to_be_bytes())
}

/// Overwrite the big-endian `u32` at `offset`.
pub fn write_u32be(data: &mut [u8], offset: usize, value: u32) -> Result<(), WriteError> {
    put_bytes(data, offset, value.to_be_bytes())
}

/// Overwrite the big-endian `i32` at `offset`.
pub fn write_i32be(data: &mut [u8], offset: usize, value: i32) -> Result<(), WriteError> {
    put_bytes(data, offset, value.to_be_bytes())
}

#[derive(Copy, Clone)]
pub enum U8 {}

#[derive(Copy, Clone)]
pub enum U16Be {}

#[derive(Copy, Clone)]
pub enum I16Be {}

#[derive(Copy, Clone)]
pub enum U32Be {}

#[derive(Copy, Clone)]
pub enum I32Be {}

#[derive(Copy, Clone)]
pub enum I64Be {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_round_values() {
        let mut data = [0u8; 8];
        write_i16be(&mut data, 0, -300).unwrap();
        write_i32be(&mut data, 2, -70_000).unwrap();
        assert_eq!(read_i16be(&data, 0), Ok(-300));
        assert_eq!(read_i32be(&data, 2), Ok(-70_000));
        assert_eq!(read_u16be(&data, 0), Ok(0xFED4));
    }

    #[test]
    fn test_big_endian_layout() {
        let mut data = [0u8; 4];
        write_u32be(&mut data, 0, 0x0001_0000).unwrap();
        assert_eq!(data, [0, 1, 0, 0]);
        assert_eq!(read_u32be(&data, 0), Ok(0x0001_0000));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut data = [0u8; 3];
        assert_eq!(read_u32be(&data, 0), Err(ParseError::BadEof));
        assert_eq!(read_u16be(&data, usize::MAX), Err(ParseError::BadOffset));
        assert_eq!(write_u32be(&mut data, 0, 1), Err(WriteError::BadValue));
        assert_eq!(write_i16be(&mut data, usize::MAX, 1), Err(WriteError::BadValue));
        // Nothing was written by the failed calls
        assert_eq!(data, [0, 0, 0]);
    }
}
