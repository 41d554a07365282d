//! Error types

use crate::tag::DisplayTag;
use std::collections::TryReserveError;
use std::fmt;

/// Errors that originate when parsing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseError {
    BadEof,
    BadValue,
    BadVersion,
    BadOffset,
    BadIndex,
    MissingTable(u32),
    /// A composite glyph refers back to itself, directly or through other composites.
    CompositeCycle(u16),
}

impl From<std::num::TryFromIntError> for ParseError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        ParseError::BadValue
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadEof => write!(f, "end of data reached unexpectedly"),
            ParseError::BadValue => write!(f, "invalid value"),
            ParseError::BadVersion => write!(f, "unexpected data version"),
            ParseError::BadOffset => write!(f, "invalid data offset"),
            ParseError::BadIndex => write!(f, "invalid data index"),
            ParseError::MissingTable(tag) => {
                write!(f, "font is missing '{}' table", DisplayTag(*tag))
            }
            ParseError::CompositeCycle(glyph_id) => {
                write!(f, "composite glyph {} references itself", glyph_id)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors that originate when writing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum WriteError {
    BadValue,
    PlaceholderMismatch,
}

impl From<std::num::TryFromIntError> for WriteError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        WriteError::BadValue
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::BadValue => write!(f, "write: bad value"),
            WriteError::PlaceholderMismatch => {
                write!(f, "data written to placeholder did not match expected size")
            }
        }
    }
}

impl std::error::Error for WriteError {}

/// Font formats that are recognised but cannot be subset.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum UnsupportedFormat {
    /// The Windows Unicode BMP character map uses a format other than 4.
    CmapFormat(u16),
    /// PostScript (CFF) outlines.
    CffOutlines,
    /// A font collection was supplied but no face was selected.
    FontCollection,
    /// The data does not start with a known sfnt version.
    SfntVersion(u32),
}

impl fmt::Display for UnsupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedFormat::CmapFormat(format) => {
                write!(f, "cmap subtable format {} is not supported", format)
            }
            UnsupportedFormat::CffOutlines => write!(f, "CFF outlines are not supported"),
            UnsupportedFormat::FontCollection => {
                write!(f, "font collection supplied where a single font was expected")
            }
            UnsupportedFormat::SfntVersion(version) => {
                write!(f, "unknown sfnt version 0x{:08X}", version)
            }
        }
    }
}

/// Error returned from subsetting
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum SubsetError {
    /// The font is structurally invalid.
    InvalidFontFile(ParseError),
    /// The font is valid but uses a format the subsetter cannot handle.
    UnsupportedFontFormat(UnsupportedFormat),
    /// The font has no Windows Unicode BMP (3, 1) character map.
    UnsupportedEncoding,
    /// A buffer for the subset font could not be allocated.
    OutOfMemory,
}

impl From<ParseError> for SubsetError {
    fn from(error: ParseError) -> Self {
        SubsetError::InvalidFontFile(error)
    }
}

/// Values written to the subset font are derived from the input, so a value that can't be
/// encoded means the input was malformed.
impl From<WriteError> for SubsetError {
    fn from(_error: WriteError) -> Self {
        SubsetError::InvalidFontFile(ParseError::BadValue)
    }
}

impl From<UnsupportedFormat> for SubsetError {
    fn from(format: UnsupportedFormat) -> Self {
        SubsetError::UnsupportedFontFormat(format)
    }
}

impl From<TryReserveError> for SubsetError {
    fn from(_error: TryReserveError) -> Self {
        SubsetError::OutOfMemory
    }
}

impl From<std::num::TryFromIntError> for SubsetError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        SubsetError::InvalidFontFile(ParseError::BadValue)
    }
}

impl fmt::Display for SubsetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubsetError::InvalidFontFile(err) => write!(f, "invalid font file: {}", err),
            SubsetError::UnsupportedFontFormat(format) => {
                write!(f, "unsupported font format: {}", format)
            }
            SubsetError::UnsupportedEncoding => {
                write!(f, "font has no Windows Unicode BMP character map")
            }
            SubsetError::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for SubsetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubsetError::InvalidFontFile(err) => Some(err),
            _ => None,
        }
    }
}
