#![warn(rust_2018_idioms)]

//! Subsetting of TrueType fonts for embedding in documents.
//!
//! [subset] produces a copy of a font that only contains the glyphs needed to display a set of
//! character codes, along with the glyph and character mappings needed to reference them.

/// Reading and writing of binary data.
pub mod binary;
/// Checksum calculation routines.
pub mod checksum;
pub mod error;
pub mod post;
pub mod size;
/// Font subsetting.
pub mod subset;
pub mod tables;
pub mod tag;
/// Shared test code.
#[cfg(test)]
pub mod tests;

pub use error::{ParseError, SubsetError, UnsupportedFormat, WriteError};
pub use subset::{
    subset, subset_tables, subset_with_lookup, CidSet, GlyphIdRemap, GlyphLookup, SubsetFont,
    SubsetOptions,
};
