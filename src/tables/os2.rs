//! Parsing and writing of the `OS/2` table.
//!
//! The table grew with each version. The version field decides which of the optional records
//! follow the version 0 fields, except that a version 0 table may end after `usLastCharIndex`.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/os2>

use crate::binary::read::{ReadBinary, ReadCtxt, ReadFrom};
use crate::binary::write::{WriteBinary, WriteContext};
use crate::binary::{I16Be, U16Be, U32Be};
use crate::error::{ParseError, WriteError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Os2 {
    pub version: u16,
    pub x_avg_char_width: i16,
    pub us_weight_class: u16,
    pub us_width_class: u16,
    pub fs_type: u16,
    pub subscript: ScriptMetrics,
    pub superscript: ScriptMetrics,
    /// Strikeout size and position.
    pub strikeout: (i16, i16),
    pub s_family_class: i16,
    pub panose: [u8; 10],
    pub ul_unicode_range: [u32; 4],
    pub ach_vend_id: u32,
    pub fs_selection: u16,
    pub us_first_char_index: u16,
    pub us_last_char_index: u16,
    /// `None` only for a version 0 table that ends after `usLastCharIndex`.
    pub version0: Option<Version0>,
    pub version1: Option<Version1>,
    pub version2to4: Option<Version2to4>,
    pub version5: Option<Version5>,
}

/// Size and offset of sub- or superscript glyphs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScriptMetrics {
    pub x_size: i16,
    pub y_size: i16,
    pub x_offset: i16,
    pub y_offset: i16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Version0 {
    pub s_typo_ascender: i16,
    pub s_typo_descender: i16,
    pub s_typo_line_gap: i16,
    pub us_win_ascent: u16,
    pub us_win_descent: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Version1 {
    pub ul_code_page_range: [u32; 2],
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Version2to4 {
    pub sx_height: i16,
    pub s_cap_height: i16,
    pub us_default_char: u16,
    pub us_break_char: u16,
    pub us_max_context: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Version5 {
    pub us_lower_optical_point_size: u16,
    pub us_upper_optical_point_size: u16,
}

impl ReadBinary for Os2 {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let (version, x_avg_char_width, us_weight_class) = ctxt.read::<(U16Be, I16Be, U16Be)>()?;
        let (us_width_class, fs_type) = ctxt.read::<(U16Be, U16Be)>()?;
        let subscript = ctxt.read::<ScriptMetrics>()?;
        let superscript = ctxt.read::<ScriptMetrics>()?;
        let strikeout = ctxt.read::<(I16Be, I16Be)>()?;
        let s_family_class = ctxt.read_i16be()?;
        let mut panose = [0; 10];
        let panose_len = panose.len();
        panose.copy_from_slice(ctxt.read_slice(panose_len)?);
        let (r1, r2, r3, r4) = ctxt.read::<(U32Be, U32Be, U32Be, U32Be)>()?;
        let (ach_vend_id, fs_selection) = ctxt.read::<(U32Be, U16Be)>()?;
        let (us_first_char_index, us_last_char_index) = ctxt.read::<(U16Be, U16Be)>()?;

        let version0 = match version {
            0 if !ctxt.bytes_available() => None,
            _ => Some(ctxt.read::<Version0>()?),
        };
        let version1 = read_from_version::<Version1>(ctxt, version >= 1)?;
        let version2to4 = read_from_version::<Version2to4>(ctxt, version >= 2)?;
        let version5 = read_from_version::<Version5>(ctxt, version >= 5)?;

        Ok(Os2 {
            version,
            x_avg_char_width,
            us_weight_class,
            us_width_class,
            fs_type,
            subscript,
            superscript,
            strikeout,
            s_family_class,
            panose,
            ul_unicode_range: [r1, r2, r3, r4],
            ach_vend_id,
            fs_selection,
            us_first_char_index,
            us_last_char_index,
            version0,
            version1,
            version2to4,
            version5,
        })
    }
}

fn read_from_version<T: ReadFrom>(
    ctxt: &mut ReadCtxt<'_>,
    present: bool,
) -> Result<Option<T>, ParseError> {
    present.then(|| ctxt.read::<T>()).transpose()
}

impl WriteBinary<&Self> for Os2 {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, os2: &Os2) -> Result<(), WriteError> {
        U16Be::write(ctxt, os2.version)?;
        I16Be::write(ctxt, os2.x_avg_char_width)?;
        ctxt.write_vec::<U16Be, _>(vec![os2.us_weight_class, os2.us_width_class, os2.fs_type])?;
        ScriptMetrics::write(ctxt, os2.subscript)?;
        ScriptMetrics::write(ctxt, os2.superscript)?;
        let (strikeout_size, strikeout_position) = os2.strikeout;
        ctxt.write_vec::<I16Be, _>(vec![strikeout_size, strikeout_position, os2.s_family_class])?;
        ctxt.write_bytes(&os2.panose)?;
        ctxt.write_iter::<U32Be, _>(os2.ul_unicode_range.iter().copied())?;
        U32Be::write(ctxt, os2.ach_vend_id)?;
        ctxt.write_vec::<U16Be, _>(vec![
            os2.fs_selection,
            os2.us_first_char_index,
            os2.us_last_char_index,
        ])?;

        if let Some(version0) = os2.version0 {
            Version0::write(ctxt, version0)?;
        }
        if let Some(version1) = os2.version1 {
            ctxt.write_iter::<U32Be, _>(version1.ul_code_page_range.iter().copied())?;
        }
        if let Some(version2to4) = os2.version2to4 {
            Version2to4::write(ctxt, version2to4)?;
        }
        if let Some(version5) = os2.version5 {
            ctxt.write_vec::<U16Be, _>(vec![
                version5.us_lower_optical_point_size,
                version5.us_upper_optical_point_size,
            ])?;
        }

        Ok(())
    }
}

impl Os2 {
    /// Record the range of character codes mapped by the font.
    ///
    /// The fields are 16-bit so codes beyond the BMP are clamped to 0xFFFF.
    pub fn set_char_range(&mut self, first: u32, last: u32) {
        self.us_first_char_index = u16::try_from(first).unwrap_or(u16::MAX);
        self.us_last_char_index = u16::try_from(last).unwrap_or(u16::MAX);
    }
}

impl ReadFrom for ScriptMetrics {
    type ReadType = (I16Be, I16Be, I16Be, I16Be);

    fn read_from((x_size, y_size, x_offset, y_offset): (i16, i16, i16, i16)) -> Self {
        ScriptMetrics {
            x_size,
            y_size,
            x_offset,
            y_offset,
        }
    }
}

impl WriteBinary for ScriptMetrics {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, metrics: ScriptMetrics) -> Result<(), WriteError> {
        ctxt.write_vec::<I16Be, _>(vec![
            metrics.x_size,
            metrics.y_size,
            metrics.x_offset,
            metrics.y_offset,
        ])
    }
}

impl ReadFrom for Version0 {
    type ReadType = ((I16Be, I16Be, I16Be), (U16Be, U16Be));

    fn read_from(
        ((s_typo_ascender, s_typo_descender, s_typo_line_gap), (us_win_ascent, us_win_descent)): (
            (i16, i16, i16),
            (u16, u16),
        ),
    ) -> Self {
        Version0 {
            s_typo_ascender,
            s_typo_descender,
            s_typo_line_gap,
            us_win_ascent,
            us_win_descent,
        }
    }
}

impl WriteBinary for Version0 {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, version0: Version0) -> Result<(), WriteError> {
        ctxt.write_vec::<I16Be, _>(vec![
            version0.s_typo_ascender,
            version0.s_typo_descender,
            version0.s_typo_line_gap,
        ])?;
        ctxt.write_vec::<U16Be, _>(vec![version0.us_win_ascent, version0.us_win_descent])
    }
}

impl ReadFrom for Version1 {
    type ReadType = (U32Be, U32Be);

    fn read_from((range1, range2): (u32, u32)) -> Self {
        Version1 {
            ul_code_page_range: [range1, range2],
        }
    }
}

impl ReadFrom for Version2to4 {
    type ReadType = ((I16Be, I16Be), (U16Be, U16Be, U16Be));

    fn read_from(
        ((sx_height, s_cap_height), (us_default_char, us_break_char, us_max_context)): (
            (i16, i16),
            (u16, u16, u16),
        ),
    ) -> Self {
        Version2to4 {
            sx_height,
            s_cap_height,
            us_default_char,
            us_break_char,
            us_max_context,
        }
    }
}

impl WriteBinary for Version2to4 {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, version2to4: Version2to4) -> Result<(), WriteError> {
        ctxt.write_vec::<I16Be, _>(vec![version2to4.sx_height, version2to4.s_cap_height])?;
        ctxt.write_vec::<U16Be, _>(vec![
            version2to4.us_default_char,
            version2to4.us_break_char,
            version2to4.us_max_context,
        ])
    }
}

impl ReadFrom for Version5 {
    type ReadType = (U16Be, U16Be);

    fn read_from((us_lower_optical_point_size, us_upper_optical_point_size): (u16, u16)) -> Self {
        Version5 {
            us_lower_optical_point_size,
            us_upper_optical_point_size,
        }
    }
}
