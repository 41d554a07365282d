//! `hhea` horizontal header.
//!
//! > This table contains information for horizontal layout.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/hhea>

use crate::binary::read::{ReadBinary, ReadCtxt};
use crate::binary::write::{WriteBinary, WriteContext};
use crate::binary::{I16Be, U16Be};
use crate::error::{ParseError, WriteError};
use crate::size;

/// Version 1.0, the only one there is.
const VERSION: (u16, u16) = (1, 0);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HheaTable {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
    /// Rise and run of the caret slope, 1 and 0 for upright text.
    pub caret_slope: (i16, i16),
    pub caret_offset: i16,
    /// Number of full `LongHorMetric` records at the start of `hmtx`.
    pub num_h_metrics: u16,
}

impl ReadBinary for HheaTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let (major, _minor) = ctxt.read::<(U16Be, U16Be)>()?;
        ctxt.check_version(major == VERSION.0)?;
        let (ascender, descender, line_gap) = ctxt.read::<(I16Be, I16Be, I16Be)>()?;
        let (advance_width_max, min_left_side_bearing, min_right_side_bearing, x_max_extent) =
            ctxt.read::<(U16Be, I16Be, I16Be, I16Be)>()?;
        let (rise, run, caret_offset) = ctxt.read::<(I16Be, I16Be, I16Be)>()?;
        ctxt.skip(4 * size::I16)?; // reserved
        let (metric_data_format, num_h_metrics) = ctxt.read::<(I16Be, U16Be)>()?;
        ctxt.check(metric_data_format == 0)?;

        Ok(HheaTable {
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope: (rise, run),
            caret_offset,
            num_h_metrics,
        })
    }
}

impl WriteBinary<&Self> for HheaTable {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, hhea: &HheaTable) -> Result<(), WriteError> {
        ctxt.write_vec::<U16Be, _>(vec![VERSION.0, VERSION.1])?;
        ctxt.write_vec::<I16Be, _>(vec![hhea.ascender, hhea.descender, hhea.line_gap])?;
        U16Be::write(ctxt, hhea.advance_width_max)?;
        let (rise, run) = hhea.caret_slope;
        ctxt.write_vec::<I16Be, _>(vec![
            hhea.min_left_side_bearing,
            hhea.min_right_side_bearing,
            hhea.x_max_extent,
            rise,
            run,
            hhea.caret_offset,
        ])?;
        // Four reserved fields then metricDataFormat, all zero
        ctxt.write_zeros(5 * size::I16)?;
        U16Be::write(ctxt, hhea.num_h_metrics)
    }
}
