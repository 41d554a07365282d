//! `hmtx` horizontal metrics.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx>

use crate::binary::read::{ReadArray, ReadBinaryDep, ReadCtxt, ReadFrom};
use crate::binary::write::{WriteBinary, WriteContext};
use crate::binary::{I16Be, U16Be};
use crate::error::{ParseError, WriteError};

/// `hmtx` table as stored in a font.
///
/// The last advance width applies to every glyph past the end of `h_metrics`. Those glyphs take
/// their left side bearing from `left_side_bearings`.
#[derive(Debug)]
pub struct HmtxTable<'a> {
    pub h_metrics: ReadArray<'a, LongHorMetric>,
    pub left_side_bearings: ReadArray<'a, I16Be>,
}

/// Advance width and left side bearing of one glyph.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct LongHorMetric {
    pub advance_width: u16,
    pub lsb: i16,
}

impl ReadBinaryDep for HmtxTable<'_> {
    /// `numGlyphs` from `maxp` and `numberOfHMetrics` from `hhea`.
    type Args<'a> = (usize, usize);
    type HostType<'a> = HmtxTable<'a>;

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        (num_glyphs, num_h_metrics): (usize, usize),
    ) -> Result<HmtxTable<'a>, ParseError> {
        Ok(HmtxTable {
            h_metrics: ctxt.read_array(num_h_metrics)?,
            left_side_bearings: ctxt.read_array(num_glyphs.saturating_sub(num_h_metrics))?,
        })
    }
}

impl HmtxTable<'_> {
    /// The full metric of `glyph_id`, whichever part of the table holds it.
    pub fn metric(&self, glyph_id: u16) -> Result<LongHorMetric, ParseError> {
        let index = usize::from(glyph_id);
        match index.checked_sub(self.h_metrics.len()) {
            None => self.h_metrics.get_item(index).ok_or(ParseError::BadIndex),
            Some(lsb_index) => {
                let advance_width = self
                    .h_metrics
                    .last()
                    .map(|metric| metric.advance_width)
                    .ok_or(ParseError::BadIndex)?;
                let lsb = self
                    .left_side_bearings
                    .get_item(lsb_index)
                    .ok_or(ParseError::BadIndex)?;
                Ok(LongHorMetric { advance_width, lsb })
            }
        }
    }
}

impl ReadFrom for LongHorMetric {
    type ReadType = (U16Be, I16Be);

    fn read_from((advance_width, lsb): (u16, i16)) -> Self {
        LongHorMetric { advance_width, lsb }
    }
}

impl WriteBinary for LongHorMetric {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, metric: LongHorMetric) -> Result<(), WriteError> {
        U16Be::write(ctxt, metric.advance_width)?;
        I16Be::write(ctxt, metric.lsb)
    }
}

pub mod owned {
    use super::LongHorMetric;
    use crate::binary::write::{WriteBinary, WriteContext};
    use crate::error::WriteError;

    /// `hmtx` table holding one full metric per glyph, so `numberOfHMetrics` is the glyph count.
    #[derive(Debug, Default)]
    pub struct HmtxTable {
        pub h_metrics: Vec<LongHorMetric>,
    }

    impl WriteBinary<&Self> for HmtxTable {
        type Output = ();

        fn write<C: WriteContext>(ctxt: &mut C, hmtx: &HmtxTable) -> Result<(), WriteError> {
            ctxt.write_iter::<LongHorMetric, _>(hmtx.h_metrics.iter().copied())
        }
    }
}
