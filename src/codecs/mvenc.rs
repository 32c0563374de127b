use super::*;
use super::coder::SymbolWriter;
use super::models::{NMVComponent, NMVContext};
use super::mvclass::*;
use super::mvcost::MVCostTable;
use crate::options::MVCoderOptions;

/// Motion vector difference coding on top of a symbol writer.
///
/// Components are expected to lie on the grid of the coding precision, lower bits are implied by the decoder.
pub trait MVSymbolWriter: SymbolWriter {
    /// Writes one non-zero vector difference component.
    fn encode_mv_component(&mut self, comp: i32, model: &mut NMVComponent, precision: MVPrecision, layout: FracLayout) -> EncoderResult<()> {
        validate!(comp != 0, EncoderError::InvalidParameters);
        let mag = comp.unsigned_abs();
        validate!(mag <= MV_MAX, EncoderError::MVOutOfRange(comp));

        self.write_symbol(usize::from(comp < 0), model.cdf_mut(MVCompSym::Sign), 2)?;
        for sym in binarize_magnitude(mag, precision, layout).iter() {
            self.write_symbol(usize::from(sym.val), model.cdf_mut(sym.sym), sym.sym.nsyms())?;
        }
        Ok(())
    }
    /// Writes joint type followed by the non-zero components (row first).
    fn encode_mv_diff(&mut self, diff: MV, ctx: &mut NMVContext, precision: MVPrecision, layout: FracLayout) -> EncoderResult<()> {
        let row = i32::from(diff.y);
        let col = i32::from(diff.x);
        validate!(row.unsigned_abs() <= MV_MAX, EncoderError::MVOutOfRange(row));
        validate!(col.unsigned_abs() <= MV_MAX, EncoderError::MVOutOfRange(col));

        let joint = MVJoint::from_diff(diff);
        self.write_symbol(joint as usize, &mut ctx.joints_cdf, MV_JOINTS)?;
        if joint.has_vertical() {
            self.encode_mv_component(row, &mut ctx.comps[0], precision, layout)?;
        }
        if joint.has_horizontal() {
            self.encode_mv_component(col, &mut ctx.comps[1], precision, layout)?;
        }
        Ok(())
    }
}

impl<W: SymbolWriter + ?Sized> MVSymbolWriter for W {}

/// Motion vector encoder state kept between blocks.
pub struct MVEncoder {
    /// Precision of vectors coded with [`MVEncoder::encode_mv`].
    pub precision:          MVPrecision,
    pub layout:             FracLayout,
    /// Track the largest coded vector for adaptive search step selection.
    pub auto_step_size:     bool,
    max_mv_magnitude:       u32,
}

impl MVEncoder {
    pub fn new(opts: &MVCoderOptions) -> Self {
        Self {
            precision:          opts.precision,
            layout:             opts.layout,
            auto_step_size:     opts.auto_mv_step,
            max_mv_magnitude:   0,
        }
    }
    /// Codes the difference between actual vector and its predictor.
    pub fn encode_mv<W: SymbolWriter + ?Sized>(&mut self, w: &mut W, mv: MV, ref_mv: MV, ctx: &mut NMVContext) -> EncoderResult<()> {
        validate!(mv.is_valid() && ref_mv.is_valid(), EncoderError::InvalidParameters);
        w.encode_mv_diff(mv - ref_mv, ctx, self.precision, self.layout)?;

        if self.auto_step_size {
            let maxv = (i32::from(mv.x).unsigned_abs()).max(i32::from(mv.y).unsigned_abs()) >> 3;
            if maxv > self.max_mv_magnitude {
                tracing::trace!("max vector magnitude {} -> {}", self.max_mv_magnitude, maxv);
                self.max_mv_magnitude = maxv;
            }
        }
        Ok(())
    }
    /// Codes full-pixel displacement vector (intra block copy) difference.
    pub fn encode_dv<W: SymbolWriter + ?Sized>(&mut self, w: &mut W, dv: MV, ref_dv: MV, ctx: &mut NMVContext) -> EncoderResult<()> {
        validate!(dv.is_fullpel() && ref_dv.is_fullpel(), EncoderError::SubpelInFullPel);
        validate!(dv.is_valid() && ref_dv.is_valid(), EncoderError::InvalidParameters);
        w.encode_mv_diff(dv - ref_dv, ctx, MVPrecision::FullPel, self.layout)
    }
    /// Rebuilds rate tables for the vectors this encoder codes.
    pub fn build_costs(&self, tab: &mut MVCostTable, ctx: &NMVContext) {
        tab.build(ctx, self.precision, self.layout);
    }
    /// Returns the largest coded vector component in full pixels.
    pub fn max_mv_magnitude(&self) -> u32 { self.max_mv_magnitude }
    pub fn reset_max_mv_magnitude(&mut self) { self.max_mv_magnitude = 0; }
}
