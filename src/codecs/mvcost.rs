//! Motion vector rate estimation.
//!
//! Cost tables are built from a snapshot of the probability context and stay
//! valid only until that context adapts.

use super::*;
use super::coder::{cost_tokens_from_cdf, COST_SHIFT};
use super::models::{NMVComponent, NMVContext};
use super::mvclass::*;

/// Per-decision symbol costs for one component.
#[derive(Clone,Default)]
pub struct ComponentCosts {
    sign:               [u32; 2],
    classes:            [u32; MV_CLASSES],
    class0:             [u32; CLASS0_SIZE],
    bits:               [[u32; 2]; MV_OFFSET_BITS],
    class0_fp:          [[u32; MV_FP_SIZE]; CLASS0_SIZE],
    fp:                 [u32; MV_FP_SIZE],
    class0_fp_split:    [[[u32; 2]; 3]; CLASS0_SIZE],
    fp_split:           [[u32; 2]; 3],
    class0_hp:          [u32; 2],
    hp:                 [u32; 2],
}

impl ComponentCosts {
    pub fn new(model: &NMVComponent) -> Self {
        let mut costs = Self::default();
        cost_tokens_from_cdf(&mut costs.sign, &model.sign_cdf);
        cost_tokens_from_cdf(&mut costs.classes, &model.classes_cdf);
        cost_tokens_from_cdf(&mut costs.class0, &model.class0_cdf);
        for (dst, cdf) in costs.bits.iter_mut().zip(model.bits_cdf.iter()) {
            cost_tokens_from_cdf(dst, cdf);
        }
        for (dst, cdf) in costs.class0_fp.iter_mut().zip(model.class0_fp_cdf.iter()) {
            cost_tokens_from_cdf(dst, cdf);
        }
        cost_tokens_from_cdf(&mut costs.fp, &model.fp_cdf);
        for (dsts, cdfs) in costs.class0_fp_split.iter_mut().zip(model.class0_fp_split_cdf.iter()) {
            for (dst, cdf) in dsts.iter_mut().zip(cdfs.iter()) {
                cost_tokens_from_cdf(dst, cdf);
            }
        }
        for (dst, cdf) in costs.fp_split.iter_mut().zip(model.fp_split_cdf.iter()) {
            cost_tokens_from_cdf(dst, cdf);
        }
        cost_tokens_from_cdf(&mut costs.class0_hp, &model.class0_hp_cdf);
        cost_tokens_from_cdf(&mut costs.hp, &model.hp_cdf);
        costs
    }
    /// Returns cost of coding value `val` for the decision.
    pub fn get(&self, sym: MVCompSym, val: u8) -> u32 {
        let val = usize::from(val);
        match sym {
            MVCompSym::Sign                 => self.sign[val],
            MVCompSym::Class                => self.classes[val],
            MVCompSym::Class0               => self.class0[val],
            MVCompSym::Bit(i)               => self.bits[usize::from(i)][val],
            MVCompSym::Class0Frac(d)        => self.class0_fp[usize::from(d)][val],
            MVCompSym::Frac                 => self.fp[val],
            MVCompSym::Class0FracBit(d, i)  => self.class0_fp_split[usize::from(d)][usize::from(i)][val],
            MVCompSym::FracBit(i)           => self.fp_split[usize::from(i)][val],
            MVCompSym::Class0Hp             => self.class0_hp[val],
            MVCompSym::Hp                   => self.hp[val],
        }
    }
}

/// Rate tables for motion vector differences.
///
/// Component tables are indexed by `MV_MAX + v` for the signed component value `v`.
/// All costs are in `1 / (1 << COST_SHIFT)` bit units.
pub struct MVCostTable {
    joint_costs:    [u32; MV_JOINTS],
    comp_costs:     [Vec<u32>; 2],
    precision:      MVPrecision,
    layout:         FracLayout,
}

impl MVCostTable {
    pub fn new() -> Self {
        Self {
            joint_costs:    [0; MV_JOINTS],
            comp_costs:     [vec![0; MV_VALS], vec![0; MV_VALS]],
            precision:      MVPrecision::default(),
            layout:         FracLayout::default(),
        }
    }
    /// Rebuilds all tables from the current probabilities.
    pub fn build(&mut self, ctx: &NMVContext, precision: MVPrecision, layout: FracLayout) {
        tracing::debug!(%precision, %layout, "rebuilding motion vector cost tables");
        cost_tokens_from_cdf(&mut self.joint_costs, &ctx.joints_cdf);
        for (table, model) in self.comp_costs.iter_mut().zip(ctx.comps.iter()) {
            Self::build_component(table, model, precision, layout);
        }
        self.precision = precision;
        self.layout = layout;
    }
    /// Rebuilds tables for full-pixel displacement vectors.
    pub fn build_dv(&mut self, ctx: &NMVContext) {
        let layout = self.layout;
        self.build(ctx, MVPrecision::FullPel, layout);
    }
    fn build_component(table: &mut [u32], model: &NMVComponent, precision: MVPrecision, layout: FracLayout) {
        let costs = ComponentCosts::new(model);
        let zero = MV_MAX as usize;
        table[zero] = 0;
        for mag in 1..=MV_MAX {
            let cost: u32 = binarize_magnitude(mag, precision, layout).iter()
                    .map(|s| costs.get(s.sym, s.val)).sum();
            let mag = mag as usize;
            table[zero + mag] = cost + costs.sign[0];
            table[zero - mag] = cost + costs.sign[1];
        }
    }
    /// Returns cost of the joint type.
    pub fn joint_cost(&self, joint: MVJoint) -> u32 {
        self.joint_costs[joint as usize]
    }
    /// Returns cost of a signed difference component (0 for row, 1 for column).
    pub fn comp_cost(&self, comp: usize, val: i32) -> EncoderResult<u32> {
        validate!(comp < 2, EncoderError::InvalidParameters);
        validate!(val.unsigned_abs() <= MV_MAX, EncoderError::MVOutOfRange(val));
        Ok(self.comp_costs[comp][(MV_MAX as i32 + val) as usize])
    }
    /// Returns the whole table for a component.
    pub fn comp_costs(&self, comp: usize) -> &[u32] {
        &self.comp_costs[comp]
    }
    /// Returns the full cost of coding the vector difference.
    pub fn mv_cost(&self, diff: MV) -> EncoderResult<u32> {
        let row = self.comp_cost(0, i32::from(diff.y))?;
        let col = self.comp_cost(1, i32::from(diff.x))?;
        Ok(self.joint_cost(MVJoint::from_diff(diff)) + row + col)
    }
    /// Returns weighted rate of coding the vector against its predictor for motion search.
    ///
    /// Both vectors must be valid and their difference codable.
    pub fn mv_bit_cost(&self, mv: MV, ref_mv: MV, weight: u32) -> EncoderResult<u32> {
        validate!(mv.is_valid() && ref_mv.is_valid(), EncoderError::InvalidParameters);
        let cost = self.mv_cost(mv - ref_mv)?;
        Ok((cost * weight + 64) >> 7)
    }
    /// Returns the number of whole bits for coding the difference.
    pub fn mv_bits(&self, diff: MV) -> EncoderResult<u32> {
        Ok((self.mv_cost(diff)? + (1 << (COST_SHIFT - 1))) >> COST_SHIFT)
    }
    pub fn precision(&self) -> MVPrecision { self.precision }
    pub fn layout(&self) -> FracLayout { self.layout }
}

impl Default for MVCostTable {
    fn default() -> Self { Self::new() }
}
