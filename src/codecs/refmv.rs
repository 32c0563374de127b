use super::*;

/// Reference frame identifiers in AV1 order.
#[derive(Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub enum RefFrame {
    Intra,
    Last,
    Last2,
    Last3,
    Golden,
    BwdRef,
    AltRef2,
    AltRef,
}

pub const REF_FRAMES: usize = 8;
pub const INTER_REFS: usize = REF_FRAMES - 1;
/// Number of distinct single and compound reference combinations.
pub const REF_FRAME_TYPES: usize = REF_FRAMES + INTER_REFS * INTER_REFS;
pub const MAX_REF_MV_STACK_SIZE: usize = 8;

/// Reference frames used by a block.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub struct RefPair {
    pub fwd:    RefFrame,
    /// Second reference for compound prediction.
    pub comp:   Option<RefFrame>,
}

impl RefPair {
    pub fn single(fwd: RefFrame) -> Self { Self { fwd, comp: None } }
    pub fn compound(fwd: RefFrame, bwd: RefFrame) -> Self { Self { fwd, comp: Some(bwd) } }
    pub fn is_compound(&self) -> bool { self.comp.is_some() }
    fn is_valid(&self) -> bool {
        match self.comp {
            Some(bwd) => self.fwd != RefFrame::Intra && bwd != RefFrame::Intra,
            None => true,
        }
    }
    /// Returns index of the candidate stack used for this reference combination.
    pub fn ref_frame_type(&self) -> usize {
        match self.comp {
            Some(bwd) => REF_FRAMES + (self.fwd as usize - 1) * INTER_REFS + (bwd as usize - 1),
            None => self.fwd as usize,
        }
    }
}

/// Candidate motion vector stack entry.
#[derive(Debug,Clone,Copy,Default,PartialEq,Eq)]
pub struct CandidateMV {
    pub this_mv:    MV,
    pub comp_mv:    MV,
    pub weight:     u16,
}

#[derive(Clone,Copy,Default)]
struct RefMVStack {
    cands:  [CandidateMV; MAX_REF_MV_STACK_SIZE],
    count:  usize,
}

/// Inter prediction modes.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum InterMode {
    NearestMV,
    NearMV,
    GlobalMV,
    NewMV,
    NearestNearestMV,
    NearNearMV,
    NearestNewMV,
    NewNearestMV,
    NearNewMV,
    NewNearMV,
    GlobalGlobalMV,
    NewNewMV,
}

impl InterMode {
    /// Reports whether the mode takes its new vector predictor from the next stack entry.
    pub fn skips_nearest(self) -> bool {
        matches!(self, InterMode::NearNewMV | InterMode::NewNearMV)
    }
}

/// Mode information of the block being coded.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct BlockModeInfo {
    pub mode:       InterMode,
    pub refs:       RefPair,
    pub ref_mv_idx: usize,
}

/// Truncates vector components toward zero onto the precision grid.
pub fn lower_mv_precision(mv: MV, precision: MVPrecision) -> MV {
    let step = precision.step();
    MV { x: mv.x - mv.x % step, y: mv.y - mv.y % step }
}

/// Predictor candidates for the current block provided by the caller.
pub struct RefMVContext {
    stacks:     Vec<RefMVStack>,
    global_mvs: [MV; REF_FRAMES],
}

impl RefMVContext {
    pub fn new() -> Self {
        Self {
            stacks:     vec![RefMVStack::default(); REF_FRAME_TYPES],
            global_mvs: [ZERO_MV; REF_FRAMES],
        }
    }
    /// Replaces candidate stack for the reference combination.
    pub fn set_stack(&mut self, refs: RefPair, cands: &[CandidateMV]) -> EncoderResult<()> {
        validate!(refs.is_valid(), EncoderError::InvalidParameters);
        validate!(cands.len() <= MAX_REF_MV_STACK_SIZE, EncoderError::InvalidStackIndex(cands.len()));
        let stack = &mut self.stacks[refs.ref_frame_type()];
        stack.cands = [CandidateMV::default(); MAX_REF_MV_STACK_SIZE];
        stack.cands[..cands.len()].copy_from_slice(cands);
        stack.count = cands.len();
        Ok(())
    }
    pub fn set_global_mv(&mut self, rf: RefFrame, mv: MV) {
        self.global_mvs[rf as usize] = mv;
    }
    /// Drops all candidates and global vectors.
    pub fn clear(&mut self) {
        for stack in self.stacks.iter_mut() {
            stack.count = 0;
        }
        self.global_mvs = [ZERO_MV; REF_FRAMES];
    }
    fn single_ref_mv(&self, rf: RefFrame, ref_mv_idx: usize) -> MV {
        let stack = &self.stacks[rf as usize];
        if ref_mv_idx < stack.count {
            stack.cands[ref_mv_idx].this_mv
        } else {
            self.global_mvs[rf as usize]
        }
    }
    /// Returns predictor for the reference slot `ref_idx` from the stack entry `ref_mv_idx`.
    pub fn get_ref_mv_from_stack(&self, ref_idx: usize, refs: RefPair, ref_mv_idx: usize) -> EncoderResult<MV> {
        validate!(refs.is_valid(), EncoderError::InvalidParameters);
        if refs.is_compound() {
            validate!(ref_idx < 2, EncoderError::InvalidParameters);
            validate!(ref_mv_idx < MAX_REF_MV_STACK_SIZE, EncoderError::InvalidStackIndex(ref_mv_idx));
            let cand = &self.stacks[refs.ref_frame_type()].cands[ref_mv_idx];
            Ok(if ref_idx == 0 { cand.this_mv } else { cand.comp_mv })
        } else {
            validate!(ref_idx == 0, EncoderError::InvalidParameters);
            Ok(self.single_ref_mv(refs.fwd, ref_mv_idx))
        }
    }
    /// Returns predictor for the block according to its prediction mode.
    pub fn get_ref_mv(&self, info: &BlockModeInfo, ref_idx: usize) -> EncoderResult<MV> {
        let mut ref_mv_idx = info.ref_mv_idx;
        if info.mode.skips_nearest() {
            validate!(info.refs.is_compound(), EncoderError::InvalidParameters);
            ref_mv_idx += 1;
        }
        self.get_ref_mv_from_stack(ref_idx, info.refs, ref_mv_idx)
    }
    /// Returns nearest and near single reference predictors lowered to the coding precision.
    pub fn find_best_ref_mvs(&self, precision: MVPrecision, rf: RefFrame) -> (MV, MV) {
        let nearest = lower_mv_precision(self.single_ref_mv(rf, 0), precision);
        let near    = lower_mv_precision(self.single_ref_mv(rf, 1), precision);
        (nearest, near)
    }
}

impl Default for RefMVContext {
    fn default() -> Self { Self::new() }
}
