use super::mvclass::*;

// converts cumulative frequencies into inverse CDF with a trailing zero and adaptation counter
macro_rules! cdf {
    ($($v:expr),+) => { [$(32768 - $v),+, 0, 0] };
}

/// Probability distributions for one vector component.
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct NMVComponent {
    pub sign_cdf:               [u16; 3],
    pub classes_cdf:            [u16; MV_CLASSES + 1],
    pub class0_cdf:             [u16; CLASS0_SIZE + 1],
    pub bits_cdf:               [[u16; 3]; MV_OFFSET_BITS],
    pub class0_fp_cdf:          [[u16; MV_FP_SIZE + 1]; CLASS0_SIZE],
    pub fp_cdf:                 [u16; MV_FP_SIZE + 1],
    /// Coarse fractional bit followed by fine bit for coarse zero and one.
    pub class0_fp_split_cdf:    [[[u16; 3]; 3]; CLASS0_SIZE],
    pub fp_split_cdf:           [[u16; 3]; 3],
    pub class0_hp_cdf:          [u16; 3],
    pub hp_cdf:                 [u16; 3],
}

impl NMVComponent {
    pub fn new() -> Self {
        Self {
            sign_cdf:       cdf!(128 * 128),
            classes_cdf:    cdf!(28672, 30976, 31858, 32320, 32551, 32656, 32740, 32757, 32762, 32767),
            class0_cdf:     cdf!(216 * 128),
            bits_cdf:       [
                cdf!(128 * 136), cdf!(128 * 140), cdf!(128 * 148), cdf!(128 * 160), cdf!(128 * 176),
                cdf!(128 * 192), cdf!(128 * 224), cdf!(128 * 234), cdf!(128 * 234), cdf!(128 * 240)
            ],
            class0_fp_cdf:  [ cdf!(16384, 24576, 26624), cdf!(12288, 21248, 24128) ],
            fp_cdf:         cdf!(8192, 17408, 21248),
            class0_fp_split_cdf: [
                [ cdf!(24576), cdf!(21845), cdf!(8192) ],
                [ cdf!(21248), cdf!(18950), cdf!(8192) ],
            ],
            fp_split_cdf:   [ cdf!(17408), cdf!(15420), cdf!(8192) ],
            class0_hp_cdf:  cdf!(160 * 128),
            hp_cdf:         cdf!(128 * 128),
        }
    }
    /// Returns distribution used for coding the decision.
    pub fn cdf(&self, sym: MVCompSym) -> &[u16] {
        match sym {
            MVCompSym::Sign                 => &self.sign_cdf,
            MVCompSym::Class                => &self.classes_cdf,
            MVCompSym::Class0               => &self.class0_cdf,
            MVCompSym::Bit(i)               => &self.bits_cdf[usize::from(i)],
            MVCompSym::Class0Frac(d)        => &self.class0_fp_cdf[usize::from(d)],
            MVCompSym::Frac                 => &self.fp_cdf,
            MVCompSym::Class0FracBit(d, i)  => &self.class0_fp_split_cdf[usize::from(d)][usize::from(i)],
            MVCompSym::FracBit(i)           => &self.fp_split_cdf[usize::from(i)],
            MVCompSym::Class0Hp             => &self.class0_hp_cdf,
            MVCompSym::Hp                   => &self.hp_cdf,
        }
    }
    pub fn cdf_mut(&mut self, sym: MVCompSym) -> &mut [u16] {
        match sym {
            MVCompSym::Sign                 => &mut self.sign_cdf,
            MVCompSym::Class                => &mut self.classes_cdf,
            MVCompSym::Class0               => &mut self.class0_cdf,
            MVCompSym::Bit(i)               => &mut self.bits_cdf[usize::from(i)],
            MVCompSym::Class0Frac(d)        => &mut self.class0_fp_cdf[usize::from(d)],
            MVCompSym::Frac                 => &mut self.fp_cdf,
            MVCompSym::Class0FracBit(d, i)  => &mut self.class0_fp_split_cdf[usize::from(d)][usize::from(i)],
            MVCompSym::FracBit(i)           => &mut self.fp_split_cdf[usize::from(i)],
            MVCompSym::Class0Hp             => &mut self.class0_hp_cdf,
            MVCompSym::Hp                   => &mut self.hp_cdf,
        }
    }
}

impl Default for NMVComponent {
    fn default() -> Self { Self::new() }
}

/// Motion vector probability context.
///
/// Component 0 codes the row (vertical) part of the difference, component 1 the column part.
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct NMVContext {
    pub joints_cdf: [u16; MV_JOINTS + 1],
    pub comps:      [NMVComponent; 2],
}

impl NMVContext {
    pub fn new() -> Self {
        Self {
            joints_cdf: cdf!(4096, 11264, 19328),
            comps:      [NMVComponent::new(); 2],
        }
    }
    /// Restores default distributions.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for NMVContext {
    fn default() -> Self { Self::new() }
}
