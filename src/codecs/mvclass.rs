//! Motion vector component binarisation.
//!
//! A component magnitude is split into a class, integer offset bits, two
//! fractional bits and a high precision bit. The resulting list of decisions
//! is produced here once and consumed both by the coder and by the cost
//! estimator, so the two can never disagree on the bitstream layout.

use super::{FracLayout, MVPrecision};

pub const MV_JOINTS:        usize = 4;
pub const MV_CLASSES:       usize = 11;
pub const CLASS0_BITS:      usize = 1;
pub const CLASS0_SIZE:      usize = 1 << CLASS0_BITS;
pub const MV_OFFSET_BITS:   usize = MV_CLASSES + CLASS0_BITS - 2;
pub const MV_FP_SIZE:       usize = 4;
pub const MV_MAX_BITS:      usize = MV_CLASSES + CLASS0_BITS + 2;
/// Largest codable component magnitude.
pub const MV_MAX:           u32 = (1 << MV_MAX_BITS) - 1;
/// Number of signed component values `-MV_MAX..=MV_MAX`.
pub const MV_VALS:          usize = (MV_MAX as usize) * 2 + 1;

const MV_CLASS_10: usize = 10;

/// Returns the smallest `magnitude - 1` value belonging to the class.
pub fn mv_class_base(class: usize) -> u32 {
    if class != 0 { (CLASS0_SIZE as u32) << (class + 2) } else { 0 }
}

/// Maps `z = magnitude - 1` to its class and the offset inside that class.
///
/// Values at or above the last class base saturate into the last class.
pub fn get_mv_class(z: u32) -> (usize, u32) {
    debug_assert!(z < MV_MAX);
    let class = if z >= (CLASS0_SIZE as u32) * 4096 {
            MV_CLASS_10
        } else if (z >> 3) == 0 {
            0
        } else {
            (31 - (z >> 3).leading_zeros()) as usize
        };
    (class, z - mv_class_base(class))
}

/// Decomposed magnitude of a motion vector component.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct MVCompParts {
    pub class:      usize,
    /// Integer part of the offset (class 0 symbol or integer bit chain).
    pub int_bits:   u32,
    /// Two fractional bits.
    pub frac:       u8,
    /// High precision bit.
    pub hp:         u8,
}

impl MVCompParts {
    /// Splits a non-zero magnitude into the coded parts.
    pub fn from_magnitude(mag: u32) -> Self {
        debug_assert!(mag >= 1 && mag <= MV_MAX);
        let (class, offset) = get_mv_class(mag - 1);
        Self {
            class,
            int_bits:   offset >> 3,
            frac:       ((offset >> 1) & 3) as u8,
            hp:         (offset & 1) as u8,
        }
    }
    /// Returns the offset inside the class.
    pub fn offset(&self) -> u32 {
        (self.int_bits << 3) | (u32::from(self.frac) << 1) | u32::from(self.hp)
    }
    /// Reconstructs the magnitude.
    pub fn magnitude(&self) -> u32 {
        mv_class_base(self.class) + self.offset() + 1
    }
    /// Number of coded integer bits for classes above zero.
    pub fn num_int_bits(&self) -> usize {
        if self.class != 0 { self.class + CLASS0_BITS - 1 } else { 0 }
    }
}

/// Reconstructs signed component value from sign and magnitude parts.
pub fn reconstruct_component(sign: bool, parts: &MVCompParts) -> i32 {
    let mag = parts.magnitude() as i32;
    if sign { -mag } else { mag }
}

/// Selects the probability distribution a component decision is coded with.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum MVCompSym {
    Sign,
    Class,
    Class0,
    /// Integer offset bit for classes above zero.
    Bit(u8),
    /// Four-symbol fractional part for class 0 with the given integer offset.
    Class0Frac(u8),
    /// Four-symbol fractional part for classes above zero.
    Frac,
    /// Fractional decision for class 0: integer offset and decision index.
    Class0FracBit(u8, u8),
    /// Fractional decision for classes above zero.
    FracBit(u8),
    Class0Hp,
    Hp,
}

impl MVCompSym {
    /// Returns the alphabet size for the decision.
    pub fn nsyms(self) -> usize {
        match self {
            MVCompSym::Class => MV_CLASSES,
            MVCompSym::Class0 => CLASS0_SIZE,
            MVCompSym::Class0Frac(_) | MVCompSym::Frac => MV_FP_SIZE,
            _ => 2,
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct MVSymbol {
    pub sym:    MVCompSym,
    pub val:    u8,
}

/// Class, integer bits, two fractional decisions and high precision bit.
pub const MAX_MAG_SYMBOLS: usize = 1 + MV_OFFSET_BITS + 2 + 1;

/// Fixed-capacity list of decisions coding one component magnitude.
#[derive(Clone,Copy)]
pub struct SymbolSeq {
    syms:   [MVSymbol; MAX_MAG_SYMBOLS],
    len:    usize,
}

impl SymbolSeq {
    fn new() -> Self {
        Self {
            syms:   [MVSymbol { sym: MVCompSym::Class, val: 0 }; MAX_MAG_SYMBOLS],
            len:    0,
        }
    }
    fn push(&mut self, sym: MVCompSym, val: u8) {
        self.syms[self.len] = MVSymbol { sym, val };
        self.len += 1;
    }
    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn iter(&self) -> std::slice::Iter<'_, MVSymbol> {
        self.syms[..self.len].iter()
    }
}

/// Produces the ordered decisions coding a component magnitude (sign excluded).
pub fn binarize_magnitude(mag: u32, precision: MVPrecision, layout: FracLayout) -> SymbolSeq {
    let parts = MVCompParts::from_magnitude(mag);
    let is_class0 = parts.class == 0;
    let d = parts.int_bits as u8;
    let mut seq = SymbolSeq::new();

    seq.push(MVCompSym::Class, parts.class as u8);
    if is_class0 {
        seq.push(MVCompSym::Class0, d);
    } else {
        for i in 0..parts.num_int_bits() {
            seq.push(MVCompSym::Bit(i as u8), ((parts.int_bits >> i) & 1) as u8);
        }
    }
    if precision > MVPrecision::FullPel {
        match layout {
            FracLayout::Split => {
                let coarse = parts.frac >> 1;
                seq.push(if is_class0 { MVCompSym::Class0FracBit(d, 0) } else { MVCompSym::FracBit(0) }, coarse);
                if precision > MVPrecision::HalfPel {
                    let idx = 1 + coarse;
                    seq.push(if is_class0 { MVCompSym::Class0FracBit(d, idx) } else { MVCompSym::FracBit(idx) }, parts.frac & 1);
                }
            },
            FracLayout::Joint => {
                seq.push(if is_class0 { MVCompSym::Class0Frac(d) } else { MVCompSym::Frac }, parts.frac);
            },
        };
        if precision > MVPrecision::QuarterPel {
            seq.push(if is_class0 { MVCompSym::Class0Hp } else { MVCompSym::Hp }, parts.hp);
        }
    }
    seq
}
