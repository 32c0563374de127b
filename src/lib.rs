//! Crate for coding AV1 motion vector differences and estimating their rate.
//!
//! The encoder side writes vector differences through any [`SymbolWriter`]
//! while the cost side builds per-value rate tables from the same probability
//! context without coding anything. Both sides share one binarisation so
//! their results always agree.

#[allow(clippy::identity_op)]
#[allow(clippy::unreadable_literal)]
#[allow(clippy::upper_case_acronyms)]
#[allow(clippy::verbose_bit_mask)]
#[allow(clippy::new_without_default)]
pub mod codecs;

pub mod options;

pub use crate::codecs::{EncoderError, EncoderResult, FracLayout, MVJoint, MVPrecision, MV, ZERO_MV};
pub use crate::codecs::coder::{Estimator, RangeEncoder, SymbolWriter};
pub use crate::codecs::models::{NMVComponent, NMVContext};
pub use crate::codecs::mvcost::MVCostTable;
pub use crate::codecs::mvenc::{MVEncoder, MVSymbolWriter};
pub use crate::codecs::refmv::{BlockModeInfo, CandidateMV, InterMode, RefFrame, RefMVContext, RefPair};
pub use crate::options::MVCoderOptions;
