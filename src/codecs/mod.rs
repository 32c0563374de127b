use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use thiserror::Error;

#[cfg(debug_assertions)]
macro_rules! validate {
    ($a:expr, $err:expr) => { if !$a { tracing::debug!("check failed at {}:{}", file!(), line!()); return Err($err); } };
}
#[cfg(not(debug_assertions))]
macro_rules! validate {
    ($a:expr, $err:expr) => { if !$a { return Err($err); } };
}

pub mod coder;
pub mod models;
pub mod mvclass;
pub mod mvcost;
pub mod mvenc;
pub mod refmv;

/// A list specifying motion vector coding errors.
#[derive(Debug,Clone,Copy,PartialEq,Error)]
pub enum EncoderError {
    /// Invalid input parameters were provided.
    #[error("invalid input parameters")]
    InvalidParameters,
    /// Vector difference component can not be represented in the bitstream.
    #[error("motion vector difference component {0} is out of range")]
    MVOutOfRange(i32),
    /// Full-pixel vector has fractional bits set.
    #[error("full-pixel vector has sub-pixel bits set")]
    SubpelInFullPel,
    /// Candidate stack index is beyond the stack capacity.
    #[error("candidate stack index {0} is out of range")]
    InvalidStackIndex(usize),
    /// Some bug in encoder. It should not happen yet it might.
    #[error("internal encoder error")]
    Bug,
}

/// A specialised `Result` type for motion vector coding operations.
pub type EncoderResult<T> = Result<T, EncoderError>;

/// Motion vector data type.
///
/// Components are stored in 1/8 pixel units, `y` is the row component and `x` is the column component.
///
/// # Examples
///
/// ```
/// use nihav_av1mv::MV;
///
/// let mv0 = MV::new(8, -3);
/// let mv1 = MV { x: 2, y: 3 };
/// let diff = mv1 - mv0; // difference that gets coded
/// assert_eq!(diff, MV::new(-6, 6));
/// ```
#[derive(Debug,Clone,Copy,Default,PartialEq,Eq)]
pub struct MV {
    /// X (column) coordinate of the vector.
    pub x: i16,
    /// Y (row) coordinate of the vector.
    pub y: i16,
}

/// Exclusive lower limit for a vector component.
pub const MV_LOW: i16 = -(1 << 14);
/// Exclusive upper limit for a vector component.
pub const MV_UPP: i16 = 1 << 14;

impl MV {
    /// Creates a new motion vector instance.
    pub fn new(x: i16, y: i16) -> Self { MV{ x, y } }
    /// Reports whether both components lie inside the codable vector range.
    pub fn is_valid(self) -> bool {
        self.x > MV_LOW && self.x < MV_UPP && self.y > MV_LOW && self.y < MV_UPP
    }
    /// Reports whether the vector points to full-pixel positions only.
    pub fn is_fullpel(self) -> bool {
        ((self.x | self.y) & 7) == 0
    }
}

/// Zero motion vector.
pub const ZERO_MV: MV = MV { x: 0, y: 0 };

impl Add for MV {
    type Output = MV;
    fn add(self, other: MV) -> MV { MV { x: self.x + other.x, y: self.y + other.y } }
}

impl AddAssign for MV {
    fn add_assign(&mut self, other: MV) { self.x += other.x; self.y += other.y; }
}

impl Sub for MV {
    type Output = MV;
    fn sub(self, other: MV) -> MV { MV { x: self.x - other.x, y: self.y - other.y } }
}

impl SubAssign for MV {
    fn sub_assign(&mut self, other: MV) { self.x -= other.x; self.y -= other.y; }
}

impl Neg for MV {
    type Output = MV;
    fn neg(self) -> Self::Output {
        MV { x: -self.x, y: -self.y }
    }
}

impl fmt::Display for MV {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Sub-pixel precision of coded vectors.
///
/// Variants are ordered from the coarsest to the finest precision.
#[derive(Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash,Default)]
pub enum MVPrecision {
    /// Full-pixel vectors only, no fractional bits are coded.
    FullPel,
    /// Half-pixel precision.
    HalfPel,
    /// Quarter-pixel precision.
    QuarterPel,
    /// One-eighth pixel precision (high precision bit is coded).
    #[default]
    EighthPel,
}

impl MVPrecision {
    /// Returns vector grid step in 1/8 pixel units.
    pub fn step(self) -> i16 {
        1 << (MVPrecision::EighthPel as u8 - self as u8)
    }
}

impl fmt::Display for MVPrecision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
                MVPrecision::FullPel    => "full",
                MVPrecision::HalfPel    => "half",
                MVPrecision::QuarterPel => "quarter",
                MVPrecision::EighthPel  => "eighth",
            };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for MVPrecision {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full"      => Ok(MVPrecision::FullPel),
            "half"      => Ok(MVPrecision::HalfPel),
            "quarter"   => Ok(MVPrecision::QuarterPel),
            "eighth"    => Ok(MVPrecision::EighthPel),
            _ => Err(EncoderError::InvalidParameters),
        }
    }
}

/// Binarisation used for the two fractional bits of a vector component.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Default)]
pub enum FracLayout {
    /// Coarse bit and (precision permitting) fine bit as two binary decisions.
    #[default]
    Split,
    /// Both bits as one four-symbol decision whenever any sub-pixel precision is enabled.
    Joint,
}

impl fmt::Display for FracLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FracLayout::Split => write!(f, "split"),
            FracLayout::Joint => write!(f, "joint"),
        }
    }
}

impl std::str::FromStr for FracLayout {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "split" => Ok(FracLayout::Split),
            "joint" => Ok(FracLayout::Joint),
            _ => Err(EncoderError::InvalidParameters),
        }
    }
}

/// Shows which components of a vector difference are non-zero.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum MVJoint {
    /// Both components are zero.
    Zero    = 0,
    /// Only column (horizontal) component is non-zero.
    ColOnly = 1,
    /// Only row (vertical) component is non-zero.
    RowOnly = 2,
    /// Both components are non-zero.
    Both    = 3,
}

impl MVJoint {
    /// Derives joint type for the vector difference.
    pub fn from_diff(diff: MV) -> Self {
        match (diff.y != 0, diff.x != 0) {
            (false, false) => MVJoint::Zero,
            (false, true)  => MVJoint::ColOnly,
            (true,  false) => MVJoint::RowOnly,
            (true,  true)  => MVJoint::Both,
        }
    }
    /// Reports whether row component is coded.
    pub fn has_vertical(self) -> bool {
        matches!(self, MVJoint::RowOnly | MVJoint::Both)
    }
    /// Reports whether column component is coded.
    pub fn has_horizontal(self) -> bool {
        matches!(self, MVJoint::ColOnly | MVJoint::Both)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_joint_types() {
        assert_eq!(MVJoint::from_diff(ZERO_MV), MVJoint::Zero);
        assert_eq!(MVJoint::from_diff(MV::new(3, 0)), MVJoint::ColOnly);
        assert_eq!(MVJoint::from_diff(MV::new(0, -5)), MVJoint::RowOnly);
        assert_eq!(MVJoint::from_diff(MV::new(1, 1)), MVJoint::Both);
        assert!(!MVJoint::ColOnly.has_vertical());
        assert!(MVJoint::ColOnly.has_horizontal());
        assert!(MVJoint::RowOnly.has_vertical());
        assert!(!MVJoint::RowOnly.has_horizontal());
    }
    #[test]
    fn test_mv_limits() {
        assert!(MV::new(16383, -16383).is_valid());
        assert!(!MV::new(16384, 0).is_valid());
        assert!(!MV::new(0, -16384).is_valid());
        assert!(MV::new(-16, 64).is_fullpel());
        assert!(!MV::new(-16, 65).is_fullpel());
    }
    #[test]
    fn test_precision_names() {
        assert_eq!(MVPrecision::FullPel.step(), 8);
        assert_eq!(MVPrecision::QuarterPel.step(), 2);
        assert_eq!(MVPrecision::EighthPel.step(), 1);
        assert_eq!("half".parse::<MVPrecision>(), Ok(MVPrecision::HalfPel));
        assert_eq!(MVPrecision::QuarterPel.to_string(), "quarter");
        assert_eq!("joint".parse::<FracLayout>(), Ok(FracLayout::Joint));
        assert!("fine".parse::<FracLayout>().is_err());
        assert!(MVPrecision::FullPel < MVPrecision::HalfPel);
    }
}
