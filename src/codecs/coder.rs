//! Adaptive multi-symbol coding and rate estimation primitives.
//!
//! Distributions are AV1-style inverse CDFs stored in `nsyms + 1` entries:
//! `32768 - cumulative frequency` for every symbol (the last one is always zero)
//! followed by the adaptation counter.

use super::{EncoderError, EncoderResult};

pub const CDF_PROB_BITS: u32 = 15;
pub const CDF_PROB_TOP:  u32 = 1 << CDF_PROB_BITS;
const EC_PROB_SHIFT: u32 = 6;
const EC_MIN_PROB:   u32 = 4;
/// Precision of fractional bit counts reported by [`RangeEncoder::tell_frac`].
pub const OD_BITRES: u32 = 3;

/// Costs are expressed in 1/512 bit units.
pub const COST_SHIFT: u32 = 9;

// cost of coding a symbol with probability (128 + i)/256, in 1/512 bit units
const PROB_COST: [u16; 128] = [
    512, 506, 501, 495, 489, 484, 478, 473,
    467, 462, 456, 451, 446, 441, 435, 430,
    425, 420, 415, 410, 405, 400, 395, 390,
    385, 380, 375, 371, 366, 361, 356, 352,
    347, 343, 338, 333, 329, 324, 320, 316,
    311, 307, 302, 298, 294, 289, 285, 281,
    277, 273, 268, 264, 260, 256, 252, 248,
    244, 240, 236, 232, 228, 224, 220, 216,
    212, 209, 205, 201, 197, 194, 190, 186,
    182, 179, 175, 171, 168, 164, 161, 157,
    153, 150, 146, 143, 139, 136, 132, 129,
    125, 122, 119, 115, 112, 109, 105, 102,
     99,  95,  92,  89,  86,  82,  79,  76,
     73,  70,  66,  63,  60,  57,  54,  51,
     48,  45,  42,  38,  35,  32,  29,  26,
     23,  20,  18,  15,  12,   9,   6,   3,
];

/// Largest alphabet an adaptive distribution may have.
pub const MAX_NSYMS: usize = 16;

const NSYMS_TO_SPEED: [u16; MAX_NSYMS + 1] = [ 0, 0, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2 ];

/// Sink for adaptively coded symbols.
///
/// Implementations code `val` from an alphabet of `nsyms` symbols using distribution `cdf`
/// and may adapt the distribution afterwards.
pub trait SymbolWriter {
    fn write_symbol(&mut self, val: usize, cdf: &mut [u16], nsyms: usize) -> EncoderResult<()>;
}

/// Adapts distribution towards the coded symbol.
///
/// `nsyms` must lie in `2..=MAX_NSYMS` and `cdf` must hold `nsyms + 1` entries.
pub fn update_cdf(cdf: &mut [u16], val: usize, nsyms: usize) {
    let count = cdf[nsyms];
    let rate = 3 + u16::from(count > 15) + u16::from(count > 31) + NSYMS_TO_SPEED[nsyms];
    let mut tmp = CDF_PROB_TOP as u16;
    for (i, el) in cdf[..nsyms - 1].iter_mut().enumerate() {
        if i == val {
            tmp = 0;
        }
        if tmp < *el {
            *el -= (*el - tmp) >> rate;
        } else {
            *el += (tmp - *el) >> rate;
        }
    }
    cdf[nsyms] += u16::from(count < 32);
}

/// Returns the cost of coding an event with the probability `p15 / 32768`.
pub fn cost_symbol(p15: u32) -> u32 {
    let p15 = p15.max(1).min(CDF_PROB_TOP - 1);
    let msb = 31 - p15.leading_zeros();
    let shift = CDF_PROB_BITS - 1 - msb;
    let prob = (((p15 << shift) * 256 + (CDF_PROB_TOP >> 1)) / CDF_PROB_TOP).min(255) as usize;
    u32::from(PROB_COST[prob - 128]) + (shift << COST_SHIFT)
}

/// Returns the cost of coding symbol `val` with distribution `cdf`.
pub fn symbol_cost(cdf: &[u16], val: usize) -> u32 {
    let prev = if val > 0 { u32::from(cdf[val - 1]) } else { CDF_PROB_TOP };
    cost_symbol(prev.saturating_sub(u32::from(cdf[val])))
}

/// Fills `costs` with the cost of every symbol of the distribution.
///
/// The alphabet size is taken from the output length.
pub fn cost_tokens_from_cdf(costs: &mut [u32], cdf: &[u16]) {
    for (val, cost) in costs.iter_mut().enumerate() {
        *cost = symbol_cost(cdf, val);
    }
}

/// Converts cost to the number of whole bits (rounded).
pub fn cost_to_bits(cost: u32) -> u32 {
    (cost + (1 << (COST_SHIFT - 1))) >> COST_SHIFT
}

/// Multi-symbol range encoder producing AV1 entropy coded data.
pub struct RangeEncoder {
    precarry:   Vec<u16>,
    low:        u32,
    rng:        u16,
    cnt:        i16,
    /// Adapt distributions after every coded symbol.
    pub allow_update:   bool,
}

impl RangeEncoder {
    pub fn new() -> Self {
        Self {
            precarry:       Vec::new(),
            low:            0,
            rng:            0x8000,
            cnt:            -9,
            allow_update:   true,
        }
    }
    fn encode_q15(&mut self, fl: u16, fh: u16, s: usize, nsyms: usize) {
        let r = u32::from(self.rng);
        let nms = (nsyms - s) as u32;
        let u = if u32::from(fl) < CDF_PROB_TOP {
                (((r >> 8) * (u32::from(fl) >> EC_PROB_SHIFT)) >> (7 - EC_PROB_SHIFT)) + EC_MIN_PROB * nms
            } else {
                r
            };
        let v = (((r >> 8) * (u32::from(fh) >> EC_PROB_SHIFT)) >> (7 - EC_PROB_SHIFT)) + EC_MIN_PROB * (nms - 1);
        let low = self.low + (r - u);
        self.normalize(low, (u - v) as u16);
    }
    fn normalize(&mut self, low: u32, rng: u16) {
        let mut low = low;
        let mut c = self.cnt;
        let d = rng.leading_zeros() as i16;
        let mut s = c + d;

        if s >= 0 {
            c += 16;
            let mut m = (1u32 << c) - 1;
            if s >= 8 {
                self.precarry.push((low >> c) as u16);
                low &= m;
                c -= 8;
                m >>= 8;
            }
            self.precarry.push((low >> c) as u16);
            s = c + d - 24;
            low &= m;
        }
        self.low = low << d;
        self.rng = rng << d;
        self.cnt = s;
    }
    /// Returns the number of whole bits used so far, rounded up.
    pub fn tell(&self) -> u32 {
        ((self.precarry.len() * 8) as i32 + i32::from(self.cnt) + 10) as u32
    }
    /// Returns the number of bits used so far in `1 / (1 << OD_BITRES)` units.
    pub fn tell_frac(&self) -> u32 {
        let nbits = self.tell() << OD_BITRES;
        let mut rng = u32::from(self.rng);
        let mut l = 0;
        for _ in 0..OD_BITRES {
            rng = (rng * rng) >> 15;
            let b = rng >> 16;
            l = (l << 1) | b;
            rng >>= b;
        }
        nbits - l
    }
    /// Terminates the stream and returns the coded data.
    pub fn finish(mut self) -> Vec<u8> {
        let mut c = self.cnt;
        let mut s = c + 10;
        let m = 0x3FFF;
        let mut e = ((self.low + m) & !m) | (m + 1);

        if s > 0 {
            let mut n = (1u32 << (c + 16)) - 1;
            loop {
                self.precarry.push((e >> (c + 16)) as u16);
                e &= n;
                s -= 8;
                c -= 8;
                n >>= 8;
                if s <= 0 {
                    break;
                }
            }
        }

        let mut carry = 0u32;
        let mut out = vec![0u8; self.precarry.len()];
        for (dst, &src) in out.iter_mut().zip(self.precarry.iter()).rev() {
            carry += u32::from(src);
            *dst = carry as u8;
            carry >>= 8;
        }
        out
    }
}

impl Default for RangeEncoder {
    fn default() -> Self { Self::new() }
}

impl SymbolWriter for RangeEncoder {
    fn write_symbol(&mut self, val: usize, cdf: &mut [u16], nsyms: usize) -> EncoderResult<()> {
        validate!(nsyms >= 2 && nsyms <= MAX_NSYMS && val < nsyms && cdf.len() > nsyms, EncoderError::Bug);
        let fl = if val > 0 { cdf[val - 1] } else { CDF_PROB_TOP as u16 };
        self.encode_q15(fl, cdf[val], val, nsyms);
        if self.allow_update {
            update_cdf(cdf, val, nsyms);
        }
        Ok(())
    }
}

/// Symbol writer that only accumulates the cost of the written symbols.
///
/// Distributions are left untouched so the estimate reflects a single probability snapshot.
#[derive(Clone,Copy,Debug,Default)]
pub struct Estimator {
    cost:   u32,
}

impl Estimator {
    pub fn new() -> Self { Self::default() }
    /// Returns accumulated cost in 1/512 bit units.
    pub fn cost(&self) -> u32 { self.cost }
    /// Returns accumulated cost in whole bits.
    pub fn bits(&self) -> u32 { cost_to_bits(self.cost) }
    pub fn reset(&mut self) { self.cost = 0; }
}

impl SymbolWriter for Estimator {
    fn write_symbol(&mut self, val: usize, cdf: &mut [u16], nsyms: usize) -> EncoderResult<()> {
        validate!(nsyms >= 2 && nsyms <= MAX_NSYMS && val < nsyms && cdf.len() > nsyms, EncoderError::Bug);
        self.cost += symbol_cost(cdf, val);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // reference decoder for checking the produced data
    struct RangeDecoder<'a> {
        src:    &'a [u8],
        pos:    usize,
        dif:    u64,
        rng:    u32,
        cnt:    i32,
    }

    impl<'a> RangeDecoder<'a> {
        fn new(src: &'a [u8]) -> Self {
            let mut dec = Self { src, pos: 0, dif: 0, rng: 0x8000, cnt: -15 };
            dec.refill();
            dec
        }
        fn refill(&mut self) {
            let mut c = 48 - self.cnt - 24;
            while c >= 0 {
                let byte = if self.pos < self.src.len() {
                        self.pos += 1;
                        self.src[self.pos - 1] ^ 0xFF
                    } else {
                        0xFF
                    };
                self.dif |= u64::from(byte) << c;
                c -= 8;
            }
            self.cnt = 48 - c - 24;
        }
        fn norm(&mut self, dif: u64, rng: u32) {
            let d = rng.leading_zeros() as i32 - 16;
            let cnt = self.cnt;
            self.dif = dif << d;
            self.rng = rng << d;
            self.cnt = cnt - d;
            if (cnt as u32) < (d as u32) {
                self.refill();
            }
        }
        fn read_symbol(&mut self, cdf: &mut [u16], nsyms: usize) -> usize {
            let c = (self.dif >> 32) as u32;
            let r = self.rng >> 8;
            let mut u;
            let mut v = self.rng;
            let mut val = 0;
            loop {
                u = v;
                v = (r * u32::from(cdf[val] >> EC_PROB_SHIFT)) >> (7 - EC_PROB_SHIFT);
                v += EC_MIN_PROB * ((nsyms - 1 - val) as u32);
                if c >= v {
                    break;
                }
                val += 1;
            }
            self.norm(self.dif - (u64::from(v) << 32), u - v);
            update_cdf(cdf, val, nsyms);
            val
        }
    }

    #[test]
    fn test_update_cdf() {
        let mut cdf = [16384u16, 0, 0];
        update_cdf(&mut cdf, 0, 2);
        assert!(cdf[0] < 16384);
        assert_eq!(cdf[2], 1);
        let mut cdf = [16384u16, 0, 0];
        update_cdf(&mut cdf, 1, 2);
        assert!(cdf[0] > 16384);

        let mut cdf = [24576u16, 16384, 8192, 0, 32];
        update_cdf(&mut cdf, 2, 4);
        assert!(cdf[0] > 24576);
        assert!(cdf[1] > 16384);
        assert!(cdf[2] < 8192);
        assert_eq!(cdf[3], 0);
        assert_eq!(cdf[4], 32);
    }
    #[test]
    fn test_costs() {
        assert_eq!(cost_symbol(16384), 512);
        assert_eq!(cost_symbol(8192), 1024);
        assert_eq!(cost_symbol(4096), 1536);
        assert_eq!(cost_symbol(32767), 3);
        assert_eq!(cost_symbol(0), cost_symbol(1));

        let mut costs = [0u32; 4];
        cost_tokens_from_cdf(&mut costs, &[24576, 16384, 8192, 0, 0]);
        assert_eq!(costs, [1024; 4]);
        cost_tokens_from_cdf(&mut costs, &[16384, 8192, 4096, 0, 0]);
        assert_eq!(costs, [512, 1024, 1536, 1536]);
        assert_eq!(cost_to_bits(1536), 3);
        assert_eq!(cost_to_bits(1023), 2);
    }
    #[test]
    fn test_estimator() {
        let mut est = Estimator::new();
        let mut cdf = [16384u16, 8192, 4096, 0, 0];
        est.write_symbol(0, &mut cdf, 4).unwrap();
        est.write_symbol(3, &mut cdf, 4).unwrap();
        assert_eq!(est.cost(), 512 + 1536);
        assert_eq!(est.bits(), 4);
        assert_eq!(cdf, [16384, 8192, 4096, 0, 0]);
        assert_eq!(est.write_symbol(4, &mut cdf, 4), Err(EncoderError::Bug));
        est.reset();
        assert_eq!(est.cost(), 0);
    }
    #[test]
    fn test_equiprobable_size() {
        let mut enc = RangeEncoder::new();
        assert_eq!(enc.tell(), 1);
        assert_eq!(enc.tell_frac(), 1 << OD_BITRES);
        enc.allow_update = false;
        let mut cdf = [16384u16, 0, 0];
        for i in 0..64 {
            enc.write_symbol(i & 1, &mut cdf, 2).unwrap();
        }
        let bits = enc.tell();
        assert!(bits >= 64 && bits <= 70);
        assert!(enc.tell_frac() <= bits << OD_BITRES);
        let data = enc.finish();
        assert!(data.len() >= 8 && data.len() <= 10);
    }
    #[test]
    fn test_roundtrip() {
        const DEF_CDF4: [u16; 5] = [24576, 16384, 8192, 0, 0];
        const DEF_CDF2: [u16; 3] = [20000, 0, 0];
        let syms4 = [0usize, 1, 2, 3, 3, 3, 0, 1, 2, 2, 3, 0, 0, 0, 1, 3, 2, 3, 3, 3];

        let mut enc = RangeEncoder::new();
        let mut cdf4 = DEF_CDF4;
        let mut cdf2 = DEF_CDF2;
        for (i, &sym) in syms4.iter().enumerate() {
            enc.write_symbol(sym, &mut cdf4, 4).unwrap();
            enc.write_symbol(usize::from(i % 3 == 0), &mut cdf2, 2).unwrap();
        }
        let data = enc.finish();

        let mut dec = RangeDecoder::new(&data);
        let mut dcdf4 = DEF_CDF4;
        let mut dcdf2 = DEF_CDF2;
        for (i, &sym) in syms4.iter().enumerate() {
            assert_eq!(dec.read_symbol(&mut dcdf4, 4), sym);
            assert_eq!(dec.read_symbol(&mut dcdf2, 2), usize::from(i % 3 == 0));
        }
        assert_eq!(cdf4, dcdf4);
        assert_eq!(cdf2, dcdf2);
    }
    #[test]
    fn test_invalid_symbol() {
        let mut enc = RangeEncoder::new();
        let mut cdf = [16384u16, 0, 0];
        assert_eq!(enc.write_symbol(2, &mut cdf, 2), Err(EncoderError::Bug));
        assert_eq!(enc.write_symbol(0, &mut cdf[..2], 2), Err(EncoderError::Bug));

        let mut wide = [0u16; MAX_NSYMS + 2];
        assert_eq!(enc.write_symbol(0, &mut wide, MAX_NSYMS + 1), Err(EncoderError::Bug));
        assert!(enc.write_symbol(0, &mut wide[..MAX_NSYMS + 1], MAX_NSYMS).is_ok());
        let mut est = Estimator::new();
        assert_eq!(est.write_symbol(0, &mut wide, MAX_NSYMS + 1), Err(EncoderError::Bug));
        assert_eq!(est.write_symbol(1, &mut cdf, 1), Err(EncoderError::Bug));
        assert_eq!(est.cost(), 0);
    }
}
