//! Rank allocation
//!
//! Pure functions deriving new ranks from existing ones. All operations work
//! on digit vectors (values `0..36`) and only produce canonical ranks, i.e.
//! ranks that never end in the `0` symbol.

use crate::domain::errors::RankError;
use crate::domain::rank::{RankValue, BASE};

/// Default maximum rank length.
///
/// Every nested insertion into the same gap costs roughly one bit, so this
/// leaves room for well over 2^16 of them before a rebalance is required.
pub const DEFAULT_MAX_RANK_LENGTH: usize = 16_384;

/// Digit of the rank handed out to the first item of an empty parent (`i`).
const INITIAL_DIGIT: u8 = BASE / 2;

/// Stateless rank allocator bounded by a maximum rank length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankAllocator {
    max_length: usize,
}

impl Default for RankAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RANK_LENGTH)
    }
}

impl RankAllocator {
    /// Allocator producing ranks of at most `max_length` symbols.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Canonical rank for the first item of an empty parent.
    pub fn initial(&self) -> RankValue {
        RankValue::from_digits(&[INITIAL_DIGIT])
    }

    /// Smallest rank strictly greater than `rank` at its own precision.
    ///
    /// An all-`z` rank has no successor at its precision and grows by one
    /// symbol instead.
    pub fn after(&self, rank: &RankValue) -> Result<RankValue, RankError> {
        let mut digits = rank.digits();
        let mut i = digits.len();
        while i > 0 {
            i -= 1;
            if digits[i] + 1 < BASE {
                digits[i] += 1;
                digits.truncate(i + 1);
                return self.finish(digits);
            }
        }

        let mut extended = rank.digits();
        extended.push(1);
        self.finish(extended)
    }

    /// Largest rank strictly less than `rank` at its own precision.
    ///
    /// When stepping down would reach zero, precision grows by one symbol
    /// (`1` becomes `0z`).
    pub fn before(&self, rank: &RankValue) -> Result<RankValue, RankError> {
        let mut digits = rank.digits();

        if !rank.is_canonical() {
            // "x0" sorts directly after "x"; nothing else fits between them.
            strip_trailing_zeros(&mut digits);
            if digits.is_empty() {
                return Err(self.exhausted());
            }
            return self.finish(digits);
        }

        let last = digits.len() - 1;
        digits[last] -= 1;
        strip_trailing_zeros(&mut digits);
        if !digits.is_empty() {
            return self.finish(digits);
        }

        // rank was 0...01
        let mut extended = vec![0; rank.len()];
        extended.push(BASE - 1);
        self.finish(extended)
    }

    /// Rank strictly between `lower` and `upper`, as round as possible.
    ///
    /// Keeps the shared prefix and splits the first differing digit in the
    /// middle, so both sides keep room for later insertions. Adjacent digits
    /// push the split one symbol deeper.
    pub fn between(&self, lower: &RankValue, upper: &RankValue) -> Result<RankValue, RankError> {
        if lower == upper {
            return Err(RankError::DuplicateRank {
                rank: lower.to_string(),
            });
        }
        if lower > upper {
            return Err(RankError::OutOfOrder {
                lower: lower.to_string(),
                upper: upper.to_string(),
            });
        }

        let a = lower.digits();
        let b = upper.digits();
        let mut out = Vec::with_capacity(a.len().max(b.len()) + 1);
        if !midpoint(&a, Some(&b), &mut out) {
            // upper is lower followed only by zeros
            return Err(self.exhausted());
        }
        self.finish(out)
    }

    /// `count` strictly increasing ranks spread evenly over the rank space.
    ///
    /// Item `k` (1-based) gets the value `k / (count + 1)` at the shortest
    /// precision that keeps all values distinct. That precision must stay
    /// below the maximum length so every gap can still be split.
    pub fn spread(&self, count: usize) -> Result<Vec<RankValue>, RankError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let slots = count as u128 + 1;
        let mut width = 1usize;
        let mut space = BASE as u128;
        while space < slots {
            width += 1;
            space *= BASE as u128;
        }
        if width >= self.max_length {
            return Err(self.exhausted());
        }

        let step = space / slots;
        let remainder = space % slots;
        let ranks = (1..=count as u128)
            .map(|k| {
                let value = k * step + (k * remainder) / slots;
                let mut digits = encode_fixed(value, width);
                strip_trailing_zeros(&mut digits);
                RankValue::from_digits(&digits)
            })
            .collect();
        Ok(ranks)
    }

    fn finish(&self, digits: Vec<u8>) -> Result<RankValue, RankError> {
        if digits.len() > self.max_length {
            return Err(self.exhausted());
        }
        Ok(RankValue::from_digits(&digits))
    }

    fn exhausted(&self) -> RankError {
        RankError::Exhausted {
            max_length: self.max_length,
        }
    }
}

/// Append to `out` a digit string strictly between `a` and `b`.
///
/// `b == None` stands for the top of the rank space. Missing digits of `a` are
/// zeros. Returns false when no value exists between the two.
fn midpoint(mut a: &[u8], mut b: Option<&[u8]>, out: &mut Vec<u8>) -> bool {
    loop {
        if let Some(upper) = b {
            let shared = upper
                .iter()
                .enumerate()
                .take_while(|(i, d)| a.get(*i).copied().unwrap_or(0) == **d)
                .count();
            if shared == upper.len() {
                return false;
            }
            if shared > 0 {
                out.extend_from_slice(&upper[..shared]);
                a = a.get(shared..).unwrap_or(&[]);
                b = Some(&upper[shared..]);
            }
        }

        let da = a.first().copied().unwrap_or(0) as u16;
        let db = b.map_or(BASE as u16, |upper| upper[0] as u16);

        if db - da > 1 {
            out.push(((da + db) / 2) as u8);
            return true;
        }

        if let Some(upper) = b {
            if upper.len() > 1 {
                out.push(upper[0]);
                return true;
            }
        }

        out.push(da as u8);
        a = a.get(1..).unwrap_or(&[]);
        b = None;
    }
}

fn strip_trailing_zeros(digits: &mut Vec<u8>) {
    while digits.last() == Some(&0) {
        digits.pop();
    }
}

fn encode_fixed(mut value: u128, width: usize) -> Vec<u8> {
    let mut digits = vec![0u8; width];
    for slot in digits.iter_mut().rev() {
        *slot = (value % BASE as u128) as u8;
        value /= BASE as u128;
    }
    digits
}
