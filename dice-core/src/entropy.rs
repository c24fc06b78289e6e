//! Hardware-noise entropy: von Neumann debiasing plus a feedback shift
//! register pool.
//!
//! The collector is fed one raw sample per entropy-timer tick. Pairs of
//! samples resolve to at most one unbiased output bit, which is folded
//! into the pool. The pool is stirred continuously from boot onward, so
//! whatever state it holds when a roll is requested is the result of
//! every tick since power-up.

/// Significant width of the pool in bits.
pub const POOL_WIDTH: u32 = 25;

const POOL_MASK: u32 = (1 << POOL_WIDTH) - 1;

/// Boot seed: alternating bits across the full pool width. Any nonzero
/// seed works; all-zero is the fixed point of the feedback function and
/// must never be reachable.
pub const POOL_SEED: u32 = 0b1_0101_0101_0101_0101_0101_0101;

/// Two-sample (von Neumann) debiaser.
///
/// Holds at most one pending raw sample between ticks. Equal pairs are
/// discarded, unequal pairs emit the first sample of the pair. This
/// halves throughput but removes first-order bias from an asymmetric
/// noise source.
#[derive(Default)]
pub struct EntropyCollector {
    pending: Option<bool>,
}

impl EntropyCollector {
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Feed one raw sample; returns a debiased bit when a pair resolves.
    ///
    /// Constant-time per call, never blocks. Safe to call from the
    /// entropy tick handler.
    pub fn offer(&mut self, raw: bool) -> Option<bool> {
        match self.pending.take() {
            None => {
                self.pending = Some(raw);
                None
            }
            Some(prev) if prev == raw => None,
            Some(prev) => Some(prev),
        }
    }
}

/// 25-bit feedback shift register, taps at bits 0 and 3.
///
/// Single writer (the entropy tick), read-only consumers (the roll
/// path). `mix` is one rotate plus the two-tap XOR; it is never reset
/// after boot.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RandomPool {
    bits: u32,
}

impl RandomPool {
    pub const fn new() -> Self {
        Self { bits: POOL_SEED }
    }

    /// Build a pool from an explicit state, falling back to the boot
    /// seed if the masked state would be the all-zero fixed point.
    pub const fn from_bits(bits: u32) -> Self {
        let bits = bits & POOL_MASK;
        Self {
            bits: if bits == 0 { POOL_SEED } else { bits },
        }
    }

    /// Rotate right by one and inject `bit ^ bit0 ^ bit3` (of the
    /// pre-shift state) into the vacated top bit.
    pub fn mix(&mut self, bit: bool) {
        let feedback = (bit as u32) ^ (self.bits & 1) ^ ((self.bits >> 3) & 1);
        self.bits = (self.bits >> 1) | (feedback << (POOL_WIDTH - 1));
    }

    /// Current pool state.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Modulo-reduce the pool onto one die face. Read-only; the result
    /// is always in `1..=max_face` (no die face is numbered 0).
    pub fn draw(&self, max_face: u8) -> u8 {
        debug_assert!(max_face > 0);
        (self.bits % max_face as u32) as u8 + 1
    }
}

impl Default for RandomPool {
    fn default() -> Self {
        Self::new()
    }
}
