//! Two-digit seven-segment multiplexing.
//!
//! One shared segment bus drives both digits; only one digit-enable line
//! may be active at any instant, so the multiplexer alternates digits on
//! every refresh tick and relies on persistence of vision. The core
//! reasons purely in "segment lit / unlit" terms; the common-anode
//! active-low inversion belongs to the board's segment driver.

/// Segments lit for digits 0-9, gfedcba order, bit set = segment lit.
pub const SEGMENT_MAP: [u8; 10] = [
    0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F,
];

/// All segments unlit.
pub const BLANK: u8 = 0x00;

/// Highest value the two-digit readout can show.
pub const MAX_VALUE: u8 = 99;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Digit {
    Ones,
    Tens,
}

impl Digit {
    pub fn other(self) -> Self {
        match self {
            Digit::Ones => Digit::Tens,
            Digit::Tens => Digit::Ones,
        }
    }
}

/// One refresh tick's worth of output: deactivate everything, put
/// `segments` on the bus, then assert exactly `digit`'s enable line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DigitDrive {
    pub digit: Digit,
    pub segments: u8,
}

/// Alternates which digit is driven on each tick. Owns only the phase;
/// the displayed value is read fresh every tick so a roll that lands
/// between ticks is picked up whole on the next one.
pub struct DisplayMultiplexer {
    next: Digit,
}

impl DisplayMultiplexer {
    pub const fn new() -> Self {
        Self { next: Digit::Ones }
    }

    /// Restart the phase sequence at the ones digit, so a display
    /// interval that begins from blank always starts on the same side.
    pub fn reset(&mut self) {
        self.next = Digit::Ones;
    }

    /// Produce the drive command for the current phase and advance.
    /// A digit that somehow computes to >= 10 renders blank rather
    /// than indexing garbage.
    pub fn tick(&mut self, value: u8) -> DigitDrive {
        let digit = self.next;
        self.next = digit.other();
        let (tens, ones) = decompose(value);
        let n = match digit {
            Digit::Ones => ones,
            Digit::Tens => tens,
        };
        let segments = SEGMENT_MAP.get(n as usize).copied().unwrap_or(BLANK);
        DigitDrive { digit, segments }
    }
}

impl Default for DisplayMultiplexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a 0-99 value into (tens, ones).
pub fn decompose(value: u8) -> (u8, u8) {
    (value / 10, value % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompose_round_trips_all_two_digit_values() {
        for v in 0..=MAX_VALUE {
            let (tens, ones) = decompose(v);
            assert!(tens < 10 && ones < 10);
            assert_eq!(tens * 10 + ones, v);
        }
    }

    #[test]
    fn phases_alternate_and_enable_one_digit_each() {
        let mut mux = DisplayMultiplexer::new();
        let first = mux.tick(42);
        let second = mux.tick(42);
        let third = mux.tick(42);
        // A DigitDrive asserts exactly one enable by construction; the
        // phase must flip every tick to keep both digits lit.
        assert_eq!(first.digit, Digit::Ones);
        assert_eq!(second.digit, Digit::Tens);
        assert_eq!(third.digit, first.digit);
    }

    #[test]
    fn drives_the_right_segment_images() {
        let mut mux = DisplayMultiplexer::new();
        let ones = mux.tick(42);
        let tens = mux.tick(42);
        assert_eq!(ones.segments, SEGMENT_MAP[2]);
        assert_eq!(tens.segments, SEGMENT_MAP[4]);
    }

    #[test]
    fn single_digit_value_blanks_nothing_but_shows_leading_zero() {
        let mut mux = DisplayMultiplexer::new();
        let ones = mux.tick(7);
        let tens = mux.tick(7);
        assert_eq!(ones.segments, SEGMENT_MAP[7]);
        assert_eq!(tens.segments, SEGMENT_MAP[0]);
    }

    #[test]
    fn reset_restarts_the_phase_sequence() {
        let mut mux = DisplayMultiplexer::new();
        // End an interval mid-cycle, on the tens phase.
        mux.tick(10);
        mux.reset();
        assert_eq!(mux.tick(10).digit, Digit::Ones);
    }

    #[test]
    fn out_of_range_digit_renders_blank() {
        let mut mux = DisplayMultiplexer::new();
        // 255 / 10 = 25: the tens digit is out of table range and must
        // render blank, never garbage.
        let ones = mux.tick(255);
        let tens = mux.tick(255);
        assert_eq!(ones.segments, SEGMENT_MAP[5]);
        assert_eq!(tens.segments, BLANK);
    }
}
