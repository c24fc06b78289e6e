//! Pin and register plumbing: buttons, the seven-segment bus, the ROSC
//! noise line, and the system clock divider.
//!
//! Everything electrical lives here. The display is common-anode, so a
//! segment lights when its line is pulled low; the digit enables drive
//! high-side transistors and are active high. Core logic upstream only
//! ever sees lit/unlit and pressed/released.

use defmt::*;
use dice_core::display::{Digit, DigitDrive};
use dice_core::input::BUTTON_LINES;
use embassy_futures::select::select_array;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::pac;
use embassy_time::Timer;
use portable_atomic::{AtomicBool, Ordering};

/// Settle time after all buttons read released, to ride out bounce on
/// the break edge.
const RELEASE_SETTLE_MS: u64 = 20;

/// CLK_SYS divisor while idling. 125 MHz / 64 is still far more than
/// the entropy tick needs.
pub const IDLE_CLK_DIV: u32 = 64;

/// Whether the clock is currently divided down. Written only by the
/// control loop through `SystemClock`; the entropy task reads it to
/// pace itself.
static CLOCK_REDUCED: AtomicBool = AtomicBool::new(false);

/// Six momentary switches, one per die size, pulled up and active low.
pub struct Buttons {
    lines: [Input<'static>; 6],
}

impl Buttons {
    pub fn new(lines: [Input<'static>; 6]) -> Self {
        Self { lines }
    }

    /// Current electrical state as a mask, bit set = pressed.
    pub fn mask(&self) -> u8 {
        let mut mask = 0u8;
        for (i, line) in self.lines.iter().enumerate() {
            if line.is_low() {
                mask |= 1 << i;
            }
        }
        mask & BUTTON_LINES
    }

    /// Wait for any line to be asserted and return the pressed mask.
    /// Edge detection is masked again the moment this returns; the
    /// caller decides when to listen for the next press.
    pub async fn wait_for_press(&mut self) -> u8 {
        let [b0, b1, b2, b3, b4, b5] = &mut self.lines;
        select_array([
            b0.wait_for_low(),
            b1.wait_for_low(),
            b2.wait_for_low(),
            b3.wait_for_low(),
            b4.wait_for_low(),
            b5.wait_for_low(),
        ])
        .await;
        self.mask()
    }

    /// Wait until every line has been released and stayed released for
    /// one settle interval. Bounce during the press cannot re-enter the
    /// handler because nothing awaits a press until this returns.
    pub async fn wait_for_release(&mut self) {
        loop {
            Timer::after_millis(RELEASE_SETTLE_MS).await;
            if self.mask() == 0 {
                return;
            }
        }
    }
}

/// The shared segment bus plus the two digit-enable lines.
pub struct SevenSegment {
    /// Segment lines a through g, active low.
    segments: [Output<'static>; 7],
    ones_enable: Output<'static>,
    tens_enable: Output<'static>,
}

impl SevenSegment {
    pub fn new(
        segments: [Output<'static>; 7],
        ones_enable: Output<'static>,
        tens_enable: Output<'static>,
    ) -> Self {
        let mut this = Self {
            segments,
            ones_enable,
            tens_enable,
        };
        this.blank();
        this
    }

    /// Drive one multiplexer phase. The previously active digit is cut
    /// off before the bus changes, so at no instant are both digits
    /// enabled (enabling both cross-lights segments).
    pub fn apply(&mut self, drive: DigitDrive) {
        self.ones_enable.set_low();
        self.tens_enable.set_low();
        for (i, line) in self.segments.iter_mut().enumerate() {
            // Lit mask bit -> pull the line low (common anode).
            if drive.segments & (1 << i) != 0 {
                line.set_low();
            } else {
                line.set_high();
            }
        }
        match drive.digit {
            Digit::Ones => self.ones_enable.set_high(),
            Digit::Tens => self.tens_enable.set_high(),
        }
    }

    /// Both digits off, bus released to the unlit level.
    pub fn blank(&mut self) {
        self.ones_enable.set_low();
        self.tens_enable.set_low();
        for line in self.segments.iter_mut() {
            line.set_high();
        }
    }
}

/// Noise source: the ring oscillator's RANDOMBIT register, sampled one
/// bit per entropy tick.
pub struct RoscNoise;

impl RoscNoise {
    /// One raw sample. `None` when the oscillator is reported stopped,
    /// so a misbehaving source degrades to "no input" instead of
    /// feeding a stuck level into the pool.
    pub fn sample(&self) -> Option<bool> {
        let rosc = pac::ROSC;
        if !rosc.status().read().enabled() {
            return None;
        }
        Some(rosc.randombit().read().randombit())
    }
}

/// System clock throttle. The device idles with CLK_SYS divided down to
/// save power; a button press brings it back to full speed before any
/// roll work happens.
pub struct SystemClock;

impl SystemClock {
    pub fn full_speed(&self) {
        Self::set_divisor(1);
        CLOCK_REDUCED.store(false, Ordering::Relaxed);
    }

    pub fn reduced_speed(&self) {
        Self::set_divisor(IDLE_CLK_DIV);
        CLOCK_REDUCED.store(true, Ordering::Relaxed);
        debug!("clk_sys divided by {}", IDLE_CLK_DIV);
    }

    pub fn is_reduced() -> bool {
        CLOCK_REDUCED.load(Ordering::Relaxed)
    }

    fn set_divisor(div: u32) {
        pac::CLOCKS.clk_sys_div().write(|w| {
            w.set_int(div);
            w.set_frac(0);
        });
    }
}
