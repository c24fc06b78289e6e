//! Hardware-independent core of the electronic die.
//!
//! Everything that decides anything lives here: the entropy debiaser and
//! random pool, the two-digit display multiplexer, button dispatch, and
//! the power state machine. The firmware crate owns pins, timers, and
//! clock control and calls into these types from its tasks; nothing in
//! this crate touches a register, so the whole crate tests on the host.

#![cfg_attr(not(test), no_std)]

pub mod display;
pub mod entropy;
pub mod input;
pub mod power;

pub use display::{Digit, DigitDrive, DisplayMultiplexer};
pub use entropy::{EntropyCollector, RandomPool};
pub use input::{InputDispatcher, Roll};
pub use power::{PowerState, PowerStateMachine};

#[cfg(test)]
mod tests {
    use super::*;

    /// End-to-end: press the d6 button on a freshly booted device and
    /// walk the whole display interval.
    #[test]
    fn boot_press_display_timeout_cycle() {
        let pool = RandomPool::new();
        let mut sm = PowerStateMachine::new();
        let mut mux = DisplayMultiplexer::new();

        let roll = InputDispatcher::dispatch(1 << 4, &pool).unwrap();
        assert_eq!(roll, Roll { faces: 6, value: 2 });
        assert!(sm.on_roll());

        // One full refresh cycle shows "02".
        let ones = mux.tick(roll.value);
        let tens = mux.tick(roll.value);
        assert_eq!(ones.segments, display::SEGMENT_MAP[2]);
        assert_eq!(tens.segments, display::SEGMENT_MAP[0]);

        assert!(sm.on_timeout());
        assert_eq!(sm.state(), PowerState::Idle);
    }

    /// A spurious button event during a display interval rolls nothing,
    /// so it must neither touch the state machine nor restart the
    /// countdown: restarts are keyed solely on a produced roll.
    #[test]
    fn spurious_event_while_displaying_changes_nothing() {
        let pool = RandomPool::new();
        let mut sm = PowerStateMachine::new();
        assert!(sm.on_roll());

        assert_eq!(InputDispatcher::dispatch(0, &pool), None);
        assert_eq!(sm.state(), PowerState::Displaying);

        // The original countdown is still the one that expires.
        assert!(sm.on_timeout());
        assert_eq!(sm.state(), PowerState::Idle);
    }

    /// Re-press during an interval overwrites the value and the display
    /// picks the new value up whole on its next tick.
    #[test]
    fn repress_overwrites_displayed_value() {
        let mut pool = RandomPool::new();
        let mut sm = PowerStateMachine::new();
        let mut mux = DisplayMultiplexer::new();

        let first = InputDispatcher::dispatch(1 << 0, &pool).unwrap();
        assert!(sm.on_roll());
        mux.tick(first.value);

        for _ in 0..1_000 {
            pool.mix(pool.bits() & 1 == 0);
        }
        let second = InputDispatcher::dispatch(1 << 0, &pool).unwrap();
        assert!(!sm.on_roll());

        let drive = mux.tick(second.value);
        let (tens, _) = display::decompose(second.value);
        assert_eq!(drive.digit, Digit::Tens);
        assert_eq!(drive.segments, display::SEGMENT_MAP[tens as usize]);
    }
}
