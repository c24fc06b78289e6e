//! Display/power state machine.
//!
//! Two states for the life of the device: `Idle` (display off, buttons
//! armed, CPU clocked down) and `Displaying` (display refreshing, the
//! countdown running). A roll enters or re-enters `Displaying`; only
//! countdown expiry returns to `Idle`. The side effects (clock rate,
//! timers, blanking) belong to the firmware; this type tracks which of
//! them a transition requires.

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PowerState {
    Idle,
    Displaying,
}

pub struct PowerStateMachine {
    state: PowerState,
}

impl PowerStateMachine {
    pub const fn new() -> Self {
        Self {
            state: PowerState::Idle,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    /// A roll happened. Returns true when this wakes the device out of
    /// `Idle`; false when we were already displaying and only the
    /// countdown restarts. Either way the caller must (re)start the
    /// countdown and publish the new value.
    pub fn on_roll(&mut self) -> bool {
        let woke = self.state == PowerState::Idle;
        self.state = PowerState::Displaying;
        woke
    }

    /// The countdown expired. Returns true when this actually ends a
    /// display interval; a timeout while already `Idle` is spurious
    /// and must change nothing.
    pub fn on_timeout(&mut self) -> bool {
        let was_displaying = self.state == PowerState::Displaying;
        self.state = PowerState::Idle;
        was_displaying
    }
}

impl Default for PowerStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_while_idle_starts_a_display_interval() {
        let mut sm = PowerStateMachine::new();
        assert_eq!(sm.state(), PowerState::Idle);
        assert!(sm.on_roll());
        assert_eq!(sm.state(), PowerState::Displaying);
    }

    #[test]
    fn timeout_returns_to_idle_exactly_once() {
        let mut sm = PowerStateMachine::new();
        sm.on_roll();
        assert!(sm.on_timeout());
        assert_eq!(sm.state(), PowerState::Idle);
        // A second expiry with no intervening press is spurious.
        assert!(!sm.on_timeout());
        assert_eq!(sm.state(), PowerState::Idle);
    }

    #[test]
    fn repress_restarts_without_passing_through_idle() {
        let mut sm = PowerStateMachine::new();
        assert!(sm.on_roll());
        // Re-press during the display interval: no wake, no Idle hop,
        // just a countdown restart.
        assert!(!sm.on_roll());
        assert_eq!(sm.state(), PowerState::Displaying);
        assert!(sm.on_timeout());
    }
}
