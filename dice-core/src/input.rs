//! Button-press dispatch: map a pressed-lines mask to a die and draw.

use crate::entropy::RandomPool;

/// Face count per switch index. Order matches the physical button row.
pub const DIE_CATALOG: [u8; 6] = [20, 12, 10, 8, 6, 4];

/// Mask covering the six button lines.
pub const BUTTON_LINES: u8 = 0x3F;

/// Outcome of one press.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Roll {
    pub faces: u8,
    pub value: u8,
}

/// Scans pressed lines in fixed priority order and draws from the pool.
pub struct InputDispatcher;

impl InputDispatcher {
    /// Handle one press event. `mask` has a bit set per asserted line;
    /// the lowest asserted index wins when several are held at once.
    /// An empty mask is a spurious wakeup and draws nothing.
    pub fn dispatch(mask: u8, pool: &RandomPool) -> Option<Roll> {
        let faces = Self::die_for_mask(mask)?;
        Some(Roll {
            faces,
            value: pool.draw(faces),
        })
    }

    /// Face count for the lowest asserted button line, if any.
    pub fn die_for_mask(mask: u8) -> Option<u8> {
        let mask = mask & BUTTON_LINES;
        if mask == 0 {
            return None;
        }
        Some(DIE_CATALOG[mask.trailing_zeros() as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_button_maps_to_its_die() {
        for (i, &faces) in DIE_CATALOG.iter().enumerate() {
            assert_eq!(InputDispatcher::die_for_mask(1 << i), Some(faces));
        }
    }

    #[test]
    fn lowest_asserted_line_wins() {
        // Buttons 1 (d12) and 4 (d6) held together.
        assert_eq!(InputDispatcher::die_for_mask(0b01_0010), Some(12));
        assert_eq!(InputDispatcher::die_for_mask(BUTTON_LINES), Some(20));
    }

    #[test]
    fn spurious_wakeup_is_a_no_op() {
        let pool = RandomPool::new();
        assert_eq!(InputDispatcher::dispatch(0, &pool), None);
        // Bits outside the button lines are not presses either.
        assert_eq!(InputDispatcher::dispatch(0xC0, &pool), None);
    }

    #[test]
    fn dispatch_draws_from_the_pool() {
        // Boot seed fixture: button 4 is the six-sided die.
        let pool = RandomPool::new();
        let roll = InputDispatcher::dispatch(1 << 4, &pool).unwrap();
        assert_eq!(roll.faces, 6);
        assert_eq!(roll.value, 2);
    }
}
