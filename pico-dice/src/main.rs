//! Electronic die firmware for the RP2040.
//!
//! Pressing one of six buttons rolls a d4/d6/d8/d10/d12/d20 and shows
//! the result on a two-digit seven-segment readout for four seconds,
//! then the device blanks the display, throttles the clock, and waits
//! for the next press. A ring-oscillator noise line is debiased and
//! stirred into the random pool continuously, including while idle.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use defmt_rtt as _;
use dice_core::{
    DisplayMultiplexer, EntropyCollector, InputDispatcher, PowerState, PowerStateMachine,
    RandomPool,
};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker, Timer};
use panic_probe as _;
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

mod board;

use board::{Buttons, RoscNoise, SevenSegment, SystemClock};

/// Entropy sampling period at full clock. Well inside the noise
/// source's correlation time, slow enough to leave the executor plenty
/// of headroom.
const ENTROPY_TICK: Duration = Duration::from_micros(50);

/// Entropy sampling period while the clock idles divided down. The
/// original's entropy timer ran off the prescaled CPU clock and slowed
/// with it; scaling the period by the same divisor keeps the slow CPU
/// from spending every cycle in the entropy wakeup.
const IDLE_ENTROPY_TICK: Duration =
    Duration::from_micros(ENTROPY_TICK.as_micros() * board::IDLE_CLK_DIV as u64);

/// Display refresh, both digit phases together: 240 Hz, 120 Hz per
/// digit, comfortably above the persistence-of-vision threshold.
const REFRESH_TICK: Duration = Duration::from_hz(240);

/// How long a roll stays on the readout before powering down.
const DISPLAY_TIMEOUT: Duration = Duration::from_secs(4);

/// Shared cells. Each has exactly one writer:
/// - POOL is mixed by the entropy task and only read at roll time.
/// - DISPLAY_VALUE and DISPLAY_ON are written by the control loop and
///   read by the display task; the atomic store cannot be torn, so a
///   refresh tick always sees a whole roll, never half of one.
static POOL: Mutex<CriticalSectionRawMutex, RefCell<RandomPool>> =
    Mutex::new(RefCell::new(RandomPool::new()));
static DISPLAY_VALUE: AtomicU8 = AtomicU8::new(0);
static DISPLAY_ON: AtomicBool = AtomicBool::new(false);
static DISPLAY_WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

#[embassy_executor::task]
async fn entropy_task() -> ! {
    let noise = RoscNoise;
    let mut collector = EntropyCollector::new();
    loop {
        let reduced = SystemClock::is_reduced();
        let mut ticker = Ticker::every(if reduced { IDLE_ENTROPY_TICK } else { ENTROPY_TICK });
        while SystemClock::is_reduced() == reduced {
            ticker.next().await;
            let Some(raw) = noise.sample() else {
                continue;
            };
            if let Some(bit) = collector.offer(raw) {
                POOL.lock(|pool| pool.borrow_mut().mix(bit));
            }
        }
    }
}

#[embassy_executor::task]
async fn display_task(mut seg: SevenSegment) -> ! {
    let mut mux = DisplayMultiplexer::new();
    loop {
        if !DISPLAY_ON.load(Ordering::Relaxed) {
            seg.blank();
            DISPLAY_WAKE.wait().await;
            continue;
        }
        // A fresh interval always starts on the ones digit.
        mux.reset();
        let mut ticker = Ticker::every(REFRESH_TICK);
        while DISPLAY_ON.load(Ordering::Relaxed) {
            ticker.next().await;
            seg.apply(mux.tick(DISPLAY_VALUE.load(Ordering::Relaxed)));
        }
    }
}

/// One button event. Full clock comes back before any roll work; a
/// spurious event (no line asserted by the time we sample) rolls
/// nothing and drops the clock again if we were idle. Returns whether
/// a roll was produced; only a produced roll may restart the display
/// countdown.
fn handle_press(clock: &SystemClock, sm: &mut PowerStateMachine, mask: u8) -> bool {
    clock.full_speed();
    match POOL.lock(|pool| InputDispatcher::dispatch(mask, &pool.borrow())) {
        Some(roll) => {
            DISPLAY_VALUE.store(roll.value, Ordering::Relaxed);
            let woke = sm.on_roll();
            DISPLAY_ON.store(true, Ordering::Relaxed);
            DISPLAY_WAKE.signal(());
            info!(
                "rolled d{}: {} ({})",
                roll.faces,
                roll.value,
                if woke { "wake" } else { "restart" }
            );
            true
        }
        None => {
            debug!("spurious button event, mask {=u8:b}", mask);
            if sm.state() == PowerState::Idle {
                clock.reduced_speed();
            }
            false
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("dice up");

    let mut buttons = Buttons::new([
        Input::new(p.PIN_0, Pull::Up),
        Input::new(p.PIN_1, Pull::Up),
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_4, Pull::Up),
        Input::new(p.PIN_5, Pull::Up),
    ]);
    let seg = SevenSegment::new(
        [
            Output::new(p.PIN_6, Level::High),
            Output::new(p.PIN_7, Level::High),
            Output::new(p.PIN_8, Level::High),
            Output::new(p.PIN_9, Level::High),
            Output::new(p.PIN_10, Level::High),
            Output::new(p.PIN_11, Level::High),
            Output::new(p.PIN_12, Level::High),
        ],
        Output::new(p.PIN_13, Level::Low),
        Output::new(p.PIN_14, Level::Low),
    );
    let clock = SystemClock;

    unwrap!(spawner.spawn(entropy_task()));
    unwrap!(spawner.spawn(display_task(seg)));

    let mut sm = PowerStateMachine::new();
    // Countdown deadline, anchored at the moment of each roll. Spurious
    // events and release waits never move it.
    let mut deadline = Instant::now();
    clock.reduced_speed();

    loop {
        match sm.state() {
            PowerState::Idle => {
                let mask = buttons.wait_for_press().await;
                if handle_press(&clock, &mut sm, mask) {
                    deadline = Instant::now() + DISPLAY_TIMEOUT;
                }
                buttons.wait_for_release().await;
            }
            PowerState::Displaying => {
                match select(buttons.wait_for_press(), Timer::at(deadline)).await {
                    Either::First(mask) => {
                        if handle_press(&clock, &mut sm, mask) {
                            deadline = Instant::now() + DISPLAY_TIMEOUT;
                        }
                        buttons.wait_for_release().await;
                    }
                    Either::Second(()) => {
                        sm.on_timeout();
                        DISPLAY_ON.store(false, Ordering::Relaxed);
                        clock.reduced_speed();
                        info!("display interval over, idling");
                    }
                }
            }
        }
    }
}
