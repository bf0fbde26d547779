//! Event-driven scheduler loop.
//!
//! Interrupts only count events in [`EventFlags`]. The loop turns them into ticker, script,
//! callback and serial input work on the engine, in a fixed order.

use crate::callbacks::CallbackSlot;
use crate::engine::Engine;
use core::sync::atomic::{AtomicU32, Ordering};
use hal_interface::{HalInterface, Interface, SerialLink};

/// Events raised from interrupt context.
///
/// Interrupt handlers only increment these counters. Everything they trigger runs later, on the
/// scheduler loop, in [`Scheduler::periodic_task`].
pub struct EventFlags {
    timer_ticks: AtomicU32,
    switch1_presses: AtomicU32,
    switch2_presses: AtomicU32,
    ticker_ticks: AtomicU32,
}

impl EventFlags {
    pub const fn new() -> EventFlags {
        EventFlags {
            timer_ticks: AtomicU32::new(0),
            switch1_presses: AtomicU32::new(0),
            switch2_presses: AtomicU32::new(0),
            ticker_ticks: AtomicU32::new(0),
        }
    }

    /// Callback timer elapsed.
    pub fn raise_timer(&self) {
        self.timer_ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Switch 1 or 2 pressed. Other numbers are ignored.
    pub fn raise_switch(&self, p_switch: u8) {
        match p_switch {
            1 => self.switch1_presses.fetch_add(1, Ordering::Relaxed),
            2 => self.switch2_presses.fetch_add(1, Ordering::Relaxed),
            _ => 0,
        };
    }

    /// Ticker timer elapsed.
    pub fn raise_ticker(&self) {
        self.ticker_ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn take(p_counter: &AtomicU32) -> u32 {
        p_counter.swap(0, Ordering::Relaxed)
    }
}

impl Default for EventFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Single consumer of every event: owns the [`Engine`] and drives it from the main loop.
///
/// # Fields
/// * `engine` - The command engine.
/// * `ticks_per_script_step` - Number of ticker ticks between two steps of the script worker.
/// * `tick_counter` - Ticker ticks consumed so far.
pub struct Scheduler {
    engine: Engine,
    ticks_per_script_step: u32,
    tick_counter: u32,
}

impl Scheduler {
    pub fn new(p_engine: Engine, p_ticks_per_script_step: u32) -> Scheduler {
        Scheduler {
            engine: p_engine,
            ticks_per_script_step: p_ticks_per_script_step.max(1),
            tick_counter: 0,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Consumes the pending events.
    ///
    /// Order: ticker ticks (each advances the tickers, every `ticks_per_script_step` ticks one
    /// script step runs), callback timer ticks, switch presses, then input of both serial
    /// links. Without a ticker timer the script worker steps once per call.
    pub fn periodic_task(&mut self, p_hal: &mut dyn HalInterface, p_events: &EventFlags) {
        if self.engine.is_available(Interface::TickerTimer) {
            for _ in 0..EventFlags::take(&p_events.ticker_ticks) {
                self.engine.advance_tickers(p_hal);
                self.tick_counter = self.tick_counter.wrapping_add(1);
                if self.tick_counter.is_multiple_of(self.ticks_per_script_step) {
                    self.engine.script_step(p_hal);
                }
            }
        } else {
            self.engine.script_step(p_hal);
        }

        for _ in 0..EventFlags::take(&p_events.timer_ticks) {
            self.engine.timer_tick(p_hal);
        }
        for (l_slot, l_counter) in [
            (CallbackSlot::Switch1, &p_events.switch1_presses),
            (CallbackSlot::Switch2, &p_events.switch2_presses),
        ] {
            for _ in 0..EventFlags::take(l_counter) {
                self.engine.callback_tick(p_hal, l_slot);
            }
        }

        self.engine.poll_input(p_hal, SerialLink::Primary);
        self.engine.poll_input(p_hal, SerialLink::Secondary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::test_support::{run, setup};
    use hal_interface::mock::MockHal;

    fn scheduler() -> (Scheduler, MockHal) {
        let (l_engine, l_hal) = setup();
        (Scheduler::new(l_engine, 2), l_hal)
    }

    #[test]
    fn test_events_are_consumed_once() {
        let l_events = EventFlags::new();
        l_events.raise_ticker();
        l_events.raise_ticker();
        l_events.raise_switch(3);
        assert_eq!(EventFlags::take(&l_events.ticker_ticks), 2);
        assert_eq!(EventFlags::take(&l_events.ticker_ticks), 0);
        assert_eq!(EventFlags::take(&l_events.switch1_presses), 0);
    }

    #[test]
    fn test_script_steps_every_other_tick() {
        let (mut l_sched, mut l_hal) = scheduler();
        let l_engine = l_sched.engine_mut();
        run(l_engine, &mut l_hal, "-script 0 -reg INC R0");
        run(l_engine, &mut l_hal, "-script 1 -reg INC R0");
        run(l_engine, &mut l_hal, "-script 0 x");

        let l_events = EventFlags::new();
        l_events.raise_ticker();
        l_sched.periodic_task(&mut l_hal, &l_events);
        assert_eq!(l_sched.engine().scripts().pending(), 2);

        l_events.raise_ticker();
        l_sched.periodic_task(&mut l_hal, &l_events);
        assert_eq!(l_sched.engine().scripts().pending(), 1);
        assert_eq!(l_sched.engine().registers().get(0), 1);
        assert!(l_hal.output(SerialLink::Primary).contains("Operation completed. R0 = 1"));
    }

    #[test]
    fn test_switch_press_runs_its_slot() {
        let (mut l_sched, mut l_hal) = scheduler();
        run(l_sched.engine_mut(), &mut l_hal, "-callback 2 2 -gpio 3 t");

        let l_events = EventFlags::new();
        for _ in 0..3 {
            l_events.raise_switch(2);
        }
        l_events.raise_switch(1);
        l_sched.periodic_task(&mut l_hal, &l_events);
        assert_eq!(l_hal.toggle_count(3), 2);
    }

    #[test]
    fn test_scripts_step_without_ticker_timer() {
        let (mut l_sched, mut l_hal) = scheduler();
        l_sched
            .engine_mut()
            .set_available(Interface::TickerTimer, false);
        run(l_sched.engine_mut(), &mut l_hal, "-script 5 -rem a");
        run(l_sched.engine_mut(), &mut l_hal, "-script 5 x");

        l_sched.periodic_task(&mut l_hal, &EventFlags::new());
        assert_eq!(l_sched.engine().scripts().pending(), 0);
        assert!(l_hal.output(SerialLink::Primary).contains("Remark acknowledged."));
    }
}
