//! Periodic command tickers driven by the shared tick counter.

use crate::config::{K_TICKER_COUNT, Payload};
use crate::{Count, KernelError, KernelResult};
use hal_interface::SerialLink;

/// Longest initial delay or period, in ticks. Farther targets would look already passed to the
/// wrapping due check.
pub const K_MAX_TICKER_TICKS: u32 = i32::MAX as u32;

/// One ticker. Delays and periods are expressed in ticks.
#[derive(Debug, Clone)]
pub struct Ticker {
    pub active: bool,
    pub initial_delay: u32,
    pub period: u32,
    pub count: Count,
    pub payload: Payload,
    pub next_execution: u32,
    pub channel: SerialLink,
}

impl Ticker {
    const fn new() -> Self {
        Self {
            active: false,
            initial_delay: 0,
            period: 0,
            count: Count::IDLE,
            payload: Payload::new(),
            next_execution: 0,
            channel: SerialLink::Primary,
        }
    }

    /// True when `p_tick` has reached the next execution time. The comparison survives the
    /// counter wrapping around.
    fn is_due(&self, p_tick: u32) -> bool {
        self.active && p_tick.wrapping_sub(self.next_execution) as i32 >= 0
    }
}

/// The 16 tickers and the tick counter they share.
pub struct TickerBank {
    tickers: [Ticker; K_TICKER_COUNT],
    current_tick: u32,
}

impl TickerBank {
    pub const fn new() -> Self {
        Self {
            tickers: [const { Ticker::new() }; K_TICKER_COUNT],
            current_tick: 0,
        }
    }

    pub fn current_tick(&self) -> u32 {
        self.current_tick
    }

    pub fn get(&self, p_index: usize) -> Option<&Ticker> {
        self.tickers.get(p_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticker> {
        self.tickers.iter()
    }

    /// Arms a ticker: its first execution happens `p_initial_delay` ticks from now.
    ///
    /// # Errors
    /// `KernelError::TickerError` for an index out of range, a null period, a delay or period
    /// above [`K_MAX_TICKER_TICKS`], an idle count or a payload that does not fit. The ticker is
    /// left untouched.
    pub fn arm(
        &mut self,
        p_index: usize,
        p_initial_delay: u32,
        p_period: u32,
        p_count: Count,
        p_payload: &str,
        p_channel: SerialLink,
    ) -> KernelResult<()> {
        if p_index >= K_TICKER_COUNT {
            return Err(KernelError::TickerError("Invalid ticker index."));
        }
        if p_period == 0 {
            return Err(KernelError::TickerError("Period must be positive."));
        }
        if p_initial_delay > K_MAX_TICKER_TICKS {
            return Err(KernelError::TickerError("Initial delay too large."));
        }
        if p_period > K_MAX_TICKER_TICKS {
            return Err(KernelError::TickerError("Period too large."));
        }
        if p_count.is_idle() {
            return Err(KernelError::TickerError("Count must be -1 or positive."));
        }
        let mut l_payload = Payload::new();
        l_payload
            .push_str(p_payload)
            .map_err(|_| KernelError::TickerError("Payload too long."))?;

        self.tickers[p_index] = Ticker {
            active: true,
            initial_delay: p_initial_delay,
            period: p_period,
            count: p_count,
            payload: l_payload,
            next_execution: self.current_tick.wrapping_add(p_initial_delay),
            channel: p_channel,
        };
        Ok(())
    }

    /// Advances the tick counter by one and schedules every due ticker.
    ///
    /// Each due ticker is rescheduled one period later and its count consumed (deactivating it
    /// at 0) before its payload runs, so a payload re-arming its own ticker is not overridden.
    ///
    /// # Returns
    /// A bit mask of the tickers whose payload must run now (bit `n` for ticker `n`).
    pub fn advance(&mut self) -> u16 {
        self.current_tick = self.current_tick.wrapping_add(1);
        let mut l_due = 0u16;
        for (l_idx, l_ticker) in self.tickers.iter_mut().enumerate() {
            if !l_ticker.is_due(self.current_tick) {
                continue;
            }
            l_ticker.next_execution = self.current_tick.wrapping_add(l_ticker.period);
            l_ticker.count.decrement();
            if l_ticker.count.is_idle() {
                l_ticker.active = false;
            }
            l_due |= 1 << l_idx;
        }
        l_due
    }

    /// Deactivates every ticker.
    pub fn deactivate_all(&mut self) {
        self.tickers.iter_mut().for_each(|l_t| l_t.active = false);
    }
}

impl Default for TickerBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank_with(p_delay: u32, p_period: u32, p_count: Count) -> TickerBank {
        let mut l_bank = TickerBank::new();
        l_bank
            .arm(0, p_delay, p_period, p_count, "-gpio 0 t", SerialLink::Primary)
            .unwrap();
        l_bank
    }

    #[test]
    fn test_initial_delay_then_period() {
        let mut l_bank = bank_with(50, 100, Count::Infinite);
        for _ in 0..49 {
            assert_eq!(l_bank.advance(), 0);
        }
        assert_eq!(l_bank.advance(), 1);
        assert_eq!(l_bank.current_tick(), 50);
        assert_eq!(l_bank.get(0).map(|l_t| l_t.next_execution), Some(150));

        for _ in 0..99 {
            assert_eq!(l_bank.advance(), 0);
        }
        assert_eq!(l_bank.advance(), 1);
    }

    #[test]
    fn test_finite_count_deactivates() {
        let mut l_bank = bank_with(1, 2, Count::Finite(2));
        let l_fired = (0..20).filter(|_| l_bank.advance() != 0).count();
        assert_eq!(l_fired, 2);
        assert!(!l_bank.get(0).map(|l_t| l_t.active).unwrap_or(true));
    }

    #[test]
    fn test_invalid_arguments_leave_ticker_untouched() {
        let mut l_bank = TickerBank::new();
        assert!(l_bank.arm(16, 0, 10, Count::Infinite, "-print a", SerialLink::Primary).is_err());
        assert!(l_bank.arm(3, 0, 0, Count::Infinite, "-print a", SerialLink::Primary).is_err());
        assert!(l_bank.arm(3, 0, 10, Count::IDLE, "-print a", SerialLink::Primary).is_err());
        assert!(l_bank.iter().all(|l_t| !l_t.active));
    }

    #[test]
    fn test_several_tickers_due_together() {
        let mut l_bank = TickerBank::new();
        l_bank.arm(2, 3, 5, Count::Infinite, "-print a", SerialLink::Primary).unwrap();
        l_bank.arm(9, 3, 7, Count::Infinite, "-print b", SerialLink::Secondary).unwrap();
        l_bank.advance();
        l_bank.advance();
        assert_eq!(l_bank.advance(), (1 << 2) | (1 << 9));
    }

    #[test]
    fn test_due_check_survives_wraparound() {
        let mut l_bank = TickerBank::new();
        l_bank.current_tick = u32::MAX - 1;
        l_bank.arm(0, 3, 1, Count::Infinite, "-print a", SerialLink::Primary).unwrap();
        assert_eq!(l_bank.advance(), 0);
        assert_eq!(l_bank.advance(), 0);
        assert_eq!(l_bank.advance(), 1);
        assert_eq!(l_bank.current_tick(), 1);
    }

    #[test]
    fn test_delay_and_period_are_capped() {
        let mut l_bank = TickerBank::new();
        assert_eq!(
            l_bank.arm(0, 3_000_000_000, 10, Count::Infinite, "-print a", SerialLink::Primary),
            Err(KernelError::TickerError("Initial delay too large."))
        );
        assert_eq!(
            l_bank.arm(0, 1, K_MAX_TICKER_TICKS + 1, Count::Infinite, "-print a", SerialLink::Primary),
            Err(KernelError::TickerError("Period too large."))
        );
        assert_eq!(l_bank.advance(), 0);

        l_bank
            .arm(0, K_MAX_TICKER_TICKS, 10, Count::Infinite, "-print a", SerialLink::Primary)
            .unwrap();
        for _ in 0..1000 {
            assert_eq!(l_bank.advance(), 0);
        }
    }

    #[test]
    fn test_longest_period_does_not_refire_early() {
        let mut l_bank = bank_with(1, K_MAX_TICKER_TICKS, Count::Infinite);
        assert_eq!(l_bank.advance(), 1);
        for _ in 0..1000 {
            assert_eq!(l_bank.advance(), 0);
        }
    }

    #[test]
    fn test_deactivate_all() {
        let mut l_bank = bank_with(0, 1, Count::Infinite);
        l_bank.deactivate_all();
        assert_eq!(l_bank.advance(), 0);
    }
}
