//! End-to-end scenarios: boot on a mock board, type commands on the serial links, raise
//! interrupt events and check what the board saw.

use hal_interface::mock::MockHal;
use hal_interface::{Interface, K_BUFFER_SIZE, SerialLink, TimerId};
use kernel::callbacks::CallbackSlot;
use kernel::{BootConfig, ErrorCounter, EventFlags, Scheduler, boot};

struct Board {
    hal: MockHal,
    sched: Scheduler,
    events: EventFlags,
}

impl Board {
    fn new() -> Self {
        Self::with_failures(&[])
    }

    fn with_failures(p_failing: &[Interface]) -> Self {
        let mut l_hal = MockHal::new();
        for l_if in p_failing {
            l_hal.fail_on_open(*l_if);
        }
        let l_sched = boot(BootConfig::default(), &mut l_hal);
        l_hal.clear_output(SerialLink::Primary);
        Board {
            hal: l_hal,
            sched: l_sched,
            events: EventFlags::new(),
        }
    }

    fn type_line(&mut self, p_line: &str) {
        self.hal.inject_rx(SerialLink::Primary, p_line.as_bytes());
        self.hal.inject_rx(SerialLink::Primary, b"\r");
        // One serial read per task.
        for _ in 0..=(p_line.len() / K_BUFFER_SIZE) {
            self.sched.periodic_task(&mut self.hal, &self.events);
        }
    }

    fn ticks(&mut self, p_count: u32) {
        for _ in 0..p_count {
            self.events.raise_ticker();
            self.sched.periodic_task(&mut self.hal, &self.events);
        }
    }

    fn console(&self) -> String {
        self.hal.output(SerialLink::Primary)
    }
}

#[test]
fn test_timer_callback_toggles_led_three_times() {
    let mut l_board = Board::new();
    l_board.type_line("-timer 10");
    l_board.type_line("-callback 0 3 -gpio 0 t");
    assert_eq!(l_board.hal.timer_period(TimerId::Callback), Some(10));

    for _ in 0..3 {
        l_board.events.raise_timer();
        l_board.sched.periodic_task(&mut l_board.hal, &l_board.events);
    }

    assert_eq!(l_board.hal.toggle_count(0), 3);
    let l_slot = l_board.sched.engine().callbacks().slot(CallbackSlot::Timer);
    assert!(l_slot.count().is_idle());
    assert_eq!(l_slot.queued(), 0);
    assert_eq!(l_board.hal.timer_period(TimerId::Callback), None);
    assert!(l_board.console().contains("GPIO 0 toggled to 1"));
}

#[test]
fn test_conditional_branches_to_script_or_command() {
    let mut l_board = Board::new();
    l_board.type_line("-script 10 -print from script");
    l_board.type_line("-reg MOV R0 #6");
    l_board.type_line("-if R0 > #5 ? -script 10 : -print false");
    l_board.ticks(2);
    assert!(l_board.console().contains("\r\nfrom script\r\n"));
    assert!(!l_board.console().contains("\r\nfalse\r\n"));

    l_board.type_line("-reg MOV R0 #3");
    l_board.type_line("-if R0 > #5 ? -script 10 : -print false");
    assert!(l_board.console().contains("\r\nfalse\r\n"));
}

#[test]
fn test_script_loop_is_bounded_and_stops_on_clear() {
    let mut l_board = Board::new();
    l_board.type_line("-script 5 -reg INC R0");
    l_board.type_line("-script 6 -script 5 x");
    l_board.type_line("-script 5 x");

    for _ in 0..40 {
        l_board.ticks(1);
        assert!(l_board.sched.engine().scripts().pending() <= 2);
    }
    let l_loops = l_board.sched.engine().registers().get(0);
    assert!(l_loops >= 5);

    l_board.type_line("-script clear");
    assert_eq!(l_board.sched.engine().scripts().pending(), 0);
    let l_after_clear = l_board.sched.engine().registers().get(0);
    l_board.ticks(10);
    assert_eq!(l_board.sched.engine().registers().get(0), l_after_clear);
    assert_eq!(l_board.sched.engine().errors().count(ErrorCounter::Script), 0);
}

#[test]
fn test_script_self_reference_stays_at_depth_one() {
    let mut l_board = Board::new();
    l_board.type_line("-script 5 -script 5 x");
    l_board.type_line("-script 5 x");
    for _ in 0..20 {
        l_board.ticks(1);
        assert!(l_board.sched.engine().scripts().pending() <= 1);
    }
    assert_eq!(l_board.sched.engine().scripts().pending(), 1);
}

#[test]
fn test_ticker_initial_delay_and_period() {
    let mut l_board = Board::new();
    l_board.type_line("-ticker 0 50 100 -1 -reg INC R1");

    l_board.ticks(49);
    assert_eq!(l_board.sched.engine().registers().get(1), 0);
    l_board.ticks(1);
    assert_eq!(l_board.sched.engine().registers().get(1), 1);
    let l_ticker = l_board.sched.engine().tickers().get(0).unwrap();
    assert_eq!(l_ticker.next_execution, 150);

    l_board.ticks(99);
    assert_eq!(l_board.sched.engine().registers().get(1), 1);
    l_board.ticks(1);
    assert_eq!(l_board.sched.engine().registers().get(1), 2);
}

#[test]
fn test_secondary_link_commands_answer_on_primary() {
    let mut l_board = Board::new();
    l_board
        .hal
        .inject_rx(SerialLink::Secondary, b"-reg MOV R7 #42\n");
    l_board
        .sched
        .periodic_task(&mut l_board.hal, &l_board.events);
    assert!(l_board.console().contains("Operation completed. R7 = 42"));
    assert!(l_board.hal.output(SerialLink::Secondary).is_empty());
}

#[test]
fn test_degraded_boot_keeps_the_terminal_alive() {
    let mut l_board = Board::with_failures(&[Interface::TickerTimer, Interface::Switches]);
    assert_eq!(
        l_board.sched.engine().errors().count(ErrorCounter::Timer),
        1
    );

    l_board.type_line("-callback 1 -1 -gpio 1 t");
    assert!(l_board.console().contains("Callback : Switches are unavailable."));

    l_board.type_line("-script 0 -print still running");
    l_board.type_line("-script 0 x");
    l_board
        .sched
        .periodic_task(&mut l_board.hal, &l_board.events);
    assert!(l_board.console().contains("\r\nstill running\r\n"));
}

#[test]
fn test_error_report_counts_each_failure_kind() {
    let mut l_board = Board::new();
    l_board.type_line("-nothing");
    l_board.type_line("-reg DIV R0 R1 #0");
    l_board.type_line("-memr 0xFFFFFFF0");
    l_board.hal.clear_output(SerialLink::Primary);
    l_board.type_line("-error");

    let l_report = l_board.console();
    assert!(l_report.contains("----------ERROR COUNTS----------"));
    assert!(l_report.contains("Unknown commands          1"));
    assert!(l_report.contains("Invalid addresses         1"));
    assert!(l_report.contains("Register errors           1"));
    assert!(l_report.contains("Script errors             0"));
}
