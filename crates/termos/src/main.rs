#![no_std]
#![no_main]

//! TermOS firmware entry point.
//!
//! Brings the board up, boots the kernel, then runs the scheduler loop. Interrupt handlers only
//! raise [`G_EVENTS`]; the loop consumes them and sleeps until the next interrupt.

mod interrupts;
mod panic;

use cortex_m_rt::entry;
use hal_interface::BoardHal;
use kernel::config::MemoryRegion;
use kernel::{BootConfig, EngineConfig, EventFlags, Milliseconds};

/// Events raised by the interrupt handlers.
pub static G_EVENTS: EventFlags = EventFlags::new();

/// Flash and SRAM of the STM32F769, readable with `-memr`.
const K_BOARD_MEMORY_MAP: [MemoryRegion; 2] = [
    MemoryRegion {
        name: "FLASH",
        start: 0x0800_0000,
        end: 0x081F_FFFC,
    },
    MemoryRegion {
        name: "SRAM",
        start: 0x2000_0000,
        end: 0x2007_FFFC,
    },
];

#[entry]
fn main() -> ! {
    // Initialize board drivers
    let mut l_hal = BoardHal::new();

    // Start kernel
    let mut l_sched = kernel::boot(
        BootConfig {
            ticker_period: Milliseconds(10),
            script_step_period: Milliseconds(20),
            engine: EngineConfig {
                memory_map: &K_BOARD_MEMORY_MAP,
                ..EngineConfig::default()
            },
        },
        &mut l_hal,
    );

    loop {
        l_sched.periodic_task(&mut l_hal, &G_EVENTS);
        cortex_m::asm::wfi();
    }
}
