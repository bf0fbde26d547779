//! Compile-time limits of the engine.

use heapless::String;

/// Maximum length of one command line or payload, in bytes.
pub const K_MAX_CMD_LENGTH: usize = 318;
/// Size of a serial input line buffer (command plus terminator).
pub const K_INPUT_BUFFER_SIZE: usize = 320;
/// Capacity of each callback payload queue.
pub const K_QUEUE_SIZE: usize = 32;
/// Bytes emitted per tick by a chunked callback slot.
pub const K_OUTPUT_CHUNK: usize = 64;
/// Capacity of the buffer capturing the output of one command.
pub const K_RESPONSE_SIZE: usize = 2048;

pub const K_CALLBACK_COUNT: usize = 3;
pub const K_TICKER_COUNT: usize = 16;
pub const K_REGISTER_COUNT: usize = 32;
pub const K_SCRIPT_LINES: usize = 64;
pub const K_SCRIPT_QUEUE_SIZE: usize = 32;

/// Timer periods at or above this value deliver callback output in one write.
pub const K_LARGE_INTERVAL_MS: u32 = 100;
/// Smallest period accepted by `-timer`.
pub const K_MIN_TIMER_PERIOD_MS: u32 = 5;

/// GPIO lines used as LEDs, switched off by `-reset` and at boot.
pub const K_LED_COUNT: u8 = 4;
/// GPIO lines wired to the switches, read-only.
pub const K_SWITCH_PINS: [u8; 2] = [6, 7];

/// One command line or queued payload.
pub type Payload = String<K_MAX_CMD_LENGTH>;
/// Captured output of one command.
pub type Response = String<K_RESPONSE_SIZE>;

/// Readable address range for `-memr`, bounds inclusive and word aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub name: &'static str,
    pub start: u32,
    pub end: u32,
}

impl MemoryRegion {
    pub fn contains(&self, p_address: u32) -> bool {
        p_address >= self.start && p_address <= self.end
    }
}

/// Flash and SRAM of the reference board.
pub const K_DEFAULT_MEMORY_MAP: [MemoryRegion; 2] = [
    MemoryRegion {
        name: "FLASH",
        start: 0x0000_0000,
        end: 0x000F_FFFC,
    },
    MemoryRegion {
        name: "SRAM",
        start: 0x2000_0000,
        end: 0x2003_FFFC,
    },
];
