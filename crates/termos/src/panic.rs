use core::panic::PanicInfo;
use cortex_m_rt::{ExceptionFrame, exception};
use cortex_m_semihosting::hprintln;
use kernel::K_KERNEL_NAME;

/// The HardFault exception handler.
///
/// Prints the exception frame on the debugger console, then halts without resetting the board so
/// the fault can be inspected.
#[exception]
unsafe fn HardFault(p_frame: &ExceptionFrame) -> ! {
    hprintln!("{:#?}", p_frame);

    #[allow(clippy::empty_loop)]
    loop {}
}

/// The panic handler.
///
/// Reports the panic on the debugger console, waits 5 seconds (216 MHz core clock) and resets
/// the system.
#[panic_handler]
fn panic(p_info: &PanicInfo) -> ! {
    hprintln!("{} has panicked !!!!!", K_KERNEL_NAME);
    hprintln!("{}", p_info);
    hprintln!("\r\nSystem will reboot in 5 seconds...");

    cortex_m::asm::delay(216_000_000 * 5);

    cortex_m::peripheral::SCB::sys_reset();
}
