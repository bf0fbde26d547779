use crate::G_EVENTS;
use stm32f7::stm32f769::interrupt;

unsafe extern "C" {
    /// Receive handling of the primary link (USART1).
    pub fn USART1_it_handler();

    /// Receive handling of the secondary link (UART7).
    pub fn UART7_it_handler();

    /// Acknowledges the callback timer (TIM6) and services the DAC underrun flag.
    pub fn TIM6_it_handler();

    /// Acknowledges the ticker timer (TIM7).
    pub fn TIM7_it_handler();

    /// Clears the pending flag of an EXTI line.
    pub fn EXTI_it_handler(p_line: u8);
}

/// Interrupt handler for USART1.
///
/// The driver buffers received bytes; the scheduler drains them.
#[allow(non_snake_case)]
#[interrupt]
fn USART1() {
    unsafe {
        USART1_it_handler();
    }
}

#[allow(non_snake_case)]
#[interrupt]
fn UART7() {
    unsafe {
        UART7_it_handler();
    }
}

/// Callback timer period elapsed.
#[allow(non_snake_case)]
#[interrupt]
fn TIM6_DAC() {
    unsafe {
        TIM6_it_handler();
    }
    G_EVENTS.raise_timer();
}

/// Ticker timer period elapsed.
#[allow(non_snake_case)]
#[interrupt]
fn TIM7() {
    unsafe {
        TIM7_it_handler();
    }
    G_EVENTS.raise_ticker();
}

/// Switch 1.
#[allow(non_snake_case)]
#[interrupt]
fn EXTI0() {
    unsafe {
        EXTI_it_handler(0);
    }
    G_EVENTS.raise_switch(1);
}

/// Switch 2.
#[allow(non_snake_case)]
#[interrupt]
fn EXTI1() {
    unsafe {
        EXTI_it_handler(1);
    }
    G_EVENTS.raise_switch(2);
}
