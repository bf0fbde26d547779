//! Callback slots: one queue of payloads per event source, with throttled output delivery.
//!
//! The slot only keeps state. Running the head payload and writing its output to the serial link
//! is done by the engine, which calls [`Callback::begin`], [`Callback::take_chunk`] and
//! [`Callback::finish`] in that order on every tick.

use crate::config::{K_CALLBACK_COUNT, K_OUTPUT_CHUNK, K_QUEUE_SIZE, Payload, Response};
use crate::ring_buffer::RingBuffer;
use crate::{Count, KernelError, KernelResult};
use hal_interface::SerialLink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackSlot {
    /// Driven by the callback timer.
    Timer,
    /// Driven by switch 1.
    Switch1,
    /// Driven by switch 2.
    Switch2,
}

impl CallbackSlot {
    pub const K_ALL: [CallbackSlot; K_CALLBACK_COUNT] =
        [CallbackSlot::Timer, CallbackSlot::Switch1, CallbackSlot::Switch2];

    /// Slot designated by its index on the command line.
    ///
    /// # Errors
    /// `KernelError::CallbackError` when the index is not 0, 1 or 2.
    pub fn from_index(p_index: usize) -> KernelResult<CallbackSlot> {
        Self::K_ALL
            .get(p_index)
            .copied()
            .ok_or(KernelError::CallbackError("Invalid callback index. Use 0, 1, or 2."))
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            CallbackSlot::Timer => "TIMER",
            CallbackSlot::Switch1 => "SW1",
            CallbackSlot::Switch2 => "SW2",
        }
    }

    /// Switch feeding the slot, `None` for the timer slot.
    pub fn switch_number(&self) -> Option<u8> {
        match self {
            CallbackSlot::Timer => None,
            CallbackSlot::Switch1 => Some(1),
            CallbackSlot::Switch2 => Some(2),
        }
    }
}

/// Output of the head payload while it is being delivered.
struct OutputState {
    buffer: Response,
    position: usize,
    in_flight: bool,
}

impl OutputState {
    const fn new() -> Self {
        Self {
            buffer: Response::new(),
            position: 0,
            in_flight: false,
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.position = 0;
        self.in_flight = false;
    }
}

pub struct Callback {
    queue: RingBuffer<Payload, K_QUEUE_SIZE>,
    count: Count,
    executing: bool,
    output: OutputState,
    channel: SerialLink,
}

impl Callback {
    const fn new() -> Self {
        Self {
            queue: RingBuffer::new(),
            count: Count::IDLE,
            executing: false,
            output: OutputState::new(),
            channel: SerialLink::Primary,
        }
    }

    /// Rearms the slot with a single payload, discarding its previous state.
    pub fn configure(&mut self, p_count: Count, p_payload: &str, p_channel: SerialLink) {
        self.reset();
        self.count = p_count;
        self.channel = p_channel;
        self.enqueue(p_payload);
    }

    /// Appends a payload. A full queue, or a payload too long, drops it silently.
    ///
    /// # Returns
    /// `true` if the payload was queued.
    pub fn enqueue(&mut self, p_payload: &str) -> bool {
        let mut l_payload = Payload::new();
        l_payload.push_str(p_payload).is_ok() && self.queue.push(l_payload)
    }

    /// Clears queue, count and output state.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.count = Count::IDLE;
        self.executing = false;
        self.output.reset();
    }

    pub fn count(&self) -> Count {
        self.count
    }

    pub fn channel(&self) -> SerialLink {
        self.channel
    }

    pub fn head(&self) -> Option<&str> {
        self.queue.peek().map(|l_p| l_p.as_str())
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_executing(&self) -> bool {
        self.executing
    }

    /// True when a tick has something to do.
    pub fn is_ready(&self) -> bool {
        !self.executing && !self.count.is_idle() && !self.queue.is_empty()
    }

    /// True once nothing is queued nor waiting for delivery.
    pub fn is_drained(&self) -> bool {
        self.queue.is_empty() && !self.output.in_flight
    }

    /// Starts a tick.
    ///
    /// # Returns
    /// A copy of the head payload when it must be executed now, `None` when the output of the
    /// previous execution is still being delivered (or the slot is not ready).
    pub fn begin(&mut self) -> Option<Payload> {
        if !self.is_ready() {
            return None;
        }
        self.executing = true;
        if self.output.in_flight {
            None
        } else {
            self.queue.peek().cloned()
        }
    }

    /// Stores the output of the executed head payload.
    pub fn load_output(&mut self, p_output: Response) {
        self.output.buffer = p_output;
        self.output.position = 0;
        self.output.in_flight = true;
    }

    /// Takes the next piece of output to deliver: everything left when `p_atomic`, at most
    /// one chunk otherwise.
    pub fn take_chunk(&mut self, p_atomic: bool) -> &[u8] {
        let l_bytes = self.output.buffer.as_bytes();
        let l_start = self.output.position.min(l_bytes.len());
        let l_end = if p_atomic {
            l_bytes.len()
        } else {
            (l_start + K_OUTPUT_CHUNK).min(l_bytes.len())
        };
        self.output.position = l_end;
        &l_bytes[l_start..l_end]
    }

    /// Ends a tick. Once the output is fully delivered one execution is consumed, and the head
    /// payload is dequeued when the count reaches 0.
    ///
    /// # Returns
    /// `true` when the execution completed during this tick.
    pub fn finish(&mut self) -> bool {
        self.executing = false;
        if !self.output.in_flight || self.output.position < self.output.buffer.len() {
            return false;
        }
        self.output.reset();
        self.count.decrement();
        if self.count.is_idle() {
            self.queue.pop();
        }
        true
    }

    /// Forgets the output being delivered without consuming an execution.
    pub fn drop_output(&mut self) {
        self.output.reset();
    }
}

/// The three callback slots.
pub struct CallbackBank {
    slots: [Callback; K_CALLBACK_COUNT],
    /// Timer slot delivers its output in one write (long timer period).
    timer_atomic: bool,
}

impl CallbackBank {
    pub const fn new() -> Self {
        Self {
            slots: [const { Callback::new() }; K_CALLBACK_COUNT],
            timer_atomic: false,
        }
    }

    pub fn slot(&self, p_slot: CallbackSlot) -> &Callback {
        &self.slots[p_slot.index()]
    }

    pub fn slot_mut(&mut self, p_slot: CallbackSlot) -> &mut Callback {
        &mut self.slots[p_slot.index()]
    }

    pub fn set_timer_atomic(&mut self, p_atomic: bool) {
        self.timer_atomic = p_atomic;
    }

    /// Button slots always deliver atomically, the timer slot only for long periods.
    pub fn is_atomic(&self, p_slot: CallbackSlot) -> bool {
        p_slot != CallbackSlot::Timer || self.timer_atomic
    }

    pub fn reset_all(&mut self) {
        self.slots.iter_mut().for_each(Callback::reset);
    }
}

impl Default for CallbackBank {
    fn default() -> Self {
        Self::new()
    }
}
