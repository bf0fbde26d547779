//! Line-addressed script store and its execution queue.
//!
//! Scripts never recurse: a line invoking another line (`-script N x`) is re-expanded by the
//! worker into queue entries, so an endless script only ever occupies queue slots.

use crate::config::{K_SCRIPT_LINES, K_SCRIPT_QUEUE_SIZE, Payload};
use crate::ring_buffer::RingBuffer;
use crate::{KernelError, KernelResult};
use hal_interface::SerialLink;

/// Name of the script command, also the prefix of script-invocation directives.
pub const K_SCRIPT_COMMAND: &str = "-script";

const K_QUEUE_FULL: KernelError = KernelError::ScriptError("Failed to queue script command.");

/// One pending script command and the link its output goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    pub command: Payload,
    pub channel: SerialLink,
}

/// Outcome of one worker step.
#[derive(Debug, PartialEq, Eq)]
pub enum ScriptStep {
    /// A plain command to run through the interpreter.
    Execute(ScriptEntry),
    /// A directive was re-expanded into queue entries.
    Expanded(SerialLink),
    /// A directive could not be expanded. The error is reported on the link.
    Failed(SerialLink, KernelError),
}

/// Recognizes a script-invocation directive: `-script N x`, or also `-script N` when
/// `p_require_execute` is false.
///
/// # Returns
/// The target line, or `None` when the text is not such a directive or the line is out of range.
pub fn parse_script_directive(p_text: &str, p_require_execute: bool) -> Option<usize> {
    let l_args = p_text.trim().strip_prefix(K_SCRIPT_COMMAND)?;
    if !l_args.starts_with(char::is_whitespace) {
        return None;
    }

    let mut l_tokens = l_args.split_whitespace();
    let l_line = l_tokens
        .next()?
        .parse::<usize>()
        .ok()
        .filter(|l_n| *l_n < K_SCRIPT_LINES)?;

    match (l_tokens.next(), l_tokens.next()) {
        (Some("x"), None) => Some(l_line),
        (None, None) if !p_require_execute => Some(l_line),
        _ => None,
    }
}

pub struct ScriptStore {
    lines: [Payload; K_SCRIPT_LINES],
    queue: RingBuffer<ScriptEntry, K_SCRIPT_QUEUE_SIZE>,
}

impl ScriptStore {
    pub const fn new() -> Self {
        Self {
            lines: [const { Payload::new() }; K_SCRIPT_LINES],
            queue: RingBuffer::new(),
        }
    }

    /// Content of a line, `None` when the line is empty or out of range.
    pub fn line(&self, p_line: usize) -> Option<&str> {
        self.lines
            .get(p_line)
            .filter(|l_text| !l_text.is_empty())
            .map(|l_text| l_text.as_str())
    }

    /// Iterates over the non-empty lines.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l_text)| !l_text.is_empty())
            .map(|(l_idx, l_text)| (l_idx, l_text.as_str()))
    }

    /// Stores a line. A text not starting with `-` is stored with a `-` prefix.
    ///
    /// # Errors
    /// `KernelError::ScriptError` when the line number is invalid or the text does not fit.
    pub fn set_line(&mut self, p_line: usize, p_text: &str) -> KernelResult<&str> {
        let l_idx = Self::check_line(p_line)?;
        let mut l_stored = Payload::new();
        if !p_text.starts_with('-') {
            l_stored
                .push('-')
                .map_err(|_| KernelError::ScriptError("Script line too long."))?;
        }
        l_stored
            .push_str(p_text)
            .map_err(|_| KernelError::ScriptError("Script line too long."))?;

        self.lines[l_idx] = l_stored;
        Ok(self.lines[l_idx].as_str())
    }

    /// Empties a line.
    ///
    /// # Errors
    /// `KernelError::ScriptError` when the line number is invalid.
    pub fn clear_line(&mut self, p_line: usize) -> KernelResult<()> {
        let l_idx = Self::check_line(p_line)?;
        self.lines[l_idx].clear();
        Ok(())
    }

    /// Empties every line and discards pending queue entries, which stops any running script.
    pub fn clear_all(&mut self) {
        self.lines.iter_mut().for_each(|l_line| l_line.clear());
        self.queue.clear();
    }

    /// Discards pending queue entries without executing them.
    pub fn stop(&mut self) {
        self.queue.clear();
    }

    /// Number of entries waiting for the worker.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Starts a script: drains the queue, then queues every contiguous non-empty line from
    /// `p_line` on.
    ///
    /// # Returns
    /// The number of queued lines.
    ///
    /// # Errors
    /// `KernelError::ScriptError` when the line is invalid or empty, or when the run does not fit
    /// in the queue. The queue is left untouched.
    pub fn execute_from(&mut self, p_line: usize, p_channel: SerialLink) -> KernelResult<usize> {
        let l_idx = Self::check_line(p_line)?;
        if self.lines[l_idx].is_empty() {
            return Err(KernelError::ScriptError("Cannot execute empty script line."));
        }
        if self.run_length(l_idx) > K_SCRIPT_QUEUE_SIZE {
            return Err(K_QUEUE_FULL);
        }
        self.queue.clear();
        self.queue_from(l_idx, p_channel)
    }

    /// Runs one worker step: takes the oldest entry and either expands it (directive) or hands it
    /// back for execution.
    ///
    /// A directive whose target is itself a directive queues the target, then re-queues the
    /// directive. Either is skipped when an identical invocation is already pending, so a chain
    /// of directives loops forever with a constant queue depth. An expansion that does not fit in
    /// the queue fails without queuing anything.
    ///
    /// # Returns
    /// `None` when nothing is pending.
    pub fn step(&mut self) -> Option<ScriptStep> {
        let l_entry = self.queue.pop()?;
        let Some(l_target) = parse_script_directive(&l_entry.command, true) else {
            return Some(ScriptStep::Execute(l_entry));
        };

        let l_channel = l_entry.channel;
        if self.lines[l_target].is_empty() {
            return Some(ScriptStep::Failed(
                l_channel,
                KernelError::ScriptError("Cannot execute empty script line."),
            ));
        }

        let l_result = if parse_script_directive(&self.lines[l_target], true).is_some() {
            let l_target_text = self.lines[l_target].clone();
            self.queue_loop(&l_target_text, &l_entry.command, l_channel)
        } else {
            self.queue_from(l_target, l_channel).map(|_| ())
        };

        Some(match l_result {
            Ok(()) => ScriptStep::Expanded(l_channel),
            Err(l_e) => ScriptStep::Failed(l_channel, l_e),
        })
    }

    /// Number of contiguous non-empty lines from `p_line` on.
    fn run_length(&self, p_line: usize) -> usize {
        self.lines[p_line..]
            .iter()
            .take_while(|l_text| !l_text.is_empty())
            .count()
    }

    /// Queues the run starting at `p_line`, or nothing when it does not fit.
    fn queue_from(&mut self, p_line: usize, p_channel: SerialLink) -> KernelResult<usize> {
        let l_count = self.run_length(p_line);
        if l_count > self.queue.free() {
            return Err(K_QUEUE_FULL);
        }
        for l_idx in p_line..p_line + l_count {
            let l_text = self.lines[l_idx].clone();
            self.queue_entry(&l_text, p_channel)?;
        }
        Ok(l_count)
    }

    fn is_pending(&self, p_command: &str) -> bool {
        self.queue.iter().any(|l_e| l_e.command.as_str() == p_command)
    }

    /// Queues the target directive, then the invoking one, skipping those already pending.
    fn queue_loop(
        &mut self,
        p_target: &str,
        p_directive: &str,
        p_channel: SerialLink,
    ) -> KernelResult<()> {
        let l_queue_target = !self.is_pending(p_target);
        let l_queue_directive = p_directive != p_target && !self.is_pending(p_directive);
        if usize::from(l_queue_target) + usize::from(l_queue_directive) > self.queue.free() {
            return Err(K_QUEUE_FULL);
        }
        if l_queue_target {
            self.queue_entry(p_target, p_channel)?;
        }
        if l_queue_directive {
            self.queue_entry(p_directive, p_channel)?;
        }
        Ok(())
    }

    fn queue_entry(&mut self, p_command: &str, p_channel: SerialLink) -> KernelResult<()> {
        let mut l_command = Payload::new();
        l_command
            .push_str(p_command)
            .map_err(|_| KernelError::ScriptError("Failed to queue script command."))?;
        if self.queue.push(ScriptEntry {
            command: l_command,
            channel: p_channel,
        }) {
            Ok(())
        } else {
            Err(K_QUEUE_FULL)
        }
    }

    fn check_line(p_line: usize) -> KernelResult<usize> {
        if p_line < K_SCRIPT_LINES {
            Ok(p_line)
        } else {
            Err(KernelError::ScriptError("Invalid script line number."))
        }
    }
}

impl Default for ScriptStore {
    fn default() -> Self {
        Self::new()
    }
}
