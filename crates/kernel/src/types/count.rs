use core::fmt::Display;

/// Remaining executions of a callback slot or a ticker.
///
/// On the command line a count is `-1` for infinite or a positive number. `Finite(0)` is the
/// idle state reached once a countdown is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Infinite,
    Finite(u32),
}

impl Count {
    pub const IDLE: Count = Count::Finite(0);

    /// Parses a count given on the command line.
    ///
    /// # Returns
    /// - `Some(Count::Infinite)` for `-1`, `Some(Count::Finite(n))` for `n > 0`.
    /// - `None` for 0 and any other negative value.
    pub fn parse(p_text: &str) -> Option<Count> {
        match p_text.parse::<i32>().ok()? {
            -1 => Some(Count::Infinite),
            l_n if l_n > 0 => Some(Count::Finite(l_n as u32)),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Count::IDLE
    }

    /// Consumes one execution. Infinite counts are left untouched.
    pub fn decrement(&mut self) {
        if let Count::Finite(l_n) = self {
            *l_n = l_n.saturating_sub(1);
        }
    }
}

impl Display for Count {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Count::Infinite => write!(f, "-1"),
            Count::Finite(l_n) => write!(f, "{}", l_n),
        }
    }
}
