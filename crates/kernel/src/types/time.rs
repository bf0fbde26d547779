use core::fmt::Display;

/// A wrapper struct representing a duration in milliseconds.
///
/// # Fields
///
/// * `0` - The inner `u32` value representing the duration in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Milliseconds(pub u32);

impl Display for Milliseconds {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ms", self.0)
    }
}

impl Milliseconds {
    /// Converts the value of the current instance into a `u32`.
    pub fn to_u32(&self) -> u32 {
        self.0
    }

    /// Number of whole `p_period` intervals in this duration, at least 1.
    ///
    /// # Parameters
    /// - `p_period`: the interval length. A zero period counts as 1 ms.
    pub fn in_periods_of(&self, p_period: Milliseconds) -> u32 {
        (self.0 / p_period.0.max(1)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(std::format!("{}", Milliseconds(20)), "20 ms");
    }

    #[test]
    fn test_in_periods_of() {
        assert_eq!(Milliseconds(20).in_periods_of(Milliseconds(10)), 2);
        assert_eq!(Milliseconds(5).in_periods_of(Milliseconds(10)), 1);
        assert_eq!(Milliseconds(20).in_periods_of(Milliseconds(0)), 20);
    }
}
