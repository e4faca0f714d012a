use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence score clamped to [0.0, 1.0].
/// Represents how confident the system is in a generated insight.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Confidence(f64);

impl Confidence {
    /// Base confidence assigned to freshly generated insights.
    pub const BASE: f64 = 0.8;
    /// Floor for any persisted insight.
    pub const FLOOR: f64 = 0.1;
    /// Ceiling — never fully confident in model output.
    pub const CEILING: f64 = 0.95;

    /// Create a new Confidence, clamping to [0.0, 1.0].
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Clamp into the insight scoring band [`FLOOR`, `CEILING`].
    pub fn banded(value: f64) -> Self {
        Self(value.clamp(Self::FLOOR, Self::CEILING))
    }

    /// Get the raw f64 value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(Self::BASE)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Confidence::new(1.7).value(), 1.0);
        assert_eq!(Confidence::new(-0.2).value(), 0.0);
    }

    #[test]
    fn banded_respects_floor_and_ceiling() {
        assert_eq!(Confidence::banded(0.99).value(), Confidence::CEILING);
        assert_eq!(Confidence::banded(0.01).value(), Confidence::FLOOR);
        assert_eq!(Confidence::banded(0.85).value(), 0.85);
    }
}
