//! PID gain triplets and the five-controller gain table.
//!
//! The table rides the broker as one latest-value payload so the strategy
//! side can retune the running cascade without a restart.

use serde::{Deserialize, Serialize};

/// One `(Kp, Ki, Kd)` triplet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainSet {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl GainSet {
    #[inline]
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
}

/// Gains for all five cascade controllers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainTable {
    /// Rotational displacement.
    pub rd: GainSet,
    /// Rotational velocity.
    pub rv: GainSet,
    /// Translational displacement.
    pub td: GainSet,
    /// Translational velocity.
    pub tv: GainSet,
    /// Direction correction (reserved).
    pub dir: GainSet,
}

impl Default for GainTable {
    fn default() -> Self {
        crate::consts::DEFAULT_GAINS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_compile_time_constants() {
        let table = GainTable::default();
        assert_eq!(table, crate::consts::DEFAULT_GAINS);
    }
}
