use serde::{Deserialize, Serialize};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Carries fractional regeneration between phases.
///
/// Only whole units are ever granted; the fraction waits for the next phase.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegenAccumulator {
    remainder: f64,
}

impl RegenAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remainder(&self) -> f64 {
        self.remainder
    }

    /// Adds `rate` and returns the whole units now available.
    pub fn accrue(&mut self, rate: f64) -> f64 {
        let total = round2(rate.max(0.0) + self.remainder);
        let whole = total.floor();
        self.remainder = round2(total - whole);
        whole
    }
}

/// One regeneration phase for a pool.
///
/// Returns the amount gained; nothing happens while `current <= 0`.
pub fn regenerate(current: f64, max: f64, acc: &mut RegenAccumulator, rate: f64) -> f64 {
    if current <= 0.0 {
        return 0.0;
    }
    let whole = acc.accrue(rate);
    whole.min((max - current).max(0.0))
}
