//! Injected randomness.
//!
//! The domain never touches an RNG crate. Every roll goes through
//! [`RandomSource`], which the engine backs with `rand::thread_rng` and tests
//! back with [`testing::ScriptedRandom`].

/// Source of uniform randomness for game rules.
pub trait RandomSource: Send + Sync {
    /// Uniform integer in the inclusive range `[min, max]`.
    fn gen_range(&self, min: i32, max: i32) -> i32;

    /// Uniform float in `[0, 1)`.
    fn gen_unit(&self) -> f64;

    /// `true` with probability `p`.
    fn chance(&self, p: f64) -> bool {
        self.gen_unit() < p
    }

    /// Uniform float in `[lo, hi]`.
    fn gen_between(&self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.gen_unit()
    }

    /// Uniform index into a non-empty slice of length `len`.
    fn pick_index(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let max = i32::try_from(len - 1).unwrap_or(i32::MAX);
        usize::try_from(self.gen_range(0, max)).unwrap_or(0)
    }

    /// Fair coin: `true` when the player moves first.
    fn player_first(&self) -> bool {
        self.gen_range(0, 1) == 0
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    //! Deterministic random source for scenario tests.

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::RandomSource;

    /// Replays scripted values, then falls back to fixed defaults.
    ///
    /// Integer draws are clamped into the requested range, so a script can be
    /// written without knowing every call site's bounds.
    #[derive(Debug, Default)]
    pub struct ScriptedRandom {
        units: Vec<f64>,
        ints: Vec<i32>,
        unit_cursor: AtomicUsize,
        int_cursor: AtomicUsize,
        fallback_unit: f64,
        fallback_int: i32,
    }

    impl ScriptedRandom {
        pub fn new() -> Self {
            Self {
                fallback_unit: 0.5,
                ..Self::default()
            }
        }

        /// Always returns `unit` for float draws and `int` (clamped) for integers.
        pub fn constant(unit: f64, int: i32) -> Self {
            Self {
                fallback_unit: unit,
                fallback_int: int,
                ..Self::default()
            }
        }

        pub fn with_units(mut self, units: impl IntoIterator<Item = f64>) -> Self {
            self.units = units.into_iter().collect();
            self
        }

        pub fn with_ints(mut self, ints: impl IntoIterator<Item = i32>) -> Self {
            self.ints = ints.into_iter().collect();
            self
        }
    }

    impl RandomSource for ScriptedRandom {
        fn gen_range(&self, min: i32, max: i32) -> i32 {
            let idx = self.int_cursor.fetch_add(1, Ordering::SeqCst);
            let raw = self.ints.get(idx).copied().unwrap_or(self.fallback_int);
            raw.clamp(min, max.max(min))
        }

        fn gen_unit(&self) -> f64 {
            let idx = self.unit_cursor.fetch_add(1, Ordering::SeqCst);
            self.units.get(idx).copied().unwrap_or(self.fallback_unit)
        }
    }
}
