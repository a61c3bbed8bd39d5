//! Randomized fault injection.

use rand::rngs::OsRng;
use rand::Rng;

use crate::config::ChaosConfig;

/// Uniform draw in `0..max` from the operating system's CSPRNG.
///
/// Returns 0 when `max` is 0.
pub fn random_below(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    OsRng.gen_range(0..max)
}

/// How the injector decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultMode {
    /// Fail when a draw in `0..range` is greater than `threshold`.
    Random { range: u64, threshold: u64 },
    /// Every call fails.
    Always,
    /// No call fails.
    Never,
}

/// Decision point consulted exactly once per operation.
#[derive(Debug, Clone, Copy)]
pub struct FaultInjector {
    mode: FaultMode,
}

impl FaultInjector {
    /// Draws in `0..=9`; anything above 7 fails (about one call in five).
    pub const DEFAULT_RANGE: u64 = 10;
    pub const DEFAULT_THRESHOLD: u64 = 7;

    pub const fn new(mode: FaultMode) -> Self {
        Self { mode }
    }

    pub const fn random() -> Self {
        Self::new(FaultMode::Random {
            range: Self::DEFAULT_RANGE,
            threshold: Self::DEFAULT_THRESHOLD,
        })
    }

    pub const fn always() -> Self {
        Self::new(FaultMode::Always)
    }

    pub const fn never() -> Self {
        Self::new(FaultMode::Never)
    }

    /// Build from configuration. Disabled chaos never fails.
    pub fn from_config(config: &ChaosConfig) -> Self {
        if !config.enabled {
            return Self::never();
        }
        Self::new(FaultMode::Random {
            range: config.draw_range,
            threshold: config.threshold,
        })
    }

    pub fn mode(&self) -> FaultMode {
        self.mode
    }

    /// Decide whether the current call should fail.
    pub fn should_fail(&self) -> bool {
        let fail = match self.mode {
            FaultMode::Random { range, threshold } => random_below(range) > threshold,
            FaultMode::Always => true,
            FaultMode::Never => false,
        };
        if fail {
            crate::observability::metrics::record_injected_fault();
        }
        fail
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_below_stays_in_range() {
        for _ in 0..1_000 {
            assert!(random_below(10) < 10);
        }
        assert_eq!(random_below(0), 0);
        assert_eq!(random_below(1), 0);
    }

    #[test]
    fn forced_modes_are_deterministic() {
        assert!((0..100).all(|_| FaultInjector::always().should_fail()));
        assert!((0..100).all(|_| !FaultInjector::never().should_fail()));
    }

    #[test]
    fn threshold_at_top_of_range_never_fails() {
        let injector = FaultInjector::new(FaultMode::Random { range: 10, threshold: 9 });
        assert!((0..1_000).all(|_| !injector.should_fail()));
    }

    #[test]
    fn default_rate_is_roughly_one_in_five() {
        let injector = FaultInjector::random();
        let failures = (0..10_000).filter(|_| injector.should_fail()).count();
        // Expected 2000; the bounds are far outside any plausible deviation.
        assert!((1_500..2_500).contains(&failures), "got {failures}");
    }

    #[test]
    fn disabled_config_never_fails() {
        let config = ChaosConfig {
            enabled: false,
            ..ChaosConfig::default()
        };
        assert_eq!(FaultInjector::from_config(&config).mode(), FaultMode::Never);
    }
}
