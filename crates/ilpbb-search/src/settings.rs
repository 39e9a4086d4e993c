//! Configuration settings for the branch-and-bound search.

use std::time::Duration;

/// Search settings.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BnbSettings {
    /// A variable is fractional when its value lies in `(tolerance, 1 - tolerance)`.
    pub tolerance: f64,

    /// Wall-clock budget for the whole search, checked between nodes.
    pub time_limit: Duration,

    /// Log progress at info level.
    pub verbose: bool,

    /// Log progress every N nodes (when verbose).
    pub log_freq: u64,
}

impl Default for BnbSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            time_limit: Duration::from_secs(120),
            verbose: false,
            log_freq: 1000,
        }
    }
}

impl BnbSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Time limit in (possibly fractional) seconds; negative or NaN means zero.
    pub fn with_time_limit_secs(self, secs: f64) -> Self {
        let secs = if secs.is_nan() { 0.0 } else { secs.max(0.0) };
        self.with_time_limit(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_log_freq(mut self, log_freq: u64) -> Self {
        self.log_freq = log_freq.max(1);
        self
    }
}
