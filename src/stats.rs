//! Engine-wide diagnostic counters, owned by `Engine` rather than a global.

/// Snapshot of the engine's running counters, returned by `Engine::stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub puts: u64,
    pub deletes: u64,
    pub successful_gets: u64,
    pub failed_gets: u64,
    pub ranges: u64,
    pub range_length_sum: u64,
    /// Sum of values returned by `range`, taken modulo 1_000_000. Only
    /// accumulated when `EngineConfig::testing_switch` is set, matching the
    /// source's `TESTING_SWITCH` self-check.
    pub range_value_sum: u64,
    pub search_level_calls: u64,
    pub bloom_true_positives: u64,
    pub bloom_false_positives: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }
}
