//! Engine tunables, collected into a plain data struct constructed by the
//! caller and passed to `Engine::open` — no process-wide singleton.

/// Whether values are stored raw or behind a per-level small-id dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingMode {
    #[default]
    Off,
    Dict,
}

/// Gates the `range_value_sum` self-check counter, mirroring the source's
/// `TESTING_SWITCH` compile-time flag as a runtime toggle instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestingSwitch {
    #[default]
    Off,
    On,
}

/// Construction-time configuration for an `Engine`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Entries per page; also the page granularity used by fence indices.
    pub page_size: usize,
    /// Number of pages held by level 0 (the in-memory buffer).
    pub buffer_pages: usize,
    /// Growth factor `T` between successive level capacities.
    pub size_ratio: usize,
    /// Target Bloom filter false-positive rate.
    pub bloom_target_fpr: f64,
    pub encoding: EncodingMode,
    pub testing_switch: TestingSwitch,
    /// Hard cap on the number of levels; propagation past this is an error.
    pub max_levels: usize,
}

impl EngineConfig {
    /// Level-0 buffer capacity in entries: `page_size * buffer_pages`.
    pub fn buffer_size(&self) -> usize {
        self.page_size * self.buffer_pages
    }

    /// Capacity of level `l`: `buffer_size * size_ratio ^ l`.
    pub fn level_capacity(&self, l: usize) -> usize {
        self.buffer_size() * self.size_ratio.pow(l as u32)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 512,
            buffer_pages: 4,
            size_ratio: 10,
            bloom_target_fpr: 0.01,
            encoding: EncodingMode::Off,
            testing_switch: TestingSwitch::Off,
            max_levels: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_size_is_page_size_times_buffer_pages() {
        let cfg = EngineConfig {
            page_size: 128,
            buffer_pages: 4,
            ..Default::default()
        };
        assert_eq!(cfg.buffer_size(), 512);
    }

    #[test]
    fn level_capacity_grows_by_size_ratio() {
        let cfg = EngineConfig {
            page_size: 4,
            buffer_pages: 1,
            size_ratio: 3,
            ..Default::default()
        };
        assert_eq!(cfg.level_capacity(0), 4);
        assert_eq!(cfg.level_capacity(1), 12);
        assert_eq!(cfg.level_capacity(2), 36);
    }
}
