use crate::config::{EncodingMode, EngineConfig, TestingSwitch};
use tracing_subscriber::EnvFilter;

/// Initializes a tracing subscriber controlled by `RUST_LOG`. Safe to call
/// repeatedly — only the first call takes effect.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Tiny buffer (B=4) and T=3, matching the literal five-put scenario.
pub fn small_tree_config() -> EngineConfig {
    init_tracing();
    EngineConfig {
        page_size: 4,
        buffer_pages: 1,
        size_ratio: 3,
        bloom_target_fpr: 0.01,
        encoding: EncodingMode::Off,
        testing_switch: TestingSwitch::Off,
        max_levels: 10,
    }
}

/// Same shape as `small_tree_config` but with the range checksum enabled.
pub fn small_tree_config_with_testing_switch() -> EngineConfig {
    EngineConfig {
        testing_switch: TestingSwitch::On,
        ..small_tree_config()
    }
}

/// Same shape as `small_tree_config` but with dictionary value encoding on.
pub fn small_tree_dict_config() -> EngineConfig {
    EngineConfig {
        encoding: EncodingMode::Dict,
        ..small_tree_config()
    }
}

/// A buffer large enough that ordinary test workloads never propagate.
pub fn buffer_only_config() -> EngineConfig {
    init_tracing();
    EngineConfig {
        page_size: 64,
        buffer_pages: 16,
        size_ratio: 10,
        bloom_target_fpr: 0.01,
        encoding: EncodingMode::Off,
        testing_switch: TestingSwitch::Off,
        max_levels: 10,
    }
}

/// A tree with `max_levels` pinned low, for exercising the `TreeFull` path.
pub fn capped_tree_config(max_levels: usize) -> EngineConfig {
    EngineConfig {
        max_levels,
        ..small_tree_config()
    }
}
