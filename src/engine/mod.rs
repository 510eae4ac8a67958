//! The LSM engine: owns the ordered list of levels and implements
//! `put`/`delete`/`get`/`range`, level propagation, and lifecycle.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{self, CatalogError};
use crate::config::{EngineConfig, TestingSwitch};
use crate::level::{Level, LevelError};
use crate::stats::Stats;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("level error: {0}")]
    Level(#[from] LevelError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("propagation exceeded max_levels ({max_levels}); tree is full")]
    TreeFull { max_levels: usize },
}

/// Snapshot of one level's shape, for diagnostics (mirrors the source's
/// `printLevels`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSummary {
    pub index: usize,
    pub count: usize,
    pub capacity: usize,
}

/// The persistent, single-writer LSM key-value engine.
///
/// Not reentrant: every mutating method takes `&mut self`, and the engine
/// keeps no internal locks or background threads. A host that wants
/// concurrent access must serialize it externally (e.g. by owning `Engine`
/// behind its own `Mutex`).
pub struct Engine {
    dir: PathBuf,
    config: EngineConfig,
    levels: Vec<Level>,
    stats: Stats,
}

impl Engine {
    /// Opens (or creates) an engine rooted at `dir`. If `dir/catalog.data`
    /// exists, every level it names is re-mapped from its backing files and
    /// has its fence/Bloom filter rebuilt from its live key prefix. Otherwise
    /// a fresh, empty level 0 is created.
    pub fn open(dir: impl AsRef<Path>, config: EngineConfig) -> Result<Self, EngineError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let levels = match catalog::read_counts(&dir)? {
            Some(counts) => {
                info!(levels = counts.len(), dir = %dir.display(), "reopening engine");
                counts
                    .into_iter()
                    .enumerate()
                    .map(|(l, count)| {
                        Level::open_existing(
                            &dir,
                            l,
                            config.level_capacity(l),
                            count,
                            config.page_size,
                            config.encoding,
                            config.bloom_target_fpr,
                        )
                        .map_err(EngineError::from)
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => {
                info!(dir = %dir.display(), "initializing new engine");
                vec![Level::create_new(
                    &dir,
                    0,
                    config.buffer_size(),
                    config.page_size,
                    config.encoding,
                    config.bloom_target_fpr,
                )?]
            }
        };

        Ok(Self {
            dir,
            config,
            levels,
            stats: Stats::new(),
        })
    }

    /// Persists the entry-count catalog and every level's dictionary, then
    /// drops the engine (unmapping its files).
    pub fn close_persist(self) -> Result<(), EngineError> {
        let counts: Vec<usize> = self.levels.iter().map(|l| l.count).collect();
        catalog::write_counts(&self.dir, &counts)?;
        for level in &self.levels {
            if let Some((forward, reverse)) = level.dict_snapshot() {
                catalog::write_dict(&self.dir, level.index, &forward, &reverse)?;
            }
        }
        info!(dir = %self.dir.display(), levels = counts.len(), "engine closed (persisted)");
        Ok(())
    }

    /// Drops the engine and removes its entire data directory.
    pub fn close_wipe(self) -> Result<(), EngineError> {
        let dir = self.dir.clone();
        drop(self);
        fs::remove_dir_all(&dir)?;
        info!(dir = %dir.display(), "engine closed (wiped)");
        Ok(())
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn level_summary(&self) -> Vec<LevelSummary> {
        self.levels
            .iter()
            .map(|l| LevelSummary {
                index: l.index,
                count: l.count,
                capacity: l.capacity,
            })
            .collect()
    }

    pub fn put(&mut self, key: i32, value: i64) -> Result<(), EngineError> {
        self.stats.puts += 1;
        self.append_to_buffer(key, value, false)
    }

    pub fn delete(&mut self, key: i32) -> Result<(), EngineError> {
        self.stats.deletes += 1;
        self.append_to_buffer(key, 0, true)
    }

    fn append_to_buffer(&mut self, key: i32, value: i64, tombstone: bool) -> Result<(), EngineError> {
        self.levels[0].append(key, value, tombstone)?;
        if self.levels[0].is_full() {
            self.propagate(0)?;
        }
        Ok(())
    }

    /// Looks up `key`, newest level first. Level 0 is always scanned
    /// directly; levels >= 1 are gated by their Bloom filter first.
    pub fn get(&mut self, key: i32) -> Result<Option<i64>, EngineError> {
        for l in 0..self.levels.len() {
            let gate_with_bloom = l >= 1;
            if let Some(i) = self.levels[l].search_point(key, &mut self.stats, gate_with_bloom) {
                let tomb = self.levels[l].tombstone(i);
                return if tomb {
                    self.stats.failed_gets += 1;
                    Ok(None)
                } else {
                    self.stats.successful_gets += 1;
                    Ok(Some(self.levels[l].value(i)))
                };
            }
        }
        self.stats.failed_gets += 1;
        Ok(None)
    }

    /// Returns every live key in `[lo, hi)`, newest write wins, tombstones
    /// masking older levels' entries.
    pub fn range(&mut self, lo: i32, hi: i32) -> Result<Vec<(i32, i64)>, EngineError> {
        self.stats.ranges += 1;
        let mut results: BTreeMap<i32, i64> = BTreeMap::new();

        for l in (0..self.levels.len()).rev() {
            let level = &self.levels[l];
            if level.is_empty() {
                continue;
            }
            if l == 0 {
                for i in 0..level.count {
                    let k = level.key(i);
                    if k < lo || k >= hi {
                        continue;
                    }
                    if level.tombstone(i) {
                        results.remove(&k);
                    } else {
                        results.insert(k, level.value(i));
                    }
                }
            } else {
                let start = level.search_range_bound(lo);
                let end = level.search_range_bound(hi);
                for i in start..end {
                    let k = level.key(i);
                    if level.tombstone(i) {
                        results.remove(&k);
                    } else {
                        results.insert(k, level.value(i));
                    }
                }
            }
        }

        self.stats.range_length_sum += results.len() as u64;
        if self.config.testing_switch == TestingSwitch::On {
            for &v in results.values() {
                self.stats.range_value_sum = (self.stats.range_value_sum + v as u64) % 1_000_000;
            }
        }

        Ok(results.into_iter().collect())
    }

    /// Materializes level `l + 1` if needed, then moves every entry of level
    /// `l` into it one at a time, clearing level `l` first. Level `l + 1` is
    /// checked for fullness after *each* individual append, not after the
    /// whole batch: a prior merge can leave it resting above a draining
    /// multiple of level `l`'s capacity, so batching the whole move before
    /// checking could write past its mapped capacity. Whenever it fills
    /// mid-move, it is merged and cascaded immediately, freeing room for the
    /// rest of the batch; a final merge after the loop covers whatever is
    /// left over.
    fn propagate(&mut self, l: usize) -> Result<(), EngineError> {
        if l + 1 == self.levels.len() {
            if l + 1 >= self.config.max_levels {
                warn!(level = l, max_levels = self.config.max_levels, "propagation would exceed max_levels");
                return Err(EngineError::TreeFull {
                    max_levels: self.config.max_levels,
                });
            }
            let new_level = Level::create_new(
                &self.dir,
                l + 1,
                self.config.level_capacity(l + 1),
                self.config.page_size,
                self.config.encoding,
                self.config.bloom_target_fpr,
            )?;
            self.levels.push(new_level);
            debug!(level = l + 1, "materialized new level for propagation");
        }

        let entries: Vec<(i32, i64, bool)> = (0..self.levels[l].count)
            .map(|i| (self.levels[l].key(i), self.levels[l].value(i), self.levels[l].tombstone(i)))
            .collect();
        self.levels[l].clear();

        for (k, v, t) in entries {
            self.levels[l + 1].append(k, v, t)?;
            if self.levels[l + 1].is_full() {
                self.merge_and_cascade(l + 1)?;
            }
        }
        self.merge_and_cascade(l + 1)?;
        Ok(())
    }

    /// Sorts and merges level `idx` (coalescing duplicates, dropping
    /// tombstones only if it is the bottommost level), rebuilding its fence
    /// and Bloom filter, then recurses into `propagate` if the merge left it
    /// exactly full.
    fn merge_and_cascade(&mut self, idx: usize) -> Result<(), EngineError> {
        let bottommost = idx == self.levels.len() - 1;
        self.levels[idx].sort_and_merge(bottommost, self.config.bloom_target_fpr)?;
        info!(level = idx, count = self.levels[idx].count, "merged level");

        if self.levels[idx].is_full() {
            self.propagate(idx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
