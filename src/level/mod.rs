//! A single level: parallel key/value/tombstone arrays backed by
//! memory-mapped files, plus the fence index and Bloom filter that
//! accelerate lookups against it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::bloom::BloomFilter;
use crate::catalog;
use crate::config::EncodingMode;
use crate::fence::FenceIndex;
use crate::mmap_array::MappedArray;
use crate::stats::Stats;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
    #[error("level {level} dictionary exceeded its id capacity ({capacity} entries)")]
    DictionaryFull { level: usize, capacity: usize },
}

/// Either raw `i64` values or a per-level dictionary of small ids pointing
/// into a `value -> id` / `id -> value` pair of tables.
enum ValueStore {
    Raw(MappedArray<i64>),
    Dict {
        ids: MappedArray<u8>,
        forward: BTreeMap<i64, u8>,
        reverse: Vec<i64>,
    },
}

pub struct Level {
    pub index: usize,
    pub capacity: usize,
    pub count: usize,
    page_size: usize,
    keys: MappedArray<i32>,
    values: ValueStore,
    tombstones: MappedArray<u8>,
    fence: FenceIndex,
    bloom: BloomFilter,
}

fn keys_path(dir: &Path, l: usize) -> PathBuf {
    dir.join(format!("k{l}.data"))
}
fn values_path(dir: &Path, l: usize) -> PathBuf {
    dir.join(format!("v{l}.data"))
}
fn tombstones_path(dir: &Path, l: usize) -> PathBuf {
    dir.join(format!("t{l}.data"))
}

impl Level {
    /// Maps (creating if absent) a fresh, empty level.
    pub fn create_new(
        dir: &Path,
        index: usize,
        capacity: usize,
        page_size: usize,
        encoding: EncodingMode,
        bloom_target_fpr: f64,
    ) -> Result<Self, LevelError> {
        let keys = MappedArray::open(&keys_path(dir, index), capacity)?;
        let tombstones = MappedArray::open(&tombstones_path(dir, index), capacity)?;
        let values = match encoding {
            EncodingMode::Off => ValueStore::Raw(MappedArray::open(&values_path(dir, index), capacity)?),
            EncodingMode::Dict => ValueStore::Dict {
                ids: MappedArray::open(&values_path(dir, index), capacity)?,
                forward: BTreeMap::new(),
                reverse: Vec::new(),
            },
        };
        debug!(level = index, capacity, "level created");
        Ok(Self {
            index,
            capacity,
            count: 0,
            page_size,
            keys,
            values,
            tombstones,
            fence: FenceIndex::default(),
            bloom: BloomFilter::for_capacity(capacity, bloom_target_fpr),
        })
    }

    /// Re-maps an existing level from its backing files, reloads its
    /// dictionary sidecars if applicable, and rebuilds its fence and Bloom
    /// filter from the live key prefix (neither is persisted on disk).
    pub fn open_existing(
        dir: &Path,
        index: usize,
        capacity: usize,
        count: usize,
        page_size: usize,
        encoding: EncodingMode,
        bloom_target_fpr: f64,
    ) -> Result<Self, LevelError> {
        let keys = MappedArray::open(&keys_path(dir, index), capacity)?;
        let tombstones = MappedArray::open(&tombstones_path(dir, index), capacity)?;
        let values = match encoding {
            EncodingMode::Off => ValueStore::Raw(MappedArray::open(&values_path(dir, index), capacity)?),
            EncodingMode::Dict => {
                let ids = MappedArray::open(&values_path(dir, index), capacity)?;
                let (fwd_pairs, reverse) = catalog::read_dict(dir, index)?;
                let forward = fwd_pairs.into_iter().collect();
                ValueStore::Dict { ids, forward, reverse }
            }
        };
        let mut level = Self {
            index,
            capacity,
            count,
            page_size,
            keys,
            values,
            tombstones,
            fence: FenceIndex::default(),
            bloom: BloomFilter::for_capacity(capacity, bloom_target_fpr),
        };
        level.construct_fence();
        level.construct_bloom(bloom_target_fpr);
        debug!(level = index, count, capacity, "level reopened");
        Ok(level)
    }

    pub fn key(&self, i: usize) -> i32 {
        self.keys.get(i)
    }

    pub fn value(&self, i: usize) -> i64 {
        match &self.values {
            ValueStore::Raw(arr) => arr.get(i),
            ValueStore::Dict { ids, reverse, .. } => reverse[ids.get(i) as usize],
        }
    }

    pub fn tombstone(&self, i: usize) -> bool {
        self.tombstones.get(i) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    /// Dictionary contents for persistence, if this level encodes values.
    pub fn dict_snapshot(&self) -> Option<(Vec<(i64, u8)>, Vec<i64>)> {
        match &self.values {
            ValueStore::Raw(_) => None,
            ValueStore::Dict { forward, reverse, .. } => {
                Some((forward.iter().map(|(&v, &id)| (v, id)).collect(), reverse.clone()))
            }
        }
    }

    /// Appends one entry at the current write position, growing the
    /// dictionary if needed. Fails if a `Dict`-encoded level would need more
    /// distinct values than its id type can address.
    pub fn append(&mut self, key: i32, value: i64, tombstone: bool) -> Result<(), LevelError> {
        let idx = self.count;
        self.keys.set(idx, key);
        self.tombstones.set(idx, tombstone as u8);
        match &mut self.values {
            ValueStore::Raw(arr) => arr.set(idx, value),
            ValueStore::Dict { ids, forward, reverse } => {
                let id = if let Some(&id) = forward.get(&value) {
                    id
                } else {
                    let next = reverse.len();
                    if next > u8::MAX as usize {
                        return Err(LevelError::DictionaryFull {
                            level: self.index,
                            capacity: u8::MAX as usize + 1,
                        });
                    }
                    let id = next as u8;
                    forward.insert(value, id);
                    reverse.push(value);
                    id
                };
                ids.set(idx, id);
            }
        }
        self.bloom.add(key);
        self.count += 1;
        Ok(())
    }

    /// Resets the level to empty. Mapped storage is left in place (not
    /// zeroed); only the logical count, fence, Bloom filter, and dictionary
    /// are cleared.
    pub fn clear(&mut self) {
        self.count = 0;
        self.fence.clear();
        self.bloom.clear();
        if let ValueStore::Dict { forward, reverse, .. } = &mut self.values {
            forward.clear();
            reverse.clear();
        }
    }

    /// Level 0 is always scanned linearly and carries no fence.
    pub fn construct_fence(&mut self) {
        if self.index == 0 {
            self.fence.clear();
            return;
        }
        let keys: Vec<i32> = (0..self.count).map(|i| self.key(i)).collect();
        self.fence = FenceIndex::build(&keys, self.page_size);
    }

    pub fn construct_bloom(&mut self, target_fpr: f64) {
        self.bloom = BloomFilter::for_capacity(self.capacity, target_fpr);
        for i in 0..self.count {
            self.bloom.add(self.key(i));
        }
    }

    /// Point-mode search. `gate_with_bloom` lets level 0 skip the Bloom
    /// pre-check (it is always scanned directly) while levels >= 1 use it to
    /// short-circuit a miss. Counted before the gate, so `search_level_calls`
    /// reflects every lookup attempted against this level, not just the ones
    /// that pass the filter.
    pub fn search_point(&self, key: i32, stats: &mut Stats, gate_with_bloom: bool) -> Option<usize> {
        stats.search_level_calls += 1;
        if self.is_empty() {
            return None;
        }
        if gate_with_bloom && !self.bloom.may_contain(key) {
            return None;
        }

        let found = if self.index == 0 {
            (0..self.count).rev().find(|&i| self.key(i) == key)
        } else {
            self.fence.search_page(key).and_then(|page| {
                let lo = page * self.page_size;
                let hi = ((page + 1) * self.page_size).min(self.count);
                self.binary_search_page(lo, hi, key)
            })
        };

        match found {
            Some(i) => {
                stats.bloom_true_positives += 1;
                Some(i)
            }
            None => {
                stats.bloom_false_positives += 1;
                None
            }
        }
    }

    /// Binary searches the sorted, deduplicated range `[lo, hi)` for an exact
    /// match on `key`.
    fn binary_search_page(&self, lo: usize, hi: usize, key: i32) -> Option<usize> {
        let (mut l, mut r): (isize, isize) = (lo as isize, hi as isize - 1);
        while l <= r {
            let m = l + (r - l) / 2;
            let mu = m as usize;
            let candidate = self.key(mu);
            if candidate == key {
                return Some(mu);
            } else if candidate < key {
                l = m + 1;
            } else {
                r = m - 1;
            }
        }
        None
    }

    /// Binary searches the sorted range `[lo, hi)` for the smallest index
    /// whose key is `>= bound`, returning `hi` if every key in range is
    /// smaller.
    fn lower_bound_page(&self, lo: usize, hi: usize, bound: i32) -> usize {
        let (mut l, mut r): (isize, isize) = (lo as isize, hi as isize);
        while l < r {
            let m = l + (r - l) / 2;
            if self.key(m as usize) < bound {
                l = m + 1;
            } else {
                r = m;
            }
        }
        l as usize
    }

    /// Range-mode search: smallest index `i` with `key(i) >= bound`, with no
    /// Bloom gating (only levels >= 1 carry a fence; callers handle level 0
    /// with a direct linear scan instead of this method).
    pub fn search_range_bound(&self, bound: i32) -> usize {
        if self.count == 0 {
            return 0;
        }
        if bound <= self.key(0) {
            return 0;
        }
        if bound > self.key(self.count - 1) {
            return self.count;
        }
        match self.fence.search_page(bound) {
            Some(page) => {
                let lo = page * self.page_size;
                let hi = ((page + 1) * self.page_size).min(self.count);
                self.lower_bound_page(lo, hi, bound)
            }
            None => 0,
        }
    }

    /// Coalesces duplicate keys (younger append wins), clears the level,
    /// re-appends in key order, and rebuilds the fence and Bloom filter.
    /// Tombstones are dropped only when this is the current bottommost
    /// level.
    pub fn sort_and_merge(&mut self, bottommost: bool, target_fpr: f64) -> Result<(), LevelError> {
        let mut merged: BTreeMap<i32, (i64, bool)> = BTreeMap::new();
        for i in 0..self.count {
            merged.insert(self.key(i), (self.value(i), self.tombstone(i)));
        }
        self.clear();
        for (key, (value, tomb)) in merged {
            if bottommost && tomb {
                continue;
            }
            self.append(key, value, tomb)?;
        }
        self.construct_fence();
        self.construct_bloom(target_fpr);
        Ok(())
    }
}
