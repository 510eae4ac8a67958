//! `tierdb` — a persistent, single-writer LSM-tree key-value engine for
//! fixed-width `i32` keys and `i64` values.
//!
//! The engine organizes data into an in-memory buffer (level 0) backed by
//! progressively larger, sorted, memory-mapped levels. Writes land in the
//! buffer; once it fills, its contents propagate into the next level, which
//! is sorted, deduplicated (younger write wins), and has its spent
//! tombstones dropped once it is the last level that exists. Point lookups
//! are accelerated by a per-level Bloom filter; range lookups by a
//! page-granularity fence index.
//!
//! # Modules
//!
//! - [`bloom`] — the seeded-hash Bloom filter backing level membership tests.
//! - [`fence`] — the per-level page-boundary separator index.
//! - [`mmap_array`] — the memory-mapped, fixed-capacity typed array.
//! - [`level`] — a single level: keys/values/tombstones, fence, Bloom.
//! - [`catalog`] — the plain-text entry-count and dictionary sidecar files.
//! - [`config`] — `EngineConfig` tunables.
//! - [`stats`] — diagnostic counters.
//! - [`engine`] — the `Engine` facade: put/get/range/delete, propagation.
//!
//! # Example
//!
//! ```
//! use tierdb::config::EngineConfig;
//! use tierdb::engine::Engine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let mut engine = Engine::open(dir.path(), EngineConfig::default())?;
//!
//! engine.put(1, 100)?;
//! engine.put(2, 200)?;
//! assert_eq!(engine.get(1)?, Some(100));
//!
//! engine.delete(1)?;
//! assert_eq!(engine.get(1)?, None);
//!
//! assert_eq!(engine.range(0, 10)?, vec![(2, 200)]);
//! # Ok(())
//! # }
//! ```

pub mod bloom;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod fence;
pub mod level;
mod mmap_array;
pub mod stats;

pub use config::EngineConfig;
pub use engine::{Engine, EngineError};
