//! A fixed-capacity, memory-mapped array of `Copy` values backing one
//! level's keys, values, or tombstone flags.
//!
//! Each array is a plain file truncated to `capacity * size_of::<T>()` bytes
//! and mapped `MAP_SHARED` so that writes are visible to any later re-open of
//! the same file. Indexing is unaligned pointer access against the mapping,
//! the same shape the teacher's SSTable reader uses for its mapped blocks.

use std::fs::OpenOptions;
use std::marker::PhantomData;
use std::path::Path;

use memmap2::MmapMut;

/// Memory-mapped, fixed-capacity slice of `T`. `T` must have no padding and
/// no invalid bit patterns, since elements are read back via
/// `ptr::read_unaligned` over raw mapped bytes — true for `i32`, `i64`, and
/// `u8`, the only types this crate instantiates it with.
pub(crate) struct MappedArray<T> {
    mmap: MmapMut,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T: Copy> MappedArray<T> {
    /// Opens (creating if absent) the backing file at `path` and truncates
    /// it to hold exactly `capacity` elements.
    pub fn open(path: &Path, capacity: usize) -> std::io::Result<Self> {
        let elem_size = std::mem::size_of::<T>();
        let byte_len = (capacity * elem_size).max(1);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.set_len(byte_len as u64)?;

        // SAFETY: `file` was just sized to `byte_len` bytes and stays open
        // for the mapping's lifetime via `MmapMut`'s internal handle; no
        // other process is assumed to truncate it concurrently (the engine
        // is single-writer, per the crate's concurrency model).
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            mmap,
            capacity,
            _marker: PhantomData,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reads the element at `index`. Panics if `index >= capacity`.
    pub fn get(&self, index: usize) -> T {
        assert!(index < self.capacity, "mapped array index out of bounds");
        let elem_size = std::mem::size_of::<T>();
        let offset = index * elem_size;
        // SAFETY: `offset + elem_size <= mmap.len()` by construction, and
        // `T` is `Copy` with no validity invariants beyond its bit pattern.
        unsafe {
            let ptr = self.mmap.as_ptr().add(offset) as *const T;
            ptr.read_unaligned()
        }
    }

    /// Writes `value` at `index`. Panics if `index >= capacity`.
    pub fn set(&mut self, index: usize, value: T) {
        assert!(index < self.capacity, "mapped array index out of bounds");
        let elem_size = std::mem::size_of::<T>();
        let offset = index * elem_size;
        // SAFETY: see `get`; the mapping is writable (`MmapMut`).
        unsafe {
            let ptr = self.mmap.as_mut_ptr().add(offset) as *mut T;
            ptr.write_unaligned(value);
        }
    }
}
