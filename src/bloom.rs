//! Fixed-size Bloom filter backing each level's membership test.
//!
//! Every hash is derived from a single MurmurHash3 x86_32 implementation,
//! reseeded per hash function (seed = hash index). This avoids pulling in a
//! generic Bloom filter crate, which typically hides per-seed hashing and bit
//! introspection behind a SipHash-backed API — both of which the engine needs
//! (diagnostics read individual bits, and sizing is derived directly from the
//! target false-positive rate rather than a crate-chosen default).

/// Non-cryptographic 32-bit hash (MurmurHash3 x86_32), seeded.
fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;

    let mut hash = seed;
    let chunks = data.chunks_exact(4);
    let tail = chunks.remainder();

    for chunk in chunks {
        let mut k = u32::from_le_bytes(chunk.try_into().unwrap());
        k = k.wrapping_mul(C1);
        k = k.rotate_left(15);
        k = k.wrapping_mul(C2);
        hash ^= k;
        hash = hash.rotate_left(13);
        hash = hash.wrapping_mul(5).wrapping_add(0xe6546b64);
    }

    let mut k1: u32 = 0;
    for (i, &byte) in tail.iter().enumerate() {
        k1 |= (byte as u32) << (8 * i);
    }
    if !tail.is_empty() {
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(15);
        k1 = k1.wrapping_mul(C2);
        hash ^= k1;
    }

    hash ^= data.len() as u32;
    hash ^= hash >> 16;
    hash = hash.wrapping_mul(0x85eb_ca6b);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(0xc2b2_ae35);
    hash ^= hash >> 16;
    hash
}

/// A fixed-size Bloom filter over `i32` keys, addressed by `num_hashes`
/// independently seeded MurmurHash3 passes.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: usize,
    num_hashes: usize,
}

impl BloomFilter {
    const WORD_BITS: usize = 64;

    /// Builds an empty filter with an explicit bit width and hash count.
    pub fn new(num_bits: usize, num_hashes: usize) -> Self {
        let num_bits = num_bits.max(1);
        let words = num_bits.div_ceil(Self::WORD_BITS);
        Self {
            bits: vec![0u64; words],
            num_bits,
            num_hashes: num_hashes.max(1),
        }
    }

    /// Sizes a filter for `capacity` entries at the target false-positive
    /// rate `target_fpr`: `m = ceil(-n * ln(eps) / (ln 2)^2)`,
    /// `k = max(1, round((m / n) * ln 2))`.
    pub fn for_capacity(capacity: usize, target_fpr: f64) -> Self {
        if capacity == 0 {
            return Self::new(1, 1);
        }
        let n = capacity as f64;
        let ln2 = std::f64::consts::LN_2;
        let m = (-n * target_fpr.ln() / (ln2 * ln2)).ceil().max(1.0);
        let k = ((m / n) * ln2).round().max(1.0);
        Self::new(m as usize, k as usize)
    }

    fn word_and_bit(&self, index: usize) -> (usize, u64) {
        (index / Self::WORD_BITS, 1u64 << (index % Self::WORD_BITS))
    }

    fn bit_index(&self, key: i32, seed: u32) -> usize {
        let hash = murmur3_32(&key.to_le_bytes(), seed);
        (hash as usize) % self.num_bits
    }

    /// Inserts `key`, setting one bit per hash function.
    pub fn add(&mut self, key: i32) {
        for seed in 0..self.num_hashes as u32 {
            let index = self.bit_index(key, seed);
            let (word, bit) = self.word_and_bit(index);
            self.bits[word] |= bit;
        }
    }

    /// Returns `false` only if `key` is definitely absent; `true` may be a
    /// false positive.
    pub fn may_contain(&self, key: i32) -> bool {
        (0..self.num_hashes as u32).all(|seed| {
            let index = self.bit_index(key, seed);
            let (word, bit) = self.word_and_bit(index);
            self.bits[word] & bit != 0
        })
    }

    /// Resets every bit to zero without changing the filter's dimensions.
    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|w| *w = 0);
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    /// Diagnostic accessor for a single bit.
    pub fn get_bit(&self, index: usize) -> bool {
        let (word, bit) = self.word_and_bit(index);
        self.bits[word] & bit != 0
    }
}
