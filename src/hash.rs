//! Key hashing.
//!
//! Any `BuildHasher` works. The dictionary feeds the raw key bytes to a
//! fresh hasher in a single `write` call and keeps the `u64` result.

use core::hash::{BuildHasher, Hasher};

/// Builder for [`BkdrHasher`]. Stateless, so hashes are stable across runs.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Bkdr;

impl BuildHasher for Bkdr {
    type Hasher = BkdrHasher;

    #[inline]
    fn build_hasher(&self) -> BkdrHasher {
        BkdrHasher::default()
    }
}

/// BKDR string hash: `h = h * 131 + byte` over 32-bit wrapping arithmetic.
#[derive(Clone, Debug, Default)]
pub struct BkdrHasher {
    hash: u32,
}

impl Hasher for BkdrHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.hash = self.hash.wrapping_mul(131).wrapping_add(u32::from(b));
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.hash)
    }
}

/// Hash `key` the way the dictionary does.
#[inline]
pub(crate) fn hash_key<S: BuildHasher>(hasher: &S, key: &str) -> u64 {
    let mut state = hasher.build_hasher();
    state.write(key.as_bytes());
    state.finish()
}
