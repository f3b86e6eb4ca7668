//! Key hashing for [`BucketTable`](crate::BucketTable).
//!
//! The table only needs a function from a byte string to a `u64`; it reduces
//! that value modulo its capacity and makes no other assumption about the
//! distribution. [`Fnv1a`] is the default. Any `Fn(&[u8]) -> u64` can be used
//! in its place.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Maps a key's bytes to the 64-bit hash used for slot placement.
///
/// Implementations must be deterministic for the lifetime of a table: the
/// hash of each key is computed once at insertion and cached in its slot.
pub trait KeyHasher {
    /// Hashes `key`.
    fn hash_key(&self, key: &[u8]) -> u64;
}

impl<F> KeyHasher for F
where
    F: Fn(&[u8]) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &[u8]) -> u64 {
        self(key)
    }
}

/// 64-bit FNV-1a over the raw key bytes, unsalted.
///
/// # Examples
///
/// ```rust
/// use bucket_table::hash::Fnv1a;
/// use bucket_table::hash::KeyHasher;
///
/// assert_eq!(Fnv1a.hash_key(b""), 0xcbf2_9ce4_8422_2325);
/// assert_eq!(Fnv1a.hash_key(b"a"), 0xaf63_dc4c_8601_ec8c);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fnv1a;

impl KeyHasher for Fnv1a {
    #[inline]
    fn hash_key(&self, key: &[u8]) -> u64 {
        fnv1a(key)
    }
}

/// Computes the 64-bit FNV-1a hash of `bytes`.
#[inline]
pub fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// A seeded hasher backed by `foldhash`'s fast fixed-state hasher.
///
/// The same seed always yields the same hashes, so it can be swapped in for
/// [`Fnv1a`] without breaking the cached-hash contract.
#[cfg(feature = "foldhash")]
#[derive(Clone, Copy)]
pub struct FoldHasher {
    state: foldhash::fast::FixedState,
}

#[cfg(feature = "foldhash")]
impl FoldHasher {
    /// Creates a hasher with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: foldhash::fast::FixedState::with_seed(seed),
        }
    }
}

#[cfg(feature = "foldhash")]
impl Default for FoldHasher {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

#[cfg(feature = "foldhash")]
impl core::fmt::Debug for FoldHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FoldHasher").finish_non_exhaustive()
    }
}

#[cfg(feature = "foldhash")]
impl KeyHasher for FoldHasher {
    #[inline]
    fn hash_key(&self, key: &[u8]) -> u64 {
        use core::hash::BuildHasher;

        self.state.hash_one(key)
    }
}

#[cfg(test)]
mod tests {
    use core::hash::Hasher;

    use siphasher::sip::SipHasher;

    use super::*;

    #[test]
    fn fnv1a_reference_vectors() {
        assert_eq!(fnv1a(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn fnv1a_is_byte_sensitive() {
        assert_ne!(fnv1a(b"ab"), fnv1a(b"ba"));
        assert_ne!(fnv1a(b"a"), fnv1a(b"a\0"));
    }

    #[test]
    fn closures_are_key_hashers() {
        let sip = |key: &[u8]| {
            let mut hasher = SipHasher::new_with_keys(7, 11);
            hasher.write(key);
            hasher.finish()
        };

        assert_eq!(sip.hash_key(b"key"), sip.hash_key(b"key"));
        assert_ne!(sip.hash_key(b"key"), sip.hash_key(b"kez"));

        let constant = |_: &[u8]| 42u64;
        assert_eq!(constant.hash_key(b"anything"), 42);
    }

    #[cfg(feature = "foldhash")]
    #[test]
    fn foldhash_is_deterministic_per_seed() {
        let a = FoldHasher::with_seed(3);
        let b = FoldHasher::with_seed(3);
        assert_eq!(a.hash_key(b"hello"), b.hash_key(b"hello"));
    }
}
