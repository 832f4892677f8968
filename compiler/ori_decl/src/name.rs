//! Interned identifier for type names, member names, and selectors.

use std::fmt;

/// A string interned in a [`StringInterner`](crate::StringInterner).
///
/// The low [`Name::SHARD_BITS`] bits pick the interner shard; the rest index
/// into that shard. Two names are equal exactly when their strings are.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    pub const SHARD_BITS: u32 = 4;
    pub const SHARDS: usize = 1 << Self::SHARD_BITS;
    /// Largest index a single shard can hand out.
    pub const MAX_LOCAL: u32 = u32::MAX >> Self::SHARD_BITS;

    /// The empty string, interned up front in shard 0.
    pub const EMPTY: Name = Name(0);

    const SHARD_MASK: u32 = (1 << Self::SHARD_BITS) - 1;

    #[inline]
    pub const fn new(shard: usize, local: u32) -> Self {
        debug_assert!(shard < Self::SHARDS);
        debug_assert!(local <= Self::MAX_LOCAL);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard is below SHARDS (16)"
        )]
        let shard = shard as u32;
        Name((local << Self::SHARD_BITS) | shard)
    }

    #[inline]
    pub const fn shard(self) -> usize {
        (self.0 & Self::SHARD_MASK) as usize
    }

    #[inline]
    pub const fn local(self) -> usize {
        (self.0 >> Self::SHARD_BITS) as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}.{}", self.shard(), self.local())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}
