//! Sharded string interner for declaration names and selectors.
//!
//! Names are interned while the declaration model is being built and only
//! read afterwards, so lookups from parallel table builders take shared
//! read locks and rarely meet a writer.

use std::hash::{Hash, Hasher};

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};

use crate::Name;

#[derive(Default)]
struct Shard {
    ids: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl Shard {
    fn insert(&mut self, s: &'static str) -> Option<u32> {
        let local = u32::try_from(self.strings.len())
            .ok()
            .filter(|&local| local <= Name::MAX_LOCAL)?;
        self.strings.push(s);
        self.ids.insert(s, local);
        Some(local)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    #[error("interner shard {shard} is full ({} strings)", Name::MAX_LOCAL)]
    ShardFull { shard: usize },
}

/// Sharded string interner.
///
/// Interned strings are leaked, so [`lookup`](Self::lookup) hands out
/// `&'static str` without holding a lock past the call.
pub struct StringInterner {
    shards: [RwLock<Shard>; Name::SHARDS],
}

impl StringInterner {
    pub fn new() -> Self {
        let interner = StringInterner {
            shards: std::array::from_fn(|_| RwLock::new(Shard::default())),
        };
        interner.shards[0].write().insert("");
        interner
    }

    fn shard_of(s: &str) -> usize {
        if s.is_empty() {
            return 0;
        }
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "only the low bits select a shard"
        )]
        let hash = hasher.finish() as usize;
        hash % Name::SHARDS
    }

    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        let shard = Self::shard_of(s);
        if let Some(&local) = self.shards[shard].read().ids.get(s) {
            return Ok(Name::new(shard, local));
        }

        let mut guard = self.shards[shard].write();
        // Another writer may have interned it between the two locks.
        if let Some(&local) = guard.ids.get(s) {
            return Ok(Name::new(shard, local));
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let local = guard.insert(leaked).ok_or(InternError::ShardFull { shard })?;
        Ok(Name::new(shard, local))
    }

    /// # Panics
    /// Panics if the string's shard is full.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// The string behind `name`, or `"<unknown>"` for a name from another
    /// interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.shards[name.shard()]
            .read()
            .strings
            .get(name.local())
            .copied()
            .unwrap_or("<unknown>")
    }

    /// Number of distinct interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().strings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
