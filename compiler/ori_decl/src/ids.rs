//! Arena indices for declarations.
//!
//! Types and members live in flat arenas inside [`DeclModel`](crate::DeclModel)
//! and are referred to by 32-bit indices. Equality is index equality.

use std::fmt;

macro_rules! decl_index {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

decl_index!(
    /// Index of a type declaration (class, struct, enum, or protocol).
    TypeId,
    "t"
);

decl_index!(
    /// Index of a member declaration.
    MemberId,
    "m"
);
