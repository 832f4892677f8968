//! Member modifier flags.

use bitflags::bitflags;

bitflags! {
    /// Modifiers attached to a member declaration.
    ///
    /// Set once by the type checker; never mutated after the model is built.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MemberFlags: u16 {
        /// Cannot be overridden.
        const FINAL = 1 << 0;
        /// Late bound: dispatched by message lookup, never through a table slot.
        const DYNAMIC = 1 << 1;
        /// Abstract protocol requirement.
        const REQUIREMENT = 1 << 2;
        /// Has an entry point callable from the foreign runtime.
        const FOREIGN_EXPOSED = 1 << 3;
        /// Type-level member (receiver is the metatype).
        const STATIC = 1 << 4;
        /// Storage is provided by the foreign runtime. Implies `DYNAMIC`.
        const MANAGED = 1 << 5;
        /// Result is the dynamic `Self` type.
        const RETURNS_SELF = 1 << 6;
        /// Can fail; forwarding thunks propagate the failure.
        const THROWS = 1 << 7;
    }
}

impl MemberFlags {
    /// Dynamic either explicitly or through foreign-managed storage.
    #[inline]
    pub fn is_late_bound(self) -> bool {
        self.intersects(Self::DYNAMIC | Self::MANAGED)
    }
}
