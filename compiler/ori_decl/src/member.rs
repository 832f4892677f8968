//! Member declarations and their callable entry points.

use smallvec::{smallvec, SmallVec};

use crate::{MemberFlags, MemberId, Name, TypeId};

/// What kind of declaration a member is.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberKind {
    Method,
    Property { settable: bool },
    Subscript { settable: bool },
    Initializer,
}

impl MemberKind {
    /// Entry points this kind of member exposes, in table order.
    pub fn entries(self) -> SmallVec<[EntryKind; 2]> {
        match self {
            MemberKind::Method => smallvec![EntryKind::Func],
            MemberKind::Property { settable } | MemberKind::Subscript { settable } => {
                if settable {
                    smallvec![EntryKind::Getter, EntryKind::Setter]
                } else {
                    smallvec![EntryKind::Getter]
                }
            }
            MemberKind::Initializer => smallvec![EntryKind::Initializer],
        }
    }

    /// The entry a plain reference to the member means.
    pub fn primary_entry(self) -> EntryKind {
        match self {
            MemberKind::Method => EntryKind::Func,
            MemberKind::Property { .. } | MemberKind::Subscript { .. } => EntryKind::Getter,
            MemberKind::Initializer => EntryKind::Initializer,
        }
    }

    /// Whether two kinds can stand in an override relationship.
    ///
    /// Settability is ignored: an override may add a setter.
    pub fn same_shape(self, other: MemberKind) -> bool {
        matches!(
            (self, other),
            (MemberKind::Method, MemberKind::Method)
                | (MemberKind::Property { .. }, MemberKind::Property { .. })
                | (MemberKind::Subscript { .. }, MemberKind::Subscript { .. })
                | (MemberKind::Initializer, MemberKind::Initializer)
        )
    }
}

/// One callable facet of a member.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    Func,
    Getter,
    Setter,
    Initializer,
}

impl EntryKind {
    /// Suffix used when printing a [`DeclRef`], e.g. `!getter`.
    pub fn suffix(self) -> &'static str {
        match self {
            EntryKind::Func => "",
            EntryKind::Getter => "!getter",
            EntryKind::Setter => "!setter",
            EntryKind::Initializer => "!initializer",
        }
    }
}

/// Reference to a single entry point of a member.
///
/// `foreign` selects the entry compiled with the foreign (message)
/// calling convention rather than the native one.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DeclRef {
    pub member: MemberId,
    pub entry: EntryKind,
    pub foreign: bool,
}

impl DeclRef {
    #[inline]
    pub const fn new(member: MemberId, entry: EntryKind) -> Self {
        Self {
            member,
            entry,
            foreign: false,
        }
    }

    #[inline]
    pub const fn func(member: MemberId) -> Self {
        Self::new(member, EntryKind::Func)
    }

    #[inline]
    pub const fn getter(member: MemberId) -> Self {
        Self::new(member, EntryKind::Getter)
    }

    #[inline]
    pub const fn setter(member: MemberId) -> Self {
        Self::new(member, EntryKind::Setter)
    }

    #[inline]
    pub const fn initializer(member: MemberId) -> Self {
        Self::new(member, EntryKind::Initializer)
    }

    /// The same entry on the foreign calling convention.
    #[inline]
    #[must_use]
    pub const fn as_foreign(self) -> Self {
        Self {
            foreign: true,
            ..self
        }
    }

    /// The same entry on the native calling convention.
    #[inline]
    #[must_use]
    pub const fn as_native(self) -> Self {
        Self {
            foreign: false,
            ..self
        }
    }

    /// The same entry point on a different member (override or witness).
    #[inline]
    #[must_use]
    pub const fn with_member(self, member: MemberId) -> Self {
        Self { member, ..self }
    }
}

/// A member declaration: method, property, subscript, or initializer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub name: Name,
    /// Signature key used for override matching (name plus argument labels).
    pub selector: Name,
    pub owner: TypeId,
    pub kind: MemberKind,
    pub flags: MemberFlags,
    /// Member of an ancestor this one overrides, as linked by the type checker.
    pub overrides: Option<MemberId>,
    /// Late-bound member this one dynamically replaces.
    pub replaces: Option<MemberId>,
}

impl Member {
    #[inline]
    pub fn is_final(&self) -> bool {
        self.flags.contains(MemberFlags::FINAL)
    }

    /// Explicitly `dynamic` or foreign-managed.
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.flags.is_late_bound()
    }

    #[inline]
    pub fn is_requirement(&self) -> bool {
        self.flags.contains(MemberFlags::REQUIREMENT)
    }

    #[inline]
    pub fn is_foreign_exposed(&self) -> bool {
        self.flags.contains(MemberFlags::FOREIGN_EXPOSED)
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    #[inline]
    pub fn throws(&self) -> bool {
        self.flags.contains(MemberFlags::THROWS)
    }

    /// Initializers always produce `Self`.
    #[inline]
    pub fn returns_self(&self) -> bool {
        self.flags.contains(MemberFlags::RETURNS_SELF) || self.kind == MemberKind::Initializer
    }

    pub fn entries(&self) -> impl Iterator<Item = DeclRef> + '_ {
        self.kind
            .entries()
            .into_iter()
            .map(move |entry| DeclRef::new(self.id, entry))
    }

    #[inline]
    pub fn primary(&self) -> DeclRef {
        DeclRef::new(self.id, self.kind.primary_entry())
    }

    /// Whether `other` has the signature this member would override.
    pub fn matches_signature(&self, other: &Member) -> bool {
        self.selector == other.selector
            && self.kind.same_shape(other.kind)
            && self.is_static() == other.is_static()
    }
}
