//! Dispatch strategies: the resolver's answer for one call site.

use ori_decl::{DeclRef, MemberId, TypeId};

/// How a call site reaches its implementation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallSite {
    /// `super.member(...)`: start lookup above the receiver.
    pub is_super_call: bool,
}

impl CallSite {
    pub const NORMAL: CallSite = CallSite {
        is_super_call: false,
    };

    pub const SUPER: CallSite = CallSite {
        is_super_call: true,
    };
}

/// Which per-type table a table-dispatched call indexes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TableRef {
    /// The receiver class's vtable.
    Class(TypeId),
    /// The witness table of an existential receiver's conformance.
    Witness { protocol: TypeId },
}

/// The resolved dispatch strategy for one entry point at one call site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum DispatchStrategy {
    /// Fixed call to a statically known implementation.
    Direct { target: DeclRef },
    /// Indirect call through `slot` of a per-type table. `root` is the
    /// entry that introduced the slot.
    Table {
        table: TableRef,
        root: DeclRef,
        slot: u32,
    },
    /// Late-bound message send keyed by the root's foreign entry.
    ///
    /// Runtime lookup begins at `search_start`; `bound` is the
    /// implementation visible from there when the program was compiled.
    ForeignMessage {
        selector: DeclRef,
        search_start: TypeId,
        bound: MemberId,
        is_super: bool,
    },
}

/// Field-less view of [`DispatchStrategy`], for assertions and logs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DispatchKind {
    Direct,
    Table,
    ForeignMessage,
}

impl DispatchStrategy {
    pub fn kind(&self) -> DispatchKind {
        match self {
            DispatchStrategy::Direct { .. } => DispatchKind::Direct,
            DispatchStrategy::Table { .. } => DispatchKind::Table,
            DispatchStrategy::ForeignMessage { .. } => DispatchKind::ForeignMessage,
        }
    }

    #[inline]
    pub fn is_direct(&self) -> bool {
        self.kind() == DispatchKind::Direct
    }

    #[inline]
    pub fn is_table(&self) -> bool {
        self.kind() == DispatchKind::Table
    }

    #[inline]
    pub fn is_foreign_message(&self) -> bool {
        self.kind() == DispatchKind::ForeignMessage
    }
}
