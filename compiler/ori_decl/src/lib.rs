//! Declaration model for Ori dispatch resolution.
//!
//! The type checker hands method dispatch an already-validated picture of
//! the program: types with their superclass links and conformances, and
//! members with their modifiers and override links. This crate holds that
//! picture as flat arenas indexed by [`TypeId`] and [`MemberId`].
//!
//! - [`DeclModelBuilder`] populates the arenas once.
//! - [`DeclModel`] is the frozen, read-only result. It is `Sync`, so table
//!   construction can run in parallel across types.
//! - [`DeclRef`] names one callable entry point of a member (a method body,
//!   a getter, a setter, an initializer) on either the native or the foreign
//!   calling convention. Dispatch tables and thunks are keyed by it.

mod flags;
mod ids;
mod interner;
mod member;
mod model;
mod name;
mod types;

pub use flags::MemberFlags;
pub use ids::{MemberId, TypeId};
pub use interner::{InternError, StringInterner};
pub use member::{DeclRef, EntryKind, Member, MemberKind};
pub use model::{DeclModel, DeclModelBuilder, MemberSpec};
pub use name::Name;
pub use types::{Conformance, TypeDecl, TypeKind, TypeOrigin};
