//! Dispatch resolution failures.
//!
//! Every variant is an internal-invariant failure: the type checker is
//! supposed to hand over a well-formed model, so none of these are user
//! diagnostics and none are retried. Names are resolved when the error is
//! built so reports do not need the model to render.

use ori_decl::{DeclModel, DeclRef, MemberId, TypeId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("cyclic inheritance involving `{name}`")]
    CyclicInheritance { ty: TypeId, name: String },

    #[error("ambiguous override of `{name}`: candidates {candidates:?}")]
    AmbiguousOverride {
        member: MemberId,
        name: String,
        candidates: Vec<String>,
    },

    #[error("`{ty_name}` conformance to `{protocol_name}` has no witness for `{requirement_name}`")]
    MissingWitness {
        ty: TypeId,
        protocol: TypeId,
        requirement: MemberId,
        ty_name: String,
        protocol_name: String,
        requirement_name: String,
    },

    #[error("`{ty_name}` does not conform to `{protocol_name}`")]
    MissingConformance {
        ty: TypeId,
        protocol: TypeId,
        ty_name: String,
        protocol_name: String,
    },

    #[error("super call to `{member_name}` from `{ty_name}`, which has no superclass")]
    NoSuperclass {
        ty: TypeId,
        member: MemberId,
        ty_name: String,
        member_name: String,
    },

    #[error("super call to `{member_name}` from `{ty_name}`, but no superclass implements it")]
    NoSuperImplementation {
        ty: TypeId,
        member: MemberId,
        ty_name: String,
        member_name: String,
    },

    #[error("`{entry_name}` has no slot in the witness tables of `{protocol_name}`")]
    NoRequirementSlot {
        protocol: TypeId,
        requirement: MemberId,
        protocol_name: String,
        entry_name: String,
    },

    #[error("`{name}` is not a class and has no dispatch table")]
    NoDispatchTable { ty: TypeId, name: String },

    #[error("`{replacement_name}` replaces `{original_name}`, which is not dynamic")]
    NotReplaceable {
        replacement: MemberId,
        original: MemberId,
        replacement_name: String,
        original_name: String,
    },

    #[error("`{original_name}` is replaced by both `{first_name}` and `{second_name}`")]
    DuplicateReplacement {
        original: MemberId,
        original_name: String,
        first_name: String,
        second_name: String,
    },
}

impl DispatchError {
    /// Stable internal error code (E91xx range).
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::CyclicInheritance { .. } => "E9101",
            DispatchError::AmbiguousOverride { .. } => "E9102",
            DispatchError::MissingWitness { .. } => "E9103",
            DispatchError::MissingConformance { .. } => "E9104",
            DispatchError::NoSuperclass { .. } => "E9105",
            DispatchError::NoDispatchTable { .. } => "E9106",
            DispatchError::NotReplaceable { .. } => "E9107",
            DispatchError::DuplicateReplacement { .. } => "E9108",
            DispatchError::NoSuperImplementation { .. } => "E9109",
            DispatchError::NoRequirementSlot { .. } => "E9110",
        }
    }

    pub(crate) fn cyclic(model: &DeclModel, ty: TypeId) -> Self {
        DispatchError::CyclicInheritance {
            ty,
            name: model.type_name(ty).to_owned(),
        }
    }

    pub(crate) fn ambiguous(model: &DeclModel, member: MemberId, candidates: &[MemberId]) -> Self {
        DispatchError::AmbiguousOverride {
            member,
            name: model.member_path(member),
            candidates: candidates.iter().map(|&c| model.member_path(c)).collect(),
        }
    }

    pub(crate) fn missing_witness(
        model: &DeclModel,
        ty: TypeId,
        protocol: TypeId,
        requirement: MemberId,
    ) -> Self {
        DispatchError::MissingWitness {
            ty,
            protocol,
            requirement,
            ty_name: model.type_name(ty).to_owned(),
            protocol_name: model.type_name(protocol).to_owned(),
            requirement_name: model.member_path(requirement),
        }
    }

    pub(crate) fn missing_conformance(model: &DeclModel, ty: TypeId, protocol: TypeId) -> Self {
        DispatchError::MissingConformance {
            ty,
            protocol,
            ty_name: model.type_name(ty).to_owned(),
            protocol_name: model.type_name(protocol).to_owned(),
        }
    }

    pub(crate) fn no_superclass(model: &DeclModel, ty: TypeId, member: MemberId) -> Self {
        DispatchError::NoSuperclass {
            ty,
            member,
            ty_name: model.type_name(ty).to_owned(),
            member_name: model.member_path(member),
        }
    }

    pub(crate) fn no_super_implementation(model: &DeclModel, ty: TypeId, member: MemberId) -> Self {
        DispatchError::NoSuperImplementation {
            ty,
            member,
            ty_name: model.type_name(ty).to_owned(),
            member_name: model.member_path(member),
        }
    }

    pub(crate) fn no_requirement_slot(model: &DeclModel, protocol: TypeId, entry: DeclRef) -> Self {
        DispatchError::NoRequirementSlot {
            protocol,
            requirement: entry.member,
            protocol_name: model.type_name(protocol).to_owned(),
            entry_name: model.describe(entry),
        }
    }

    pub(crate) fn no_dispatch_table(model: &DeclModel, ty: TypeId) -> Self {
        DispatchError::NoDispatchTable {
            ty,
            name: model.type_name(ty).to_owned(),
        }
    }

    pub(crate) fn not_replaceable(
        model: &DeclModel,
        replacement: MemberId,
        original: MemberId,
    ) -> Self {
        DispatchError::NotReplaceable {
            replacement,
            original,
            replacement_name: model.member_path(replacement),
            original_name: model.member_path(original),
        }
    }

    pub(crate) fn duplicate_replacement(
        model: &DeclModel,
        original: MemberId,
        first: MemberId,
        second: MemberId,
    ) -> Self {
        DispatchError::DuplicateReplacement {
            original,
            original_name: model.member_path(original),
            first_name: model.member_path(first),
            second_name: model.member_path(second),
        }
    }
}
