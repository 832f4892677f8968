//! Type declarations and protocol conformance records.

use std::collections::BTreeMap;

use crate::{MemberId, Name, TypeId};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Class,
    Struct,
    Enum,
    Protocol,
}

/// Where a type's implementation comes from.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum TypeOrigin {
    /// Compiled by us; members may occupy table slots.
    #[default]
    Native,
    /// Imported from the foreign runtime; every member is message dispatched.
    Foreign,
}

/// A type's conformance to one protocol.
///
/// Maps each protocol requirement to the member that satisfies it.
/// `BTreeMap` keeps iteration deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conformance {
    pub protocol: TypeId,
    witnesses: BTreeMap<MemberId, MemberId>,
}

impl Conformance {
    pub fn new(protocol: TypeId) -> Self {
        Self {
            protocol,
            witnesses: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, requirement: MemberId, witness: MemberId) {
        self.witnesses.insert(requirement, witness);
    }

    #[inline]
    pub fn witness(&self, requirement: MemberId) -> Option<MemberId> {
        self.witnesses.get(&requirement).copied()
    }

    /// `(requirement, witness)` pairs ordered by requirement.
    pub fn witnesses(&self) -> impl Iterator<Item = (MemberId, MemberId)> + '_ {
        self.witnesses.iter().map(|(&req, &wit)| (req, wit))
    }

    pub fn len(&self) -> usize {
        self.witnesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.witnesses.is_empty()
    }
}

/// A type declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDecl {
    pub id: TypeId,
    pub name: Name,
    pub kind: TypeKind,
    pub origin: TypeOrigin,
    /// Class cannot be subclassed.
    pub is_final: bool,
    /// Class may be subclassed outside the compilation unit.
    pub is_open: bool,
    pub superclass: Option<TypeId>,
    /// Declared members in source order.
    pub members: Vec<MemberId>,
    pub conformances: Vec<Conformance>,
}

impl TypeDecl {
    #[inline]
    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    #[inline]
    pub fn is_protocol(&self) -> bool {
        self.kind == TypeKind::Protocol
    }

    #[inline]
    pub fn is_foreign(&self) -> bool {
        self.origin == TypeOrigin::Foreign
    }

    /// This type's own conformance record for `protocol`, ignoring ancestors.
    pub fn conformance(&self, protocol: TypeId) -> Option<&Conformance> {
        self.conformances.iter().find(|c| c.protocol == protocol)
    }
}
