//! The frozen declaration model and its builder.
//!
//! The type checker populates a [`DeclModelBuilder`] once; [`finish`]
//! freezes it into a [`DeclModel`] that dispatch resolution only reads.
//!
//! [`finish`]: DeclModelBuilder::finish

use crate::{
    Conformance, DeclRef, Member, MemberFlags, MemberId, MemberKind, Name, StringInterner,
    TypeDecl, TypeId, TypeKind, TypeOrigin,
};

/// Arena of type and member declarations.
#[derive(Debug, Default)]
pub struct DeclModel {
    interner: StringInterner,
    types: Vec<TypeDecl>,
    members: Vec<Member>,
}

impl DeclModel {
    /// # Panics
    /// Panics if `id` was not produced by this model's builder.
    #[inline]
    pub fn ty(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.index()]
    }

    /// # Panics
    /// Panics if `id` was not produced by this model's builder.
    #[inline]
    pub fn member(&self, id: MemberId) -> &Member {
        &self.members[id.index()]
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter()
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    #[inline]
    pub fn str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    pub fn type_name(&self, id: TypeId) -> &'static str {
        self.str(self.ty(id).name)
    }

    /// `Owner.name`, for logs and error reports.
    pub fn member_path(&self, id: MemberId) -> String {
        let member = self.member(id);
        format!("{}.{}", self.type_name(member.owner), self.str(member.name))
    }

    /// `#Owner.name!entry[.foreign]`, for logs and error reports.
    pub fn describe(&self, decl: DeclRef) -> String {
        let foreign = if decl.foreign { ".foreign" } else { "" };
        format!(
            "#{}{}{foreign}",
            self.member_path(decl.member),
            decl.entry.suffix()
        )
    }

    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.types
            .iter()
            .find(|ty| self.str(ty.name) == name)
            .map(|ty| ty.id)
    }

    /// First member of `ty` with the given name.
    pub fn find_member(&self, ty: TypeId, name: &str) -> Option<MemberId> {
        self.ty(ty)
            .members
            .iter()
            .copied()
            .find(|&m| self.str(self.member(m).name) == name)
    }
}

/// Description of a member to add to the model.
#[derive(Clone, Debug)]
pub struct MemberSpec {
    name: String,
    selector: Option<String>,
    kind: MemberKind,
    flags: MemberFlags,
    overrides: Option<MemberId>,
    replaces: Option<MemberId>,
}

impl MemberSpec {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            selector: None,
            kind,
            flags: MemberFlags::empty(),
            overrides: None,
            replaces: None,
        }
    }

    pub fn method(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Method)
    }

    pub fn property(name: impl Into<String>, settable: bool) -> Self {
        Self::new(name, MemberKind::Property { settable })
    }

    /// Subscripts are told apart by their labels, e.g. `subscript(native:)`.
    pub fn subscript(selector: impl Into<String>, settable: bool) -> Self {
        Self::new("subscript", MemberKind::Subscript { settable }).selector(selector)
    }

    pub fn initializer(selector: impl Into<String>) -> Self {
        Self::new("init", MemberKind::Initializer).selector(selector)
    }

    #[must_use]
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: MemberFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[must_use]
    pub fn overriding(mut self, overridden: MemberId) -> Self {
        self.overrides = Some(overridden);
        self
    }

    #[must_use]
    pub fn replacing(mut self, original: MemberId) -> Self {
        self.replaces = Some(original);
        self
    }
}

/// Mutable builder for a [`DeclModel`].
#[derive(Debug, Default)]
pub struct DeclModelBuilder {
    model: DeclModel,
}

impl DeclModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, s: &str) -> Name {
        self.model.interner.intern(s)
    }

    /// Read access while building, e.g. to look up earlier declarations.
    pub fn model(&self) -> &DeclModel {
        &self.model
    }

    pub fn add_type(&mut self, name: &str, kind: TypeKind) -> TypeId {
        let id = TypeId::from_raw(arena_index(self.model.types.len()));
        let name = self.intern(name);
        self.model.types.push(TypeDecl {
            id,
            name,
            kind,
            origin: TypeOrigin::Native,
            is_final: false,
            is_open: false,
            superclass: None,
            members: Vec::new(),
            conformances: Vec::new(),
        });
        id
    }

    pub fn class(&mut self, name: &str) -> TypeId {
        self.add_type(name, TypeKind::Class)
    }

    /// Class with a superclass.
    pub fn subclass(&mut self, name: &str, superclass: TypeId) -> TypeId {
        let id = self.class(name);
        self.set_superclass(id, superclass);
        id
    }

    pub fn protocol(&mut self, name: &str) -> TypeId {
        self.add_type(name, TypeKind::Protocol)
    }

    pub fn set_superclass(&mut self, ty: TypeId, superclass: TypeId) {
        self.model.types[ty.index()].superclass = Some(superclass);
    }

    pub fn set_final(&mut self, ty: TypeId) {
        self.model.types[ty.index()].is_final = true;
    }

    pub fn set_open(&mut self, ty: TypeId) {
        self.model.types[ty.index()].is_open = true;
    }

    pub fn set_origin(&mut self, ty: TypeId, origin: TypeOrigin) {
        self.model.types[ty.index()].origin = origin;
    }

    /// Declare a member on `owner`. Members of protocols are requirements.
    pub fn add_member(&mut self, owner: TypeId, spec: MemberSpec) -> MemberId {
        let id = MemberId::from_raw(arena_index(self.model.members.len()));
        let name = self.intern(&spec.name);
        let selector = spec
            .selector
            .as_deref()
            .map_or(name, |selector| self.intern(selector));
        let mut flags = spec.flags;
        if self.model.ty(owner).is_protocol() {
            flags |= MemberFlags::REQUIREMENT;
        }
        self.model.members.push(Member {
            id,
            name,
            selector,
            owner,
            kind: spec.kind,
            flags,
            overrides: spec.overrides,
            replaces: spec.replaces,
        });
        self.model.types[owner.index()].members.push(id);
        id
    }

    /// Record that `ty` conforms to `protocol` with the given
    /// `(requirement, witness)` pairs.
    pub fn add_conformance(
        &mut self,
        ty: TypeId,
        protocol: TypeId,
        witnesses: &[(MemberId, MemberId)],
    ) {
        let mut conformance = Conformance::new(protocol);
        for &(requirement, witness) in witnesses {
            conformance.insert(requirement, witness);
        }
        self.model.types[ty.index()].conformances.push(conformance);
    }

    pub fn finish(self) -> DeclModel {
        self.model
    }
}

/// # Panics
/// Panics when an arena outgrows 32-bit indices.
fn arena_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("declaration arena overflow: {len} entries"))
}
