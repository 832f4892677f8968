//! Inheritance graph over a frozen declaration model.
//!
//! Ancestor chains are computed once at construction (nearest first) and
//! stored per type, so every later query is a slice walk rather than a
//! pointer chase. Cycle detection happens exactly once, here.

use ori_decl::{Conformance, DeclModel, MemberId, TypeId};
use smallvec::SmallVec;

use crate::DispatchError;

type TypeList = SmallVec<[TypeId; 4]>;

#[derive(Copy, Clone, PartialEq, Eq)]
enum Visit {
    Pending,
    Active,
    Done,
}

/// Ancestor chains, subclass links, and conformance lookup for a model.
#[derive(Debug)]
pub struct InheritanceGraph<'m> {
    model: &'m DeclModel,
    /// Per type: superclass chain, nearest first.
    ancestors: Vec<TypeList>,
    /// Per type: direct subclasses in declaration order.
    subclasses: Vec<TypeList>,
}

impl<'m> InheritanceGraph<'m> {
    /// Compute every type's ancestor chain.
    ///
    /// Walks each superclass chain upward until it reaches a type whose
    /// chain is already known, then fills the walked path back down. A type
    /// seen twice on the same walk is a cycle.
    pub fn build(model: &'m DeclModel) -> Result<Self, DispatchError> {
        let count = model.type_count();
        let mut state = vec![Visit::Pending; count];
        let mut ancestors: Vec<TypeList> = vec![TypeList::new(); count];
        let mut subclasses: Vec<TypeList> = vec![TypeList::new(); count];
        let mut path = Vec::new();

        for ty in model.types() {
            path.clear();
            let mut cursor = Some(ty.id);
            while let Some(current) = cursor {
                match state[current.index()] {
                    Visit::Done => break,
                    Visit::Active => return Err(DispatchError::cyclic(model, current)),
                    Visit::Pending => {
                        state[current.index()] = Visit::Active;
                        path.push(current);
                        cursor = model.ty(current).superclass;
                    }
                }
            }

            for &current in path.iter().rev() {
                let chain = match model.ty(current).superclass {
                    Some(sup) => {
                        let mut chain = TypeList::with_capacity(ancestors[sup.index()].len() + 1);
                        chain.push(sup);
                        chain.extend_from_slice(&ancestors[sup.index()]);
                        chain
                    }
                    None => TypeList::new(),
                };
                ancestors[current.index()] = chain;
                state[current.index()] = Visit::Done;
            }
        }

        for ty in model.types() {
            if let Some(sup) = ty.superclass {
                subclasses[sup.index()].push(ty.id);
            }
        }

        tracing::debug!(types = count, "built inheritance graph");
        Ok(InheritanceGraph {
            model,
            ancestors,
            subclasses,
        })
    }

    #[inline]
    pub fn model(&self) -> &'m DeclModel {
        self.model
    }

    /// Superclass chain of `ty`, nearest first, excluding `ty`.
    #[inline]
    pub fn ancestors(&self, ty: TypeId) -> &[TypeId] {
        &self.ancestors[ty.index()]
    }

    /// `ty` followed by its ancestors.
    pub fn lineage(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::once(ty).chain(self.ancestors(ty).iter().copied())
    }

    #[inline]
    pub fn superclass(&self, ty: TypeId) -> Option<TypeId> {
        self.ancestors(ty).first().copied()
    }

    /// Strict subclass test.
    pub fn is_subclass_of(&self, ty: TypeId, ancestor: TypeId) -> bool {
        self.ancestors(ty).contains(&ancestor)
    }

    #[inline]
    pub fn direct_subclasses(&self, ty: TypeId) -> &[TypeId] {
        &self.subclasses[ty.index()]
    }

    #[inline]
    pub fn has_subclasses(&self, ty: TypeId) -> bool {
        !self.subclasses[ty.index()].is_empty()
    }

    /// All transitive subclasses of `ty`, breadth first.
    pub fn descendants(&self, ty: TypeId) -> Vec<TypeId> {
        let mut out: Vec<TypeId> = self.direct_subclasses(ty).to_vec();
        let mut next = 0;
        while next < out.len() {
            let current = out[next];
            out.extend_from_slice(self.direct_subclasses(current));
            next += 1;
        }
        out
    }

    /// Follow override links to the original declaration.
    ///
    /// Only links that point strictly up the hierarchy are followed, so a
    /// malformed link cannot loop.
    pub fn override_root(&self, member: MemberId) -> MemberId {
        let mut current = member;
        loop {
            let decl = self.model.member(current);
            match decl.overrides {
                Some(next) if self.is_subclass_of(decl.owner, self.model.member(next).owner) => {
                    current = next;
                }
                _ => return current,
            }
        }
    }

    /// The ancestor member that `member` overrides, searching `ty`'s
    /// ancestors for the nearest matching signature.
    ///
    /// Returns `None` when `member` does not declare an override. Fails when
    /// one ancestor holds several matching members, or when the declared
    /// override link disagrees with the nearest match.
    pub fn overridden_member(
        &self,
        ty: TypeId,
        member: MemberId,
    ) -> Result<Option<MemberId>, DispatchError> {
        let decl = self.model.member(member);
        for &ancestor in self.ancestors(ty) {
            let candidates: SmallVec<[MemberId; 2]> = self
                .model
                .ty(ancestor)
                .members
                .iter()
                .copied()
                .filter(|&c| decl.matches_signature(self.model.member(c)))
                .collect();
            match candidates.as_slice() {
                [] => {}
                [found] => {
                    return match decl.overrides {
                        Some(declared) if declared != *found => Err(DispatchError::ambiguous(
                            self.model,
                            member,
                            &[declared, *found],
                        )),
                        Some(_) => Ok(Some(*found)),
                        None => Ok(None),
                    };
                }
                several => return Err(DispatchError::ambiguous(self.model, member, several)),
            }
        }

        match decl.overrides {
            // Declared link points at something that is not an ancestor member.
            Some(declared) => Err(DispatchError::ambiguous(self.model, member, &[declared])),
            None => Ok(None),
        }
    }

    /// `ty`'s own member in the override chain rooted at `root`.
    pub fn overriding_member(&self, ty: TypeId, root: MemberId) -> Option<MemberId> {
        self.model
            .ty(ty)
            .members
            .iter()
            .copied()
            .find(|&m| self.override_root(m) == root)
    }

    /// The implementation of `root` visible from `ty`: the nearest member in
    /// `ty` or its ancestors whose override chain ends at `root`.
    pub fn implementation_in(&self, ty: TypeId, root: MemberId) -> Option<MemberId> {
        self.lineage(ty)
            .find_map(|current| self.overriding_member(current, root))
    }

    /// Whether some strict descendant of `ty` overrides `root` again.
    pub fn overridden_below(&self, ty: TypeId, root: MemberId) -> bool {
        self.descendants(ty)
            .into_iter()
            .any(|sub| self.overriding_member(sub, root).is_some())
    }

    /// Conformance of `ty` to `protocol`, declared on `ty` or inherited from
    /// the nearest ancestor. Returns the declaring type with the record.
    pub fn conformance(&self, ty: TypeId, protocol: TypeId) -> Option<(TypeId, &'m Conformance)> {
        let model = self.model;
        self.lineage(ty)
            .find_map(|current| model.ty(current).conformance(protocol).map(|c| (current, c)))
    }

    pub fn conforms_to(&self, ty: TypeId, protocol: TypeId) -> bool {
        self.conformance(ty, protocol).is_some()
    }

    /// The member of `ty` satisfying `requirement` of `protocol`.
    pub fn conformance_witness(
        &self,
        ty: TypeId,
        protocol: TypeId,
        requirement: MemberId,
    ) -> Result<MemberId, DispatchError> {
        let (_, conformance) = self
            .conformance(ty, protocol)
            .ok_or_else(|| DispatchError::missing_conformance(self.model, ty, protocol))?;
        conformance
            .witness(requirement)
            .ok_or_else(|| DispatchError::missing_witness(self.model, ty, protocol, requirement))
    }
}

#[cfg(test)]
mod tests;
