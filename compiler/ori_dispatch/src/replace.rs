//! Dynamic replacement.
//!
//! A member declared as a replacement for another takes over that member's
//! implementation at load time. Only late-bound members can be replaced,
//! since every call to them already goes through a message send.

use std::collections::BTreeMap;

use ori_decl::MemberId;

use crate::{DispatchError, DispatchOptions, InheritanceGraph, Resolver};

/// Original member → the member replacing it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    replacements: BTreeMap<MemberId, MemberId>,
}

impl ReplacementMap {
    /// Collect every `replaces` link in the model.
    ///
    /// Fails when a target is not late bound under `options`, or when two
    /// members replace the same target.
    pub fn build(graph: &InheritanceGraph<'_>, options: DispatchOptions) -> Result<Self, DispatchError> {
        let model = graph.model();
        let resolver = Resolver::new(graph, options);
        let mut replacements = BTreeMap::new();

        for member in model.members() {
            let Some(original) = member.replaces else {
                continue;
            };
            if !resolver.is_late_bound(original) {
                return Err(DispatchError::not_replaceable(model, member.id, original));
            }
            if let Some(&first) = replacements.get(&original) {
                return Err(DispatchError::duplicate_replacement(
                    model, original, first, member.id,
                ));
            }
            tracing::debug!(
                original = %model.member_path(original),
                replacement = %model.member_path(member.id),
                "dynamic replacement"
            );
            replacements.insert(original, member.id);
        }

        Ok(ReplacementMap { replacements })
    }

    pub fn replacement(&self, original: MemberId) -> Option<MemberId> {
        self.replacements.get(&original).copied()
    }

    /// The member whose body runs when `member` is called.
    pub fn active_implementation(&self, member: MemberId) -> MemberId {
        self.replacement(member).unwrap_or(member)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MemberId, MemberId)> + '_ {
        self.replacements.iter().map(|(&original, &replacement)| (original, replacement))
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }
}
