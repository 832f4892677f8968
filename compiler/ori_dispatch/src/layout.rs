//! Slot layout of class dispatch tables.
//!
//! A class's layout is its superclass's layout followed by the slots its
//! own root declarations introduce. Inherited slots keep their index, so a
//! slot number resolved against any class is valid for all of its
//! subclasses.

use ori_decl::DeclRef;
use rustc_hash::FxHashMap;

/// Ordered slot keys (root entry points) of one class's table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotLayout {
    slots: Vec<DeclRef>,
    index: FxHashMap<DeclRef, u32>,
}

impl SlotLayout {
    /// Start from the superclass layout, keeping every inherited index.
    pub(crate) fn inherit(parent: &SlotLayout) -> Self {
        parent.clone()
    }

    pub(crate) fn push(&mut self, root: DeclRef) {
        if self.index.contains_key(&root) {
            return;
        }
        let slot = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(root);
        self.index.insert(root, slot);
    }

    #[inline]
    pub fn slot_of(&self, root: DeclRef) -> Option<u32> {
        self.index.get(&root).copied()
    }

    #[inline]
    pub fn slots(&self) -> &[DeclRef] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use ori_decl::MemberId;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn inherited_slots_keep_their_index() {
        let mut base = SlotLayout::default();
        base.push(DeclRef::func(MemberId::from_raw(0)));
        base.push(DeclRef::getter(MemberId::from_raw(1)));

        let mut derived = SlotLayout::inherit(&base);
        derived.push(DeclRef::func(MemberId::from_raw(5)));
        derived.push(DeclRef::func(MemberId::from_raw(0)));

        assert_eq!(derived.len(), 3);
        assert_eq!(derived.slot_of(DeclRef::getter(MemberId::from_raw(1))), Some(1));
        assert_eq!(derived.slot_of(DeclRef::func(MemberId::from_raw(5))), Some(2));
        assert_eq!(base.slot_of(DeclRef::func(MemberId::from_raw(5))), None);
    }
}
