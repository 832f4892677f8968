//! Class dispatch tables.
//!
//! A table has one slot per entry in the class's [`SlotLayout`]: inherited
//! slots first, in the superclass's order, then the slots the class's own
//! root declarations introduce. Each slot holds the implementation visible
//! from the class. Late-bound members never get a slot; their message
//! thunks are listed separately.
//!
//! [`SlotLayout`]: crate::SlotLayout

use std::sync::Arc;

use ori_decl::{DeclRef, MemberId, TypeId};
use rustc_hash::FxHashMap;

use crate::{
    Convention, ConventionPair, DispatchError, DispatchOptions, InheritanceGraph, Resolver, Thunk,
    ThunkId, ThunkKind, ThunkSet, ThunkSynthesizer,
};

const TO_FOREIGN: ConventionPair = ConventionPair::new(Convention::Method, Convention::ForeignMethod);
const FROM_FOREIGN: ConventionPair =
    ConventionPair::new(Convention::ForeignMethod, Convention::Method);

/// What a table slot calls.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SlotImpl {
    /// The implementation's native entry.
    Direct(DeclRef),
    /// A message-send thunk: the implementation is a dynamic override of a
    /// root that is not itself late bound.
    DynamicThunk(ThunkId),
    /// An adapter for an override whose failure convention differs from
    /// the root's.
    OverrideThunk(ThunkId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TableSlot {
    /// The root entry that introduced the slot.
    pub root: DeclRef,
    pub implementation: SlotImpl,
    /// The slot was introduced by an ancestor.
    pub inherited: bool,
    /// The implementation is not the root's own.
    pub overridden: bool,
}

/// The dispatch table of one class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchTable {
    class: TypeId,
    slots: Vec<TableSlot>,
    dynamic_thunks: Vec<ThunkId>,
    foreign_entries: Vec<ThunkId>,
    thunks: ThunkSet,
}

impl DispatchTable {
    #[inline]
    pub fn class(&self) -> TypeId {
        self.class
    }

    #[inline]
    pub fn slots(&self) -> &[TableSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Index of the slot introduced by `root`.
    pub fn slot_index(&self, root: DeclRef) -> Option<u32> {
        let root = root.as_native();
        self.slots
            .iter()
            .position(|slot| slot.root == root)
            .and_then(|i| u32::try_from(i).ok())
    }

    pub fn slot(&self, root: DeclRef) -> Option<&TableSlot> {
        let root = root.as_native();
        self.slots.iter().find(|slot| slot.root == root)
    }

    /// Whether any entry of `member` introduced a slot.
    pub fn has_slot_for(&self, member: MemberId) -> bool {
        self.slots.iter().any(|slot| slot.root.member == member)
    }

    /// Message-send thunks for the late-bound members the class declares,
    /// in declaration order.
    pub fn dynamic_thunks(&self) -> impl Iterator<Item = &Thunk> + '_ {
        self.dynamic_thunks.iter().map(|&id| self.thunks.get(id))
    }

    /// The message-send thunk whose source is `decl`.
    pub fn dynamic_thunk_for(&self, decl: DeclRef) -> Option<&Thunk> {
        self.dynamic_thunks().find(|thunk| thunk.source == decl.as_native())
    }

    /// Entry points through which the foreign runtime reaches native
    /// implementations.
    pub fn foreign_entries(&self) -> impl Iterator<Item = &Thunk> + '_ {
        self.foreign_entries.iter().map(|&id| self.thunks.get(id))
    }

    #[inline]
    pub fn thunks(&self) -> &ThunkSet {
        &self.thunks
    }

    #[inline]
    pub fn thunk(&self, id: ThunkId) -> &Thunk {
        self.thunks.get(id)
    }
}

/// Builds and caches dispatch tables.
///
/// One builder serves one thread: it owns a [`Resolver`] (whose layout
/// cache is not `Sync`) and the tables it has built so far.
pub struct TableBuilder<'a> {
    pub(crate) resolver: Resolver<'a>,
    pub(crate) synth: ThunkSynthesizer<'a>,
    tables: FxHashMap<TypeId, Arc<DispatchTable>>,
}

impl<'a> TableBuilder<'a> {
    pub fn new(graph: &'a InheritanceGraph<'a>, options: DispatchOptions) -> Self {
        Self {
            resolver: Resolver::new(graph, options),
            synth: ThunkSynthesizer::new(graph),
            tables: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn resolver(&self) -> &Resolver<'a> {
        &self.resolver
    }

    #[inline]
    pub fn synthesizer(&self) -> ThunkSynthesizer<'a> {
        self.synth
    }

    /// The dispatch table of class `ty`.
    pub fn build_table(&mut self, ty: TypeId) -> Result<Arc<DispatchTable>, DispatchError> {
        if let Some(table) = self.tables.get(&ty) {
            return Ok(Arc::clone(table));
        }
        let model = self.resolver.model();
        if !model.ty(ty).is_class() {
            return Err(DispatchError::no_dispatch_table(model, ty));
        }

        let table = Arc::new(self.compute_table(ty)?);
        tracing::debug!(
            class = model.type_name(ty),
            slots = table.len(),
            dynamic_thunks = table.dynamic_thunks.len(),
            foreign_entries = table.foreign_entries.len(),
            "built dispatch table"
        );
        self.tables.insert(ty, Arc::clone(&table));
        Ok(table)
    }

    fn compute_table(&self, ty: TypeId) -> Result<DispatchTable, DispatchError> {
        let graph = self.resolver.graph();
        let model = graph.model();
        let layout = self.resolver.class_layout(ty);
        let mut thunks = ThunkSet::new();

        let mut slots = Vec::with_capacity(layout.len());
        for &root in layout.slots() {
            // Nearest override that actually provides this accessor.
            let implementer = graph
                .lineage(ty)
                .filter_map(|current| graph.overriding_member(current, root.member))
                .find(|&m| model.member(m).kind.entries().contains(&root.entry))
                .unwrap_or(root.member);
            let own = root.with_member(implementer);
            let implementation = if self.resolver.is_late_bound(implementer) {
                let message_root = self.resolver.message_root(implementer);
                let thunk = self.synth.synthesize(
                    ThunkKind::DynamicDispatch,
                    own,
                    root.with_member(message_root).as_foreign(),
                    ty,
                    TO_FOREIGN,
                );
                SlotImpl::DynamicThunk(thunks.intern(thunk))
            } else if implementer != root.member
                && model.member(implementer).throws() != model.member(root.member).throws()
            {
                let thunk = self.synth.synthesize(
                    ThunkKind::Override,
                    root,
                    own,
                    ty,
                    ConventionPair::new(Convention::Method, Convention::Method),
                );
                SlotImpl::OverrideThunk(thunks.intern(thunk))
            } else {
                SlotImpl::Direct(own)
            };
            tracing::trace!(
                class = model.type_name(ty),
                root = %model.describe(root),
                implementation = ?implementation,
                "filled table slot"
            );
            slots.push(TableSlot {
                root,
                implementation,
                inherited: model.member(root.member).owner != ty,
                overridden: implementer != root.member,
            });
        }

        let mut dynamic_thunks = Vec::new();
        let mut foreign_entries = Vec::new();
        let native = !model.ty(ty).is_foreign();
        for &id in &model.ty(ty).members {
            // Validates the override link before the chain is trusted.
            graph.overridden_member(ty, id)?;
            let member = model.member(id);
            let late_bound = self.resolver.is_late_bound(id);
            if late_bound && native {
                let message_root = self.resolver.message_root(id);
                for entry in member.entries() {
                    let thunk = self.synth.synthesize(
                        ThunkKind::DynamicDispatch,
                        entry,
                        entry.with_member(message_root).as_foreign(),
                        ty,
                        TO_FOREIGN,
                    );
                    let id = thunks.intern(thunk);
                    if !dynamic_thunks.contains(&id) {
                        dynamic_thunks.push(id);
                    }
                }
            }
            if native && (late_bound || member.is_foreign_exposed()) {
                for entry in member.entries() {
                    let thunk = self.synth.synthesize(
                        ThunkKind::ForeignEntry,
                        entry.as_foreign(),
                        entry,
                        ty,
                        FROM_FOREIGN,
                    );
                    foreign_entries.push(thunks.intern(thunk));
                }
            }
        }

        Ok(DispatchTable {
            class: ty,
            slots,
            dynamic_thunks,
            foreign_entries,
            thunks,
        })
    }
}
