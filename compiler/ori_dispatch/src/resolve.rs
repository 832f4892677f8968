//! The dispatch resolver.
//!
//! Given an entry point and the static receiver type at a call site,
//! decides between a direct call, a table slot, and a foreign message send.
//! Rules apply in priority order:
//!
//! 1. Late-bound members (dynamic anywhere up their override chain,
//!    foreign-managed, or owned by a foreign type) always go through
//!    message dispatch. So does a call naming a plain ancestor when the
//!    implementation visible from the receiver is late bound. A super call
//!    only moves where lookup starts.
//! 2. Protocol requirements resolve to their witness, which is then
//!    resolved like any other member.
//! 3. Super calls bind directly to the superclass's implementation.
//! 4. Overridable class members use the root's table slot.
//! 5. Everything else is a direct call.
//!
//! Being exposed to the foreign runtime does not make a member late bound;
//! only `dynamic` (or managed storage) does.

use std::cell::RefCell;
use std::rc::Rc;

use ori_decl::{DeclModel, DeclRef, Member, MemberId, TypeId};
use rustc_hash::FxHashMap;

use crate::layout::SlotLayout;
use crate::{
    CallSite, DispatchError, DispatchOptions, DispatchStrategy, InheritanceGraph, TableRef,
};

/// Resolves dispatch strategies against a frozen model.
///
/// # Interior Mutability
///
/// Class slot layouts are memoized in a `RefCell` because resolution takes
/// `&self`. Layouts are a pure function of the model, so the cache never
/// needs invalidating. The cache makes a `Resolver` `!Sync`; parallel
/// callers create one resolver per worker.
pub struct Resolver<'a> {
    graph: &'a InheritanceGraph<'a>,
    options: DispatchOptions,
    layouts: RefCell<FxHashMap<TypeId, Rc<SlotLayout>>>,
}

impl<'a> Resolver<'a> {
    pub fn new(graph: &'a InheritanceGraph<'a>, options: DispatchOptions) -> Self {
        Self {
            graph,
            options,
            layouts: RefCell::new(FxHashMap::default()),
        }
    }

    #[inline]
    pub fn graph(&self) -> &'a InheritanceGraph<'a> {
        self.graph
    }

    #[inline]
    pub fn model(&self) -> &'a DeclModel {
        self.graph.model()
    }

    #[inline]
    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Resolve a member's primary entry point (method body, getter, or
    /// initializer).
    pub fn resolve_member(
        &self,
        member: MemberId,
        receiver: TypeId,
        site: CallSite,
    ) -> Result<DispatchStrategy, DispatchError> {
        self.resolve(self.model().member(member).primary(), receiver, site)
    }

    /// Resolve one entry point called on a receiver of static type `receiver`.
    pub fn resolve(
        &self,
        decl: DeclRef,
        receiver: TypeId,
        site: CallSite,
    ) -> Result<DispatchStrategy, DispatchError> {
        let model = self.model();
        let member = model.member(decl.member);
        // Reject inconsistent override links before trusting `override_root`.
        self.graph.overridden_member(member.owner, decl.member)?;
        let root = self.graph.override_root(decl.member);

        let named_late_bound = self.is_late_bound(decl.member);
        if member.is_requirement() && !named_late_bound {
            return self.resolve_requirement(decl, receiver, site);
        }

        let search_start = if site.is_super_call {
            self.graph
                .superclass(receiver)
                .ok_or_else(|| DispatchError::no_superclass(model, receiver, decl.member))?
        } else {
            receiver
        };
        // The implementation that runs, which may be late bound even when the
        // member named at the call site is not.
        let visible = match self.graph.implementation_in(search_start, root) {
            Some(visible)
                if !site.is_super_call
                    || model.member(visible).kind.entries().contains(&decl.entry) =>
            {
                visible
            }
            _ if site.is_super_call && !member.is_requirement() => {
                return Err(DispatchError::no_super_implementation(
                    model,
                    receiver,
                    decl.member,
                ));
            }
            _ => decl.member,
        };

        let strategy = if named_late_bound || self.is_late_bound(visible) {
            let introduced = if named_late_bound { decl.member } else { visible };
            DispatchStrategy::ForeignMessage {
                selector: decl.with_member(self.message_root(introduced)).as_foreign(),
                search_start,
                bound: visible,
                is_super: site.is_super_call,
            }
        } else if site.is_super_call {
            DispatchStrategy::Direct {
                target: decl.with_member(visible).as_native(),
            }
        } else if self.is_overridable(member, receiver, root) {
            let root_decl = decl.with_member(root).as_native();
            match self.class_layout(receiver).slot_of(root_decl) {
                Some(slot) => DispatchStrategy::Table {
                    table: TableRef::Class(receiver),
                    root: root_decl,
                    slot,
                },
                // Accessor introduced by an override; it has no inherited slot.
                None => DispatchStrategy::Direct {
                    target: decl.as_native(),
                },
            }
        } else {
            DispatchStrategy::Direct {
                target: decl.with_member(visible).as_native(),
            }
        };

        tracing::debug!(
            decl = %model.describe(decl),
            receiver = model.type_name(receiver),
            is_super = site.is_super_call,
            kind = ?strategy.kind(),
            "resolved dispatch"
        );
        Ok(strategy)
    }

    /// Whether calls to `member` must be message dispatched.
    ///
    /// Late binding is inherited: if any declaration on the override chain
    /// from `member` up to its root is dynamic, so is `member`, whatever
    /// modifiers it repeats or adds.
    pub fn is_late_bound(&self, member: MemberId) -> bool {
        let model = self.model();
        let mut current = member;
        loop {
            if self.is_late_bound_here(current) {
                return true;
            }
            let decl = model.member(current);
            match decl.overrides {
                Some(next) if self.graph.is_subclass_of(decl.owner, model.member(next).owner) => {
                    current = next;
                }
                _ => return false,
            }
        }
    }

    /// The declaration that introduced late binding on `member`'s override
    /// chain: the topmost one that is late bound on its own account. Its
    /// foreign entry is the selector every message send in the chain uses.
    pub fn message_root(&self, member: MemberId) -> MemberId {
        let model = self.model();
        let mut current = member;
        let mut introduced = member;
        loop {
            if self.is_late_bound_here(current) {
                introduced = current;
            }
            let decl = model.member(current);
            match decl.overrides {
                Some(next) if self.graph.is_subclass_of(decl.owner, model.member(next).owner) => {
                    current = next;
                }
                _ => return introduced,
            }
        }
    }

    /// Late bound by the declaration's own modifiers or owner, ignoring
    /// what it overrides.
    fn is_late_bound_here(&self, member: MemberId) -> bool {
        let model = self.model();
        let decl = model.member(member);
        let owner = model.ty(decl.owner);
        decl.is_dynamic()
            || owner.is_foreign()
            || (self.options.implicit_dynamic
                && owner.is_class()
                && !owner.is_final
                && !decl.is_final())
    }

    /// Whether `member`'s entry for `receiver` may be replaced by a subclass
    /// at runtime.
    fn is_overridable(&self, member: &Member, receiver: TypeId, root: MemberId) -> bool {
        let model = self.model();
        let owner = model.ty(member.owner);
        let receiver_ty = model.ty(receiver);
        if !owner.is_class() || owner.is_final || member.is_final() || receiver_ty.is_final {
            return false;
        }
        if let Some(visible) = self.graph.implementation_in(receiver, root) {
            if model.member(visible).is_final() {
                return false;
            }
        }
        if self.options.whole_module
            && !receiver_ty.is_open
            && !self.graph.overridden_below(receiver, root)
        {
            return false;
        }
        true
    }

    fn resolve_requirement(
        &self,
        decl: DeclRef,
        receiver: TypeId,
        site: CallSite,
    ) -> Result<DispatchStrategy, DispatchError> {
        let model = self.model();
        let protocol = model.member(decl.member).owner;

        if receiver == protocol {
            let slot = self
                .requirement_layout(protocol)
                .slot_of(decl.as_native())
                .ok_or_else(|| DispatchError::no_requirement_slot(model, protocol, decl))?;
            return Ok(DispatchStrategy::Table {
                table: TableRef::Witness { protocol },
                root: decl.as_native(),
                slot,
            });
        }

        let witness = self
            .graph
            .conformance_witness(receiver, protocol, decl.member)?;
        if model.member(witness).is_requirement() {
            // A requirement cannot witness itself.
            return Err(DispatchError::missing_witness(
                model,
                receiver,
                protocol,
                decl.member,
            ));
        }
        tracing::trace!(
            requirement = %model.member_path(decl.member),
            witness = %model.member_path(witness),
            "requirement satisfied by witness"
        );
        self.resolve(decl.with_member(witness), receiver, site)
    }

    /// Whether `root` introduces table slots in its owner's layout.
    pub fn occupies_slot(&self, root: MemberId) -> bool {
        let model = self.model();
        let member = model.member(root);
        let owner = model.ty(member.owner);
        owner.is_class()
            && !owner.is_foreign()
            && !owner.is_final
            && !member.is_final()
            && !self.is_late_bound(root)
    }

    /// Slot layout of `ty`'s dispatch table, computed once per class.
    pub fn class_layout(&self, ty: TypeId) -> Rc<SlotLayout> {
        if let Some(layout) = self.layouts.borrow().get(&ty) {
            return Rc::clone(layout);
        }

        // Fill from the topmost uncached ancestor down, without recursion.
        let lineage: Vec<TypeId> = self.graph.lineage(ty).collect();
        let mut parent: Option<Rc<SlotLayout>> = None;
        for &current in lineage.iter().rev() {
            if let Some(cached) = self.layouts.borrow().get(&current) {
                parent = Some(Rc::clone(cached));
                continue;
            }
            let layout = Rc::new(self.compute_layout(current, parent.as_deref()));
            self.layouts.borrow_mut().insert(current, Rc::clone(&layout));
            parent = Some(layout);
        }
        parent.unwrap_or_default()
    }

    fn compute_layout(&self, ty: TypeId, parent: Option<&SlotLayout>) -> SlotLayout {
        let model = self.model();
        let mut layout = parent.map(SlotLayout::inherit).unwrap_or_default();
        for &id in &model.ty(ty).members {
            if self.graph.override_root(id) != id || !self.occupies_slot(id) {
                continue;
            }
            for entry in model.member(id).entries() {
                tracing::trace!(
                    class = model.type_name(ty),
                    entry = %model.describe(entry),
                    slot = layout.len(),
                    "new table slot"
                );
                layout.push(entry);
            }
        }
        layout
    }

    /// Slot layout of a protocol's witness tables: every requirement entry
    /// in declaration order.
    pub fn requirement_layout(&self, protocol: TypeId) -> SlotLayout {
        let model = self.model();
        let mut layout = SlotLayout::default();
        for &id in &model.ty(protocol).members {
            for entry in model.member(id).entries() {
                layout.push(entry);
            }
        }
        layout
    }
}
