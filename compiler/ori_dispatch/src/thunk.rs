//! Thunk synthesis.
//!
//! A thunk forwards a call from one entry point to another, bridging a
//! calling-convention or dispatch-strategy gap. Synthesis is a pure function
//! of its request: equal requests produce structurally equal thunks, and
//! [`ThunkSet`] interns them so a table never holds two copies.

use ori_decl::{DeclRef, EntryKind, TypeId};
use rustc_hash::FxHashMap;

use crate::{DispatchStrategy, InheritanceGraph};

/// Calling convention of one side of a thunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Convention {
    /// Native method call.
    Method,
    /// Called through a protocol witness table.
    WitnessMethod,
    /// Foreign runtime message send.
    ForeignMethod,
}

/// `caller → callee` conventions of a thunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ConventionPair {
    pub caller: Convention,
    pub callee: Convention,
}

impl ConventionPair {
    #[inline]
    pub const fn new(caller: Convention, callee: Convention) -> Self {
        Self { caller, callee }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ThunkKind {
    /// Satisfies a protocol requirement.
    ProtocolWitness,
    /// Reaches a late-bound member by message send.
    DynamicDispatch,
    /// Exposes a native implementation to the foreign runtime.
    ForeignEntry,
    /// Fills an inherited table slot with a differently-typed override.
    Override,
    /// Message send that starts lookup at the superclass.
    SuperMessage,
}

/// Index of a thunk within its owning [`ThunkSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ThunkId(u32);

impl ThunkId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A reference cast inserted by a thunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Cast {
    pub from: TypeId,
    pub to: TypeId,
}

/// The call a thunk body makes after adjusting its receiver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ThunkCall {
    Direct(DeclRef),
    /// Load the implementation from a class table slot.
    ClassMethod { root: DeclRef, slot: u32 },
    /// Message send. `volatile` keeps optimizers from treating the call as
    /// inlinable or free of side effects.
    ForeignMessage {
        selector: DeclRef,
        is_super: bool,
        volatile: bool,
    },
    /// Forward to another thunk of the same table.
    Thunk(ThunkId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ThunkBody {
    /// Upcast of the incoming receiver to the target's owner.
    pub receiver_upcast: Option<Cast>,
    /// Downcast of a `Self` result back to the incoming receiver type.
    pub result_downcast: Option<Cast>,
    /// Receiver is a metatype (static members and initializers).
    pub metatype_receiver: bool,
    /// Failure from the callee is propagated unchanged.
    pub forwards_failure: bool,
    pub call: ThunkCall,
}

/// A synthesized forwarding routine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Thunk {
    pub kind: ThunkKind,
    pub source: DeclRef,
    pub target: DeclRef,
    pub conventions: ConventionPair,
    pub body: ThunkBody,
}

impl Thunk {
    /// Same thunk, but reaching the target through `call`.
    #[must_use]
    pub fn with_call(mut self, call: ThunkCall) -> Self {
        self.body.call = call;
        self
    }

    /// The call can be observed by optimizers only as an opaque send.
    pub fn is_volatile(&self) -> bool {
        matches!(
            self.body.call,
            ThunkCall::ForeignMessage { volatile: true, .. }
        )
    }
}

/// Builds thunk bodies from a model's type relationships.
#[derive(Copy, Clone)]
pub struct ThunkSynthesizer<'a> {
    graph: &'a InheritanceGraph<'a>,
}

impl<'a> ThunkSynthesizer<'a> {
    pub fn new(graph: &'a InheritanceGraph<'a>) -> Self {
        Self { graph }
    }

    /// Synthesize a thunk forwarding `source` to `target`.
    ///
    /// `self_type` is the static type of the receiver entering the thunk.
    /// The body upcasts it when the target is declared on an ancestor,
    /// downcasts a `Self` result in that case, forwards arguments and
    /// failure unchanged, and marks calls into the foreign convention as
    /// volatile message sends.
    pub fn synthesize(
        &self,
        kind: ThunkKind,
        source: DeclRef,
        target: DeclRef,
        self_type: TypeId,
        conventions: ConventionPair,
    ) -> Thunk {
        let model = self.graph.model();
        let source_member = model.member(source.member);
        let target_member = model.member(target.member);
        let target_owner = target_member.owner;

        let receiver_upcast = (self_type != target_owner
            && self.graph.is_subclass_of(self_type, target_owner))
        .then_some(Cast {
            from: self_type,
            to: target_owner,
        });
        let result_downcast = receiver_upcast
            .filter(|_| target_member.returns_self())
            .map(|up| Cast {
                from: up.to,
                to: up.from,
            });

        let call = match conventions.callee {
            Convention::ForeignMethod => ThunkCall::ForeignMessage {
                selector: target.as_foreign(),
                is_super: kind == ThunkKind::SuperMessage,
                volatile: true,
            },
            Convention::Method | Convention::WitnessMethod => ThunkCall::Direct(target),
        };

        let thunk = Thunk {
            kind,
            source,
            target,
            conventions,
            body: ThunkBody {
                receiver_upcast,
                result_downcast,
                metatype_receiver: target_member.is_static()
                    || target.entry == EntryKind::Initializer,
                forwards_failure: source_member.throws() || target_member.throws(),
                call,
            },
        };
        tracing::trace!(
            ?kind,
            source = %model.describe(source),
            target = %model.describe(target),
            "synthesized thunk"
        );
        thunk
    }
}

impl ThunkSynthesizer<'_> {
    /// The thunk a call site resolved to message dispatch goes through.
    ///
    /// Targets the implementation bound at compile time and sends the
    /// strategy's selector; a super call yields a [`ThunkKind::SuperMessage`].
    /// Returns `None` for strategies that need no send.
    pub fn message_thunk(
        &self,
        source: DeclRef,
        receiver: TypeId,
        strategy: &DispatchStrategy,
    ) -> Option<Thunk> {
        let DispatchStrategy::ForeignMessage {
            selector,
            bound,
            is_super,
            ..
        } = *strategy
        else {
            return None;
        };
        let kind = if is_super {
            ThunkKind::SuperMessage
        } else {
            ThunkKind::DynamicDispatch
        };
        let thunk = self
            .synthesize(
                kind,
                source.as_native(),
                selector.with_member(bound),
                receiver,
                ConventionPair::new(Convention::Method, Convention::ForeignMethod),
            )
            .with_call(ThunkCall::ForeignMessage {
                selector,
                is_super,
                volatile: true,
            });
        Some(thunk)
    }
}

/// Interned thunks owned by one table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThunkSet {
    thunks: Vec<Thunk>,
    index: FxHashMap<Thunk, ThunkId>,
}

impl ThunkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `thunk`, or return the id of its structural twin.
    pub fn intern(&mut self, thunk: Thunk) -> ThunkId {
        if let Some(&id) = self.index.get(&thunk) {
            return id;
        }
        let id = ThunkId(u32::try_from(self.thunks.len()).unwrap_or(u32::MAX));
        self.thunks.push(thunk);
        self.index.insert(thunk, id);
        id
    }

    /// # Panics
    /// Panics if `id` came from a different set.
    #[inline]
    pub fn get(&self, id: ThunkId) -> &Thunk {
        &self.thunks[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ThunkId, &Thunk)> {
        self.thunks
            .iter()
            .enumerate()
            .map(|(i, thunk)| (ThunkId(u32::try_from(i).unwrap_or(u32::MAX)), thunk))
    }

    pub fn len(&self) -> usize {
        self.thunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thunks.is_empty()
    }
}
