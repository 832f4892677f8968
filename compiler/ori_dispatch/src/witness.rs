//! Protocol witness tables.
//!
//! One table per (conforming type, protocol) pair, with one entry per
//! requirement entry point in the protocol's declaration order. An entry is
//! either the witness itself, when a caller holding the protocol's view of
//! the receiver can call it as is, or a thunk that adapts the call.

use ori_decl::{DeclRef, TypeId};

use crate::{
    CallSite, Convention, ConventionPair, DispatchError, DispatchStrategy, TableBuilder, Thunk,
    ThunkCall, ThunkId, ThunkKind, ThunkSet,
};

const WITNESS_TO_METHOD: ConventionPair =
    ConventionPair::new(Convention::WitnessMethod, Convention::Method);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Witness {
    /// The witness's native entry, callable without adjustment.
    Direct(DeclRef),
    Thunk(ThunkId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct WitnessEntry {
    pub requirement: DeclRef,
    pub witness: Witness,
}

/// How one type satisfies one protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WitnessTable {
    conforming: TypeId,
    protocol: TypeId,
    entries: Vec<WitnessEntry>,
    thunks: ThunkSet,
}

impl WitnessTable {
    #[inline]
    pub fn conforming_type(&self) -> TypeId {
        self.conforming
    }

    #[inline]
    pub fn protocol(&self) -> TypeId {
        self.protocol
    }

    #[inline]
    pub fn entries(&self) -> &[WitnessEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn witness(&self, requirement: DeclRef) -> Option<Witness> {
        let requirement = requirement.as_native();
        self.entries
            .iter()
            .find(|entry| entry.requirement == requirement)
            .map(|entry| entry.witness)
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

impl TableBuilder<'_> {
    /// The witness table for `ty`'s conformance to `protocol`, declared on
    /// `ty` or inherited.
    pub fn build_witness_table(
        &mut self,
        ty: TypeId,
        protocol: TypeId,
    ) -> Result<WitnessTable, DispatchError> {
        let graph = self.resolver.graph();
        let model = graph.model();
        if !graph.conforms_to(ty, protocol) {
            return Err(DispatchError::missing_conformance(model, ty, protocol));
        }

        let mut thunks = ThunkSet::new();
        let mut entries = Vec::new();
        for &requirement in &model.ty(protocol).members {
            let witness_member = graph.conformance_witness(ty, protocol, requirement)?;
            for entry in model.member(requirement).entries() {
                let witness_decl = entry.with_member(witness_member);
                let strategy = self.resolver.resolve(entry, ty, CallSite::NORMAL)?;
                let witness = self.witness_for(entry, witness_decl, ty, &strategy, &mut thunks);
                tracing::trace!(
                    conforming = model.type_name(ty),
                    requirement = %model.describe(entry),
                    witness = ?witness,
                    "witness table entry"
                );
                entries.push(WitnessEntry {
                    requirement: entry,
                    witness,
                });
            }
        }

        tracing::debug!(
            conforming = model.type_name(ty),
            protocol = model.type_name(protocol),
            entries = entries.len(),
            thunks = thunks.len(),
            "built witness table"
        );
        Ok(WitnessTable {
            conforming: ty,
            protocol,
            entries,
            thunks,
        })
    }

    fn witness_for(
        &self,
        requirement: DeclRef,
        witness: DeclRef,
        ty: TypeId,
        strategy: &DispatchStrategy,
        thunks: &mut ThunkSet,
    ) -> Witness {
        let protocol_witness = |target: DeclRef| {
            self.synth.synthesize(
                ThunkKind::ProtocolWitness,
                requirement,
                target,
                ty,
                WITNESS_TO_METHOD,
            )
        };

        match *strategy {
            DispatchStrategy::ForeignMessage { .. } => {
                let send = self
                    .synth
                    .message_thunk(witness, ty, strategy)
                    .map(|thunk| thunks.intern(thunk));
                let mut thunk = protocol_witness(witness);
                if let Some(send) = send {
                    thunk = thunk.with_call(ThunkCall::Thunk(send));
                }
                Witness::Thunk(thunks.intern(thunk))
            }
            DispatchStrategy::Table { root, slot, .. } => {
                let thunk = protocol_witness(witness).with_call(ThunkCall::ClassMethod { root, slot });
                Witness::Thunk(thunks.intern(thunk))
            }
            DispatchStrategy::Direct { target } => {
                let thunk = protocol_witness(target);
                if thunk.body.receiver_upcast.is_none() && thunk.body.result_downcast.is_none() {
                    Witness::Direct(target)
                } else {
                    Witness::Thunk(thunks.intern(thunk))
                }
            }
        }
    }
}
