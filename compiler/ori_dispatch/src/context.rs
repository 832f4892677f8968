//! Whole-program entry point.
//!
//! Owns the inheritance graph for a frozen model and hands out resolvers
//! and table builders over it. Batch construction of every table runs on
//! the rayon pool, one [`TableBuilder`] per worker.

use std::sync::Arc;

use ori_decl::{DeclModel, DeclRef, MemberId, TypeId};
use rayon::prelude::*;

use crate::{
    CallSite, DispatchError, DispatchOptions, DispatchStrategy, DispatchTable, InheritanceGraph,
    ReplacementMap, Resolver, TableBuilder, WitnessTable,
};

/// A model, its inheritance graph, and the options to resolve under.
pub struct DispatchContext<'m> {
    graph: InheritanceGraph<'m>,
    options: DispatchOptions,
}

impl<'m> DispatchContext<'m> {
    /// Build the inheritance graph. Fails on cyclic inheritance.
    pub fn new(model: &'m DeclModel, options: DispatchOptions) -> Result<Self, DispatchError> {
        Ok(DispatchContext {
            graph: InheritanceGraph::build(model)?,
            options,
        })
    }

    #[inline]
    pub fn model(&self) -> &'m DeclModel {
        self.graph.model()
    }

    #[inline]
    pub fn graph(&self) -> &InheritanceGraph<'m> {
        &self.graph
    }

    #[inline]
    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// A fresh resolver. Keep it around while resolving many call sites so
    /// its layout cache is reused.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.graph, self.options)
    }

    pub fn table_builder(&self) -> TableBuilder<'_> {
        TableBuilder::new(&self.graph, self.options)
    }

    /// One-off resolution of a single entry point.
    pub fn resolve(
        &self,
        decl: DeclRef,
        receiver: TypeId,
        site: CallSite,
    ) -> Result<DispatchStrategy, DispatchError> {
        self.resolver().resolve(decl, receiver, site)
    }

    pub fn resolve_member(
        &self,
        member: MemberId,
        receiver: TypeId,
        site: CallSite,
    ) -> Result<DispatchStrategy, DispatchError> {
        self.resolver().resolve_member(member, receiver, site)
    }

    pub fn replacements(&self) -> Result<ReplacementMap, DispatchError> {
        ReplacementMap::build(&self.graph, self.options)
    }

    /// Dispatch tables for every class, in declaration order.
    ///
    /// Classes are independent once layouts are known, so they are built in
    /// parallel. Each worker owns a builder and its layout cache.
    pub fn build_all_tables(&self) -> Result<Vec<Arc<DispatchTable>>, DispatchError> {
        let classes: Vec<TypeId> = self
            .model()
            .types()
            .filter(|ty| ty.is_class())
            .map(|ty| ty.id)
            .collect();
        tracing::debug!(classes = classes.len(), "building dispatch tables");

        classes
            .par_iter()
            .map_init(
                || self.table_builder(),
                |builder, &ty| builder.build_table(ty),
            )
            .collect()
    }

    /// Witness tables for every conformance a type declares, in declaration
    /// order of types and then conformances.
    pub fn build_all_witness_tables(&self) -> Result<Vec<WitnessTable>, DispatchError> {
        let pairs: Vec<(TypeId, TypeId)> = self
            .model()
            .types()
            .flat_map(|ty| ty.conformances.iter().map(move |c| (ty.id, c.protocol)))
            .collect();
        tracing::debug!(conformances = pairs.len(), "building witness tables");

        pairs
            .par_iter()
            .map_init(
                || self.table_builder(),
                |builder, &(ty, protocol)| builder.build_witness_table(ty, protocol),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use ori_decl::{DeclModelBuilder, MemberSpec};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_helpers::{animals, foo_bar};

    #[test]
    fn parallel_tables_match_sequential_ones() {
        let fx = foo_bar();
        let ctx = DispatchContext::new(&fx.model, DispatchOptions::default()).unwrap();

        let parallel = ctx.build_all_tables().unwrap();
        let mut builder = ctx.table_builder();
        let sequential = vec![
            builder.build_table(fx.foo).unwrap(),
            builder.build_table(fx.bar).unwrap(),
        ];

        assert_eq!(
            parallel.iter().map(|t| t.class()).collect::<Vec<_>>(),
            vec![fx.foo, fx.bar]
        );
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn witness_tables_for_declared_conformances() {
        let fx = animals();
        let ctx = DispatchContext::new(&fx.model, DispatchOptions::default()).unwrap();

        let tables = ctx.build_all_witness_tables().unwrap();
        assert_eq!(
            tables
                .iter()
                .map(|t| (t.conforming_type(), t.protocol()))
                .collect::<Vec<_>>(),
            vec![(fx.animal, fx.creatable), (fx.cat, fx.creatable)]
        );
    }

    #[test]
    fn cyclic_model_is_rejected_up_front() {
        let mut b = DeclModelBuilder::new();
        let a = b.class("A");
        let c = b.subclass("C", a);
        b.set_superclass(a, c);
        b.add_member(a, MemberSpec::method("run"));
        let model = b.finish();

        let err = DispatchContext::new(&model, DispatchOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.code(), "E9101");
    }

    #[test]
    fn one_off_resolution() {
        let fx = foo_bar();
        let ctx = DispatchContext::new(&fx.model, DispatchOptions::default()).unwrap();

        assert!(ctx
            .resolve_member(fx.dynamic_method, fx.bar, CallSite::SUPER)
            .unwrap()
            .is_foreign_message());
        assert!(ctx.replacements().unwrap().is_empty());
    }
}
