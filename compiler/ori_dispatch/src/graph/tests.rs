#![allow(clippy::unwrap_used)]

use ori_decl::{DeclModelBuilder, MemberFlags, MemberSpec};
use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{animals, foo_bar, graph};

#[test]
fn ancestors_are_nearest_first() {
    let mut b = DeclModelBuilder::new();
    let a = b.class("A");
    let c = b.class("C");
    let bb = b.subclass("B", a);
    b.set_superclass(c, bb);
    let model = b.finish();
    let g = graph(&model);

    assert_eq!(g.ancestors(c), &[bb, a]);
    assert_eq!(g.ancestors(a), &[] as &[TypeId]);
    assert_eq!(g.lineage(c).collect::<Vec<_>>(), vec![c, bb, a]);
    assert_eq!(g.superclass(c), Some(bb));
    assert!(g.is_subclass_of(c, a));
    assert!(!g.is_subclass_of(a, a));
}

#[test]
fn descendants_are_breadth_first() {
    let mut b = DeclModelBuilder::new();
    let root = b.class("Root");
    let left = b.subclass("Left", root);
    let right = b.subclass("Right", root);
    let leaf = b.subclass("Leaf", left);
    let model = b.finish();
    let g = graph(&model);

    assert_eq!(g.descendants(root), vec![left, right, leaf]);
    assert!(g.has_subclasses(left));
    assert!(!g.has_subclasses(leaf));
    assert_eq!(g.direct_subclasses(root), &[left, right]);
}

#[test]
fn cycle_is_rejected() {
    let mut b = DeclModelBuilder::new();
    let a = b.class("A");
    let c = b.subclass("C", a);
    b.set_superclass(a, c);
    let model = b.finish();

    let err = InheritanceGraph::build(&model).unwrap_err();
    assert_eq!(err.code(), "E9101");
    assert!(matches!(err, DispatchError::CyclicInheritance { .. }));
}

#[test]
fn self_superclass_is_a_cycle() {
    let mut b = DeclModelBuilder::new();
    let a = b.class("A");
    b.set_superclass(a, a);
    let model = b.finish();

    assert!(InheritanceGraph::build(&model).is_err());
}

#[test]
fn override_root_and_implementation() {
    let fx = foo_bar();
    let g = graph(&fx.model);

    assert_eq!(g.override_root(fx.bar_native_method), fx.native_method);
    assert_eq!(g.override_root(fx.native_method), fx.native_method);
    assert_eq!(g.implementation_in(fx.bar, fx.native_method), Some(fx.bar_native_method));
    assert_eq!(g.implementation_in(fx.foo, fx.native_method), Some(fx.native_method));
    assert_eq!(g.implementation_in(fx.bar, fx.objc_method), Some(fx.objc_method));
    assert_eq!(g.overriding_member(fx.bar, fx.objc_method), None);
    assert!(g.overridden_below(fx.foo, fx.native_method));
    assert!(!g.overridden_below(fx.foo, fx.objc_method));
}

#[test]
fn overridden_member_follows_declared_link() {
    let fx = foo_bar();
    let g = graph(&fx.model);

    assert_eq!(
        g.overridden_member(fx.bar, fx.bar_dynamic_method).unwrap(),
        Some(fx.dynamic_method)
    );
    assert_eq!(g.overridden_member(fx.foo, fx.native_method).unwrap(), None);
}

#[test]
fn undeclared_shadowing_is_not_an_override() {
    let mut b = DeclModelBuilder::new();
    let base = b.class("Base");
    b.add_member(base, MemberSpec::method("run"));
    let derived = b.subclass("Derived", base);
    let fresh = b.add_member(derived, MemberSpec::method("run"));
    let model = b.finish();
    let g = graph(&model);

    assert_eq!(g.overridden_member(derived, fresh).unwrap(), None);
}

#[test]
fn two_matching_candidates_are_ambiguous() {
    let mut b = DeclModelBuilder::new();
    let base = b.class("Base");
    let first = b.add_member(base, MemberSpec::method("run"));
    b.add_member(base, MemberSpec::method("run"));
    let derived = b.subclass("Derived", base);
    let over = b.add_member(derived, MemberSpec::method("run").overriding(first));
    let model = b.finish();
    let g = graph(&model);

    let err = g.overridden_member(derived, over).unwrap_err();
    assert_eq!(err.code(), "E9102");
    match err {
        DispatchError::AmbiguousOverride { name, candidates, .. } => {
            assert_eq!(name, "Derived.run");
            assert_eq!(candidates, vec!["Base.run".to_owned(), "Base.run".to_owned()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn declared_link_must_match_nearest_candidate() {
    let mut b = DeclModelBuilder::new();
    let base = b.class("Base");
    let far = b.add_member(base, MemberSpec::method("run"));
    let mid = b.subclass("Mid", base);
    b.add_member(mid, MemberSpec::method("run").overriding(far));
    let leaf = b.subclass("Leaf", mid);
    let skip = b.add_member(leaf, MemberSpec::method("run").overriding(far));
    let model = b.finish();
    let g = graph(&model);

    assert!(matches!(
        g.overridden_member(leaf, skip),
        Err(DispatchError::AmbiguousOverride { .. })
    ));
}

#[test]
fn static_and_instance_members_do_not_override_each_other() {
    let mut b = DeclModelBuilder::new();
    let base = b.class("Base");
    b.add_member(base, MemberSpec::method("make").flags(MemberFlags::STATIC));
    let derived = b.subclass("Derived", base);
    let instance = b.add_member(derived, MemberSpec::method("make"));
    let model = b.finish();
    let g = graph(&model);

    assert_eq!(g.overridden_member(derived, instance).unwrap(), None);
}

#[test]
fn conformance_is_inherited() {
    let fx = animals();
    let g = graph(&fx.model);

    let (declared_on, conformance) = g.conformance(fx.dog, fx.creatable).unwrap();
    assert_eq!(declared_on, fx.animal);
    assert_eq!(conformance.witness(fx.req_init), Some(fx.animal_init));
    assert!(g.conforms_to(fx.dog, fx.creatable));
    assert_eq!(
        g.conformance_witness(fx.dog, fx.creatable, fx.req_create).unwrap(),
        fx.animal_create
    );
}

#[test]
fn missing_conformance_and_witness() {
    let mut b = DeclModelBuilder::new();
    let proto = b.protocol("Proto");
    let first = b.add_member(proto, MemberSpec::method("first"));
    let second = b.add_member(proto, MemberSpec::method("second"));
    let partial = b.class("Partial");
    let impl_first = b.add_member(partial, MemberSpec::method("first"));
    b.add_conformance(partial, proto, &[(first, impl_first)]);
    let stranger = b.class("Stranger");
    let model = b.finish();
    let g = graph(&model);

    let err = g.conformance_witness(stranger, proto, first).unwrap_err();
    assert_eq!(err.code(), "E9104");
    let err = g.conformance_witness(partial, proto, second).unwrap_err();
    assert_eq!(
        err.to_string(),
        "`Partial` conformance to `Proto` has no witness for `Proto.second`"
    );
}
