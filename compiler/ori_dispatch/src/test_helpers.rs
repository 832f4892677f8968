//! Shared declaration fixtures for dispatch unit tests.

#![allow(clippy::unwrap_used)]

use ori_decl::{DeclModel, DeclModelBuilder, MemberFlags, MemberId, MemberSpec, TypeId, TypeOrigin};

use crate::InheritanceGraph;

const DYNAMIC_EXPOSED: MemberFlags = MemberFlags::DYNAMIC.union(MemberFlags::FOREIGN_EXPOSED);

pub(crate) fn graph(model: &DeclModel) -> InheritanceGraph<'_> {
    InheritanceGraph::build(model).unwrap()
}

/// `Foo: Proto` with a mix of native, dynamic and foreign-exposed members,
/// and `Bar: Foo` overriding most of them.
///
/// ```text
/// protocol Proto { nativeMethod, nativeProp {get set}, dynamicMethod, dynamicProp {get set} }
/// class Foo: Proto {
///     nativeMethod, nativeProp, dynamic dynamicMethod, dynamic dynamicProp,
///     exposed objcMethod, overriddenByDynamic, final finalMethod
/// }
/// class Bar: Foo {
///     override nativeMethod, override nativeProp, override dynamicMethod,
///     override dynamicProp, override dynamic overriddenByDynamic
/// }
/// ```
pub(crate) struct FooBar {
    pub model: DeclModel,
    pub proto: TypeId,
    pub foo: TypeId,
    pub bar: TypeId,

    pub req_native_method: MemberId,
    pub req_native_prop: MemberId,
    pub req_dynamic_method: MemberId,
    pub req_dynamic_prop: MemberId,

    pub native_method: MemberId,
    pub native_prop: MemberId,
    pub dynamic_method: MemberId,
    pub dynamic_prop: MemberId,
    pub objc_method: MemberId,
    pub overridden_by_dynamic: MemberId,
    pub final_method: MemberId,

    pub bar_native_method: MemberId,
    pub bar_native_prop: MemberId,
    pub bar_dynamic_method: MemberId,
    pub bar_dynamic_prop: MemberId,
    pub bar_overridden_by_dynamic: MemberId,
}

pub(crate) fn foo_bar() -> FooBar {
    let mut b = DeclModelBuilder::new();
    let proto = b.protocol("Proto");
    let req_native_method = b.add_member(proto, MemberSpec::method("nativeMethod"));
    let req_native_prop = b.add_member(proto, MemberSpec::property("nativeProp", true));
    let req_dynamic_method = b.add_member(proto, MemberSpec::method("dynamicMethod"));
    let req_dynamic_prop = b.add_member(proto, MemberSpec::property("dynamicProp", true));

    let foo = b.class("Foo");
    let native_method = b.add_member(foo, MemberSpec::method("nativeMethod"));
    let native_prop = b.add_member(foo, MemberSpec::property("nativeProp", true));
    let dynamic_method = b.add_member(
        foo,
        MemberSpec::method("dynamicMethod").flags(DYNAMIC_EXPOSED),
    );
    let dynamic_prop = b.add_member(
        foo,
        MemberSpec::property("dynamicProp", true).flags(DYNAMIC_EXPOSED),
    );
    let objc_method = b.add_member(
        foo,
        MemberSpec::method("objcMethod").flags(MemberFlags::FOREIGN_EXPOSED),
    );
    let overridden_by_dynamic = b.add_member(foo, MemberSpec::method("overriddenByDynamic"));
    let final_method = b.add_member(
        foo,
        MemberSpec::method("finalMethod").flags(MemberFlags::FINAL),
    );
    b.add_conformance(
        foo,
        proto,
        &[
            (req_native_method, native_method),
            (req_native_prop, native_prop),
            (req_dynamic_method, dynamic_method),
            (req_dynamic_prop, dynamic_prop),
        ],
    );

    let bar = b.subclass("Bar", foo);
    let bar_native_method = b.add_member(
        bar,
        MemberSpec::method("nativeMethod").overriding(native_method),
    );
    let bar_native_prop = b.add_member(
        bar,
        MemberSpec::property("nativeProp", true).overriding(native_prop),
    );
    let bar_dynamic_method = b.add_member(
        bar,
        MemberSpec::method("dynamicMethod").overriding(dynamic_method),
    );
    let bar_dynamic_prop = b.add_member(
        bar,
        MemberSpec::property("dynamicProp", true).overriding(dynamic_prop),
    );
    let bar_overridden_by_dynamic = b.add_member(
        bar,
        MemberSpec::method("overriddenByDynamic")
            .flags(DYNAMIC_EXPOSED)
            .overriding(overridden_by_dynamic),
    );

    FooBar {
        model: b.finish(),
        proto,
        foo,
        bar,
        req_native_method,
        req_native_prop,
        req_dynamic_method,
        req_dynamic_prop,
        native_method,
        native_prop,
        dynamic_method,
        dynamic_prop,
        objc_method,
        overridden_by_dynamic,
        final_method,
        bar_native_method,
        bar_native_prop,
        bar_dynamic_method,
        bar_dynamic_prop,
        bar_overridden_by_dynamic,
    }
}

/// `Animal: Creatable` with a required initializer and a `Self`-returning
/// class method; `Dog: Animal` inherits the conformance without overriding
/// anything. `Cat` is a final class conforming on its own.
pub(crate) struct Animals {
    pub model: DeclModel,
    pub creatable: TypeId,
    pub animal: TypeId,
    pub dog: TypeId,
    pub cat: TypeId,
    pub req_init: MemberId,
    pub req_create: MemberId,
    pub animal_init: MemberId,
    pub animal_create: MemberId,
    pub cat_init: MemberId,
    pub cat_create: MemberId,
}

pub(crate) fn animals() -> Animals {
    let mut b = DeclModelBuilder::new();
    let creatable = b.protocol("Creatable");
    let req_init = b.add_member(creatable, MemberSpec::initializer("init(name:)"));
    let req_create = b.add_member(
        creatable,
        MemberSpec::method("create").flags(MemberFlags::STATIC | MemberFlags::RETURNS_SELF),
    );

    let animal = b.class("Animal");
    let animal_init = b.add_member(animal, MemberSpec::initializer("init(name:)"));
    let animal_create = b.add_member(
        animal,
        MemberSpec::method("create").flags(MemberFlags::STATIC | MemberFlags::RETURNS_SELF),
    );
    b.add_conformance(
        animal,
        creatable,
        &[(req_init, animal_init), (req_create, animal_create)],
    );
    let dog = b.subclass("Dog", animal);

    let cat = b.class("Cat");
    b.set_final(cat);
    let cat_init = b.add_member(cat, MemberSpec::initializer("init(name:)"));
    let cat_create = b.add_member(
        cat,
        MemberSpec::method("create").flags(MemberFlags::STATIC | MemberFlags::RETURNS_SELF),
    );
    b.add_conformance(
        cat,
        creatable,
        &[(req_init, cat_init), (req_create, cat_create)],
    );

    Animals {
        model: b.finish(),
        creatable,
        animal,
        dog,
        cat,
        req_init,
        req_create,
        animal_init,
        animal_create,
        cat_init,
        cat_create,
    }
}

/// A class imported from the foreign runtime and a native subclass that
/// overrides one of its methods without saying `dynamic`.
pub(crate) struct Imported {
    pub model: DeclModel,
    pub base: TypeId,
    pub widget: TypeId,
    pub base_describe: MemberId,
    pub widget_describe: MemberId,
    pub widget_layout: MemberId,
}

pub(crate) fn imported() -> Imported {
    let mut b = DeclModelBuilder::new();
    let base = b.class("NSView");
    b.set_origin(base, TypeOrigin::Foreign);
    let base_describe = b.add_member(base, MemberSpec::method("describe"));

    let widget = b.subclass("Widget", base);
    let widget_describe = b.add_member(
        widget,
        MemberSpec::method("describe").overriding(base_describe),
    );
    let widget_layout = b.add_member(widget, MemberSpec::method("layout"));

    Imported {
        model: b.finish(),
        base,
        widget,
        base_describe,
        widget_describe,
        widget_layout,
    }
}

/// A plain root made late bound halfway down, then closed off:
///
/// ```text
/// protocol Runnable { run }
/// class Base: Runnable { run }
/// class Mid: Base { override dynamic run }
/// class Leaf: Mid { override final run }
/// ```
pub(crate) struct LateOverride {
    pub model: DeclModel,
    pub runnable: TypeId,
    pub base: TypeId,
    pub mid: TypeId,
    pub leaf: TypeId,
    pub req_run: MemberId,
    pub base_run: MemberId,
    pub mid_run: MemberId,
    pub leaf_run: MemberId,
}

pub(crate) fn late_override() -> LateOverride {
    let mut b = DeclModelBuilder::new();
    let runnable = b.protocol("Runnable");
    let req_run = b.add_member(runnable, MemberSpec::method("run"));

    let base = b.class("Base");
    let base_run = b.add_member(base, MemberSpec::method("run"));
    b.add_conformance(base, runnable, &[(req_run, base_run)]);

    let mid = b.subclass("Mid", base);
    let mid_run = b.add_member(
        mid,
        MemberSpec::method("run").flags(MemberFlags::DYNAMIC).overriding(base_run),
    );
    let leaf = b.subclass("Leaf", mid);
    let leaf_run = b.add_member(
        leaf,
        MemberSpec::method("run").flags(MemberFlags::FINAL).overriding(mid_run),
    );

    LateOverride {
        model: b.finish(),
        runnable,
        base,
        mid,
        leaf,
        req_run,
        base_run,
        mid_run,
        leaf_run,
    }
}
