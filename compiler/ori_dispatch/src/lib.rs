//! Method dispatch resolution for the Ori compiler.
//!
//! Decides, for every call to a member of a class or protocol, how the call
//! reaches its implementation:
//!
//! - **Direct** ([`DispatchStrategy::Direct`]): a fixed call, when the
//!   target cannot be overridden or replaced.
//! - **Table** ([`DispatchStrategy::Table`]): an indirect call through a
//!   slot of the receiver's class table or a protocol witness table.
//! - **Foreign message** ([`DispatchStrategy::ForeignMessage`]): a runtime
//!   message send, for `dynamic` members and members of foreign classes.
//!
//! Alongside the decisions it builds the per-class [`DispatchTable`]s and
//! per-conformance [`WitnessTable`]s code generation emits, and the
//! [`Thunk`]s that bridge conventions between them.
//!
//! # Pipeline
//!
//! 1. [`InheritanceGraph::build`] checks the model for cycles and caches
//!    every type's ancestor chain.
//! 2. [`Resolver`] answers per-call-site questions.
//! 3. [`TableBuilder`] builds tables using the resolver's slot layouts, so
//!    slot numbers handed to call sites always agree with the tables.
//! 4. [`DispatchContext`] ties these together and builds every table in
//!    parallel.
//!
//! # Late binding is inherited
//!
//! Once a member in an override chain is `dynamic`, every override below it
//! is message dispatched too, whatever modifiers it carries. Such members
//! never receive table slots at any depth.
//!
//! # Crate Dependencies
//!
//! Depends only on `ori_decl` for the declaration model. Nothing here knows
//! about syntax or code generation.

mod context;
mod error;
mod graph;
mod layout;
mod options;
mod replace;
mod resolve;
mod strategy;
mod table;
mod thunk;
mod witness;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::DispatchContext;
pub use error::DispatchError;
pub use graph::InheritanceGraph;
pub use layout::SlotLayout;
pub use options::DispatchOptions;
pub use replace::ReplacementMap;
pub use resolve::Resolver;
pub use strategy::{CallSite, DispatchKind, DispatchStrategy, TableRef};
pub use table::{DispatchTable, SlotImpl, TableBuilder, TableSlot};
pub use thunk::{
    Cast, Convention, ConventionPair, Thunk, ThunkBody, ThunkCall, ThunkId, ThunkKind, ThunkSet,
    ThunkSynthesizer,
};
pub use witness::{Witness, WitnessEntry, WitnessTable};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=ori_dispatch=debug`,
/// or `=trace` for per-slot detail.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
