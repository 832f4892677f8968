//! Dispatch resolution configuration.

/// Knobs that change how much the resolver may assume about the program.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DispatchOptions {
    /// The whole class hierarchy is visible. Non-open classes whose subtree
    /// adds no further override can be called directly instead of through
    /// the table.
    pub whole_module: bool,
    /// Treat every non-final class member as `dynamic`, so that any of them
    /// can be replaced at runtime.
    pub implicit_dynamic: bool,
}

impl DispatchOptions {
    /// Options for whole-module compilation.
    pub fn whole_module() -> Self {
        DispatchOptions {
            whole_module: true,
            ..Self::default()
        }
    }
}
