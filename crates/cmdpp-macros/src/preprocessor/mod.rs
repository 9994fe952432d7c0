// crates/cmdpp-macros/src/preprocessor/mod.rs

// Directive dispatch, conditional state, rule registries and include recursion.

mod core;
mod diagnostics;
mod include;
mod state;

#[cfg(test)]
mod tests;

pub use self::core::Preprocessor;
pub use diagnostics::{DiagnosticSink, WriteSink};
pub use include::{include_target, DirectoryResolver, IncludeResolver};
pub use state::{ConditionalState, Context, PreprocessorConfig, RuleRegistry, MAX_NESTING};
