mod types;
pub use types::*;

pub mod errors;
pub mod lexer;
pub mod lines;
pub mod macro_api;
pub mod macros;
pub mod pattern;
pub mod preprocessor;

pub use errors::{PreprocessError, PreprocessResult, SyntaxError};
pub use lines::LineAssembler;
pub use macros::{MacroDefinition, MacroTable};
pub use pattern::{LogicalLiterals, Rule, RuleMatch};
pub use preprocessor::{
    Context, DiagnosticSink, DirectoryResolver, IncludeResolver, Preprocessor, PreprocessorConfig,
    WriteSink,
};
