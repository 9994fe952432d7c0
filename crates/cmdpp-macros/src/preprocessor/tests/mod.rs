mod test_define;
mod test_diagnostics;

use super::{Preprocessor, PreprocessorConfig};
use crate::errors::{PreprocessError, SyntaxError};

/// Runs `input` through a fresh preprocessor and returns the output text.
fn run_with(config: PreprocessorConfig, input: &str) -> Result<String, PreprocessError> {
    let preprocessor = Preprocessor::new(config);
    let mut ctx = preprocessor.context();
    let mut out = Vec::new();
    preprocessor.process(&mut ctx, input.as_bytes(), &mut out, &mut ())?;
    Ok(String::from_utf8(out).expect("output should be UTF-8"))
}

fn run(input: &str) -> Result<String, PreprocessError> {
    run_with(PreprocessorConfig::default(), input)
}

/// Expects a syntax error and returns its line and location.
fn syntax_error(input: &str) -> (usize, SyntaxError) {
    match run(input) {
        Err(PreprocessError::Syntax { line, error }) => (line, error),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}
