// crates/cmdpp-macros/src/preprocessor/tests/test_diagnostics.rs

use super::{run, syntax_error};
use crate::errors::{PreprocessError, SyntaxError};
use crate::preprocessor::{DiagnosticSink, Preprocessor, PreprocessorConfig, WriteSink};
use crate::types::LogicalLine;
use pretty_assertions::assert_eq;

fn run_collecting(input: &str) -> (Result<(), PreprocessError>, String, Vec<String>) {
    let preprocessor = Preprocessor::new(PreprocessorConfig::default());
    let mut ctx = preprocessor.context();
    let mut out = Vec::new();
    let mut messages: Vec<String> = Vec::new();
    let result = preprocessor.process(&mut ctx, input.as_bytes(), &mut out, &mut messages);
    (result, String::from_utf8(out).unwrap(), messages)
}

#[test]
fn test_stdout_continues() {
    let (result, out, messages) = run_collecting("#stdout building  now\nbody\n");
    assert!(result.is_ok());
    assert_eq!(out, "body\n");
    assert_eq!(messages, vec!["building  now".to_string()]);
}

#[test]
fn test_error_stops_processing() {
    let (result, out, messages) = run_collecting("kept\n#error unsupported target\nlost\n");
    match result {
        Err(PreprocessError::Fatal { line, message }) => {
            assert_eq!(line, 2);
            assert_eq!(message, "unsupported target");
        }
        other => panic!("expected a fatal error, got {other:?}"),
    }
    assert_eq!(out, "kept\n");
    assert_eq!(messages, vec!["unsupported target".to_string()]);
}

#[test]
fn test_error_display() {
    let err = run("#define X\n#error boom\n").unwrap_err();
    assert_eq!(err.to_string(), "Error directive at line 2: boom");
    assert_eq!(err.line(), Some(2));

    let err = PreprocessError::syntax(3, 7, "dust at line tail");
    assert_eq!(err.to_string(), "Syntax error at line 3, column 7: dust at line tail");
}

#[test]
fn test_continuation_reports_last_physical_line() {
    assert_eq!(
        syntax_error("#define X 1\n\n#define X;\n  2\n"),
        (4, SyntaxError::new(9, "redefinition of variable"))
    );
}

#[test]
fn test_write_sink() {
    let mut sink = WriteSink(Vec::new());
    sink.emit("one");
    sink.emit("two");
    assert_eq!(String::from_utf8(sink.0).unwrap(), "one\ntwo\n");
}

#[test]
fn test_process_line_keeps_context_after_error() {
    let preprocessor = Preprocessor::new(PreprocessorConfig::default());
    let mut ctx = preprocessor.context();
    let mut out = Vec::new();
    let lines = ["#define A 1", "#define A 2", "#oops", "A"];
    let errors: Vec<Option<usize>> = lines
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let line = LogicalLine {
                number: i + 1,
                text: text.to_string(),
            };
            preprocessor
                .process_line(&mut ctx, &line, &mut out, &mut ())
                .err()
                .and_then(|e| e.line())
        })
        .collect();
    assert_eq!(errors, vec![None, Some(2), Some(3), None]);
    assert_eq!(String::from_utf8(out).unwrap(), "2\n");
}
