// crates/cmdpp-macros/src/preprocessor/tests/test_define.rs

use super::{run, run_with, syntax_error};
use crate::errors::SyntaxError;
use crate::preprocessor::PreprocessorConfig;
use pretty_assertions::assert_eq;

#[test]
fn test_object_macro() {
    assert_eq!(run("#define MAX 100\nx := MAX\n").unwrap(), "x := 100\n");
}

#[test]
fn test_function_macro() {
    assert_eq!(
        run("#define ADD(a,b) a+b\ny := ADD(1, 2)\n").unwrap(),
        "y := 1+2\n"
    );
}

#[test]
fn test_function_macro_with_wrong_arity_passes_through() {
    assert_eq!(run("#define ADD(a,b) a+b\nADD(1)\n").unwrap(), "ADD(1)\n");
    assert_eq!(run("#define ADD(a,b) a+b\nADD\n").unwrap(), "ADD\n");
}

#[test]
fn test_expansion_is_rescanned() {
    let input = "#define ONE 1\n#define INC(x) x + ONE\nv := INC(ONE)\n";
    assert_eq!(run(input).unwrap(), "v := 1 + 1\n");
}

#[test]
fn test_chain_reaches_fixed_point() {
    assert_eq!(run("#define A B\n#define B C\nA\n").unwrap(), "C\n");
}

#[test]
fn test_undef() {
    assert_eq!(run("#define X 1\n#undef X\nX\n").unwrap(), "X\n");
    assert_eq!(run("#undef NEVER\nok\n").unwrap(), "ok\n");
}

#[test]
fn test_only_whole_identifiers_expand() {
    assert_eq!(run("#define X 1\nXY X_1 X\n").unwrap(), "XY X_1 1\n");
}

#[test]
fn test_strings_are_not_expanded() {
    assert_eq!(
        run("#define X 1\nprint(\"X\", X)\n").unwrap(),
        "print(\"X\", 1)\n"
    );
}

#[test]
fn test_function_parameters_are_replaced_inside_strings() {
    assert_eq!(
        run("#define SHOW(x) print(\"x=\", x)\nSHOW(1)\n").unwrap(),
        "print(\"1=\", 1)\n"
    );
}

#[test]
fn test_redefinition_is_reported_at_the_name() {
    assert_eq!(
        syntax_error("#define X 1\n#define X 2\n"),
        (2, SyntaxError::new(9, "redefinition of variable"))
    );
}

#[test]
fn test_definition_errors_are_located_in_the_line() {
    assert_eq!(
        syntax_error("  #define F(a, a) a\n"),
        (
            1,
            SyntaxError::new(16, "duplicate parameter name [a] in the function definition")
        )
    );
    assert_eq!(
        syntax_error("#define\n"),
        (1, SyntaxError::new(8, "missing macro name"))
    );
}

#[test]
fn test_self_reference_is_bounded() {
    let (line, error) = syntax_error("#define A A\nA\n");
    assert_eq!(line, 2);
    assert_eq!(error.message, "macro expansion is too deep");
}

#[test]
fn test_rewrite_limit_is_configurable() {
    let config = PreprocessorConfig {
        max_rewrites: 2,
        ..Default::default()
    };
    assert_eq!(
        run_with(config.clone(), "#define A B\n#define B C\nA\n").unwrap(),
        "C\n"
    );
    assert!(run_with(config, "#define A B\n#define B C\n#define C D\nA\n").is_err());
}

#[test]
fn test_limit_applies_per_expansion_not_per_line() {
    let line = "FOO ".repeat(1100);
    let expected = format!("{}\n", "1 ".repeat(1100).trim_end());
    assert_eq!(run(&format!("#define FOO 1\n{line}\n")).unwrap(), expected);

    let config = PreprocessorConfig {
        max_rewrites: 2,
        ..Default::default()
    };
    assert_eq!(
        run_with(config, "#define A B\n#define B C\nA A A\n").unwrap(),
        "C C C\n"
    );
}

#[test]
fn test_predefined_macros() {
    let config = PreprocessorConfig {
        defines: vec![("MODE".into(), "fast".into())],
        ..Default::default()
    };
    assert_eq!(
        run_with(config, "#ifdef MODE\nrun(MODE)\n#end\n").unwrap(),
        "run(fast)\n"
    );
}
