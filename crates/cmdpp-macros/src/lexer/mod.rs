// crates/cmdpp-macros/src/lexer/mod.rs

//! Scanning primitives shared by the line rewriter, the rule compiler and the matcher.
//!
//! Every `skip_*` function takes a character slice and a start index and returns the index just
//! past whatever it skipped, so callers can slice the input without copying. The balanced
//! variants return `None` when a bracket or quote is left open.


/// Returns true if `c` can start an identifier.
pub fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Returns true if `c` can continue an identifier.
pub fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Returns true if `c` separates tokens.
pub fn is_blank(c: char) -> bool {
    c.is_whitespace()
}

pub fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'')
}

pub fn is_open_bracket(c: char) -> bool {
    closing_bracket(c).is_some()
}

pub fn is_close_bracket(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

fn closing_bracket(c: char) -> Option<char> {
    match c {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

/// Collects a slice of characters back into a `String`.
pub fn text(src: &[char]) -> String {
    src.iter().collect()
}

pub fn skip_blank(src: &[char], from: usize) -> usize {
    let mut index = from;
    while index < src.len() && is_blank(src[index]) {
        index += 1;
    }
    index
}

/// Skips identifier characters. The caller checks that `src[from]` may start a name.
pub fn skip_name(src: &[char], from: usize) -> usize {
    let mut index = from;
    while index < src.len() && is_identifier_continue(src[index]) {
        index += 1;
    }
    index
}

/// Like [`skip_name`], but `&` is accepted anywhere in the run.
pub fn skip_name_and_ampersand(src: &[char], from: usize) -> usize {
    let mut index = from;
    while index < src.len() && (is_identifier_continue(src[index]) || src[index] == '&') {
        index += 1;
    }
    index
}

/// Skips a quoted string starting at `src[from]`, up to and including the matching quote.
pub fn skip_quoted(src: &[char], from: usize) -> Option<usize> {
    let quote = *src.get(from)?;
    src.get(from + 1..)?
        .iter()
        .position(|&c| c == quote)
        .map(|offset| from + offset + 2)
}

/// Skips a bracketed group or a quoted string starting at `src[from]`.
///
/// All three bracket kinds nest inside each other and quotes inside the group are skipped as a
/// whole. A mismatched closer or a group left open yields `None`.
pub fn skip_balanced(src: &[char], from: usize) -> Option<usize> {
    let first = *src.get(from)?;
    if is_quote(first) {
        return skip_quoted(src, from);
    }
    let mut expected = vec![closing_bracket(first)?];
    let mut index = from + 1;
    while let Some(&c) = src.get(index) {
        if is_quote(c) {
            index = skip_quoted(src, index)?;
            continue;
        }
        if let Some(close) = closing_bracket(c) {
            expected.push(close);
        } else if is_close_bracket(c) {
            if expected.pop() != Some(c) {
                return None;
            }
            if expected.is_empty() {
                return Some(index + 1);
            }
        }
        index += 1;
    }
    None
}

/// Skips one term: a quoted string, a bracketed group, or a word (identifier or number)
/// together with any `(...)`/`[...]` groups attached to it without blanks.
pub fn skip_term(src: &[char], from: usize) -> Option<usize> {
    let first = *src.get(from)?;
    if is_quote(first) || is_open_bracket(first) {
        return skip_balanced(src, from);
    }
    let mut index = if is_identifier_start(first) {
        skip_name(src, from)
    } else if first.is_ascii_digit() {
        skip_number(src, from)
    } else {
        return None;
    };
    while matches!(src.get(index), Some('(') | Some('[')) {
        index = skip_balanced(src, index)?;
    }
    Some(index)
}

fn skip_number(src: &[char], from: usize) -> usize {
    let mut index = from;
    while index < src.len() && (is_identifier_continue(src[index]) || src[index] == '.') {
        index += 1;
    }
    index
}

/// Skips balanced text up to the first blank or stray closing bracket outside any group.
/// Empty or unbalanced text yields `None`.
pub fn skip_extended(src: &[char], from: usize) -> Option<usize> {
    let mut index = from;
    while let Some(&c) = src.get(index) {
        if is_blank(c) || is_close_bracket(c) {
            break;
        }
        index = if is_quote(c) || is_open_bracket(c) {
            skip_balanced(src, index)?
        } else {
            index + 1
        };
    }
    (index > from).then_some(index)
}

/// Skips one argument of a call: balanced text up to a top-level `,` or closing bracket.
pub fn skip_argument(src: &[char], from: usize) -> Option<usize> {
    let mut index = from;
    while let Some(&c) = src.get(index) {
        if c == ',' || is_close_bracket(c) {
            break;
        }
        index = if is_quote(c) || is_open_bracket(c) {
            skip_balanced(src, index)?
        } else {
            index + 1
        };
    }
    Some(index)
}

/// Splits the parenthesized argument list opening at `src[open]`.
///
/// Returns the trimmed arguments and the index just past the closing `)`.
/// `()` yields a single empty argument.
pub fn split_arguments(src: &[char], open: usize) -> Option<(Vec<String>, usize)> {
    if src.get(open) != Some(&'(') {
        return None;
    }
    let mut arguments = Vec::new();
    let mut index = open + 1;
    loop {
        let end = skip_argument(src, index)?;
        arguments.push(text(&src[index..end]).trim().to_string());
        match src.get(end) {
            Some(',') => index = end + 1,
            Some(')') => return Some((arguments, end + 1)),
            _ => return None,
        }
    }
}

/// Skips a run of characters that is neither blank nor the start of an identifier.
///
/// Quoted strings are consumed whole (an unterminated one runs to the end of the input) and
/// numbers swallow their trailing letters, so `0x1F` is never split into `0` and `x1F`.
pub fn skip_punct(src: &[char], from: usize) -> usize {
    let mut index = from;
    while let Some(&c) = src.get(index) {
        if is_blank(c) || is_identifier_start(c) {
            break;
        }
        index = if is_quote(c) {
            skip_quoted(src, index).unwrap_or(src.len())
        } else if c.is_ascii_digit() {
            skip_name(src, index)
        } else {
            index + 1
        };
    }
    index
}
