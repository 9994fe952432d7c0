// crates/cmdpp-macros/src/pattern/matcher.rs

use super::{LogicalLiterals, OutputItem, PatternItem, Rule};
use crate::lexer::{
    is_blank, is_close_bracket, is_identifier_continue, is_identifier_start, is_open_bracket,
    is_quote, skip_balanced, skip_blank, skip_extended, skip_name, skip_name_and_ampersand,
    skip_term, text,
};

/// Shortest prefix of a keyword accepted as its abbreviation.
pub const ABBREVIATION_MIN: usize = 4;

/// The outcome of one successful match attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Index just past the matched input.
    pub end: usize,
    /// Captured text per slot; `None` for markers inside optional groups that were skipped.
    pub captures: Vec<Option<String>>,
}

impl RuleMatch {
    /// The captured text of `slot`, or `""` when nothing was captured.
    pub fn capture(&self, slot: usize) -> &str {
        self.captures
            .get(slot)
            .and_then(|captured| captured.as_deref())
            .unwrap_or("")
    }
}

struct Step {
    end: usize,
    /// A tail marker consumed the line, nothing after it is matched.
    finished: bool,
}

impl Rule {
    /// Tries the rule at `src[from..]`.
    ///
    /// Items are matched greedily from left to right without backtracking. A match must consume
    /// at least one character.
    pub fn match_at(&self, src: &[char], from: usize) -> Option<RuleMatch> {
        let mut captures = vec![None; self.names.len()];
        let step = self.match_items(&self.lhs, src, from, &[], &mut captures)?;
        (step.end > from).then_some(RuleMatch {
            end: step.end,
            captures,
        })
    }

    fn match_items<'r>(
        &'r self,
        items: &'r [PatternItem],
        src: &[char],
        from: usize,
        follow: &[&'r str],
        captures: &mut Vec<Option<String>>,
    ) -> Option<Step> {
        let mut cursor = from;
        for (position, item) in items.iter().enumerate() {
            let start = skip_blank(src, cursor);
            match item {
                PatternItem::Literal(literal) => {
                    cursor = self.match_literal(literal, src, start)?;
                }
                PatternItem::Optional(nested) => {
                    let stops = leading_literals(&items[position + 1..], follow);
                    let mut trial = captures.clone();
                    if let Some(step) = self.match_items(nested, src, start, &stops, &mut trial) {
                        *captures = trial;
                        if step.finished {
                            return Some(step);
                        }
                        cursor = step.end;
                    }
                }
                PatternItem::Regular(slot) => {
                    let end = skip_term(src, start)?;
                    captures[*slot] = Some(text(&src[start..end]));
                    cursor = end;
                }
                PatternItem::List(slot) => {
                    let stops = leading_literals(&items[position + 1..], follow);
                    let end = self.match_list(src, start, &stops)?;
                    captures[*slot] = Some(text(&src[start..end]).trim_end().to_string());
                    cursor = end;
                }
                PatternItem::Restricted(slot, alternatives) => {
                    let end = match_restricted(alternatives, src, start)?;
                    captures[*slot] = Some(text(&src[start..end]));
                    cursor = end;
                }
                PatternItem::Extended(slot) => {
                    let end = skip_extended(src, start)?;
                    captures[*slot] = Some(text(&src[start..end]));
                    cursor = end;
                }
                PatternItem::Tail(slot) => {
                    captures[*slot] = Some(text(&src[start..]).trim_end().to_string());
                    return Some(Step {
                        end: src.len(),
                        finished: true,
                    });
                }
            }
        }
        Some(Step {
            end: cursor,
            finished: false,
        })
    }

    fn match_literal(&self, literal: &str, src: &[char], start: usize) -> Option<usize> {
        let keyword: Vec<char> = literal.chars().collect();
        if is_word(&keyword) {
            if !src.get(start).is_some_and(|&c| is_identifier_start(c)) {
                return None;
            }
            let end = skip_name(src, start);
            self.accepts_word(&keyword, &src[start..end]).then_some(end)
        } else {
            src[start..]
                .starts_with(&keyword)
                .then_some(start + keyword.len())
        }
    }

    fn accepts_word(&self, keyword: &[char], word: &[char]) -> bool {
        word == keyword
            || (self.abbreviation
                && word.len() >= ABBREVIATION_MIN
                && word.len() < keyword.len()
                && keyword.starts_with(word))
    }

    /// Consumes balanced text up to a top-level comma, the end of the line, a stray closing
    /// bracket, or a word that one of the `stops` literals accepts.
    fn match_list(&self, src: &[char], start: usize, stops: &[&str]) -> Option<usize> {
        let mut index = start;
        let mut end = start;
        while let Some(&c) = src.get(index) {
            if is_blank(c) {
                index += 1;
                continue;
            }
            if c == ',' || is_close_bracket(c) || self.at_stop(src, index, stops) {
                break;
            }
            index = if is_quote(c) || is_open_bracket(c) {
                skip_balanced(src, index)?
            } else {
                index + 1
            };
            end = index;
        }
        (end > start).then_some(end)
    }

    fn at_stop(&self, src: &[char], index: usize, stops: &[&str]) -> bool {
        let boundary = index == 0 || !is_identifier_continue(src[index - 1]);
        stops.iter().any(|stop| {
            let starts_word = stop.chars().next().is_some_and(is_identifier_start);
            (boundary || !starts_word) && self.match_literal(stop, src, index).is_some()
        })
    }

    /// Renders the right-hand side for a successful match.
    pub fn substitute(&self, found: &RuleMatch, literals: &LogicalLiterals) -> String {
        let mut out = String::new();
        for item in &self.rhs {
            match item {
                OutputItem::Text(literal) => out.push_str(literal),
                OutputItem::Regular(slot) => out.push_str(found.capture(*slot)),
                OutputItem::Extended(slot) => {
                    wrap_non_blank(&mut out, found.capture(*slot), "(", ")");
                }
                OutputItem::Quoted(slot) => {
                    let value = found.capture(*slot);
                    if !value.trim().is_empty() {
                        push_quoted(&mut out, value);
                    }
                }
                OutputItem::Blocked(slot) => {
                    wrap_non_blank(&mut out, found.capture(*slot), "{||", "}");
                }
                OutputItem::Logical(slot) => {
                    if found.capture(*slot).trim().is_empty() {
                        out.push_str(&literals.falsehood);
                    } else {
                        out.push_str(&literals.truth);
                    }
                }
                OutputItem::Dumb(slot) => {
                    let value = found.capture(*slot);
                    if value.trim().is_empty() {
                        out.push_str("\"\"");
                    } else {
                        push_quoted(&mut out, value);
                    }
                }
            }
        }
        out
    }
}

fn is_word(keyword: &[char]) -> bool {
    keyword.first().is_some_and(|&c| is_identifier_start(c))
        && keyword.iter().all(|&c| is_identifier_continue(c))
}

fn match_restricted(alternatives: &[String], src: &[char], start: usize) -> Option<usize> {
    let end = skip_name_and_ampersand(src, start);
    if end > start {
        let word = text(&src[start..end]);
        if alternatives.iter().any(|alternative| *alternative == word) {
            return Some(end);
        }
    }
    let any_expression = alternatives.iter().any(|alternative| alternative == "&");
    if any_expression && src.get(start).is_some_and(|&c| is_quote(c) || is_open_bracket(c)) {
        return skip_balanced(src, start);
    }
    None
}

/// Literals that may directly follow the current item: the next literal, the leading literals of
/// optional groups before it, and, when the sequence runs out, whatever follows the enclosing one.
fn leading_literals<'r>(rest: &'r [PatternItem], follow: &[&'r str]) -> Vec<&'r str> {
    let mut stops = Vec::new();
    for item in rest {
        match item {
            PatternItem::Literal(literal) => {
                stops.push(literal.as_str());
                return stops;
            }
            PatternItem::Optional(nested) => stops.extend(leading_literals(nested, &[])),
            _ => return stops,
        }
    }
    stops.extend_from_slice(follow);
    stops
}

fn wrap_non_blank(out: &mut String, value: &str, open: &str, close: &str) {
    if value.trim().is_empty() {
        return;
    }
    out.push_str(open);
    out.push_str(value);
    out.push_str(close);
}

fn push_quoted(out: &mut String, value: &str) {
    let quote = if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    };
    out.push(quote);
    out.push_str(value);
    out.push(quote);
}
