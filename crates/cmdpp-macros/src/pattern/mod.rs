// crates/cmdpp-macros/src/pattern/mod.rs

//! Rules registered by `#command`, `#xcommand`, `#translate` and `#xtranslate`.
//!
//! A rule reads `LHS => RHS`. The left-hand side is a pattern of literal words, optional groups
//! in `[...]` and match markers in `<...>`; the right-hand side is a template whose result
//! markers refer back to the names captured on the left. Both sides are compiled once, at
//! registration, into the closed enums below.

use serde::Serialize;

use crate::errors::SyntaxError;
use crate::lexer::{
    is_blank, is_identifier_start, skip_blank, skip_name, skip_name_and_ampersand, text,
};

mod matcher;

pub use matcher::RuleMatch;

/// A node of the left-hand side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PatternItem {
    /// A keyword or punctuation matched verbatim.
    Literal(String),
    /// `[...]`: tried once, skipped on failure.
    Optional(Vec<PatternItem>),
    /// `<name>`: one term.
    Regular(usize),
    /// `<name,...>`: a comma-separated list.
    List(usize),
    /// `<name:a,b,...>`: one of the listed words.
    Restricted(usize, Vec<String>),
    /// `<(name)>`: balanced text up to an unnested blank.
    Extended(usize),
    /// `<*name*>`: the rest of the line.
    Tail(usize),
}

/// A node of the right-hand side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OutputItem {
    Text(String),
    /// `<name>`
    Regular(usize),
    /// `<(name)>`
    Extended(usize),
    /// `<"name">`
    Quoted(usize),
    /// `<{name}>`
    Blocked(usize),
    /// `<.name.>`
    Logical(usize),
    /// `#<name>`
    Dumb(usize),
}

/// Text written for `<.name.>` markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalLiterals {
    pub truth: String,
    pub falsehood: String,
}

impl Default for LogicalLiterals {
    fn default() -> Self {
        Self {
            truth: ".T.".to_string(),
            falsehood: ".F.".to_string(),
        }
    }
}

/// A compiled, immutable rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// Whether identifier literals accept abbreviations of at least four characters.
    pub abbreviation: bool,
    /// Capture names, indexed by slot.
    pub names: Vec<String>,
    pub lhs: Vec<PatternItem>,
    pub rhs: Vec<OutputItem>,
}

impl Rule {
    /// Compiles the text following a rule directive.
    pub fn compile(source: &str, abbreviation: bool) -> Result<Self, SyntaxError> {
        let src: Vec<char> = source.chars().collect();
        let mut compiler = RuleCompiler {
            src: &src,
            index: 0,
            names: Vec::new(),
        };
        let lhs = compiler.parse_pattern()?;
        let rhs = compiler.parse_template()?;
        Ok(Rule {
            abbreviation,
            names: compiler.names,
            lhs,
            rhs,
        })
    }
}

struct RuleCompiler<'a> {
    src: &'a [char],
    index: usize,
    names: Vec<String>,
}

impl RuleCompiler<'_> {
    fn peek(&self, offset: usize) -> Option<char> {
        self.src.get(self.index + offset).copied()
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.index + 1, message)
    }

    fn at_arrow(&self, index: usize) -> bool {
        self.src.get(index) == Some(&'=') && self.src.get(index + 1) == Some(&'>')
    }

    fn opens_match_marker(&self, index: usize) -> bool {
        self.src.get(index) == Some(&'<')
            && self
                .src
                .get(index + 1)
                .is_some_and(|&c| is_identifier_start(c) || matches!(c, '*' | '('))
    }

    fn opens_result_marker(&self, index: usize) -> bool {
        match (self.src.get(index), self.src.get(index + 1)) {
            (Some('<'), Some(&c)) => is_identifier_start(c) || matches!(c, '"' | '(' | '{' | '.'),
            (Some('#'), Some('<')) => self
                .src
                .get(index + 2)
                .is_some_and(|&c| is_identifier_start(c)),
            _ => false,
        }
    }

    /// Parses the left-hand side up to `=>` or the end of the source.
    fn parse_pattern(&mut self) -> Result<Vec<PatternItem>, SyntaxError> {
        // Each open `[` pushes a frame remembering where it started.
        let mut frames: Vec<(usize, Vec<PatternItem>)> = vec![(0, Vec::new())];
        loop {
            self.index = skip_blank(self.src, self.index);
            let Some(c) = self.peek(0) else { break };
            if self.at_arrow(self.index) {
                self.index += 2;
                break;
            }
            match c {
                '[' => {
                    frames.push((self.index, Vec::new()));
                    self.index += 1;
                }
                ']' => {
                    if frames.len() < 2 {
                        return Err(self.error("unbalanced ]"));
                    }
                    let (_, nested) = frames.pop().unwrap_or_default();
                    if let Some((_, top)) = frames.last_mut() {
                        top.push(PatternItem::Optional(nested));
                    }
                    self.index += 1;
                }
                _ => {
                    let item = if self.opens_match_marker(self.index) {
                        self.parse_match_marker()?
                    } else {
                        self.parse_literal()
                    };
                    if let Some((_, top)) = frames.last_mut() {
                        top.push(item);
                    }
                }
            }
        }
        if frames.len() > 1 {
            let (start, _) = frames[frames.len() - 1];
            return Err(SyntaxError::new(start + 1, "unclosed ["));
        }
        Ok(frames.pop().map(|(_, items)| items).unwrap_or_default())
    }

    fn parse_literal(&mut self) -> PatternItem {
        let start = self.index;
        let mut index = start + 1;
        while let Some(&c) = self.src.get(index) {
            if is_blank(c)
                || matches!(c, '[' | ']')
                || self.opens_match_marker(index)
                || self.at_arrow(index)
            {
                break;
            }
            index += 1;
        }
        self.index = index;
        PatternItem::Literal(text(&self.src[start..index]))
    }

    /// Reads a capture name starting at the cursor.
    fn parse_name(&mut self) -> Result<(String, usize), SyntaxError> {
        let start = self.index;
        if !self.peek(0).is_some_and(is_identifier_start) {
            return Err(self.error("missing name"));
        }
        self.index = skip_name(self.src, start);
        Ok((text(&self.src[start..self.index]), start + 1))
    }

    fn expect(&mut self, closer: &str) -> Result<(), SyntaxError> {
        let chars: Vec<char> = closer.chars().collect();
        if self.src[self.index..].starts_with(&chars) {
            self.index += chars.len();
            Ok(())
        } else {
            Err(self.error(format!("unclosed {closer}")))
        }
    }

    fn declare(&mut self, name: String, column: usize) -> Result<usize, SyntaxError> {
        if self.names.contains(&name) {
            return Err(SyntaxError::new(column, format!("duplicate name <{name}>")));
        }
        self.names.push(name);
        Ok(self.names.len() - 1)
    }

    fn lookup(&self, name: &str, column: usize) -> Result<usize, SyntaxError> {
        self.names
            .iter()
            .position(|declared| declared == name)
            .ok_or_else(|| SyntaxError::new(column, format!("missing name <{name}>")))
    }

    /// Parses a `<...>` marker of the left-hand side; the cursor is on `<`.
    fn parse_match_marker(&mut self) -> Result<PatternItem, SyntaxError> {
        match self.peek(1) {
            Some('*') => {
                self.index += 2;
                let (name, column) = self.parse_name()?;
                self.expect("*>")?;
                Ok(PatternItem::Tail(self.declare(name, column)?))
            }
            Some('(') => {
                self.index += 2;
                let (name, column) = self.parse_name()?;
                self.expect(")>")?;
                Ok(PatternItem::Extended(self.declare(name, column)?))
            }
            _ => {
                self.index += 1;
                let (name, column) = self.parse_name()?;
                match self.peek(0) {
                    Some('>') => {
                        self.index += 1;
                        Ok(PatternItem::Regular(self.declare(name, column)?))
                    }
                    Some(',') => {
                        self.expect(",...>")?;
                        Ok(PatternItem::List(self.declare(name, column)?))
                    }
                    Some(':') => {
                        let alternatives = self.parse_alternatives()?;
                        Ok(PatternItem::Restricted(
                            self.declare(name, column)?,
                            alternatives,
                        ))
                    }
                    _ => Err(self.error("unclosed >")),
                }
            }
        }
    }

    /// Parses `:a, b, ...>`; the cursor is on `:`.
    fn parse_alternatives(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut alternatives = Vec::new();
        loop {
            self.index = skip_blank(self.src, self.index + 1);
            let start = self.index;
            self.index = skip_name_and_ampersand(self.src, start);
            if self.index == start {
                return Err(self.error("missing alternative"));
            }
            alternatives.push(text(&self.src[start..self.index]));
            self.index = skip_blank(self.src, self.index);
            if self.peek(0) != Some(',') {
                break;
            }
        }
        self.expect(">")?;
        Ok(alternatives)
    }

    /// Parses the right-hand side from the cursor to the end of the source.
    fn parse_template(&mut self) -> Result<Vec<OutputItem>, SyntaxError> {
        let mut items = Vec::new();
        let mut literal = String::new();
        self.index = skip_blank(self.src, self.index);
        while let Some(c) = self.peek(0) {
            if self.opens_result_marker(self.index) {
                if !literal.is_empty() {
                    items.push(OutputItem::Text(std::mem::take(&mut literal)));
                }
                items.push(self.parse_result_marker()?);
            } else {
                literal.push(c);
                self.index += 1;
            }
        }
        if !literal.is_empty() {
            items.push(OutputItem::Text(literal));
        }
        Ok(items)
    }

    /// Parses a result marker; the cursor is on `<` or on the `#` of `#<`.
    fn parse_result_marker(&mut self) -> Result<OutputItem, SyntaxError> {
        if self.peek(0) == Some('#') {
            self.index += 2;
            let (name, column) = self.parse_name()?;
            self.expect(">")?;
            return Ok(OutputItem::Dumb(self.lookup(&name, column)?));
        }
        let (skip, closer, build): (usize, &str, fn(usize) -> OutputItem) = match self.peek(1) {
            Some('"') => (2, "\">", OutputItem::Quoted),
            Some('(') => (2, ")>", OutputItem::Extended),
            Some('{') => (2, "}>", OutputItem::Blocked),
            Some('.') => (2, ".>", OutputItem::Logical),
            _ => (1, ">", OutputItem::Regular),
        };
        self.index += skip;
        let (name, column) = self.parse_name()?;
        self.expect(closer)?;
        Ok(build(self.lookup(&name, column)?))
    }
}
