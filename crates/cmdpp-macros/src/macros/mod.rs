// crates/cmdpp-macros/src/macros/mod.rs

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::errors::SyntaxError;
use crate::lexer::{is_identifier_start, skip_blank, skip_name, split_arguments, text};


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MacroPart {
    Text(String),
    /// Index into the argument list.
    Param(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroDefinition {
    /// Zero for object macros.
    pub arity: usize,
    pub body: Vec<MacroPart>,
}

impl MacroDefinition {
    pub fn object(value: &str) -> Self {
        Self {
            arity: 0,
            body: vec![MacroPart::Text(value.to_string())],
        }
    }

    /// Scans `body` once, turning every identifier equal to a parameter into a placeholder,
    /// wherever it appears.
    pub fn function(params: &[String], body: &[char]) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut index = 0;
        while let Some(&c) = body.get(index) {
            if !is_identifier_start(c) {
                literal.push(c);
                index += 1;
                continue;
            }
            let end = skip_name(body, index);
            let word = text(&body[index..end]);
            match params.iter().position(|p| *p == word) {
                Some(slot) => {
                    if !literal.is_empty() {
                        parts.push(MacroPart::Text(std::mem::take(&mut literal)));
                    }
                    parts.push(MacroPart::Param(slot));
                }
                None => literal.push_str(&word),
            }
            index = end;
        }
        if !literal.is_empty() {
            parts.push(MacroPart::Text(literal));
        }
        Self {
            arity: params.len(),
            body: parts,
        }
    }

    pub fn instantiate(&self, args: &[String]) -> String {
        self.body
            .iter()
            .map(|part| match part {
                MacroPart::Text(t) => t.as_str(),
                MacroPart::Param(slot) => args.get(*slot).map(String::as_str).unwrap_or(""),
            })
            .collect()
    }

    /// Matches a call whose name ends at `name_end`: optional blanks, then a parenthesised
    /// argument list of exactly `arity` arguments.
    ///
    /// Returns the expansion and the index just past the closing `)`.
    pub fn match_call(&self, src: &[char], name_end: usize) -> Option<(String, usize)> {
        let open = skip_blank(src, name_end);
        let (args, end) = split_arguments(src, open)?;
        (args.len() == self.arity).then(|| (self.instantiate(&args), end))
    }
}

/// Object-like and function-like macros. A name lives in at most one of the two tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MacroTable {
    pub objects: BTreeMap<String, MacroDefinition>,
    pub functions: BTreeMap<String, MacroDefinition>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles the text following `#define`.
    ///
    /// A redefinition still replaces the previous macro before the error is returned.
    pub fn define(&mut self, source: &str) -> Result<(), SyntaxError> {
        let src: Vec<char> = source.chars().collect();
        let start = skip_blank(&src, 0);
        if !src.get(start).is_some_and(|&c| is_identifier_start(c)) {
            return Err(SyntaxError::new(start + 1, "missing macro name"));
        }
        let name_end = skip_name(&src, start);
        let name = text(&src[start..name_end]);
        let after = skip_blank(&src, name_end);

        let (definition, kind) = if src.get(after) == Some(&'(') {
            let (params, body_start) = parse_parameters(&src, after)?;
            let body: Vec<char> = text(&src[body_start..]).trim().chars().collect();
            (MacroDefinition::function(&params, &body), "function")
        } else {
            let value = text(&src[after..]);
            (MacroDefinition::object(value.trim()), "variable")
        };

        let existed = self.is_defined(&name);
        debug!("define {} {} (arity {})", kind, name, definition.arity);
        if definition.arity == 0 {
            self.functions.remove(&name);
            self.objects.insert(name, definition);
        } else {
            self.objects.remove(&name);
            self.functions.insert(name, definition);
        }
        if existed {
            return Err(SyntaxError::new(
                start + 1,
                format!("redefinition of {kind}"),
            ));
        }
        Ok(())
    }

    /// Defines an object macro without parsing, for predefined names.
    pub fn define_object(&mut self, name: &str, value: &str) {
        self.functions.remove(name);
        self.objects
            .insert(name.to_string(), MacroDefinition::object(value));
    }

    /// Removes `name` from both tables. Unknown names are ignored.
    pub fn undefine(&mut self, name: &str) {
        if self.objects.remove(name).is_some() || self.functions.remove(name).is_some() {
            debug!("undef {}", name);
        }
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.objects.contains_key(name) || self.functions.contains_key(name)
    }

    pub fn object(&self, name: &str) -> Option<&MacroDefinition> {
        self.objects.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&MacroDefinition> {
        self.functions.get(name)
    }
}

/// Parses `(p1, p2, ...)` opening at `src[open]`; returns the names and the index after `)`.
fn parse_parameters(src: &[char], open: usize) -> Result<(Vec<String>, usize), SyntaxError> {
    let mut params: Vec<String> = Vec::new();
    let mut index = open;
    loop {
        index = skip_blank(src, index + 1);
        if !src.get(index).is_some_and(|&c| is_identifier_start(c)) {
            if index >= src.len() {
                return Err(SyntaxError::new(
                    open + 1,
                    "unclosed bracket in the function definition",
                ));
            }
            return Err(SyntaxError::new(
                index + 1,
                "parameter name is missing in the function definition",
            ));
        }
        let end = skip_name(src, index);
        let param = text(&src[index..end]);
        if params.contains(&param) {
            return Err(SyntaxError::new(
                index + 1,
                format!("duplicate parameter name [{param}] in the function definition"),
            ));
        }
        params.push(param);
        index = skip_blank(src, end);
        match src.get(index) {
            Some(',') => continue,
            Some(')') => return Ok((params, index + 1)),
            _ => {
                return Err(SyntaxError::new(
                    open + 1,
                    "unclosed bracket in the function definition",
                ))
            }
        }
    }
}
