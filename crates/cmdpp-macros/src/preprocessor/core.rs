// crates/cmdpp-macros/src/preprocessor/core.rs

use std::io::{BufRead, Write};

use lazy_static::lazy_static;
use log::{debug, trace, warn};
use regex::Regex;

use super::diagnostics::DiagnosticSink;
use super::include::{include_target, DirectoryResolver, IncludeResolver};
use super::state::{Context, PreprocessorConfig};
use crate::errors::{PreprocessError, PreprocessResult, SyntaxError};
use crate::lexer::{is_blank, is_identifier_start, skip_blank, skip_name, skip_punct, text};
use crate::lines::LineAssembler;
use crate::pattern::Rule;
use crate::types::{Directive, LogicalLine};

lazy_static! {
    /// `#name rest`: the name runs up to the first blank.
    static ref DIRECTIVE: Regex = Regex::new(r"^#(\S*)\s*(.*)$").expect("Invalid directive regex");
}

/// Drives line assembly, directive dispatch and line rewriting.
///
/// A `Preprocessor` holds only configuration; everything a run accumulates lives in the
/// [`Context`] passed to [`Preprocessor::process`], so one instance can serve many inputs.
pub struct Preprocessor {
    config: PreprocessorConfig,
    resolver: Box<dyn IncludeResolver>,
}

impl Preprocessor {
    pub fn new(config: PreprocessorConfig) -> Self {
        let resolver = DirectoryResolver::new(config.include_paths.clone());
        Self::with_resolver(config, resolver)
    }

    pub fn with_resolver(
        config: PreprocessorConfig,
        resolver: impl IncludeResolver + 'static,
    ) -> Self {
        Self {
            config,
            resolver: Box::new(resolver),
        }
    }

    /// A fresh context holding the configured predefined macros.
    pub fn context(&self) -> Context {
        let mut ctx = Context::new();
        for (name, value) in &self.config.defines {
            ctx.macros.define_object(name, value);
        }
        ctx
    }

    /// Processes a whole input, stopping at the first error.
    pub fn process(
        &self,
        ctx: &mut Context,
        input: impl BufRead,
        out: &mut dyn Write,
        diag: &mut dyn DiagnosticSink,
    ) -> PreprocessResult<()> {
        self.process_stream(ctx, input, out, diag)?;
        if ctx.conditional.level() > 0 {
            warn!(
                "{} conditional block(s) still open at end of input",
                ctx.conditional.level()
            );
        }
        Ok(())
    }

    fn process_stream<R: BufRead>(
        &self,
        ctx: &mut Context,
        input: R,
        out: &mut dyn Write,
        diag: &mut dyn DiagnosticSink,
    ) -> PreprocessResult<()> {
        for line in LineAssembler::new(input) {
            self.process_line(ctx, &line?, out, diag)?;
        }
        Ok(())
    }

    /// Processes one logical line. The context stays usable after an error.
    pub fn process_line(
        &self,
        ctx: &mut Context,
        line: &LogicalLine,
        out: &mut dyn Write,
        diag: &mut dyn DiagnosticSink,
    ) -> PreprocessResult<()> {
        let trimmed = line.text.trim_start();
        if trimmed.starts_with('#') {
            let offset = line.text.chars().count() - trimmed.chars().count();
            return self.dispatch(ctx, line.number, trimmed, offset, out, diag);
        }
        if !ctx.conditional.is_active() {
            return Ok(());
        }
        let rewritten = self
            .rewrite(ctx, &line.text)
            .map_err(|e| e.at_line(line.number))?;
        if !rewritten.trim().is_empty() {
            writeln!(out, "{}", rewritten)?;
        }
        Ok(())
    }

    /// `directive_text` starts with `#` and sits `offset` characters into its line.
    fn dispatch(
        &self,
        ctx: &mut Context,
        number: usize,
        directive_text: &str,
        offset: usize,
        out: &mut dyn Write,
        diag: &mut dyn DiagnosticSink,
    ) -> PreprocessResult<()> {
        let (name, rest, rest_offset) = match DIRECTIVE.captures(directive_text) {
            Some(caps) => {
                let name = caps.get(1).map_or("", |m| m.as_str());
                let (rest, start) = caps
                    .get(2)
                    .map_or(("", directive_text.len()), |m| (m.as_str(), m.start()));
                (name, rest, offset + directive_text[..start].chars().count())
            }
            None => ("", "", offset),
        };
        let directive = Directive::from_name(name).ok_or_else(|| {
            PreprocessError::syntax(number, 1, format!("unknown directive #{name}"))
        })?;
        if !directive.is_conditional() && !ctx.conditional.is_active() {
            return Ok(());
        }
        let in_rest = |e: SyntaxError| e.shifted(rest_offset).at_line(number);
        let at_line = |e: SyntaxError| e.at_line(number);

        match directive {
            Directive::Ifdef | Directive::Ifndef => {
                let defined = ctx.macros.is_defined(first_word(rest));
                let expected = directive == Directive::Ifdef;
                ctx.conditional.enter(defined == expected).map_err(at_line)
            }
            Directive::Else => ctx.conditional.flip().map_err(at_line),
            Directive::End => ctx.conditional.leave().map_err(at_line),
            Directive::Define => ctx.macros.define(rest).map_err(in_rest),
            Directive::Undef => {
                ctx.macros.undefine(first_word(rest));
                Ok(())
            }
            Directive::Command
            | Directive::XCommand
            | Directive::Translate
            | Directive::XTranslate => {
                let Some((kind, abbreviation)) = directive.rule_kind() else {
                    return Ok(());
                };
                let rule = Rule::compile(rest, abbreviation).map_err(in_rest)?;
                debug!("line {}: #{} registered {:?} rule", number, name, kind);
                ctx.rules.register(kind, rule);
                Ok(())
            }
            Directive::Include => self.include(ctx, number, rest, rest_offset, out, diag),
            Directive::Error => {
                diag.emit(rest);
                Err(PreprocessError::Fatal {
                    line: number,
                    message: rest.to_string(),
                })
            }
            Directive::Stdout => {
                diag.emit(rest);
                Ok(())
            }
        }
    }

    fn include(
        &self,
        ctx: &mut Context,
        number: usize,
        rest: &str,
        rest_offset: usize,
        out: &mut dyn Write,
        diag: &mut dyn DiagnosticSink,
    ) -> PreprocessResult<()> {
        let target = include_target(rest);
        if target.is_empty() {
            return Err(PreprocessError::syntax(
                number,
                rest_offset + 1,
                "missing include file name",
            ));
        }
        let path = self.resolver.resolve(target);
        debug!("line {}: including {}", number, path.display());
        let reader = self
            .resolver
            .open(&path)
            .map_err(|_| PreprocessError::IncludeNotFound {
                line: number,
                path: path.clone(),
            })?;
        self.process_stream(ctx, reader, out, diag)
    }

    /// Rewrites an ordinary line to its fixed point.
    ///
    /// Anchored rules are tried on the whole line first. Then each token is tried in turn against
    /// the object macros, the function macros and the inline rules; a replacement is spliced in
    /// place and scanning resumes at its start.
    ///
    /// `max_rewrites` bounds the splices made before the scan gets past the end of everything
    /// replaced so far, so only self-feeding expansions hit it.
    fn rewrite(&self, ctx: &Context, line: &str) -> Result<String, SyntaxError> {
        let mut src: Vec<char> = line.chars().collect();
        let mut cursor = 0;
        let mut anchored = true;
        let mut splices = 0;
        // End of the replaced text the scan is still inside.
        let mut frontier = 0;

        loop {
            if anchored {
                if let Some(replacement) = self.apply_anchored(ctx, &src)? {
                    self.count_splice(&mut splices, 1)?;
                    trace!("anchored rule: {:?}", replacement);
                    src = replacement.chars().collect();
                    continue;
                }
                anchored = false;
            }

            let Some(&c) = src.get(cursor) else { break };
            if is_blank(c) {
                cursor += 1;
                continue;
            }
            if cursor >= frontier {
                splices = 0;
            }
            let end = if is_identifier_start(c) {
                skip_name(&src, cursor)
            } else {
                skip_punct(&src, cursor)
            };
            match self.expand_at(ctx, &src, cursor, end) {
                Some((replacement, consumed)) => {
                    self.count_splice(&mut splices, cursor + 1)?;
                    trace!("{:?} -> {:?}", text(&src[cursor..consumed]), replacement);
                    let length = replacement.chars().count();
                    frontier = if consumed >= frontier {
                        cursor + length
                    } else {
                        frontier - (consumed - cursor) + length
                    };
                    src.splice(cursor..consumed, replacement.chars());
                }
                None => cursor = end,
            }
        }
        Ok(text(&src))
    }

    fn count_splice(&self, splices: &mut usize, column: usize) -> Result<(), SyntaxError> {
        *splices += 1;
        if *splices > self.config.max_rewrites {
            return Err(SyntaxError::new(column, "macro expansion is too deep"));
        }
        Ok(())
    }

    /// The first anchored rule matching at the start of the line, which must then be consumed
    /// entirely.
    fn apply_anchored(&self, ctx: &Context, src: &[char]) -> Result<Option<String>, SyntaxError> {
        let start = skip_blank(src, 0);
        for rule in &ctx.rules.anchored {
            if let Some(found) = rule.match_at(src, start) {
                let tail = skip_blank(src, found.end);
                if tail < src.len() {
                    return Err(SyntaxError::new(tail + 1, "dust at line tail"));
                }
                return Ok(Some(rule.substitute(&found, &self.config.logical)));
            }
        }
        Ok(None)
    }

    /// Replacement text and end of the replaced span for the token at `src[start..end]`.
    fn expand_at(
        &self,
        ctx: &Context,
        src: &[char],
        start: usize,
        end: usize,
    ) -> Option<(String, usize)> {
        if is_identifier_start(src[start]) {
            let name = text(&src[start..end]);
            if let Some(object) = ctx.macros.object(&name) {
                return Some((object.instantiate(&[]), end));
            }
            if let Some(call) = ctx
                .macros
                .function(&name)
                .and_then(|function| function.match_call(src, end))
            {
                return Some(call);
            }
        }
        ctx.rules.inline.iter().find_map(|rule| {
            let found = rule.match_at(src, start)?;
            Some((rule.substitute(&found, &self.config.logical), found.end))
        })
    }
}

fn first_word(rest: &str) -> &str {
    rest.split_whitespace().next().unwrap_or("")
}
