// crates/cmdpp-macros/src/preprocessor/state.rs

use std::path::PathBuf;

use serde::Serialize;

use crate::errors::SyntaxError;
use crate::macros::MacroTable;
use crate::pattern::{LogicalLiterals, Rule};
use crate::types::RuleKind;

/// Deepest conditional nesting the 64-bit mask can track.
pub const MAX_NESTING: u32 = 63;

#[derive(Debug, Clone)]
pub struct PreprocessorConfig {
    /// Include roots, searched in order.
    pub include_paths: Vec<PathBuf>,
    /// Object macros defined before the first line is read.
    pub defines: Vec<(String, String)>,
    pub logical: LogicalLiterals,
    /// Splices allowed per logical line.
    pub max_rewrites: usize,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            include_paths: vec![PathBuf::from(".")],
            defines: Vec::new(),
            logical: LogicalLiterals::default(),
            max_rewrites: 1024,
        }
    }
}

/// `#ifdef`/`#ifndef`/`#else`/`#end` bookkeeping.
///
/// Bit `b` of `mask` is set while nesting level `b` emits; the input is active only while
/// every bit is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionalState {
    level: u32,
    mask: u64,
}

impl Default for ConditionalState {
    fn default() -> Self {
        Self {
            level: 0,
            mask: u64::MAX,
        }
    }
}

impl ConditionalState {
    pub fn enter(&mut self, condition: bool) -> Result<(), SyntaxError> {
        if self.level >= MAX_NESTING {
            return Err(SyntaxError::new(1, "conditional nesting is too deep"));
        }
        self.level += 1;
        if !condition {
            self.mask &= !(1u64 << self.level);
        }
        Ok(())
    }

    pub fn flip(&mut self) -> Result<(), SyntaxError> {
        if self.level == 0 {
            return Err(SyntaxError::new(1, "else without matching if"));
        }
        self.mask ^= 1u64 << self.level;
        Ok(())
    }

    /// Closes the innermost block. Its bit is set again whatever branch was taken.
    pub fn leave(&mut self) -> Result<(), SyntaxError> {
        if self.level == 0 {
            return Err(SyntaxError::new(1, "end without matching if"));
        }
        self.mask |= 1u64 << self.level;
        self.level -= 1;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.mask == u64::MAX
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

/// Compiled rules in registration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleRegistry {
    pub anchored: Vec<Rule>,
    pub inline: Vec<Rule>,
}

impl RuleRegistry {
    pub fn register(&mut self, kind: RuleKind, rule: Rule) {
        match kind {
            RuleKind::Anchored => self.anchored.push(rule),
            RuleKind::Inline => self.inline.push(rule),
        }
    }
}

/// Everything a run accumulates. Included files share the context of their includer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Context {
    pub conditional: ConditionalState,
    pub macros: MacroTable,
    pub rules: RuleRegistry,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Macro tables and rule registries as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
