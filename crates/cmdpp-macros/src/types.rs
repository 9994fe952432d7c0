// crates/cmdpp-macros/src/types.rs

use serde::Serialize;

/// One line after continuation joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Number of the last physical line that contributed to `text`.
    pub number: usize,
    pub text: String,
}

/// The preprocessor directives, as named after the leading `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Command,
    Define,
    Else,
    End,
    Error,
    Ifdef,
    Ifndef,
    Include,
    Stdout,
    Translate,
    Undef,
    XCommand,
    XTranslate,
}

impl Directive {
    pub fn from_name(name: &str) -> Option<Self> {
        let directive = match name {
            "command" => Directive::Command,
            "define" => Directive::Define,
            "else" => Directive::Else,
            "end" => Directive::End,
            "error" => Directive::Error,
            "ifdef" => Directive::Ifdef,
            "ifndef" => Directive::Ifndef,
            "include" => Directive::Include,
            "stdout" => Directive::Stdout,
            "translate" => Directive::Translate,
            "undef" => Directive::Undef,
            "xcommand" => Directive::XCommand,
            "xtranslate" => Directive::XTranslate,
            _ => return None,
        };
        Some(directive)
    }

    /// Conditional directives run even inside inactive branches.
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            Directive::Ifdef | Directive::Ifndef | Directive::Else | Directive::End
        )
    }
}

/// Which registry a rule goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Tried only at the start of a line; must consume the whole line.
    Anchored,
    /// Tried at every token boundary.
    Inline,
}

impl Directive {
    /// Registry and abbreviation flag for the four rule directives.
    ///
    /// Abbreviated keywords are accepted for `command` and `translate`, not for the `x` forms.
    pub fn rule_kind(self) -> Option<(RuleKind, bool)> {
        match self {
            Directive::Command => Some((RuleKind::Anchored, true)),
            Directive::XCommand => Some((RuleKind::Anchored, false)),
            Directive::Translate => Some((RuleKind::Inline, true)),
            Directive::XTranslate => Some((RuleKind::Inline, false)),
            _ => None,
        }
    }
}
