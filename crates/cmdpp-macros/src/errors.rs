// crates/cmdpp-macros/src/errors.rs

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A malformed directive, pattern or line, located by column within its line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("column {column}: {message}")]
pub struct SyntaxError {
    /// One-based column.
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(column: usize, message: impl Into<String>) -> Self {
        Self {
            column,
            message: message.into(),
        }
    }

    /// Moves the column right by `offset`, for errors found in a slice of a longer line.
    pub fn shifted(mut self, offset: usize) -> Self {
        self.column += offset;
        self
    }

    pub fn at_line(self, line: usize) -> PreprocessError {
        PreprocessError::Syntax { line, error: self }
    }
}

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Syntax error at line {line}, {error}")]
    Syntax {
        line: usize,
        #[source]
        error: SyntaxError,
    },

    #[error("Error directive at line {line}: {message}")]
    Fatal { line: usize, message: String },

    #[error("Include file {path:?} does not exist or is not available (line {line})")]
    IncludeNotFound { line: usize, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl PreprocessError {
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        SyntaxError::new(column, message).at_line(line)
    }

    /// The input line the error was raised on, if it belongs to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            PreprocessError::Syntax { line, .. }
            | PreprocessError::Fatal { line, .. }
            | PreprocessError::IncludeNotFound { line, .. } => Some(*line),
            PreprocessError::Io(_) => None,
        }
    }
}

pub type PreprocessResult<T> = Result<T, PreprocessError>;
