//! Error type shared by the codec, the query parser and the store.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OmnidatError {
    /// A stored value token could not be parsed as a literal.
    #[error("{}cannot parse value {text:?} for key '{key}'", line_prefix(.line))]
    MalformedValue {
        key: String,
        text: String,
        /// 1-based line number, when the value came from a file.
        line: Option<usize>,
    },

    /// A command-line token does not fit the `KEY DELIM VALUE` grammar.
    #[error("malformed predicate {token:?}: {reason}")]
    MalformedPredicate { token: String, reason: String },

    #[error("projection key '{key}' must come before the first predicate")]
    MisplacedProjection { key: String },

    /// A field that no stored line can hold.
    #[error("cannot store field '{key}': {reason}")]
    UnstorableField { key: String, reason: &'static str },

    #[error("refusing to add an empty record")]
    EmptyRecord,

    #[error("unknown action '{0}' (expected list, add, trim or remove)")]
    UnknownAction(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn line_prefix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!("line {n}: "),
        None => String::new(),
    }
}

impl OmnidatError {
    /// Attach a line number to a decode error that does not have one yet.
    pub fn at_line(self, n: usize) -> Self {
        match self {
            OmnidatError::MalformedValue {
                key,
                text,
                line: None,
            } => OmnidatError::MalformedValue {
                key,
                text,
                line: Some(n),
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, OmnidatError>;
