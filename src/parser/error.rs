//! Error types for the music string parser.

use std::fmt;

use thiserror::Error;

/// An error that aborted a parse.
///
/// `position` is the character offset into the pattern where the failing
/// token (or the failing read inside it) starts.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{position}] {kind}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No rule matched, or a rule failed after consuming input.
    Grammar,
    UndefinedDictionaryKey,
    IncompatibleValueKind,
    UnsupportedRadix,
    ValueOutOfRange,
    /// A listener rejected an event.
    Listener,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Grammar => "grammar error",
            ErrorKind::UndefinedDictionaryKey => "undefined dictionary key",
            ErrorKind::IncompatibleValueKind => "incompatible value kind",
            ErrorKind::UnsupportedRadix => "unsupported radix",
            ErrorKind::ValueOutOfRange => "value out of range",
            ErrorKind::Listener => "listener error",
        };
        f.write_str(name)
    }
}

impl ParseError {
    pub fn grammar(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
            kind: ErrorKind::Grammar,
        }
    }

    pub fn unsupported_radix(radix: u32, position: usize) -> Self {
        Self {
            message: format!("radix {radix} is not supported, expected 10 or 16"),
            position,
            kind: ErrorKind::UnsupportedRadix,
        }
    }

    pub fn listener(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
            kind: ErrorKind::Listener,
        }
    }

    /// Attach a token position to an evaluation failure.
    pub fn from_eval(err: EvalError, position: usize) -> Self {
        let kind = match &err {
            EvalError::UndefinedKey(_) => ErrorKind::UndefinedDictionaryKey,
            EvalError::IncompatibleKind { .. } => ErrorKind::IncompatibleValueKind,
            EvalError::OutOfRange { .. } => ErrorKind::ValueOutOfRange,
        };
        Self {
            message: err.to_string(),
            position,
            kind,
        }
    }
}

/// Failure while evaluating an expression or validating an evaluated field.
///
/// Carries no position; the environment lifts it into a [`ParseError`] at the
/// position of the element being fired.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("'{0}' is not defined in the dictionary")]
    UndefinedKey(String),

    #[error("dictionary entry '{name}' holds {found}, which is not usable as {expected}")]
    IncompatibleKind {
        name: String,
        expected: &'static str,
        found: String,
    },

    #[error("{field} {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },
}

impl EvalError {
    pub fn out_of_range(
        field: &'static str,
        value: impl fmt::Display,
        min: impl fmt::Display,
        max: impl fmt::Display,
    ) -> Self {
        EvalError::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}
