use alloc::string::String;
use core::fmt;
use thiserror::Error;

use crate::diagnostics::{Message, Severity};

/// The range of argument counts accepted by a function or operator.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct Arity {
    pub min: usize,

    /// `None` if any number of arguments above `min` is accepted.
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(count: usize) -> Arity {
        Arity { min: count, max: Some(count) }
    }

    pub const fn at_least(min: usize) -> Arity {
        Arity { min, max: None }
    }

    pub const fn between(min: usize, max: usize) -> Arity {
        Arity { min, max: Some(max) }
    }

    /// Returns true if a call with `count` arguments satisfies this arity.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", max),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "{} or more", self.min),
        }
    }
}

/// Where in the input a problem was found. Infix text is located by byte offset, MathML by the
/// path of open elements.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Location {
    Offset(usize),
    Element(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Location::Offset(offset) => write!(f, "offset {}", offset),
            Location::Element(path) => write!(f, "element {}", path),
        }
    }
}

/// The broad class of a [MathError], used when reporting to a [crate::MessageSink].
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Arity,
    Structure,
}

#[derive(PartialEq, Eq, Debug, Clone, Error)]
pub enum MathError {
    /// A character which cannot begin or continue any token.
    #[error("unrecognised character {character:?} at offset {offset}")]
    Lexical { character: char, offset: usize },

    /// A malformed token sequence: unmatched parenthesis, missing operand, trailing tokens.
    #[error("syntax error at offset {offset}: expected {expected}")]
    Syntax { offset: usize, expected: String },

    /// A function or operator was given a number of arguments outside its declared range.
    #[error("{function} expects {expected} argument(s) but was given {actual}, at {location}")]
    Arity { function: String, expected: Arity, actual: usize, location: Location },

    /// Malformed nesting or content in a MathML event stream.
    #[error("malformed MathML at {path}: {message}")]
    Structure { path: String, message: String },
}

impl MathError {
    pub fn syntax(offset: usize, expected: impl Into<String>) -> MathError {
        MathError::Syntax { offset, expected: expected.into() }
    }

    pub fn structure(path: impl Into<String>, message: impl Into<String>) -> MathError {
        MathError::Structure { path: path.into(), message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MathError::Lexical { .. } => ErrorKind::Lexical,
            MathError::Syntax { .. } => ErrorKind::Syntax,
            MathError::Arity { .. } => ErrorKind::Arity,
            MathError::Structure { .. } => ErrorKind::Structure,
        }
    }

    /// The severity this error is reported with. Structural errors abort a MathML read, so they
    /// are fatal; everything else is an ordinary error which the caller may choose to tolerate.
    pub fn severity(&self) -> Severity {
        match self {
            MathError::Structure { .. } => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            MathError::Lexical { offset, .. } | MathError::Syntax { offset, .. }
                => Location::Offset(*offset),
            MathError::Arity { location, .. } => location.clone(),
            MathError::Structure { path, .. } => Location::Element(path.clone()),
        }
    }

    /// Converts this error into a message suitable for a [crate::MessageSink].
    pub fn to_message(&self) -> Message {
        use alloc::string::ToString;

        Message {
            severity: self.severity(),
            kind: self.kind(),
            location: self.location(),
            text: self.to_string(),
        }
    }
}

/// A function was built with the wrong number of arguments. This has no location yet; callers
/// attach one with [ArityMismatch::at] once they know where the call came from.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ArityMismatch {
    pub function: String,
    pub expected: Arity,
    pub actual: usize,
}

impl ArityMismatch {
    pub fn at(self, location: Location) -> MathError {
        MathError::Arity {
            function: self.function,
            expected: self.expected,
            actual: self.actual,
            location,
        }
    }
}
