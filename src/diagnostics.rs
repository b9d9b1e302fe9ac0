//! The message sink through which warnings and errors are reported to the caller.
//!
//! Nothing in this crate prints. Problems which abort an operation are returned as a
//! [MathError](crate::MathError); problems which do not (such as an unrecognised MathML element)
//! are only visible through a [MessageSink] supplied by the caller.

use alloc::{string::String, vec::Vec};

use crate::error::{ErrorKind, Location};

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

/// A single reported problem.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Message {
    pub severity: Severity,
    pub kind: ErrorKind,
    pub location: Location,
    pub text: String,
}

impl Message {
    pub fn warning(kind: ErrorKind, location: Location, text: impl Into<String>) -> Message {
        Message { severity: Severity::Warning, kind, location, text: text.into() }
    }
}

/// Implemented by collectors of [Message]s.
pub trait MessageSink {
    fn record(&mut self, message: Message);
}

impl MessageSink for Vec<Message> {
    fn record(&mut self, message: Message) {
        self.push(message);
    }
}

/// A message sink which keeps every message, and can count them by severity.
#[derive(Default, Debug, Clone)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> MessageLog {
        MessageLog::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The number of messages with exactly the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.messages.iter().filter(|m| m.severity == severity).count()
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn fatals(&self) -> usize {
        self.count(Severity::Fatal)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl MessageSink for MessageLog {
    fn record(&mut self, message: Message) {
        self.messages.push(message);
    }
}
