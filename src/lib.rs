#![no_std]
extern crate alloc;

pub mod error;
pub mod diagnostics;
pub mod node;
pub mod number;
pub mod mathml;
pub mod document;

#[cfg(test)]
mod tests;

pub use crate::{
    error::{Arity, Location, MathError},
    diagnostics::{Message, MessageLog, MessageSink, Severity},
    node::{
        tree::{BinaryOperator, Constant, Node},
        function::{is_reserved_name, Builtin, FunctionName},
        parser::ParseSettings,
    },
    mathml::{Attribute, Event, EventSink, reader::{MathMLReader, ReaderSettings}, writer::{WriterSettings, XmlWriter}},
    document::{MathDocument, parse_formula, parse_formula_with, formula_to_string, read_mathml, write_mathml},
};

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
