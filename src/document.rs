//! A container for a single expression, and the crate's top-level conversions between infix
//! text, trees, and MathML.

use alloc::string::String;

use crate::{
    diagnostics::MessageSink,
    error::MathError,
    mathml::{
        reader::MathMLReader,
        writer::{write_math, XmlWriter},
        Event,
    },
    node::{
        format,
        parser::{ParseSettings, Parser},
        tree::Node,
    },
};

/// Owns at most one expression tree, such as the `math` of an SBML rule or kinetic law.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct MathDocument {
    math: Option<Node>,
}

impl MathDocument {
    pub fn new() -> MathDocument {
        MathDocument::default()
    }

    pub fn with_math(math: Node) -> MathDocument {
        MathDocument { math: Some(math) }
    }

    /// Parses infix text into a new document.
    pub fn from_formula(formula: &str) -> Result<MathDocument, MathError> {
        parse_formula(formula).map(MathDocument::with_math)
    }

    pub fn math(&self) -> Option<&Node> {
        self.math.as_ref()
    }

    /// Installs a new tree, handing back the one it replaces.
    pub fn set_math(&mut self, math: Node) -> Option<Node> {
        self.math.replace(math)
    }

    pub fn take_math(&mut self) -> Option<Node> {
        self.math.take()
    }

    /// The document's expression as infix text, if it has one.
    pub fn to_formula(&self) -> Option<String> {
        self.math.as_ref().map(formula_to_string)
    }

    pub fn to_mathml(&self) -> String {
        write_mathml(self)
    }
}

pub fn parse_formula(formula: &str) -> Result<Node, MathError> {
    parse_formula_with(formula, &ParseSettings::default())
}

pub fn parse_formula_with(formula: &str, settings: &ParseSettings) -> Result<Node, MathError> {
    log::trace!("parsing formula {:?}", formula);
    Parser::new(formula, settings)?.parse()
}

pub fn formula_to_string(node: &Node) -> String {
    format::format(node)
}

/// Reads a MathML document from a stream of events. Warnings and errors are recorded in `sink`.
pub fn read_mathml<I>(events: I, sink: &mut dyn MessageSink) -> Result<MathDocument, MathError>
where
    I: IntoIterator<Item = Event>,
{
    let mut reader = MathMLReader::new(sink);
    for event in events {
        reader.event(event)?;
    }

    Ok(MathDocument { math: reader.finish()? })
}

/// Renders a document as MathML text, with the default [WriterSettings](crate::WriterSettings).
pub fn write_mathml(document: &MathDocument) -> String {
    let mut writer = XmlWriter::new();
    write_math(document.math(), &mut writer);
    writer.into_string()
}
