//! MathML, the XML notation used for expressions inside SBML documents.
//!
//! This crate does not tokenize XML itself. The [reader] consumes a stream of [Event]s which a
//! caller produces with the XML parser of its choice, and the [writer] emits the same kind of
//! events, either collected into a `Vec<Event>` or rendered as text by an
//! [XmlWriter](writer::XmlWriter).

use alloc::{string::String, vec::Vec};

pub mod reader;
pub mod writer;

/// The namespace of MathML 2.0, declared on the root `math` element.
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

/// `definitionURL`s of the SBML `csymbol`s.
pub const CSYMBOL_TIME_URL: &str = "http://www.sbml.org/sbml/symbols/time";
pub const CSYMBOL_DELAY_URL: &str = "http://www.sbml.org/sbml/symbols/delay";
pub const CSYMBOL_AVOGADRO_URL: &str = "http://www.sbml.org/sbml/symbols/avogadro";

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Attribute {
        Attribute { name: name.into(), value: value.into() }
    }
}

/// One step of a parsed XML document, as far as MathML is concerned.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Event {
    Start { name: String, attributes: Vec<Attribute> },
    End { name: String },
    Text(String),
}

impl Event {
    pub fn start(name: impl Into<String>) -> Event {
        Event::Start { name: name.into(), attributes: Vec::new() }
    }

    pub fn start_with(name: impl Into<String>, attributes: Vec<Attribute>) -> Event {
        Event::Start { name: name.into(), attributes }
    }

    pub fn end(name: impl Into<String>) -> Event {
        Event::End { name: name.into() }
    }

    pub fn text(text: impl Into<String>) -> Event {
        Event::Text(text.into())
    }
}

/// Implemented by consumers of the [Event]s produced by the [writer].
pub trait EventSink {
    fn event(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn event(&mut self, event: Event) {
        self.push(event);
    }
}

/// Strips any namespace prefix from an element or attribute name, so `m:apply` becomes `apply`.
pub fn local_name(name: &str) -> &str {
    match name.rsplit_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

/// Looks up an attribute by local name.
pub fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| local_name(&a.name) == name)
        .map(|a| a.value.as_str())
}
