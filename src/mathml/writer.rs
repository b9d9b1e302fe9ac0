//! Converts a [Node] tree into MathML.
//!
//! [write_node] walks the tree and emits [Event]s into any [EventSink]. Collecting them into a
//! `Vec<Event>` gives a stream which the [reader](super::reader) accepts directly; an
//! [XmlWriter] renders them as indented XML text instead.

use alloc::{string::{String, ToString}, vec, vec::Vec};

use crate::{
    node::{
        function::{Builtin, FunctionName},
        tree::{Constant, Node},
    },
    number,
};

use super::{
    Attribute, Event, EventSink, CSYMBOL_AVOGADRO_URL, CSYMBOL_DELAY_URL, MATHML_NAMESPACE,
};

/// Options for rendering MathML text with an [XmlWriter].
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct WriterSettings {
    /// Spaces per level of nesting.
    pub indent: usize,

    /// Whether to begin the output with `<?xml version="1.0" encoding="UTF-8"?>`.
    pub xml_declaration: bool,
}

impl Default for WriterSettings {
    fn default() -> Self {
        WriterSettings { indent: 2, xml_declaration: true }
    }
}

/// Emits a complete `math` element, containing `node` if there is one.
pub fn write_math<S: EventSink + ?Sized>(node: Option<&Node>, sink: &mut S) {
    sink.event(Event::start_with("math", vec![Attribute::new("xmlns", MATHML_NAMESPACE)]));
    if let Some(node) = node {
        write_node(node, sink);
    }
    sink.event(Event::end("math"));
}

/// Emits the elements for `node`, without a surrounding `math` element.
pub fn write_node<S: EventSink + ?Sized>(node: &Node, sink: &mut S) {
    match node {
        Node::Integer(n) => numeral(sink, Some("integer"), &[n.to_string()]),
        Node::Real(r) => numeral(sink, None, &[number::format_real(*r)]),
        Node::RealWithExponent { mantissa, exponent }
            => numeral(sink, Some("e-notation"), &[number::format_mantissa(*mantissa), exponent.to_string()]),
        Node::Rational { numerator, denominator }
            => numeral(sink, Some("rational"), &[numerator.to_string(), denominator.to_string()]),

        Node::Identifier(name) => text_element(sink, "ci", vec![], name),

        Node::Constant(constant) => match constant.mathml_element() {
            Some(element) => empty_element(sink, element),
            None => match constant {
                Constant::Avogadro => csymbol(sink, CSYMBOL_AVOGADRO_URL, "avogadro"),
                // The negative constants are written as `cn` text, which the reader recognises
                _ => numeral(sink, None, &[constant.name().into()]),
            },
        },

        Node::UnaryMinus(operand) => {
            sink.event(Event::start("apply"));
            empty_element(sink, "minus");
            write_node(operand, sink);
            sink.event(Event::end("apply"));
        }

        Node::BinaryOp(op, left, right) => {
            sink.event(Event::start("apply"));
            empty_element(sink, op.mathml_element());
            write_node(left, sink);
            write_node(right, sink);
            sink.event(Event::end("apply"));
        }

        Node::Function(FunctionName::Builtin(Builtin::Piecewise), args) => {
            sink.event(Event::start("piecewise"));
            for pair in args.chunks(2) {
                let element = if pair.len() == 2 { "piece" } else { "otherwise" };
                sink.event(Event::start(element));
                for arg in pair {
                    write_node(arg, sink);
                }
                sink.event(Event::end(element));
            }
            sink.event(Event::end("piecewise"));
        }

        Node::Function(name, args) => {
            sink.event(Event::start("apply"));

            let mut args = args.as_slice();
            match name {
                FunctionName::User(name) => text_element(sink, "ci", vec![], name),
                FunctionName::Builtin(Builtin::Delay) => csymbol(sink, CSYMBOL_DELAY_URL, "delay"),

                // A square root is a root without a degree
                FunctionName::Builtin(Builtin::Sqrt) => empty_element(sink, "root"),

                FunctionName::Builtin(builtin @ (Builtin::Root | Builtin::Log)) => {
                    empty_element(sink, builtin.name());

                    // The first of two arguments is the degree or base
                    if let [qualified, rest @ ..] = args {
                        if !rest.is_empty() {
                            let qualifier = if *builtin == Builtin::Root { "degree" } else { "logbase" };
                            sink.event(Event::start(qualifier));
                            write_node(qualified, sink);
                            sink.event(Event::end(qualifier));
                            args = rest;
                        }
                    }
                }

                FunctionName::Builtin(builtin) => empty_element(sink, builtin.name()),
            }

            for arg in args {
                write_node(arg, sink);
            }
            sink.event(Event::end("apply"));
        }
    }
}

fn empty_element<S: EventSink + ?Sized>(sink: &mut S, name: &str) {
    sink.event(Event::start(name));
    sink.event(Event::end(name));
}

/// Emits an element whose only content is `text`. The text is padded with a space either side,
/// which the reader trims.
fn text_element<S: EventSink + ?Sized>(sink: &mut S, name: &str, attributes: Vec<Attribute>, text: &str) {
    sink.event(Event::start_with(name, attributes));
    sink.event(Event::Text(pad(text)));
    sink.event(Event::end(name));
}

/// Emits a `cn`, with `parts` separated by `<sep/>`.
fn numeral<S: EventSink + ?Sized>(sink: &mut S, kind: Option<&str>, parts: &[String]) {
    let attributes = match kind {
        Some(kind) => vec![Attribute::new("type", kind)],
        None => vec![],
    };

    sink.event(Event::start_with("cn", attributes));
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            empty_element(sink, "sep");
        }
        sink.event(Event::Text(pad(part)));
    }
    sink.event(Event::end("cn"));
}

fn csymbol<S: EventSink + ?Sized>(sink: &mut S, url: &str, text: &str) {
    let attributes = vec![Attribute::new("encoding", "text"), Attribute::new("definitionURL", url)];
    text_element(sink, "csymbol", attributes, text);
}

fn pad(text: &str) -> String {
    let mut padded = String::with_capacity(text.len() + 2);
    padded.push(' ');
    padded.push_str(text);
    padded.push(' ');
    padded
}

/// An [EventSink] which renders events as XML text.
///
/// Elements are indented one level per nesting depth. An element with no content is written as
/// a self-closing tag. An element containing text is written on a single line, along with
/// everything inside it.
#[derive(Debug, Clone)]
pub struct XmlWriter {
    settings: WriterSettings,
    out: String,

    /// A start tag not yet written, since it may turn out to be self-closing.
    pending: Option<(String, Vec<Attribute>)>,

    /// The number of elements currently open in the output.
    depth: usize,

    /// If the output is in the middle of a single-line element, the depth inside that element.
    inline: Option<usize>,
}

impl XmlWriter {
    pub fn new() -> XmlWriter {
        Self::with_settings(WriterSettings::default())
    }

    pub fn with_settings(settings: WriterSettings) -> XmlWriter {
        let mut out = String::new();
        if settings.xml_declaration {
            out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        }

        XmlWriter { settings, out, pending: None, depth: 0, inline: None }
    }

    /// Returns the text written so far.
    pub fn into_string(mut self) -> String {
        self.flush_pending();
        self.out
    }

    fn indent(&mut self) {
        if self.inline.is_none() {
            for _ in 0..(self.depth * self.settings.indent) {
                self.out.push(' ');
            }
        }
    }

    fn newline(&mut self) {
        if self.inline.is_none() {
            self.out.push('\n');
        }
    }

    fn write_tag(&mut self, name: &str, attributes: &[Attribute], self_closing: bool) {
        self.out.push('<');
        self.out.push_str(name);
        for attribute in attributes {
            self.out.push(' ');
            self.out.push_str(&attribute.name);
            self.out.push_str("=\"");
            escape_into(&mut self.out, &attribute.value, true);
            self.out.push('"');
        }
        self.out.push_str(if self_closing { "/>" } else { ">" });
    }

    /// Writes the pending start tag, if there is one, as an element with content.
    fn flush_pending(&mut self) {
        if let Some((name, attributes)) = self.pending.take() {
            self.indent();
            self.write_tag(&name, &attributes, false);
            self.newline();
            self.depth += 1;
        }
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for XmlWriter {
    fn event(&mut self, event: Event) {
        match event {
            Event::Start { name, attributes } => {
                self.flush_pending();
                self.pending = Some((name, attributes));
            }

            Event::Text(text) => {
                // Text switches the innermost element to single-line output
                if let Some((name, attributes)) = self.pending.take() {
                    self.indent();
                    self.write_tag(&name, &attributes, false);
                    self.depth += 1;
                } else {
                    self.indent();
                }
                if self.inline.is_none() {
                    self.inline = Some(self.depth);
                }
                escape_into(&mut self.out, &text, false);
            }

            Event::End { name } => {
                if let Some((pending, attributes)) = self.pending.take() {
                    self.indent();
                    self.write_tag(&pending, &attributes, true);
                    self.newline();
                    return;
                }

                let closes_inline = self.inline == Some(self.depth);
                self.depth = self.depth.saturating_sub(1);
                self.indent();
                self.out.push_str("</");
                self.out.push_str(&name);
                self.out.push('>');
                if closes_inline {
                    self.inline = None;
                }
                self.newline();
            }
        }
    }
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
