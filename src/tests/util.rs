use alloc::{vec, vec::Vec};

use crate::{Attribute, Event, MathError, MessageLog, Node};

macro_rules! int {
    ($n:expr) => { crate::Node::Integer($n) };
}

macro_rules! real {
    ($r:expr) => { crate::Node::Real($r) };
}

macro_rules! ident {
    ($name:ident) => { crate::Node::identifier(stringify!($name)) };
}

macro_rules! constant {
    ($c:ident) => { crate::Node::Constant(crate::Constant::$c) };
}

macro_rules! neg {
    ($x:expr) => { crate::Node::negate($x) };
}

macro_rules! bin {
    ($op:ident, $l:expr, $r:expr $(,)?) => { crate::Node::binary(crate::BinaryOperator::$op, $l, $r) };
}

macro_rules! func {
    ($f:ident $(, $arg:expr)* $(,)?) => {
        crate::Node::Function(
            crate::FunctionName::Builtin(crate::Builtin::$f),
            alloc::vec![ $($arg),* ],
        )
    };
}

macro_rules! parse {
    ($s:expr) => { crate::parse_formula($s).unwrap() };
}

/// Splits a small XML snippet into reader events. Handles only what the tests need: tags with
/// double-quoted attributes, self-closing tags, an XML declaration, and text without entities.
/// Whitespace-only text is dropped.
pub fn xml(source: &str) -> Vec<Event> {
    let mut events = vec![];
    let mut rest = source;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('<') {
            let close = after.find('>').unwrap();
            let tag = &after[..close];
            rest = &after[close + 1..];

            if tag.starts_with('?') {
                continue;
            }
            if let Some(name) = tag.strip_prefix('/') {
                events.push(Event::end(name.trim()));
                continue;
            }

            let (tag, self_closing) = match tag.strip_suffix('/') {
                Some(tag) => (tag, true),
                None => (tag, false),
            };
            let tag = tag.trim();
            let (name, mut attributes_text) = match tag.find(char::is_whitespace) {
                Some(space) => (&tag[..space], tag[space..].trim()),
                None => (tag, ""),
            };

            let mut attributes = vec![];
            while let Some(equals) = attributes_text.find('=') {
                let attribute_name = attributes_text[..equals].trim();
                let value_start = equals + attributes_text[equals..].find('"').unwrap() + 1;
                let value_end = value_start + attributes_text[value_start..].find('"').unwrap();
                attributes.push(Attribute::new(attribute_name, &attributes_text[value_start..value_end]));
                attributes_text = attributes_text[value_end + 1..].trim();
            }

            events.push(Event::start_with(name, attributes));
            if self_closing {
                events.push(Event::end(name));
            }
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            if !rest[..end].trim().is_empty() {
                events.push(Event::text(&rest[..end]));
            }
            rest = &rest[end..];
        }
    }

    events
}

/// Reads an XML snippet, returning the result along with every message recorded.
pub fn read(source: &str) -> (Result<Option<Node>, MathError>, MessageLog) {
    let mut log = MessageLog::new();
    let result = crate::read_mathml(xml(source), &mut log).map(|mut doc| doc.take_math());
    (result, log)
}

/// Reads an XML snippet which must produce an expression without any messages.
pub fn read_ok(source: &str) -> Node {
    let (result, log) = read(source);
    assert!(log.is_empty(), "unexpected messages: {:?}", log.messages());
    result.unwrap().unwrap()
}
