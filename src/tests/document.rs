use alloc::string::ToString;

use crate::{
    error::ErrorKind, read_mathml, write_mathml, Arity, Location, MathDocument, MathError, Message,
    MessageLog, MessageSink, Severity,
};

use super::util::xml;

#[test]
fn test_replacing_math() {
    let mut document = MathDocument::new();
    assert_eq!(document.math(), None);

    assert_eq!(document.set_math(parse!("x + 1")), None);
    assert_eq!(document.set_math(parse!("y")), Some(parse!("x + 1")));
    assert_eq!(document.math(), Some(&ident!(y)));

    assert_eq!(document.take_math(), Some(ident!(y)));
    assert_eq!(document.take_math(), None);
}

#[test]
fn test_formula_conversions() {
    let document = MathDocument::from_formula("a*(b+c)").unwrap();
    assert_eq!(document.to_formula().as_deref(), Some("a * (b + c)"));
    assert_eq!(MathDocument::new().to_formula(), None);

    assert!(matches!(MathDocument::from_formula("a +"), Err(MathError::Syntax { .. })));
}

#[test]
fn test_mathml_conversions() {
    let document = MathDocument::with_math(parse!("sin(x) / 2"));
    let text = document.to_mathml();
    assert_eq!(text, write_mathml(&document));

    let mut log = MessageLog::new();
    assert_eq!(read_mathml(xml(&text), &mut log), Ok(document));
    assert!(log.is_empty());

    let empty = write_mathml(&MathDocument::new());
    assert_eq!(read_mathml(xml(&empty), &mut log), Ok(MathDocument::new()));
}

#[test]
fn test_messages_can_go_to_a_vec() {
    let mut messages: alloc::vec::Vec<Message> = alloc::vec![];
    let result = read_mathml(xml("<math><foo/><ci>x</ci></math>"), &mut messages);

    assert_eq!(result.map(|mut d| d.take_math()), Ok(Some(ident!(x))));
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].severity, Severity::Warning);
}

#[test]
fn test_message_log() {
    let mut log = MessageLog::new();
    log.record(Message::warning(ErrorKind::Structure, Location::Element("/math".into()), "a"));
    log.record(MathError::syntax(3, "an operand").to_message());
    log.record(MathError::structure("/math", "b").to_message());

    assert_eq!(log.warnings(), 1);
    assert_eq!(log.errors(), 1);
    assert_eq!(log.fatals(), 1);
    assert_eq!(log.messages()[1].location, Location::Offset(3));
    assert_eq!(log.messages()[1].text, "syntax error at offset 3: expected an operand");

    log.clear();
    assert!(log.is_empty());
}

#[test]
fn test_error_details() {
    assert_eq!(Arity::exactly(2).to_string(), "2");
    assert_eq!(Arity::between(1, 2).to_string(), "1 to 2");
    assert_eq!(Arity::at_least(2).to_string(), "2 or more");
    assert!(Arity::at_least(2).accepts(10));
    assert!(!Arity::between(1, 2).accepts(0));

    let error = MathError::structure("/math/apply", "<apply> has no operator");
    assert_eq!(error.to_string(), "malformed MathML at /math/apply: <apply> has no operator");
    assert_eq!(error.severity(), Severity::Fatal);
    assert_eq!(error.kind(), ErrorKind::Structure);

    let error = MathError::Lexical { character: '#', offset: 4 };
    assert_eq!(error.to_string(), "unrecognised character '#' at offset 4");
    assert_eq!(error.severity(), Severity::Error);
    assert_eq!(error.location(), Location::Offset(4));
}
