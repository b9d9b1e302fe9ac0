use alloc::{string::String, vec, vec::Vec};

use crate::{node::tokenizer::{Token, TokenKind, Tokenizer}, MathError};

fn kinds(source: &str) -> Vec<TokenKind> {
    Tokenizer::new(source).map(|t| t.unwrap().kind).collect()
}

#[test]
fn test_operators_and_names() {
    assert_eq!(
        kinds("1 + x*2 - f(a_1, b) / 3 ^ 2"),
        vec![
            TokenKind::Integer(1), TokenKind::Plus, TokenKind::Name("x".into()), TokenKind::Times,
            TokenKind::Integer(2), TokenKind::Minus, TokenKind::Name("f".into()),
            TokenKind::LeftParenthesis, TokenKind::Name("a_1".into()), TokenKind::Comma,
            TokenKind::Name("b".into()), TokenKind::RightParenthesis, TokenKind::Divide,
            TokenKind::Integer(3), TokenKind::Power, TokenKind::Integer(2), TokenKind::End,
        ]
    );
}

#[test]
fn test_numerals() {
    assert_eq!(kinds("3.5"), vec![TokenKind::Real(3.5), TokenKind::End]);
    assert_eq!(kinds(".5"), vec![TokenKind::Real(0.5), TokenKind::End]);
    assert_eq!(kinds("3."), vec![TokenKind::Real(3.0), TokenKind::End]);
    assert_eq!(
        kinds("1e3"),
        vec![TokenKind::RealWithExponent { mantissa: 1.0, exponent: 3 }, TokenKind::End],
    );
    assert_eq!(
        kinds("2.5E-2"),
        vec![TokenKind::RealWithExponent { mantissa: 2.5, exponent: -2 }, TokenKind::End],
    );
    assert_eq!(
        kinds("18446744073709551615"),
        vec![TokenKind::Integer(u64::MAX), TokenKind::End],
    );

    // The sign is never part of a numeral
    assert_eq!(kinds("-4"), vec![TokenKind::Minus, TokenKind::Integer(4), TokenKind::End]);
}

#[test]
fn test_offsets() {
    let tokens: Vec<Token> = Tokenizer::new("ab + 12").map(Result::unwrap).collect();
    assert_eq!(
        tokens,
        vec![
            Token { kind: TokenKind::Name(String::from("ab")), start: 0, end: 2 },
            Token { kind: TokenKind::Plus, start: 3, end: 4 },
            Token { kind: TokenKind::Integer(12), start: 5, end: 7 },
            Token { kind: TokenKind::End, start: 7, end: 7 },
        ]
    );
}

#[test]
fn test_end_repeats() {
    let mut tokenizer = Tokenizer::new(" ");
    assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::End);
    assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::End);
}

#[test]
fn test_errors() {
    assert_eq!(
        Tokenizer::new("1 $ 2").nth(1),
        Some(Err(MathError::Lexical { character: '$', offset: 2 })),
    );
    assert_eq!(
        Tokenizer::new("é").next(),
        Some(Err(MathError::Lexical { character: 'é', offset: 0 })),
    );
    assert_eq!(
        Tokenizer::new("1e+x").next(),
        Some(Err(MathError::Lexical { character: 'x', offset: 3 })),
    );
    assert!(matches!(
        Tokenizer::new("1e").next(),
        Some(Err(MathError::Syntax { offset: 2, .. })),
    ));
    assert!(matches!(
        Tokenizer::new("99999999999999999999").next(),
        Some(Err(MathError::Syntax { offset: 0, .. })),
    ));
}

#[test]
fn test_iteration_stops_after_error() {
    let results: Vec<_> = Tokenizer::new("1 $ 2").collect();
    assert_eq!(results.len(), 2);
    assert!(results[1].is_err());
}
