use alloc::{boxed::Box, string::String, vec, vec::Vec};

use crate::{
    error::{Arity, ArityMismatch, Location, MathError},
    node::{
        function::{lookup_callable, Callee, FunctionName},
        tokenizer::{Token, TokenKind, Tokenizer},
        tree::{BinaryOperator, Constant, Node},
    },
};

/// Options for parsing infix text.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ParseSettings {
    /// The deepest nesting of parentheses, unary minuses and powers accepted before parsing
    /// fails. Bounds the parser's recursion.
    pub max_depth: usize,

    /// The deepest tree, as measured by [Node::depth], which parsing may produce. A chain such
    /// as `a + b + c` nests to the left without any recursion in the parser, so this is limited
    /// separately. Bounds the recursion of everything which later walks the tree.
    pub max_tree_depth: usize,
}

impl Default for ParseSettings {
    fn default() -> Self {
        ParseSettings { max_depth: 256, max_tree_depth: 1024 }
    }
}

/// Converts infix text into a [Node] tree.
///
/// Precedence, from loosest to tightest: binary `+` and `-`, then `*` and `/` (all
/// left-associative), then `^` (right-associative), then unary minus, then parentheses and
/// function calls.
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    current: Token,
    depth: usize,
    settings: &'a ParseSettings,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, settings: &'a ParseSettings) -> Result<Parser<'a>, MathError> {
        let mut tokenizer = Tokenizer::new(input);
        let current = tokenizer.next_token()?;
        Ok(Parser { tokenizer, current, depth: 0, settings })
    }

    pub fn parse(&mut self) -> Result<Node, MathError> {
        let result = self.parse_level1()?;

        // Leftover tokens is an error
        if self.current.kind != TokenKind::End {
            Err(MathError::syntax(self.current.start, "an operator or the end of the formula"))
        } else {
            Ok(result)
        }
    }

    /// Moves on to the next token, returning the one which was current.
    fn advance(&mut self) -> Result<Token, MathError> {
        let next = self.tokenizer.next_token()?;
        Ok(core::mem::replace(&mut self.current, next))
    }

    /// Returns the token after the current one, without consuming anything.
    fn peek_next(&self) -> Result<Token, MathError> {
        self.tokenizer.clone().next_token()
    }

    fn expect(&mut self, kind: TokenKind, description: &str) -> Result<Token, MathError> {
        if self.current.kind == kind {
            self.advance()
        } else {
            Err(MathError::syntax(self.current.start, description))
        }
    }

    /// Runs `f` one level deeper, failing if that exceeds the configured maximum depth.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, MathError>) -> Result<T, MathError> {
        if self.depth >= self.settings.max_depth {
            return Err(MathError::syntax(self.current.start, "a less deeply nested expression"));
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Fails if a tree of depth `depth`, built by the operator at `offset`, is deeper than the
    /// configured maximum.
    fn check_tree_depth(&self, depth: usize, offset: usize) -> Result<(), MathError> {
        if depth > self.settings.max_tree_depth {
            Err(MathError::syntax(offset, "a shallower expression tree"))
        } else {
            Ok(())
        }
    }

    /// Like [Self::check_tree_depth], but measures `node` and passes it through.
    fn limit_tree_depth(&self, node: Node, offset: usize) -> Result<Node, MathError> {
        self.check_tree_depth(node.depth(), offset)?;
        Ok(node)
    }

    /// Addition and subtraction.
    fn parse_level1(&mut self) -> Result<Node, MathError> {
        let mut out = self.parse_level2()?;
        let mut depth = out.depth();

        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOperator::Plus,
                TokenKind::Minus => BinaryOperator::Minus,
                _ => break,
            };
            let offset = self.advance()?.start;

            let right = self.parse_level2()?;
            depth = 1 + depth.max(right.depth());
            self.check_tree_depth(depth, offset)?;
            out = Node::binary(op, out, right);
        }

        Ok(out)
    }

    /// Multiplication and division. A `/` is always a division here; rational literals are
    /// written in parentheses, and recognised by [Self::parse_rational].
    fn parse_level2(&mut self) -> Result<Node, MathError> {
        let mut out = self.parse_level3()?;
        let mut depth = out.depth();

        loop {
            let op = match self.current.kind {
                TokenKind::Times => BinaryOperator::Times,
                TokenKind::Divide => BinaryOperator::Divide,
                _ => break,
            };
            let offset = self.advance()?.start;

            let right = self.parse_level3()?;
            depth = 1 + depth.max(right.depth());
            self.check_tree_depth(depth, offset)?;
            out = Node::binary(op, out, right);
        }

        Ok(out)
    }

    /// Powers. The exponent is parsed by recursing into this level again, which makes `^`
    /// right-associative.
    fn parse_level3(&mut self) -> Result<Node, MathError> {
        let base = self.parse_unary()?;

        if self.current.kind == TokenKind::Power {
            let offset = self.advance()?.start;
            let exponent = self.nested(|p| p.parse_level3())?;
            self.limit_tree_depth(Node::binary(BinaryOperator::Power, base, exponent), offset)
        } else {
            Ok(base)
        }
    }

    fn parse_unary(&mut self) -> Result<Node, MathError> {
        match self.current.kind {
            TokenKind::Minus => {
                let offset = self.advance()?.start;

                // A minus sign directly on a literal becomes part of the literal, so -3 is the
                // integer -3 rather than a negation of 3
                if self.at_literal()? {
                    self.parse_literal(true)
                } else {
                    let operand = self.nested(|p| p.parse_unary())?;
                    self.limit_tree_depth(Node::UnaryMinus(Box::new(operand)), offset)
                }
            }

            TokenKind::Plus => Err(MathError::syntax(self.current.start, "an operand")),

            _ => self.parse_primary(),
        }
    }

    /// Returns true if the current token begins a literal which a leading minus sign can be
    /// folded into: a numeral, or `INF` when it is not being called as a function.
    fn at_literal(&self) -> Result<bool, MathError> {
        Ok(match &self.current.kind {
            kind if kind.is_numeral() => true,
            TokenKind::Name(name) if Constant::from_name(name) == Some(Constant::PositiveInfinity)
                => self.peek_next()?.kind != TokenKind::LeftParenthesis,
            _ => false,
        })
    }

    fn parse_primary(&mut self) -> Result<Node, MathError> {
        if self.at_literal()? {
            return self.parse_literal(false);
        }

        match self.current.kind {
            TokenKind::LeftParenthesis => {
                if let Some(rational) = self.parse_rational()? {
                    return Ok(rational);
                }

                self.advance()?;
                let inner = self.nested(|p| p.parse_level1())?;
                self.expect(TokenKind::RightParenthesis, "')'")?;
                Ok(inner)
            }

            TokenKind::Name(_) => {
                let name_token = self.advance()?;
                let name = match name_token.kind {
                    TokenKind::Name(name) => name,
                    _ => unreachable!(),
                };

                // A name followed by parentheses is always a call, never an implicit
                // multiplication
                if self.current.kind == TokenKind::LeftParenthesis {
                    let arguments = self.nested(|p| p.parse_arguments())?;
                    let call = self.call(name, arguments, name_token.start)?;
                    self.limit_tree_depth(call, name_token.start)
                } else if let Some(constant) = Constant::from_name(&name) {
                    Ok(Node::Constant(constant))
                } else {
                    Ok(Node::Identifier(name))
                }
            }

            _ => Err(MathError::syntax(self.current.start, "an operand")),
        }
    }

    /// Parses a parenthesised, comma-separated argument list. The current token must be the
    /// opening parenthesis.
    fn parse_arguments(&mut self) -> Result<Vec<Node>, MathError> {
        self.expect(TokenKind::LeftParenthesis, "'('")?;

        let mut arguments = vec![];
        if self.current.kind == TokenKind::RightParenthesis {
            self.advance()?;
            return Ok(arguments);
        }

        loop {
            arguments.push(self.parse_level1()?);

            match self.current.kind {
                TokenKind::Comma => { self.advance()?; },
                TokenKind::RightParenthesis => {
                    self.advance()?;
                    return Ok(arguments);
                },
                _ => return Err(MathError::syntax(self.current.start, "',' or ')'")),
            }
        }
    }

    /// Builds the node for a call to `name`, found at `offset`.
    fn call(&self, name: String, arguments: Vec<Node>, offset: usize) -> Result<Node, MathError> {
        match lookup_callable(&name) {
            Some(Callee::Operator(op)) => {
                if arguments.len() != 2 {
                    return Err(ArityMismatch {
                        function: name,
                        expected: Arity::exactly(2),
                        actual: arguments.len(),
                    }.at(Location::Offset(offset)));
                }

                let mut arguments = arguments.into_iter();
                match (arguments.next(), arguments.next()) {
                    (Some(left), Some(right)) => Ok(Node::binary(op, left, right)),
                    _ => unreachable!(),
                }
            }

            Some(Callee::Function(builtin)) => Node::function(FunctionName::Builtin(builtin), arguments)
                .map_err(|e| e.at(Location::Offset(offset))),

            None => Node::function(FunctionName::User(name), arguments)
                .map_err(|e| e.at(Location::Offset(offset))),
        }
    }

    /// Parses a numeric literal, or `INF`. If `negative` is true, a minus sign has already been
    /// consumed and is folded into the literal.
    fn parse_literal(&mut self, negative: bool) -> Result<Node, MathError> {
        let token = self.advance()?;

        match token.kind {
            TokenKind::Integer(magnitude) => {
                if negative && magnitude == 0 {
                    Ok(Node::Constant(Constant::NegativeZero))
                } else {
                    Ok(Node::Integer(signed_integer(magnitude, negative, token.start)?))
                }
            }

            TokenKind::Real(value) => Ok(Node::real(if negative { -value } else { value })),

            TokenKind::RealWithExponent { mantissa, exponent } => Ok(Node::RealWithExponent {
                mantissa: if negative { -mantissa } else { mantissa },
                exponent,
            }),

            TokenKind::Name(_) => Ok(Node::Constant(if negative {
                Constant::NegativeInfinity
            } else {
                Constant::PositiveInfinity
            })),

            _ => Err(MathError::syntax(token.start, "a number")),
        }
    }

    /// Parses a rational literal, written as `(n/d)` or `(-n/d)` with no whitespace anywhere
    /// inside. The current token must be the opening parenthesis. Returns `None`, consuming
    /// nothing, if the parenthesis starts anything else.
    fn parse_rational(&mut self) -> Result<Option<Node>, MathError> {
        let mut lookahead = self.tokenizer.clone();
        let mut end = self.current.end;

        let mut token = adjacent_token(&mut lookahead, &mut end);
        let negative = matches!(token, Some(Token { kind: TokenKind::Minus, .. }));
        if negative {
            token = adjacent_token(&mut lookahead, &mut end);
        }

        let (numerator, numerator_start) = match token {
            Some(Token { kind: TokenKind::Integer(n), start, .. }) => (n, start),
            _ => return Ok(None),
        };
        if !matches!(adjacent_token(&mut lookahead, &mut end), Some(Token { kind: TokenKind::Divide, .. })) {
            return Ok(None);
        }
        let (denominator, denominator_start) = match adjacent_token(&mut lookahead, &mut end) {
            Some(Token { kind: TokenKind::Integer(d), start, .. }) => (d, start),
            _ => return Ok(None),
        };
        if !matches!(adjacent_token(&mut lookahead, &mut end), Some(Token { kind: TokenKind::RightParenthesis, .. })) {
            return Ok(None);
        }

        let numerator = signed_integer(numerator, negative, numerator_start)?;
        let denominator = signed_integer(denominator, false, denominator_start)?;

        // Everything up to the closing parenthesis is consumed
        self.current = lookahead.next_token()?;
        self.tokenizer = lookahead;

        let rational = Node::Rational { numerator, denominator };
        if negative && numerator == 0 {
            // (-0/n) has nowhere to keep its sign, so it stays an explicit negation
            Ok(Some(Node::negate(rational)))
        } else {
            Ok(Some(rational))
        }
    }
}

/// Reads the next token from `tokens`, if it begins exactly at `end` and is not an error, and
/// moves `end` past it.
fn adjacent_token(tokens: &mut Tokenizer, end: &mut usize) -> Option<Token> {
    let token = tokens.next_token().ok()?;
    if token.start != *end {
        return None;
    }
    *end = token.end;
    Some(token)
}

/// Applies a sign to an integer magnitude, failing if the result does not fit in an `i64`.
fn signed_integer(magnitude: u64, negative: bool, offset: usize) -> Result<i64, MathError> {
    let result = if negative {
        if magnitude == i64::MIN.unsigned_abs() {
            Some(i64::MIN)
        } else {
            i64::try_from(magnitude).ok().map(|m| -m)
        }
    } else {
        i64::try_from(magnitude).ok()
    };

    result.ok_or_else(|| MathError::syntax(offset, "an integer that fits in 64 bits"))
}
