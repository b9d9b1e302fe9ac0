//! The definition of the expression tree itself.

use alloc::{boxed::Box, string::String, vec, vec::Vec};
use core::mem;

use crate::error::ArityMismatch;

use super::function::FunctionName;

/// Operator precedence, where a higher value binds more tightly.
pub type Precedence = u8;

/// The precedence of unary minus. This is tighter than every binary operator, including `^`, so
/// `-x ^ 2` is `(-x) ^ 2`.
pub const UNARY_PRECEDENCE: Precedence = 4;

/// The precedence of nodes which are never split by an operator: literals, identifiers,
/// constants and function calls.
pub const ATOM_PRECEDENCE: Precedence = 5;

/// An infix binary operator.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl BinaryOperator {
    pub fn symbol(&self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
            Self::Times => '*',
            Self::Divide => '/',
            Self::Power => '^',
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Plus | Self::Minus => 1,
            Self::Times | Self::Divide => 2,
            Self::Power => 3,
        }
    }

    /// Only `^` is right-associative; `2 ^ 3 ^ 2` is `2 ^ (3 ^ 2)`.
    pub fn is_right_associative(&self) -> bool {
        matches!(self, Self::Power)
    }

    /// The name of the MathML element for this operator.
    pub fn mathml_element(&self) -> &'static str {
        match self {
            Self::Plus => "plus",
            Self::Minus => "minus",
            Self::Times => "times",
            Self::Divide => "divide",
            Self::Power => "power",
        }
    }

    pub fn from_mathml_element(name: &str) -> Option<BinaryOperator> {
        Some(match name {
            "plus" => Self::Plus,
            "minus" => Self::Minus,
            "times" => Self::Times,
            "divide" => Self::Divide,
            "power" => Self::Power,
            _ => return None,
        })
    }
}

/// A named constant.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub enum Constant {
    True,
    False,
    Pi,
    ExponentialE,
    Avogadro,
    NotANumber,
    PositiveInfinity,
    NegativeInfinity,

    /// IEEE-754 negative zero. This is a constant rather than a real so that it survives being
    /// printed and read back.
    NegativeZero,
}

impl Constant {
    /// The infix spelling of this constant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Pi => "pi",
            Self::ExponentialE => "exponentiale",
            Self::Avogadro => "avogadro",
            Self::NotANumber => "NaN",
            Self::PositiveInfinity => "INF",
            Self::NegativeInfinity => "-INF",
            Self::NegativeZero => "-0",
        }
    }

    /// Looks up a constant by a bare infix name. The two negative constants have no bare name;
    /// they are produced by the parser from a minus sign applied to `INF` or `0`.
    pub fn from_name(name: &str) -> Option<Constant> {
        Some(match name {
            "true" => Self::True,
            "false" => Self::False,
            "pi" => Self::Pi,
            "exponentiale" => Self::ExponentialE,
            "avogadro" => Self::Avogadro,
            "NaN" | "notanumber" => Self::NotANumber,
            "INF" | "infinity" => Self::PositiveInfinity,
            _ => return None,
        })
    }

    /// The empty MathML element representing this constant, if it has one. The others are
    /// written as `cn` or `csymbol` elements.
    pub fn mathml_element(&self) -> Option<&'static str> {
        Some(match self {
            Self::True => "true",
            Self::False => "false",
            Self::Pi => "pi",
            Self::ExponentialE => "exponentiale",
            Self::NotANumber => "notanumber",
            Self::PositiveInfinity => "infinity",
            Self::Avogadro | Self::NegativeInfinity | Self::NegativeZero => return None,
        })
    }

    pub fn from_mathml_element(name: &str) -> Option<Constant> {
        Some(match name {
            "true" => Self::True,
            "false" => Self::False,
            "pi" => Self::Pi,
            "exponentiale" => Self::ExponentialE,
            "notanumber" => Self::NotANumber,
            "infinity" => Self::PositiveInfinity,
            _ => return None,
        })
    }
}

/// A node in an expression tree. Every node exclusively owns its children.
///
/// Equality is structural. Reals are compared by bit pattern, so `NaN` equals itself and `-0.0`
/// is distinct from `0.0`; this makes `Node` a proper `Eq`.
///
/// Dropping a tree does not recurse, so arbitrarily deep trees can be dropped safely. Other
/// tree walks (formatting, writing, comparison, cloning) recurse once per level.
#[derive(Debug, Clone)]
pub enum Node {
    Integer(i64),

    /// A real literal. The parser and reader only produce finite values here; NaN and the
    /// infinities are [Constant]s, see [Node::real].
    Real(f64),

    RealWithExponent { mantissa: f64, exponent: i64 },
    Rational { numerator: i64, denominator: i64 },

    /// A variable. Names which are also constant or function spellings, such as `pi` or `sin`,
    /// are allowed, but format as the constant or function and so read back differently from
    /// infix text. See [is_reserved_name](super::function::is_reserved_name).
    Identifier(String),
    Constant(Constant),
    UnaryMinus(Box<Node>),
    BinaryOp(BinaryOperator, Box<Node>, Box<Node>),

    /// A function call. Only construct this through [Node::function], which checks the
    /// function's arity.
    Function(FunctionName, Vec<Node>),
}

impl Node {
    pub fn binary(operator: BinaryOperator, left: Node, right: Node) -> Node {
        Node::BinaryOp(operator, Box::new(left), Box::new(right))
    }

    pub fn negate(operand: Node) -> Node {
        Node::UnaryMinus(Box::new(operand))
    }

    pub fn identifier(name: impl Into<String>) -> Node {
        Node::Identifier(name.into())
    }

    /// Builds a real literal. NaN and the infinities become the matching constants, since
    /// those are how they are written and read.
    pub fn real(value: f64) -> Node {
        if value.is_nan() {
            Node::Constant(Constant::NotANumber)
        } else if value == f64::INFINITY {
            Node::Constant(Constant::PositiveInfinity)
        } else if value == f64::NEG_INFINITY {
            Node::Constant(Constant::NegativeInfinity)
        } else {
            Node::Real(value)
        }
    }

    /// Builds a function call node, checking that the number of arguments is allowed.
    pub fn function(name: FunctionName, arguments: Vec<Node>) -> Result<Node, ArityMismatch> {
        let arity = name.arity();
        if arity.accepts(arguments.len()) {
            Ok(Node::Function(name, arguments))
        } else {
            Err(ArityMismatch {
                function: name.name().into(),
                expected: arity,
                actual: arguments.len(),
            })
        }
    }

    pub fn child_count(&self) -> usize {
        match self {
            Node::UnaryMinus(_) => 1,
            Node::BinaryOp(_, _, _) => 2,
            Node::Function(_, args) => args.len(),
            _ => 0,
        }
    }

    /// Returns the child at `index`, or `None` if there is no such child.
    pub fn child(&self, index: usize) -> Option<&Node> {
        match (self, index) {
            (Node::UnaryMinus(operand), 0) => Some(operand.as_ref()),
            (Node::BinaryOp(_, left, _), 0) => Some(left.as_ref()),
            (Node::BinaryOp(_, _, right), 1) => Some(right.as_ref()),
            (Node::Function(_, args), _) => args.get(index),
            _ => None,
        }
    }

    /// Iterates over this node's children in order.
    pub fn children(&self) -> impl Iterator<Item = &Node> + '_ {
        (0..self.child_count()).filter_map(move |i| self.child(i))
    }

    /// The name of an identifier or function call.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Identifier(name) => Some(name.as_str()),
            Node::Function(name, _) => Some(name.name()),
            _ => None,
        }
    }

    /// Returns true if this is one of the four numeric literal variants.
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Node::Integer(_) | Node::Real(_) | Node::RealWithExponent { .. } | Node::Rational { .. }
        )
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Node::Constant(_))
    }

    /// The precedence this node has when it appears as an operand.
    pub fn precedence(&self) -> Precedence {
        match self {
            Node::BinaryOp(op, _, _) => op.precedence(),
            Node::UnaryMinus(_) => UNARY_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }

    /// The number of nodes on the longest path from this node to a leaf, counting this node.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];

        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children().map(|child| (child, depth + 1)));
        }

        deepest
    }

    /// Moves this node's children which have children of their own onto `out`, leaving leaves
    /// in their place.
    fn take_branches(&mut self, out: &mut Vec<Node>) {
        match self {
            Node::UnaryMinus(operand) => take_branch(operand, out),
            Node::BinaryOp(_, left, right) => {
                take_branch(left, out);
                take_branch(right, out);
            }
            Node::Function(_, args) => {
                for arg in args.drain(..) {
                    if arg.child_count() > 0 {
                        out.push(arg);
                    }
                }
            }
            _ => (),
        }
    }
}

fn take_branch(child: &mut Box<Node>, out: &mut Vec<Node>) {
    if child.child_count() > 0 {
        out.push(mem::replace(&mut **child, Node::Integer(0)));
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        // Each node is only dropped once its branches have been moved onto this stack, so
        // dropping it never recurses more than one level
        let mut pending = vec![];
        self.take_branches(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.take_branches(&mut pending);
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Integer(a), Node::Integer(b)) => a == b,
            (Node::Real(a), Node::Real(b)) => a.to_bits() == b.to_bits(),
            (
                Node::RealWithExponent { mantissa: m1, exponent: e1 },
                Node::RealWithExponent { mantissa: m2, exponent: e2 },
            ) => m1.to_bits() == m2.to_bits() && e1 == e2,
            (
                Node::Rational { numerator: n1, denominator: d1 },
                Node::Rational { numerator: n2, denominator: d2 },
            ) => n1 == n2 && d1 == d2,
            (Node::Identifier(a), Node::Identifier(b)) => a == b,
            (Node::Constant(a), Node::Constant(b)) => a == b,
            (Node::UnaryMinus(a), Node::UnaryMinus(b)) => a == b,
            (Node::BinaryOp(o1, l1, r1), Node::BinaryOp(o2, l2, r2))
                => o1 == o2 && l1 == l2 && r1 == r2,
            (Node::Function(n1, a1), Node::Function(n2, a2)) => n1 == n2 && a1 == a2,
            _ => false,
        }
    }
}

impl Eq for Node {}
