//! Converts a [Node] tree back into infix text, adding parentheses only where they are needed to
//! preserve the tree's structure when the text is parsed again.

use alloc::string::String;
use core::fmt::{self, Write};

use crate::number;

use super::tree::{Constant, Node, Precedence, UNARY_PRECEDENCE};

/// Formats `node` as infix text.
pub fn format(node: &Node) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = write_node(&mut out, node);
    out
}

/// Writes `node` as infix text into `w`.
pub fn write_node<W: Write>(w: &mut W, node: &Node) -> fmt::Result {
    match node {
        Node::Integer(n) => write!(w, "{}", n),
        Node::Real(r) => w.write_str(&number::format_real(*r)),
        Node::RealWithExponent { mantissa, exponent }
            => w.write_str(&number::format_real_with_exponent(*mantissa, *exponent)),
        Node::Rational { numerator, denominator }
            => w.write_str(&number::format_rational(*numerator, *denominator)),
        Node::Identifier(name) => w.write_str(name),
        Node::Constant(constant) => w.write_str(constant.name()),

        Node::UnaryMinus(operand) => {
            w.write_char('-')?;
            let parens = operand.precedence() < UNARY_PRECEDENCE || absorbs_minus(operand);
            write_operand(w, operand, parens)
        }

        Node::BinaryOp(op, left, right) => {
            let precedence = op.precedence();
            let right_associative = op.is_right_associative();

            // We need to add parentheses around:
            //   - operands which bind more loosely than the operator, e.g. (1+2)*3
            //   - operands which go against the operator's associativity, e.g. 3-(3-2) or
            //     (2^3)^2
            let left_parens = needs_parentheses(precedence, left, right_associative);
            let right_parens = needs_parentheses(precedence, right, !right_associative);

            write_operand(w, left, left_parens)?;
            write!(w, " {} ", op.symbol())?;
            write_operand(w, right, right_parens)
        }

        Node::Function(name, args) => {
            w.write_str(name.name())?;
            w.write_char('(')?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    w.write_str(", ")?;
                }
                write_node(w, arg)?;
            }
            w.write_char(')')
        }
    }
}

/// Returns true if an operand of an operator with precedence `parent` must be parenthesised.
/// `against_associativity` is true when the operand sits on the side the operator does not
/// associate towards: the right of a left-associative operator, or the left of a
/// right-associative one.
fn needs_parentheses(parent: Precedence, operand: &Node, against_associativity: bool) -> bool {
    let precedence = operand.precedence();
    precedence < parent || (precedence == parent && against_associativity)
}

/// Returns true if a minus sign written directly before `operand` would be folded into it by the
/// parser, turning a negation into a negative literal. Such operands need parentheses under a
/// unary minus. Rationals are already parenthesised.
fn absorbs_minus(operand: &Node) -> bool {
    match operand {
        Node::Integer(n) => *n >= 0,
        Node::Real(r) => !r.is_sign_negative(),
        Node::RealWithExponent { mantissa, .. } => !mantissa.is_sign_negative(),
        Node::Constant(Constant::PositiveInfinity) => true,
        _ => false,
    }
}

fn write_operand<W: Write>(w: &mut W, operand: &Node, parens: bool) -> fmt::Result {
    if parens {
        w.write_char('(')?;
        write_node(w, operand)?;
        w.write_char(')')
    } else {
        write_node(w, operand)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_node(f, self)
    }
}
