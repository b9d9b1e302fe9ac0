//! The table of builtin functions, and function names in general.

use alloc::string::String;

use crate::error::Arity;

use super::tree::{BinaryOperator, Constant};

/// A mathematical function known to SBML, for which an invocation may appear in an expression
/// tree.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub enum Builtin {
    Abs,
    ArcCos,
    ArcCosh,
    ArcCot,
    ArcCoth,
    ArcCsc,
    ArcCsch,
    ArcSec,
    ArcSech,
    ArcSin,
    ArcSinh,
    ArcTan,
    ArcTanh,
    Ceiling,
    Cos,
    Cosh,
    Cot,
    Coth,
    Csc,
    Csch,
    Delay,
    Exp,
    Factorial,
    Floor,
    Ln,

    /// `log(x)` is base 10; `log(b, x)` has base `b`.
    Log,
    Piecewise,

    /// `root(n, x)`, the `n`th root of `x`.
    Root,
    Sec,
    Sech,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
    And,
    Or,
    Xor,
    Not,
    Eq,
    Neq,
    Gt,
    Lt,
    Geq,
    Leq,
}

impl Builtin {
    /// Every builtin, in declaration order.
    pub const ALL: &'static [Builtin] = &[
        Self::Abs, Self::ArcCos, Self::ArcCosh, Self::ArcCot, Self::ArcCoth, Self::ArcCsc,
        Self::ArcCsch, Self::ArcSec, Self::ArcSech, Self::ArcSin, Self::ArcSinh, Self::ArcTan,
        Self::ArcTanh, Self::Ceiling, Self::Cos, Self::Cosh, Self::Cot, Self::Coth, Self::Csc,
        Self::Csch, Self::Delay, Self::Exp, Self::Factorial, Self::Floor, Self::Ln, Self::Log,
        Self::Piecewise, Self::Root, Self::Sec, Self::Sech, Self::Sin, Self::Sinh, Self::Sqrt,
        Self::Tan, Self::Tanh, Self::And, Self::Or, Self::Xor, Self::Not, Self::Eq, Self::Neq,
        Self::Gt, Self::Lt, Self::Geq, Self::Leq,
    ];

    /// The canonical infix name of this function, used when formatting.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::ArcCos => "arccos",
            Self::ArcCosh => "arccosh",
            Self::ArcCot => "arccot",
            Self::ArcCoth => "arccoth",
            Self::ArcCsc => "arccsc",
            Self::ArcCsch => "arccsch",
            Self::ArcSec => "arcsec",
            Self::ArcSech => "arcsech",
            Self::ArcSin => "arcsin",
            Self::ArcSinh => "arcsinh",
            Self::ArcTan => "arctan",
            Self::ArcTanh => "arctanh",
            Self::Ceiling => "ceiling",
            Self::Cos => "cos",
            Self::Cosh => "cosh",
            Self::Cot => "cot",
            Self::Coth => "coth",
            Self::Csc => "csc",
            Self::Csch => "csch",
            Self::Delay => "delay",
            Self::Exp => "exp",
            Self::Factorial => "factorial",
            Self::Floor => "floor",
            Self::Ln => "ln",
            Self::Log => "log",
            Self::Piecewise => "piecewise",
            Self::Root => "root",
            Self::Sec => "sec",
            Self::Sech => "sech",
            Self::Sin => "sin",
            Self::Sinh => "sinh",
            Self::Sqrt => "sqrt",
            Self::Tan => "tan",
            Self::Tanh => "tanh",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Not => "not",
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Geq => "geq",
            Self::Leq => "leq",
        }
    }

    /// The number of arguments this function accepts.
    pub fn arity(&self) -> Arity {
        match self {
            Self::Log => Arity::between(1, 2),
            Self::Delay | Self::Root | Self::Neq => Arity::exactly(2),
            Self::Piecewise => Arity::at_least(1),
            Self::And | Self::Or | Self::Xor
            | Self::Eq | Self::Gt | Self::Lt | Self::Geq | Self::Leq => Arity::at_least(2),
            _ => Arity::exactly(1),
        }
    }

    /// Finds the builtin whose MathML operator element is `name`, as in `<apply><sin/>...`.
    ///
    /// `sqrt` has no element of its own (it is a `root` without a `degree`), `delay` is a
    /// `csymbol`, and `piecewise` is a container rather than an operator, so none of those are
    /// found here.
    pub fn from_mathml_element(name: &str) -> Option<Builtin> {
        Self::ALL
            .iter()
            .copied()
            .filter(|b| !matches!(b, Self::Sqrt | Self::Delay | Self::Piecewise))
            .find(|b| b.name() == name)
    }
}

/// What a name followed by `(` refers to in infix text.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum Callee {
    Function(Builtin),

    /// A function-style spelling of a binary operator, such as `pow(x, 2)`.
    Operator(BinaryOperator),
}

/// Every name which can be called in infix text, including aliases. Matching is case-sensitive.
const CALLABLE_NAMES: &[(&str, Callee)] = &[
    ("abs", Callee::Function(Builtin::Abs)),
    ("acos", Callee::Function(Builtin::ArcCos)),
    ("arccos", Callee::Function(Builtin::ArcCos)),
    ("arccosh", Callee::Function(Builtin::ArcCosh)),
    ("arccot", Callee::Function(Builtin::ArcCot)),
    ("arccoth", Callee::Function(Builtin::ArcCoth)),
    ("arccsc", Callee::Function(Builtin::ArcCsc)),
    ("arccsch", Callee::Function(Builtin::ArcCsch)),
    ("arcsec", Callee::Function(Builtin::ArcSec)),
    ("arcsech", Callee::Function(Builtin::ArcSech)),
    ("arcsin", Callee::Function(Builtin::ArcSin)),
    ("asin", Callee::Function(Builtin::ArcSin)),
    ("arcsinh", Callee::Function(Builtin::ArcSinh)),
    ("arctan", Callee::Function(Builtin::ArcTan)),
    ("atan", Callee::Function(Builtin::ArcTan)),
    ("arctanh", Callee::Function(Builtin::ArcTanh)),
    ("ceil", Callee::Function(Builtin::Ceiling)),
    ("ceiling", Callee::Function(Builtin::Ceiling)),
    ("cos", Callee::Function(Builtin::Cos)),
    ("cosh", Callee::Function(Builtin::Cosh)),
    ("cot", Callee::Function(Builtin::Cot)),
    ("coth", Callee::Function(Builtin::Coth)),
    ("csc", Callee::Function(Builtin::Csc)),
    ("csch", Callee::Function(Builtin::Csch)),
    ("delay", Callee::Function(Builtin::Delay)),
    ("exp", Callee::Function(Builtin::Exp)),
    ("factorial", Callee::Function(Builtin::Factorial)),
    ("floor", Callee::Function(Builtin::Floor)),
    ("ln", Callee::Function(Builtin::Ln)),
    ("log", Callee::Function(Builtin::Log)),
    ("piecewise", Callee::Function(Builtin::Piecewise)),
    ("pow", Callee::Operator(BinaryOperator::Power)),
    ("power", Callee::Operator(BinaryOperator::Power)),
    ("root", Callee::Function(Builtin::Root)),
    ("sec", Callee::Function(Builtin::Sec)),
    ("sech", Callee::Function(Builtin::Sech)),
    ("sin", Callee::Function(Builtin::Sin)),
    ("sinh", Callee::Function(Builtin::Sinh)),
    ("sqrt", Callee::Function(Builtin::Sqrt)),
    ("tan", Callee::Function(Builtin::Tan)),
    ("tanh", Callee::Function(Builtin::Tanh)),
    ("and", Callee::Function(Builtin::And)),
    ("or", Callee::Function(Builtin::Or)),
    ("xor", Callee::Function(Builtin::Xor)),
    ("not", Callee::Function(Builtin::Not)),
    ("eq", Callee::Function(Builtin::Eq)),
    ("neq", Callee::Function(Builtin::Neq)),
    ("gt", Callee::Function(Builtin::Gt)),
    ("lt", Callee::Function(Builtin::Lt)),
    ("geq", Callee::Function(Builtin::Geq)),
    ("leq", Callee::Function(Builtin::Leq)),
];

/// Looks up what a called name refers to. Returns `None` for user-defined functions.
pub fn lookup_callable(name: &str) -> Option<Callee> {
    CALLABLE_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, callee)| *callee)
}

/// Returns true if `name` has a meaning of its own in infix text, as a constant (`pi`, `NaN`), a
/// builtin function or alias (`sin`, `acos`) or an operator spelling (`pow`).
///
/// An [Identifier](super::tree::Node::Identifier) or [FunctionName::User] with such a name is
/// formatted as that spelling, and so parses back as something else. MathML keeps them apart.
pub fn is_reserved_name(name: &str) -> bool {
    Constant::from_name(name).is_some() || lookup_callable(name).is_some()
}

/// The name of a function in a [Function](super::tree::Node::Function) node.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub enum FunctionName {
    Builtin(Builtin),

    /// A function defined by the model, resolved by the caller. A
    /// [reserved name](is_reserved_name) only survives infix formatting as a builtin.
    User(String),
}

impl FunctionName {
    pub fn name(&self) -> &str {
        match self {
            FunctionName::Builtin(builtin) => builtin.name(),
            FunctionName::User(name) => name.as_str(),
        }
    }

    /// User-defined functions accept any number of arguments; checking them against their
    /// definitions is left to the caller.
    pub fn arity(&self) -> Arity {
        match self {
            FunctionName::Builtin(builtin) => builtin.arity(),
            FunctionName::User(_) => Arity::at_least(0),
        }
    }
}

impl From<Builtin> for FunctionName {
    fn from(builtin: Builtin) -> Self {
        FunctionName::Builtin(builtin)
    }
}
