use alloc::string::ToString;

use crate::{
    error::{Arity, Location},
    node::function::FunctionName,
    formula_to_string, parse_formula, parse_formula_with, Constant, MathError, Node, ParseSettings,
};

#[test]
fn test_precedence() {
    assert_eq!(parse!("1 + 2 * 3"), bin!(Plus, int!(1), bin!(Times, int!(2), int!(3))));
    assert_eq!(parse!("(1 + 2) * 3"), bin!(Times, bin!(Plus, int!(1), int!(2)), int!(3)));
    assert_eq!(parse!("a * b ^ c"), bin!(Times, ident!(a), bin!(Power, ident!(b), ident!(c))));
    assert_eq!(parse!("a / b * c"), bin!(Times, bin!(Divide, ident!(a), ident!(b)), ident!(c)));
}

#[test]
fn test_associativity() {
    assert_eq!(parse!("1 - 2 - 3"), bin!(Minus, bin!(Minus, int!(1), int!(2)), int!(3)));
    assert_eq!(parse!("2 ^ 3 ^ 2"), bin!(Power, int!(2), bin!(Power, int!(3), int!(2))));
    assert_eq!(parse!("(2 ^ 3) ^ 2"), bin!(Power, bin!(Power, int!(2), int!(3)), int!(2)));
}

#[test]
fn test_unary_minus() {
    // Unary minus binds more tightly than ^
    assert_eq!(parse!("-x ^ 2"), bin!(Power, neg!(ident!(x)), int!(2)));
    assert_eq!(parse!("-(x ^ 2)"), neg!(bin!(Power, ident!(x), int!(2))));
    assert_eq!(parse!("--x"), neg!(neg!(ident!(x))));
    assert_eq!(parse!("x - -y"), bin!(Minus, ident!(x), neg!(ident!(y))));
    assert_eq!(parse!("x ^ -y"), bin!(Power, ident!(x), neg!(ident!(y))));

    // ...but folds into literals
    assert_eq!(parse!("-3"), int!(-3));
    assert_eq!(parse!("-2 ^ 2"), bin!(Power, int!(-2), int!(2)));
    assert_eq!(parse!("x - -3"), bin!(Minus, ident!(x), int!(-3)));
    assert_eq!(parse!("- -3"), neg!(int!(-3)));
    assert_eq!(parse!("-(3)"), neg!(int!(3)));
    assert_eq!(parse!("-1.5"), real!(-1.5));
    assert_eq!(parse!("-1.5e3"), Node::RealWithExponent { mantissa: -1.5, exponent: 3 });
    assert_eq!(parse!("-9223372036854775808"), int!(i64::MIN));
}

#[test]
fn test_special_literals() {
    assert_eq!(parse!("NaN"), constant!(NotANumber));
    assert_eq!(parse!("INF"), constant!(PositiveInfinity));
    assert_eq!(parse!("-INF"), constant!(NegativeInfinity));
    assert_eq!(parse!("-0"), constant!(NegativeZero));
    assert_eq!(parse!("pi"), constant!(Pi));
    assert_eq!(parse!("exponentiale"), constant!(ExponentialE));
    assert_eq!(parse!("avogadro"), constant!(Avogadro));
    assert_eq!(parse!("true"), constant!(True));
    assert_eq!(parse!("-pi"), neg!(constant!(Pi)));

    // Names are case-sensitive
    assert_eq!(parse!("Pi"), ident!(Pi));
}

fn rational(numerator: i64, denominator: i64) -> Node {
    Node::Rational { numerator, denominator }
}

#[test]
fn test_rationals() {
    assert_eq!(parse!("(1/2)"), rational(1, 2));
    assert_eq!(parse!("(-1/2)"), rational(-1, 2));
    assert_eq!(parse!("-(1/2)"), neg!(rational(1, 2)));
    assert_eq!(parse!("x ^ (1/2)"), bin!(Power, ident!(x), rational(1, 2)));
    assert_eq!(parse!("(1/2)/3"), bin!(Divide, rational(1, 2), int!(3)));
    assert_eq!(
        parse!("(-9223372036854775808/1)"),
        rational(i64::MIN, 1),
    );

    // Anything else in parentheses is an ordinary division
    assert_eq!(parse!("( 1/2)"), bin!(Divide, int!(1), int!(2)));
    assert_eq!(parse!("(1 / 2)"), bin!(Divide, int!(1), int!(2)));
    assert_eq!(parse!("(1/2 )"), bin!(Divide, int!(1), int!(2)));
    assert_eq!(parse!("(- 1/2)"), bin!(Divide, int!(-1), int!(2)));
    assert_eq!(parse!("(1/-2)"), bin!(Divide, int!(1), int!(-2)));
    assert_eq!(parse!("(1/2 + 1)"), bin!(Plus, bin!(Divide, int!(1), int!(2)), int!(1)));

    // A negative zero numerator has nowhere to keep its sign
    assert_eq!(parse!("(-0/3)"), neg!(rational(0, 3)));

    assert!(matches!(parse_formula("(9223372036854775808/2)"), Err(MathError::Syntax { offset: 1, .. })));
    assert!(matches!(parse_formula("(1/9223372036854775808)"), Err(MathError::Syntax { offset: 3, .. })));
}

#[test]
fn test_unparenthesised_division_keeps_precedence() {
    // Without parentheses, integers either side of a / are a division, so ^ still binds first
    assert_eq!(parse!("1/2"), bin!(Divide, int!(1), int!(2)));
    assert_eq!(parse!("-1/2"), bin!(Divide, int!(-1), int!(2)));
    assert_eq!(parse!("2^1/2"), bin!(Divide, bin!(Power, int!(2), int!(1)), int!(2)));
    assert_eq!(parse!("x^2/3"), bin!(Divide, bin!(Power, ident!(x), int!(2)), int!(3)));
    assert_eq!(parse!("1/2/3"), bin!(Divide, bin!(Divide, int!(1), int!(2)), int!(3)));
}

#[test]
fn test_function_calls() {
    assert_eq!(parse!("sin(x)"), func!(Sin, ident!(x)));
    assert_eq!(parse!("log(2, x)"), func!(Log, int!(2), ident!(x)));
    assert_eq!(parse!("acos(x)"), func!(ArcCos, ident!(x)));
    assert_eq!(parse!("ceil(x)"), func!(Ceiling, ident!(x)));
    assert_eq!(parse!("pow(x, 2)"), bin!(Power, ident!(x), int!(2)));
    assert_eq!(
        parse!("piecewise(1, gt(x, 0), 0)"),
        func!(Piecewise, int!(1), func!(Gt, ident!(x), int!(0)), int!(0)),
    );
    assert_eq!(
        parse!("f(x, y + 1)"),
        Node::Function(FunctionName::User("f".into()), alloc::vec![ident!(x), bin!(Plus, ident!(y), int!(1))]),
    );
    assert_eq!(parse!("g()"), Node::Function(FunctionName::User("g".into()), alloc::vec![]));

    // A name directly followed by parentheses is always a call
    assert_eq!(parse!("INF(x)"), Node::Function(FunctionName::User("INF".into()), alloc::vec![ident!(x)]));
}

#[test]
fn test_arity_errors() {
    assert_eq!(
        parse_formula("log(2, 3, 4)"),
        Err(MathError::Arity {
            function: "log".into(),
            expected: Arity::between(1, 2),
            actual: 3,
            location: Location::Offset(0),
        }),
    );
    assert_eq!(
        parse_formula("1 + pow(x)"),
        Err(MathError::Arity {
            function: "pow".into(),
            expected: Arity::exactly(2),
            actual: 1,
            location: Location::Offset(4),
        }),
    );
    assert!(matches!(parse_formula("sin()"), Err(MathError::Arity { actual: 0, .. })));
    assert!(matches!(parse_formula("and(x)"), Err(MathError::Arity { actual: 1, .. })));

    assert_eq!(
        parse_formula("log(2, 3, 4)").unwrap_err().to_string(),
        "log expects 1 to 2 argument(s) but was given 3, at offset 0",
    );
}

#[test]
fn test_syntax_errors() {
    assert_eq!(parse_formula("1 +"), Err(MathError::syntax(3, "an operand")));
    assert_eq!(parse_formula("(1 + 2"), Err(MathError::syntax(6, "')'")));
    assert_eq!(parse_formula("1 2"), Err(MathError::syntax(2, "an operator or the end of the formula")));
    assert_eq!(parse_formula("+1"), Err(MathError::syntax(0, "an operand")));
    assert_eq!(parse_formula("f(1,)"), Err(MathError::syntax(4, "an operand")));
    assert_eq!(parse_formula("f(1 2)"), Err(MathError::syntax(4, "',' or ')'")));
    assert_eq!(parse_formula(")"), Err(MathError::syntax(0, "an operand")));
    assert_eq!(parse_formula(""), Err(MathError::syntax(0, "an operand")));
    assert!(matches!(parse_formula("9223372036854775808"), Err(MathError::Syntax { offset: 0, .. })));
    assert_eq!(parse_formula("x # y"), Err(MathError::Lexical { character: '#', offset: 2 }));
}

#[test]
fn test_depth_limit() {
    let settings = ParseSettings { max_depth: 3, ..ParseSettings::default() };
    assert_eq!(parse_formula_with("((1))", &settings), Ok(int!(1)));
    assert_eq!(
        parse_formula_with("((((1))))", &settings),
        Err(MathError::syntax(4, "a less deeply nested expression")),
    );

    // Deep input fails cleanly with the default limit instead of exhausting the stack
    let mut deep = alloc::string::String::new();
    for _ in 0..10_000 {
        deep.push('(');
    }
    deep.push('1');
    assert!(matches!(parse_formula(&deep), Err(MathError::Syntax { .. })));

    let mut powers = alloc::string::String::from("x");
    for _ in 0..10_000 {
        powers.push_str(" ^ x");
    }
    assert!(matches!(parse_formula(&powers), Err(MathError::Syntax { .. })));
}

/// A sum of `terms` ones, written without parentheses.
fn long_sum(terms: usize) -> alloc::string::String {
    let mut sum = alloc::string::String::from("1");
    for _ in 1..terms {
        sum.push_str(" + 1");
    }
    sum
}

#[test]
fn test_long_sums() {
    let sum = parse!(&long_sum(500));
    assert_eq!(sum.depth(), 500);
    assert_eq!(formula_to_string(&sum), long_sum(500));

    // Too deep a tree to walk safely is rejected at the operator which would deepen it
    let text = long_sum(20_000);
    assert_eq!(
        parse_formula(&text),
        Err(MathError::syntax(1024 * 4 - 2, "a shallower expression tree")),
    );
}

#[test]
fn test_tree_depth_limit() {
    let settings = ParseSettings { max_tree_depth: 3, ..ParseSettings::default() };
    let parse = |text: &str| parse_formula_with(text, &settings);

    assert_eq!(parse("a * b + c").map(|n| n.depth()), Ok(3));
    assert_eq!(parse("a + b + c + d"), Err(MathError::syntax(10, "a shallower expression tree")));
    assert_eq!(parse("a * b * c * d"), Err(MathError::syntax(10, "a shallower expression tree")));
    assert_eq!(parse("a + b * c ^ d"), Err(MathError::syntax(2, "a shallower expression tree")));
    assert_eq!(parse("---a"), Err(MathError::syntax(0, "a shallower expression tree")));
    assert_eq!(parse("f(g(h(x)))"), Err(MathError::syntax(0, "a shallower expression tree")));
    assert_eq!(parse("f(g(x))").map(|n| n.depth()), Ok(3));
}

#[test]
fn test_non_finite_reals_become_constants() {
    let mut huge = alloc::string::String::from("1");
    for _ in 0..400 {
        huge.push('0');
    }
    huge.push_str(".0");

    assert_eq!(parse!(&huge), constant!(PositiveInfinity));
    assert_eq!(parse!(&alloc::format!("-{}", huge)), constant!(NegativeInfinity));
}

#[test]
fn test_node_queries() {
    let node = parse!("sin(x) + 2 * y");
    assert_eq!(node.child_count(), 2);
    assert_eq!(node.child(0), Some(&func!(Sin, ident!(x))));
    assert_eq!(node.child(2), None);
    assert_eq!(node.child(0).and_then(Node::name), Some("sin"));
    assert_eq!(node.depth(), 3);
    assert_eq!(node.children().count(), 2);
    assert!(int!(3).is_number());
    assert!(constant!(Pi).is_constant());
    assert!(!Node::Constant(Constant::Pi).is_number());
}
