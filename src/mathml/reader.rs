//! Builds a [Node] tree from a stream of MathML [Event]s.
//!
//! The reader keeps a stack of [Frame]s, one per open element. Each frame pairs the element's
//! tag with a [Builder] collecting whatever the element has seen so far. When an element ends,
//! its frame is popped and closed into an [Output], which is handed to the frame below.

use alloc::{borrow::ToOwned, format, string::String, vec, vec::Vec};
use core::mem;

use crate::{
    diagnostics::{Message, MessageSink},
    error::{Arity, ArityMismatch, ErrorKind, Location, MathError},
    node::{
        function::{Builtin, FunctionName},
        tree::{BinaryOperator, Constant, Node},
    },
    number::normalize_rational_sign,
};

use super::{find_attribute, local_name, Attribute, Event};

/// Options for reading MathML.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ReaderSettings {
    /// The deepest element nesting accepted before reading fails.
    pub max_depth: usize,

    /// The deepest tree, as measured by [Node::depth], which reading may produce. An n-ary
    /// `plus` or `times` folds into a tree n-1 levels deep without any element nesting.
    pub max_tree_depth: usize,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        ReaderSettings { max_depth: 256, max_tree_depth: 1024 }
    }
}

/// The `type` attribute of a `cn` element.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
enum NumeralType {
    Real,
    Integer,
    Rational,
    ENotation,
}

impl NumeralType {
    fn from_attribute(value: &str) -> Option<NumeralType> {
        Some(match value.trim() {
            "real" => Self::Real,
            "integer" => Self::Integer,
            "rational" => Self::Rational,
            "e-notation" => Self::ENotation,
            _ => return None,
        })
    }
}

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
enum Qualifier {
    LogBase,
    Degree,
}

impl Qualifier {
    fn element(&self) -> &'static str {
        match self {
            Qualifier::LogBase => "logbase",
            Qualifier::Degree => "degree",
        }
    }
}

/// What the first child of an `apply` says to do with the rest.
#[derive(PartialEq, Debug, Clone)]
enum Head {
    Operator(BinaryOperator),
    Function(FunctionName),
}

#[derive(Default, Debug)]
struct Apply {
    head: Option<Head>,
    qualifier: Option<(Qualifier, Node)>,
    operands: Vec<Node>,
}

#[derive(Debug)]
enum Builder {
    /// `math` or `semantics`; the children pass straight through to the parent.
    Group(Vec<Node>),

    /// An element being ignored, along with everything inside it.
    Skip,

    Apply(Apply),

    /// A `cn`. `parts` holds the text before each `sep` seen so far.
    Numeral { kind: NumeralType, text: String, parts: Vec<String> },

    Identifier(String),
    Csymbol { url: String, text: String },
    Constant(Constant),

    /// An empty operator element such as `<plus/>`.
    Operator(Head),

    Piecewise(Vec<Node>),

    /// `piece` or `otherwise`; the children are flattened into the enclosing piecewise.
    Piece(Vec<Node>),

    Qualifier(Qualifier, Option<Node>),
    Separator,
}

impl Builder {
    /// True for builders which may not contain any elements.
    fn is_leaf(&self) -> bool {
        matches!(
            self,
            Builder::Identifier(_) | Builder::Csymbol { .. } | Builder::Constant(_)
            | Builder::Operator(_) | Builder::Separator
        )
    }

    /// The text being accumulated, for builders which keep their character data.
    fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Builder::Numeral { text, .. } | Builder::Identifier(text) | Builder::Csymbol { text, .. }
                => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Frame {
    tag: String,
    builder: Builder,
}

/// The result of closing a frame, passed to the frame beneath it.
enum Output {
    Nothing,
    Node(Node),
    Nodes(Vec<Node>),
    Head(Head),
    Qualifier(Qualifier, Node),
    Separator,
}

/// Reads one MathML expression from a sequence of events.
///
/// Feed events through [MathMLReader::event] (or the individual `start_element`,
/// `end_element` and `characters` methods), then call [MathMLReader::finish] to get the tree.
/// Warnings are recorded in the message sink and reading carries on. Any error is recorded too,
/// and is also returned; after that, the reader rejects every further event with the same error.
pub struct MathMLReader<'s> {
    sink: &'s mut dyn MessageSink,
    settings: ReaderSettings,
    frames: Vec<Frame>,

    /// Expressions completed outside of any element.
    expressions: Vec<Node>,
    failure: Option<MathError>,
}

impl<'s> MathMLReader<'s> {
    pub fn new(sink: &'s mut dyn MessageSink) -> MathMLReader<'s> {
        Self::with_settings(sink, ReaderSettings::default())
    }

    pub fn with_settings(sink: &'s mut dyn MessageSink, settings: ReaderSettings) -> MathMLReader<'s> {
        MathMLReader {
            sink,
            settings,
            frames: vec![],
            expressions: vec![],
            failure: None,
        }
    }

    pub fn event(&mut self, event: Event) -> Result<(), MathError> {
        match event {
            Event::Start { name, attributes } => self.start_element(&name, &attributes),
            Event::End { name } => self.end_element(&name),
            Event::Text(text) => self.characters(&text),
        }
    }

    pub fn start_element(&mut self, name: &str, attributes: &[Attribute]) -> Result<(), MathError> {
        self.check_failure()?;

        if self.frames.len() >= self.settings.max_depth {
            let message = format!("elements are nested more than {} deep", self.settings.max_depth);
            return self.fail_at_child(name, message);
        }

        let (skipping, in_leaf, in_numeral) = match self.frames.last() {
            Some(frame) => (
                matches!(frame.builder, Builder::Skip),
                frame.builder.is_leaf(),
                matches!(frame.builder, Builder::Numeral { .. }),
            ),
            None => (false, false, false),
        };

        // Everything inside a skipped element is skipped too, without further warnings
        let builder = if skipping {
            Builder::Skip
        } else if in_leaf {
            let message = format!("<{}> cannot contain elements", self.top_name());
            return self.fail_at_child(name, message);
        } else if in_numeral && local_name(name) != "sep" {
            return self.fail_at_child(name, "<cn> may only contain text and <sep/>");
        } else {
            match self.builder_for(name, attributes) {
                Ok(builder) => builder,
                Err(message) => return self.fail_at_child(name, message),
            }
        };

        self.frames.push(Frame { tag: name.to_owned(), builder });
        Ok(())
    }

    /// Chooses the builder for a new element. Returns a fatal error message if the element is
    /// not allowed where it appears.
    fn builder_for(&mut self, name: &str, attributes: &[Attribute]) -> Result<Builder, String> {
        let local = local_name(name);
        let in_apply = matches!(self.frames.last(), Some(Frame { builder: Builder::Apply(_), .. }));
        let in_numeral = matches!(self.frames.last(), Some(Frame { builder: Builder::Numeral { .. }, .. }));

        Ok(match local {
            "math" | "semantics" => Builder::Group(vec![]),
            "annotation" | "annotation-xml" => Builder::Skip,
            "apply" => Builder::Apply(Apply::default()),

            "cn" => {
                let kind = match find_attribute(attributes, "type") {
                    None => NumeralType::Real,
                    Some(value) => match NumeralType::from_attribute(value) {
                        Some(kind) => kind,
                        None => {
                            let text = format!("unknown cn type \"{}\", reading as real", value);
                            self.warn_at_child(name, text);
                            NumeralType::Real
                        }
                    },
                };
                Builder::Numeral { kind, text: String::new(), parts: vec![] }
            }

            "sep" if in_numeral => Builder::Separator,
            "sep" => return Err("<sep/> outside of <cn>".into()),

            "ci" => Builder::Identifier(String::new()),
            "csymbol" => Builder::Csymbol {
                url: find_attribute(attributes, "definitionURL").unwrap_or("").to_owned(),
                text: String::new(),
            },

            "piecewise" => Builder::Piecewise(vec![]),
            "piece" | "otherwise" => Builder::Piece(vec![]),
            "logbase" => Builder::Qualifier(Qualifier::LogBase, None),
            "degree" => Builder::Qualifier(Qualifier::Degree, None),

            _ => {
                if let Some(constant) = Constant::from_mathml_element(local) {
                    Builder::Constant(constant)
                } else if let Some(head) = operator_head(local) {
                    if !in_apply {
                        return Err(format!("operator <{}/> outside of <apply>", local));
                    }
                    Builder::Operator(head)
                } else {
                    self.warn_at_child(name, format!("unrecognised element <{}> skipped", local));
                    Builder::Skip
                }
            }
        })
    }

    pub fn end_element(&mut self, name: &str) -> Result<(), MathError> {
        self.check_failure()?;

        let path = self.path();
        let frame = match self.frames.pop() {
            Some(frame) if frame.tag == name => frame,
            Some(frame) => {
                let message = format!("expected </{}> but found </{}>", frame.tag, name);
                return self.fail(MathError::structure(path, message));
            }
            None => {
                let message = format!("</{}> has no matching start", name);
                return self.fail(MathError::structure(path, message));
            }
        };

        let result = self.close(frame.builder, &path)
            .and_then(|output| self.deliver(output, &path));
        result.or_else(|error| self.fail(error))
    }

    pub fn characters(&mut self, text: &str) -> Result<(), MathError> {
        self.check_failure()?;

        let skipping = matches!(self.frames.last(), Some(Frame { builder: Builder::Skip, .. }));
        if let Some(content) = self.frames.last_mut().and_then(|f| f.builder.text_mut()) {
            content.push_str(text);
        } else if !skipping && !text.trim().is_empty() {
            let path = self.path();
            self.warn(path, format!("unexpected text \"{}\" ignored", text.trim()));
        }

        Ok(())
    }

    /// Ends the document, returning the expression it contained, if any.
    pub fn finish(mut self) -> Result<Option<Node>, MathError> {
        self.check_failure()?;

        if let Some(frame) = self.frames.last() {
            let message = format!("<{}> was never closed", frame.tag);
            let path = self.path();
            return self.fail(MathError::structure(path, message));
        }

        match self.expressions.len() {
            0 => {
                log::debug!("finished reading MathML with no expression");
                Ok(None)
            }
            1 => {
                log::debug!("finished reading MathML expression");
                Ok(self.expressions.pop())
            }
            n => {
                let message = format!("expected one expression but found {}", n);
                self.fail(MathError::structure("/", message))
            }
        }
    }

    /// Turns a completed builder into its output.
    fn close(&mut self, builder: Builder, path: &str) -> Result<Output, MathError> {
        Ok(match builder {
            Builder::Group(children) | Builder::Piece(children) => Output::Nodes(children),
            Builder::Skip => Output::Nothing,
            Builder::Apply(apply) => Output::Node(self.limit_tree_depth(reduce(apply, path)?, path)?),

            Builder::Numeral { kind, text, mut parts } => {
                parts.push(text);
                Output::Node(numeral(kind, &parts, path)?)
            }

            Builder::Identifier(text) => {
                let name = text.trim();
                if name.is_empty() {
                    return Err(MathError::structure(path, "<ci> is empty"));
                }
                Output::Node(Node::identifier(name))
            }

            Builder::Csymbol { url, text } => match url.rsplit('/').next().unwrap_or("") {
                "time" => {
                    let name = text.trim();
                    Output::Node(Node::identifier(if name.is_empty() { "time" } else { name }))
                }
                "avogadro" => Output::Node(Node::Constant(Constant::Avogadro)),
                "delay" => Output::Head(Head::Function(Builtin::Delay.into())),
                _ => {
                    self.warn(path.to_owned(), format!("unrecognised csymbol \"{}\" skipped", url));
                    Output::Nothing
                }
            },

            Builder::Constant(constant) => Output::Node(Node::Constant(constant)),
            Builder::Operator(head) => Output::Head(head),

            Builder::Piecewise(children) => {
                let node = Node::function(Builtin::Piecewise.into(), children)
                    .map_err(|e| e.at(Location::Element(path.to_owned())))?;
                Output::Node(self.limit_tree_depth(node, path)?)
            }

            Builder::Qualifier(qualifier, Some(node)) => Output::Qualifier(qualifier, node),
            Builder::Qualifier(qualifier, None) => return Err(MathError::structure(
                path, format!("<{}> must contain an expression", qualifier.element()),
            )),

            Builder::Separator => Output::Separator,
        })
    }

    /// Hands the output of a closed element to the innermost open element, or to the top level
    /// if there is none.
    fn deliver(&mut self, output: Output, path: &str) -> Result<(), MathError> {
        let parent = match self.frames.last_mut() {
            Some(frame) => &mut frame.builder,
            None => {
                match output {
                    Output::Nothing => (),
                    Output::Node(node) => self.expressions.push(node),
                    Output::Nodes(nodes) => self.expressions.extend(nodes),
                    _ => return Err(MathError::structure(path, "operator outside of <apply>")),
                }
                return Ok(());
            }
        };

        match (parent, output) {
            (_, Output::Nothing) => (),

            (Builder::Group(children) | Builder::Piece(children), Output::Node(node))
                => children.push(node),
            (Builder::Group(children) | Builder::Piece(children) | Builder::Piecewise(children), Output::Nodes(nodes))
                => children.extend(nodes),

            (Builder::Apply(apply), Output::Head(head)) => {
                if apply.head.is_some() {
                    return Err(MathError::structure(path, "<apply> has more than one operator"));
                }
                if !apply.operands.is_empty() {
                    return Err(MathError::structure(path, "operator must be the first child of <apply>"));
                }
                apply.head = Some(head);
            }
            (Builder::Apply(apply), Output::Node(node)) => apply.push(node),
            (Builder::Apply(apply), Output::Nodes(nodes)) => {
                for node in nodes {
                    apply.push(node);
                }
            }
            (Builder::Apply(apply), Output::Qualifier(qualifier, node)) => {
                if apply.qualifier.is_some() {
                    return Err(MathError::structure(path, "<apply> has more than one qualifier"));
                }
                apply.qualifier = Some((qualifier, node));
            }

            (Builder::Qualifier(qualifier, slot), Output::Node(node)) => fill(*qualifier, slot, node, path)?,
            (Builder::Qualifier(qualifier, slot), Output::Nodes(nodes)) => {
                for node in nodes {
                    fill(*qualifier, slot, node, path)?;
                }
            }

            (Builder::Numeral { text, parts, .. }, Output::Separator) => parts.push(mem::take(text)),

            (Builder::Piecewise(_), Output::Node(_))
                => return Err(MathError::structure(path, "<piecewise> may only contain <piece> and <otherwise>")),
            (_, Output::Head(_)) => return Err(MathError::structure(path, "operator outside of <apply>")),
            (_, Output::Qualifier(qualifier, _))
                => return Err(MathError::structure(path, format!("<{}> outside of <apply>", qualifier.element()))),
            (_, _) => return Err(MathError::structure(path, "element not allowed here")),
        }

        Ok(())
    }

    /// Fails if `node`, completed at `path`, is deeper than the configured maximum.
    fn limit_tree_depth(&self, node: Node, path: &str) -> Result<Node, MathError> {
        let limit = self.settings.max_tree_depth;
        if node.depth() > limit {
            Err(MathError::structure(path, format!("expression tree is more than {} deep", limit)))
        } else {
            Ok(node)
        }
    }

    /// The path of open elements, such as `/math/apply/cn`.
    fn path(&self) -> String {
        if self.frames.is_empty() {
            return "/".into();
        }

        let mut path = String::new();
        for frame in &self.frames {
            path.push('/');
            path.push_str(local_name(&frame.tag));
        }
        path
    }

    /// The path an element called `name` would have if it were opened now.
    fn child_path(&self, name: &str) -> String {
        let mut path = self.path();
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(local_name(name));
        path
    }

    fn top_name(&self) -> &str {
        self.frames.last().map(|f| local_name(&f.tag)).unwrap_or("")
    }

    fn warn(&mut self, path: String, text: String) {
        log::warn!("{}: {}", path, text);
        self.sink.record(Message::warning(ErrorKind::Structure, Location::Element(path), text));
    }

    fn warn_at_child(&mut self, name: &str, text: String) {
        let path = self.child_path(name);
        self.warn(path, text);
    }

    fn check_failure(&self) -> Result<(), MathError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Records `error`, discards everything read so far, and stops the reader.
    fn fail<T>(&mut self, error: MathError) -> Result<T, MathError> {
        log::debug!("stopped reading MathML: {}", error);
        self.sink.record(error.to_message());
        self.frames.clear();
        self.expressions.clear();
        self.failure = Some(error.clone());
        Err(error)
    }

    fn fail_at_child<T>(&mut self, name: &str, message: impl Into<String>) -> Result<T, MathError> {
        let path = self.child_path(name);
        self.fail(MathError::structure(path, message))
    }
}

impl Apply {
    /// Adds a child which is not an operator. A `ci` in the operator position names a
    /// user-defined function.
    fn push(&mut self, mut node: Node) {
        if self.head.is_none() && self.operands.is_empty() {
            if let Node::Identifier(name) = &mut node {
                self.head = Some(Head::Function(FunctionName::User(mem::take(name))));
                return;
            }
        }
        self.operands.push(node);
    }
}

fn fill(qualifier: Qualifier, slot: &mut Option<Node>, node: Node, path: &str) -> Result<(), MathError> {
    if slot.is_some() {
        return Err(MathError::structure(
            path, format!("<{}> must contain exactly one expression", qualifier.element()),
        ));
    }
    *slot = Some(node);
    Ok(())
}

/// Finds the operator named by an empty element inside an `apply`.
fn operator_head(element: &str) -> Option<Head> {
    if let Some(op) = BinaryOperator::from_mathml_element(element) {
        Some(Head::Operator(op))
    } else {
        Builtin::from_mathml_element(element).map(|b| Head::Function(b.into()))
    }
}

fn arity_error(function: &str, expected: Arity, actual: usize, path: &str) -> MathError {
    ArityMismatch { function: function.into(), expected, actual }
        .at(Location::Element(path.into()))
}

/// Builds the node for a closed `apply`.
fn reduce(apply: Apply, path: &str) -> Result<Node, MathError> {
    let Apply { head, qualifier, operands } = apply;
    let head = head.ok_or_else(|| MathError::structure(path, "<apply> has no operator"))?;
    let location = || Location::Element(path.into());

    let allowed = match &head {
        Head::Function(FunctionName::Builtin(Builtin::Log)) => Some(Qualifier::LogBase),
        Head::Function(FunctionName::Builtin(Builtin::Root)) => Some(Qualifier::Degree),
        _ => None,
    };
    if let Some((qualifier, _)) = &qualifier {
        if allowed != Some(*qualifier) {
            return Err(MathError::structure(
                path, format!("<{}> is not allowed in this <apply>", qualifier.element()),
            ));
        }
    }

    match head {
        Head::Operator(op) => {
            let name = op.mathml_element();
            match op {
                // Plus and times are n-ary in MathML; fold them left to right
                BinaryOperator::Plus | BinaryOperator::Times => {
                    if operands.len() < 2 {
                        return Err(arity_error(name, Arity::at_least(2), operands.len(), path));
                    }
                    let mut operands = operands.into_iter();
                    let first = operands.next()
                        .ok_or_else(|| arity_error(name, Arity::at_least(2), 0, path))?;
                    Ok(operands.fold(first, |acc, node| Node::binary(op, acc, node)))
                }

                BinaryOperator::Minus => match <[Node; 1]>::try_from(operands) {
                    Ok([operand]) => Ok(Node::negate(operand)),
                    Err(operands) => match <[Node; 2]>::try_from(operands) {
                        Ok([left, right]) => Ok(Node::binary(op, left, right)),
                        Err(operands) => Err(arity_error(name, Arity::between(1, 2), operands.len(), path)),
                    },
                },

                BinaryOperator::Divide | BinaryOperator::Power => match <[Node; 2]>::try_from(operands) {
                    Ok([left, right]) => Ok(Node::binary(op, left, right)),
                    Err(operands) => Err(arity_error(name, Arity::exactly(2), operands.len(), path)),
                },
            }
        }

        // A root without a degree is a square root
        Head::Function(FunctionName::Builtin(Builtin::Root)) => match qualifier {
            Some((_, degree)) => {
                if operands.len() != 1 {
                    return Err(arity_error("root", Arity::exactly(1), operands.len(), path));
                }
                let mut arguments = vec![degree];
                arguments.extend(operands);
                Node::function(Builtin::Root.into(), arguments).map_err(|e| e.at(location()))
            }
            None => {
                if operands.len() != 1 {
                    return Err(arity_error("root", Arity::exactly(1), operands.len(), path));
                }
                Node::function(Builtin::Sqrt.into(), operands).map_err(|e| e.at(location()))
            }
        },

        Head::Function(FunctionName::Builtin(Builtin::Log)) => {
            if operands.len() != 1 {
                return Err(arity_error("log", Arity::exactly(1), operands.len(), path));
            }
            let arguments = match qualifier {
                Some((_, base)) => {
                    let mut arguments = vec![base];
                    arguments.extend(operands);
                    arguments
                }
                None => operands,
            };
            Node::function(Builtin::Log.into(), arguments).map_err(|e| e.at(location()))
        }

        Head::Function(name) => Node::function(name, operands).map_err(|e| e.at(location())),
    }
}

/// Converts the text of a `cn` into a node. `parts` holds the text on either side of each
/// `sep`.
fn numeral(kind: NumeralType, parts: &[String], path: &str) -> Result<Node, MathError> {
    let malformed = |text: &str| MathError::structure(path, format!("malformed number \"{}\"", text.trim()));

    match (kind, parts) {
        (NumeralType::Real | NumeralType::Integer, [text]) => {
            let text = text.trim();
            let special = match text {
                "NaN" => Some(Constant::NotANumber),
                "INF" => Some(Constant::PositiveInfinity),
                "-INF" => Some(Constant::NegativeInfinity),
                "-0" => Some(Constant::NegativeZero),
                _ => None,
            };
            if let Some(constant) = special {
                return Ok(Node::Constant(constant));
            }

            if kind == NumeralType::Integer {
                text.parse().map(Node::Integer).map_err(|_| malformed(text))
            } else {
                text.parse().map(Node::real).map_err(|_| malformed(text))
            }
        }

        (NumeralType::Rational, [numerator, denominator]) => {
            let n: i64 = numerator.trim().parse().map_err(|_| malformed(numerator.as_str()))?;
            let d: i64 = denominator.trim().parse().map_err(|_| malformed(denominator.as_str()))?;
            let (numerator, denominator) = normalize_rational_sign(n, d)
                .ok_or_else(|| MathError::structure(path, "rational is out of range"))?;
            Ok(Node::Rational { numerator, denominator })
        }

        (NumeralType::ENotation, [mantissa, exponent]) => Ok(Node::RealWithExponent {
            mantissa: mantissa.trim().parse().map_err(|_| malformed(mantissa.as_str()))?,
            exponent: exponent.trim().parse().map_err(|_| malformed(exponent.as_str()))?,
        }),

        (NumeralType::Real | NumeralType::Integer, _)
            => Err(MathError::structure(path, "<sep/> is only allowed in rational and e-notation numbers")),
        (_, _) => Err(MathError::structure(path, "expected exactly one <sep/>")),
    }
}
