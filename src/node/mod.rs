//! The expression tree, and its infix text representation.
//!
//! [tree::Node] is the tree type shared by the whole crate. Infix text is turned into a tree by
//! the [parser], which pulls tokens from the [tokenizer], and turned back into text by the
//! [format] module (also available as `Node`'s `Display` implementation).
//!
//! The MathML representation of the same tree lives in [crate::mathml].

pub mod tree;
pub mod function;
pub mod tokenizer;
pub mod parser;
pub mod format;
