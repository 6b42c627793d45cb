//! A lossless syntax tree for JavaScript-family source files.
//!
//! This crate provides the parsing and printing half of remold:
//! - A hand-written tokenizer that copes with strings, templates, comments,
//!   and the regex-versus-division ambiguity
//! - A parser producing an arena-backed [`SyntaxTree`] that models import
//!   declarations structurally and keeps everything else as opaque spans
//! - A format-preserving printer: untouched nodes reproduce their original
//!   text byte-for-byte, synthesized nodes render canonically
//! - Depth-first visitor sugar for transform authors
//!
//! The round-trip guarantee: for any accepted source, printing an unmutated
//! tree returns the input exactly.

pub mod codegen;
pub mod nodes;
pub mod parser;
pub mod span;
pub mod tokenizer;
pub mod visitor;

pub use codegen::print;
pub use nodes::{Node, NodeId, NodeKind, SyntaxTree};
pub use parser::{parse, ParseError, ParserOptions, SyntaxExtension};
pub use span::Span;
