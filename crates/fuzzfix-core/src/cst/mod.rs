//! Concrete Syntax Tree (CST) for C
//!
//! A lossless syntax tree built on Rowan's green/red trees. Every byte of
//! the source, trivia included, is kept, so `parse_c(source).syntax().text()`
//! reproduces the input exactly and rewrites can be expressed as byte-offset
//! edits against the original text.
//!
//! The grammar is statement-level: control flow, blocks and labels get
//! their own nodes, while declarations and expressions stay opaque token
//! runs. Preprocessor directives are trivia.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fuzzfix_core::cst::{CSyntaxKind, parse_c};
//!
//! let parse = parse_c("int main() { while (n--) step(); }");
//! let root = parse.syntax();
//!
//! let loops = root.descendants().filter(|n| n.kind() == CSyntaxKind::WhileStmt);
//! assert_eq!(loops.count(), 1);
//! ```

mod builder;
mod language;
mod lexer;
mod macros;
mod parser;
mod syntax_kind;

pub mod ast;

pub use builder::CstBuilder;
pub use language::{CLanguage, CSyntaxElement, CSyntaxNode, CSyntaxToken};
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use macros::{MacroOrigin, MacroTable};
pub use parser::{Parse, ParseError, ParseErrorKind, parse_c};
pub use syntax_kind::CSyntaxKind;
