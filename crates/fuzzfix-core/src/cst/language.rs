//! Rowan language implementation for C
//!
//! Connects [`CSyntaxKind`] to Rowan's generic CST infrastructure.

use rowan::Language;

use super::CSyntaxKind;

/// Zero-sized language tag for the C syntax tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CLanguage;

impl Language for CLanguage {
    type Kind = CSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        CSyntaxKind::from_raw(raw.0)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Red tree node with parent pointers
pub type CSyntaxNode = rowan::SyntaxNode<CLanguage>;
/// Red tree token
pub type CSyntaxToken = rowan::SyntaxToken<CLanguage>;
/// Either a node or a token
pub type CSyntaxElement = rowan::SyntaxElement<CLanguage>;
