//! Thin wrapper over Rowan's green tree builder

use rowan::{GreenNode, GreenNodeBuilder};

use super::{CSyntaxKind, CstToken};

/// Builds a green tree from C syntax kinds
///
/// Tokens are copied verbatim, so a tree built from a complete token stream
/// reproduces its source text exactly.
pub struct CstBuilder {
    builder: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
        }
    }

    pub fn start_node(&mut self, kind: CSyntaxKind) {
        self.builder.start_node(kind.into());
    }

    pub fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub fn token(&mut self, kind: CSyntaxKind, text: &str) {
        self.builder.token(kind.into(), text);
    }

    /// Add a lexed token
    pub fn add_token(&mut self, token: &CstToken) {
        self.token(token.kind, &token.text);
    }

    /// Finish the tree and return the green root
    pub fn finish(self) -> GreenNode {
        self.builder.finish()
    }
}

impl Default for CstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{CSyntaxNode, lex_with_trivia};

    #[test]
    fn test_flat_tree_is_lossless() {
        let source = "a = b; /* c */\n";
        let (tokens, _) = lex_with_trivia(source);
        let mut builder = CstBuilder::new();
        builder.start_node(CSyntaxKind::TranslationUnit);
        for token in &tokens {
            builder.add_token(token);
        }
        builder.finish_node();

        let root = CSyntaxNode::new_root(builder.finish());
        assert_eq!(root.kind(), CSyntaxKind::TranslationUnit);
        assert_eq!(root.text().to_string(), source);
        assert_eq!(root.children().count(), 0);
    }
}
