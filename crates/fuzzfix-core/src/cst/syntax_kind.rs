//! Syntax kinds for the C concrete syntax tree
//!
//! Token kinds come first, node kinds after. The numeric values are the raw
//! rowan kinds, so the enum is `repr(u16)` and conversion back goes through
//! [`CSyntaxKind::from_raw`].

/// Every token and node kind the C lexer and parser produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum CSyntaxKind {
    // Trivia
    Whitespace = 0,
    Newline,
    CommentLine,
    CommentBlock,
    /// A complete preprocessor directive, continuation lines included
    Preprocessor,

    // Statement keywords
    IfKw,
    ElseKw,
    WhileKw,
    DoKw,
    ForKw,
    SwitchKw,
    CaseKw,
    DefaultKw,
    ReturnKw,
    BreakKw,
    ContinueKw,
    GotoKw,

    // Literals and identifiers
    Ident,
    Number,
    String,
    Char,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Colon,
    ColonColon,
    Comma,
    Question,
    Bang,
    /// Any other operator (`==`, `->`, `+=`, `*`, ...)
    Operator,

    /// A character the lexer could not classify
    Unknown,

    // Nodes
    TranslationUnit,
    Item,
    DeclBlock,
    FunctionBody,
    CompoundStmt,
    IfStmt,
    WhileStmt,
    DoStmt,
    ForStmt,
    ForHeader,
    ForInit,
    ForStep,
    SwitchStmt,
    LabeledStmt,
    ExprStmt,
    EmptyStmt,
    Condition,
    MacroCondition,
    Expr,
    Error,

    #[doc(hidden)]
    __Last,
}

impl CSyntaxKind {
    /// Convert a raw rowan kind back into a syntax kind
    pub fn from_raw(raw: u16) -> Self {
        assert!(raw < Self::__Last as u16, "invalid raw syntax kind {raw}");
        // SAFETY: `CSyntaxKind` is `repr(u16)` with contiguous discriminants
        // starting at zero, and `raw` was bounds-checked above.
        unsafe { std::mem::transmute::<u16, CSyntaxKind>(raw) }
    }

    /// Whitespace, newlines, comments and preprocessor directives
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace
                | Self::Newline
                | Self::CommentLine
                | Self::CommentBlock
                | Self::Preprocessor
        )
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::IfKw
                | Self::ElseKw
                | Self::WhileKw
                | Self::DoKw
                | Self::ForKw
                | Self::SwitchKw
                | Self::CaseKw
                | Self::DefaultKw
                | Self::ReturnKw
                | Self::BreakKw
                | Self::ContinueKw
                | Self::GotoKw
        )
    }

    /// Kinds that can appear as a statement node
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            Self::CompoundStmt
                | Self::IfStmt
                | Self::WhileStmt
                | Self::DoStmt
                | Self::ForStmt
                | Self::SwitchStmt
                | Self::LabeledStmt
                | Self::ExprStmt
                | Self::EmptyStmt
        )
    }

    /// Map an identifier-like word to its keyword kind
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "if" => Self::IfKw,
            "else" => Self::ElseKw,
            "while" => Self::WhileKw,
            "do" => Self::DoKw,
            "for" => Self::ForKw,
            "switch" => Self::SwitchKw,
            "case" => Self::CaseKw,
            "default" => Self::DefaultKw,
            "return" => Self::ReturnKw,
            "break" => Self::BreakKw,
            "continue" => Self::ContinueKw,
            "goto" => Self::GotoKw,
            _ => return None,
        };
        Some(kind)
    }
}

impl From<CSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: CSyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        for kind in [
            CSyntaxKind::Whitespace,
            CSyntaxKind::IfKw,
            CSyntaxKind::Operator,
            CSyntaxKind::IfStmt,
            CSyntaxKind::Error,
        ] {
            let raw: rowan::SyntaxKind = kind.into();
            assert_eq!(CSyntaxKind::from_raw(raw.0), kind);
        }
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(CSyntaxKind::from_keyword("while"), Some(CSyntaxKind::WhileKw));
        assert_eq!(CSyntaxKind::from_keyword("int"), None);
        assert!(CSyntaxKind::Preprocessor.is_trivia());
        assert!(!CSyntaxKind::Ident.is_trivia());
    }
}
