//! Typed AST layer over the C CST
//!
//! Thin wrappers that give the rewrite rules structural accessors
//! (`then_branch`, `parent_if`, `body`, ...) without copying the tree.
//!
//! # Example
//!
//! ```ignore
//! use fuzzfix_core::cst::{parse_c, ast::{AstNode, IfStmt}};
//!
//! let parse = parse_c("void f() { if (a > 1) g(); }");
//! let if_stmt = parse.syntax().descendants().find_map(IfStmt::cast).unwrap();
//!
//! assert_eq!(if_stmt.condition().unwrap().text(), "a > 1");
//! assert!(if_stmt.parent_if().is_none());
//! ```

use rowan::TextRange;

use super::{CSyntaxKind, CSyntaxNode, CSyntaxToken};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: CSyntaxKind) -> bool;
    fn cast(node: CSyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &CSyntaxNode;
}

/// Helper function to find first child of a specific kind
fn child_of_kind(parent: &CSyntaxNode, kind: CSyntaxKind) -> Option<CSyntaxNode> {
    parent.children().find(|n| n.kind() == kind)
}

/// Helper function to find first token of a specific kind
fn token_of_kind(parent: &CSyntaxNode, kind: CSyntaxKind) -> Option<CSyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Statement children in source order
fn statements(parent: &CSyntaxNode) -> impl Iterator<Item = Statement> {
    parent.children().filter_map(Statement::cast)
}

/// Non-trivia tokens under a node, in source order
pub fn significant_tokens(node: &CSyntaxNode) -> Vec<CSyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
        .collect()
}

// ============================================================================
// Statements
// ============================================================================

/// Any statement node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    syntax: CSyntaxNode,
}

impl AstNode for Statement {
    fn can_cast(kind: CSyntaxKind) -> bool {
        kind.is_statement()
    }

    fn cast(node: CSyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self { syntax: node })
        } else {
            None
        }
    }

    fn syntax(&self) -> &CSyntaxNode {
        &self.syntax
    }
}

impl Statement {
    pub fn kind(&self) -> CSyntaxKind {
        self.syntax.kind()
    }

    /// Whether this statement is a `{ ... }` block
    pub fn is_compound(&self) -> bool {
        self.kind() == CSyntaxKind::CompoundStmt
    }

    pub fn as_compound(&self) -> Option<CompoundStmt> {
        CompoundStmt::cast(self.syntax.clone())
    }

    pub fn text_range(&self) -> TextRange {
        self.syntax.text_range()
    }
}

/// `{ ... }` block, either a compound statement or a function body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundStmt {
    syntax: CSyntaxNode,
}

impl AstNode for CompoundStmt {
    fn can_cast(kind: CSyntaxKind) -> bool {
        matches!(kind, CSyntaxKind::CompoundStmt | CSyntaxKind::FunctionBody)
    }

    fn cast(node: CSyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self { syntax: node })
        } else {
            None
        }
    }

    fn syntax(&self) -> &CSyntaxNode {
        &self.syntax
    }
}

impl CompoundStmt {
    pub fn l_brace(&self) -> Option<CSyntaxToken> {
        token_of_kind(&self.syntax, CSyntaxKind::LBrace)
    }

    pub fn r_brace(&self) -> Option<CSyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == CSyntaxKind::RBrace)
            .last()
    }

    pub fn statements(&self) -> impl Iterator<Item = Statement> {
        statements(&self.syntax)
    }
}

/// `if` statement
///
/// An `else if` is the `IfStmt` in the else position of its parent, so
/// chains are nested `IfStmt` nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    syntax: CSyntaxNode,
}

impl AstNode for IfStmt {
    fn can_cast(kind: CSyntaxKind) -> bool {
        kind == CSyntaxKind::IfStmt
    }

    fn cast(node: CSyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self { syntax: node })
        } else {
            None
        }
    }

    fn syntax(&self) -> &CSyntaxNode {
        &self.syntax
    }
}

impl IfStmt {
    pub fn condition(&self) -> Option<Condition> {
        self.syntax.children().find_map(Condition::cast_clause)
    }

    pub fn then_branch(&self) -> Option<Statement> {
        statements(&self.syntax).next()
    }

    pub fn else_branch(&self) -> Option<Statement> {
        token_of_kind(&self.syntax, CSyntaxKind::ElseKw)?;
        statements(&self.syntax).nth(1)
    }

    /// The enclosing `if`, when this statement is one of its branches
    pub fn parent_if(&self) -> Option<IfStmt> {
        self.syntax.parent().and_then(IfStmt::cast)
    }

    pub fn text_range(&self) -> TextRange {
        self.syntax.text_range()
    }
}

/// `while` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
    syntax: CSyntaxNode,
}

impl AstNode for WhileStmt {
    fn can_cast(kind: CSyntaxKind) -> bool {
        kind == CSyntaxKind::WhileStmt
    }

    fn cast(node: CSyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self { syntax: node })
        } else {
            None
        }
    }

    fn syntax(&self) -> &CSyntaxNode {
        &self.syntax
    }
}

impl WhileStmt {
    pub fn condition(&self) -> Option<Condition> {
        self.syntax.children().find_map(Condition::cast_clause)
    }

    pub fn body(&self) -> Option<Statement> {
        statements(&self.syntax).next()
    }
}

/// `for` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForStmt {
    syntax: CSyntaxNode,
}

impl AstNode for ForStmt {
    fn can_cast(kind: CSyntaxKind) -> bool {
        kind == CSyntaxKind::ForStmt
    }

    fn cast(node: CSyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self { syntax: node })
        } else {
            None
        }
    }

    fn syntax(&self) -> &CSyntaxNode {
        &self.syntax
    }
}

impl ForStmt {
    /// The middle clause of the header; `None` when omitted or range-based
    pub fn condition(&self) -> Option<Condition> {
        let header = child_of_kind(&self.syntax, CSyntaxKind::ForHeader)?;
        child_of_kind(&header, CSyntaxKind::Expr).map(|syntax| Condition { syntax })
    }

    pub fn body(&self) -> Option<Statement> {
        statements(&self.syntax).next()
    }
}

/// What introduces a labeled statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Case,
    Default,
    Goto,
}

/// `case x:`, `default:` or `name:` and the statement it labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledStmt {
    syntax: CSyntaxNode,
}

impl AstNode for LabeledStmt {
    fn can_cast(kind: CSyntaxKind) -> bool {
        kind == CSyntaxKind::LabeledStmt
    }

    fn cast(node: CSyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self { syntax: node })
        } else {
            None
        }
    }

    fn syntax(&self) -> &CSyntaxNode {
        &self.syntax
    }
}

impl LabeledStmt {
    pub fn label_kind(&self) -> LabelKind {
        let first = self
            .syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
            .map(|t| t.kind());
        match first {
            Some(CSyntaxKind::CaseKw) => LabelKind::Case,
            Some(CSyntaxKind::DefaultKw) => LabelKind::Default,
            _ => LabelKind::Goto,
        }
    }

    pub fn statement(&self) -> Option<Statement> {
        statements(&self.syntax).next()
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// How a condition is written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionSpelling {
    /// `if (expr)`, `while (expr)` or the middle clause of a `for` header
    Parenthesized,
    /// `if gtzero(c)`: a macro that expands to a parenthesized expression
    MacroInvocation,
}

/// Type words that can only start a declaration
const DECLARATION_WORDS: [&str; 22] = [
    "int", "char", "short", "long", "unsigned", "signed", "float", "double", "bool", "_Bool",
    "void", "auto", "const", "volatile", "static", "register", "struct", "union", "enum",
    "class", "typename", "decltype",
];

/// Keyword operators that may precede an identifier in an expression
const OPERATOR_WORDS: [&str; 14] = [
    "sizeof", "_Alignof", "alignof", "_Generic", "not", "and", "or", "xor", "bitand", "bitor",
    "compl", "not_eq", "noexcept", "typeid",
];

/// A controlling condition
///
/// Wraps a `Condition` (parenthesized), a `MacroCondition`, or the `Expr`
/// clause of a `for` header. The condition *expression* is what gets
/// replaced by the temporary: the tokens inside the parentheses, or the
/// whole macro invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    syntax: CSyntaxNode,
}

impl AstNode for Condition {
    fn can_cast(kind: CSyntaxKind) -> bool {
        matches!(
            kind,
            CSyntaxKind::Condition | CSyntaxKind::MacroCondition | CSyntaxKind::Expr
        )
    }

    fn cast(node: CSyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self { syntax: node })
        } else {
            None
        }
    }

    fn syntax(&self) -> &CSyntaxNode {
        &self.syntax
    }
}

impl Condition {
    /// Cast only the clause kinds that follow `if`, `while` and `switch`
    fn cast_clause(node: CSyntaxNode) -> Option<Self> {
        matches!(
            node.kind(),
            CSyntaxKind::Condition | CSyntaxKind::MacroCondition
        )
        .then_some(Self { syntax: node })
    }

    pub fn spelling(&self) -> ConditionSpelling {
        match self.syntax.kind() {
            CSyntaxKind::MacroCondition => ConditionSpelling::MacroInvocation,
            _ => ConditionSpelling::Parenthesized,
        }
    }

    /// The expression node; `None` for empty parentheses
    pub fn expr(&self) -> Option<CSyntaxNode> {
        match self.syntax.kind() {
            CSyntaxKind::Condition => child_of_kind(&self.syntax, CSyntaxKind::Expr),
            _ => Some(self.syntax.clone()),
        }
    }

    /// Range of the expression text
    pub fn expr_range(&self) -> Option<TextRange> {
        self.expr().map(|expr| expr.text_range())
    }

    /// Verbatim expression text
    pub fn text(&self) -> String {
        self.expr()
            .map(|expr| expr.text().to_string())
            .unwrap_or_default()
    }

    pub fn tokens(&self) -> Vec<CSyntaxToken> {
        self.expr()
            .map(|expr| significant_tokens(&expr))
            .unwrap_or_default()
    }

    /// The identifier, when the condition is exactly one identifier
    pub fn single_identifier(&self) -> Option<String> {
        match self.tokens().as_slice() {
            [token] if token.kind() == CSyntaxKind::Ident => Some(token.text().to_string()),
            _ => None,
        }
    }

    /// C++ declaration conditions (`if (int n = f())`) and init-statements
    /// (`if (auto it = m.find(k); it != m.end())`) are not expressions
    pub fn is_declaration(&self) -> bool {
        if self.spelling() == ConditionSpelling::MacroInvocation {
            return false;
        }

        let tokens = self.tokens();
        let mut depth = 0usize;
        for token in &tokens {
            match token.kind() {
                CSyntaxKind::LParen | CSyntaxKind::LBracket | CSyntaxKind::LBrace => depth += 1,
                CSyntaxKind::RParen | CSyntaxKind::RBracket | CSyntaxKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                CSyntaxKind::Semicolon if depth == 0 => return true,
                _ => {}
            }
        }

        let kinds: Vec<_> = tokens.iter().take(4).map(|t| t.kind()).collect();
        let texts: Vec<_> = tokens.iter().take(4).map(|t| t.text().to_string()).collect();
        match (kinds.as_slice(), texts.as_slice()) {
            ([CSyntaxKind::Ident, ..], [first, ..]) if DECLARATION_WORDS.contains(&first.as_str()) => {
                true
            }
            // `Type name = ...` / `Type name{...}`
            ([CSyntaxKind::Ident, CSyntaxKind::Ident, third, ..], [first, _, init, ..])
                if !OPERATOR_WORDS.contains(&first.as_str()) =>
            {
                *third == CSyntaxKind::LBrace || (*third == CSyntaxKind::Operator && init == "=")
            }
            // `Type *name = ...` / `Type &name = ...`
            (
                [
                    CSyntaxKind::Ident,
                    CSyntaxKind::Operator,
                    CSyntaxKind::Ident,
                    CSyntaxKind::Operator,
                ],
                [_, pointer, _, assign],
            ) => matches!(pointer.as_str(), "*" | "&" | "&&") && assign == "=",
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_c;

    fn find<N: AstNode>(source: &str) -> Vec<N> {
        let parse = parse_c(source);
        assert!(!parse.has_errors(), "{:?}", parse.errors());
        parse.syntax().descendants().filter_map(N::cast).collect()
    }

    #[test]
    fn test_if_branches() {
        let ifs = find::<IfStmt>("void f() { if (a > 1) { x(); } else if (b) y(); }");
        assert_eq!(ifs.len(), 2);

        let head = &ifs[0];
        assert_eq!(head.condition().unwrap().text(), "a > 1");
        assert!(head.then_branch().unwrap().is_compound());
        assert_eq!(head.else_branch().unwrap().kind(), CSyntaxKind::IfStmt);
        assert!(head.parent_if().is_none());

        let tail = &ifs[1];
        assert_eq!(tail.parent_if().as_ref(), Some(head));
        assert!(tail.else_branch().is_none());
    }

    #[test]
    fn test_loop_bodies_and_conditions() {
        let whiles = find::<WhileStmt>("void f() { while (n--) g(); }");
        assert_eq!(whiles[0].condition().unwrap().text(), "n--");
        assert!(!whiles[0].body().unwrap().is_compound());

        let fors = find::<ForStmt>("void f() { for (i = 0; i < n; i++) { g(); } for (;;) {} }");
        assert_eq!(fors[0].condition().unwrap().text(), "i < n");
        assert!(fors[0].body().unwrap().is_compound());
        assert!(fors[1].condition().is_none());
    }

    #[test]
    fn test_compound_braces() {
        let blocks = find::<CompoundStmt>("void f() { { a(); } }");
        let inner = &blocks[1];
        assert_eq!(inner.l_brace().unwrap().text(), "{");
        assert_eq!(inner.r_brace().unwrap().text(), "}");
        assert_eq!(inner.statements().count(), 1);
    }

    #[test]
    fn test_label_kinds() {
        let labels =
            find::<LabeledStmt>("void f() { switch (c) { case 1: a(); default: b(); } out: ; }");
        let kinds: Vec<_> = labels.iter().map(|l| l.label_kind()).collect();
        assert_eq!(kinds, vec![LabelKind::Case, LabelKind::Default, LabelKind::Goto]);
        assert_eq!(labels[0].statement().unwrap().kind(), CSyntaxKind::ExprStmt);
    }

    #[test]
    fn test_condition_shapes() {
        let ifs = find::<IfStmt>("void f() { if (x) a(); if gtzero(c) b(); if () c(); }");
        assert_eq!(ifs[0].condition().unwrap().single_identifier().as_deref(), Some("x"));

        let macro_cond = ifs[1].condition().unwrap();
        assert_eq!(macro_cond.spelling(), ConditionSpelling::MacroInvocation);
        assert_eq!(macro_cond.text(), "gtzero(c)");

        assert!(ifs[2].condition().unwrap().expr().is_none());
    }

    #[test]
    fn test_declaration_conditions() {
        let ifs = find::<IfStmt>(
            "void f() {
                if (int n = g()) a();
                if (Foo *p = get()) a();
                if (auto it = m.find(k); it != m.end()) a();
                if (Widget w{1}) a();
                if (a * b == c) a();
                if (x = next()) a();
                if (sizeof x > 4) a();
                if (sizeof buf == n) a();
                if (not ready) a();
            }",
        );
        let decls: Vec<_> = ifs
            .iter()
            .map(|i| i.condition().unwrap().is_declaration())
            .collect();
        assert_eq!(
            decls,
            vec![true, true, true, true, false, false, false, false, false]
        );
    }
}
