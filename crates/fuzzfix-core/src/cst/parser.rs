//! Statement-level recursive descent parser for C
//!
//! The parser only builds the structure the rewrite rules care about:
//! control statements, blocks, labels and conditions. Declarations and
//! expressions stay opaque token runs (`Item`, `ExprStmt`, `Expr`) with
//! balanced delimiters.
//!
//! Trivia is attached lazily: a node starts at its first significant token
//! and ends at its last one, so trivia around a node belongs to its parent.

use std::fmt;

use rowan::GreenNode;

use super::lexer::{CstSpan, LexerError};
use super::{CSyntaxKind, CSyntaxNode, CstBuilder, CstToken};

/// Category of a parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unterminated literal or comment, unknown character
    Lexer,
    UnclosedDelimiter,
    MismatchedDelimiter,
    UnexpectedToken,
    MissingCondition,
    MissingStatement,
    StrayElse,
}

/// A parse error with its byte span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub span: CstSpan,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> Self {
        Self {
            kind: ParseErrorKind::Lexer,
            message: err.message,
            span: err.span,
        }
    }
}

/// Result of parsing a translation unit
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    /// Root `TranslationUnit` node
    pub fn syntax(&self) -> CSyntaxNode {
        CSyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse C source into a lossless CST
///
/// # Example
///
/// ```rust,ignore
/// use fuzzfix_core::cst::parse_c;
///
/// let source = "int main() { if (x > 1) return 0; }";
/// let parse = parse_c(source);
/// assert!(!parse.has_errors());
/// assert_eq!(parse.syntax().text().to_string(), source);
/// ```
pub fn parse_c(source: &str) -> Parse {
    let (tokens, lexer_errors) = super::lex_with_trivia(source);
    let mut parser = Parser::new(&tokens, source.len());
    parser.errors.extend(lexer_errors.into_iter().map(ParseError::from));
    parser.parse_translation_unit();
    parser.finish()
}

/// Words that introduce an aggregate or alias, whose braces hold members
const AGGREGATE_WORDS: [&str; 5] = ["struct", "union", "class", "enum", "typedef"];
/// Words whose brace block ends the enclosing item
const SCOPE_WORDS: [&str; 3] = ["namespace", "extern", "inline"];

struct Parser<'a> {
    tokens: &'a [CstToken],
    pos: usize,
    source_len: usize,
    builder: CstBuilder,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken], source_len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            source_len,
            builder: CstBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    fn parse_translation_unit(&mut self) {
        self.builder.start_node(CSyntaxKind::TranslationUnit);

        while let Some(kind) = self.current_kind() {
            match kind {
                CSyntaxKind::RBrace | CSyntaxKind::RParen | CSyntaxKind::RBracket => {
                    self.bump_error(ParseErrorKind::UnexpectedToken, "unmatched closing delimiter");
                }
                _ => self.parse_item(),
            }
        }

        self.eat_trivia();
        self.builder.finish_node(); // TRANSLATION_UNIT
    }

    /// Parse a top-level or block-level declaration
    ///
    /// Declarations are opaque up to their `;`. A brace opens a function
    /// body after a parameter list, a member block after a scope or
    /// aggregate head, and is skipped as an initializer after `=`.
    fn parse_item(&mut self) {
        self.start_node(CSyntaxKind::Item);

        let first_word = self.current().map(|t| t.text.clone()).unwrap_or_default();
        let mut saw_params = false;
        let mut saw_assign = false;

        while let Some(kind) = self.current_kind() {
            match kind {
                CSyntaxKind::Semicolon => {
                    self.bump();
                    break;
                }
                CSyntaxKind::RBrace => break,
                CSyntaxKind::RParen | CSyntaxKind::RBracket => {
                    self.bump_error(ParseErrorKind::UnexpectedToken, "unmatched closing delimiter");
                }
                CSyntaxKind::LParen => {
                    saw_params = true;
                    self.bump_group();
                }
                CSyntaxKind::LBracket => self.bump_group(),
                CSyntaxKind::LBrace if saw_assign => self.bump_group(),
                CSyntaxKind::LBrace
                    if saw_params && !AGGREGATE_WORDS.contains(&first_word.as_str()) =>
                {
                    self.parse_block(CSyntaxKind::FunctionBody);
                    break;
                }
                CSyntaxKind::LBrace => {
                    self.parse_decl_block();
                    if SCOPE_WORDS.contains(&first_word.as_str()) {
                        break;
                    }
                }
                CSyntaxKind::Operator if self.current_text() == "=" => {
                    saw_assign = true;
                    self.bump();
                }
                _ => self.bump(),
            }
        }

        self.builder.finish_node(); // ITEM
    }

    /// `{ item* }` for namespaces, linkage blocks and aggregate bodies
    fn parse_decl_block(&mut self) {
        self.start_node(CSyntaxKind::DeclBlock);
        let open = self.current_span();
        self.bump(); // {

        loop {
            match self.current_kind() {
                None => {
                    self.error(ParseErrorKind::UnclosedDelimiter, "unclosed '{'", open);
                    break;
                }
                Some(CSyntaxKind::RBrace) => {
                    self.bump();
                    break;
                }
                Some(_) => self.parse_item(),
            }
        }

        self.builder.finish_node(); // DECL_BLOCK
    }

    /// `{ statement* }` as a function body or compound statement
    fn parse_block(&mut self, kind: CSyntaxKind) {
        self.start_node(kind);
        let open = self.current_span();
        self.bump(); // {

        loop {
            match self.current_kind() {
                None => {
                    self.error(ParseErrorKind::UnclosedDelimiter, "unclosed '{'", open);
                    break;
                }
                Some(CSyntaxKind::RBrace) => {
                    self.bump();
                    break;
                }
                Some(_) => self.parse_statement(),
            }
        }

        self.builder.finish_node();
    }

    fn parse_statement(&mut self) {
        let Some(kind) = self.current_kind() else {
            let at = self.current_span();
            self.error(ParseErrorKind::MissingStatement, "expected statement", at);
            return;
        };

        match kind {
            CSyntaxKind::LBrace => self.parse_block(CSyntaxKind::CompoundStmt),
            CSyntaxKind::IfKw => self.parse_if(),
            CSyntaxKind::WhileKw => self.parse_while(),
            CSyntaxKind::DoKw => self.parse_do(),
            CSyntaxKind::ForKw => self.parse_for(),
            CSyntaxKind::SwitchKw => self.parse_switch(),
            CSyntaxKind::CaseKw | CSyntaxKind::DefaultKw => self.parse_labeled(),
            CSyntaxKind::Ident if self.nth_kind(1) == Some(CSyntaxKind::Colon) => {
                self.parse_labeled()
            }
            CSyntaxKind::Semicolon => {
                self.start_node(CSyntaxKind::EmptyStmt);
                self.bump();
                self.builder.finish_node();
            }
            CSyntaxKind::ElseKw => {
                self.bump_error(ParseErrorKind::StrayElse, "'else' without a matching 'if'");
            }
            CSyntaxKind::RBrace => {
                let at = self.current_span();
                self.error(ParseErrorKind::MissingStatement, "expected statement before '}'", at);
            }
            CSyntaxKind::RParen | CSyntaxKind::RBracket => {
                self.bump_error(ParseErrorKind::UnexpectedToken, "unmatched closing delimiter");
            }
            _ => self.parse_expr_stmt(),
        }
    }

    /// Grammar: if [constexpr] <condition> <statement> [else <statement>]
    fn parse_if(&mut self) {
        self.start_node(CSyntaxKind::IfStmt);
        self.bump(); // if

        if self.at(CSyntaxKind::Ident) && self.current_text() == "constexpr" {
            self.bump();
        }

        self.parse_condition("if");
        self.parse_statement();

        if self.at(CSyntaxKind::ElseKw) {
            self.bump();
            self.parse_statement();
        }

        self.builder.finish_node(); // IF_STMT
    }

    /// Grammar: while <condition> <statement>
    fn parse_while(&mut self) {
        self.start_node(CSyntaxKind::WhileStmt);
        self.bump(); // while
        self.parse_condition("while");
        self.parse_statement();
        self.builder.finish_node(); // WHILE_STMT
    }

    /// Grammar: do <statement> while <condition> ;
    fn parse_do(&mut self) {
        self.start_node(CSyntaxKind::DoStmt);
        self.bump(); // do
        self.parse_statement();

        if self.at(CSyntaxKind::WhileKw) {
            self.bump();
            self.parse_condition("do-while");
            self.expect(CSyntaxKind::Semicolon, "expected ';' after do-while");
        } else {
            let at = self.current_span();
            self.error(
                ParseErrorKind::UnexpectedToken,
                "expected 'while' after do body",
                at,
            );
        }

        self.builder.finish_node(); // DO_STMT
    }

    /// Grammar: for ( [init] ; [cond] ; [step] ) <statement>
    ///
    /// A header without `;` is a range-based for and has no condition.
    fn parse_for(&mut self) {
        self.start_node(CSyntaxKind::ForStmt);
        self.bump(); // for

        if self.at(CSyntaxKind::LParen) {
            self.parse_for_header();
        } else {
            let at = self.current_span();
            self.error(ParseErrorKind::MissingCondition, "expected '(' after 'for'", at);
        }

        self.parse_statement();
        self.builder.finish_node(); // FOR_STMT
    }

    fn parse_for_header(&mut self) {
        self.start_node(CSyntaxKind::ForHeader);
        let open = self.current_span();
        self.bump(); // (

        let at_clause_end =
            |kind: CSyntaxKind| matches!(kind, CSyntaxKind::Semicolon | CSyntaxKind::RParen);

        self.parse_opaque(CSyntaxKind::ForInit, at_clause_end);

        if self.at(CSyntaxKind::Semicolon) {
            self.bump();
            self.parse_opaque(CSyntaxKind::Expr, at_clause_end);
            self.expect(CSyntaxKind::Semicolon, "expected ';' in for header");
            self.parse_opaque(CSyntaxKind::ForStep, |kind| kind == CSyntaxKind::RParen);
        }

        if self.at(CSyntaxKind::RParen) {
            self.bump();
        } else {
            self.error(ParseErrorKind::UnclosedDelimiter, "unclosed '(' in for header", open);
        }

        self.builder.finish_node(); // FOR_HEADER
    }

    /// Grammar: switch <condition> <statement>
    fn parse_switch(&mut self) {
        self.start_node(CSyntaxKind::SwitchStmt);
        self.bump(); // switch
        self.parse_condition("switch");
        self.parse_statement();
        self.builder.finish_node(); // SWITCH_STMT
    }

    /// `case <expr>:`, `default:` or `<ident>:` followed by a statement
    ///
    /// A label directly before `}` has no statement.
    fn parse_labeled(&mut self) {
        self.start_node(CSyntaxKind::LabeledStmt);

        match self.current_kind() {
            Some(CSyntaxKind::CaseKw) => {
                self.bump();
                self.parse_case_value();
            }
            _ => {
                self.bump(); // default or label name
                self.expect(CSyntaxKind::Colon, "expected ':' after label");
            }
        }

        if !matches!(self.current_kind(), None | Some(CSyntaxKind::RBrace)) {
            self.parse_statement();
        }

        self.builder.finish_node(); // LABELED_STMT
    }

    /// Consume a case value through its colon, skipping ternary colons
    fn parse_case_value(&mut self) {
        let mut open_ternaries = 0usize;
        loop {
            match self.current_kind() {
                Some(CSyntaxKind::Colon) if open_ternaries == 0 => {
                    self.bump();
                    break;
                }
                Some(CSyntaxKind::Colon) => {
                    open_ternaries -= 1;
                    self.bump();
                }
                Some(CSyntaxKind::Question) => {
                    open_ternaries += 1;
                    self.bump();
                }
                Some(CSyntaxKind::LParen | CSyntaxKind::LBracket | CSyntaxKind::LBrace) => {
                    self.bump_group();
                }
                None | Some(CSyntaxKind::RBrace | CSyntaxKind::Semicolon) => {
                    let at = self.current_span();
                    self.error(
                        ParseErrorKind::UnexpectedToken,
                        "expected ':' after case value",
                        at,
                    );
                    break;
                }
                Some(CSyntaxKind::RParen | CSyntaxKind::RBracket) => {
                    self.bump_error(ParseErrorKind::UnexpectedToken, "unmatched closing delimiter");
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Expression, declaration or jump statement up to `;`
    ///
    /// A statement-position call followed directly by a brace
    /// (`list_for_each(p, head) { ... }`) ends before the brace so the block
    /// parses as a statement of its own. So does a run of bare words in front
    /// of a brace (`try { ... }`). A control keyword always starts a new
    /// statement.
    fn parse_expr_stmt(&mut self) {
        self.start_node(CSyntaxKind::ExprStmt);
        let start = self.pos;

        if self.at(CSyntaxKind::Ident) && self.nth_kind(1) == Some(CSyntaxKind::LParen) {
            self.bump();
            self.bump_group();
            if self.at(CSyntaxKind::LBrace) {
                self.builder.finish_node();
                return;
            }
        }

        let mut only_words = self.pos == start;
        while let Some(kind) = self.current_kind() {
            let consumed = self.pos > start;
            match kind {
                CSyntaxKind::Semicolon => {
                    self.bump();
                    break;
                }
                // Macro statements may omit their semicolon before a closing brace
                CSyntaxKind::RBrace => break,
                CSyntaxKind::IfKw
                | CSyntaxKind::WhileKw
                | CSyntaxKind::ForKw
                | CSyntaxKind::DoKw
                | CSyntaxKind::SwitchKw
                | CSyntaxKind::CaseKw
                | CSyntaxKind::DefaultKw
                | CSyntaxKind::ElseKw
                    if consumed =>
                {
                    break;
                }
                CSyntaxKind::LBrace if only_words && consumed => break,
                CSyntaxKind::LParen | CSyntaxKind::LBracket | CSyntaxKind::LBrace => {
                    self.bump_group();
                }
                CSyntaxKind::RParen | CSyntaxKind::RBracket => {
                    self.bump_error(ParseErrorKind::UnexpectedToken, "unmatched closing delimiter");
                }
                _ => self.bump(),
            }
            if kind != CSyntaxKind::Ident {
                only_words = false;
            }
        }

        self.builder.finish_node(); // EXPR_STMT
    }

    /// Parenthesized condition, or an unparenthesized macro invocation
    fn parse_condition(&mut self, owner: &str) {
        match self.current_kind() {
            Some(CSyntaxKind::LParen) => {
                self.start_node(CSyntaxKind::Condition);
                let open = self.current_span();
                self.bump(); // (
                self.parse_opaque(CSyntaxKind::Expr, |kind| kind == CSyntaxKind::RParen);
                if self.at(CSyntaxKind::RParen) {
                    self.bump();
                } else {
                    self.error(ParseErrorKind::UnclosedDelimiter, "unclosed '('", open);
                }
                self.builder.finish_node(); // CONDITION
            }
            Some(CSyntaxKind::Ident) => {
                self.start_node(CSyntaxKind::MacroCondition);
                self.bump();
                if self.at(CSyntaxKind::LParen) {
                    self.bump_group();
                }
                self.builder.finish_node(); // MACRO_CONDITION
            }
            _ => {
                let at = self.current_span();
                self.error(
                    ParseErrorKind::MissingCondition,
                    format!("expected condition after '{owner}'"),
                    at,
                );
            }
        }
    }

    /// Wrap the tokens up to `stop` (at nesting depth zero) in a node
    ///
    /// Nothing is emitted for an empty run.
    fn parse_opaque(&mut self, kind: CSyntaxKind, stop: impl Fn(CSyntaxKind) -> bool) {
        match self.current_kind() {
            Some(current) if !stop(current) => {}
            _ => return,
        }

        self.start_node(kind);
        while let Some(current) = self.current_kind() {
            if stop(current) {
                break;
            }
            match current {
                CSyntaxKind::LParen | CSyntaxKind::LBracket | CSyntaxKind::LBrace => {
                    self.bump_group();
                }
                CSyntaxKind::RParen | CSyntaxKind::RBracket | CSyntaxKind::RBrace => {
                    self.bump_error(ParseErrorKind::UnexpectedToken, "unmatched closing delimiter");
                }
                _ => self.bump(),
            }
        }
        self.builder.finish_node();
    }

    /// Consume a balanced delimiter group starting at an opening delimiter
    fn bump_group(&mut self) {
        let Some(open_kind) = self.current_kind() else {
            return;
        };
        let Some(first_closer) = closer_for(open_kind) else {
            self.bump();
            return;
        };

        let open = self.current_span();
        let mut expected = vec![first_closer];
        self.bump();

        while let Some(&closer) = expected.last() {
            let Some(kind) = self.current_kind() else {
                self.error(
                    ParseErrorKind::UnclosedDelimiter,
                    format!("unclosed '{}'", delimiter_text(open_kind)),
                    open,
                );
                return;
            };

            if let Some(nested) = closer_for(kind) {
                expected.push(nested);
            } else if is_closer(kind) {
                if kind != closer {
                    let at = self.current_span();
                    self.error(
                        ParseErrorKind::MismatchedDelimiter,
                        format!(
                            "expected '{}' but found '{}'",
                            delimiter_text(closer),
                            delimiter_text(kind)
                        ),
                        at,
                    );
                    return;
                }
                expected.pop();
            }
            self.bump();
        }
    }

    // Helper methods

    fn significant_index(&self, n: usize) -> Option<usize> {
        self.tokens[self.pos..]
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.kind.is_trivia())
            .nth(n)
            .map(|(offset, _)| self.pos + offset)
    }

    fn current(&self) -> Option<&CstToken> {
        self.significant_index(0).map(|index| &self.tokens[index])
    }

    fn current_kind(&self) -> Option<CSyntaxKind> {
        self.current().map(|t| t.kind)
    }

    fn current_text(&self) -> &str {
        self.current().map_or("", |t| t.text.as_str())
    }

    fn nth_kind(&self, n: usize) -> Option<CSyntaxKind> {
        self.significant_index(n).map(|index| self.tokens[index].kind)
    }

    fn at(&self, kind: CSyntaxKind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn current_span(&self) -> CstSpan {
        self.current()
            .map_or(self.source_len..self.source_len, |t| t.span.clone())
    }

    /// Attach pending trivia to the node under construction
    fn eat_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.add_token(token);
            self.pos += 1;
        }
    }

    fn start_node(&mut self, kind: CSyntaxKind) {
        self.eat_trivia();
        self.builder.start_node(kind);
    }

    /// Add the next significant token (and the trivia before it)
    fn bump(&mut self) {
        self.eat_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.add_token(token);
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: CSyntaxKind, message: &str) {
        if self.at(kind) {
            self.bump();
        } else {
            let at = self.current_span();
            self.error(ParseErrorKind::UnexpectedToken, message, at);
        }
    }

    fn error(&mut self, kind: ParseErrorKind, message: impl Into<String>, span: CstSpan) {
        self.errors.push(ParseError {
            kind,
            message: message.into(),
            span,
        });
    }

    /// Record an error and consume the offending token into an `Error` node
    fn bump_error(&mut self, kind: ParseErrorKind, message: &str) {
        let at = self.current_span();
        self.error(kind, message, at);
        self.start_node(CSyntaxKind::Error);
        self.bump();
        self.builder.finish_node();
    }
}

fn closer_for(kind: CSyntaxKind) -> Option<CSyntaxKind> {
    match kind {
        CSyntaxKind::LParen => Some(CSyntaxKind::RParen),
        CSyntaxKind::LBracket => Some(CSyntaxKind::RBracket),
        CSyntaxKind::LBrace => Some(CSyntaxKind::RBrace),
        _ => None,
    }
}

fn is_closer(kind: CSyntaxKind) -> bool {
    matches!(
        kind,
        CSyntaxKind::RParen | CSyntaxKind::RBracket | CSyntaxKind::RBrace
    )
}

fn delimiter_text(kind: CSyntaxKind) -> &'static str {
    match kind {
        CSyntaxKind::LParen => "(",
        CSyntaxKind::RParen => ")",
        CSyntaxKind::LBracket => "[",
        CSyntaxKind::RBracket => "]",
        CSyntaxKind::LBrace => "{",
        CSyntaxKind::RBrace => "}",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> CSyntaxNode {
        let parse = parse_c(source);
        assert!(parse.errors().is_empty(), "Parse errors: {:?}", parse.errors());
        let root = parse.syntax();
        assert_eq!(root.text().to_string(), source);
        root
    }

    fn first(root: &CSyntaxNode, kind: CSyntaxKind) -> CSyntaxNode {
        root.descendants()
            .find(|n| n.kind() == kind)
            .unwrap_or_else(|| panic!("no {kind:?} node"))
    }

    #[test]
    fn test_function_body_statements() {
        let root = parse_ok("int main(void) {\n  int x = 1;\n  return x;\n}\n");
        let body = first(&root, CSyntaxKind::FunctionBody);
        let kinds: Vec<_> = body.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![CSyntaxKind::ExprStmt, CSyntaxKind::ExprStmt]);
    }

    #[test]
    fn test_nodes_exclude_surrounding_trivia() {
        let root = parse_ok("void f() {\n  // lead\n  if (a) b();  \n}\n");
        let if_stmt = first(&root, CSyntaxKind::IfStmt);
        assert_eq!(if_stmt.text().to_string(), "if (a) b();");
    }

    #[test]
    fn test_else_if_is_direct_child() {
        let root = parse_ok("void f() { if (a) x(); else if (b) y(); else z(); }");
        let head = first(&root, CSyntaxKind::IfStmt);
        let nested: Vec<_> = head
            .children()
            .filter(|n| n.kind() == CSyntaxKind::IfStmt)
            .collect();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].text().to_string(), "if (b) y(); else z();");
    }

    #[test]
    fn test_dangling_else_binds_inner_if() {
        let root = parse_ok("void f() { if (a) if (b) x(); else y(); }");
        let outer = first(&root, CSyntaxKind::IfStmt);
        assert!(
            outer
                .children_with_tokens()
                .all(|e| e.kind() != CSyntaxKind::ElseKw)
        );
        let inner = outer
            .children()
            .find(|n| n.kind() == CSyntaxKind::IfStmt)
            .unwrap();
        assert!(
            inner
                .children_with_tokens()
                .any(|e| e.kind() == CSyntaxKind::ElseKw)
        );
    }

    #[test]
    fn test_macro_condition() {
        let root = parse_ok("void f() { if gtzero(c) return; }");
        let cond = first(&root, CSyntaxKind::MacroCondition);
        assert_eq!(cond.text().to_string(), "gtzero(c)");
    }

    #[test]
    fn test_for_header_clauses() {
        let root = parse_ok("void f() { for (int i = 0; i < n; i++) {} }");
        let header = first(&root, CSyntaxKind::ForHeader);
        let kinds: Vec<_> = header.children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![CSyntaxKind::ForInit, CSyntaxKind::Expr, CSyntaxKind::ForStep]
        );
    }

    #[test]
    fn test_for_header_without_condition() {
        let root = parse_ok("void f() { for (int i = 0; ; i++) {} for (auto x : v) {} }");
        for header in root
            .descendants()
            .filter(|n| n.kind() == CSyntaxKind::ForHeader)
        {
            assert!(header.children().all(|n| n.kind() != CSyntaxKind::Expr));
        }
    }

    #[test]
    fn test_case_labels_and_goto_label() {
        let root = parse_ok(
            "void f() { switch (c) { case A ? 1 : 2: if (x) y(); break; default: ; } out: return; }",
        );
        let labels: Vec<_> = root
            .descendants()
            .filter(|n| n.kind() == CSyntaxKind::LabeledStmt)
            .collect();
        assert_eq!(labels.len(), 3);
        assert!(
            labels[0]
                .children()
                .any(|n| n.kind() == CSyntaxKind::IfStmt)
        );
    }

    #[test]
    fn test_decl_blocks_and_initializers() {
        let root = parse_ok(
            "extern \"C\" {\nint g(void) { if (a) b(); }\n}\nstruct S { int x; };\nint arr[] = {1, 2};\n",
        );
        assert_eq!(
            root.descendants()
                .filter(|n| n.kind() == CSyntaxKind::DeclBlock)
                .count(),
            2
        );
        assert_eq!(
            root.descendants()
                .filter(|n| n.kind() == CSyntaxKind::IfStmt)
                .count(),
            1
        );
    }

    #[test]
    fn test_macro_loop_block_is_statement() {
        let root = parse_ok("void f() { list_for_each(p, head) { if (p) g(); } }");
        assert_eq!(
            first(&root, CSyntaxKind::ExprStmt).text().to_string(),
            "list_for_each(p, head)"
        );
        assert!(
            root.descendants()
                .any(|n| n.kind() == CSyntaxKind::CompoundStmt)
        );
    }

    #[test]
    fn test_do_while() {
        let root = parse_ok("void f() { do { x++; } while (x < 3); }");
        let do_stmt = first(&root, CSyntaxKind::DoStmt);
        assert!(
            do_stmt
                .children()
                .any(|n| n.kind() == CSyntaxKind::Condition)
        );
    }

    #[test]
    fn test_unclosed_brace_is_error() {
        let parse = parse_c("int main() { if (a) {\n");
        assert!(parse.has_errors());
        assert!(
            parse
                .errors()
                .iter()
                .any(|e| e.kind == ParseErrorKind::UnclosedDelimiter)
        );
        assert_eq!(parse.syntax().text().to_string(), "int main() { if (a) {\n");
    }

    #[test]
    fn test_stray_else_is_error() {
        let parse = parse_c("void f() { x(); else y(); }");
        assert!(
            parse
                .errors()
                .iter()
                .any(|e| e.kind == ParseErrorKind::StrayElse)
        );
    }

    #[test]
    fn test_mismatched_delimiter() {
        let parse = parse_c("void f() { g(a]; }");
        assert!(
            parse
                .errors()
                .iter()
                .any(|e| e.kind == ParseErrorKind::MismatchedDelimiter)
        );
    }

    #[test]
    fn test_try_block_is_compound_statement() {
        let root = parse_ok(
            "void f(int x) {\n  try { if (x > 1) g(); } catch (...) { }\n  if (x > 2) h();\n}\n",
        );
        let body = first(&root, CSyntaxKind::FunctionBody);
        let kinds: Vec<_> = body.children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                CSyntaxKind::ExprStmt,
                CSyntaxKind::CompoundStmt,
                CSyntaxKind::ExprStmt,
                CSyntaxKind::CompoundStmt,
                CSyntaxKind::IfStmt,
            ]
        );
        assert_eq!(
            root.descendants()
                .filter(|n| n.kind() == CSyntaxKind::IfStmt)
                .count(),
            2
        );
    }

    #[test]
    fn test_control_keyword_ends_statement() {
        let root = parse_ok("void f() { FOO if (a) b(); }");
        let body = first(&root, CSyntaxKind::FunctionBody);
        let kinds: Vec<_> = body.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![CSyntaxKind::ExprStmt, CSyntaxKind::IfStmt]);
    }
}
