//! Structural predicates shared by the builtin rules

use std::ops::Range;
use std::path::Path;

use fuzzfix_core::cst::ast::{AstNode, Condition, ConditionSpelling, IfStmt, LabeledStmt};
use fuzzfix_core::cst::{CSyntaxKind, CSyntaxNode, MacroTable};
use fuzzfix_core::{LineIndex, Location, RewriteSettings, TempNameGenerator};
use rowan::TextRange;

use crate::site::{DeclarationPlacement, MatchSite, SiteKind, span};

/// Read-only state the rules match against
pub struct MatchContext<'a> {
    pub source: &'a str,
    pub file: &'a Path,
    pub line_index: &'a LineIndex,
    pub macros: &'a MacroTable,
    pub settings: &'a RewriteSettings,
    pub names: &'a TempNameGenerator,
}

impl MatchContext<'_> {
    pub fn location(&self, range: TextRange) -> Location {
        self.line_index.location(self.file, self.source, span(range))
    }

    /// Start a site for `statement` whose condition is `condition`
    pub(crate) fn site(
        &self,
        kind: SiteKind,
        statement: &CSyntaxNode,
        condition: &Condition,
        macro_origin: bool,
        placement: DeclarationPlacement,
    ) -> Option<MatchSite> {
        let range = condition.expr_range()?;
        Some(MatchSite {
            kind,
            rule_id: kind.as_str(),
            statement: span(statement.text_range()),
            condition: span(range),
            condition_text: condition.text(),
            spelling: condition.spelling(),
            macro_origin,
            body: None,
            body_open: None,
            chain_head: None,
            placement,
            location: self.location(statement.text_range()),
        })
    }
}

/// Decide whether a condition gets a temporary
///
/// Returns `Some(macro_origin)` for a rewritable condition. Declarations,
/// empty conditions and conditions already in normalized form are left
/// alone, and macro-spelled conditions only qualify when `allow_macro`.
pub fn rewritable_condition(
    condition: &Condition,
    ctx: &MatchContext<'_>,
    allow_macro: bool,
) -> Option<bool> {
    if condition.tokens().is_empty() || condition.is_declaration() {
        return None;
    }
    if is_normalized(condition, ctx) {
        return None;
    }

    let macro_origin = is_macro_origin(condition, ctx.macros);
    if macro_origin && !allow_macro {
        return None;
    }
    Some(macro_origin)
}

/// A bare variable reference, the loop literal, or `!<temporary>`
pub fn is_normalized(condition: &Condition, ctx: &MatchContext<'_>) -> bool {
    let tokens = condition.tokens();
    match tokens.as_slice() {
        [token] if token.text() == ctx.settings.loop_true_literal => true,
        [token] => token.kind() == CSyntaxKind::Ident && !ctx.macros.contains(token.text()),
        [bang, name] => {
            bang.kind() == CSyntaxKind::Bang
                && name.kind() == CSyntaxKind::Ident
                && ctx.names.is_generated(name.text())
        }
        _ => false,
    }
}

/// The condition is a macro invocation, a known macro name, or a call of a
/// known macro spanning the whole condition
pub fn is_macro_origin(condition: &Condition, macros: &MacroTable) -> bool {
    if condition.spelling() == ConditionSpelling::MacroInvocation {
        return true;
    }

    let tokens = condition.tokens();
    let Some((name, rest)) = tokens.split_first() else {
        return false;
    };
    if name.kind() != CSyntaxKind::Ident || !macros.contains(name.text()) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    if rest[0].kind() != CSyntaxKind::LParen {
        return false;
    }

    let mut depth = 0usize;
    for (i, token) in rest.iter().enumerate() {
        match token.kind() {
            CSyntaxKind::LParen => depth += 1,
            CSyntaxKind::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1 == rest.len();
                }
            }
            _ => {}
        }
    }
    false
}

/// First `if` of the chain `if_stmt` belongs to
///
/// Follows "parent is an `if`" links for at most `max_depth` steps. Returns
/// `None` when `if_stmt` has no `if` parent or the head lies further up.
pub fn chain_head(if_stmt: &IfStmt, max_depth: usize) -> Option<IfStmt> {
    let mut current = if_stmt.parent_if()?;
    for _ in 1..max_depth {
        match current.parent_if() {
            Some(parent) => current = parent,
            None => return Some(current),
        }
    }
    current.parent_if().is_none().then_some(current)
}

/// The label statement directly wrapping `statement`
pub fn enclosing_label(statement: &CSyntaxNode) -> Option<LabeledStmt> {
    statement.parent().and_then(LabeledStmt::cast)
}

/// Whether a declaration statement may be inserted among `node`'s children
pub fn hosts_declarations(node: &CSyntaxNode) -> bool {
    matches!(
        node.kind(),
        CSyntaxKind::CompoundStmt | CSyntaxKind::FunctionBody
    )
}

/// Placement for a declaration inserted in front of `statement`
pub fn placement_before(statement: &CSyntaxNode) -> DeclarationPlacement {
    match statement.parent() {
        Some(parent) if hosts_declarations(&parent) => DeclarationPlacement::InBlock,
        _ => DeclarationPlacement::SynthesizedBlock,
    }
}

/// A preprocessor line of the unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub span: Range<usize>,
    /// First line of the directive, trimmed
    pub text: String,
}

impl Directive {
    /// Directive name: `ifdef`, `endif`, `define`, ...
    fn name(&self) -> &str {
        let rest = self.text.trim_start_matches('#').trim_start();
        let end = rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(rest.len());
        &rest[..end]
    }
}

/// Every preprocessor line of the tree, in source order
pub fn directives(root: &CSyntaxNode) -> Vec<Directive> {
    root.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| token.kind() == CSyntaxKind::Preprocessor)
        .map(|token| Directive {
            span: span(token.text_range()),
            text: token.text().lines().next().unwrap_or_default().trim().to_string(),
        })
        .collect()
}

/// The first conditional directive that does not open and close inside
/// `extent`
///
/// Edits that open a block before such a directive and close it after
/// would leave braces unbalanced in one of the preprocessor branches.
pub fn unbalanced_directive<'d>(
    directives: &'d [Directive],
    extent: &Range<usize>,
) -> Option<&'d Directive> {
    let mut open = Vec::new();
    for directive in directives
        .iter()
        .filter(|d| d.span.start >= extent.start && d.span.end <= extent.end)
    {
        match directive.name() {
            "if" | "ifdef" | "ifndef" => open.push(directive),
            "elif" | "elifdef" | "elifndef" | "else" if open.is_empty() => return Some(directive),
            "endif" => {
                if open.pop().is_none() {
                    return Some(directive);
                }
            }
            _ => {}
        }
    }
    open.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzfix_core::cst::ast::{ForStmt, WhileStmt};
    use fuzzfix_core::cst::parse_c;

    struct Fixture {
        source: String,
        root: CSyntaxNode,
        index: LineIndex,
        macros: MacroTable,
        settings: RewriteSettings,
        names: TempNameGenerator,
    }

    impl Fixture {
        fn new(source: &str) -> Self {
            let parse = parse_c(source);
            assert!(!parse.has_errors(), "{:?}", parse.errors());
            let root = parse.syntax();
            Self {
                source: source.to_string(),
                index: LineIndex::new(source),
                macros: MacroTable::from_tree(&root),
                settings: RewriteSettings::default(),
                names: TempNameGenerator::default(),
                root,
            }
        }

        fn ctx(&self) -> MatchContext<'_> {
            MatchContext {
                source: &self.source,
                file: Path::new("test.c"),
                line_index: &self.index,
                macros: &self.macros,
                settings: &self.settings,
                names: &self.names,
            }
        }

        fn ifs(&self) -> Vec<IfStmt> {
            self.root.descendants().filter_map(IfStmt::cast).collect()
        }
    }

    #[test]
    fn test_bare_reference_and_normalized_forms() {
        let fx = Fixture::new(
            "void f() { if (x) a(); if (!__fuzzfix3) a(); if (!x) a(); if (x + 1) a(); }",
        );
        let verdicts: Vec<_> = fx
            .ifs()
            .iter()
            .map(|s| rewritable_condition(&s.condition().unwrap(), &fx.ctx(), true))
            .collect();
        assert_eq!(verdicts, vec![None, None, Some(false), Some(false)]);
    }

    #[test]
    fn test_loop_literal_is_normalized() {
        let fx = Fixture::new("void f() { while (true) g(); while (n > 0) g(); }");
        let loops: Vec<_> = fx.root.descendants().filter_map(WhileStmt::cast).collect();
        assert!(is_normalized(&loops[0].condition().unwrap(), &fx.ctx()));
        assert!(!is_normalized(&loops[1].condition().unwrap(), &fx.ctx()));
    }

    #[test]
    fn test_declaration_conditions_skipped() {
        let fx = Fixture::new("void f() { if (int n = g()) a(); if (auto it = m.find(k); it != e) a(); }");
        for if_stmt in fx.ifs() {
            assert_eq!(
                rewritable_condition(&if_stmt.condition().unwrap(), &fx.ctx(), true),
                None
            );
        }
    }

    #[test]
    fn test_macro_origin() {
        let fx = Fixture::new(
            "#define streq(a,b) (strcmp((a),(b)) == 0)\n#define READY 1\nvoid f() {\n  if (streq(a, b)) x();\n  if gtzero(c) x();\n  if (READY) x();\n  if (streq(a, b) && c) x();\n}\n",
        );
        let origins: Vec<_> = fx
            .ifs()
            .iter()
            .map(|s| is_macro_origin(&s.condition().unwrap(), &fx.macros))
            .collect();
        assert_eq!(origins, vec![true, true, true, false]);

        // Macro-spelled conditions are only rewritten when allowed
        let first = fx.ifs()[0].condition().unwrap();
        assert_eq!(rewritable_condition(&first, &fx.ctx(), true), Some(true));
        assert_eq!(rewritable_condition(&first, &fx.ctx(), false), None);
    }

    #[test]
    fn test_chain_head_bounded() {
        let fx = Fixture::new(
            "void f() { if (a) x(); else if (b) y(); else if (c) z(); else if (d) w(); }",
        );
        let ifs = fx.ifs();
        let head = chain_head(&ifs[3], 8).unwrap();
        assert_eq!(head, ifs[0]);
        assert_eq!(chain_head(&ifs[3], 3), Some(ifs[0].clone()));
        assert_eq!(chain_head(&ifs[3], 2), None);
        assert_eq!(chain_head(&ifs[0], 8), None);
    }

    #[test]
    fn test_placement() {
        let fx = Fixture::new("void f() { if (a > 1) x(); while (n) if (b > 1) y(); }");
        let ifs = fx.ifs();
        assert_eq!(
            placement_before(ifs[0].syntax()),
            DeclarationPlacement::InBlock
        );
        assert_eq!(
            placement_before(ifs[1].syntax()),
            DeclarationPlacement::SynthesizedBlock
        );
    }

    #[test]
    fn test_unbalanced_directive() {
        let fx = Fixture::new(
            "void f() {\n#ifdef A\n  g();\n#endif\n  if (a) x();\n#ifdef B\n  else y();\n#else\n  z();\n#endif\n}\n",
        );
        let found = directives(&fx.root);
        let names: Vec<_> = found.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(names, vec!["#ifdef A", "#endif", "#ifdef B", "#else", "#endif"]);

        let whole = 0..fx.source.len();
        assert_eq!(unbalanced_directive(&found, &whole), None);

        // Opens inside, closes outside
        let head = span(fx.ifs()[0].syntax().text_range());
        assert_eq!(
            unbalanced_directive(&found, &head).map(|d| d.text.as_str()),
            Some("#ifdef B")
        );

        // `#else` without its `#ifdef`
        let tail = found[3].span.start..fx.source.len();
        assert_eq!(
            unbalanced_directive(&found, &tail).map(|d| d.text.as_str()),
            Some("#else")
        );
    }

    #[test]
    fn test_for_without_condition() {
        let fx = Fixture::new("void f() { for (int i = 0; ; i++) { g(); } }");
        let for_stmt = fx.root.descendants().find_map(ForStmt::cast).unwrap();
        assert!(for_stmt.condition().is_none());
    }
}
