//! `if` directly under a `case`, `default` or goto label
//!
//! A label cannot be followed by a declaration, so the label gets an empty
//! statement and the declaration follows it.

use fuzzfix_core::cst::ast::{AstNode, IfStmt};
use fuzzfix_core::cst::{CSyntaxKind, CSyntaxNode};
use fuzzfix_core::{AtomicChange, Edit, Result};

use super::{condition_reference, declaration, new_change};
use crate::engine::{RewriteContext, RewriteRule};
use crate::matcher::{MatchContext, enclosing_label, hosts_declarations, rewritable_condition};
use crate::site::{DeclarationPlacement, MatchSite, SiteKind};

pub struct CaseIfRule;

impl RewriteRule for CaseIfRule {
    fn kind(&self) -> SiteKind {
        SiteKind::CaseIf
    }

    fn match_node(&self, node: &CSyntaxNode, ctx: &MatchContext<'_>) -> Option<MatchSite> {
        let if_stmt = IfStmt::cast(node.clone())?;
        let label = enclosing_label(node)?;

        let condition = if_stmt.condition()?;
        let macro_origin = rewritable_condition(&condition, ctx, ctx.settings.macro_conditions)?;

        // `case 1: case 2: if ...` declares in whatever holds the outermost label
        let outermost = label
            .syntax()
            .ancestors()
            .take_while(|n| n.kind() == CSyntaxKind::LabeledStmt)
            .last()?;
        let in_block = outermost.parent().is_some_and(|p| hosts_declarations(&p));

        let placement = if in_block && !ctx.settings.case_blocks {
            DeclarationPlacement::InBlock
        } else {
            DeclarationPlacement::SynthesizedBlock
        };
        ctx.site(SiteKind::CaseIf, node, &condition, macro_origin, placement)
    }

    fn generate(&self, site: &MatchSite, ctx: &mut RewriteContext) -> Result<AtomicChange> {
        let name = ctx.names.allocate();
        let decl = declaration(ctx, &name, site);
        let reference = Edit::replace(site.condition.clone(), condition_reference(site, &name));

        let change = match site.placement {
            DeclarationPlacement::InBlock => new_change(site, &name)
                .with_edit(Edit::insert_before(site.statement.start, format!(";\n{decl}\n")))
                .with_edit(reference),
            DeclarationPlacement::SynthesizedBlock => new_change(site, &name)
                .with_edit(Edit::insert_before(
                    site.statement.start,
                    format!(";\n{{\n{decl}\n"),
                ))
                .with_edit(reference)
                .with_edit(Edit::insert_after(site.statement.end, "\n}")),
        };
        Ok(change)
    }
}
