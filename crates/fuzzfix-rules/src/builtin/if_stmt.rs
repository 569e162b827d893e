//! Plain `if` statements

use fuzzfix_core::cst::CSyntaxNode;
use fuzzfix_core::cst::ast::{AstNode, IfStmt};
use fuzzfix_core::{AtomicChange, Edit, Result};

use super::{condition_reference, declaration, new_change};
use crate::engine::{RewriteContext, RewriteRule};
use crate::matcher::{MatchContext, placement_before, rewritable_condition};
use crate::site::{DeclarationPlacement, MatchSite, SiteKind};

pub struct IfRule;

impl RewriteRule for IfRule {
    fn kind(&self) -> SiteKind {
        SiteKind::If
    }

    fn match_node(&self, node: &CSyntaxNode, ctx: &MatchContext<'_>) -> Option<MatchSite> {
        let if_stmt = IfStmt::cast(node.clone())?;
        if if_stmt.parent_if().is_some() {
            return None;
        }

        let condition = if_stmt.condition()?;
        let macro_origin = rewritable_condition(&condition, ctx, ctx.settings.macro_conditions)?;

        // The unbraced body of a loop or switch cannot take a declaration
        // in front of it
        let placement = placement_before(node);
        ctx.site(SiteKind::If, node, &condition, macro_origin, placement)
    }

    fn generate(&self, site: &MatchSite, ctx: &mut RewriteContext) -> Result<AtomicChange> {
        let name = ctx.names.allocate();
        let decl = declaration(ctx, &name, site);
        let reference = Edit::replace(site.condition.clone(), condition_reference(site, &name));

        let change = match site.placement {
            DeclarationPlacement::InBlock => new_change(site, &name)
                .with_edit(Edit::insert_before(site.statement.start, format!("{decl}\n")))
                .with_edit(reference),
            DeclarationPlacement::SynthesizedBlock => new_change(site, &name)
                .with_edit(Edit::insert_before(
                    site.statement.start,
                    format!("{{\n{decl}\n"),
                ))
                .with_edit(reference)
                .with_edit(Edit::insert_after(site.statement.end, "\n}")),
        };
        Ok(change)
    }
}
