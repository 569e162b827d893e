//! `else if` and `if (x) if (y)` sites
//!
//! The temporary is declared in a new block opened in front of the chain
//! head and closed after it, so the `else` branches stay attached to the
//! `if` they belong to.

use fuzzfix_core::cst::CSyntaxNode;
use fuzzfix_core::cst::ast::{AstNode, IfStmt};
use fuzzfix_core::{AtomicChange, Edit, FuzzfixError, Result};

use super::{condition_reference, declaration, new_change};
use crate::engine::{RewriteContext, RewriteRule};
use crate::matcher::{MatchContext, chain_head, rewritable_condition};
use crate::site::{DeclarationPlacement, MatchSite, SiteKind, span};

pub struct ElseIfRule;

impl RewriteRule for ElseIfRule {
    fn kind(&self) -> SiteKind {
        SiteKind::ElseIf
    }

    fn match_node(&self, node: &CSyntaxNode, ctx: &MatchContext<'_>) -> Option<MatchSite> {
        let if_stmt = IfStmt::cast(node.clone())?;
        if_stmt.parent_if()?;

        let condition = if_stmt.condition()?;
        let macro_origin = rewritable_condition(&condition, ctx, ctx.settings.macro_conditions)?;

        let mut site = ctx.site(
            SiteKind::ElseIf,
            node,
            &condition,
            macro_origin,
            DeclarationPlacement::SynthesizedBlock,
        )?;
        site.chain_head = chain_head(&if_stmt, ctx.settings.max_chain_depth)
            .map(|head| span(head.text_range()));
        Some(site)
    }

    fn generate(&self, site: &MatchSite, ctx: &mut RewriteContext) -> Result<AtomicChange> {
        let Some(head) = site.chain_head.clone() else {
            return Err(FuzzfixError::edit_generation(
                site.rule_id,
                format!(
                    "chain head is more than {} levels up (maxChainDepth)",
                    ctx.settings.max_chain_depth
                ),
                site.location.clone(),
            ));
        };

        let name = ctx.names.allocate();
        let opening = format!("{{\n{}\n", declaration(ctx, &name, site));
        Ok(new_change(site, &name)
            .with_edit(Edit::insert_before(head.start, opening))
            .with_edit(Edit::replace(
                site.condition.clone(),
                condition_reference(site, &name),
            ))
            // Close after the head: in `if (x) if (y) a; else b; else c;` the
            // inner `if` ends before the outer `else`
            .with_edit(Edit::insert_after(head.end, "\n}")))
    }
}
