//! `while` loops
//!
//! The condition becomes the loop literal and the body re-evaluates it
//! into a temporary, breaking out when it is zero.

use fuzzfix_core::cst::CSyntaxNode;
use fuzzfix_core::cst::ast::{AstNode, ConditionSpelling, WhileStmt};
use fuzzfix_core::{AtomicChange, Result};

use super::{LoopBody, loop_change};
use crate::engine::{RewriteContext, RewriteRule};
use crate::matcher::{MatchContext, rewritable_condition};
use crate::site::{DeclarationPlacement, MatchSite, SiteKind};

pub struct WhileRule {
    body: LoopBody,
}

impl WhileRule {
    pub fn new(body: LoopBody) -> Self {
        Self { body }
    }
}

impl RewriteRule for WhileRule {
    fn kind(&self) -> SiteKind {
        match self.body {
            LoopBody::Compound => SiteKind::WhileCompound,
            LoopBody::Single => SiteKind::WhileSingle,
        }
    }

    fn match_node(&self, node: &CSyntaxNode, ctx: &MatchContext<'_>) -> Option<MatchSite> {
        let while_stmt = WhileStmt::cast(node.clone())?;
        let condition = while_stmt.condition()?;
        if condition.spelling() != ConditionSpelling::Parenthesized {
            return None;
        }
        let macro_origin = rewritable_condition(&condition, ctx, false)?;
        let body = while_stmt.body()?;

        let placement = match self.body {
            LoopBody::Compound => DeclarationPlacement::InBlock,
            LoopBody::Single => DeclarationPlacement::SynthesizedBlock,
        };
        let mut site = ctx.site(self.kind(), node, &condition, macro_origin, placement)?;
        self.body.fill(&mut site, &body)?;
        Some(site)
    }

    fn generate(&self, site: &MatchSite, ctx: &mut RewriteContext) -> Result<AtomicChange> {
        let literal = ctx.settings.loop_true_literal.clone();
        loop_change(site, ctx, &literal)
    }
}
