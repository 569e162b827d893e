//! `for` loops with a condition clause
//!
//! The condition clause is emptied (an omitted condition is always true)
//! and the body re-evaluates it into a temporary. Loops without a
//! condition clause never match.

use fuzzfix_core::cst::CSyntaxNode;
use fuzzfix_core::cst::ast::{AstNode, ForStmt};
use fuzzfix_core::{AtomicChange, Result};

use super::{LoopBody, loop_change};
use crate::engine::{RewriteContext, RewriteRule};
use crate::matcher::{MatchContext, rewritable_condition};
use crate::site::{DeclarationPlacement, MatchSite, SiteKind};

pub struct ForRule {
    body: LoopBody,
}

impl ForRule {
    pub fn new(body: LoopBody) -> Self {
        Self { body }
    }
}

impl RewriteRule for ForRule {
    fn kind(&self) -> SiteKind {
        match self.body {
            LoopBody::Compound => SiteKind::ForCompound,
            LoopBody::Single => SiteKind::ForSingle,
        }
    }

    fn match_node(&self, node: &CSyntaxNode, ctx: &MatchContext<'_>) -> Option<MatchSite> {
        let for_stmt = ForStmt::cast(node.clone())?;
        let condition = for_stmt.condition()?;
        let macro_origin = rewritable_condition(&condition, ctx, false)?;
        let body = for_stmt.body()?;

        let placement = match self.body {
            LoopBody::Compound => DeclarationPlacement::InBlock,
            LoopBody::Single => DeclarationPlacement::SynthesizedBlock,
        };
        let mut site = ctx.site(self.kind(), node, &condition, macro_origin, placement)?;
        self.body.fill(&mut site, &body)?;
        Some(site)
    }

    fn generate(&self, site: &MatchSite, ctx: &mut RewriteContext) -> Result<AtomicChange> {
        loop_change(site, ctx, "")
    }
}
