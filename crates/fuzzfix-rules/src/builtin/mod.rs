//! Builtin rewrite rules
//!
//! One rule per site kind. [`builtin_rules`] returns them in the priority
//! order the dispatcher relies on: a node claimed by an earlier rule is
//! never offered to a later one.

mod case_if;
mod else_if;
mod for_loop;
mod if_stmt;
mod while_loop;

pub use case_if::CaseIfRule;
pub use else_if::ElseIfRule;
pub use for_loop::ForRule;
pub use if_stmt::IfRule;
pub use while_loop::WhileRule;

use fuzzfix_core::{AtomicChange, Edit, FuzzfixError, Result};
use fuzzfix_core::cst::ast::{ConditionSpelling, Statement};

use crate::engine::{RewriteContext, RewriteRule};
use crate::site::{MatchSite, span};

/// Every builtin rule, highest priority first
pub fn builtin_rules() -> Vec<Box<dyn RewriteRule>> {
    vec![
        Box::new(ElseIfRule),
        Box::new(CaseIfRule),
        Box::new(IfRule),
        Box::new(WhileRule::new(LoopBody::Compound)),
        Box::new(WhileRule::new(LoopBody::Single)),
        Box::new(ForRule::new(LoopBody::Compound)),
        Box::new(ForRule::new(LoopBody::Single)),
    ]
}

/// Loop body shape a loop rule accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopBody {
    /// `{ ... }`
    Compound,
    /// Any other statement
    Single,
}

impl LoopBody {
    /// Record the body of `site` when it has this shape
    fn fill(self, site: &mut MatchSite, body: &Statement) -> Option<()> {
        match (self, body.as_compound()) {
            (LoopBody::Compound, Some(block)) => {
                site.body_open = Some(span(block.l_brace()?.text_range()).end);
            }
            (LoopBody::Single, None) => {}
            _ => return None,
        }
        site.body = Some(span(body.text_range()));
        Some(())
    }
}

/// `T N = <cond>;`
fn declaration(ctx: &RewriteContext, name: &str, site: &MatchSite) -> String {
    format!(
        "{} {} = {};",
        ctx.settings.temp_type, name, site.condition_text
    )
}

/// What the condition expression becomes in an `if`
fn condition_reference(site: &MatchSite, name: &str) -> String {
    match site.spelling {
        ConditionSpelling::Parenthesized => name.to_string(),
        // `if gtzero(c)` needs its own parentheses
        ConditionSpelling::MacroInvocation => format!("({name})"),
    }
}

fn new_change(site: &MatchSite, name: &str) -> AtomicChange {
    AtomicChange::new(site.rule_id, site.kind.as_str(), name, site.location.clone())
}

/// Edits shared by the while and for rules
///
/// The condition becomes `replacement` and the body starts by evaluating
/// the temporary and breaking out when it is zero. A single-statement body
/// is wrapped in braces so the temporary is scoped to it.
fn loop_change(
    site: &MatchSite,
    ctx: &mut RewriteContext,
    replacement: &str,
) -> Result<AtomicChange> {
    let body = site.body.clone().ok_or_else(|| {
        FuzzfixError::edit_generation(
            site.rule_id,
            "loop has no body",
            site.location.clone(),
        )
    })?;

    let name = ctx.names.allocate();
    let guard = format!("{}\nif (!{name}) break;", declaration(ctx, &name, site));
    let change = new_change(site, &name).with_edit(Edit::replace(site.condition.clone(), replacement));

    let change = match site.body_open {
        Some(open) => change.with_edit(Edit::insert_after(open, format!("\n{guard}"))),
        None => change
            .with_edit(Edit::insert_before(body.start, format!("{{\n{guard}\n")))
            .with_edit(Edit::insert_after(body.end, "\n}")),
    };
    Ok(change)
}
