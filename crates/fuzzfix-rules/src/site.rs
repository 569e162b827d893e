//! Matched rewrite sites

use std::fmt;
use std::ops::Range;

use fuzzfix_core::Location;
use fuzzfix_core::cst::ast::ConditionSpelling;
use rowan::TextRange;
use serde::Serialize;

/// The kind of conditional construct a rule recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteKind {
    ElseIf,
    CaseIf,
    If,
    WhileCompound,
    WhileSingle,
    ForCompound,
    ForSingle,
}

impl SiteKind {
    /// Stable id, also used as the rule id in configuration
    pub fn as_str(self) -> &'static str {
        match self {
            SiteKind::ElseIf => "else-if",
            SiteKind::CaseIf => "case-if",
            SiteKind::If => "if",
            SiteKind::WhileCompound => "while-compound",
            SiteKind::WhileSingle => "while-single",
            SiteKind::ForCompound => "for-compound",
            SiteKind::ForSingle => "for-single",
        }
    }

    pub fn is_loop(self) -> bool {
        matches!(
            self,
            SiteKind::WhileCompound
                | SiteKind::WhileSingle
                | SiteKind::ForCompound
                | SiteKind::ForSingle
        )
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the temporary's declaration goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclarationPlacement {
    /// Directly into the enclosing block
    InBlock,
    /// Into a `{ ... }` the rewrite adds around the statement
    SynthesizedBlock,
}

/// A rule firing on one node
///
/// Offsets are byte offsets into the original source. The temporary name
/// is not part of the site; it is allocated when edits are generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSite {
    pub kind: SiteKind,
    pub rule_id: &'static str,
    /// The `if`/`while`/`for` statement
    pub statement: Range<usize>,
    /// The condition expression that gets replaced
    pub condition: Range<usize>,
    pub condition_text: String,
    pub spelling: ConditionSpelling,
    /// Condition is a macro invocation or names a known macro
    pub macro_origin: bool,
    /// Loop body statement
    pub body: Option<Range<usize>>,
    /// Offset just after the `{` of a compound loop body
    pub body_open: Option<usize>,
    /// First `if` of the chain (else-if sites); `None` when the chain is
    /// deeper than the search bound
    pub chain_head: Option<Range<usize>>,
    pub placement: DeclarationPlacement,
    pub location: Location,
}

impl MatchSite {
    /// Source range between the first and the last edit anchor of the site
    pub fn extent(&self) -> Range<usize> {
        match self.kind {
            SiteKind::ElseIf => self
                .chain_head
                .clone()
                .unwrap_or_else(|| self.statement.clone()),
            SiteKind::If | SiteKind::CaseIf => match self.placement {
                DeclarationPlacement::InBlock => self.statement.start..self.condition.end,
                DeclarationPlacement::SynthesizedBlock => self.statement.clone(),
            },
            SiteKind::WhileCompound
            | SiteKind::WhileSingle
            | SiteKind::ForCompound
            | SiteKind::ForSingle => match (self.body_open, &self.body) {
                (Some(open), _) => self.condition.start..open,
                (None, Some(body)) => self.condition.start..body.end,
                (None, None) => self.condition.clone(),
            },
        }
    }
}

/// Convert a rowan range to byte offsets
pub(crate) fn span(range: TextRange) -> Range<usize> {
    usize::from(range.start())..usize::from(range.end())
}
