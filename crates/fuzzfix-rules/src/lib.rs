//! Fuzzfix Rules
//!
//! The site matcher and edit generators. [`RewriteEngine`] walks a parsed
//! unit once, offers every node to the ordered [`RuleTable`], turns each
//! matched [`MatchSite`] into an atomic change and applies the resulting
//! change set to the original text.
//!
//! ```ignore
//! use std::path::Path;
//! use fuzzfix_rules::RewriteEngine;
//!
//! let outcome = RewriteEngine::default()
//!     .rewrite("void f() { if (x + 5 > 1) g(); }", Path::new("f.c"))?;
//! assert_eq!(outcome.change_count(), 1);
//! ```

pub mod builtin;
pub mod engine;
pub mod matcher;
pub mod site;

pub use builtin::{LoopBody, builtin_rules};
pub use engine::{RewriteContext, RewriteEngine, RewriteOutcome, RewriteRule, RuleTable};
pub use matcher::MatchContext;
pub use site::{DeclarationPlacement, MatchSite, SiteKind};
