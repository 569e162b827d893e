//! Rule table and rewrite engine

use std::path::{Path, PathBuf};

use fuzzfix_core::cst::{CSyntaxNode, MacroTable, parse_c};
use fuzzfix_core::{
    AtomicChange, ChangeSet, Diagnostic, FuzzfixError, LineIndex, Result, RewriteSettings,
    Severity, TempNameGenerator,
};

use crate::builtin;
use crate::matcher::{MatchContext, directives, unbalanced_directive};
use crate::site::{MatchSite, SiteKind};

/// A structural pattern paired with its edit generator
pub trait RewriteRule: Send + Sync {
    /// Rule identifier (`if`, `else-if`, ...)
    fn id(&self) -> &'static str {
        self.kind().as_str()
    }

    fn kind(&self) -> SiteKind;

    /// Recognize a site rooted at `node`
    fn match_node(&self, node: &CSyntaxNode, ctx: &MatchContext<'_>) -> Option<MatchSite>;

    /// Produce the edits for a site matched by this rule
    ///
    /// Consumes exactly one temporary name on success and none on failure.
    fn generate(&self, site: &MatchSite, ctx: &mut RewriteContext) -> Result<AtomicChange>;
}

/// Ordered rule list; the first rule that matches a node claims it
pub struct RuleTable {
    rules: Vec<Box<dyn RewriteRule>>,
}

impl RuleTable {
    pub fn new(rules: Vec<Box<dyn RewriteRule>>) -> Self {
        Self { rules }
    }

    /// The builtin rules in priority order:
    /// else-if, case-if, if, while-compound, while-single, for-compound,
    /// for-single
    pub fn builtin() -> Self {
        Self::new(builtin::builtin_rules())
    }

    /// Drop the rules the settings disable, keeping the order
    pub fn enabled(mut self, settings: &RewriteSettings) -> Self {
        self.rules.retain(|rule| {
            let enabled = settings.rule_enabled(rule.id());
            if !enabled {
                tracing::debug!("Rule '{}' disabled by configuration", rule.id());
            }
            enabled
        });
        self
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate the rules against one node in order
    pub fn dispatch(
        &self,
        node: &CSyntaxNode,
        ctx: &MatchContext<'_>,
    ) -> Option<(&dyn RewriteRule, MatchSite)> {
        self.rules.iter().find_map(|rule| {
            rule.match_node(node, ctx)
                .map(|site| (rule.as_ref(), site))
        })
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Mutable state of one rewrite run
pub struct RewriteContext {
    pub settings: RewriteSettings,
    pub names: TempNameGenerator,
    pub changes: ChangeSet,
}

impl RewriteContext {
    pub fn new(settings: RewriteSettings) -> Self {
        let names = TempNameGenerator::new(settings.temp_prefix.clone());
        Self {
            settings,
            names,
            changes: ChangeSet::new(),
        }
    }
}

/// Result of rewriting one source unit
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub file: PathBuf,
    pub original: String,
    /// Rewritten text, not yet formatted
    pub text: String,
    pub changes: ChangeSet,
    /// Sites that matched but could not be rewritten
    pub diagnostics: Vec<Diagnostic>,
}

impl RewriteOutcome {
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Rewrites every matching condition of a source unit
pub struct RewriteEngine {
    table: RuleTable,
    settings: RewriteSettings,
    extra_macros: Vec<String>,
    compiler_args: Vec<String>,
}

impl RewriteEngine {
    pub fn new(settings: RewriteSettings) -> Self {
        let table = RuleTable::builtin().enabled(&settings);
        Self {
            table,
            settings,
            extra_macros: Vec::new(),
            compiler_args: Vec::new(),
        }
    }

    /// Replace the rule table
    pub fn with_rules(mut self, table: RuleTable) -> Self {
        self.table = table;
        self
    }

    /// Additional names to treat as macros
    pub fn with_macros(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.extra_macros.extend(names);
        self
    }

    /// Compiler arguments (`-D`/`-U` feed the macro table)
    pub fn with_compiler_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.compiler_args.extend(args);
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.table
    }

    pub fn settings(&self) -> &RewriteSettings {
        &self.settings
    }

    /// Parse, match, generate and apply
    ///
    /// Parse errors and invalid edit sets fail the whole unit. A site whose
    /// edits cannot be generated, or whose edits would straddle a
    /// preprocessor conditional, is dropped with a warning diagnostic.
    pub fn rewrite(&self, source: &str, file: &Path) -> Result<RewriteOutcome> {
        let line_index = LineIndex::new(source);

        let parse = parse_c(source);
        if let Some(first) = parse.errors().first() {
            let location = line_index.location(file, source, first.span.clone());
            let message = match parse.errors().len() {
                1 => first.message.clone(),
                n => format!("{} (and {} more errors)", first.message, n - 1),
            };
            return Err(FuzzfixError::parse_failure(message, location));
        }
        let root = parse.syntax();

        let mut macros = MacroTable::from_tree(&root);
        macros.apply_compiler_args(&self.compiler_args);
        macros.extend(self.extra_macros.iter().cloned());
        tracing::debug!("{} known macros", macros.len());

        let mut ctx = RewriteContext::new(self.settings.clone());
        ctx.names.reserve_identifiers(&root);

        let sites = {
            let match_ctx = MatchContext {
                source,
                file,
                line_index: &line_index,
                macros: &macros,
                settings: &self.settings,
                names: &ctx.names,
            };
            self.collect_sites(&root, &match_ctx)
        };

        let directives = directives(&root);
        let mut diagnostics = Vec::new();
        for (rule, site) in sites {
            let generated = match unbalanced_directive(&directives, &site.extent()) {
                Some(directive) => Err(FuzzfixError::edit_generation(
                    rule.id(),
                    format!("`{}` would split the rewritten statement", directive.text),
                    site.location.clone(),
                )),
                None => rule.generate(&site, &mut ctx),
            };
            match generated {
                Ok(change) => ctx.changes.push(change),
                Err(err) if err.is_recoverable() => {
                    tracing::warn!("Dropping site: {}", err);
                    diagnostics.push(
                        Diagnostic::new(Severity::Warning, err.to_string(), site.location.clone())
                            .with_rule(rule.id()),
                    );
                }
                Err(err) => return Err(err),
            }
        }

        let text = ctx.changes.apply(source)?;

        Ok(RewriteOutcome {
            file: file.to_path_buf(),
            original: source.to_string(),
            text,
            changes: ctx.changes,
            diagnostics,
        })
    }

    /// Pre-order walk; each node is claimed by at most one rule
    fn collect_sites<'t>(
        &'t self,
        root: &CSyntaxNode,
        ctx: &MatchContext<'_>,
    ) -> Vec<(&'t dyn RewriteRule, MatchSite)> {
        let mut sites = Vec::new();
        for node in root.descendants() {
            if let Some((rule, site)) = self.table.dispatch(&node, ctx) {
                tracing::debug!(
                    "{} site at {}: {}",
                    site.kind,
                    site.location,
                    site.condition_text
                );
                sites.push((rule, site));
            }
        }
        sites
    }
}

impl Default for RewriteEngine {
    fn default() -> Self {
        Self::new(RewriteSettings::default())
    }
}
