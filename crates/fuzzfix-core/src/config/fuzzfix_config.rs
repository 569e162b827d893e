//! Configuration types for fuzzfix
//!
//! File values are all optional; [`RewriteConfiguration::resolve`] and
//! [`FormatterConfiguration::resolve`] fill in defaults and validate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::naming::DEFAULT_TEMP_PREFIX;
use crate::{FuzzfixError, Result};

/// Default bound on the else-if chain head search
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 8;

/// Ids accepted in `rewrite.rules`, in rule priority order
pub const RULE_IDS: [&str; 7] = [
    "else-if",
    "case-if",
    "if",
    "while-compound",
    "while-single",
    "for-compound",
    "for-single",
];

/// Root configuration (`.fuzzfixrc.json`, `.fuzzfixrc.toml`, `fuzzfix.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FuzzfixConfig {
    /// Rewrite rule settings
    pub rewrite: Option<RewriteConfiguration>,

    /// Output formatter settings
    pub formatter: Option<FormatterConfiguration>,

    /// Extra names to treat as macros
    pub macros: Option<Vec<String>>,
}

impl FuzzfixConfig {
    /// Load a configuration file
    ///
    /// `.toml` files are TOML; everything else is JSON with comments and
    /// trailing commas allowed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| FuzzfixError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());

        let parsed = match ext {
            Some("toml") => toml::from_str(&content).map_err(|e| e.to_string()),
            _ => json5::from_str(&content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| {
            FuzzfixError::config_error(format!(
                "Failed to load config from '{}': {}",
                path.display(),
                message
            ))
        })
    }

    /// Get rewrite configuration with defaults
    pub fn rewrite_config(&self) -> RewriteConfiguration {
        self.rewrite.clone().unwrap_or_default()
    }

    /// Get formatter configuration with defaults
    pub fn formatter_config(&self) -> FormatterConfiguration {
        self.formatter.clone().unwrap_or_default()
    }

    pub fn macro_names(&self) -> Vec<String> {
        self.macros.clone().unwrap_or_default()
    }
}

/// Rewrite rule configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RewriteConfiguration {
    /// Prefix of generated temporaries (`__fuzzfix`)
    pub temp_prefix: Option<String>,

    /// Declared type of temporaries (`int`)
    pub temp_type: Option<String>,

    /// Literal that replaces a rewritten while condition (`true`)
    pub loop_true_literal: Option<String>,

    /// Rewrite if/else-if conditions that come from macros
    pub macro_conditions: Option<bool>,

    /// Bound on the else-if chain head search
    pub max_chain_depth: Option<usize>,

    /// Scope case-label temporaries in a synthesized block
    pub case_blocks: Option<bool>,

    /// Enable or disable individual rules by id
    pub rules: Option<BTreeMap<String, bool>>,
}

/// Fully resolved rewrite settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteSettings {
    pub temp_prefix: String,
    pub temp_type: String,
    pub loop_true_literal: String,
    pub macro_conditions: bool,
    pub max_chain_depth: usize,
    pub case_blocks: bool,
    pub rules: BTreeMap<String, bool>,
}

impl Default for RewriteSettings {
    fn default() -> Self {
        Self {
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            temp_type: "int".to_string(),
            loop_true_literal: "true".to_string(),
            macro_conditions: true,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            case_blocks: false,
            rules: BTreeMap::new(),
        }
    }
}

impl RewriteSettings {
    /// Whether a rule is enabled (rules are on unless listed as `false`)
    pub fn rule_enabled(&self, rule_id: &str) -> bool {
        self.rules.get(rule_id).copied().unwrap_or(true)
    }
}

impl RewriteConfiguration {
    /// Apply defaults and validate
    pub fn resolve(&self) -> Result<RewriteSettings> {
        let defaults = RewriteSettings::default();
        let settings = RewriteSettings {
            temp_prefix: self.temp_prefix.clone().unwrap_or(defaults.temp_prefix),
            temp_type: self.temp_type.clone().unwrap_or(defaults.temp_type),
            loop_true_literal: self
                .loop_true_literal
                .clone()
                .unwrap_or(defaults.loop_true_literal),
            macro_conditions: self.macro_conditions.unwrap_or(defaults.macro_conditions),
            max_chain_depth: self.max_chain_depth.unwrap_or(defaults.max_chain_depth),
            case_blocks: self.case_blocks.unwrap_or(defaults.case_blocks),
            rules: self.rules.clone().unwrap_or_default(),
        };

        if !is_identifier(&settings.temp_prefix) {
            return Err(FuzzfixError::config_error(format!(
                "tempPrefix '{}' is not a valid C identifier",
                settings.temp_prefix
            )));
        }
        if settings.temp_type.trim().is_empty() {
            return Err(FuzzfixError::config_error("tempType must not be empty"));
        }
        if settings.loop_true_literal.trim().is_empty() {
            return Err(FuzzfixError::config_error(
                "loopTrueLiteral must not be empty",
            ));
        }
        if let Some(unknown) = settings
            .rules
            .keys()
            .find(|id| !RULE_IDS.contains(&id.as_str()))
        {
            return Err(FuzzfixError::config_error(format!(
                "unknown rule '{}' in rewrite.rules (valid rules: {})",
                unknown,
                RULE_IDS.join(", ")
            )));
        }
        if settings.max_chain_depth == 0 {
            return Err(FuzzfixError::config_error(
                "maxChainDepth must be at least 1",
            ));
        }

        Ok(settings)
    }
}

/// Indent style for formatting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    /// Use spaces for indentation
    #[default]
    Spaces,
    /// Use tabs for indentation
    Tabs,
}

/// Formatter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormatterConfiguration {
    /// Enable/disable formatter
    pub enabled: Option<bool>,

    /// Indent style (spaces or tabs)
    pub indent_style: Option<IndentStyle>,

    /// Indentation size in spaces (when indent_style is 'spaces')
    pub indent_size: Option<usize>,
}

/// Resolved formatter options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub indent_style: IndentStyle,
    pub indent_size: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_style: IndentStyle::Spaces,
            indent_size: 2,
        }
    }
}

impl FormatOptions {
    /// Text for one indentation level
    pub fn indent_unit(&self) -> String {
        match self.indent_style {
            IndentStyle::Spaces => " ".repeat(self.indent_size),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

impl FormatterConfiguration {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn resolve(&self) -> Result<FormatOptions> {
        let defaults = FormatOptions::default();
        let options = FormatOptions {
            indent_style: self.indent_style.unwrap_or(defaults.indent_style),
            indent_size: self.indent_size.unwrap_or(defaults.indent_size),
        };
        if options.indent_style == IndentStyle::Spaces && !(1..=16).contains(&options.indent_size)
        {
            return Err(FuzzfixError::config_error(format!(
                "indentSize must be between 1 and 16, got {}",
                options.indent_size
            )));
        }
        Ok(options)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
