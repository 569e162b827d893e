//! Configuration system for fuzzfix
//!
//! ## Configuration Files
//!
//! - `.fuzzfixrc.json` / `fuzzfix.json` - JSON with comments and trailing commas
//! - `.fuzzfixrc.toml` - TOML
//!
//! When no explicit config path is provided, files are searched for starting
//! from the input file's directory and moving up the directory tree.
//! Command-line flags override file values.
//!
//! ## Example Configuration
//!
//! ```jsonc
//! {
//!   "rewrite": {
//!     "tempPrefix": "__fuzzfix",
//!     "tempType": "int",
//!     "loopTrueLiteral": "true",
//!     "macroConditions": true,
//!     "maxChainDepth": 8,
//!     "caseBlocks": false,
//!     "rules": { "while-single": true }
//!   },
//!   "formatter": { "enabled": true, "indentStyle": "spaces", "indentSize": 2 },
//!   "macros": ["streq"]
//! }
//! ```

mod fuzzfix_config;
mod loader;

pub use fuzzfix_config::{
    DEFAULT_MAX_CHAIN_DEPTH, FormatOptions, FormatterConfiguration, FuzzfixConfig, IndentStyle,
    RULE_IDS, RewriteConfiguration, RewriteSettings,
};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
