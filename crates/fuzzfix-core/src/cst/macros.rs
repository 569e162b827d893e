//! Known macro names for a translation unit
//!
//! A condition that is a known macro name or a call of one is
//! macro-spelled. `if` rules rewrite such conditions when enabled; loop
//! rules leave them alone.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{CSyntaxKind, CSyntaxNode};

static DEFINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*define\s+([A-Za-z_$][A-Za-z0-9_$]*)(\()?").unwrap()
});

/// Where a macro name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroOrigin {
    /// `#define` with a parameter list
    FunctionLike,
    /// `#define` without parameters
    ObjectLike,
    /// `-D` compiler argument
    CommandLine,
    /// `macros` entry of the configuration file
    Config,
}

/// Set of macro names visible to the rewrite rules
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    macros: BTreeMap<String, MacroOrigin>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every `#define` in the tree
    ///
    /// `#undef` is ignored: a name that is a macro anywhere in the unit is
    /// treated as one everywhere.
    pub fn from_tree(root: &CSyntaxNode) -> Self {
        let mut table = Self::new();
        for token in root
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == CSyntaxKind::Preprocessor)
        {
            if let Some(captures) = DEFINE_REGEX.captures(token.text()) {
                let origin = if captures.get(2).is_some() {
                    MacroOrigin::FunctionLike
                } else {
                    MacroOrigin::ObjectLike
                };
                table.define(&captures[1], origin);
            }
        }
        table
    }

    pub fn define(&mut self, name: &str, origin: MacroOrigin) {
        self.macros.insert(name.to_string(), origin);
    }

    pub fn undefine(&mut self, name: &str) -> bool {
        self.macros.remove(name).is_some()
    }

    /// Apply `-D NAME[=VALUE]` and `-U NAME` compiler arguments
    ///
    /// Both the joined (`-DNAME`) and separated (`-D NAME`) spellings are
    /// accepted. Every other argument is ignored.
    pub fn apply_compiler_args<S: AsRef<str>>(&mut self, args: &[S]) {
        let mut iter = args.iter().map(AsRef::as_ref);
        while let Some(arg) = iter.next() {
            let (flag, inline) = match arg {
                "-D" | "-U" => (arg, None),
                _ if arg.starts_with("-D") || arg.starts_with("-U") => (&arg[..2], Some(&arg[2..])),
                _ => continue,
            };
            let Some(value) = inline.or_else(|| iter.next()) else {
                break;
            };
            let name = value.split('=').next().unwrap_or(value).trim();
            if name.is_empty() {
                continue;
            }
            if flag == "-D" {
                self.define(name, MacroOrigin::CommandLine);
            } else {
                self.undefine(name);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn origin(&self, name: &str) -> Option<MacroOrigin> {
        self.macros.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.macros.keys().map(String::as_str)
    }
}

impl Extend<String> for MacroTable {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for name in iter {
            self.macros.entry(name).or_insert(MacroOrigin::Config);
        }
    }
}
