//! Temporary variable names

use std::collections::HashSet;

use crate::cst::{CSyntaxKind, CSyntaxNode};

/// Default prefix for generated temporaries
pub const DEFAULT_TEMP_PREFIX: &str = "__fuzzfix";

/// Issues `<prefix>0`, `<prefix>1`, ... for one rewrite run
///
/// Names already used as identifiers in the unit are skipped, so every
/// issued name is unique in the output text.
#[derive(Debug, Clone)]
pub struct TempNameGenerator {
    prefix: String,
    next: usize,
    issued: usize,
    reserved: HashSet<String>,
}

impl TempNameGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
            issued: 0,
            reserved: HashSet::new(),
        }
    }

    /// Reserve every identifier appearing in the tree
    pub fn reserve_identifiers(&mut self, root: &CSyntaxNode) {
        self.reserved.extend(
            root.descendants_with_tokens()
                .filter_map(|e| e.into_token())
                .filter(|t| t.kind() == CSyntaxKind::Ident)
                .map(|t| t.text().to_string()),
        );
    }

    pub fn reserve(&mut self, name: impl Into<String>) {
        self.reserved.insert(name.into());
    }

    /// Issue the next free name
    pub fn allocate(&mut self) -> String {
        loop {
            let candidate = format!("{}{}", self.prefix, self.next);
            self.next += 1;
            if self.reserved.insert(candidate.clone()) {
                self.issued += 1;
                return candidate;
            }
        }
    }

    /// Number of names issued so far
    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `name` has the shape of a generated temporary
    pub fn is_generated(&self, name: &str) -> bool {
        name.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl Default for TempNameGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TEMP_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_c;

    #[test]
    fn test_monotonic_names() {
        let mut names = TempNameGenerator::default();
        assert_eq!(names.allocate(), "__fuzzfix0");
        assert_eq!(names.allocate(), "__fuzzfix1");
        assert_eq!(names.issued(), 2);
    }

    #[test]
    fn test_skips_identifiers_in_source() {
        let parse = parse_c("int __fuzzfix0 = 1; int __fuzzfix2;");
        let mut names = TempNameGenerator::default();
        names.reserve_identifiers(&parse.syntax());
        assert_eq!(names.allocate(), "__fuzzfix1");
        assert_eq!(names.allocate(), "__fuzzfix3");
    }

    #[test]
    fn test_generated_shape() {
        let names = TempNameGenerator::new("tmp_");
        assert!(names.is_generated("tmp_12"));
        assert!(!names.is_generated("tmp_"));
        assert!(!names.is_generated("tmp_x"));
        assert!(!names.is_generated("__fuzzfix0"));
    }
}
