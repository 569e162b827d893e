//! Text edits and their atomic application
//!
//! Rules never mutate the syntax tree. Each matched site produces an
//! [`AtomicChange`] (a group of [`Edit`]s sharing one temporary name), and all
//! changes of a unit are collected into a [`ChangeSet`] that is validated
//! and applied to the original text in a single left-to-right pass.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

use crate::{FuzzfixError, Location, Result};

/// One atomic text operation against the original source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Edit {
    /// Insert text at `offset`, ahead of anything else anchored there
    InsertBefore { offset: usize, text: String },
    /// Insert text at `offset`, closing whatever ends there
    InsertAfter { offset: usize, text: String },
    /// Replace the byte range `start..end`
    Replace {
        start: usize,
        end: usize,
        text: String,
    },
}

impl Edit {
    pub fn insert_before(offset: usize, text: impl Into<String>) -> Self {
        Self::InsertBefore {
            offset,
            text: text.into(),
        }
    }

    pub fn insert_after(offset: usize, text: impl Into<String>) -> Self {
        Self::InsertAfter {
            offset,
            text: text.into(),
        }
    }

    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self::Replace {
            start: range.start,
            end: range.end,
            text: text.into(),
        }
    }

    /// Anchor offset (start of the span for replacements)
    pub fn offset(&self) -> usize {
        match self {
            Edit::InsertBefore { offset, .. } | Edit::InsertAfter { offset, .. } => *offset,
            Edit::Replace { start, .. } => *start,
        }
    }

    /// Byte range of original text this edit consumes
    pub fn span(&self) -> Range<usize> {
        match self {
            Edit::Replace { start, end, .. } => *start..*end,
            _ => self.offset()..self.offset(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Edit::InsertBefore { text, .. }
            | Edit::InsertAfter { text, .. }
            | Edit::Replace { text, .. } => text,
        }
    }

    /// Ordering among edits sharing an offset
    ///
    /// Closers of constructs ending at the offset come first, then openers
    /// and declarations of constructs starting there, then replacements.
    fn phase(&self) -> u8 {
        match self {
            Edit::InsertAfter { .. } => 0,
            Edit::InsertBefore { .. } => 1,
            Edit::Replace { .. } => 2,
        }
    }

    fn is_insert(&self) -> bool {
        !matches!(self, Edit::Replace { .. })
    }
}

/// The edits produced for one matched site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicChange {
    /// Rule that matched the site
    pub rule_id: String,
    /// Site kind name (`if`, `else-if`, `while-single`, ...)
    pub site: String,
    /// Temporary introduced by this change
    pub temp_name: String,
    /// Location of the rewritten statement
    pub location: Location,
    pub edits: Vec<Edit>,
}

impl AtomicChange {
    pub fn new(
        rule_id: impl Into<String>,
        site: impl Into<String>,
        temp_name: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            site: site.into(),
            temp_name: temp_name.into(),
            location,
            edits: Vec::new(),
        }
    }

    pub fn with_edit(mut self, edit: Edit) -> Self {
        self.edits.push(edit);
        self
    }
}

/// All changes for one source unit, in site order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    changes: Vec<AtomicChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: AtomicChange) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[AtomicChange] {
        &self.changes
    }

    /// Number of atomic changes (one per rewritten site)
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn edit_count(&self) -> usize {
        self.changes.iter().map(|c| c.edits.len()).sum()
    }

    /// Check that the edits can be applied to `text` as a whole
    ///
    /// Every offset must lie within the text on a character boundary,
    /// replacements must not overlap, and no insertion may fall strictly
    /// inside a replacement. Insertions sharing an offset are fine.
    pub fn validate(&self, text: &str) -> Result<()> {
        let mut replacements: Vec<(Range<usize>, &str)> = Vec::new();

        for change in &self.changes {
            for edit in &change.edits {
                let span = edit.span();
                if span.start > span.end {
                    return Err(FuzzfixError::edit_application(format!(
                        "{} edit has inverted range {}..{}",
                        change.rule_id, span.start, span.end
                    )));
                }
                for offset in [span.start, span.end] {
                    if offset > text.len() || !text.is_char_boundary(offset) {
                        return Err(FuzzfixError::edit_application(format!(
                            "{} edit offset {} is not a valid position in a {}-byte source",
                            change.rule_id,
                            offset,
                            text.len()
                        )));
                    }
                }
                if !edit.is_insert() {
                    replacements.push((span, change.rule_id.as_str()));
                }
            }
        }

        replacements.sort_by_key(|(span, _)| (span.start, span.end));
        for pair in replacements.windows(2) {
            let (first, first_rule) = &pair[0];
            let (second, second_rule) = &pair[1];
            if second.start < first.end {
                return Err(FuzzfixError::edit_application(format!(
                    "{first_rule} replacement {}..{} overlaps {second_rule} replacement {}..{}",
                    first.start, first.end, second.start, second.end
                )));
            }
        }

        for change in &self.changes {
            for edit in change.edits.iter().filter(|e| e.is_insert()) {
                let offset = edit.offset();
                if let Some((span, rule)) = replacements
                    .iter()
                    .find(|(span, _)| span.start < offset && offset < span.end)
                {
                    return Err(FuzzfixError::edit_application(format!(
                        "{} insertion at {} falls inside {} replacement {}..{}",
                        change.rule_id, offset, rule, span.start, span.end
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validate, then apply every edit to `text` in one pass
    pub fn apply(&self, text: &str) -> Result<String> {
        self.validate(text)?;

        let mut ordered: Vec<(usize, u8, usize, usize, &Edit)> = self
            .changes
            .iter()
            .enumerate()
            .flat_map(|(site, change)| {
                change
                    .edits
                    .iter()
                    .enumerate()
                    .map(move |(index, edit)| (edit.offset(), edit.phase(), site, index, edit))
            })
            .collect();
        ordered.sort_by_key(|&(offset, phase, site, index, _)| (offset, phase, site, index));

        let inserted: usize = ordered.iter().map(|(.., edit)| edit.text().len()).sum();
        let mut output = String::with_capacity(text.len() + inserted);
        let mut cursor = 0;

        for (offset, _, _, _, edit) in ordered {
            if offset > cursor {
                output.push_str(&text[cursor..offset]);
                cursor = offset;
            }
            output.push_str(edit.text());
            if let Edit::Replace { end, .. } = edit {
                cursor = cursor.max(*end);
            }
        }
        output.push_str(&text[cursor..]);

        tracing::info!(
            "Applied {} changes ({} edits)",
            self.changes.len(),
            self.edit_count()
        );
        Ok(output)
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FuzzfixError::internal_error(format!("cannot serialize changes: {e}")))
    }
}

/// Generate a unified diff between original and rewritten text
pub fn generate_unified_diff(original: &str, modified: &str, file_path: &Path) -> String {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(original, modified);
    let mut output = String::new();

    output.push_str(&format!("--- {}\n", file_path.display()));
    output.push_str(&format!("+++ {} (rewritten)\n", file_path.display()));

    for group in diff.grouped_ops(3) {
        let old_line = group[0].old_range().start;
        let new_line = group[0].new_range().start;
        let old_len = group.iter().map(|op| op.old_range().len()).sum::<usize>();
        let new_len = group.iter().map(|op| op.new_range().len()).sum::<usize>();

        output.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            old_line + 1,
            old_len,
            new_line + 1,
            new_len
        ));

        for op in &group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                output.push(sign);
                output.push_str(change.value());
                if !change.value().ends_with('\n') {
                    output.push('\n');
                }
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn change(rule: &str, edits: Vec<Edit>) -> AtomicChange {
        let mut change = AtomicChange::new(rule, rule, "__fuzzfix0", Location::default());
        change.edits = edits;
        change
    }

    fn set(changes: Vec<AtomicChange>) -> ChangeSet {
        let mut set = ChangeSet::new();
        for change in changes {
            set.push(change);
        }
        set
    }

    #[test]
    fn test_apply_if_rewrite() {
        let text = "if (x + 5 > 1) { return -1; }";
        let changes = set(vec![change(
            "if",
            vec![
                Edit::insert_before(0, "int __fuzzfix0 = x + 5 > 1;\n"),
                Edit::replace(4..13, "__fuzzfix0"),
            ],
        )]);
        assert_eq!(
            changes.apply(text).unwrap(),
            "int __fuzzfix0 = x + 5 > 1;\nif (__fuzzfix0) { return -1; }"
        );
    }

    #[test]
    fn test_same_offset_inserts_stack_by_phase_then_site() {
        let text = "a;b;";
        let changes = set(vec![
            change("first", vec![Edit::insert_before(2, "<1>"), Edit::insert_after(2, "</1>")]),
            change("second", vec![Edit::insert_before(2, "<2>")]),
            change("third", vec![Edit::insert_after(2, "</3>")]),
        ]);
        assert_eq!(changes.apply(text).unwrap(), "a;</1></3><1><2>b;");
    }

    #[test]
    fn test_insert_at_replacement_edges() {
        let text = "while (c) x;";
        let changes = set(vec![change(
            "while",
            vec![
                Edit::replace(7..8, "true"),
                Edit::insert_before(7, "["),
                Edit::insert_after(8, "]"),
            ],
        )]);
        assert_eq!(changes.apply(text).unwrap(), "while ([true]) x;");
    }

    #[test]
    fn test_overlapping_replacements_rejected() {
        let changes = set(vec![
            change("a", vec![Edit::replace(0..5, "x")]),
            change("b", vec![Edit::replace(3..7, "y")]),
        ]);
        let err = changes.apply("0123456789").unwrap_err();
        assert!(matches!(err, FuzzfixError::EditApplicationFailure { .. }));
        assert!(err.to_string().contains("overlaps"));
    }

    #[test]
    fn test_insert_inside_replacement_rejected() {
        let changes = set(vec![
            change("a", vec![Edit::replace(0..5, "x")]),
            change("b", vec![Edit::insert_before(2, "y")]),
        ]);
        assert!(changes.validate("0123456789").is_err());
    }

    #[test]
    fn test_out_of_range_and_char_boundary_rejected() {
        let out_of_range = set(vec![change("a", vec![Edit::insert_after(11, "x")])]);
        assert!(out_of_range.validate("0123456789").is_err());

        let split_char = set(vec![change("a", vec![Edit::insert_before(1, "x")])]);
        assert!(split_char.validate("é").is_err());
    }

    #[test]
    fn test_empty_set_is_identity() {
        let changes = ChangeSet::new();
        assert!(changes.is_empty());
        assert_eq!(changes.apply("int x;\n").unwrap(), "int x;\n");
    }

    #[test]
    fn test_json_shape() {
        let changes = set(vec![change("if", vec![Edit::replace(4..5, "__fuzzfix0")])]);
        let json: serde_json::Value = serde_json::from_str(&changes.to_json().unwrap()).unwrap();
        let edit = &json["changes"][0]["edits"][0];
        assert_eq!(edit["op"], "replace");
        assert_eq!(edit["start"], 4);
        assert_eq!(json["changes"][0]["tempName"], "__fuzzfix0");
    }

    #[test]
    fn test_unified_diff() {
        let diff = generate_unified_diff(
            "if (a > b) f();\n",
            "int __fuzzfix0 = a > b;\nif (__fuzzfix0) f();\n",
            &PathBuf::from("t.c"),
        );
        assert!(diff.starts_with("--- t.c\n+++ t.c (rewritten)\n@@ -1,1 +1,2 @@\n"));
        assert!(diff.contains("-if (a > b) f();\n"));
        assert!(diff.contains("+int __fuzzfix0 = a > b;\n"));
    }
}
