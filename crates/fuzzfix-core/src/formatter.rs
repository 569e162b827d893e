//! Output formatting for rewritten C source
//!
//! The rewrite edits insert declarations and braces without caring about
//! layout; [`CFormatter`] re-indents the result. Only leading and trailing
//! whitespace of each line changes, so token content is never altered and
//! formatting is idempotent.

use crate::config::{FormatOptions, FormatterConfiguration};
use crate::cst::{CSyntaxKind, CstToken, lex_with_trivia};
use crate::Result;

/// Formatter trait for rewritten source
pub trait Formatter {
    /// Format a string and return the result
    fn format_string(&self, content: &str) -> Result<String>;

    /// Check if content needs formatting
    fn check_format(&self, content: &str) -> Result<bool> {
        Ok(self.format_string(content)? != content)
    }
}

/// Leaves the text untouched (`--no-format`)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format_string(&self, content: &str) -> Result<String> {
        Ok(content.to_string())
    }
}

/// Brace-depth re-indenting formatter for C
///
/// - one level per enclosing brace block
/// - `case`/`default` labels at the level of their `switch`
/// - one extra level per pending unbraced `if`/`else`/loop body
/// - two extra levels for lines that start inside parentheses or in the
///   middle of a statement
/// - preprocessor lines at column 0
/// - block comment interiors untouched
#[derive(Debug, Clone, Default)]
pub struct CFormatter {
    options: FormatOptions,
}

impl CFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }
}

impl Formatter for CFormatter {
    fn format_string(&self, content: &str) -> Result<String> {
        let (tokens, _) = lex_with_trivia(content);
        let unit = self.options.indent_unit();
        let mut state = IndentState::default();
        let mut lines: Vec<String> = Vec::new();

        for line in tokens.split(|t| t.kind == CSyntaxKind::Newline) {
            let Some(start) = line.iter().position(|t| t.kind != CSyntaxKind::Whitespace) else {
                lines.push(String::new());
                continue;
            };
            let end = line
                .iter()
                .rposition(|t| t.kind != CSyntaxKind::Whitespace)
                .map_or(start, |i| i + 1);
            let body = &line[start..end];

            let level = if body[0].kind == CSyntaxKind::Preprocessor {
                0
            } else {
                state.line_level(body)
            };

            let mut text = unit.repeat(level);
            for (i, token) in body.iter().enumerate() {
                let is_last = i + 1 == body.len();
                if is_last
                    && matches!(
                        token.kind,
                        CSyntaxKind::CommentLine | CSyntaxKind::Preprocessor
                    )
                {
                    text.push_str(token.text.trim_end_matches([' ', '\t']));
                } else {
                    text.push_str(&token.text);
                }
            }
            lines.push(text);

            state.advance(body, level);
        }

        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            return Ok(String::new());
        }

        let mut output = lines.join("\n");
        output.push('\n');
        Ok(output)
    }
}

/// Line terminator of a source file
///
/// Rewrites and the formatter produce `\n`; [`LineEnding::apply`] puts the
/// input's terminator back so the output never mixes the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// `CrLf` when the first line break of `source` is `\r\n`
    pub fn detect(source: &str) -> Self {
        match source.find('\n') {
            Some(i) if source[..i].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    /// Rewrite every line break of `text` to this terminator
    pub fn apply(self, text: &str) -> String {
        let lf = text.replace("\r\n", "\n");
        match self {
            LineEnding::Lf => lf,
            LineEnding::CrLf => lf.replace('\n', "\r\n"),
        }
    }
}

/// Build the formatter selected by configuration
pub fn formatter_for(config: &FormatterConfiguration) -> Result<Box<dyn Formatter>> {
    if config.is_enabled() {
        Ok(Box::new(CFormatter::new(config.resolve()?)))
    } else {
        Ok(Box::new(NoopFormatter))
    }
}

/// An open brace block
#[derive(Debug, Clone, Copy)]
struct BlockFrame {
    /// Indent level of the line holding the `{`
    level: usize,
    is_switch: bool,
}

#[derive(Debug, Default)]
struct IndentState {
    blocks: Vec<BlockFrame>,
    paren_depth: usize,
    /// Unbraced control bodies awaiting their statement
    pending_bodies: usize,
    /// Inside a statement that has not reached its terminator
    in_statement: bool,
    /// Control keyword seen; its parenthesized header is not yet closed
    header: Option<HeaderKind>,
    /// Paren depth at which the current header was opened
    header_depth: usize,
    /// The next `{` opens a switch body
    switch_body_next: bool,
    open_ternaries: usize,
    previous: Option<CSyntaxKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderKind {
    Switch,
    Other,
}

impl IndentState {
    fn base(&self) -> usize {
        self.blocks.last().map_or(0, |frame| frame.level + 1)
    }

    fn line_level(&self, body: &[CstToken]) -> usize {
        let first = body
            .iter()
            .find(|t| !t.kind.is_trivia())
            .map(|t| t.kind);

        match first {
            Some(CSyntaxKind::RBrace) => self.blocks.last().map_or(0, |frame| frame.level),
            Some(CSyntaxKind::CaseKw | CSyntaxKind::DefaultKw)
                if self.blocks.last().is_some_and(|frame| frame.is_switch) =>
            {
                self.blocks.last().map_or(0, |frame| frame.level)
            }
            Some(CSyntaxKind::LBrace) if self.paren_depth == 0 => {
                self.base() + self.pending_bodies.saturating_sub(1)
            }
            _ => {
                let continuation = self.paren_depth > 0 || self.in_statement;
                self.base() + self.pending_bodies + if continuation { 2 } else { 0 }
            }
        }
    }

    fn advance(&mut self, body: &[CstToken], line_level: usize) {
        for token in body.iter().filter(|t| !t.kind.is_trivia()) {
            self.step(token.kind, line_level);
            self.previous = Some(token.kind);
        }
    }

    fn step(&mut self, kind: CSyntaxKind, line_level: usize) {
        if kind != CSyntaxKind::LBrace {
            self.switch_body_next = false;
        }

        match kind {
            CSyntaxKind::IfKw | CSyntaxKind::WhileKw | CSyntaxKind::ForKw => {
                if kind == CSyntaxKind::IfKw && self.previous == Some(CSyntaxKind::ElseKw) {
                    self.pending_bodies = self.pending_bodies.saturating_sub(1);
                }
                self.header = Some(HeaderKind::Other);
                self.header_depth = self.paren_depth;
                self.in_statement = true;
            }
            CSyntaxKind::SwitchKw => {
                self.header = Some(HeaderKind::Switch);
                self.header_depth = self.paren_depth;
                self.in_statement = true;
            }
            CSyntaxKind::ElseKw | CSyntaxKind::DoKw => {
                self.pending_bodies += 1;
                self.in_statement = false;
            }
            CSyntaxKind::LParen | CSyntaxKind::LBracket => {
                self.paren_depth += 1;
                self.in_statement = true;
            }
            CSyntaxKind::RParen | CSyntaxKind::RBracket => {
                self.paren_depth = self.paren_depth.saturating_sub(1);
                match self.header {
                    Some(header) if kind == CSyntaxKind::RParen && self.paren_depth == self.header_depth => {
                        self.header = None;
                        self.pending_bodies += 1;
                        self.switch_body_next = header == HeaderKind::Switch;
                        self.in_statement = false;
                    }
                    _ => self.in_statement = true,
                }
            }
            CSyntaxKind::LBrace => {
                let is_switch = self.switch_body_next;
                self.switch_body_next = false;
                self.blocks.push(BlockFrame {
                    level: line_level,
                    is_switch,
                });
                self.pending_bodies = 0;
                self.in_statement = false;
            }
            CSyntaxKind::RBrace => {
                self.blocks.pop();
                self.pending_bodies = 0;
                self.in_statement = false;
            }
            CSyntaxKind::Semicolon if self.paren_depth == 0 => {
                self.pending_bodies = 0;
                self.in_statement = false;
            }
            CSyntaxKind::Comma if self.paren_depth == 0 => {
                self.in_statement = false;
            }
            CSyntaxKind::Question => {
                self.open_ternaries += 1;
                self.in_statement = true;
            }
            CSyntaxKind::Colon if self.paren_depth == 0 => {
                if self.open_ternaries > 0 {
                    self.open_ternaries -= 1;
                    self.in_statement = true;
                } else {
                    self.in_statement = false;
                }
            }
            _ => self.in_statement = true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndentStyle;

    fn format(source: &str) -> String {
        CFormatter::default().format_string(source).unwrap()
    }

    #[test]
    fn test_reindents_rewritten_while() {
        let source = "int main() {\n  while (true) {\nint __fuzzfix0 = y <= 2;\nif (!__fuzzfix0) break;\nreturn 0;\n}\n}";
        insta::assert_snapshot!(format(source), @r"
        int main() {
          while (true) {
            int __fuzzfix0 = y <= 2;
            if (!__fuzzfix0) break;
            return 0;
          }
        }
        ");
    }

    #[test]
    fn test_switch_and_unbraced_bodies() {
        let source = "void f(int c) {\nswitch (c) {\ncase 1:\nif (c)\nreturn;\nbreak;\ndefault:\nfor (;;)\nif (x)\ng();\nelse\nh();\n}\n}\n";
        insta::assert_snapshot!(format(source), @r"
        void f(int c) {
          switch (c) {
          case 1:
            if (c)
              return;
            break;
          default:
            for (;;)
              if (x)
                g();
            else
              h();
          }
        }
        ");
    }

    #[test]
    fn test_else_if_chain_and_allman_braces() {
        let source = "void f() {\nif (a)\n{\nx();\n}\nelse if (b)\ny();\nelse\nz();\n}\n";
        assert_eq!(
            format(source),
            "void f() {\n  if (a)\n  {\n    x();\n  }\n  else if (b)\n    y();\n  else\n    z();\n}\n"
        );
    }

    #[test]
    fn test_preprocessor_comments_and_whitespace() {
        let source = "  #define A 1   \nint f() {\n/* keep\n      this */\n    int x = 1;   // note   \n\n\n}\n\n\n";
        assert_eq!(
            format(source),
            "#define A 1\nint f() {\n  /* keep\n      this */\n  int x = 1;   // note\n\n\n}\n"
        );
    }

    #[test]
    fn test_continuation_lines() {
        let source = "int f() {\nreturn g(1,\n2) +\n3;\n}\n";
        assert_eq!(
            format(source),
            "int f() {\n  return g(1,\n      2) +\n      3;\n}\n"
        );
    }

    #[test]
    fn test_tabs() {
        let formatter = CFormatter::new(FormatOptions {
            indent_style: IndentStyle::Tabs,
            indent_size: 4,
        });
        assert_eq!(
            formatter.format_string("int f() {\nreturn 0;\n}").unwrap(),
            "int f() {\n\treturn 0;\n}\n"
        );
    }

    #[test]
    fn test_idempotent() {
        let source = "void f() {\n  if (a) {\n    do\n  x++;\n    while (x < 3);\n  }\n}\n";
        let once = format(source);
        assert_eq!(format(&once), once);
        assert!(!CFormatter::default().check_format(&once).unwrap());
    }

    #[test]
    fn test_noop_and_factory() {
        let text = "int  x ;   ";
        assert_eq!(NoopFormatter.format_string(text).unwrap(), text);

        let disabled = FormatterConfiguration {
            enabled: Some(false),
            ..Default::default()
        };
        assert_eq!(
            formatter_for(&disabled).unwrap().format_string(text).unwrap(),
            text
        );
    }

    #[test]
    fn test_line_ending_restored() {
        let source = "void f(int a) {\r\n  if (a) g();\r\n}\r\n";
        let ending = LineEnding::detect(source);
        assert_eq!(ending, LineEnding::CrLf);
        assert_eq!(LineEnding::detect("int x;\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("int x;"), LineEnding::Lf);

        // Inserted lines use `\n`; the result is uniformly CRLF
        let rewritten = "void f(int a) {\r\n  int t = a;\nif (t) g();\r\n}\r\n";
        assert_eq!(
            ending.apply(rewritten),
            "void f(int a) {\r\n  int t = a;\r\nif (t) g();\r\n}\r\n"
        );
        assert_eq!(
            ending.apply(&format(rewritten)),
            "void f(int a) {\r\n  int t = a;\r\n  if (t) g();\r\n}\r\n"
        );
        assert_eq!(
            LineEnding::Lf.apply(rewritten),
            "void f(int a) {\n  int t = a;\nif (t) g();\n}\n"
        );
    }
}
