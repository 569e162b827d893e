//! CST-aware C lexer that preserves all trivia
//!
//! Every byte of the input ends up in exactly one token, so the tree built
//! from these tokens round-trips: `parse_c(source).syntax().text() == source`.
//! Preprocessor directives are lexed as a single trivia token; the rewrite
//! engine never looks inside them except to harvest `#define` names.

use crate::cst::CSyntaxKind;
use std::ops::Range;

/// Simple span representing a byte range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: CSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: CSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

const THREE_CHAR_OPERATORS: [&str; 5] = ["<<=", ">>=", "...", "<=>", "->*"];
const TWO_CHAR_OPERATORS: [&str; 20] = [
    "==", "!=", "<=", ">=", "&&", "||", "++", "--", "->", "<<", ">>", "+=", "-=", "*=", "/=",
    "%=", "&=", "|=", "^=", "##",
];

/// Lex C source preserving ALL trivia for CST construction
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    let len = input.len();
    let mut i = 0usize;
    // Only whitespace seen since the last newline; gates `#` directives
    let mut at_line_start = true;

    while i < len {
        let Some((current, size)) = next_char(input, i) else {
            break;
        };
        let start = i;

        match current {
            '\n' => {
                tokens.push(CstToken::new(CSyntaxKind::Newline, "\n", span(start, i + size)));
                i += size;
                at_line_start = true;
                continue;
            }
            '\r' => {
                let mut end = i + size;
                if let Some(('\n', nl_size)) = next_char(input, end) {
                    end += nl_size;
                }
                tokens.push(CstToken::new(
                    CSyntaxKind::Newline,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
                at_line_start = true;
                continue;
            }
            c if c.is_whitespace() => {
                let mut end = i + size;
                while let Some((next_ch, next_size)) = next_char(input, end) {
                    if next_ch.is_whitespace() && next_ch != '\n' && next_ch != '\r' {
                        end += next_size;
                    } else {
                        break;
                    }
                }
                tokens.push(CstToken::new(
                    CSyntaxKind::Whitespace,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
                continue;
            }
            '#' if at_line_start => {
                let (end, error) = lex_directive(input, start);
                if let Some(err) = error {
                    errors.push(err);
                }
                tokens.push(CstToken::new(
                    CSyntaxKind::Preprocessor,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
                continue;
            }
            '/' if input[i..].starts_with("//") => {
                let end = line_end(input, start);
                tokens.push(CstToken::new(
                    CSyntaxKind::CommentLine,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
                continue;
            }
            '/' if input[i..].starts_with("/*") => {
                let (end, error) = lex_block_comment(input, start);
                if let Some(err) = error {
                    errors.push(err);
                }
                tokens.push(CstToken::new(
                    CSyntaxKind::CommentBlock,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
                continue;
            }
            _ => {}
        }

        at_line_start = false;

        let (kind, end) = match current {
            '"' => {
                let (end, error) = lex_quoted(input, start, '"');
                if let Some(err) = error {
                    errors.push(err);
                }
                (CSyntaxKind::String, end)
            }
            '\'' => {
                let (end, error) = lex_quoted(input, start, '\'');
                if let Some(err) = error {
                    errors.push(err);
                }
                (CSyntaxKind::Char, end)
            }
            c if is_ident_start(c) => {
                let end = read_word(input, start);
                let word = &input[start..end];
                match next_char(input, end) {
                    // Encoding prefixes: L"..", u8"..", U'..'
                    Some((quote @ ('"' | '\''), _)) if matches!(word, "L" | "u" | "U" | "u8") => {
                        let (lit_end, error) = lex_quoted(input, end, quote);
                        if let Some(err) = error {
                            errors.push(err);
                        }
                        let kind = if quote == '"' {
                            CSyntaxKind::String
                        } else {
                            CSyntaxKind::Char
                        };
                        (kind, lit_end)
                    }
                    _ => (
                        CSyntaxKind::from_keyword(word).unwrap_or(CSyntaxKind::Ident),
                        end,
                    ),
                }
            }
            c if c.is_ascii_digit() => (CSyntaxKind::Number, lex_number(input, start)),
            '.' if next_char(input, i + size).is_some_and(|(c, _)| c.is_ascii_digit()) => {
                (CSyntaxKind::Number, lex_number(input, start))
            }
            '(' => (CSyntaxKind::LParen, i + size),
            ')' => (CSyntaxKind::RParen, i + size),
            '{' => (CSyntaxKind::LBrace, i + size),
            '}' => (CSyntaxKind::RBrace, i + size),
            '[' => (CSyntaxKind::LBracket, i + size),
            ']' => (CSyntaxKind::RBracket, i + size),
            ';' => (CSyntaxKind::Semicolon, i + size),
            ',' => (CSyntaxKind::Comma, i + size),
            '?' => (CSyntaxKind::Question, i + size),
            ':' if input[i..].starts_with("::") => (CSyntaxKind::ColonColon, i + 2),
            ':' => (CSyntaxKind::Colon, i + size),
            '!' if !input[i..].starts_with("!=") => (CSyntaxKind::Bang, i + size),
            _ => match lex_operator(input, start) {
                Some(end) => (CSyntaxKind::Operator, end),
                None => {
                    errors.push(LexerError::new(
                        format!("Unexpected character '{current}'"),
                        span(start, i + size),
                    ));
                    (CSyntaxKind::Unknown, i + size)
                }
            },
        };

        tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
        i = end;
    }

    (tokens, errors)
}

/// Lex a preprocessor directive, following backslash continuations
///
/// Block comments inside the directive may span lines and are swallowed with it.
fn lex_directive(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() {
        match bytes[end] {
            b'\n' | b'\r' => {
                if continues_line(bytes, end) {
                    end += 1;
                    continue;
                }
                break;
            }
            b'/' if input[end..].starts_with("/*") => {
                let (comment_end, error) = lex_block_comment(input, end);
                if error.is_some() {
                    return (comment_end, error);
                }
                end = comment_end;
            }
            b'/' if input[end..].starts_with("//") => {
                return (line_end(input, end), None);
            }
            _ => end += 1,
        }
    }
    (end, None)
}

/// Whether the line break at `pos` is escaped by a trailing backslash
fn continues_line(bytes: &[u8], pos: usize) -> bool {
    let mut back = pos;
    // `\r\n`: look before the `\r`
    if bytes[pos] == b'\n' && back > 0 && bytes[back - 1] == b'\r' {
        back -= 1;
    }
    back > 0 && bytes[back - 1] == b'\\'
}

fn lex_block_comment(input: &str, start: usize) -> (usize, Option<LexerError>) {
    match input[start + 2..].find("*/") {
        Some(rel) => (start + 2 + rel + 2, None),
        None => (
            input.len(),
            Some(LexerError::new(
                "Unterminated block comment",
                span(start, input.len()),
            )),
        ),
    }
}

/// Lex a string or character literal starting at the opening quote
fn lex_quoted(input: &str, start: usize, quote: char) -> (usize, Option<LexerError>) {
    let mut end = start + quote.len_utf8();
    while let Some((c, size)) = next_char(input, end) {
        match c {
            '\\' => {
                end += size;
                if let Some((_, escaped)) = next_char(input, end) {
                    end += escaped;
                }
            }
            '\n' | '\r' => break,
            c if c == quote => return (end + size, None),
            _ => end += size,
        }
    }

    let what = if quote == '"' {
        "string literal"
    } else {
        "character literal"
    };
    (
        end,
        Some(LexerError::new(
            format!("Unterminated {what}"),
            span(start, end),
        )),
    )
}

/// Lex a pp-number: digits, letters, dots, digit separators and signed exponents
fn lex_number(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() {
        let b = bytes[end];
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' {
            end += 1;
        } else if b == b'\'' && end + 1 < bytes.len() && bytes[end + 1].is_ascii_alphanumeric() {
            end += 1;
        } else if (b == b'+' || b == b'-')
            && matches!(bytes[end - 1], b'e' | b'E' | b'p' | b'P')
            && !is_hex_prefixed(&input[start..end - 1], bytes[end - 1])
        {
            end += 1;
        } else {
            break;
        }
    }
    end
}

/// `0x1e+2` is `0x1e + 2`, while `0x1p+2` and `1e+2` are single numbers
fn is_hex_prefixed(digits: &str, exponent: u8) -> bool {
    let hex = digits.starts_with("0x") || digits.starts_with("0X");
    hex && matches!(exponent, b'e' | b'E')
}

fn lex_operator(input: &str, start: usize) -> Option<usize> {
    let rest = &input[start..];
    if let Some(op) = THREE_CHAR_OPERATORS.iter().find(|op| rest.starts_with(**op)) {
        return Some(start + op.len());
    }
    if let Some(op) = TWO_CHAR_OPERATORS.iter().find(|op| rest.starts_with(**op)) {
        return Some(start + op.len());
    }
    let c = rest.chars().next()?;
    "+-*/%&|^~<>=.#@\\".contains(c).then(|| start + c.len_utf8())
}

fn line_end(input: &str, start: usize) -> usize {
    input[start..]
        .find(['\n', '\r'])
        .map_or(input.len(), |rel| start + rel)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn read_word(input: &str, start: usize) -> usize {
    let mut end = start;
    while let Some((c, size)) = next_char(input, end) {
        if c.is_alphanumeric() || c == '_' || c == '$' {
            end += size;
        } else {
            break;
        }
    }
    end
}

fn next_char(input: &str, pos: usize) -> Option<(char, usize)> {
    input[pos..].chars().next().map(|c| (c, c.len_utf8()))
}

fn span(start: usize, end: usize) -> CstSpan {
    start..end
}
