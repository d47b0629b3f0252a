//! PBN tokenizer.
//!
//! Each rule in [`RULES`] is tried in order at the current position and the
//! first one that matches decides the token kind. Several classes overlap
//! (`X` is both a contract and a name, the `1` of `1N` also starts a number),
//! so the order of the table is part of the grammar.
//!
//! Spaces and tabs between tokens are consumed and never emitted.

use crate::error::{ParseError, Result};
use std::fmt;

/// Token classes produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Double-quoted string, quotes included in the raw text
    String,
    /// Contract level and strain (`3N`), `Pass`, `X` or `XX`
    Contract,
    Number,
    /// Capitalized identifier, as used for tag names
    Name,
    Ident,
    /// Single punctuation character
    Punct,
    /// Blank line separating two games
    NewGame,
    Eol,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::String => "string",
            TokenKind::Contract => "contract",
            TokenKind::Number => "number",
            TokenKind::Name => "name",
            TokenKind::Ident => "identifier",
            TokenKind::Punct => "punctuation",
            TokenKind::NewGame => "blank line",
            TokenKind::Eol => "end of line",
            TokenKind::Eof => "end of input",
        };
        f.write_str(name)
    }
}

/// Location of a token in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset from the start of the input
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A classified slice of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub position: Position,
}

impl Token<'_> {
    /// True for a punctuation token consisting of exactly `ch`
    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punct
            && self.text.len() == ch.len_utf8()
            && self.text.starts_with(ch)
    }

    /// Token text with one pair of surrounding quotes removed and `\"`
    /// decoded. Non-string tokens are returned as written.
    pub fn unquoted(&self) -> String {
        if self.kind != TokenKind::String {
            return self.text.to_string();
        }
        let inner = self.text.strip_prefix('"').unwrap_or(self.text);
        let inner = inner.strip_suffix('"').unwrap_or(inner);
        inner.replace("\\\"", "\"")
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::NewGame | TokenKind::Eol | TokenKind::Eof => write!(f, "{}", self.kind),
            kind => write!(f, "{} {:?}", kind, self.text),
        }
    }
}

/// Returns the byte length of the match at the start of the input, if any
type Scanner = fn(&str) -> Option<usize>;

const RULES: &[(TokenKind, Scanner)] = &[
    (TokenKind::String, scan_string),
    (TokenKind::Contract, scan_contract),
    (TokenKind::Number, scan_number),
    (TokenKind::Name, scan_name),
    (TokenKind::Ident, scan_ident),
    (TokenKind::Punct, scan_punct),
    (TokenKind::NewGame, scan_new_game),
    (TokenKind::Eol, scan_eol),
];

const PUNCTUATION: &str = "-[!@#$%^&*()+_={}|:;\"'<,>.?/]";

fn scan_string(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'"') {
        return None;
    }
    // An unterminated string still matches up to its last escaped quote,
    // which then acts as the closing quote.
    let mut last_escaped = None;
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return Some(i + 1),
            b'\\' if bytes.get(i + 1) == Some(&b'"') => {
                last_escaped = Some(i + 2);
                i += 2;
            }
            _ => i += 1,
        }
    }
    last_escaped
}

fn scan_contract(s: &str) -> Option<usize> {
    match s.as_bytes() {
        [b'1'..=b'7', b'C' | b'D' | b'H' | b'S' | b'N', ..] => Some(2),
        _ if s.starts_with("Pass") => Some(4),
        _ if s.starts_with("XX") => Some(2),
        [b'X', ..] => Some(1),
        _ => None,
    }
}

fn scan_number(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = usize::from(matches!(bytes.first().copied(), Some(b'+' | b'-')));
    let whole = count_digits(&bytes[i..]);
    i += whole;
    if bytes.get(i) == Some(&b'.') {
        let fraction = count_digits(&bytes[i + 1..]);
        if fraction > 0 {
            return Some(i + 1 + fraction);
        }
    }
    (whole > 0).then_some(i)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn scan_name(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if !bytes.first()?.is_ascii_uppercase() {
        return None;
    }
    let rest = bytes[1..]
        .iter()
        .take_while(|b| b.is_ascii_alphabetic() || **b == b'_')
        .count();
    Some(1 + rest)
}

fn scan_ident(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let first = *bytes.first()?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let rest = bytes[1..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    Some(1 + rest)
}

fn scan_punct(s: &str) -> Option<usize> {
    let first = s.chars().next()?;
    PUNCTUATION.contains(first).then_some(1)
}

fn scan_new_game(s: &str) -> Option<usize> {
    // Each of `\r\n`, `\n` and a lone `\r` counts as one line break; the
    // token runs to the last break of the whitespace that follows the first.
    let bytes = s.as_bytes();
    let mut i = scan_eol(s)?;
    let mut end = None;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\x0c' => i += 1,
            _ => match scan_eol(&s[i..]) {
                Some(len) => {
                    i += len;
                    end = Some(i);
                }
                None => break,
            },
        }
    }
    end
}

fn scan_eol(s: &str) -> Option<usize> {
    match s.as_bytes() {
        [b'\r', b'\n', ..] => Some(2),
        [b'\n' | b'\r', ..] => Some(1),
        _ => None,
    }
}

/// Lazy tokenizer over a PBN source string.
///
/// Yields one `Eof` token after the last real token, then `None`. An
/// unrecognized character yields an error and ends the stream.
pub struct Lexer<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// Position of the next unread character
    pub fn current_position(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    fn advance(&mut self, len: usize) -> &'a str {
        let text = &self.source[self.offset..self.offset + len];
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\n' => self.new_line(),
                '\r' if chars.peek() != Some(&'\n') => self.new_line(),
                _ => self.column += 1,
            }
        }
        self.offset += len;
        text
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    fn skip_whitespace(&mut self) {
        let len = self.source[self.offset..]
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        self.advance(len);
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        self.skip_whitespace();
        let position = self.current_position();
        let rest = &self.source[self.offset..];

        let Some(ch) = rest.chars().next() else {
            self.finished = true;
            return Some(Ok(Token {
                kind: TokenKind::Eof,
                text: "",
                position,
            }));
        };

        match RULES
            .iter()
            .find_map(|(kind, scan)| scan(rest).map(|len| (*kind, len)))
        {
            Some((kind, len)) => {
                let text = self.advance(len);
                Some(Ok(Token {
                    kind,
                    text,
                    position,
                }))
            }
            None => {
                self.finished = true;
                Some(Err(ParseError::UnrecognizedCharacter { ch, position }))
            }
        }
    }
}

/// Tokenize the whole input. The last token is always `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(input: &str) -> Vec<(TokenKind, &str)> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[rstest]
    #[case::string("\"Game 1\"", TokenKind::String)]
    #[case::escaped_quote(r#""say \"hi\"""#, TokenKind::String)]
    #[case::multiline_string("\"a\nb\"", TokenKind::String)]
    #[case::level_and_strain("3N", TokenKind::Contract)]
    #[case::pass("Pass", TokenKind::Contract)]
    #[case::double("X", TokenKind::Contract)]
    #[case::redouble("XX", TokenKind::Contract)]
    #[case::integer("42", TokenKind::Number)]
    #[case::signed_decimal("-3.25", TokenKind::Number)]
    #[case::leading_dot(".5", TokenKind::Number)]
    #[case::name("Event", TokenKind::Name)]
    #[case::name_with_underscore("Play_Time", TokenKind::Name)]
    #[case::ident("north", TokenKind::Ident)]
    #[case::ident_with_digits("a1b2", TokenKind::Ident)]
    #[case::underscore("_x", TokenKind::Ident)]
    #[case::bracket("[", TokenKind::Punct)]
    #[case::close_bracket("]", TokenKind::Punct)]
    #[case::dash("-", TokenKind::Punct)]
    #[case::percent("%", TokenKind::Punct)]
    #[case::blank_line("\n\n", TokenKind::NewGame)]
    #[case::blank_line_with_spaces("\n  \t\n", TokenKind::NewGame)]
    #[case::crlf_blank_line("\r\n\r\n", TokenKind::NewGame)]
    #[case::cr_blank_line("\r\r", TokenKind::NewGame)]
    #[case::cr_blank_line_with_spaces("\r \r", TokenKind::NewGame)]
    #[case::newline("\n", TokenKind::Eol)]
    #[case::crlf("\r\n", TokenKind::Eol)]
    #[case::carriage_return("\r", TokenKind::Eol)]
    fn test_single_token(#[case] input: &str, #[case] expected: TokenKind) {
        assert_eq!(kinds(input), vec![(expected, input)]);
    }

    #[test]
    fn test_contract_wins_over_name() {
        assert_eq!(
            kinds("1NT Xavier Passed"),
            vec![
                (TokenKind::Contract, "1N"),
                (TokenKind::Name, "T"),
                (TokenKind::Contract, "X"),
                (TokenKind::Ident, "avier"),
                (TokenKind::Contract, "Pass"),
                (TokenKind::Ident, "ed"),
            ]
        );
    }

    #[test]
    fn test_name_stops_at_digit() {
        assert_eq!(
            kinds("Abc1"),
            vec![(TokenKind::Name, "Abc"), (TokenKind::Number, "1")]
        );
    }

    #[test]
    fn test_number_without_fraction_digits() {
        assert_eq!(
            kinds("1. 8"),
            vec![
                (TokenKind::Number, "1"),
                (TokenKind::Punct, "."),
                (TokenKind::Number, "8"),
            ]
        );
    }

    #[test]
    fn test_unterminated_string_ends_at_last_escaped_quote() {
        assert_eq!(
            kinds(r#""a\" b\" c"#),
            vec![(TokenKind::String, r#""a\" b\""#), (TokenKind::Ident, "c")]
        );
    }

    #[test]
    fn test_unterminated_string_without_escape_is_punct() {
        assert_eq!(
            kinds("\"abc"),
            vec![(TokenKind::Punct, "\""), (TokenKind::Ident, "abc")]
        );
    }

    #[test]
    fn test_blank_line_runs_to_last_line_break() {
        assert_eq!(
            kinds("]\n\n \n  [ "),
            vec![
                (TokenKind::Punct, "]"),
                (TokenKind::NewGame, "\n\n \n"),
                (TokenKind::Punct, "["),
            ]
        );
    }

    #[test]
    fn test_tag_line() {
        assert_eq!(
            kinds("[Event \"Game 1\"]\n"),
            vec![
                (TokenKind::Punct, "["),
                (TokenKind::Name, "Event"),
                (TokenKind::String, "\"Game 1\""),
                (TokenKind::Punct, "]"),
                (TokenKind::Eol, "\n"),
            ]
        );
    }

    #[test]
    fn test_eof_is_last_and_positioned_at_end() {
        let tokens = tokenize("x  ").unwrap();
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.position.offset, 3);
        assert_eq!(tokenize("").unwrap().len(), 1);
    }

    #[test]
    fn test_positions_track_lines_and_columns() {
        let tokens = tokenize("[A \"é\"]\n  b").unwrap();
        let b = tokens.iter().find(|t| t.text == "b").unwrap();
        assert_eq!(
            b.position,
            Position {
                offset: 11,
                line: 2,
                column: 3
            }
        );
        let close = tokens.iter().find(|t| t.text == "]").unwrap();
        assert_eq!(close.position.column, 7);
    }

    #[test]
    fn test_unrecognized_character() {
        let err = tokenize("[Event \"x\"]\n ~").unwrap_err();
        match err {
            ParseError::UnrecognizedCharacter { ch, position } => {
                assert_eq!(ch, '~');
                assert_eq!(position.line, 2);
                assert_eq!(position.column, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_ascii_outside_string_is_rejected() {
        assert!(tokenize("é").is_err());
        assert!(tokenize("\"é\"").is_ok());
    }

    #[test]
    fn test_lexer_stops_after_error() {
        let mut lexer = Lexer::new("\\a");
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_unquoted() {
        let tokens = tokenize(r#""say \"hi\"" plain"#).unwrap();
        assert_eq!(tokens[0].unquoted(), "say \"hi\"");
        assert_eq!(tokens[1].unquoted(), "plain");
    }
}
