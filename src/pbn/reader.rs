//! PBN document reader.
//!
//! A document is read one game at a time. Each game is a small state
//! machine over the token stream: comment lines are skipped, tag lines are
//! collected, and a blank line, the end of input or a line that is not a tag
//! ends the game. A game cut short by a malformed line keeps what it has
//! collected; the rest of its block is skipped.

use crate::error::{ParseError, Result};
use crate::pbn::game::{Document, Game, Tag, Table};
use crate::pbn::lexer::{Position, Token, TokenKind};
use crate::pbn::stream::TokenStream;
use log::{debug, trace, warn};

/// Options for [`read_pbn_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fail on a malformed line instead of skipping the rest of its game
    pub strict: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// The token a sub-parser could not accept
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    found: String,
    position: Position,
}

impl SyntaxError {
    fn at(token: &Token<'_>) -> Self {
        Self {
            found: token.to_string(),
            position: token.position,
        }
    }
}

impl From<SyntaxError> for ParseError {
    fn from(error: SyntaxError) -> Self {
        ParseError::Syntax {
            found: error.found,
            position: error.position,
        }
    }
}

type Parsed<T> = std::result::Result<T, SyntaxError>;

/// Run `parser`, restoring the stream position if it fails
fn attempt<'a, T>(
    stream: &mut TokenStream<'a>,
    parser: impl FnOnce(&mut TokenStream<'a>) -> Parsed<T>,
) -> Parsed<T> {
    let start = stream.checkpoint();
    let result = parser(&mut *stream);
    if result.is_err() {
        stream.rewind(start);
    }
    result
}

fn expect<'a>(
    stream: &mut TokenStream<'a>,
    accept: impl FnOnce(&Token<'a>) -> bool,
) -> Parsed<Token<'a>> {
    let token = stream.peek();
    if accept(&token) {
        Ok(stream.next())
    } else {
        Err(SyntaxError::at(&token))
    }
}

/// `'[' Name String ']' EOL?`
fn parse_tag(stream: &mut TokenStream<'_>) -> Parsed<Tag> {
    expect(stream, |t| t.is_punct('['))?;
    let name = expect(stream, |t| t.kind == TokenKind::Name)?;
    let value = expect(stream, |t| t.kind == TokenKind::String)?;
    expect(stream, |t| t.is_punct(']'))?;
    stream.next_if(|t| t.kind == TokenKind::Eol);
    Ok(Tag::new(name.text, value.unquoted()))
}

/// `'%' (not-EOL)* (EOL | EOF)`, returning the line without its terminator.
///
/// A blank line also ends the comment but is left in the stream so the game
/// loop still sees the boundary.
fn parse_escaped_line<'a>(stream: &mut TokenStream<'a>) -> Parsed<&'a str> {
    let percent = expect(stream, |t| t.is_punct('%'))?;
    while !matches!(
        stream.peek().kind,
        TokenKind::Eol | TokenKind::NewGame | TokenKind::Eof
    ) {
        stream.next();
    }
    let line = stream.text_since(&percent);
    stream.next_if(|t| t.kind == TokenKind::Eol);
    Ok(line)
}

fn is_row_token(token: &Token<'_>) -> bool {
    matches!(
        token.kind,
        TokenKind::Number
            | TokenKind::String
            | TokenKind::Contract
            | TokenKind::Ident
            | TokenKind::Name
    ) || token.is_punct('-')
}

/// Rows read after a table tag, and the token that cut the last row short
struct TableBody<'a> {
    rows: Vec<Vec<String>>,
    interrupted_by: Option<Token<'a>>,
}

/// `(row_token+ (EOL | EOF))*`
///
/// A line that does not start with a row token ends the body cleanly. A row
/// followed by anything other than a line end keeps its fields but marks the
/// body as interrupted, with the stream left at the offending token.
fn parse_table_body<'a>(stream: &mut TokenStream<'a>) -> TableBody<'a> {
    let mut rows = Vec::new();
    loop {
        let mut row = Vec::new();
        while let Some(token) = stream.next_if(is_row_token) {
            row.push(token.unquoted());
        }
        if row.is_empty() {
            return TableBody {
                rows,
                interrupted_by: None,
            };
        }
        trace!("table row {:?}", row);
        rows.push(row);

        let end = stream.peek();
        match end.kind {
            TokenKind::Eol => {
                stream.next();
            }
            TokenKind::Eof => {
                return TableBody {
                    rows,
                    interrupted_by: None,
                }
            }
            _ => {
                return TableBody {
                    rows,
                    interrupted_by: Some(end),
                }
            }
        }
    }
}

/// Why a game stopped collecting tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GameEnd {
    /// A blank line, consumed
    Boundary,
    EndOfInput,
    /// A line that is neither a comment nor a tag; the stream is left at it
    Truncated(SyntaxError),
}

#[derive(Debug)]
enum GameState {
    Scanning,
    Done(GameEnd),
}

/// Result of one attempt to read a game
#[derive(Debug)]
pub(crate) enum GameOutcome {
    Game(Game, GameEnd),
    /// The attempt found no tags and contributes nothing to the document
    Empty(GameEnd),
}

pub(crate) fn parse_game(stream: &mut TokenStream<'_>) -> GameOutcome {
    let mut game = Game::new();
    let mut state = GameState::Scanning;
    let end = loop {
        state = match state {
            GameState::Scanning => scan(stream, &mut game),
            GameState::Done(end) => break end,
        };
    };

    if game.tags.is_empty() {
        GameOutcome::Empty(end)
    } else {
        GameOutcome::Game(game, end)
    }
}

fn scan(stream: &mut TokenStream<'_>, game: &mut Game) -> GameState {
    if stream.next_if(|t| t.kind == TokenKind::NewGame).is_some() {
        return GameState::Done(GameEnd::Boundary);
    }
    if let Ok(line) = attempt(stream, parse_escaped_line) {
        trace!("skipping comment {:?}", line);
        return GameState::Scanning;
    }
    let tag = match attempt(stream, parse_tag) {
        Ok(tag) => tag,
        Err(_) if stream.at_end() => return GameState::Done(GameEnd::EndOfInput),
        Err(error) => return GameState::Done(GameEnd::Truncated(error)),
    };

    if tag.is_table() {
        read_table(stream, game, tag);
    } else {
        let name = tag.name.clone();
        if !game.insert_tag(tag) {
            trace!("ignoring repeated tag {}", name);
        }
    }
    GameState::Scanning
}

fn read_table(stream: &mut TokenStream<'_>, game: &mut Game, tag: Tag) {
    let body = parse_table_body(stream);
    // An interrupted table survives only when the interruption is the end
    // of the game; otherwise the game loop retries at the offending token.
    if let Some(token) = body.interrupted_by {
        if token.kind != TokenKind::NewGame {
            warn!(
                "dropping table {} at {}: unexpected {}",
                tag.name, token.position, token
            );
            return;
        }
    }
    game.insert_table(Table::from_tag(tag, body.rows));
}

/// Consume tokens up to and including the next blank line
fn skip_segment(stream: &mut TokenStream<'_>) {
    loop {
        let token = stream.next();
        if matches!(token.kind, TokenKind::NewGame | TokenKind::Eof) {
            break;
        }
    }
}

fn ensure_progress(start: usize, stream: &TokenStream<'_>, position: Position) -> Result<()> {
    if stream.checkpoint() == start {
        return Err(ParseError::NoProgress { position });
    }
    Ok(())
}

/// Read all games from PBN content.
///
/// A game ends at the first line that is neither a `%` comment nor a tag,
/// and the rest of its block up to the next blank line is skipped with a
/// warning. This includes a single empty line before a game's first tag,
/// which is a lone line break rather than a blank-line separator. Use
/// [`read_pbn_with`] in strict mode to get an error instead.
pub fn read_pbn(content: &str) -> Result<Document> {
    read_pbn_with(content, &ParseOptions::default())
}

/// Read all games from PBN content with explicit options
pub fn read_pbn_with(content: &str, options: &ParseOptions) -> Result<Document> {
    let mut stream = TokenStream::tokenize(content)?;
    let mut games = Vec::new();

    while !stream.at_end() {
        let start = stream.checkpoint();
        let position = stream.peek().position;

        let end = match parse_game(&mut stream) {
            GameOutcome::Game(game, end) => {
                debug!(
                    "game {} at {}: {} tags, {} tables",
                    games.len() + 1,
                    position,
                    game.tags.len(),
                    game.tables.len()
                );
                games.push(game);
                end
            }
            GameOutcome::Empty(end) => {
                debug!("no tags in block at {}", position);
                end
            }
        };

        if let GameEnd::Truncated(error) = end {
            if options.strict {
                return Err(error.into());
            }
            warn!(
                "skipping rest of game at {}: unexpected {}",
                error.position, error.found
            );
            skip_segment(&mut stream);
        }
        ensure_progress(start, &stream, position)?;
    }

    debug!("read {} games", games.len());
    Ok(Document::new(games))
}

/// Read all games from a PBN file
pub fn read_pbn_file(path: &std::path::Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)?;
    read_pbn(&content)
}
