//! Cursor over a tokenized PBN document.

use crate::error::Result;
use crate::pbn::lexer::{Lexer, Token, TokenKind};

/// Token buffer with one token of lookahead and rewindable checkpoints.
///
/// Reading past the end keeps returning the `Eof` token.
pub(crate) struct TokenStream<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    end: Token<'a>,
    cursor: usize,
}

impl<'a> TokenStream<'a> {
    pub fn tokenize(source: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        for token in lexer.by_ref() {
            let token = token?;
            if token.kind == TokenKind::Eof {
                break;
            }
            tokens.push(token);
        }
        let end = Token {
            kind: TokenKind::Eof,
            text: "",
            position: lexer.current_position(),
        };
        Ok(Self {
            source,
            tokens,
            end,
            cursor: 0,
        })
    }

    pub fn peek(&self) -> Token<'a> {
        self.tokens.get(self.cursor).copied().unwrap_or(self.end)
    }

    pub fn next(&mut self) -> Token<'a> {
        let token = self.peek();
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        token
    }

    /// Consume the next token only if it satisfies `accept`
    pub fn next_if(&mut self, accept: impl FnOnce(&Token<'a>) -> bool) -> Option<Token<'a>> {
        let token = self.peek();
        accept(&token).then(|| self.next())
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Index of the next token, usable with [`TokenStream::rewind`]
    pub fn checkpoint(&self) -> usize {
        self.cursor
    }

    pub fn rewind(&mut self, checkpoint: usize) {
        self.cursor = checkpoint.min(self.tokens.len());
    }

    /// Source text from the start of `from` up to the next unread token
    pub fn text_since(&self, from: &Token<'a>) -> &'a str {
        let start = from.position.offset;
        let end = self.peek().position.offset.max(start);
        &self.source[start..end]
    }
}
