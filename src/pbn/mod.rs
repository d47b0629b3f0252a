//! PBN (Portable Bridge Notation) tokenizer and reader.
//!
//! PBN is the standard format for storing bridge hands, results, and analysis.
//! This module reads a PBN document into games of tags and tables without
//! interpreting the bridge content of the values.

mod game;
pub mod lexer;
mod reader;
mod stream;

pub use game::{Document, Game, Table, Tag};
pub use lexer::{tokenize, Lexer, Position, Token, TokenKind};
pub use reader::{read_pbn, read_pbn_file, read_pbn_with, ParseOptions};
