//! Error types for PBN parsing.

use crate::pbn::Position;
use thiserror::Error;

/// Errors that can surface from parsing a PBN document
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("PBN lex error: unrecognized character {ch:?} at {position}")]
    UnrecognizedCharacter { ch: char, position: Position },

    #[error("PBN parse error: parser made no progress at {position}")]
    NoProgress { position: Position },

    #[error("PBN parse error: unexpected {found} at {position}")]
    Syntax { found: String, position: Position },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for PBN parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;
