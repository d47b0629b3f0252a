//! Portable Bridge Notation parsing.
//!
//! This crate reads PBN documents into a structured [`Document`]:
//! - **Games** are the blocks of lines between blank lines
//! - **Tags** are `[Name "Value"]` lines; the first occurrence of a name wins
//! - **Tables** are rows of fields following a tag whose name ends in `Table`
//!
//! Comment lines starting with `%` are skipped. Bridge semantics (deals,
//! contracts, scores) are left as plain strings.
//!
//! # Example
//!
//! ```
//! use bridge_pbn::read_pbn;
//!
//! let pbn_content = r#"% PBN 2.1
//! [Event "Club night"]
//! [Board "1"]
//! [Deal "N:K843.T542.J6.863 AQJ7.K.Q75.AT942 962.AJ7.KT82.J75 T5.Q9863.A943.KQ"]
//! [OptimumResultTable "Declarer;Denomination\2R;Result\2R"]
//! N NT 9
//! S S 10
//! "#;
//!
//! let document = read_pbn(pbn_content).unwrap();
//! assert_eq!(document.len(), 1);
//!
//! let game = &document.games[0];
//! assert_eq!(game.tag_value("Board"), Some("1"));
//! let table = game.table("OptimumResultTable").unwrap();
//! assert_eq!(table.data[1], ["S", "S", "10"]);
//! ```

mod error;
pub mod pbn;

pub use error::{ParseError, Result};
pub use pbn::{
    read_pbn, read_pbn_file, read_pbn_with, Document, Game, ParseOptions, Position, Table, Tag,
};
