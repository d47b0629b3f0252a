//! Parsed PBN structures: documents, games, tags and tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parsed PBN tag pair: `[Name "Value"]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    /// Value with the surrounding quotes removed and `\"` decoded
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Tags such as `[OptimumResultTable "..."]` introduce a table body
    pub fn is_table(&self) -> bool {
        self.name.ends_with("Table")
    }
}

/// A named block of rows following a `...Table` tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    /// The introducing tag's value, e.g. `"Declarer\2R;Denomination\2R"`
    pub column_description: String,
    pub data: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from the tag that introduced it
    pub fn from_tag(tag: Tag, data: Vec<Vec<String>>) -> Self {
        Self {
            name: tag.name,
            column_description: tag.value,
            data,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.data.iter().map(Vec::as_slice)
    }
}

/// One game: the tags and tables between two blank lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub tags: BTreeMap<String, Tag>,
    pub tables: BTreeMap<String, Table>,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.get(name)
    }

    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(|tag| tag.value.as_str())
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Tags ordered by name
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    /// Tables ordered by name
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Add a tag unless one with the same name is already present.
    ///
    /// Returns false when the tag was discarded as a duplicate.
    pub fn insert_tag(&mut self, tag: Tag) -> bool {
        if self.tags.contains_key(&tag.name) {
            return false;
        }
        self.tags.insert(tag.name.clone(), tag);
        true
    }

    /// Add a table, replacing any earlier table with the same name
    pub fn insert_table(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name.clone(), table)
    }
}

/// All games of a PBN document, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub games: Vec<Game>,
}

impl Document {
    pub fn new(games: Vec<Game>) -> Self {
        Self { games }
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Game> {
        self.games.iter()
    }

    pub fn into_games(self) -> Vec<Game> {
        self.games
    }
}

impl IntoIterator for Document {
    type Item = Game;
    type IntoIter = std::vec::IntoIter<Game>;

    fn into_iter(self) -> Self::IntoIter {
        self.games.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Game;
    type IntoIter = std::slice::Iter<'a, Game>;

    fn into_iter(self) -> Self::IntoIter {
        self.games.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_equality() {
        assert_eq!(Tag::new("Name", "TagValue"), Tag::new("Name", "TagValue"));
        assert_ne!(Tag::new("Name", "TagValue"), Tag::new("Name", "Other"));
        assert_ne!(Tag::new("Name", "TagValue"), Tag::new("Other", "TagValue"));
    }

    #[test]
    fn test_is_table() {
        assert!(Tag::new("OptimumResultTable", "").is_table());
        assert!(!Tag::new("Tables", "").is_table());
    }

    #[test]
    fn test_first_tag_wins() {
        let mut game = Game::new();
        assert!(game.insert_tag(Tag::new("Test", "Test 1")));
        assert!(!game.insert_tag(Tag::new("Test", "Test 2")));
        assert_eq!(game.tag_value("Test"), Some("Test 1"));
    }

    #[test]
    fn test_last_table_wins() {
        let mut game = Game::new();
        let first = Table::from_tag(Tag::new("ScoreTable", "a"), vec![vec!["1".into()]]);
        let second = Table::from_tag(Tag::new("ScoreTable", "b"), vec![]);
        assert!(game.insert_table(first.clone()).is_none());
        assert_eq!(game.insert_table(second), Some(first));
        assert_eq!(game.table("ScoreTable").unwrap().column_description, "b");
    }

    #[test]
    fn test_accessors_iterate_in_name_order() {
        let mut game = Game::new();
        game.insert_tag(Tag::new("Site", "b"));
        game.insert_tag(Tag::new("Event", "a"));
        game.insert_table(Table::from_tag(Tag::new("ScoreTable", ""), vec![]));
        let names: Vec<&str> = game.tags().map(|tag| tag.name.as_str()).collect();
        assert_eq!(names, ["Event", "Site"]);
        assert_eq!(game.tables().count(), 1);

        let document = Document::new(vec![game.clone(), Game::new()]);
        assert_eq!(document.games().len(), 2);
        assert_eq!(document.games()[0], game);
    }

    #[test]
    fn test_table_rows() {
        let table = Table::from_tag(
            Tag::new("TestTable", "x;y"),
            vec![vec!["x".into(), "y".into()]],
        );
        let rows: Vec<&[String]> = table.rows().collect();
        assert_eq!(rows, vec![&["x".to_string(), "y".to_string()][..]]);
    }
}
