//! SQL construction for sparse song updates.
//!
//! Building is kept apart from execution so the generated text and the
//! positional parameter numbering can be checked without a database.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::error::{Error, Result};
use crate::model::song::{parse_release_date, to_db_timestamp};
use crate::model::update::non_empty;
use crate::model::{SongId, SongUpdate};

const SEPARATOR: &str = ", ";

/// Song columns a sparse update may assign, in assignment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongColumn {
    Group,
    Name,
    ReleaseDate,
    Link,
}

impl SongColumn {
    pub const ALL: [Self; 4] = [Self::Group, Self::Name, Self::ReleaseDate, Self::Link];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group_name",
            Self::Name => "name",
            Self::ReleaseDate => "release_date",
            Self::Link => "link",
        }
    }
}

/// A statement plus its positional parameters, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl UpdateQuery {
    /// Run the statement and return the number of affected rows.
    pub fn execute(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(&self.sql, params_from_iter(self.params.iter()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Empty,
    Assigning,
}

/// Accumulates `column = ?n` clauses for the `songs` table.
#[derive(Debug)]
pub struct SongUpdateBuilder {
    state: BuilderState,
    sql: String,
    params: Vec<Value>,
}

impl Default for SongUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SongUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: BuilderState::Empty,
            sql: String::from("UPDATE songs SET "),
            params: Vec::new(),
        }
    }

    /// Append an assignment for `column` unless `value` is missing or empty.
    pub fn assign(&mut self, column: SongColumn, value: Option<&str>) -> &mut Self {
        let Some(value) = non_empty(value) else {
            return self;
        };

        self.params.push(Value::Text(value.to_string()));
        self.sql.push_str(column.as_str());
        self.sql.push_str(" = ?");
        self.sql.push_str(&self.params.len().to_string());
        self.sql.push_str(SEPARATOR);
        self.state = BuilderState::Assigning;
        self
    }

    /// Number of assignments collected so far.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state == BuilderState::Empty
    }

    /// Close the statement with `WHERE id = ?n`, the id being the last
    /// parameter. Fails with [`Error::EmptyUpdate`] when nothing was assigned.
    pub fn finish(mut self, id: SongId) -> Result<UpdateQuery> {
        match self.state {
            BuilderState::Empty => Err(Error::EmptyUpdate),
            BuilderState::Assigning => {
                self.sql.truncate(self.sql.len() - SEPARATOR.len());
                self.params.push(Value::Integer(id.get()));
                self.sql.push_str(" WHERE id = ?");
                self.sql.push_str(&self.params.len().to_string());
                Ok(UpdateQuery {
                    sql: self.sql,
                    params: self.params,
                })
            }
        }
    }
}

/// Build the song-level statement for `update`.
///
/// The release date is parsed and normalised to its stored form first, so a
/// malformed date is a validation error rather than a bad row.
pub fn song_update_query(id: SongId, update: &SongUpdate) -> Result<UpdateQuery> {
    let release_date = non_empty(update.release_date.as_deref())
        .map(parse_release_date)
        .transpose()?
        .map(|ts| to_db_timestamp(&ts));

    let mut builder = SongUpdateBuilder::new();
    for column in SongColumn::ALL {
        let value = match column {
            SongColumn::Group => update.group.as_deref(),
            SongColumn::Name => update.name.as_deref(),
            SongColumn::ReleaseDate => release_date.as_deref(),
            SongColumn::Link => update.link.as_deref(),
        };
        builder.assign(column, value);
    }
    builder.finish(id)
}

/// Statement replacing the text of one verse.
pub fn verse_update_query(id: SongId, verse_number: u32, text: &str) -> UpdateQuery {
    UpdateQuery {
        sql: String::from(
            "UPDATE lyrics SET text = ?1 WHERE song_id = ?2 AND verse_number = ?3",
        ),
        params: vec![
            Value::Text(text.to_string()),
            Value::Integer(id.get()),
            Value::Integer(i64::from(verse_number)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_single_field() {
        let update = SongUpdate::new().with_group("X");
        let query = song_update_query(SongId::new(3), &update).unwrap();
        assert_eq!(query.sql, "UPDATE songs SET group_name = ?1 WHERE id = ?2");
        assert_eq!(query.params, vec![text("X"), Value::Integer(3)]);
    }

    #[test]
    fn test_fixed_column_order() {
        let update = SongUpdate::new()
            .with_link("http://x")
            .with_name("B")
            .with_group("A");
        let query = song_update_query(SongId::new(1), &update).unwrap();
        assert_eq!(
            query.sql,
            "UPDATE songs SET group_name = ?1, name = ?2, link = ?3 WHERE id = ?4"
        );
        assert_eq!(
            query.params,
            vec![text("A"), text("B"), text("http://x"), Value::Integer(1)]
        );
    }

    #[test]
    fn test_release_date_is_normalised() {
        let update = SongUpdate::new().with_release_date("16.07.2006");
        let query = song_update_query(SongId::new(5), &update).unwrap();
        assert_eq!(query.sql, "UPDATE songs SET release_date = ?1 WHERE id = ?2");
        assert_eq!(query.params[0], text("2006-07-16T00:00:00+00:00"));
    }

    #[test]
    fn test_bad_release_date() {
        let update = SongUpdate::new().with_release_date("someday");
        let err = song_update_query(SongId::new(5), &update).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let update = SongUpdate::new().with_group("").with_name("B");
        let query = song_update_query(SongId::new(2), &update).unwrap();
        assert_eq!(query.sql, "UPDATE songs SET name = ?1 WHERE id = ?2");
    }

    #[test]
    fn test_no_fields() {
        let update = SongUpdate::new().with_verse(1, "only a verse");
        let err = song_update_query(SongId::new(2), &update).unwrap_err();
        assert!(matches!(err, Error::EmptyUpdate));
    }

    #[test]
    fn test_builder_state() {
        let mut builder = SongUpdateBuilder::new();
        assert!(builder.is_empty());
        builder.assign(SongColumn::Name, None);
        builder.assign(SongColumn::Link, Some(""));
        assert!(builder.is_empty());
        builder.assign(SongColumn::Link, Some("http://y"));
        assert!(!builder.is_empty());
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_verse_update_query() {
        let query = verse_update_query(SongId::new(4), 2, "new text");
        assert_eq!(
            query.sql,
            "UPDATE lyrics SET text = ?1 WHERE song_id = ?2 AND verse_number = ?3"
        );
        assert_eq!(
            query.params,
            vec![text("new text"), Value::Integer(4), Value::Integer(2)]
        );
    }
}
