use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, Transaction};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::song::{check_storable, to_db_timestamp};
use crate::model::update::non_empty;
use crate::model::{Lyrics, NewSong, Page, Song, SongFilter, SongId, SongUpdate};
use crate::query::{song_update_query, verse_update_query};
use crate::storage::Storage;

use super::migrations::MIGRATIONS;

/// A SQLite connection implementing [`Storage`].
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Per-connection setting; the lyrics cascade depends on it.
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        register_casefold(&conn)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let applied: Vec<u32> = {
            let mut stmt = self
                .conn
                .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
            let versions = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            versions
        };

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.in_transaction(|tx| {
                    tx.execute_batch(migration.sql)?;
                    tx.execute(
                        "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                        params![migration.version, migration.name],
                    )?;
                    Ok(())
                })?;
            }
        }

        Ok(())
    }

    /// Run `work` inside a transaction.
    ///
    /// Commits when `work` succeeds and rolls back when it fails. If the
    /// rollback fails too, the returned [`Error::Rollback`] carries both
    /// errors.
    pub fn in_transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction()?;

        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(cause) => {
                log::warn!("Rolling back transaction: {cause}");
                match tx.rollback() {
                    Ok(()) => Err(cause),
                    Err(rollback) => Err(Error::Rollback {
                        rollback,
                        cause: Box::new(cause),
                    }),
                }
            }
        }
    }

    fn ensure_song_exists(&self, id: SongId) -> Result<()> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM songs WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        if exists {
            Ok(())
        } else {
            Err(Error::song_not_found(id))
        }
    }
}

// Row mapping
impl Database {
    fn row_to_song(row: &rusqlite::Row) -> rusqlite::Result<Song> {
        Ok(Song {
            id: row.get(0)?,
            group: row.get(1)?,
            name: row.get(2)?,
            link: row.get(3)?,
            release_date: Self::timestamp_column(row, 4)?,
            inserted_at: Self::timestamp_column(row, 5)?,
        })
    }

    fn row_to_lyrics(row: &rusqlite::Row) -> rusqlite::Result<Lyrics> {
        Ok(Lyrics {
            song_id: row.get(0)?,
            verse_number: row.get(1)?,
            text: row.get(2)?,
        })
    }

    fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
        let raw: String = row.get(idx)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
    }

    /// Translate "zero rows" into the entity-specific not-found error and
    /// pass everything else through.
    fn missing_as(err: rusqlite::Error, not_found: impl FnOnce() -> Error) -> Error {
        match err {
            rusqlite::Error::QueryReturnedNoRows => not_found(),
            other => Error::Database(other),
        }
    }
}

impl Storage for Database {
    fn add_song(&self, song: &NewSong, verses: &[String]) -> Result<SongId> {
        check_storable(&song.release_date)?;

        let id = self.in_transaction(|tx| {
            let id: SongId = tx.query_row(
                "INSERT INTO songs (group_name, name, link, release_date, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 RETURNING id",
                params![
                    song.group,
                    song.name,
                    song.link,
                    to_db_timestamp(&song.release_date),
                ],
                |row| row.get(0),
            )?;

            let mut stmt = tx.prepare_cached(
                "INSERT INTO lyrics (song_id, verse_number, text) VALUES (?1, ?2, ?3)",
            )?;
            for (verse_number, text) in (1_u32..).zip(verses) {
                stmt.execute(params![id, verse_number, text])?;
            }

            Ok(id)
        })?;

        log::debug!("Added song {} with {} verses", id, verses.len());
        Ok(id)
    }

    fn get_song(&self, id: SongId) -> Result<Song> {
        self.conn
            .query_row(
                "SELECT id, group_name, name, link, release_date, inserted_at
                 FROM songs
                 WHERE id = ?1",
                [id],
                Self::row_to_song,
            )
            .map_err(|err| Self::missing_as(err, || Error::song_not_found(id)))
    }

    fn delete_song(&self, id: SongId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM songs WHERE id = ?1", [id])?;

        if deleted == 0 {
            return Err(Error::song_not_found(id));
        }
        log::debug!("Deleted song {}", id);
        Ok(())
    }

    fn update_song(&self, id: SongId, update: &SongUpdate) -> Result<()> {
        match song_update_query(id, update) {
            Ok(query) => {
                if query.execute(&self.conn)? == 0 {
                    return Err(Error::song_not_found(id));
                }
            }
            Err(Error::EmptyUpdate) if !update.verses.is_empty() => {
                log::debug!("Song {}: no song-level fields, updating verses only", id);
            }
            Err(err) => return Err(err),
        }

        for (&verse_number, text) in &update.verses {
            if verse_update_query(id, verse_number, text).execute(&self.conn)? == 0 {
                return Err(Error::NotFound {
                    entity: "verse",
                    id: format!("{id}/{verse_number}"),
                });
            }
        }

        Ok(())
    }

    fn get_lyrics(&self, id: SongId, page: Page) -> Result<Vec<Lyrics>> {
        self.ensure_song_exists(id)?;

        let mut stmt = self.conn.prepare(
            "SELECT song_id, verse_number, text
             FROM lyrics
             WHERE song_id = ?1
             ORDER BY verse_number
             LIMIT ?2 OFFSET ?3",
        )?;

        let lyrics = stmt
            .query_map(
                params![id, page.sql_limit(), page.sql_offset()],
                Self::row_to_lyrics,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(lyrics)
    }

    fn get_all_songs(&self, filter: &SongFilter, page: Page) -> Result<Vec<Song>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        let text_filters = [
            ("group_name", &filter.group),
            ("name", &filter.name),
            ("link", &filter.link),
        ];
        for (column, value) in text_filters {
            if let Some(value) = non_empty(value.as_deref()) {
                let pattern = escape_like(&value.to_lowercase());
                values.push(Value::Text(format!("%{pattern}%")));
                conditions.push(format!(
                    "casefold({column}) LIKE ?{} ESCAPE '\\'",
                    values.len()
                ));
            }
        }
        if let Some(after) = &filter.released_after {
            check_storable(after)?;
            values.push(Value::Text(to_db_timestamp(after)));
            conditions.push(format!("release_date >= ?{}", values.len()));
        }
        if let Some(before) = &filter.released_before {
            check_storable(before)?;
            values.push(Value::Text(to_db_timestamp(before)));
            conditions.push(format!("release_date <= ?{}", values.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        values.push(Value::Integer(page.sql_limit()));
        values.push(Value::Integer(page.sql_offset()));
        let sql = format!(
            "SELECT id, group_name, name, link, release_date, inserted_at
             FROM songs{where_clause}
             ORDER BY id
             LIMIT ?{} OFFSET ?{}",
            values.len() - 1,
            values.len()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let songs = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_song)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(songs)
    }

    fn get_all_song_lyrics(&self, id: SongId) -> Result<Vec<Lyrics>> {
        self.get_lyrics(id, Page::all())
    }
}

/// `casefold(text)`: Unicode lowercase, since the built-in `LIKE` only folds
/// ASCII letters.
fn register_casefold(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| text.to_lowercase())),
    )?;
    Ok(())
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
