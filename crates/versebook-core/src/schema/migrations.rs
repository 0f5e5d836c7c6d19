/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Songs
CREATE TABLE IF NOT EXISTS songs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_name TEXT NOT NULL,
    name TEXT NOT NULL,
    link TEXT NOT NULL,
    release_date TEXT NOT NULL,
    inserted_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_songs_group_name ON songs(group_name);
CREATE INDEX IF NOT EXISTS idx_songs_name ON songs(name);

-- Lyrics, one row per verse
CREATE TABLE IF NOT EXISTS lyrics (
    song_id INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
    verse_number INTEGER NOT NULL CHECK (verse_number > 0),
    text TEXT NOT NULL,
    PRIMARY KEY (song_id, verse_number)
);
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "songs_and_lyrics",
    sql: MIGRATION_001,
}];
