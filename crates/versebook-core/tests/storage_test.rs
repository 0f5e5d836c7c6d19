//! Integration tests for the SQLite store against on-disk databases.

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use versebook_core::model::{NewSong, Page, SongFilter, SongId, SongUpdate};
use versebook_core::{Database, Error, Storage};

fn verses(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| (*t).to_string()).collect()
}

fn song(group: &str, name: &str, year: i32) -> NewSong {
    NewSong::new(
        group,
        name,
        format!("https://example.com/{name}"),
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
    )
}

fn lyric_rows(db: &Database) -> Vec<(i64, u32, String)> {
    let mut stmt = db
        .conn()
        .prepare("SELECT song_id, verse_number, text FROM lyrics ORDER BY song_id, verse_number")
        .unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap()
}

/// Insert, read back, delete, read again.
#[test]
fn test_song_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path().join("test.db")).expect("Failed to open database");

    let released = Utc.with_ymd_and_hms(2006, 7, 16, 0, 0, 0).unwrap();
    let id = db
        .add_song(
            &NewSong::new("A", "B", "http://x", released),
            &verses(&["v1", "v2"]),
        )
        .unwrap();
    assert_eq!(id, SongId::new(1));

    assert_eq!(
        lyric_rows(&db),
        vec![(1, 1, "v1".to_string()), (1, 2, "v2".to_string())]
    );

    let stored = db.get_song(id).unwrap();
    assert_eq!(stored.group, "A");
    assert_eq!(stored.name, "B");
    assert_eq!(stored.link, "http://x");
    assert_eq!(stored.release_date, released);
    assert!(stored.inserted_at.timestamp() > 0);

    db.delete_song(id).unwrap();
    assert!(matches!(db.get_song(id), Err(Error::NotFound { .. })));
    assert!(lyric_rows(&db).is_empty(), "lyrics should cascade");
}

/// Data survives closing and reopening the file, and migrations are not
/// re-applied.
#[test]
fn test_reopen_database() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let id = {
        let db = Database::open(&db_path).unwrap();
        db.add_song(&song("Muse", "Uprising", 2009), &verses(&["one"]))
            .unwrap()
    };

    let db = Database::open(&db_path).unwrap();
    assert_eq!(db.get_song(id).unwrap().name, "Uprising");

    let migrations: i64 = db
        .conn()
        .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
        .unwrap();
    assert_eq!(migrations, 1);
}

/// Identifiers of deleted songs are never handed out again.
#[test]
fn test_ids_not_reused() {
    let db = Database::open_in_memory().unwrap();
    let first = db.add_song(&song("A", "one", 2000), &[]).unwrap();
    let second = db.add_song(&song("A", "two", 2000), &[]).unwrap();
    db.delete_song(second).unwrap();

    let third = db.add_song(&song("A", "three", 2000), &[]).unwrap();
    assert!(third > second);
    assert!(second > first);
}

#[test]
fn test_delete_missing_leaves_table_unchanged() {
    let db = Database::open_in_memory().unwrap();
    let id = db.add_song(&song("A", "kept", 2000), &verses(&["v"])).unwrap();

    let err = db.delete_song(SongId::new(404)).unwrap_err();
    assert!(err.is_not_found());
    assert!(db.delete_song(SongId::new(404)).unwrap_err().is_not_found());

    assert_eq!(db.get_song(id).unwrap().name, "kept");
    assert_eq!(lyric_rows(&db).len(), 1);
}

#[test]
fn test_update_song_and_verses() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .add_song(&song("A", "B", 2000), &verses(&["v1", "v2"]))
        .unwrap();

    let update = SongUpdate::new()
        .with_name("Renamed")
        .with_release_date("2001-02-03")
        .with_verse(1, "first")
        .with_verse(2, "second");
    db.update_song(id, &update).unwrap();

    let stored = db.get_song(id).unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.group, "A");
    assert_eq!(
        stored.release_date,
        Utc.with_ymd_and_hms(2001, 2, 3, 0, 0, 0).unwrap()
    );
    assert_eq!(
        lyric_rows(&db),
        vec![(1, 1, "first".to_string()), (1, 2, "second".to_string())]
    );
}

#[test]
fn test_update_with_bad_date_changes_nothing() {
    let db = Database::open_in_memory().unwrap();
    let id = db.add_song(&song("A", "B", 2000), &verses(&["v1"])).unwrap();

    let update = SongUpdate::new()
        .with_release_date("yesterday-ish")
        .with_verse(1, "changed");
    let err = db.update_song(id, &update).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(lyric_rows(&db)[0].2, "v1");
}

#[test]
fn test_get_all_songs_filters() {
    let db = Database::open_in_memory().unwrap();
    db.add_song(&song("Muse", "Hysteria", 2003), &[]).unwrap();
    db.add_song(&song("Muse", "Madness", 2012), &[]).unwrap();
    db.add_song(&song("Radiohead", "Creep", 1992), &[]).unwrap();

    let all = db.get_all_songs(&SongFilter::new(), Page::all()).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|pair| pair[0].id < pair[1].id));

    let muse = db
        .get_all_songs(&SongFilter::new().with_group("muse"), Page::all())
        .unwrap();
    assert_eq!(muse.len(), 2);

    let mad = db
        .get_all_songs(
            &SongFilter::new().with_group("Muse").with_name("mad"),
            Page::all(),
        )
        .unwrap();
    assert_eq!(mad.len(), 1);
    assert_eq!(mad[0].name, "Madness");

    let nineties = SongFilter::new().released_between(
        Some(Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap()),
        Some(Utc.with_ymd_and_hms(2003, 1, 1, 0, 0, 0).unwrap()),
    );
    let names: Vec<String> = db
        .get_all_songs(&nineties, Page::all())
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Hysteria", "Creep"]);
}

#[test]
fn test_get_all_songs_paginated() {
    let db = Database::open_in_memory().unwrap();
    for n in 0..5 {
        db.add_song(&song("G", &format!("song-{n}"), 2000), &[]).unwrap();
    }

    let page = db.get_all_songs(&SongFilter::new(), Page::new(2, 2)).unwrap();
    let names: Vec<&str> = page.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["song-2", "song-3"]);
}

#[test]
fn test_like_wildcards_are_literal() {
    let db = Database::open_in_memory().unwrap();
    db.add_song(&song("100% Pure", "a", 2000), &[]).unwrap();
    db.add_song(&song("1000 Pure", "b", 2000), &[]).unwrap();

    let found = db
        .get_all_songs(&SongFilter::new().with_group("100%"), Page::all())
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "a");
}
