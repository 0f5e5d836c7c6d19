use anyhow::{Context, Result};
use std::path::PathBuf;
use versebook_core::model::{
    parse_release_date, split_verses, Lyrics, NewSong, Page, Song, SongFilter, SongId, SongUpdate,
};
use versebook_core::Storage;

/// Fields for a new song as given on the command line.
#[derive(Debug, Clone)]
pub struct AddSong {
    pub group: String,
    pub name: String,
    pub link: String,
    pub release_date: String,
    pub verses: Vec<String>,
    pub lyrics_file: Option<PathBuf>,
}

/// Filters and paging for `list`.
#[derive(Debug, Clone, Default)]
pub struct ListSongs {
    pub group: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,
    pub released_after: Option<String>,
    pub released_before: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Parse a `N=TEXT` verse replacement.
pub fn parse_verse_assignment(input: &str) -> std::result::Result<(u32, String), String> {
    let (number, text) = input
        .split_once('=')
        .ok_or_else(|| format!("expected N=TEXT, got {input:?}"))?;
    let number: u32 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid verse number: {:?}", number.trim()))?;
    if number == 0 {
        return Err(String::from("verse numbers start at 1"));
    }
    Ok((number, text.to_string()))
}

pub fn add_song(db: &impl Storage, args: AddSong) -> Result<SongId> {
    let release_date = parse_release_date(&args.release_date)?;

    let mut verses = args.verses;
    if let Some(path) = &args.lyrics_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lyrics from {}", path.display()))?;
        verses.extend(split_verses(&text));
    }

    let song = NewSong::new(args.group, args.name, args.link, release_date);
    let id = db.add_song(&song, &verses).context("Failed to add song")?;

    println!("✓ Added song {} with {} verses", id, verses.len());
    Ok(id)
}

pub fn show_song(db: &impl Storage, id: SongId, json: bool) -> Result<()> {
    let song = db.get_song(id)?;
    let lyrics = db.get_all_song_lyrics(id)?;

    if json {
        let value = serde_json::json!({ "song": song, "lyrics": lyrics });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_song(&song);
        if !lyrics.is_empty() {
            println!();
            print_lyrics(&lyrics);
        }
    }
    Ok(())
}

pub fn delete_song(db: &impl Storage, id: SongId) -> Result<()> {
    db.delete_song(id)?;
    println!("✓ Deleted song {}", id);
    Ok(())
}

pub fn update_song(db: &impl Storage, id: SongId, update: &SongUpdate) -> Result<()> {
    db.update_song(id, update)?;
    println!("✓ Updated song {}", id);
    Ok(())
}

pub fn show_lyrics(db: &impl Storage, id: SongId, page: Page) -> Result<()> {
    let lyrics = db.get_lyrics(id, page)?;
    if lyrics.is_empty() {
        println!("No verses in this range");
    } else {
        print_lyrics(&lyrics);
    }
    Ok(())
}

pub fn list_songs(db: &impl Storage, args: ListSongs, json: bool) -> Result<Vec<Song>> {
    let released_after = args
        .released_after
        .as_deref()
        .map(parse_release_date)
        .transpose()?;
    let released_before = args
        .released_before
        .as_deref()
        .map(parse_release_date)
        .transpose()?;

    let filter = SongFilter {
        group: args.group,
        name: args.name,
        link: args.link,
        released_after,
        released_before,
    };
    let page = Page {
        limit: args.limit,
        offset: args.offset,
    };

    let songs = db.get_all_songs(&filter, page)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&songs)?);
    } else if songs.is_empty() {
        println!("No songs found");
    } else {
        for song in &songs {
            print_song(song);
        }
    }
    Ok(songs)
}

fn print_song(song: &Song) {
    println!("#{}  {} - {}", song.id, song.group, song.name);
    println!("    link:     {}", song.link);
    println!("    released: {}", song.release_date.format("%Y-%m-%d"));
    println!("    added:    {}", song.inserted_at.format("%Y-%m-%d %H:%M:%S"));
}

fn print_lyrics(lyrics: &[Lyrics]) {
    for verse in lyrics {
        println!("[{}]", verse.verse_number);
        println!("{}", verse.text);
        println!();
    }
}
