use crate::error::Result;
use crate::model::{Lyrics, NewSong, Page, Song, SongFilter, SongId, SongUpdate};

/// The storage capability set for songs and their verses.
///
/// [`crate::schema::Database`] is the SQLite implementation. Every method is a
/// blocking call; isolation beyond a single statement is only provided where
/// noted.
pub trait Storage {
    /// Insert a song and its verses as one atomic unit. Verses are numbered
    /// from 1 in slice order. Nothing is written if any statement fails.
    fn add_song(&self, song: &NewSong, verses: &[String]) -> Result<SongId>;

    fn get_song(&self, id: SongId) -> Result<Song>;

    fn delete_song(&self, id: SongId) -> Result<()>;

    /// Apply a sparse patch. Song-level fields are written in one statement,
    /// then each verse in its own statement, with no transaction spanning
    /// them.
    fn update_song(&self, id: SongId, update: &SongUpdate) -> Result<()>;

    /// Verses of one song in verse order, windowed by `page`.
    fn get_lyrics(&self, id: SongId, page: Page) -> Result<Vec<Lyrics>>;

    /// Songs matching `filter`, ordered by id.
    fn get_all_songs(&self, filter: &SongFilter, page: Page) -> Result<Vec<Song>>;

    fn get_all_song_lyrics(&self, id: SongId) -> Result<Vec<Lyrics>>;
}
