pub mod config;
pub mod songs;

pub use songs::{add_song, delete_song, list_songs, show_lyrics, show_song, update_song};
