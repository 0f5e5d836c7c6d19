pub mod filter;
pub mod ids;
pub mod lyrics;
pub mod song;
pub mod update;

pub use filter::{Page, SongFilter};
pub use ids::SongId;
pub use lyrics::{split_verses, Lyrics};
pub use song::{check_storable, parse_release_date, NewSong, Song};
pub use update::SongUpdate;
