use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use versebook_core::model::{Page, SongId, SongUpdate};
use versebook_core::Database;

mod commands;
mod config;

use commands::songs::{parse_verse_assignment, AddSong, ListSongs};
use config::Config;

#[derive(Debug, Parser)]
#[command(name = "versebook", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/versebook/versebook.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Add a song together with its lyrics
    ///
    /// The song row and every verse are written in a single transaction:
    /// either all of them are stored or none are. Verses are numbered from 1
    /// in the order given; `--verse` values come first, followed by the
    /// blocks of `--lyrics-file` (verses separated by blank lines).
    ///
    /// Release dates accept YYYY-MM-DD, DD.MM.YYYY or RFC 3339.
    Add {
        #[arg(long)]
        group: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        link: String,
        #[arg(long)]
        release_date: String,
        /// Verse text (repeatable)
        #[arg(long = "verse")]
        verses: Vec<String>,
        /// File with the full lyrics, verses separated by blank lines
        #[arg(long)]
        lyrics_file: Option<PathBuf>,
    },
    /// Show a song and its lyrics
    Get {
        id: SongId,
        #[arg(long)]
        json: bool,
    },
    /// Delete a song (its verses go with it)
    Delete { id: SongId },
    /// Change some fields of a song
    ///
    /// Only the options given are changed. Verse replacements use N=TEXT and
    /// may be repeated; they are applied one statement at a time after the
    /// song fields.
    Update {
        id: SongId,
        #[arg(long)]
        group: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        release_date: Option<String>,
        /// Verse replacement as N=TEXT (repeatable)
        #[arg(long = "verse", value_parser = parse_verse_assignment)]
        verses: Vec<(u32, String)>,
    },
    /// Show the verses of a song, optionally paginated
    Lyrics {
        id: SongId,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// List songs
    List {
        /// Group name contains (case-insensitive)
        #[arg(long)]
        group: Option<String>,
        /// Song name contains (case-insensitive)
        #[arg(long)]
        name: Option<String>,
        /// Link contains
        #[arg(long)]
        link: Option<String>,
        /// Released on or after this date
        #[arg(long)]
        released_after: Option<String>,
        /// Released on or before this date
        #[arg(long)]
        released_before: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file contents
    File,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it does not exist
    Init,
}

fn open_database(db_path: &Path) -> Result<Database> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    Database::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_with_db_path(cli.db)?;
    twyg::setup(config.logging.clone())
        .map_err(|e| anyhow::anyhow!("Failed to set up logging: {e}"))?;

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config),
            ConfigAction::File => commands::config::show_file(),
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config(),
        },
        command => {
            log::debug!("Using database {}", config.database_path.display());
            let db = open_database(&config.database_path)?;
            run(command, &db)
        }
    }
}

fn run(command: Commands, db: &Database) -> Result<()> {
    match command {
        Commands::Add {
            group,
            name,
            link,
            release_date,
            verses,
            lyrics_file,
        } => {
            commands::add_song(
                db,
                AddSong {
                    group,
                    name,
                    link,
                    release_date,
                    verses,
                    lyrics_file,
                },
            )?;
        }
        Commands::Get { id, json } => commands::show_song(db, id, json)?,
        Commands::Delete { id } => commands::delete_song(db, id)?,
        Commands::Update {
            id,
            group,
            name,
            link,
            release_date,
            verses,
        } => {
            let update = SongUpdate {
                group,
                name,
                link,
                release_date,
                verses: verses.into_iter().collect(),
            };
            commands::update_song(db, id, &update)?;
        }
        Commands::Lyrics { id, limit, offset } => {
            commands::show_lyrics(db, id, Page { limit, offset })?;
        }
        Commands::List {
            group,
            name,
            link,
            released_after,
            released_before,
            limit,
            offset,
            json,
        } => {
            commands::list_songs(
                db,
                ListSongs {
                    group,
                    name,
                    link,
                    released_after,
                    released_before,
                    limit,
                    offset,
                },
                json,
            )?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
