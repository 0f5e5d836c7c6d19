use serde::{Deserialize, Serialize};

use crate::model::ids::SongId;

/// One numbered verse of a song.
///
/// Verse numbers start at 1 and define display order within the song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lyrics {
    pub song_id: SongId,
    pub verse_number: u32,
    pub text: String,
}

/// Split free-form lyrics into verses on blank lines.
///
/// Each block is trimmed; blocks that end up empty are dropped.
pub fn split_verses(text: &str) -> Vec<String> {
    let mut verses = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                verses.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        verses.push(current.join("\n"));
    }

    verses
        .into_iter()
        .map(|verse| verse.trim().to_string())
        .filter(|verse| !verse.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_verses() {
        let text = "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?\n\n\
                    You caught me under false pretenses\nHow long before you let me go?\n";
        let verses = split_verses(text);
        assert_eq!(verses.len(), 2);
        assert_eq!(
            verses[0],
            "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?"
        );
        assert!(verses[1].starts_with("You caught me"));
    }

    #[test]
    fn test_split_verses_collapses_blank_runs() {
        let verses = split_verses("\n\n  one  \n\n\n   \ntwo\r\n\r\nthree");
        assert_eq!(verses, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_split_verses_empty() {
        assert!(split_verses("").is_empty());
        assert!(split_verses("\n   \n").is_empty());
    }
}
