use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sparse patch for a song.
///
/// `None` and empty strings both mean "leave unchanged". Verse replacements
/// are keyed by verse number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongUpdate {
    pub group: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,

    /// Release date as entered by the user; parsed when the update runs.
    pub release_date: Option<String>,

    #[serde(default)]
    pub verses: BTreeMap<u32, String>,
}

impl SongUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    #[must_use]
    pub fn with_release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = Some(release_date.into());
        self
    }

    #[must_use]
    pub fn with_verse(mut self, verse_number: u32, text: impl Into<String>) -> Self {
        self.verses.insert(verse_number, text.into());
        self
    }

    /// True when at least one song-level field carries a value.
    pub fn has_song_fields(&self) -> bool {
        [&self.group, &self.name, &self.link, &self.release_date]
            .into_iter()
            .any(|field| non_empty(field.as_deref()).is_some())
    }

    /// True when neither song-level fields nor verses are set.
    pub fn is_empty(&self) -> bool {
        !self.has_song_fields() && self.verses.is_empty()
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
