use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Criteria for listing songs. Text fields match case-insensitive substrings;
/// unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongFilter {
    pub group: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,

    /// Inclusive lower bound on the release date.
    pub released_after: Option<DateTime<Utc>>,

    /// Inclusive upper bound on the release date.
    pub released_before: Option<DateTime<Utc>>,
}

impl SongFilter {
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
    pub fn released_between(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        self.released_after = after;
        self.released_before = before;
        self
    }
}

/// Limit/offset window over an ordered result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Maximum number of rows; `None` returns everything after `offset`.
    pub limit: Option<u32>,
    pub offset: u32,
}

impl Page {
    #[must_use]
    pub const fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self {
            limit: None,
            offset: 0,
        }
    }

    /// SQLite treats a negative LIMIT as "no limit".
    pub(crate) fn sql_limit(self) -> i64 {
        self.limit.map_or(-1, i64::from)
    }

    pub(crate) fn sql_offset(self) -> i64 {
        i64::from(self.offset)
    }
}
