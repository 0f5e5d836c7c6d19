use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A rollback failed after the unit of work it was undoing had already
    /// failed. Both errors are kept.
    #[error("rollback failed: {rollback} (after: {cause})")]
    Rollback {
        #[source]
        rollback: rusqlite::Error,
        cause: Box<Error>,
    },

    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("no valid fields to update")]
    EmptyUpdate,

    #[error("invalid data: {0}")]
    Validation(String),
}

impl Error {
    /// Returns `true` when a lookup, update or delete matched zero rows.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for request-level problems that no retry would fix.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyUpdate | Self::Validation(_))
    }

    pub(crate) fn song_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "song",
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
