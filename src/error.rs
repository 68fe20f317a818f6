use thiserror::Error;

use crate::model::work_item::Status;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("ticket {0} is not on the board")]
    NotFound(String),

    #[error("{actor} may not move ticket {item}: not an admin and not the assignee")]
    PermissionDenied { actor: String, item: String },

    #[error("cannot move ticket {item} to {status}: {source}")]
    MoveFailed {
        item: String,
        status: Status,
        #[source]
        source: anyhow::Error,
    },

    #[error("not signed in: {0}")]
    Unauthenticated(String),

    #[error(transparent)]
    Remote(#[from] anyhow::Error),
}

impl BoardError {
    /// Failures that came back from the backend, as opposed to local rejections.
    pub fn is_remote(&self) -> bool {
        matches!(self, BoardError::Remote(_) | BoardError::MoveFailed { .. })
    }
}
