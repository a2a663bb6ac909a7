use crate::types::MemberId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LineageError>;

#[derive(Error, Debug)]
pub enum LineageError {
    #[error("Member key {key:?} is not a valid integer identifier")]
    InvalidMemberId { key: String },

    #[error("Member key {key:?} collides with an existing member {id}")]
    DuplicateMemberId { key: String, id: MemberId },

    #[error("Malformed event log: {0}")]
    MalformedDocument(String),

    #[error("Member not found in graph: {0}")]
    MemberNotFound(MemberId),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LineageError {
    pub fn malformed<E: std::fmt::Display>(e: E) -> Self {
        Self::MalformedDocument(e.to_string())
    }
}
