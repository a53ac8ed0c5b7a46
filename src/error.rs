use thiserror::Error;

#[derive(Error, Debug)]
pub enum FairError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Poll not found: {0}")]
    PollNotFound(String),

    #[error("A ballot was already cast by {0} for this poll")]
    DuplicateBallot(String),

    #[error("Invalid poll configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid vote: {0}")]
    InvalidVote(String),

    #[error("Unknown voting mode: {0}")]
    UnknownVotingMode(String),
}
