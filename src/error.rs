use thiserror::Error;

use crate::models::ElectionStatus;

#[derive(Error, Debug)]
pub enum ElectionError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Election {election_id} is {status}, expected {expected}")]
    WrongStatus {
        election_id: String,
        status: ElectionStatus,
        expected: &'static str,
    },

    #[error("Election {election_id} has no position {position_index}")]
    UnknownPosition { election_id: String, position_index: usize },

    #[error("Member {member_id} does not belong to organization {organization_id}")]
    NotAMember { member_id: String, organization_id: String },

    #[error("{nominee_id} is not nominated for position {position_index}")]
    NotNominated { nominee_id: String, position_index: usize },

    #[error("Member {voter_id} has already voted in election {election_id}")]
    AlreadyVoted { election_id: String, voter_id: String },

    #[error("Election {election_id} has {count} vote(s) for members who were never nominated")]
    DanglingVotes { election_id: String, count: usize },

    #[error("Invalid voting window: ends at {ends_at} which is not after {starts_at}")]
    InvalidWindow { starts_at: String, ends_at: String },

    #[error("Unknown election status: {0}")]
    UnknownStatus(String),

    #[error("Failed to parse {field}: {source}")]
    Timestamp {
        field: &'static str,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid configuration for {key}: {message}")]
    Config { key: &'static str, message: String },
}

impl ElectionError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        ElectionError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
