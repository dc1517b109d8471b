//! Engine error taxonomy.

use crate::logic::Ineligible;
use crate::models::{GroupId, PlayerId, TournamentId};
use crate::store::StoreError;
use thiserror::Error;

/// Broad class of an [`EngineError`], deciding how a caller should react.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// User-correctable; do not retry.
    Eligibility,
    /// Request refers to something that does not exist.
    NotFound,
    /// Request is valid but not allowed in the current state.
    Rejected,
    /// Write contention outlasted the retry budget; safe to retry later.
    Conflict,
    /// Collections disagree with each other.
    Integrity,
    /// Store unreachable or failing.
    Infra,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Ineligible(#[from] Ineligible),
    #[error("gave up after {attempts} conflicting writes to {key}")]
    Conflict { key: String, attempts: u32 },
    #[error("integrity violation: {0}")]
    Integrity(String),
    #[error(transparent)]
    Store(StoreError),
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),
    #[error("group {group_id} of tournament {tournament_id} not found")]
    GroupNotFound {
        tournament_id: TournamentId,
        group_id: GroupId,
    },
    #[error("player has not entered tournament {0}")]
    NotEntered(TournamentId),
    #[error("tournament {0} not finished")]
    NotCompleted(TournamentId),
    #[error("reward for tournament {0} already claimed")]
    AlreadyClaimed(TournamentId),
    #[error("country {0} is not on the leaderboards")]
    CountryNotFound(String),
    #[error("username must contain at least {min} characters")]
    InvalidUsername { min: usize },
    #[error("invalid country code {0:?}")]
    InvalidCountry(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { key } => EngineError::Conflict { key, attempts: 1 },
            other => EngineError::Store(other),
        }
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Ineligible(_) => ErrorKind::Eligibility,
            EngineError::Conflict { .. } => ErrorKind::Conflict,
            EngineError::Integrity(_) => ErrorKind::Integrity,
            EngineError::Store(_) => ErrorKind::Infra,
            EngineError::PlayerNotFound(_)
            | EngineError::TournamentNotFound(_)
            | EngineError::GroupNotFound { .. }
            | EngineError::NotEntered(_)
            | EngineError::CountryNotFound(_) => ErrorKind::NotFound,
            EngineError::NotCompleted(_)
            | EngineError::AlreadyClaimed(_)
            | EngineError::InvalidUsername { .. }
            | EngineError::InvalidCountry(_) => ErrorKind::Rejected,
        }
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Conflict | ErrorKind::Infra)
    }
}
