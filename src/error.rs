//! Crate-wide error taxonomy.
//!
//! Mirrors the error-handling shape used across the source this crate was
//! extracted from: one `thiserror`-derived enum, a `Result<T>` alias, and a
//! hand-rolled `Clone` impl (several variants wrap non-`Clone` sources).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The addressed feature is configured off. Mutation calls surface this;
    /// readers degrade to a documented safe default instead of propagating it.
    #[error("feature disabled: {0}")]
    Disabled(String),

    /// The router found no node caching any of the requested segments (or no
    /// nodes at all when none were requested).
    #[error("no candidate nodes for request: {0}")]
    NoCandidates(String),

    /// Candidates existed but none survived health/staleness filtering.
    #[error("no healthy nodes available: {0}")]
    NoHealthyNodes(String),

    /// A tier cannot admit a segment without exceeding its capacity.
    #[error("insufficient space in tier {tier}: need {needed} bytes, {available} available")]
    InsufficientSpace {
        tier: String,
        needed: u64,
        available: u64,
    },

    /// A segment is unknown to the addressed tier (or collection/entity is
    /// unknown to the addressed store).
    #[error("not found: {0}")]
    NotFound(String),

    /// A migration is already pending or running for this segment.
    #[error("migration already scheduled for segment {0}")]
    AlreadyScheduled(String),

    /// A migration (or other bounded operation) exceeded its deadline.
    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Clone for CoreError {
    fn clone(&self) -> Self {
        match self {
            CoreError::Disabled(s) => CoreError::Disabled(s.clone()),
            CoreError::NoCandidates(s) => CoreError::NoCandidates(s.clone()),
            CoreError::NoHealthyNodes(s) => CoreError::NoHealthyNodes(s.clone()),
            CoreError::InsufficientSpace {
                tier,
                needed,
                available,
            } => CoreError::InsufficientSpace {
                tier: tier.clone(),
                needed: *needed,
                available: *available,
            },
            CoreError::NotFound(s) => CoreError::NotFound(s.clone()),
            CoreError::AlreadyScheduled(s) => CoreError::AlreadyScheduled(s.clone()),
            CoreError::Timeout(s) => CoreError::Timeout(s.clone()),
            CoreError::InvalidArgument(s) => CoreError::InvalidArgument(s.clone()),
            CoreError::Configuration(s) => CoreError::Configuration(s.clone()),
            CoreError::NotImplemented(s) => CoreError::NotImplemented(s.clone()),
            CoreError::Internal(s) => CoreError::Internal(s.clone()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Configuration(e.to_string())
    }
}
