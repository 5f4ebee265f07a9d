//! Error type shared by the engine

use thiserror::Error;

use crate::descriptor::Fact;

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("a finite match needs at least one round")]
    InvalidLength,

    #[error("{rule} needs a known match length but the match length is unknown")]
    KnownLengthRequired { rule: String },

    #[error("{rule} read match fact `{fact}` without declaring it")]
    UndisclosedFact { rule: String, fact: Fact },

    #[error("round {round} is out of range for a history of {len} rounds")]
    RoundOutOfRange { round: usize, len: usize },

    #[error("{rule} is not permitted to manipulate its opponent")]
    ManipulationDenied { rule: String },

    #[error("match already completed after {rounds} rounds")]
    MatchFinished { rounds: usize },

    #[error("match was stopped after {rounds} rounds")]
    MatchStopped { rounds: usize },

    #[error("a match of unknown length must be driven round by round")]
    UnboundedMatch,

    #[error("match was aborted and cannot continue")]
    MatchAborted,

    #[error("invalid parameter for {rule}: {reason}")]
    InvalidParameter { rule: String, reason: String },

    #[error("invalid rule configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub(crate) fn invalid_parameter(rule: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }
}
