use thiserror::Error;

#[derive(Debug, Error)]
pub enum FighterError {
    /// The status dictionary lacks a field the reward needs.
    #[error("status dictionary is missing required field `{field}`")]
    MissingTelemetry { field: &'static str },

    #[error("no decision rule matched the current snapshot")]
    NoRuleMatched,

    #[error("input channel {0} is out of range (expected 0..12)")]
    InvalidChannel(usize),

    #[error("step called before reset")]
    NotReset,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FighterError>;
