use thiserror::Error;

/// Failures of the undo/redo list.
///
/// These signal a caller that skipped the `can_undo`/`can_redo` check; the list
/// is left exactly as it was when one is returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("no previous state to undo to")]
    NoPreviousState,

    #[error("no next state to redo to")]
    NoNextState,
}

/// Failures of a per-sticker regret manager.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegretError {
    #[error("previous typeface is required, set it with `set_previous_typeface` first")]
    MissingTypefaceBaseline,
}

/// Errors that can occur while loading an editor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors produced while reading or laying out background templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template {id} has invalid dimensions")]
    InvalidDimensions { id: u32 },

    #[error("invalid template catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type HistoryResult<T> = Result<T, HistoryError>;
pub type RegretResult<T> = Result<T, RegretError>;
