//! Session construction errors
//!
//! Only raised before a session starts. `tick` never fails: rejected
//! gameplay effects surface as status messages instead.

/// Errors surfaced while building a session or loading tuning data.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown player class '{0}'")]
    UnknownClass(String),

    #[error("unknown difficulty '{0}' (expected normal, hard or insane)")]
    UnknownDifficulty(String),

    #[error("invalid tuning value for {field}: {reason}")]
    InvalidTuning {
        field: &'static str,
        reason: &'static str,
    },

    #[error("malformed tuning json: {0}")]
    TuningJson(#[from] serde_json::Error),
}
