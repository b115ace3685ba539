use thiserror::Error;

/// Store failures surfaced to callers of [`Store::get`](crate::store::Store::get).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid store key '{0}'")]
    InvalidKey(String),

    #[error("store unavailable after {attempts} reconnect attempts: {reason}")]
    Connection { attempts: u32, reason: String },

    #[error("store error: {0}")]
    Backend(String),
}
