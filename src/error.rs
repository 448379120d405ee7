use thiserror::Error;

pub type Result<T> = std::result::Result<T, SentinelError>;

#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Rule '{rule_id}' is already registered")]
    DuplicateRule { rule_id: String },

    #[error("Invalid rule '{rule_id}': {message}")]
    InvalidRule { rule_id: String, message: String },

    #[error("Scan failed: {0}")]
    Scan(#[from] crate::scanner::ScanError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SentinelError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
