use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettleError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Group not found: {0}")]
    GroupNotFound(String),
    #[error("Member {member} is not part of group {group}")]
    NotAMember { group: String, member: String },
}

pub type Result<T> = std::result::Result<T, SettleError>;
