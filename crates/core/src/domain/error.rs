// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid access code state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Code value {0} outside 1..=999")]
    CodeOutOfRange(i64),
}

pub type Result<T> = std::result::Result<T, DomainError>;
