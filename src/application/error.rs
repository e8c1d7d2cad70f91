use thiserror::Error;

use crate::{
    application::{accounts::AccountError, posts::PostError},
    config::LoadError,
    infra::error::InfraError,
    security::SecretKeyError,
};

/// Top-level failure of a CLI run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("secret key error: {0}")]
    SecretKey(#[from] SecretKeyError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Post(#[from] PostError),
    #[error("{message}")]
    Unexpected { message: String },
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }
}
