use std::fmt::{self, Display};

/// Payload validation failures. All applicable rules are collected before the
/// payload is rejected, never just the first one hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("cooking time must be a number of at least one minute")]
    InvalidCookingTime,
    #[error("ingredient id must be a number")]
    InvalidIngredientId,
    #[error("ingredient amount must be a number greater than zero")]
    InvalidIngredientAmount,
    #[error("recipe ingredients must not repeat")]
    DuplicateIngredient,
    #[error("tag id must be a number")]
    InvalidTagId,
    #[error("tags must not repeat")]
    DuplicateTag,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("{0} doesn't exist")]
    NotFound(&'static str),
    #[error("{0}")]
    AlreadyExists(&'static str),
    #[error("{0}")]
    NotPresent(&'static str),
    #[error("{0}")]
    InvalidTarget(&'static str),
    #[error("operation is not permitted for this user")]
    Unauthorized,
    #[error("payload failed validation")]
    Validation(Vec<ValidationError>),
}

impl Error {
    /// Machine-readable key the transport layer puts in error bodies.
    pub fn error_key(&self) -> &'static str {
        match self {
            Error::Query(_) => "internal",
            Error::NotFound(_) => "not_found",
            Error::AlreadyExists(_) => "already_exists",
            Error::NotPresent(_) => "not_present",
            Error::InvalidTarget(_) => "invalid_target",
            Error::Unauthorized => "unauthorized",
            Error::Validation(_) => "validation",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Error::Query(_) => 500,
            Error::NotFound(_) => 404,
            Error::Unauthorized => 403,
            Error::AlreadyExists(_)
            | Error::NotPresent(_)
            | Error::InvalidTarget(_)
            | Error::Validation(_) => 400,
        }
    }
}

#[derive(Debug)]
pub struct TypeError {
    info: String,
}

impl TypeError {
    pub fn new(info: &str) -> Self {
        Self {
            info: info.to_string(),
        }
    }
}

impl Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.info)
    }
}

impl std::error::Error for TypeError {}
