use thiserror::Error;

/// Errors surfaced by `query_qs`.
///
/// Querystring decoding never fails: malformed fragments are dropped instead.
/// The only fatal path is decoding a JSON document.
#[derive(Error, Debug)]
pub enum Error {
    /// The input was not valid JSON text.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The input was valid JSON, but not a JSON object at the top level.
    #[error("invalid JSON: expected an object at the top level, found {0}")]
    NotAnObject(&'static str),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Generate an error with a custom message.
    pub fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns `true` when this error came from malformed or non-object JSON input.
    pub fn is_invalid_json(&self) -> bool {
        matches!(self, Error::InvalidJson(_) | Error::NotAnObject(_))
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
