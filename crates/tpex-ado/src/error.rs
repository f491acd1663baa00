use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdoError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("permanent API failure ({status}): {message}")]
    Permanent { status: u16, message: String },

    #[error("request failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Response(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdoError {
    /// True for a permanent 404, i.e. the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdoError::Permanent { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, AdoError>;
