#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("{method} {url} returned HTTP {status}")]
    HttpStatus {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("not authenticated; call login first")]
    NotAuthenticated,
    #[error("{field} value {value} out of range")]
    OutOfRange { field: &'static str, value: String },
}

impl ClientError {
    /// Raw response payload when the backend answered with an error status.
    pub fn http_response_body(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { body, .. } => Some(body),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
