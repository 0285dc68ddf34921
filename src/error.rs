use thiserror::Error;

use crate::NetworkError;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid http method `{0}`")]
    InvalidMethod(String),
    #[error(transparent)]
    NetworkError(NetworkError),
    #[error("unable to send request: {err}")]
    UnableToSendRequest { err: reqwest::Error },
    #[error("unable to read response body: {err}")]
    UnableToReadBody { err: reqwest::Error },
    #[error(transparent)]
    SerializationError(SerializationError),
    #[error(transparent)]
    DeserializationError(DeserializationError),
    #[error(transparent)]
    Unknown(anyhow::Error),
}

impl FetchError {
    /// The HTTP status of a non-successful response, if this error carries one.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            FetchError::NetworkError(err) => Some(err.status),
            FetchError::UnableToSendRequest { err } | FetchError::UnableToReadBody { err } => {
                err.status()
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("unable to serialize request body as json: {0}")]
    Json(serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DeserializationError {
    #[error("unable to parse response body as json: {0}")]
    Json(serde_json::Error),
    #[error("unable to parse urlencoded form data: {0}")]
    UrlEncoded(serde_urlencoded::de::Error),
    #[error("unable to parse form data: {0}")]
    FormData(String),
}
