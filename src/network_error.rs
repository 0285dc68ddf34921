use std::fmt;

use reqwest::StatusCode;
use url::Url;

/// A response that arrived with a status outside the 2xx range.
///
/// The body of such a response is never read.
#[derive(Debug, Clone)]
pub struct NetworkError {
    pub status: StatusCode,
    pub url: Url,
}

impl NetworkError {
    pub fn new(response: &reqwest::Response) -> Self {
        Self {
            status: response.status(),
            url: response.url().clone(),
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Network response was not OK. Status: {}",
            self.status.as_u16()
        )
    }
}

impl std::error::Error for NetworkError {}
