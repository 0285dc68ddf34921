use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Initial configuration for a [`crate::RequestConfig`]. Every field is optional.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestOptions {
    /// Absolute request target (falls back to the host location)
    pub url: Option<String>,
    /// HTTP verb, any case (falls back to `POST`)
    pub method: Option<String>,
    pub debug: Option<bool>,
    /// Query parameters for GET, JSON payload otherwise
    pub body: Option<Value>,
    /// Declared request format, informational only (falls back to `JSON`)
    pub type_send: Option<String>,
    /// Response format (falls back to `JSON`)
    pub type_receive: Option<String>,
    /// Echo the request body into the response (falls back to `true`)
    pub add_body: Option<bool>,
}
