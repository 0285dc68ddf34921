mod error;
mod logger;
mod multipart;
mod network_error;
mod receive_format;
mod received_data;
mod request_options;
mod utils;

use anyhow::anyhow;
use bytes::Bytes;
pub use error::{DeserializationError, FetchError, FetchResult, SerializationError};
pub use logger::{LogFacade, RequestLogger, LOG_TARGET};
use log::Level;
pub use network_error::NetworkError;
pub use receive_format::ReceiveFormat;
pub use received_data::{Blob, FormData, FormDataEntry, ReceivedData};
pub use request_options::RequestOptions;
pub use reqwest;
pub use reqwest::StatusCode;
use reqwest::{
    header::{CACHE_CONTROL, CONTENT_TYPE},
    Client, ClientBuilder, Method, Request, Response,
};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

pub const USER_AGENT: &'static str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
/// The `Content-Type` sent with every request, whatever `type_send` says.
pub const JSON_CONTENT_TYPE: &'static str = "application/json; charset=utf-8";

const DEFAULT_METHOD: &str = "POST";
const DEFAULT_FORMAT: &str = "JSON";

/// A single HTTP request, configured field by field and dispatched with [`RequestConfig::send`].
///
/// The configuration stays mutable between sends; each send reads the
/// fields as they are at call time.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    client: Client,
    logger: Arc<dyn RequestLogger>,
    url: String,
    method: String,
    debug: bool,
    type_send: String,
    type_receive: String,
    body: Option<Value>,
    add_body: bool,
}

impl RequestConfig {
    /// Creates a request from `options`, using `location` as the target when no url is given.
    ///
    /// Empty strings for `url`, `method`, `type_send` and `type_receive` are
    /// treated like absent ones and replaced by their defaults. This keeps
    /// option objects written for loose-truthiness callers working unchanged.
    ///
    /// # Example
    /// ```rust
    /// use request_data::{RequestConfig, RequestOptions};
    ///
    /// let config = RequestConfig::new(
    ///     RequestOptions {
    ///         method: Some("get".to_string()),
    ///         url: Some(String::new()),
    ///         ..Default::default()
    ///     },
    ///     "http://localhost/page",
    /// )
    /// .unwrap();
    ///
    /// assert_eq!("GET", config.method());
    /// assert_eq!("http://localhost/page", config.url());
    /// assert_eq!("JSON", config.type_receive());
    /// assert!(config.add_body());
    /// ```
    pub fn new(options: RequestOptions, location: &str) -> FetchResult<Self> {
        let client = ClientBuilder::default()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Unknown(anyhow!(e)))?;

        Ok(Self {
            client,
            logger: Arc::new(LogFacade),
            url: or_default(options.url, location),
            method: or_default(options.method, DEFAULT_METHOD).to_uppercase(),
            debug: options.debug.unwrap_or(false),
            type_send: or_default(options.type_send, DEFAULT_FORMAT).to_uppercase(),
            type_receive: or_default(options.type_receive, DEFAULT_FORMAT).to_uppercase(),
            body: options.body,
            add_body: options.add_body.unwrap_or(true),
        })
    }

    /// Replaces the diagnostic channel, which defaults to [`LogFacade`].
    pub fn with_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Blank or whitespace-only urls are ignored.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        if !url.trim().is_empty() {
            self.url = url;
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn set_method(&mut self, method: impl AsRef<str>) {
        if let Some(method) = upper_non_blank(method.as_ref()) {
            self.method = method;
        }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn type_send(&self) -> &str {
        &self.type_send
    }

    pub fn set_type_send(&mut self, type_send: impl AsRef<str>) {
        if let Some(type_send) = upper_non_blank(type_send.as_ref()) {
            self.type_send = type_send;
        }
    }

    pub fn type_receive(&self) -> &str {
        &self.type_receive
    }

    pub fn set_type_receive(&mut self, type_receive: impl AsRef<str>) {
        if let Some(type_receive) = upper_non_blank(type_receive.as_ref()) {
            self.type_receive = type_receive;
        }
    }

    /// The decoder `send` will use for the current `type_receive`.
    pub fn receive_format(&self) -> ReceiveFormat {
        ReceiveFormat::resolve(&self.type_receive)
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: impl Into<Option<Value>>) {
        self.body = body.into();
    }

    pub fn add_body(&self) -> bool {
        self.add_body
    }

    pub fn set_add_body(&mut self, add_body: bool) {
        self.add_body = add_body;
    }

    /// The url `send` dispatches to. For GET requests each key of the body is
    /// appended as a query parameter.
    pub fn build_url(&self) -> FetchResult<Url> {
        let mut url = Url::parse(&self.url).map_err(|source| FetchError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;

        if self.method.to_uppercase() == Method::GET.as_str() {
            if let Some(body) = self.body.as_ref().filter(|body| utils::is_present(body)) {
                utils::append_query_params(&mut url, body);
            }
        }

        Ok(url)
    }

    /// The request `send` dispatches, without sending it.
    ///
    /// Non-GET requests carry the JSON serialization of the body. A request
    /// without a body carries no payload.
    pub fn build_request(&self) -> FetchResult<Request> {
        self.request_for(self.build_url()?)
    }

    fn request_for(&self, url: Url) -> FetchResult<Request> {
        let method_name = self.method.to_uppercase();
        let method = Method::from_bytes(method_name.as_bytes())
            .map_err(|_| FetchError::InvalidMethod(method_name.clone()))?;

        let mut builder = self
            .client
            .request(method.clone(), url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(CACHE_CONTROL, "no-cache");

        if method != Method::GET {
            if let Some(body) = &self.body {
                let payload = serde_json::to_vec(body)
                    .map_err(|e| FetchError::SerializationError(SerializationError::Json(e)))?;
                builder = builder.body(payload);
            }
        }

        builder.build().map_err(|e| FetchError::Unknown(anyhow!(e)))
    }

    /// Sends the request as currently configured and decodes the response
    /// according to `type_receive`.
    ///
    /// Responses outside the 2xx range fail with [`FetchError::NetworkError`]
    /// without being decoded. A malformed url fails with
    /// [`FetchError::InvalidUrl`] before anything is logged or sent. Every
    /// later failure is logged at error level before it is returned. Nothing
    /// is retried.
    ///
    /// # Example
    /// ```rust
    /// use httpmock::prelude::*;
    /// use request_data::{RequestConfig, RequestOptions};
    /// use serde_json::json;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let server = MockServer::start();
    ///
    ///     server.mock(|when, then| {
    ///         when.method(POST).path("/items").json_body(json!({"name": "pen"}));
    ///         then.status(201).json_body(json!({"id": 1, "name": "pen"}));
    ///     });
    ///
    ///     let config = RequestConfig::new(
    ///         RequestOptions {
    ///             url: Some(server.url("/items")),
    ///             body: Some(json!({"name": "pen"})),
    ///             ..Default::default()
    ///         },
    ///         &server.base_url(),
    ///     )
    ///     .unwrap();
    ///
    ///     let data = config.send().await.unwrap();
    ///     assert_eq!(
    ///         Some(&json!({"id": 1, "name": "pen", "body": {"name": "pen"}})),
    ///         data.as_json()
    ///     );
    /// }
    /// ```
    pub async fn send(&self) -> FetchResult<ReceivedData> {
        let url = self.build_url()?;
        match self.dispatch(url).await {
            Ok(data) => Ok(data),
            Err(err) => {
                self.logger
                    .log(Level::Error, &format!("Error processing request: {err}"));
                Err(err)
            }
        }
    }

    async fn dispatch(&self, url: Url) -> FetchResult<ReceivedData> {
        let request = self.request_for(url)?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|err| FetchError::UnableToSendRequest { err })?;

        let response = self.check_response_and_return_err(response)?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|c_type| c_type.to_str().ok())
            .map(|s| s.to_owned());
        let raw_body = response
            .bytes()
            .await
            .map_err(|err| FetchError::UnableToReadBody { err })?;

        let data =
            self.deserialize_response(raw_body, content_type.as_deref(), self.receive_format())?;

        if self.debug {
            let sent = self
                .body
                .as_ref()
                .map_or_else(|| "undefined".to_string(), |body| body.to_string());
            self.logger
                .log(Level::Info, &format!("Request Body: {sent}"));
            self.logger
                .log(Level::Info, &format!("Response Data: {data}"));
        }

        if self.add_body {
            return Ok(data.with_body(self.body.as_ref()));
        }
        Ok(data)
    }

    fn check_response_and_return_err(&self, response: Response) -> FetchResult<Response> {
        if !response.status().is_success() {
            return Err(FetchError::NetworkError(NetworkError::new(&response)));
        }
        Ok(response)
    }

    fn deserialize_response(
        &self,
        raw_body: Bytes,
        content_type: Option<&str>,
        format: ReceiveFormat,
    ) -> FetchResult<ReceivedData> {
        match format {
            ReceiveFormat::Json => {
                let value = serde_json::from_slice::<Value>(strip_bom(&raw_body)).map_err(|e| {
                    FetchError::DeserializationError(DeserializationError::Json(e))
                })?;
                Ok(ReceivedData::Json(value))
            }
            ReceiveFormat::Text => Ok(ReceivedData::Text(
                String::from_utf8_lossy(strip_bom(&raw_body)).into_owned(),
            )),
            ReceiveFormat::FormData => Ok(ReceivedData::FormData(
                multipart::decode_form_data(content_type, &raw_body)?,
            )),
            ReceiveFormat::Blob => Ok(ReceivedData::Blob(Blob {
                content_type: content_type
                    .map(|c_type| c_type.to_ascii_lowercase())
                    .unwrap_or_default(),
                data: raw_body,
            })),
            ReceiveFormat::ArrayBuffer => Ok(ReceivedData::ArrayBuffer(raw_body)),
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn upper_non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    Some(value.to_uppercase())
}

fn strip_bom(raw_body: &[u8]) -> &[u8] {
    raw_body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw_body)
}
