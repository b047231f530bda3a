//! A model provider for OpenAI-compatible chat completion APIs.
//!
//! Most hosted vendors (Gemini included) expose this API shape, so the
//! default configuration points at Gemini's compatible endpoint.

#[macro_use]
extern crate tracing;

mod config;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use concierge_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelReply, ModelRequest,
};
use mime::Mime;
use reqwest::{Client, Response, StatusCode, header};

pub use config::{OpenAIConfig, OpenAIConfigBuilder};
use proto::ChatCompletion;

/// Error type for [`OpenAIProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = match err.status() {
            Some(status) => kind_for_status(status),
            None if err.is_timeout() || err.is_connect() => {
                ErrorKind::Unavailable
            }
            None if err.is_decode() => ErrorKind::MalformedResponse,
            None => ErrorKind::Other,
        };
        Error::new(format!("{err}"), kind)
    }
}

fn kind_for_status(status: StatusCode) -> ErrorKind {
    if status == StatusCode::TOO_MANY_REQUESTS {
        ErrorKind::RateLimitExceeded
    } else if status.is_server_error() {
        ErrorKind::Unavailable
    } else {
        ErrorKind::Other
    }
}

/// OpenAI-compatible model provider.
#[derive(Clone, Debug)]
pub struct OpenAIProvider {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ModelProvider for OpenAIProvider {
    type Error = Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, Self::Error>> + Send + 'static
    {
        let openai_req = proto::create_request(req, &self.config);
        let resp_fut = self
            .client
            .post(format!("{}{}", self.config.base_url, "/chat/completions"))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::ACCEPT, "application/json")
            .timeout(self.config.timeout)
            .json(&openai_req)
            .send();

        async move {
            let resp = resp_fut.await.and_then(Response::error_for_status)?;

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned);
            let is_json = content_type
                .as_deref()
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.subtype() == mime::JSON)
                .unwrap_or(false);
            if !is_json {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::MalformedResponse,
                ));
            }

            let body = resp.text().await?;
            trace!("got a completion: {body}");
            let completion = serde_json::from_str::<ChatCompletion>(&body)
                .map_err(|err| {
                    Error::new(format!("{err}"), ErrorKind::MalformedResponse)
                })?;
            debug!(
                "completion {} decoded",
                completion.id.as_deref().unwrap_or("<no id>")
            );
            response::into_reply(completion)
        }
    }
}
