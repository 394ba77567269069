//! Purpose: HTTP plumbing shared by the typed sibling-service clients.
//! Exports: `ServiceClient`, `ServiceConfig`, `ApiResult`.
//! Role: Turns REST calls into this crate's `Error` taxonomy.
//! Invariants: Sibling error payloads use the `{"error": {...}}` envelope;
//! anything else classifies by HTTP status.
//! Invariants: Transport failures are `Io`, undecodable successes are `Service`.

use crate::core::error::{Error, ErrorKind};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub type ApiResult<T> = Result<T, Error>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Addresses and credentials for the sibling services.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub profile_manager_url: String,
    pub task_manager_url: String,
    pub social_context_builder_url: String,
    pub timeout: Duration,
    pub token: Option<String>,
}

impl ServiceConfig {
    pub fn new(
        profile_manager_url: impl Into<String>,
        task_manager_url: impl Into<String>,
        social_context_builder_url: impl Into<String>,
    ) -> Self {
        Self {
            profile_manager_url: profile_manager_url.into(),
            task_manager_url: task_manager_url.into(),
            social_context_builder_url: social_context_builder_url.into(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Read the standard `SOCIUM_*` environment variables.
    pub fn from_env() -> ApiResult<Self> {
        let mut config = Self::new(
            require_env("SOCIUM_PROFILE_MANAGER_URL")?,
            require_env("SOCIUM_TASK_MANAGER_URL")?,
            require_env("SOCIUM_SOCIAL_CONTEXT_BUILDER_URL")?,
        );
        if let Ok(secs) = std::env::var("SOCIUM_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                Error::new(ErrorKind::Usage)
                    .with_message("SOCIUM_HTTP_TIMEOUT_SECS must be a number of seconds")
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(token) = std::env::var("SOCIUM_SERVICE_TOKEN") {
            config.token = Some(token);
        }
        Ok(config)
    }
}

fn require_env(name: &str) -> ApiResult<String> {
    std::env::var(name).map_err(|_| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("{name} is not set"))
            .with_hint("Set the sibling service addresses before building a registry.")
    })
}

/// One service endpoint: a shared HTTP client, a base URL, optional bearer token.
#[derive(Clone)]
pub struct ServiceClient {
    inner: Arc<ServiceClientInner>,
}

struct ServiceClientInner {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl ServiceClient {
    /// Stand-alone client with its own connection pool and default timeout.
    pub fn connect(base_url: impl AsRef<str>) -> ApiResult<Self> {
        Self::with_http(Client::new(), base_url.as_ref(), None)
    }

    pub(crate) fn with_http(http: Client, base_url: &str, token: Option<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self {
            inner: Arc::new(ServiceClientInner {
                http,
                base_url,
                token,
            }),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.token = Some(token.into());
        } else {
            self.inner = Arc::new(ServiceClientInner {
                http: self.inner.http.clone(),
                base_url: self.inner.base_url.clone(),
                token: Some(token.into()),
            });
        }
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub(crate) async fn get_json<R>(&self, segments: &[&str]) -> ApiResult<R>
    where
        R: DeserializeOwned,
    {
        let response = self.send::<()>(Method::GET, segments, None).await?;
        decode_json(response).await
    }

    pub(crate) async fn post_json<T, R>(&self, segments: &[&str], body: &T) -> ApiResult<R>
    where
        T: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self.send(Method::POST, segments, Some(body)).await?;
        decode_json(response).await
    }

    pub(crate) async fn put_json<T, R>(&self, segments: &[&str], body: &T) -> ApiResult<R>
    where
        T: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self.send(Method::PUT, segments, Some(body)).await?;
        decode_json(response).await
    }

    pub(crate) async fn patch_json<T, R>(&self, segments: &[&str], body: &T) -> ApiResult<R>
    where
        T: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self.send(Method::PATCH, segments, Some(body)).await?;
        decode_json(response).await
    }

    /// POST where only the status matters; the response body is discarded.
    pub(crate) async fn post_accepted<T>(&self, segments: &[&str], body: &T) -> ApiResult<()>
    where
        T: Serialize + ?Sized + Sync,
    {
        self.send(Method::POST, segments, Some(body)).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, segments: &[&str]) -> ApiResult<()> {
        self.send::<()>(Method::DELETE, segments, None).await?;
        Ok(())
    }

    async fn send<T>(&self, method: Method, segments: &[&str], body: Option<&T>) -> ApiResult<Response>
    where
        T: Serialize + ?Sized + Sync,
    {
        let url = build_url(&self.inner.base_url, segments)?;
        debug!(%method, %url, "service request");
        let mut request = self.inner.http.request(method, url.clone());
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("request to {url} failed"))
                .with_source(err)
        })?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(error_from_response(response).await)
    }
}

async fn decode_json<R>(response: Response) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    response.json::<R>().await.map_err(|err| {
        Error::new(ErrorKind::Service)
            .with_message("failed to decode service response json")
            .with_source(err)
    })
}

async fn error_from_response(response: Response) -> Error {
    let status = response.status();
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => {
            let wire = envelope.error;
            let mut err = Error::new(kind_from_wire(&wire.kind, status));
            if let Some(message) = wire.message {
                err = err.with_message(message);
            }
            if let Some(field) = wire.field {
                err = err.with_field(field);
            }
            if let Some(hint) = wire.hint {
                err = err.with_hint(hint);
            }
            err
        }
        Err(decode) => {
            warn!(%status, "service error response was not an error envelope");
            Error::new(kind_from_status(status))
                .with_message(format!("service returned status {status}"))
                .with_source(decode)
        }
    }
}

#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    error: WireError,
}

#[derive(serde::Deserialize)]
struct WireError {
    kind: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

fn kind_from_wire(kind: &str, status: StatusCode) -> ErrorKind {
    match kind {
        "usage" => ErrorKind::Usage,
        "validation" => ErrorKind::Validation,
        "not_found" => ErrorKind::NotFound,
        "already_exists" => ErrorKind::AlreadyExists,
        "unauthorized" => ErrorKind::Unauthorized,
        "service" => ErrorKind::Service,
        "io" => ErrorKind::Io,
        "internal" => ErrorKind::Internal,
        _ => kind_from_status(status),
    }
}

fn kind_from_status(status: StatusCode) -> ErrorKind {
    match status.as_u16() {
        400 => ErrorKind::Validation,
        401 | 403 => ErrorKind::Unauthorized,
        404 => ErrorKind::NotFound,
        409 => ErrorKind::AlreadyExists,
        _ => ErrorKind::Service,
    }
}

fn normalize_base_url(raw: &str) -> ApiResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("'{raw}' is not a valid service base URL"))
            .with_source(err)
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("service base URLs must use http or https"));
    }
    if url.cannot_be_a_base() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("service base URLs must be able to carry paths"));
    }
    Ok(url)
}

fn build_url(base: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| Error::new(ErrorKind::Usage).with_message("service base URL has no path"))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}
