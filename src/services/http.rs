use reqwest::{Client, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{what} not found")]
    NotFound { what: String },
    #[error("{service} returned HTTP {status} for {url}: {body}")]
    Http {
        service: &'static str,
        status: u16,
        url: String,
        body: String,
    },
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid response from {service}: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound { what: what.into() }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ServiceError::NotFound { .. } => true,
            ServiceError::Http { status, .. } => *status == 404,
            _ => false,
        }
    }
}

pub(crate) fn build_client(service: &'static str) -> Result<Client, ServiceError> {
    Client::builder()
        .user_agent(concat!("dor-admin/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| ServiceError::Transport { service, source })
}

/// Join a base URL and a relative path with exactly one slash between them
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Send a request, turning transport failures and non-2xx answers into errors
pub(crate) async fn send(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<Response, ServiceError> {
    let response = request
        .send()
        .await
        .map_err(|source| ServiceError::Transport { service, source })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(service, status = status.as_u16(), %url, "service returned an error status");
    Err(ServiceError::Http {
        service,
        status: status.as_u16(),
        url,
        body: body.trim().to_string(),
    })
}

pub(crate) async fn read_text(service: &'static str, response: Response) -> Result<String, ServiceError> {
    response
        .text()
        .await
        .map_err(|source| ServiceError::Transport { service, source })
}

pub(crate) fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub(crate) fn xml_unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
