use std::time::Duration;

use url::Url;

use crate::{FailureKind, ServiceError};

pub(crate) const QUERY_PATH: &str = "/api/rag/query";
pub(crate) const FEEDBACK_PATH: &str = "/api/feedback/";
pub(crate) const METRICS_PATH: &str = "/api/feedback/metrics";

/// Location of the backend services. No request timeout is applied.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub connect_timeout: Option<Duration>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: None,
        }
    }
}

impl ServiceSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// `{base_url}{path}`, keeping any path prefix of the base url.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        let joined = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, ServiceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))
    }
}

/// Fails with `HttpStatus` for any non-2xx response.
pub(crate) fn ensure_success(response: &reqwest::Response) -> Result<(), ServiceError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ServiceError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ServiceError::new(FailureKind::Decode, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let settings = ServiceSettings::with_base_url("https://example.com/chat/");
        assert_eq!(
            settings.endpoint(QUERY_PATH).unwrap().as_str(),
            "https://example.com/chat/api/rag/query"
        );
    }

    #[test]
    fn endpoint_rejects_invalid_base() {
        let settings = ServiceSettings::with_base_url("not a url");
        let err = settings.endpoint(FEEDBACK_PATH).unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
