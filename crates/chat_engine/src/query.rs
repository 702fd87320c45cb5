use chat_logging::{chat_debug, chat_warn};

use crate::http::{ensure_success, map_reqwest_error, ServiceSettings, QUERY_PATH};
use crate::{FailureKind, QueryRequest, QueryResponse, ServiceError};

/// Remote question-answering service.
#[async_trait::async_trait]
pub trait QueryService: Send + Sync {
    async fn ask(&self, request: &QueryRequest) -> Result<QueryResponse, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestQueryService {
    settings: ServiceSettings,
    client: reqwest::Client,
}

impl ReqwestQueryService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let client = settings.build_client()?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl QueryService for ReqwestQueryService {
    async fn ask(&self, request: &QueryRequest) -> Result<QueryResponse, ServiceError> {
        let url = self.settings.endpoint(QUERY_PATH)?;
        chat_debug!(
            "POST {} query_len={} has_session={}",
            url,
            request.query.len(),
            request.session_id.is_some()
        );

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(&response)?;

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice::<QueryResponse>(&body).map_err(|err| {
            chat_warn!("query service returned a malformed body: {}", err);
            ServiceError::new(FailureKind::Decode, err.to_string())
        })
    }
}
