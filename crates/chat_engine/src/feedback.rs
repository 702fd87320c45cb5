use chat_logging::chat_debug;

use crate::http::{ensure_success, map_reqwest_error, ServiceSettings, FEEDBACK_PATH, METRICS_PATH};
use crate::{FailureKind, FeedbackSubmission, ServiceError};

/// Remote feedback-ingestion service.
#[async_trait::async_trait]
pub trait FeedbackService: Send + Sync {
    /// The response body is not interpreted beyond its status.
    async fn submit(&self, submission: &FeedbackSubmission) -> Result<(), ServiceError>;

    /// Accuracy metrics aggregated over the last `days` days.
    async fn metrics(&self, days: u32) -> Result<serde_json::Value, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFeedbackService {
    settings: ServiceSettings,
    client: reqwest::Client,
}

impl ReqwestFeedbackService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let client = settings.build_client()?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl FeedbackService for ReqwestFeedbackService {
    async fn submit(&self, submission: &FeedbackSubmission) -> Result<(), ServiceError> {
        let url = self.settings.endpoint(FEEDBACK_PATH)?;
        chat_debug!(
            "POST {} message_id={} is_correct={}",
            url,
            submission.message_id,
            submission.is_correct
        );

        let response = self
            .client
            .post(url)
            .json(submission)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(&response)?;

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if serde_json::from_slice::<serde_json::Value>(&body).is_err() {
            chat_debug!("feedback service acknowledged with a non-JSON body");
        }
        Ok(())
    }

    async fn metrics(&self, days: u32) -> Result<serde_json::Value, ServiceError> {
        let mut url = self.settings.endpoint(METRICS_PATH)?;
        url.query_pairs_mut().append_pair("days", &days.to_string());
        chat_debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(&response)?;

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))
    }
}
