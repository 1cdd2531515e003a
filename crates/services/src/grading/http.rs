use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::config::ExamConfig;
use crate::error::GradingError;
use crate::grading::{Grader, GradingRequest, GradingResponse};

const SUBMIT_PATH: &str = "/api/exam/submit";

/// Grader reached over HTTP with a JSON body.
#[derive(Clone, Debug)]
pub struct HttpGrader {
    client: Client,
    url: String,
}

impl HttpGrader {
    #[must_use]
    pub fn new(client: Client, config: &ExamConfig) -> Self {
        Self {
            client,
            url: config.endpoint(SUBMIT_PATH),
        }
    }
}

#[async_trait]
impl Grader for HttpGrader {
    async fn grade(&self, request: &GradingRequest) -> Result<GradingResponse, GradingError> {
        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<GradingResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.error)
        {
            Some(message) => Err(GradingError::Rejected(message)),
            None => {
                warn!(%status, "grader failed without an error body");
                Err(GradingError::HttpStatus(status))
            }
        }
    }
}
