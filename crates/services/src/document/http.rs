use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::config::ExamConfig;
use crate::error::ParserError;
use crate::document::{DocumentUpload, ParseResponse};

const UPLOAD_PATH: &str = "/api/exam/upload";

/// External service turning a Word document into questions.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Parse one uploaded document.
    ///
    /// # Errors
    ///
    /// Returns `ParserError` if the service is unreachable or rejects the file.
    async fn parse(&self, upload: &DocumentUpload) -> Result<ParseResponse, ParserError>;
}

/// Document parser reached over HTTP as a multipart upload.
#[derive(Clone, Debug)]
pub struct HttpDocumentParser {
    client: Client,
    url: String,
}

impl HttpDocumentParser {
    #[must_use]
    pub fn new(client: Client, config: &ExamConfig) -> Self {
        Self {
            client,
            url: config.endpoint(UPLOAD_PATH),
        }
    }
}

#[async_trait]
impl DocumentParser for HttpDocumentParser {
    async fn parse(&self, upload: &DocumentUpload) -> Result<ParseResponse, ParserError> {
        debug!(file = %upload.name, bytes = upload.bytes.len(), "uploading document");
        let part = Part::bytes(upload.bytes.clone()).file_name(upload.name.as_str().to_owned());
        let form = Form::new().part("file", part);

        let response = self.client.post(&self.url).multipart(form).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Error bodies still carry `{"error": "..."}` when the service produced them.
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ParseResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.error)
        {
            Some(message) => Err(ParserError::Rejected(message)),
            None => {
                warn!(%status, "document parser failed without an error body");
                Err(ParserError::HttpStatus(status))
            }
        }
    }
}
