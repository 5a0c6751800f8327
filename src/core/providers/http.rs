//! HTTP transport implementation
//!
//! Posts both files as `multipart/form-data` to the analyze endpoint. File
//! contents are streamed from disk rather than buffered.

use crate::core::constants::wire;
use crate::core::transport::{AuditError, AuditTransport};
use crate::models::audit::{AuditRequest, AuditResponse, SelectedFile};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Audit server reached over HTTP
pub struct HttpTransport {
    client: Client,
    url: String,
    timeout: u64,
}

impl HttpTransport {
    /// Create a new HTTP transport
    ///
    /// # Arguments
    ///
    /// * `url` - Full URL of the analyze endpoint
    /// * `timeout` - Request timeout in seconds
    pub fn new(url: String, timeout: u64) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    /// Open a selected file as a streamed multipart part
    async fn file_part(file: &SelectedFile) -> Result<Part, AuditError> {
        let handle = tokio::fs::File::open(file.path()).await.map_err(|e| {
            AuditError::NetworkFailure(format!("Failed to open {}: {}", file.path.display(), e))
        })?;
        let length = handle
            .metadata()
            .await
            .map_err(|e| {
                AuditError::NetworkFailure(format!(
                    "Failed to read {}: {}",
                    file.path.display(),
                    e
                ))
            })?
            .len();

        let body = reqwest::Body::wrap_stream(ReaderStream::new(handle));
        Part::stream_with_length(body, length)
            .file_name(file.name.clone())
            .mime_str(wire::JSON_MIME)
            .map_err(|e| AuditError::NetworkFailure(e.to_string()))
    }

    async fn build_form(request: &AuditRequest) -> Result<Form, AuditError> {
        let mut form = Form::new();
        for (slot, file) in request.parts() {
            form = form.part(slot.field_name(), Self::file_part(file).await?);
        }
        Ok(form)
    }

    fn describe_send_error(&self, error: reqwest::Error) -> AuditError {
        if error.is_timeout() {
            AuditError::NetworkFailure(format!("request timed out after {}s", self.timeout))
        } else if error.is_connect() {
            AuditError::NetworkFailure(format!("could not connect to {}: {}", self.url, error))
        } else {
            AuditError::NetworkFailure(error.to_string())
        }
    }
}

#[async_trait]
impl AuditTransport for HttpTransport {
    async fn analyze(&self, request: &AuditRequest) -> Result<AuditResponse, AuditError> {
        let form = Self::build_form(request).await?;

        debug!(
            "POST {} chat_file={} context_file={}",
            self.url, request.chat_file.name, request.context_file.name
        );

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.describe_send_error(e))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Audit server returned {}", status);

            return Err(AuditError::ServerError {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.describe_send_error(e))?;

        AuditResponse::from_json(&body)
    }

    fn transport_name(&self) -> &str {
        "HTTP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Multipart, State},
        http::StatusCode,
        response::IntoResponse,
        routing::post,
    };
    use serde_json::json;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;
    use tokio::sync::Mutex;

    /// (field name, file name, content type, bytes) of each received part
    type Received = Arc<Mutex<Vec<(String, String, String, Vec<u8>)>>>;

    async fn record_parts(received: &Received, mut multipart: Multipart) {
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap().to_vec();
            received
                .lock()
                .await
                .push((name, file_name, content_type, bytes));
        }
    }

    async fn scored(State(received): State<Received>, multipart: Multipart) -> impl IntoResponse {
        record_parts(&received, multipart).await;
        Json(json!({
            "status": "success",
            "scores": {
                "relevance": {"score": "80", "reason": "Answered the question"},
                "faithfulness": {"score": 70, "reason": "One unsupported claim"}
            },
            "metrics": {"cost_usd": 0.0000123, "latency_seconds": 0.5}
        }))
    }

    async fn failing(State(received): State<Received>, multipart: Multipart) -> impl IntoResponse {
        record_parts(&received, multipart).await;
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }

    async fn not_json() -> impl IntoResponse {
        (StatusCode::OK, "Bad Gateway, probably")
    }

    async fn serve(router: Router<Received>) -> (String, Received) {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let app = router.with_state(received.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/analyze", addr), received)
    }

    fn transcript(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn request(chat: &NamedTempFile, context: &NamedTempFile) -> AuditRequest {
        AuditRequest {
            chat_file: SelectedFile::new(chat.path()),
            context_file: SelectedFile::new(context.path()),
        }
    }

    #[tokio::test]
    async fn test_uploads_both_files_and_parses_scores() {
        let (url, received) = serve(Router::new().route("/analyze", post(scored))).await;
        let chat = transcript(r#"{"conversation_turns": []}"#);
        let context = transcript(r#"{"data": {"vector_data": []}}"#);

        let transport = HttpTransport::new(url, 5).unwrap();
        let response = transport.analyze(&request(&chat, &context)).await.unwrap();

        assert_eq!(response.scores.relevance.score, 80);
        assert_eq!(response.scores.faithfulness.score, 70);

        let parts = received.lock().await;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, "chat_file");
        assert_eq!(parts[1].0, "context_file");
        assert_eq!(parts[0].1, SelectedFile::new(chat.path()).name);
        assert_eq!(parts[0].2, "application/json");
        assert_eq!(parts[0].3, br#"{"conversation_turns": []}"#.to_vec());
        assert_eq!(parts[1].3, br#"{"data": {"vector_data": []}}"#.to_vec());
    }

    #[tokio::test]
    async fn test_server_error_carries_status_and_body() {
        let (url, _) = serve(Router::new().route("/analyze", post(failing))).await;
        let chat = transcript("{}");
        let context = transcript("{}");

        let transport = HttpTransport::new(url, 5).unwrap();
        let err = transport.analyze(&request(&chat, &context)).await.unwrap_err();

        match err {
            AuditError::ServerError { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_success_is_parse_failure() {
        let (url, _) = serve(Router::new().route("/analyze", post(not_json))).await;
        let chat = transcript("{}");
        let context = transcript("{}");

        let transport = HttpTransport::new(url, 5).unwrap();
        let err = transport.analyze(&request(&chat, &context)).await.unwrap_err();
        assert!(matches!(err, AuditError::ParseFailure(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let chat = transcript("{}");
        let context = transcript("{}");
        let transport = HttpTransport::new(format!("http://{}/analyze", addr), 5).unwrap();
        let err = transport.analyze(&request(&chat, &context)).await.unwrap_err();
        assert!(matches!(err, AuditError::NetworkFailure(_)));
    }

    #[tokio::test]
    async fn test_missing_file_fails_before_sending() {
        let (url, received) = serve(Router::new().route("/analyze", post(scored))).await;
        let context = transcript("{}");
        let request = AuditRequest {
            chat_file: SelectedFile::new("/nonexistent/chat.json"),
            context_file: SelectedFile::new(context.path()),
        };

        let transport = HttpTransport::new(url, 5).unwrap();
        let err = transport.analyze(&request).await.unwrap_err();
        assert!(matches!(err, AuditError::NetworkFailure(ref m) if m.contains("chat.json")));
        assert!(received.lock().await.is_empty());
    }
}
