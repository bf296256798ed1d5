use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::LLMConfig;
use super::error::RequestError;

/// Shown when a successful response carries no usable candidate text.
pub const NO_RESPONSE_NOTICE: &str = "No response from Gemini API or unexpected format.";

const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
    }
}

impl ErrorBody {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn into_message(self) -> String {
        self.message
            .or_else(|| self.error.and_then(|e| e.message))
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
    }
}

/// Client for the live Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    config: LLMConfig,
}

impl GeminiClient {
    pub fn new(config: LLMConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Sets a custom reqwest client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    /// Sends `question` as a single-message conversation and returns the first
    /// candidate's text, or [`NO_RESPONSE_NOTICE`] when there is none.
    pub async fn generate(&self, question: &str) -> Result<String, RequestError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: question }],
            }],
        };

        debug!("POST {} (model {})", self.config.generate_url(), self.config.model);

        let response = self
            .client
            .post(self.config.generate_url())
            .query(&[("key", self.config.key_param())])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(RequestError::Api {
                status: status.as_u16(),
                message: ErrorBody::parse(&text).into_message(),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| RequestError::InvalidResponse(e.to_string()))?;

        Ok(parsed.into_text().unwrap_or_else(|| {
            warn!("Gemini returned no candidate text");
            NO_RESPONSE_NOTICE.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

    fn no_proxy_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = LLMConfig::new(
            server.uri(),
            Some("test-key".to_string()),
            "gemini-2.0-flash".to_string(),
        );
        GeminiClient::new(config).with_client(no_proxy_client())
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "modelVersion": "gemini-2.0-flash"
        })
    }

    #[test]
    fn request_body_is_a_single_user_message() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "2+2?" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "contents": [{ "role": "user", "parts": [{ "text": "2+2?" }] }] })
        );
    }

    #[test]
    fn error_message_prefers_top_level_field() {
        let body = ErrorBody::parse(r#"{"message":"top","error":{"message":"nested"}}"#);
        assert_eq!(body.into_message(), "top");
        let body = ErrorBody::parse(r#"{"error":{"code":400,"message":"nested"}}"#);
        assert_eq!(body.into_message(), "nested");
        assert_eq!(ErrorBody::parse("<html>").into_message(), "Unknown error");
    }

    #[tokio::test]
    async fn sends_question_and_returns_candidate_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(query_param("key", "test-key"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "2+2?" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("4")))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).generate("2+2?").await.unwrap();
        assert_eq!(text, "4");
    }

    #[tokio::test]
    async fn zero_candidates_yield_the_fallback_notice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let text = client_for(&server).generate("hello").await.unwrap();
        assert_eq!(text, NO_RESPONSE_NOTICE);
    }

    #[tokio::test]
    async fn null_candidates_or_parts_yield_the_fallback_notice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": null })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "role": "model", "parts": null } }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.generate("hello").await.unwrap(), NO_RESPONSE_NOTICE);
        assert_eq!(client.generate("hello").await.unwrap(), NO_RESPONSE_NOTICE);
    }

    #[tokio::test]
    async fn empty_candidate_text_is_returned_as_is() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("")))
            .mount(&server)
            .await;

        let text = client_for(&server).generate("hello").await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn candidate_without_parts_yields_the_fallback_notice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;

        let text = client_for(&server).generate("hello").await.unwrap();
        assert_eq!(text, NO_RESPONSE_NOTICE);
    }

    #[tokio::test]
    async fn non_success_status_carries_provider_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "message": "API key not valid" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hello").await.unwrap_err();
        assert!(matches!(err, RequestError::Api { status: 400, .. }));
        assert_eq!(err.to_string(), "API error: 400 - API key not valid");
    }

    #[tokio::test]
    async fn non_success_status_without_message_is_unknown_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "API error: 500 - Unknown error");
    }

    #[tokio::test]
    async fn malformed_success_body_is_an_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hello").await.unwrap_err();
        assert!(matches!(err, RequestError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let config = LLMConfig::new(
            "http://127.0.0.1:1".to_string(),
            None,
            "gemini-2.0-flash".to_string(),
        );
        let client = GeminiClient::new(config).with_client(no_proxy_client());

        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, RequestError::Network(_)));
    }
}
