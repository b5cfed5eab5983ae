use crate::config::AppConfig;
use crate::models::OutboundEmail;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("RESEND_API_KEY is not configured")]
    MissingApiKey,

    #[error("Email API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email API responded with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Email API returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Trait for transactional email transports
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one email and return the provider's JSON answer
    async fn send(&self, email: &OutboundEmail) -> Result<Value, EmailError>;
}

/// Client for the Resend HTTP API (`POST /emails`, bearer auth)
pub struct ResendClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl ResendClient {
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, EmailError> {
        Self::new(
            config.api_url.clone(),
            config.api_key.clone(),
            config.email_timeout,
        )
    }
}

#[async_trait::async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: &OutboundEmail) -> Result<Value, EmailError> {
        let api_key = self.api_key.as_deref().ok_or(EmailError::MissingApiKey)?;

        tracing::debug!("Sending email '{}' to {}", email.subject, email.to);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| EmailError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn email() -> OutboundEmail {
        OutboundEmail {
            from: "shop@example.com".to_string(),
            to: "kunde@example.com".to_string(),
            subject: "Bestätigung Ihrer Bestellung".to_string(),
            text: "Hallo".to_string(),
            attachments: vec![],
        }
    }

    fn client(server: &MockServer, api_key: Option<&str>) -> ResendClient {
        ResendClient::new(
            format!("{}/emails", server.uri()),
            api_key.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_json_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .and(body_partial_json(serde_json::json!({
                "to": "kunde@example.com",
                "subject": "Bestätigung Ihrer Bestellung"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "abc"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server, Some("re_test")).send(&email()).await.unwrap();
        assert_eq!(response, serde_json::json!({"id": "abc"}));
    }

    #[tokio::test]
    async fn test_error_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
            .mount(&server)
            .await;

        let err = client(&server, Some("re_test")).send(&email()).await.unwrap_err();
        match err {
            EmailError::Rejected { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "invalid from");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server, Some("re_test")).send(&email()).await.unwrap_err();
        assert!(matches!(err, EmailError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, None).send(&email()).await.unwrap_err();
        assert!(matches!(err, EmailError::MissingApiKey));
    }
}
