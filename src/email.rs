//! Email delivery for booking confirmations.
//!
//! Two modes:
//! 1. Send via Resend API (when an API key is configured)
//! 2. Disabled (no key - log and skip)
//!
//! The service sits behind the [`Mailer`] trait so the capture workflow can
//! be tested with a substitutable fake.

use std::time::Duration;

use axum::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, Result};

/// Retry delays in seconds (exponential backoff: 1s, 4s, 16s)
const RETRY_DELAYS: &[u64] = &[1, 4, 16];

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// A binary attachment (filename + content).
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// A fully-composed outbound message.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub attachments: Vec<EmailAttachment>,
}

/// Result of attempting to send an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Email was sent successfully
    Sent,
    /// Email delivery is not configured; message was dropped after logging
    Skipped,
}

/// Outbound email capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<SendOutcome>;
}

/// Resend API request body.
#[derive(Debug, Serialize)]
struct ResendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<ResendAttachment>,
}

#[derive(Debug, Serialize)]
struct ResendAttachment {
    filename: String,
    /// Base64-encoded file content
    content: String,
}

/// Email service using the Resend API.
#[derive(Clone)]
pub struct EmailService {
    api_key: Option<String>,
    from_email: String,
    http_client: Client,
}

impl EmailService {
    pub fn new(api_key: Option<String>, from_email: String) -> Self {
        Self {
            api_key,
            from_email,
            http_client: Client::new(),
        }
    }

    /// Send a request to the Resend API with exponential backoff retry.
    ///
    /// Retries on transient errors (network issues, 5xx, 429 rate limit).
    /// Fails immediately on non-transient errors (4xx except 429).
    async fn send_with_retry(
        &self,
        api_key: &str,
        request: &ResendEmailRequest<'_>,
        to_email: &str,
    ) -> Result<SendOutcome> {
        let mut last_error: Option<AppError> = None;

        for (attempt, delay_secs) in std::iter::once(&0u64).chain(RETRY_DELAYS).enumerate() {
            // Sleep before retry (skip on first attempt)
            if *delay_secs > 0 {
                tracing::warn!(
                    attempt,
                    delay_secs,
                    "Retrying email send after transient failure"
                );
                tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
            }

            match self.send_resend_request(api_key, request).await {
                Ok(()) => {
                    tracing::info!(to = %to_email, attempt, "Confirmation email sent via Resend");
                    return Ok(SendOutcome::Sent);
                }
                Err((error, is_transient)) => {
                    if is_transient {
                        last_error = Some(error);
                    } else {
                        return Err(error);
                    }
                }
            }
        }

        tracing::error!(
            to = %to_email,
            attempts = RETRY_DELAYS.len() + 1,
            "Email send failed after all retries"
        );
        Err(last_error.unwrap_or_else(|| {
            AppError::Internal("Email service error: all retries exhausted".into())
        }))
    }

    /// Send a single request to the Resend API.
    ///
    /// Returns Ok(()) on success, or Err((AppError, is_transient)) on failure.
    async fn send_resend_request(
        &self,
        api_key: &str,
        request: &ResendEmailRequest<'_>,
    ) -> std::result::Result<(), (AppError, bool)> {
        let response = self
            .http_client
            .post(RESEND_API_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to send request to Resend API");
                // Network errors are transient
                (
                    AppError::Internal(format!("Email service error: {}", e)),
                    true,
                )
            })?;

        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let is_transient = status.as_u16() == 429 || status.is_server_error();

        if is_transient {
            tracing::warn!(status = %status, body = %body, "Resend API returned transient error");
        } else {
            tracing::error!(status = %status, body = %body, "Resend API returned non-transient error");
        }

        Err((
            AppError::Internal(format!("Email service error: {} - {}", status, body)),
            is_transient,
        ))
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send(&self, email: &OutgoingEmail) -> Result<SendOutcome> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!(
                to = %email.to,
                "No Resend API key configured, skipping email"
            );
            return Ok(SendOutcome::Skipped);
        };

        let attachments = email
            .attachments
            .iter()
            .map(|a| ResendAttachment {
                filename: a.filename.clone(),
                content: BASE64.encode(&a.content),
            })
            .collect();

        let request = ResendEmailRequest {
            from: &self.from_email,
            to: vec![&email.to],
            subject: &email.subject,
            text: &email.text,
            attachments,
        };

        self.send_with_retry(api_key, &request, &email.to).await
    }
}
