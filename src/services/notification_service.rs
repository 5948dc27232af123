use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::EmailConfig;
use crate::error::{ AppError, Result };

/// Outbound notification seam. Callers treat delivery as best-effort: errors
/// are logged, never propagated to the request path.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, template: &str, data: Value) -> Result<()>;
}

/// Delivers email through a transactional-email HTTP API.
pub struct EmailNotifier {
    client: reqwest::Client,
    config: Option<EmailConfig>,
}

impl EmailNotifier {
    pub fn new(config: Option<EmailConfig>) -> Self {
        Self {
            client: reqwest::Client::builder().timeout(Duration::from_secs(10)).build().unwrap(),
            config,
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, to: &str, subject: &str, template: &str, data: Value) -> Result<()> {
        let Some(config) = &self.config else {
            tracing::debug!(template, to, "email delivery not configured, dropping notification");
            return Ok(());
        };

        let payload = serde_json::json!({
            "from": config.from_address,
            "to": to,
            "subject": subject,
            "template": template,
            "data": data,
        });

        let response = self.client
            .post(&config.api_url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send().await
            .map_err(|e| AppError::Notification(e.to_string()))?;

        if !response.status().is_success() {
            return Err(
                AppError::Notification(format!("email API returned {}", response.status()))
            );
        }

        Ok(())
    }
}
