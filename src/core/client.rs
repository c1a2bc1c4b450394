//! Async translation client with rate-limit retry logic

use rand::Rng;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{TextItem, TranslationItem};

/// Version of the translator REST API this client speaks
const API_VERSION: &str = "3.0";

/// Client for the cloud translator `/translate` endpoint
#[derive(Debug, Clone)]
pub struct AzureTranslator {
    client: reqwest::Client,
    config: Arc<TranslatorConfig>,
}

impl AzureTranslator {
    /// Create a new translator, rejecting incomplete configuration
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .user_agent(format!("tsv-translator/{}", crate::VERSION))
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate `texts` in one request, returning one string per input
    ///
    /// Items the service leaves untranslated come back as empty strings.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        from_lang: &str,
        to_lang: &str,
    ) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body: Vec<TextItem> = texts.iter().map(TextItem::new).collect();
        let from = self.config.lang_case.apply(from_lang);
        let to = self.config.lang_case.apply(to_lang);

        let response = self.post_with_retry(&body, &from, &to).await?;

        let items: Vec<TranslationItem> =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;

        let translations: Vec<String> = items.into_iter().map(TranslationItem::into_text).collect();

        if translations.len() != texts.len() {
            return Err(TranslationError::TranslationCountMismatch {
                expected: texts.len(),
                actual: translations.len(),
            });
        }

        Ok(translations)
    }

    /// POST the body, sleeping and retrying while the service answers 429
    async fn post_with_retry(
        &self,
        body: &[TextItem],
        from: &str,
        to: &str,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/translate", self.config.endpoint.trim_end_matches('/'));
        let max_attempts = self.config.max_retries;

        for attempt in 0..max_attempts {
            debug!(
                "POST {} ({} items, attempt {}/{})",
                url,
                body.len(),
                attempt + 1,
                max_attempts
            );

            let response = self
                .client
                .post(&url)
                .query(&[("api-version", API_VERSION), ("from", from), ("to", to)])
                .header("Ocp-Apim-Subscription-Key", &self.config.api_key)
                .header("Ocp-Apim-Subscription-Region", &self.config.region)
                .header("Content-Type", "application/json")
                .json(body)
                .send()
                .await
                .map_err(|e| TranslationError::NetworkError {
                    message: e.to_string(),
                })?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt + 1 >= max_attempts {
                    break;
                }

                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                let delay = retry_delay(attempt, retry_after.as_deref(), &self.config)
                    .saturating_add(jitter(self.config.retry_max_jitter_ms));

                warn!(
                    "Rate limited (Retry-After: {}), waiting {:?} before attempt {}",
                    retry_after.as_deref().unwrap_or("-"),
                    delay,
                    attempt + 2
                );
                sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(TranslationError::ApiError {
                    status: status.as_u16(),
                    message,
                });
            }

            if attempt > 0 {
                info!("Request succeeded after {} retries", attempt);
            }
            return Ok(response);
        }

        Err(TranslationError::RateLimitExceeded {
            attempts: max_attempts,
        })
    }
}

/// Wait before retrying after the 429 received on `attempt` (zero-based), jitter excluded
///
/// A non-negative numeric `Retry-After` that fits a `Duration` wins; otherwise
/// the delay doubles from the base per attempt up to the configured ceiling.
pub fn retry_delay(attempt: u32, retry_after: Option<&str>, config: &TranslatorConfig) -> Duration {
    if let Some(delay) = retry_after
        .and_then(|v| v.trim().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    {
        return delay;
    }

    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let backoff = config.retry_base_delay_ms.saturating_mul(factor);
    Duration::from_millis(backoff.min(config.retry_max_delay_ms))
}

fn jitter(max_ms: u64) -> Duration {
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=max_ms))
}
