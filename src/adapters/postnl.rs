use crate::config::{
    TrackingConfig, ENV_APIKEY, ENV_CUSTOMER_CODE, ENV_CUSTOMER_NUMBER, ENV_REFERENCE,
};
use crate::domain::model::{GeneratedCode, RunOutput, StatusReport};
use crate::domain::ports::Executor;
use crate::utils::error::{Result, TrackError};
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

/// Keys whose presence marks a well-formed status body.
const STATUS_BODY_KEYS: [&str; 3] = ["CompleteStatus", "CurrentStatus", "Warnings"];
const RAW_PREVIEW_CHARS: usize = 400;

/// Built-in status-by-reference client. This is what the fallback code does,
/// executed natively.
pub struct PostnlClient {
    client: Client,
    base_url: String,
    api_key: String,
    customer_code: String,
    customer_number: String,
    reference: String,
}

impl PostnlClient {
    pub fn from_config(config: &TrackingConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: validate_required_field(ENV_APIKEY, &config.api_key)?.to_string(),
            customer_code: validate_required_field(ENV_CUSTOMER_CODE, &config.customer_code)?
                .to_string(),
            customer_number: validate_required_field(ENV_CUSTOMER_NUMBER, &config.customer_number)?
                .to_string(),
            reference: validate_required_field(ENV_REFERENCE, &config.reference)?.to_string(),
        })
    }

    /// `{base}/shipment/v2/status/reference/{reference}`，reference 會被 percent-encode
    pub fn status_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| TrackError::InvalidConfigValueError {
                field: "POSTNL_BASE_URL".to_string(),
                value: self.base_url.clone(),
                reason: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["shipment", "v2", "status", "reference", self.reference.as_str()]);
        Ok(url)
    }

    pub async fn fetch_status(&self) -> Result<StatusReport> {
        let url = self.status_url()?;
        tracing::debug!("Making status request to: {}", url);

        let started = Instant::now();
        let sent = self
            .client
            .get(url)
            .query(&[
                ("detail", "true"),
                ("language", "NL"),
                ("customerCode", self.customer_code.as_str()),
                ("customerNumber", self.customer_number.as_str()),
                ("maxDays", "14"),
            ])
            .header("Accept", "application/json")
            .header("apikey", &self.api_key)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Carrier request failed: {}", e);
                return Ok(StatusReport::transport_failure(e.to_string()));
            }
        };

        let http_status = i64::from(response.status().as_u16());
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        tracing::debug!("Carrier response status: {}", http_status);

        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(e) => return Ok(StatusReport::transport_failure(e.to_string())),
        };
        let body = serde_json::from_str::<serde_json::Value>(&raw).ok();

        // 只有非 JSON 的 body 才保留原文預覽
        let raw_preview = body
            .is_none()
            .then(|| raw.chars().take(RAW_PREVIEW_CHARS).collect());
        let object_body = body.filter(serde_json::Value::is_object);

        Ok(StatusReport {
            http_status,
            url: Some(final_url),
            elapsed_ms: Some(started.elapsed().as_millis() as u64),
            status_code: derive_status_code(http_status, object_body.as_ref()),
            result: object_body,
            content_type,
            raw_preview,
            error: None,
        })
    }
}

/// 以 body 推導 status_code：優先採用 body 內的整數欄位，
/// 否則 HTTP 200 且含任一狀態欄位時視為 200
pub fn derive_status_code(http_status: i64, body: Option<&serde_json::Value>) -> Option<i64> {
    let object = body?.as_object()?;
    if let Some(code) = object.get("status_code").and_then(serde_json::Value::as_i64) {
        return Some(code);
    }
    if http_status == 200 && STATUS_BODY_KEYS.iter().any(|key| object.contains_key(*key)) {
        return Some(200);
    }
    None
}

#[async_trait]
impl Executor for PostnlClient {
    async fn execute(&self, code: &GeneratedCode) -> Result<RunOutput> {
        tracing::debug!(
            "Running built-in client in place of {:?} code ({} bytes)",
            code.origin,
            code.source.len()
        );
        let report = self.fetch_status().await?;
        let exit_code = if report.http_status == -1 { 1 } else { 0 };
        Ok(RunOutput {
            exit_code,
            output: serde_json::to_string(&report)?,
        })
    }
}
