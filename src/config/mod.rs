#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::Result;
use crate::utils::validation::{
    validate_path, validate_range, validate_required_field, validate_url, Validate,
};
use serde::Serialize;
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api-sandbox.postnl.nl";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_DOCS_URL: &str =
    "https://developer.postnl.nl/docs/#/http/api-endpoints/send-track/shippingstatus/get-status-by-reference";

pub const ENV_APIKEY: &str = "POSTNL_APIKEY";
pub const ENV_CUSTOMER_CODE: &str = "POSTNL_CUSTOMER_CODE";
pub const ENV_CUSTOMER_NUMBER: &str = "POSTNL_CUSTOMER_NUMBER";
pub const ENV_REFERENCE: &str = "POSTNL_REFERENCE";
pub const ENV_BASE_URL: &str = "POSTNL_BASE_URL";

/// Everything read from the environment. Immutable once loaded.
#[derive(Clone, Default)]
pub struct TrackingConfig {
    pub api_key: Option<String>,
    pub customer_code: Option<String>,
    pub customer_number: Option<String>,
    pub reference: Option<String>,
    pub base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub llm_model: String,
    pub docs_url: String,
}

impl TrackingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 透過注入的 lookup 讀取設定，測試時不必改動 process 環境變數
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_key: non_empty(ENV_APIKEY),
            customer_code: non_empty(ENV_CUSTOMER_CODE),
            customer_number: non_empty(ENV_CUSTOMER_NUMBER),
            reference: non_empty(ENV_REFERENCE),
            base_url: non_empty(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_api_key: non_empty("OPENAI_API_KEY").or_else(|| non_empty("OPENAI_APIKEY")),
            openai_base_url: non_empty("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            llm_model: non_empty("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            docs_url: non_empty("POSTNL_DOCS_URL").unwrap_or_else(|| DEFAULT_DOCS_URL.to_string()),
        }
    }

    pub fn has_model_credential(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Variables handed to a generated script.
    pub fn script_env(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![(ENV_BASE_URL, self.base_url.clone())];
        for (key, value) in [
            (ENV_APIKEY, &self.api_key),
            (ENV_CUSTOMER_CODE, &self.customer_code),
            (ENV_CUSTOMER_NUMBER, &self.customer_number),
            (ENV_REFERENCE, &self.reference),
        ] {
            if let Some(v) = value {
                vars.push((key, v.clone()));
            }
        }
        vars
    }

    /// 遮蔽後的設定摘要，寫入 env_preview.json
    pub fn preview(&self) -> EnvPreview {
        EnvPreview {
            apikey: mask(self.api_key.as_deref().unwrap_or("")),
            customer_code: self.customer_code.clone(),
            customer_number: self.customer_number.clone(),
            reference: self.reference.clone(),
            base_url: self.base_url.clone(),
            model_credential: if self.has_model_credential() { "yes" } else { "no" },
        }
    }
}

impl std::fmt::Debug for TrackingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingConfig")
            .field("api_key", &self.api_key.as_deref().map(mask))
            .field("customer_code", &self.customer_code)
            .field("customer_number", &self.customer_number)
            .field("reference", &self.reference)
            .field("base_url", &self.base_url)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("openai_base_url", &self.openai_base_url)
            .field("llm_model", &self.llm_model)
            .field("docs_url", &self.docs_url)
            .finish()
    }
}

impl Validate for TrackingConfig {
    fn validate(&self) -> Result<()> {
        validate_required_field(ENV_APIKEY, &self.api_key)?;
        validate_required_field(ENV_CUSTOMER_CODE, &self.customer_code)?;
        validate_required_field(ENV_CUSTOMER_NUMBER, &self.customer_number)?;
        validate_required_field(ENV_REFERENCE, &self.reference)?;
        validate_url(ENV_BASE_URL, &self.base_url)?;
        if self.has_model_credential() {
            validate_url("OPENAI_BASE_URL", &self.openai_base_url)?;
        }

        tracing::debug!("✅ Tracking configuration validation passed");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvPreview {
    #[serde(rename = "POSTNL_APIKEY")]
    pub apikey: String,
    #[serde(rename = "POSTNL_CUSTOMER_CODE")]
    pub customer_code: Option<String>,
    #[serde(rename = "POSTNL_CUSTOMER_NUMBER")]
    pub customer_number: Option<String>,
    #[serde(rename = "POSTNL_REFERENCE")]
    pub reference: Option<String>,
    #[serde(rename = "POSTNL_BASE_URL")]
    pub base_url: String,
    #[serde(rename = "OPENAI_API_KEY?")]
    pub model_credential: &'static str,
}

/// Run-level switches that are not part of the carrier configuration.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub artifacts_dir: String,
    pub max_attempts: u32,
    pub llm_judge: bool,
    pub fetch_docs: bool,
    pub interpreter: String,
    pub timeout_secs: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            artifacts_dir: "artifacts".to_string(),
            max_attempts: 1,
            llm_judge: false,
            fetch_docs: true,
            interpreter: "python3".to_string(),
            timeout_secs: 25,
        }
    }
}

impl Validate for RunOptions {
    fn validate(&self) -> Result<()> {
        validate_path("artifacts_dir", &self.artifacts_dir)?;
        validate_range("max_attempts", self.max_attempts, 1, 10)?;
        validate_range("timeout_secs", self.timeout_secs, 1, 600)?;
        Ok(())
    }
}

/// 只保留最後四碼
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() < 4 {
        return secret.to_string();
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
