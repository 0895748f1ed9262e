use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 程式碼來源：模型產生或內建 fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeOrigin {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub source: String,
    pub origin: CodeOrigin,
}

impl GeneratedCode {
    pub fn generated(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            origin: CodeOrigin::Generated,
        }
    }

    pub fn fallback(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            origin: CodeOrigin::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == CodeOrigin::Fallback
    }
}

/// The single JSON line a tracking client prints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub http_status: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusReport {
    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self {
            http_status: -1,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// 一次執行的結果：退出碼與完整輸出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub exit_code: i32,
    pub output: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub success: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub patch_hint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub origin: CodeOrigin,
    pub exit_code: i32,
    pub ok: bool,
    pub reasons: Vec<String>,
    pub raw: String,
    pub finished_at: DateTime<Utc>,
}

/// 成功執行後的摘要
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub attempts: u32,
    pub origin: CodeOrigin,
    pub code_path: String,
    pub response_path: String,
}
