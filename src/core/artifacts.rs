use crate::core::validator::parse_report;
use crate::domain::model::{AttemptRecord, GeneratedCode, RunOutput};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::Serialize;

pub const CODE_FILE: &str = "generated_postnl_tracking.py";
pub const RESPONSE_FILE: &str = "response.json";
pub const DOCS_FILE: &str = "docs.html";
pub const ENV_PREVIEW_FILE: &str = "env_preview.json";
pub const LAST_OUTPUT_FILE: &str = "last_output.txt";
pub const ATTEMPTS_LOG_FILE: &str = "attempts_log.json";
pub const MODEL_ERROR_FILE: &str = "llm_error.txt";

/// Writes run artifacts through a `Storage`. Only `write_success` touches the
/// code and response files.
pub struct ArtifactWriter<S: Storage> {
    storage: S,
}

impl<S: Storage> ArtifactWriter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn write_text(&self, name: &str, text: &str) -> Result<()> {
        self.storage.write_file(name, text.as_bytes()).await
    }

    pub async fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.storage.write_file(name, json.as_bytes()).await
    }

    pub async fn write_attempts(&self, attempts: &[AttemptRecord]) -> Result<()> {
        self.write_json(ATTEMPTS_LOG_FILE, attempts).await
    }

    /// 寫入一個程式碼檔與一個回應檔，回傳兩者的位置
    pub async fn write_success(
        &self,
        code: &GeneratedCode,
        run: &RunOutput,
    ) -> Result<(String, String)> {
        self.write_text(CODE_FILE, &code.source).await?;

        match parse_report(&run.output) {
            Some(report) => self.write_json(RESPONSE_FILE, &report).await?,
            None => self.write_text(RESPONSE_FILE, &run.output).await?,
        }

        tracing::debug!("Saved {} and {}", CODE_FILE, RESPONSE_FILE);
        Ok((
            self.storage.location(CODE_FILE),
            self.storage.location(RESPONSE_FILE),
        ))
    }
}
