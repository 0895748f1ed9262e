use crate::adapters::docs::fetch_docs;
use crate::config::{RunOptions, TrackingConfig};
use crate::core::artifacts::{
    ArtifactWriter, DOCS_FILE, ENV_PREVIEW_FILE, LAST_OUTPUT_FILE, MODEL_ERROR_FILE,
};
use crate::core::selector::{truncate_chars, CodeSelector};
use crate::core::validator::{judge_with_model, validate_output};
use crate::domain::model::{AttemptRecord, RunOutput, RunSummary, StatusReport, Verdict};
use crate::domain::ports::{Executor, LanguageModel, Storage};
use crate::utils::error::{Result, TrackError};
use crate::utils::validation::Validate;
use chrono::Utc;
use std::time::Instant;

const ATTEMPT_LOG_CHARS: usize = 2000;

/// Drives one tracking run: docs → code → execute → validate → persist.
pub struct TrackingAgent<S: Storage, L: LanguageModel, E: Executor> {
    config: TrackingConfig,
    options: RunOptions,
    selector: CodeSelector<L>,
    executor: E,
    artifacts: ArtifactWriter<S>,
}

impl<S: Storage, L: LanguageModel, E: Executor> TrackingAgent<S, L, E> {
    pub fn new(
        config: TrackingConfig,
        options: RunOptions,
        selector: CodeSelector<L>,
        executor: E,
        storage: S,
    ) -> Self {
        Self {
            config,
            options,
            selector,
            executor,
            artifacts: ArtifactWriter::new(storage),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        // 設定必須在執行前就齊全
        self.config.validate()?;
        self.options.validate()?;

        let started = Instant::now();
        tracing::info!(
            "🚚 Tracking reference {} against {}",
            self.config.reference.as_deref().unwrap_or_default(),
            self.config.base_url
        );

        self.artifacts
            .write_json(ENV_PREVIEW_FILE, &self.config.preview())
            .await?;

        let docs = if self.options.fetch_docs {
            let docs = fetch_docs(&self.config.docs_url).await;
            self.artifacts.write_text(DOCS_FILE, &docs).await?;
            docs
        } else {
            String::new()
        };

        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut last_output = String::new();
        let mut last_reasons: Vec<String> = Vec::new();

        for attempt in 1..=self.options.max_attempts {
            tracing::info!("🔄 Attempt {}/{}", attempt, self.options.max_attempts);

            let selection = self.selector.select(&docs, &last_output).await;
            if let Some(error) = &selection.model_error {
                self.artifacts.write_text(MODEL_ERROR_FILE, error).await?;
            }

            let run = match self.executor.execute(&selection.code).await {
                Ok(run) => run,
                Err(e) => {
                    tracing::warn!("⚠️ Client execution failed: {}", e);
                    RunOutput {
                        exit_code: -1,
                        output: serde_json::to_string(&StatusReport::transport_failure(
                            e.to_string(),
                        ))?,
                    }
                }
            };
            tracing::debug!("Client exited with {}: {}", run.exit_code, run.output.trim());

            let verdict = self.evaluate(&run.output).await?;

            attempts.push(AttemptRecord {
                attempt,
                origin: selection.code.origin,
                exit_code: run.exit_code,
                ok: verdict.success,
                reasons: verdict.reasons.clone(),
                raw: truncate_chars(&run.output, ATTEMPT_LOG_CHARS).to_string(),
                finished_at: Utc::now(),
            });
            self.artifacts.write_attempts(&attempts).await?;
            self.artifacts.write_text(LAST_OUTPUT_FILE, &run.output).await?;

            if verdict.success {
                let (code_path, response_path) =
                    self.artifacts.write_success(&selection.code, &run).await?;
                tracing::info!(
                    "✅ Status retrieved with {:?} code in {:?}",
                    selection.code.origin,
                    started.elapsed()
                );
                return Ok(RunSummary {
                    attempts: attempt,
                    origin: selection.code.origin,
                    code_path,
                    response_path,
                });
            }

            tracing::warn!("❌ Attempt {} failed: {}", attempt, verdict.reasons.join("; "));
            last_output = run.output;
            last_reasons = verdict.reasons;
        }

        Err(TrackError::TrackingFailed {
            attempts: self.options.max_attempts,
            reason: if last_reasons.is_empty() {
                "verdict was negative".to_string()
            } else {
                last_reasons.join("; ")
            },
        })
    }

    /// 規則判定優先；模型只能否決，不能把失敗改判為成功
    async fn evaluate(&self, output: &str) -> Result<Verdict> {
        let verdict = validate_output(output);
        if !verdict.success || !self.options.llm_judge {
            return Ok(verdict);
        }
        let Some(model) = self.selector.model() else {
            return Ok(verdict);
        };

        match judge_with_model(model, output).await {
            Ok(Some(judged)) if !judged.success => {
                tracing::debug!("Model vetoed the run: {}", judged.reasons.join("; "));
                let mut reasons = judged.reasons;
                if reasons.is_empty() {
                    reasons.push("model judge rejected the output".to_string());
                }
                Ok(Verdict {
                    success: false,
                    reasons,
                    patch_hint: judged.patch_hint,
                    ..verdict
                })
            }
            Ok(_) => Ok(verdict),
            Err(e) => {
                tracing::warn!("⚠️ Model judge unavailable, keeping rule verdict: {}", e);
                self.artifacts
                    .write_text(MODEL_ERROR_FILE, &e.to_string())
                    .await?;
                Ok(verdict)
            }
        }
    }
}
