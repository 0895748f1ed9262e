use crate::domain::model::GeneratedCode;
use crate::domain::ports::LanguageModel;
use regex::Regex;
use std::sync::LazyLock;

/// Static client used whenever generation is unavailable.
pub const FALLBACK_CLIENT: &str = include_str!("../../assets/fallback_client.py");

const DOCS_PROMPT_CHARS: usize = 3000;
const FEEDBACK_PROMPT_CHARS: usize = 2000;
const GENERATION_TEMPERATURE: f32 = 0.2;
const GENERATION_MAX_TOKENS: u32 = 1400;

const GENERATION_INSTRUCTIONS: &str = "Write a single-file Python script that calls PostNL \
'shipping status by reference'. Read env vars: POSTNL_APIKEY, POSTNL_CUSTOMER_CODE, \
POSTNL_CUSTOMER_NUMBER, POSTNL_REFERENCE. Default POSTNL_BASE_URL='https://api-sandbox.postnl.nl'. \
GET {base}/shipment/v2/status/reference/{reference} with headers Accept: application/json and \
apikey, and params: detail=true, language=NL, customerCode, customerNumber, maxDays=14. \
Print exactly one JSON line: {http_status, status_code, result, url, elapsed_ms}. \
On error print JSON with http_status=-1 and error. No extra prints. No code fences.";

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)\r?\n?```$")
        .expect("fence pattern is valid")
});

/// Outcome of one selection. `model_error` is set when generation was
/// attempted and failed.
#[derive(Debug, Clone)]
pub struct Selection {
    pub code: GeneratedCode,
    pub model_error: Option<String>,
}

pub struct CodeSelector<L: LanguageModel> {
    model: Option<L>,
}

impl<L: LanguageModel> CodeSelector<L> {
    pub fn new(model: Option<L>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> Option<&L> {
        self.model.as_ref()
    }

    /// 沒有模型憑證、呼叫失敗或回傳空字串時，一律回傳 fallback，不重試
    pub async fn select(&self, docs: &str, last_output: &str) -> Selection {
        let Some(model) = &self.model else {
            tracing::info!("🔌 No model credential, using built-in client");
            return Selection {
                code: fallback_code(),
                model_error: None,
            };
        };

        let prompt = build_prompt(docs, last_output);
        match model
            .respond(&prompt, GENERATION_TEMPERATURE, GENERATION_MAX_TOKENS)
            .await
        {
            Ok(text) => {
                let source = strip_code_fence(&text);
                if source.is_empty() {
                    tracing::warn!("⚠️ Model returned no code, using built-in client");
                    return Selection {
                        code: fallback_code(),
                        model_error: Some("model returned an empty response".to_string()),
                    };
                }
                tracing::info!("🤖 Using generated client ({} bytes)", source.len());
                Selection {
                    code: GeneratedCode::generated(source),
                    model_error: None,
                }
            }
            Err(e) => {
                tracing::warn!("⚠️ Code generation failed, using built-in client: {}", e);
                Selection {
                    code: fallback_code(),
                    model_error: Some(e.to_string()),
                }
            }
        }
    }
}

pub fn fallback_code() -> GeneratedCode {
    GeneratedCode::fallback(FALLBACK_CLIENT)
}

pub fn build_prompt(docs: &str, last_output: &str) -> String {
    let mut prompt = format!(
        "{}\n\nDocs:\n{}",
        GENERATION_INSTRUCTIONS,
        truncate_chars(docs, DOCS_PROMPT_CHARS)
    );
    if !last_output.is_empty() {
        prompt.push_str("\n\nPrevious output to fix:\n");
        prompt.push_str(truncate_chars(last_output, FEEDBACK_PROMPT_CHARS));
    }
    prompt
}

/// Removes one markdown fence wrapping the whole reply; other text is kept as is.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    match CODE_FENCE.captures(trimmed) {
        Some(caps) => caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        None => trimmed.to_string(),
    }
}

pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
