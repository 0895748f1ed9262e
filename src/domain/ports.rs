use crate::domain::model::{GeneratedCode, RunOutput};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// 顯示用的完整位置
    fn location(&self, path: &str) -> String;
}

/// A text-completion service used for code generation and judging.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn respond(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String>;
}

/// Runs calling code against the carrier API and captures what it printed.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, code: &GeneratedCode) -> Result<RunOutput>;
}
