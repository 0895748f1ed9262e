use crate::domain::model::{CodeOrigin, GeneratedCode, RunOutput};
use crate::domain::ports::Executor;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Sends fallback code to the built-in client and generated code to the
/// script runner.
pub struct RoutingExecutor<B: Executor, S: Executor> {
    builtin: B,
    script: S,
}

impl<B: Executor, S: Executor> RoutingExecutor<B, S> {
    pub fn new(builtin: B, script: S) -> Self {
        Self { builtin, script }
    }
}

#[async_trait]
impl<B: Executor, S: Executor> Executor for RoutingExecutor<B, S> {
    async fn execute(&self, code: &GeneratedCode) -> Result<RunOutput> {
        match code.origin {
            CodeOrigin::Fallback => self.builtin.execute(code).await,
            CodeOrigin::Generated => self.script.execute(code).await,
        }
    }
}
