pub mod agent;
pub mod artifacts;
pub mod executor;
pub mod selector;
pub mod validator;

pub use crate::domain::model::{GeneratedCode, RunOutput, StatusReport, Verdict};
pub use crate::domain::ports::{Executor, LanguageModel, Storage};
pub use crate::utils::error::Result;
