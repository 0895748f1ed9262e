use crate::config::RunOptions;
use clap::Parser;

/// Carrier credentials come from the environment; these flags only tune the run.
#[derive(Debug, Clone, Parser)]
#[command(name = "carrier-track")]
#[command(about = "Query PostNL status-by-reference with generated or built-in client code")]
pub struct CliConfig {
    #[arg(long, env = "ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts_dir: String,

    #[arg(long, default_value = "1", help = "Attempts before giving up")]
    pub max_attempts: u32,

    #[arg(long, help = "Ask the language model to judge each run output")]
    pub llm_judge: bool,

    #[arg(long, help = "Do not download the API documentation page")]
    pub skip_docs: bool,

    #[arg(long, default_value = "python3", help = "Interpreter for generated scripts")]
    pub interpreter: String,

    #[arg(long, default_value = "25", help = "Carrier API timeout in seconds")]
    pub timeout_secs: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            artifacts_dir: self.artifacts_dir.clone(),
            max_attempts: self.max_attempts,
            llm_judge: self.llm_judge,
            fetch_docs: !self.skip_docs,
            interpreter: self.interpreter.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_run_options() {
        let config = CliConfig::parse_from(["carrier-track"]);
        let options = config.run_options();
        assert_eq!(options.max_attempts, 1);
        assert!(options.fetch_docs);
        assert!(!options.llm_judge);
        assert_eq!(options.interpreter, "python3");
    }

    #[test]
    fn test_flags_are_mapped() {
        let config = CliConfig::parse_from([
            "carrier-track",
            "--artifacts-dir",
            "out",
            "--max-attempts",
            "3",
            "--skip-docs",
            "--llm-judge",
        ]);
        let options = config.run_options();
        assert_eq!(options.artifacts_dir, "out");
        assert_eq!(options.max_attempts, 3);
        assert!(!options.fetch_docs);
        assert!(options.llm_judge);
    }
}
