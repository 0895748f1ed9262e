use carrier_track::utils::{logger, validation::Validate};
use carrier_track::{
    CliConfig, CodeSelector, LocalStorage, OpenAiClient, PostnlClient, RoutingExecutor,
    ScriptRunner, TrackError, TrackingAgent, TrackingConfig,
};
use clap::Parser;
use std::time::Duration;

fn fail(e: &TrackError) -> ! {
    tracing::error!(
        "❌ Tracking failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

fn build_agent(
    cli: &CliConfig,
) -> carrier_track::Result<
    TrackingAgent<LocalStorage, OpenAiClient, RoutingExecutor<PostnlClient, ScriptRunner>>,
> {
    let config = TrackingConfig::from_env();
    let options = cli.run_options();
    tracing::debug!("Tracking config: {:?}", config);

    // 執行前先驗證設定
    config.validate()?;
    options.validate()?;

    let model = match &config.openai_api_key {
        Some(key) => Some(OpenAiClient::new(
            key,
            &config.openai_base_url,
            &config.llm_model,
        )?),
        None => None,
    };
    if let Some(model) = &model {
        tracing::info!("🤖 Code generation enabled with model {}", model.model());
    }

    let builtin = PostnlClient::from_config(&config, Duration::from_secs(options.timeout_secs))?;
    let script = ScriptRunner::python(options.interpreter.clone()).with_envs(config.script_env());
    let storage = LocalStorage::new(options.artifacts_dir.clone());

    Ok(TrackingAgent::new(
        config,
        options,
        CodeSelector::new(model),
        RoutingExecutor::new(builtin, script),
        storage,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::info!("Starting carrier-track");

    let agent = match build_agent(&cli) {
        Ok(agent) => agent,
        Err(e) => fail(&e),
    };

    match agent.run().await {
        Ok(summary) => {
            tracing::info!("✅ Tracking completed after {} attempt(s)", summary.attempts);
            println!("SUCCESS");
            println!("📁 Code saved to: {}", summary.code_path);
            println!("📁 Response saved to: {}", summary.response_path);
            Ok(())
        }
        Err(e) => {
            println!("FAIL");
            fail(&e)
        }
    }
}
