//! `analyze` command implementation.

use std::io::Read;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, warn};

use contracts::{AppConfig, GenerationClient};
use dispatcher::{Dispatcher, DispatcherError, GenerateOptions};
use observability::DispatchStatsAggregator;
use provider::MockClient;

use crate::analysis::{build_analysis_prompt, AnalysisOutcome};
use crate::cli::AnalyzeArgs;
use crate::error::CliError;

/// Execute the `analyze` command
pub async fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = load_config(args)?;
    let message = read_message(args)?;

    info!(
        model = %config.gemini.model,
        max_workers = config.dispatcher.max_workers,
        queue_size = config.dispatcher.queue_size,
        message_len = message.len(),
        "Starting analysis"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    if args.mock {
        info!("Using offline mock client");
        let client = MockClient::new();
        return run_with_client(client, config, args, &message).await;
    }

    #[cfg(feature = "gemini-api")]
    {
        let client = provider::GeminiClient::from_env(&config.gemini).map_err(|_| {
            CliError::missing_api_key(config.gemini.api_key_env.clone())
        })?;

        if args.check_connection {
            client
                .check_connection(&config.gemini.model)
                .await
                .context("Gemini connection test failed")?;
        }

        run_with_client(client, config, args, &message).await
    }

    #[cfg(not(feature = "gemini-api"))]
    {
        anyhow::bail!("Built without gemini-api support; rerun with --mock")
    }
}

/// Load configuration, falling back to defaults when the default path
/// does not exist. An explicitly-given missing path is an error.
fn load_config(args: &AnalyzeArgs) -> Result<AppConfig> {
    let mut config = if args.config.exists() {
        config_loader::ConfigLoader::load_from_path(&args.config)
            .with_context(|| format!("Failed to load config from {}", args.config.display()))?
    } else if args.config.as_os_str() == "config.toml" {
        info!("No config file found, using built-in defaults");
        AppConfig::default()
    } else {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    };

    if let Some(ref model) = args.model {
        info!(model = %model, "Overriding model from CLI");
        config.gemini.model = model.clone();
    }

    Ok(config)
}

/// Resolve the message text from the argument, a file, or stdin
fn read_message(args: &AnalyzeArgs) -> Result<String> {
    let message = if let Some(ref text) = args.message {
        text.clone()
    } else if let Some(ref path) = args.file {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read message from {}", path.display()))?
    } else {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    };

    if message.trim().is_empty() {
        return Err(CliError::MissingInput.into());
    }
    Ok(message)
}

/// Dispatch the analysis through the worker pool and render the verdict
async fn run_with_client<C>(
    client: C,
    config: AppConfig,
    args: &AnalyzeArgs,
    message: &str,
) -> Result<()>
where
    C: GenerationClient + Sync + 'static,
{
    let dispatcher = Dispatcher::new(client, config.dispatcher.clone());
    let mut stats = DispatchStatsAggregator::new();

    let result = analyze_once(&dispatcher, &config, args, message, &mut stats).await;

    let snapshot = dispatcher.metrics();
    observability::record_dispatch_snapshot(&snapshot);

    if args.metrics {
        println!("\n=== Dispatcher Metrics ===");
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize metrics")?
        );
        print!("\n{}", stats.summary());
    }

    // Worker threads block on join; keep that off the async runtime
    let drain = dispatcher.clone();
    tokio::task::spawn_blocking(move || drain.shutdown())
        .await
        .map_err(|e| CliError::shutdown(e.to_string()))?;

    let outcome = result?;
    print_outcome(&outcome, args.json)?;
    Ok(())
}

/// Run a single analysis call and record its outcome
async fn analyze_once<C>(
    dispatcher: &Dispatcher<C>,
    config: &AppConfig,
    args: &AnalyzeArgs,
    message: &str,
    stats: &mut DispatchStatsAggregator,
) -> Result<AnalysisOutcome>
where
    C: GenerationClient + Sync + 'static,
{
    let model = dispatcher.create_model(
        &config.gemini.model,
        Some(config.safety.clone()),
        Some(config.generation.clone()),
    )?;

    let options = GenerateOptions {
        timeout: (args.timeout > 0.0).then(|| Duration::from_secs_f64(args.timeout)),
        ..Default::default()
    };

    let prompt = build_analysis_prompt(message);
    observability::record_request(config.gemini.model.as_str());

    let start = Instant::now();
    let result = dispatcher.generate(&model, prompt, options).await;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(response) => {
            stats.record_success(latency_ms);
            observability::record_request_outcome("success");
            observability::record_request_latency_ms(latency_ms);

            let text = response.text();
            if text.is_empty() {
                warn!("Model returned an empty answer");
                return Err(CliError::analysis("model returned an empty answer").into());
            }
            Ok(AnalysisOutcome::from_response_text(&text))
        }
        Err(e) => {
            stats.record_failure(&e);
            observability::record_request_outcome(outcome_label(&e));
            Err(e).context("Analysis request failed")
        }
    }
}

/// Metrics label for a failed request
fn outcome_label(error: &DispatcherError) -> &'static str {
    match error {
        DispatcherError::Timeout { .. } => "timeout",
        DispatcherError::QueueFull { .. } => "queue_full",
        DispatcherError::Closed => "closed",
        DispatcherError::ModelCreation { .. } => "model_creation_error",
        DispatcherError::Generation { .. } => "generation_error",
    }
}

/// Render the verdict to stdout
fn print_outcome(outcome: &AnalysisOutcome, json: bool) -> Result<()> {
    match outcome {
        AnalysisOutcome::Structured(verdict) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(verdict).context("Failed to serialize verdict")?
                );
            } else {
                println!("\n=== Analysis Verdict ===\n");
                println!("Risk level: {}", verdict.risk_level);
                if !verdict.summary.is_empty() {
                    println!("Summary: {}", verdict.summary);
                }
                if !verdict.alerts.is_empty() {
                    println!("Alerts:");
                    for alert in &verdict.alerts {
                        println!("  - {alert}");
                    }
                }
                if !verdict.recommendation.is_empty() {
                    println!("Recommendation: {}", verdict.recommendation);
                }
                println!();
            }
        }
        AnalysisOutcome::Unstructured(text) => {
            warn!("Model answer was not valid JSON, printing raw text");
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "raw_response": text })
                );
            } else {
                println!("\n{text}\n");
            }
        }
    }
    Ok(())
}
