//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    model: String,
    max_workers: usize,
    queue_size: usize,
    default_timeout_s: f64,
    temperature: f64,
    max_output_tokens: u32,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    model: config.gemini.model.clone(),
                    max_workers: config.dispatcher.max_workers,
                    queue_size: config.dispatcher.queue_size,
                    default_timeout_s: config.dispatcher.default_timeout_s,
                    temperature: config.generation.temperature,
                    max_output_tokens: config.generation.max_output_tokens,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &contracts::AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if std::env::var(&config.gemini.api_key_env).is_err() {
        warnings.push(format!(
            "Environment variable '{}' is not set - analyze will fail without --mock",
            config.gemini.api_key_env
        ));
    }

    if config.dispatcher.queue_size < config.dispatcher.max_workers {
        warnings.push(format!(
            "queue_size ({}) is smaller than max_workers ({}) - workers will starve under load",
            config.dispatcher.queue_size, config.dispatcher.max_workers
        ));
    }

    if config.dispatcher.default_timeout_s > 120.0 {
        warnings.push(format!(
            "default_timeout_s ({}) is very large - slow calls will hold workers for a long time",
            config.dispatcher.default_timeout_s
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Model: {}", summary.model);
            println!("  Workers: {}", summary.max_workers);
            println!("  Queue size: {}", summary.queue_size);
            println!("  Default timeout: {}s", summary.default_timeout_s);
            println!("  Temperature: {}", summary.temperature);
            println!("  Max output tokens: {}", summary.max_output_tokens);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
