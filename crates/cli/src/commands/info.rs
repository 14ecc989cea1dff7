//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    gemini: GeminiInfo,
    dispatcher: DispatcherInfo,
    generation: GenerationInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    safety: Option<Vec<SafetyInfo>>,
}

#[derive(Serialize)]
struct GeminiInfo {
    model: String,
    api_key_env: String,
    api_key_present: bool,
}

#[derive(Serialize)]
struct DispatcherInfo {
    max_workers: usize,
    queue_size: usize,
    default_timeout_s: f64,
}

#[derive(Serialize)]
struct GenerationInfo {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetyInfo {
    category: String,
    threshold: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = if args.config.exists() {
        config_loader::ConfigLoader::load_from_path(&args.config)
            .with_context(|| format!("Failed to load config from {}", args.config.display()))?
    } else {
        contracts::AppConfig::default()
    };

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &contracts::AppConfig, args: &InfoArgs) -> ConfigInfo {
    let safety = if args.safety {
        Some(
            config
                .safety
                .iter()
                .map(|(category, threshold)| SafetyInfo {
                    category: category.api_name().to_string(),
                    threshold: threshold.api_name().to_string(),
                })
                .collect(),
        )
    } else {
        None
    };

    ConfigInfo {
        gemini: GeminiInfo {
            model: config.gemini.model.clone(),
            api_key_env: config.gemini.api_key_env.clone(),
            api_key_present: std::env::var(&config.gemini.api_key_env).is_ok(),
        },
        dispatcher: DispatcherInfo {
            max_workers: config.dispatcher.max_workers,
            queue_size: config.dispatcher.queue_size,
            default_timeout_s: config.dispatcher.default_timeout_s,
        },
        generation: GenerationInfo {
            temperature: config.generation.temperature,
            top_p: config.generation.top_p,
            top_k: config.generation.top_k,
            max_output_tokens: config.generation.max_output_tokens,
        },
        safety,
    }
}

fn print_config_info(config: &contracts::AppConfig, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  ScamLens Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Gemini
    println!("🤖 Gemini");
    println!("   ├─ Model: {}", config.gemini.model);
    println!("   ├─ API key env: {}", config.gemini.api_key_env);
    let key_state = if std::env::var(&config.gemini.api_key_env).is_ok() {
        "present"
    } else {
        "NOT SET"
    };
    println!("   └─ API key: {}", key_state);

    // Dispatcher
    println!("\n⚙️  Dispatcher");
    println!("   ├─ Workers: {}", config.dispatcher.max_workers);
    println!("   ├─ Queue size: {}", config.dispatcher.queue_size);
    println!(
        "   └─ Default timeout: {}s",
        config.dispatcher.default_timeout_s
    );

    // Generation
    println!("\n📝 Generation");
    println!("   ├─ Temperature: {}", config.generation.temperature);
    match config.generation.top_p {
        Some(top_p) => println!("   ├─ Top-p: {}", top_p),
        None => println!("   ├─ Top-p: (default)"),
    }
    match config.generation.top_k {
        Some(top_k) => println!("   ├─ Top-k: {}", top_k),
        None => println!("   ├─ Top-k: (default)"),
    }
    println!(
        "   └─ Max output tokens: {}",
        config.generation.max_output_tokens
    );

    // Safety
    if args.safety {
        println!("\n🛡️  Safety Settings");
        let entries: Vec<_> = config.safety.iter().collect();
        for (i, (category, threshold)) in entries.iter().enumerate() {
            let prefix = if i == entries.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!(
                "   {} {}: {}",
                prefix,
                category.api_name(),
                threshold.api_name()
            );
        }
    }

    println!();
}
