//! Mock Analysis Demo
//!
//! Demonstrates driving the bounded worker pool with the offline mock
//! client: concurrent calls, a deliberately saturated pool, and the
//! final metrics snapshot.
//!
//! Run with: cargo run --bin mock_analysis [config_path]

use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::AppConfig;
use dispatcher::{Dispatcher, GenerateOptions};
use observability::DispatchStatsAggregator;
use provider::MockClient;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // ==== Stage 1: Load Configuration ====
    let mut config = if let Some(path) = std::env::args().nth(1) {
        info!(path = %path, "Loading configuration");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        AppConfig::default()
    };

    // Small pool so saturation is easy to demonstrate
    config.dispatcher.max_workers = 2;
    config.dispatcher.queue_size = 2;

    // ==== Stage 2: Build Dispatcher over the Mock Client ====
    let client = MockClient::new().with_delay(Duration::from_millis(200));
    let dispatcher = Dispatcher::new(client, config.dispatcher.clone());
    let model = dispatcher.create_model(
        &config.gemini.model,
        Some(config.safety.clone()),
        Some(config.generation.clone()),
    )?;

    info!(
        model = model.name(),
        workers = config.dispatcher.max_workers,
        queue = config.dispatcher.queue_size,
        "Dispatcher ready"
    );

    // ==== Stage 3: Fire Concurrent Analyses ====
    let mut stats = DispatchStatsAggregator::new();
    let mut handles = Vec::new();

    for i in 0..6 {
        let dispatcher = dispatcher.clone();
        let model = model.clone();
        handles.push(tokio::spawn(async move {
            let start = std::time::Instant::now();
            let result = dispatcher
                .generate(
                    &model,
                    format!("Suspicious message number {i}"),
                    GenerateOptions::default(),
                )
                .await;
            (result, start.elapsed())
        }));
    }

    for handle in handles {
        let (result, elapsed) = handle.await?;
        match result {
            Ok(response) => {
                stats.record_success(elapsed.as_secs_f64() * 1000.0);
                info!(
                    latency_ms = elapsed.as_millis() as u64,
                    answer_len = response.text().len(),
                    "Analysis completed"
                );
            }
            Err(e) => {
                stats.record_failure(&e);
                warn!(error = %e, "Analysis rejected or failed");
            }
        }
    }

    // ==== Stage 4: Report and Shut Down ====
    let snapshot = dispatcher.metrics();
    info!(
        total = snapshot.total_requests,
        failed = snapshot.failed_requests,
        queue_full = snapshot.queue_full,
        success_rate = format!("{:.2}", snapshot.success_rate),
        "Final dispatcher metrics"
    );
    print!("{}", stats.summary());

    let drain = dispatcher.clone();
    tokio::task::spawn_blocking(move || drain.shutdown()).await?;
    info!("Demo finished");

    Ok(())
}
