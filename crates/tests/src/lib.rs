//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（无需真实 API）
//! - 调度器计数语义回归

#[cfg(test)]
mod contract_tests {
    use contracts::{AppConfig, HarmBlockThreshold, HarmCategory};

    #[test]
    fn test_default_config_wiring() {
        let config = AppConfig::default();
        assert_eq!(config.dispatcher.max_workers, 5);
        assert_eq!(config.dispatcher.queue_size, 100);
        assert_eq!(config.dispatcher.default_timeout_s, 30.0);
        assert_eq!(config.gemini.model, "gemini-1.5-flash");

        // All four harm categories default to block-nothing
        for category in HarmCategory::ALL {
            assert_eq!(
                config.safety.threshold(category),
                HarmBlockThreshold::BlockNone
            );
        }
    }

    #[test]
    fn test_config_loader_feeds_dispatcher_config() {
        let toml = r#"
[dispatcher]
max_workers = 2
queue_size = 4
default_timeout_s = 1.5
"#;
        let config =
            config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml)
                .unwrap();
        assert_eq!(config.dispatcher.max_workers, 2);
        assert_eq!(
            config.dispatcher.default_timeout(),
            std::time::Duration::from_millis(1500)
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::{Duration, Instant};

    use contracts::DispatcherConfig;
    use dispatcher::{Dispatcher, DispatcherError, GenerateOptions};
    use provider::MockClient;

    fn test_config(max_workers: usize, queue_size: usize, timeout_s: f64) -> DispatcherConfig {
        DispatcherConfig {
            max_workers,
            queue_size,
            default_timeout_s: timeout_s,
        }
    }

    /// Happy path: one call through the pool, counters account for it
    #[tokio::test]
    async fn test_e2e_single_success() {
        let client = MockClient::new().with_response("OK");
        let dispatcher = Dispatcher::new(client, test_config(2, 10, 5.0));

        let model = dispatcher.create_model("test-model", None, None).unwrap();
        let response = dispatcher
            .generate(&model, "Test connection. Respond with 'OK'.", GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(response.text(), "OK");

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.failed_requests, 0);
        assert_eq!(snapshot.timeouts, 0);
        assert_eq!(snapshot.queue_full, 0);
        assert_eq!(snapshot.success_rate, 1.0);

        let drain = dispatcher.clone();
        tokio::task::spawn_blocking(move || drain.shutdown())
            .await
            .unwrap();
    }

    /// Fresh dispatcher reports all-zero metrics without division errors
    #[tokio::test]
    async fn test_fresh_metrics_are_zeroed() {
        let dispatcher = Dispatcher::new(MockClient::new(), test_config(1, 1, 1.0));
        let snapshot = dispatcher.metrics();

        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.failed_requests, 0);
        assert_eq!(snapshot.success_rate, 0.0);
        assert_eq!(snapshot.avg_processing_time_s, 0.0);
    }

    /// Two workers, queue of two: four slow calls are all admitted and
    /// all time out, and every counter accounts for all four
    #[tokio::test]
    async fn test_saturated_pool_all_calls_time_out() {
        let client = MockClient::new().with_delay(Duration::from_millis(500));
        let dispatcher = Dispatcher::new(client, test_config(2, 2, 0.1));
        let model = dispatcher.create_model("test-model", None, None).unwrap();

        let mut handles = Vec::new();
        for i in 0..4 {
            let dispatcher = dispatcher.clone();
            let model = model.clone();
            handles.push(tokio::spawn(async move {
                dispatcher
                    .generate(&model, format!("call {i}"), GenerateOptions::default())
                    .await
            }));
            // Stagger so the first two are picked up before the rest queue
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(
                matches!(result, Err(DispatcherError::Timeout { .. })),
                "expected timeout, got {result:?}"
            );
        }

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.total_requests, 4);
        assert_eq!(snapshot.failed_requests, 4);
        assert_eq!(snapshot.timeouts, 4);
        assert_eq!(snapshot.queue_full, 0);
        assert_eq!(snapshot.success_rate, 0.0);
    }

    /// A timed-out call returns near the deadline, not after the worker
    /// finishes its slow job
    #[tokio::test]
    async fn test_timeout_returns_promptly() {
        let client = MockClient::new().with_delay(Duration::from_millis(500));
        let dispatcher = Dispatcher::new(client, test_config(1, 1, 5.0));
        let model = dispatcher.create_model("test-model", None, None).unwrap();

        let options = GenerateOptions {
            timeout: Some(Duration::from_millis(50)),
            ..Default::default()
        };

        let start = Instant::now();
        let result = dispatcher.generate(&model, "slow", options).await;
        let elapsed = start.elapsed();

        assert!(matches!(result, Err(DispatcherError::Timeout { .. })));
        assert!(
            elapsed < Duration::from_millis(400),
            "timeout returned after {elapsed:?}"
        );
    }

    /// One worker, queue of one: the third concurrent call is rejected
    /// with QueueFull and exactly one rejection is counted
    #[tokio::test]
    async fn test_queue_full_rejection() {
        let client = MockClient::new().with_delay(Duration::from_millis(300));
        let dispatcher = Dispatcher::new(client, test_config(1, 1, 5.0));
        let model = dispatcher.create_model("test-model", None, None).unwrap();

        // Occupy the worker
        let first = {
            let dispatcher = dispatcher.clone();
            let model = model.clone();
            tokio::spawn(
                async move { dispatcher.generate(&model, "a", GenerateOptions::default()).await },
            )
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Fill the queue
        let second = {
            let dispatcher = dispatcher.clone();
            let model = model.clone();
            tokio::spawn(
                async move { dispatcher.generate(&model, "b", GenerateOptions::default()).await },
            )
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Rejected immediately
        let result = dispatcher
            .generate(&model, "c", GenerateOptions::default())
            .await;
        assert!(
            matches!(result, Err(DispatcherError::QueueFull { .. })),
            "expected queue-full, got {result:?}"
        );

        assert!(first.await.unwrap().is_ok());
        assert!(second.await.unwrap().is_ok());

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.queue_full, 1);
        assert_eq!(snapshot.timeouts, 0);
    }

    /// A blocked prompt surfaces its block reason as a generation error
    #[tokio::test]
    async fn test_blocked_prompt_reports_reason() {
        let client = MockClient::new().with_block_reason("SAFETY");
        let dispatcher = Dispatcher::new(client, test_config(1, 1, 5.0));
        let model = dispatcher.create_model("test-model", None, None).unwrap();

        let result = dispatcher
            .generate(&model, "blocked", GenerateOptions::default())
            .await;
        match result {
            Err(DispatcherError::Generation { reason }) => assert_eq!(reason, "SAFETY"),
            other => panic!("expected generation error, got {other:?}"),
        }

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.failed_requests, 1);
    }

    /// Calls after shutdown fail fast with Closed
    #[tokio::test]
    async fn test_closed_dispatcher_rejects_calls() {
        let dispatcher = Dispatcher::new(MockClient::new(), test_config(1, 1, 5.0));
        let model = dispatcher.create_model("test-model", None, None).unwrap();

        let drain = dispatcher.clone();
        tokio::task::spawn_blocking(move || drain.shutdown())
            .await
            .unwrap();

        let start = Instant::now();
        let result = dispatcher
            .generate(&model, "late", GenerateOptions::default())
            .await;
        assert!(matches!(result, Err(DispatcherError::Closed)));
        assert!(start.elapsed() < Duration::from_millis(100));

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.failed_requests, 1);
    }

    /// Mixed outcomes: success rate reflects failures
    #[tokio::test]
    async fn test_mixed_outcome_accounting() {
        let client = MockClient::new()
            .with_response("fine")
            .with_delay(Duration::from_millis(150));
        let dispatcher = Dispatcher::new(client, test_config(2, 4, 5.0));
        let model = dispatcher.create_model("test-model", None, None).unwrap();

        for _ in 0..3 {
            dispatcher
                .generate(&model, "ok", GenerateOptions::default())
                .await
                .unwrap();
        }

        // Deadline well inside the mock's injected delay
        let options = GenerateOptions {
            timeout: Some(Duration::from_millis(30)),
            ..Default::default()
        };
        let result = dispatcher.generate(&model, "doomed", options).await;
        assert!(matches!(result, Err(DispatcherError::Timeout { .. })));

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.total_requests, 4);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.timeouts, 1);
        assert!((snapshot.success_rate - 0.75).abs() < 1e-9);
    }

    /// Aggregator summary lines up with dispatcher outcomes
    #[tokio::test]
    async fn test_stats_aggregator_tracks_outcomes() {
        let client = MockClient::new().with_response("done");
        let dispatcher = Dispatcher::new(client, test_config(1, 2, 5.0));
        let model = dispatcher.create_model("test-model", None, None).unwrap();
        let mut stats = observability::DispatchStatsAggregator::new();

        let start = Instant::now();
        match dispatcher
            .generate(&model, "hello", GenerateOptions::default())
            .await
        {
            Ok(_) => stats.record_success(start.elapsed().as_secs_f64() * 1000.0),
            Err(e) => stats.record_failure(&e),
        }

        let summary = stats.summary();
        assert_eq!(summary.total_requests, 1);
        assert_eq!(summary.successes, 1);
        assert_eq!(summary.success_rate, 100.0);
        assert_eq!(summary.latency_ms.count, 1);
    }
}
