//! 调度指标收集模块
//!
//! 基于 MetricsSnapshot 和单次请求结果收集调度器的运行指标。

use dispatcher::{DispatcherError, MetricsSnapshot};
use metrics::{counter, gauge, histogram};

/// 从 MetricsSnapshot 记录指标
///
/// 周期性调用（或每次请求完成后调用）将调度器内部计数导出到
/// Prometheus。快照里的计数是累计值，因此用 gauge 表达。
pub fn record_dispatch_snapshot(snapshot: &MetricsSnapshot) {
    gauge!("scamlens_dispatcher_requests_total").set(snapshot.total_requests as f64);
    gauge!("scamlens_dispatcher_requests_failed_total").set(snapshot.failed_requests as f64);
    gauge!("scamlens_dispatcher_timeouts_total").set(snapshot.timeouts as f64);
    gauge!("scamlens_dispatcher_queue_full_total").set(snapshot.queue_full as f64);
    gauge!("scamlens_dispatcher_queued").set(snapshot.queued as f64);
    gauge!("scamlens_dispatcher_success_rate").set(snapshot.success_rate);
    gauge!("scamlens_dispatcher_avg_processing_time_s").set(snapshot.avg_processing_time_s);
}

/// 记录一次请求提交
pub fn record_request(model: &str) {
    counter!(
        "scamlens_requests_total",
        "model" => model.to_string()
    )
    .increment(1);
}

/// 记录请求结果
pub fn record_request_outcome(outcome: &str) {
    counter!(
        "scamlens_requests_outcome_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// 记录单次请求延迟
pub fn record_request_latency_ms(latency_ms: f64) {
    histogram!("scamlens_request_latency_ms").record(latency_ms);
}

/// 记录等待队列深度
pub fn record_queue_depth(depth: usize) {
    gauge!("scamlens_queue_depth").set(depth as f64);
}

/// 调度统计聚合器
///
/// 在内存中聚合请求结果，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// 总请求数
    pub total_requests: u64,

    /// 成功请求数
    pub successes: u64,

    /// 超时次数
    pub timeouts: u64,

    /// 队列满拒绝次数
    pub queue_full: u64,

    /// 其他失败次数
    pub other_failures: u64,

    /// 成功请求的延迟统计 (毫秒)
    pub latency_stats: RunningStats,
}

impl DispatchStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次成功请求
    pub fn record_success(&mut self, latency_ms: f64) {
        self.total_requests += 1;
        self.successes += 1;
        self.latency_stats.push(latency_ms);
    }

    /// 记录一次失败请求
    pub fn record_failure(&mut self, error: &DispatcherError) {
        self.total_requests += 1;
        match error {
            DispatcherError::Timeout { .. } => self.timeouts += 1,
            DispatcherError::QueueFull { .. } => self.queue_full += 1,
            _ => self.other_failures += 1,
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> DispatchSummary {
        DispatchSummary {
            total_requests: self.total_requests,
            successes: self.successes,
            timeouts: self.timeouts,
            queue_full: self.queue_full,
            other_failures: self.other_failures,
            success_rate: if self.total_requests > 0 {
                self.successes as f64 / self.total_requests as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 调度摘要
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub total_requests: u64,
    pub successes: u64,
    pub timeouts: u64,
    pub queue_full: u64,
    pub other_failures: u64,
    pub success_rate: f64,
    pub latency_ms: StatsSummary,
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Total requests: {}", self.total_requests)?;
        writeln!(
            f,
            "Successes: {} ({:.2}%)",
            self.successes, self.success_rate
        )?;
        writeln!(f, "Timeouts: {}", self.timeouts)?;
        writeln!(f, "Queue-full rejections: {}", self.queue_full)?;
        writeln!(f, "Other failures: {}", self.other_failures)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_mixed_outcomes() {
        let mut aggregator = DispatchStatsAggregator::new();

        aggregator.record_success(120.0);
        aggregator.record_success(80.0);
        aggregator.record_failure(&DispatcherError::Timeout { timeout_secs: 30.0 });
        aggregator.record_failure(&DispatcherError::QueueFull {
            queued: 100,
            capacity: 100,
        });

        assert_eq!(aggregator.total_requests, 4);
        assert_eq!(aggregator.successes, 2);
        assert_eq!(aggregator.timeouts, 1);
        assert_eq!(aggregator.queue_full, 1);
        assert_eq!(aggregator.other_failures, 0);
        assert_eq!(aggregator.latency_stats.count(), 2);
    }

    #[test]
    fn test_empty_aggregator_summary() {
        let aggregator = DispatchStatsAggregator::new();
        let summary = aggregator.summary();
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.latency_ms.count, 0);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = DispatchStatsAggregator::new();
        aggregator.record_success(100.0);
        aggregator.record_failure(&DispatcherError::Closed);

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Total requests: 2"));
        assert!(output.contains("50.00%"));
        assert!(output.contains("Other failures: 1"));
    }
}
