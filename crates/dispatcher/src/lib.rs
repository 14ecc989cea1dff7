//! # Dispatcher
//!
//! 模型调用调度模块。
//!
//! 负责：
//! - 接收来自任意数量异步调用方的生成请求
//! - 固定大小 worker 线程池，每次调用独立 event loop
//! - 队列准入控制、超时处理与指标统计
//! - 优雅排空关闭

pub mod dispatcher;
pub mod error;
pub mod metrics;

pub use contracts::{GenerationClient, GenerationResponse, ModelHandle};
pub use dispatcher::{Dispatcher, GenerateOptions};
pub use error::DispatcherError;
pub use metrics::{DispatcherMetrics, MetricsSnapshot};
