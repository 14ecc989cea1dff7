//! Dispatcher - bounded async-to-thread bridge for model calls
//!
//! Async callers submit generation requests; a fixed set of OS worker
//! threads executes each call inside its own current-thread runtime. The
//! underlying client future must never share an execution context with
//! another in-flight call, so the runtime is created and torn down per
//! call, never reused.
//!
//! Known limitation: timeout is non-preemptive. A caller that times out
//! abandons its worker; the worker keeps running until the model call
//! finishes naturally and its result is discarded, so an abandoned call
//! reduces effective pool capacity for that duration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

use contracts::{
    ContractError, DispatcherConfig, GenerationClient, GenerationConfig, GenerationRequest,
    GenerationResponse, ModelHandle, SafetySettings,
};

use crate::error::DispatcherError;
use crate::metrics::{DispatcherMetrics, MetricsSnapshot};

/// Boxed unit of work executed on a worker thread
type Job = Box<dyn FnOnce() + Send + 'static>;

/// Per-call overrides for [`Dispatcher::generate`]
///
/// Any field left `None` falls back to the model handle's stored
/// defaults (or the dispatcher's default timeout).
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Override generation parameters for this call
    pub generation: Option<GenerationConfig>,
    /// Override safety policy for this call
    pub safety: Option<SafetySettings>,
    /// Override timeout for this call
    pub timeout: Option<Duration>,
}

/// Bounded worker-pool dispatcher mediating access to the model client
///
/// Cheaply cloneable handle over shared state; construct once at startup,
/// call [`Dispatcher::shutdown`] once at process exit.
pub struct Dispatcher<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<C> {
    client: C,
    config: DispatcherConfig,
    metrics: DispatcherMetrics,
    closed: AtomicBool,
    /// Job submission side; taken on shutdown so workers drain and exit
    job_tx: Mutex<Option<mpsc::Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<C> Dispatcher<C>
where
    C: GenerationClient + Sync + 'static,
{
    /// Create a dispatcher and eagerly spawn its worker threads
    #[instrument(
        name = "dispatcher_new",
        skip(client, config),
        fields(
            max_workers = config.max_workers,
            queue_size = config.queue_size,
            default_timeout_s = config.default_timeout_s
        )
    )]
    pub fn new(client: C, config: DispatcherConfig) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let mut workers = Vec::with_capacity(config.max_workers);
        for worker_id in 0..config.max_workers {
            let job_rx = Arc::clone(&job_rx);
            let handle = std::thread::Builder::new()
                .name(format!("gemini-worker-{worker_id}"))
                .spawn(move || worker_loop(worker_id, job_rx))
                .expect("failed to spawn dispatcher worker thread");
            workers.push(handle);
        }

        info!(
            max_workers = config.max_workers,
            queue_size = config.queue_size,
            default_timeout_s = config.default_timeout_s,
            "Dispatcher started"
        );

        Self {
            inner: Arc::new(Inner {
                client,
                config,
                metrics: DispatcherMetrics::new(),
                closed: AtomicBool::new(false),
                job_tx: Mutex::new(Some(job_tx)),
                workers: Mutex::new(workers),
            }),
        }
    }

    /// Create a model handle with effective settings resolved
    ///
    /// Delegates to the client; absent overrides fall back to the global
    /// defaults (block-nothing safety, default generation profile).
    #[instrument(name = "dispatcher_create_model", skip(self, safety, generation), fields(model = name))]
    pub fn create_model(
        &self,
        name: &str,
        safety: Option<SafetySettings>,
        generation: Option<GenerationConfig>,
    ) -> Result<ModelHandle, DispatcherError> {
        self.inner
            .client
            .create_model(name, safety, generation)
            .map_err(|e| {
                error!(model = name, error = %e, "Model creation failed");
                DispatcherError::model_creation(name, e.to_string())
            })
    }

    /// Execute one generation call on the worker pool
    ///
    /// Resolution order for parameters and safety policy: per-call
    /// override, else the handle's stored defaults. Timeout: per-call
    /// override, else the dispatcher default. The raw response is returned
    /// unmodified; the dispatcher performs no interpretation beyond
    /// blocked-prompt detection.
    #[instrument(name = "dispatcher_generate", skip_all, fields(model = model.name()))]
    pub async fn generate(
        &self,
        model: &ModelHandle,
        prompt: impl Into<String>,
        options: GenerateOptions,
    ) -> Result<GenerationResponse, DispatcherError> {
        let inner = &self.inner;
        let start = Instant::now();
        inner.metrics.inc_total_requests();

        if inner.closed.load(Ordering::Acquire) {
            inner.metrics.inc_failed_requests();
            return Err(DispatcherError::Closed);
        }

        let generation = options
            .generation
            .unwrap_or_else(|| model.generation().clone());
        let safety = options.safety.unwrap_or_else(|| model.safety().clone());
        let timeout = options
            .timeout
            .unwrap_or_else(|| inner.config.default_timeout());

        // Admission control: instantaneous capacity check, never blocks.
        // `queued` counts calls admitted but not yet picked up by a worker.
        if !inner.metrics.try_enqueue(inner.config.queue_size) {
            inner.metrics.inc_queue_full();
            inner.metrics.inc_failed_requests();
            warn!(
                capacity = inner.config.queue_size,
                "Dispatch queue full, call rejected"
            );
            return Err(DispatcherError::QueueFull {
                queued: inner.metrics.queued(),
                capacity: inner.config.queue_size,
            });
        }

        let request = GenerationRequest {
            model: model.clone(),
            prompt: prompt.into(),
            generation,
            safety,
        };
        let (result_tx, result_rx) = oneshot::channel();

        let job_inner = Arc::clone(inner);
        let job: Job = Box::new(move || {
            job_inner.metrics.dequeue();
            let result = run_on_fresh_runtime(&job_inner.client, &request);
            // Send fails when the caller timed out and dropped the
            // receiver; the late result is discarded.
            let _ = result_tx.send(result);
        });

        if !self.submit(job) {
            inner.metrics.dequeue();
            inner.metrics.inc_failed_requests();
            return Err(DispatcherError::Closed);
        }

        match tokio::time::timeout(timeout, result_rx).await {
            Err(_elapsed) => {
                inner.metrics.inc_timeouts();
                inner.metrics.inc_failed_requests();
                warn!(
                    timeout_secs = timeout.as_secs_f64(),
                    "Generation timed out, worker abandoned"
                );
                Err(DispatcherError::Timeout {
                    timeout_secs: timeout.as_secs_f64(),
                })
            }
            Ok(Err(_recv)) => {
                // Worker dropped the sender without a result (panic in job)
                inner.metrics.inc_failed_requests();
                error!("Worker terminated without producing a result");
                Err(DispatcherError::generation(
                    "worker terminated without producing a result",
                ))
            }
            Ok(Ok(Err(e))) => {
                inner.metrics.inc_failed_requests();
                let reason = match e {
                    ContractError::Blocked { reason } => reason,
                    other => other.to_string(),
                };
                error!(reason = %reason, "Generation failed");
                Err(DispatcherError::Generation { reason })
            }
            Ok(Ok(Ok(response))) => {
                let elapsed = start.elapsed();
                inner.metrics.add_processing_time(elapsed);
                debug!(
                    elapsed_s = elapsed.as_secs_f64(),
                    "Generation completed"
                );
                Ok(response)
            }
        }
    }

    /// Snapshot of dispatcher metrics (non-blocking, non-destructive)
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// True once shutdown has begun
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Shut down the worker pool, draining already-admitted work
    ///
    /// Blocks the calling thread until every worker has finished its
    /// remaining jobs. Idempotent: subsequent calls return immediately.
    /// In-flight work is never forcibly cancelled.
    #[instrument(name = "dispatcher_shutdown", skip(self))]
    pub fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            debug!("Dispatcher already shut down");
            return;
        }

        info!("Shutting down dispatcher, draining in-flight work");

        // Drop the submission side; workers exit once the queue is drained
        if let Ok(mut guard) = self.inner.job_tx.lock() {
            guard.take();
        }

        let workers = match self.inner.workers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        };
        for handle in workers {
            if handle.join().is_err() {
                error!("Worker thread panicked during drain");
            }
        }

        info!("Dispatcher shutdown complete");
    }

    /// Hand a job to the worker pool; false when shutdown already began
    fn submit(&self, job: Job) -> bool {
        let guard = match self.inner.job_tx.lock() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        match guard.as_ref() {
            Some(tx) => tx.send(job).is_ok(),
            None => false,
        }
    }
}

/// Drive one generation call to completion on a fresh runtime
///
/// Each call gets its own current-thread runtime, created and torn down
/// here, so no client state leaks between calls sharing a worker thread.
fn run_on_fresh_runtime<C: GenerationClient>(
    client: &C,
    request: &GenerationRequest,
) -> Result<GenerationResponse, ContractError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ContractError::Other(format!("worker runtime build failed: {e}")))?;

    runtime.block_on(async {
        let response = client.generate(request).await?;
        if let Some(reason) = response.block_reason() {
            warn!(block_reason = reason, "Prompt blocked by content filter");
            return Err(ContractError::blocked(reason));
        }
        Ok(response)
    })
}

/// Worker loop: pull jobs off the shared queue until it closes
fn worker_loop(worker_id: usize, job_rx: Arc<Mutex<mpsc::Receiver<Job>>>) {
    debug!(worker_id, "Dispatcher worker started");

    loop {
        // Lock only while waiting for the next job; execution happens
        // outside the lock so workers run jobs in parallel.
        let job = {
            let guard = match job_rx.lock() {
                Ok(guard) => guard,
                Err(_) => break,
            };
            match guard.recv() {
                Ok(job) => job,
                Err(_) => break,
            }
        };
        job();
    }

    debug!(worker_id, "Dispatcher worker stopped");
}
