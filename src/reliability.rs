//! Transport-level reliability: a circuit breaker for the remote endpoint and
//! an instrumented generator wrapper that enforces timeouts and emits metrics.
//!
//! Neither layer retries. Attempt counting belongs to the requester.

use crate::error::{AdvisorError, Result};
use crate::traits::{GenerationOptions, GenerationResult, GeneratorModel};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

/// Tunable parameters for [`CircuitBreaker`].
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the breaker opens.
    pub failure_threshold: u32,
    /// Time spent open before a single probe call is let through.
    pub open_wait: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_wait: Duration::from_secs(10),
        }
    }
}

struct Inner {
    state: State,
    failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
    config: CircuitBreakerConfig,
}

impl Inner {
    /// Decide whether a call may proceed; returns whether it is the half-open probe.
    fn admit(&mut self) -> Result<bool> {
        if self.state == State::Open {
            let waited = self
                .opened_at
                .is_some_and(|at| at.elapsed() >= self.config.open_wait);
            if !waited {
                return Err(AdvisorError::Unavailable);
            }
            self.state = State::HalfOpen;
        }
        if self.state == State::HalfOpen {
            if self.probe_in_flight {
                return Err(AdvisorError::Unavailable);
            }
            self.probe_in_flight = true;
            return Ok(true);
        }
        Ok(false)
    }

    fn record(&mut self, probe: bool, success: bool) {
        if probe {
            self.probe_in_flight = false;
        }
        if success {
            if probe {
                self.state = State::Closed;
            }
            if self.state == State::Closed {
                self.failures = 0;
            }
            return;
        }
        self.failures += 1;
        if probe || (self.state == State::Closed && self.failures >= self.config.failure_threshold)
        {
            self.state = State::Open;
            self.opened_at = Some(Instant::now());
        }
    }
}

/// Shared breaker that short-circuits calls to an endpoint that keeps failing.
///
/// Closed → (threshold consecutive failures) → Open → (wait elapsed) →
/// HalfOpen → probe succeeds → Closed, or probe fails → Open.
#[derive(Clone)]
pub struct CircuitBreaker {
    inner: Arc<Mutex<Inner>>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: State::Closed,
                failures: 0,
                opened_at: None,
                probe_in_flight: false,
                config,
            })),
        }
    }

    /// Execute `f` through the breaker.
    ///
    /// Returns [`AdvisorError::Unavailable`] without calling `f` while the
    /// breaker is open, or while another caller holds the half-open probe.
    pub async fn call<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let probe = self.inner.lock().unwrap().admit()?;
        let result = f().await;
        self.inner.lock().unwrap().record(probe, result.is_ok());
        result
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

/// Wrapper around a [`GeneratorModel`] that adds a per-call timeout and emits
/// `model_inference.duration_seconds`, `model_inference.total` and, when the
/// provider reports usage, `model_inference.tokens`.
pub struct InstrumentedGeneratorModel {
    pub inner: Arc<dyn GeneratorModel>,
    pub provider_id: String,
    pub timeout: Option<Duration>,
}

#[async_trait]
impl GeneratorModel for InstrumentedGeneratorModel {
    async fn generate(
        &self,
        messages: &[String],
        options: GenerationOptions,
    ) -> Result<GenerationResult> {
        let start = Instant::now();
        let fut = self.inner.generate(messages, options);

        let res = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut)
                .await
                .unwrap_or(Err(AdvisorError::Timeout)),
            None => fut.await,
        };

        let status = if res.is_ok() { "success" } else { "failure" };
        let model = self.inner.model_id().to_string();

        metrics::histogram!(
            "model_inference.duration_seconds",
            "task" => "generate",
            "provider" => self.provider_id.clone(),
            "model" => model.clone()
        )
        .record(start.elapsed().as_secs_f64());

        metrics::counter!(
            "model_inference.total",
            "task" => "generate",
            "provider" => self.provider_id.clone(),
            "model" => model,
            "status" => status
        )
        .increment(1);

        if let Ok(GenerationResult { usage: Some(usage), .. }) = &res {
            for (kind, tokens) in [
                ("prompt", usage.prompt_tokens),
                ("completion", usage.completion_tokens),
            ] {
                metrics::counter!(
                    "model_inference.tokens",
                    "provider" => self.provider_id.clone(),
                    "kind" => kind
                )
                .increment(tokens as u64);
            }
        }

        res
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
