//! Polling loop and the handle that owns it

use crate::buffer::TimeSeriesBuffer;
use crate::config::{OverlapPolicy, PollerConfig};
use crate::error::{PollerError, Result};
use crate::metrics::{MetricsCollector, PollerMetrics};
use crate::sample::PriceSample;
use crate::source::SymbolSource;
use chrono::Local;
use market_data::{normalize_symbols, PriceFetch};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Something observable that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PollEvent {
    /// A sample was appended to the buffer
    Sample { tick: u64, sample: PriceSample },

    /// The symbol set was empty and the buffer was emptied
    Cleared { tick: u64, removed: usize },

    /// The fetch failed; the tick added nothing
    FetchFailed { tick: u64, error: String },
}

/// Snapshot of the poller for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollerStatus {
    pub running: bool,

    /// Error from the most recent tick, cleared when the next tick starts
    pub last_error: Option<String>,

    pub buffered: usize,
    pub metrics: PollerMetrics,
}

struct PollState {
    buffer: TimeSeriesBuffer,
    last_error: Option<String>,
    stopped: bool,
}

struct Shared {
    config: PollerConfig,
    state: Mutex<PollState>,
    metrics: MetricsCollector,
    events: broadcast::Sender<PollEvent>,
}

impl Shared {
    /// Mutate the tick state unless the poller has been stopped
    ///
    /// `stop` flips the flag under the same lock, so nothing lands after it returns.
    /// Returns `false` once stopped.
    fn apply(&self, f: impl FnOnce(&mut PollState) -> Option<PollEvent>) -> bool {
        let mut state = self.state.lock();
        if state.stopped {
            return false;
        }
        if let Some(event) = f(&mut state) {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
        true
    }

    async fn tick(&self, source: &dyn SymbolSource, prices: &dyn PriceFetch) -> bool {
        let tick = self.metrics.record_tick_started();

        if !self.apply(|state| {
            state.last_error = None;
            None
        }) {
            return false;
        }

        let symbols = match source.symbols() {
            Ok(symbols) => normalize_symbols(&symbols),
            Err(e) => {
                warn!(tick, error = %e, "Symbol source failed, polling as if nothing is selected");
                self.metrics.record_symbol_source_failure();
                Vec::new()
            }
        };

        if symbols.is_empty() {
            self.metrics.record_empty_tick();
            return self.apply(|state| {
                let removed = state.buffer.clear();
                (removed > 0).then(|| {
                    debug!(tick, removed, "No symbols selected, price history cleared");
                    PollEvent::Cleared { tick, removed }
                })
            });
        }

        let started = Instant::now();
        let result = prices.fetch(&symbols).await;
        self.metrics.record_fetch_latency(started.elapsed());

        match result {
            Ok(fetched) => {
                let sample = PriceSample::from_fetch(&symbols, &fetched, Local::now());
                if sample.prices.len() < symbols.len() {
                    debug!(tick, requested = symbols.len(), priced = sample.prices.len(), "Partial price data");
                }
                self.apply(|state| {
                    state.buffer.push(sample.clone());
                    self.metrics.record_sample();
                    Some(PollEvent::Sample { tick, sample })
                })
            }
            Err(e) => {
                let error = e.to_string();
                warn!(tick, error = %error, "Price fetch failed");
                self.apply(|state| {
                    state.last_error = Some(error.clone());
                    self.metrics.record_fetch_failure();
                    Some(PollEvent::FetchFailed { tick, error })
                })
            }
        }
    }
}

async fn run(shared: Arc<Shared>, source: Arc<dyn SymbolSource>, prices: Arc<dyn PriceFetch>) {
    let period = shared.config.interval();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(shared.config.overlap.missed_tick_behavior());

    loop {
        // The first tick completes immediately
        let deadline = interval.tick().await;

        let late = Instant::now().saturating_duration_since(deadline);
        let missed = (late.as_nanos() / period.as_nanos()) as u64;
        if missed > 0 && shared.config.overlap == OverlapPolicy::Skip {
            debug!(missed, "Previous fetch outlasted the interval, deadlines skipped");
            shared.metrics.record_skipped(missed);
        }

        if !shared.tick(source.as_ref(), prices.as_ref()).await {
            break;
        }
    }

    debug!("Polling loop exited");
}

/// Starts price polling loops
pub struct PricePoller;

impl PricePoller {
    /// Spawn the polling loop on the current Tokio runtime
    ///
    /// The first tick runs immediately; later ticks follow `config.interval()`.
    /// The returned handle stops the loop when dropped.
    pub fn start(
        source: Arc<dyn SymbolSource>,
        prices: Arc<dyn PriceFetch>,
        config: PollerConfig,
    ) -> Result<PollerHandle> {
        Self::start_subscribed(source, prices, config).map(|(handle, _)| handle)
    }

    /// Like [`start`](Self::start), with a receiver subscribed before the first tick
    pub fn start_subscribed(
        source: Arc<dyn SymbolSource>,
        prices: Arc<dyn PriceFetch>,
        config: PollerConfig,
    ) -> Result<(PollerHandle, broadcast::Receiver<PollEvent>)> {
        config.validate().map_err(PollerError::Config)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| PollerError::NoRuntime)?;

        let (events, receiver) = broadcast::channel(config.event_capacity);
        let shared = Arc::new(Shared {
            state: Mutex::new(PollState {
                buffer: TimeSeriesBuffer::new(config.buffer_capacity),
                last_error: None,
                stopped: false,
            }),
            metrics: MetricsCollector::new(config.buffer_capacity),
            events,
            config,
        });

        info!(
            interval_ms = shared.config.interval_ms,
            buffer_capacity = shared.config.buffer_capacity,
            overlap = ?shared.config.overlap,
            "Price poller started"
        );

        let task = runtime.spawn(run(shared.clone(), source, prices));
        Ok((PollerHandle { shared, task: Mutex::new(Some(task)) }, receiver))
    }
}

/// Owner of a running polling loop
pub struct PollerHandle {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollerHandle {
    /// Buffered samples, oldest first
    pub fn samples(&self) -> Vec<PriceSample> {
        self.shared.state.lock().buffer.to_vec()
    }

    pub fn latest(&self) -> Option<PriceSample> {
        self.shared.state.lock().buffer.latest().cloned()
    }

    pub fn last_error(&self) -> Option<String> {
        self.shared.state.lock().last_error.clone()
    }

    pub fn status(&self) -> PollerStatus {
        let (running, last_error, buffered) = {
            let state = self.shared.state.lock();
            (!state.stopped, state.last_error.clone(), state.buffer.len())
        };
        PollerStatus { running, last_error, buffered, metrics: self.metrics() }
    }

    pub fn metrics(&self) -> PollerMetrics {
        self.shared.metrics.snapshot()
    }

    pub fn config(&self) -> &PollerConfig {
        &self.shared.config
    }

    /// Receive tick events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.shared.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        !self.shared.state.lock().stopped
    }

    /// Stop the loop; safe to call any number of times
    ///
    /// Once this returns no further sample, clear or error is applied.
    pub fn stop(&self) {
        let was_running = {
            let mut state = self.shared.state.lock();
            !std::mem::replace(&mut state.stopped, true)
        };

        if let Some(task) = self.task.lock().take() {
            task.abort();
        }

        if was_running {
            let metrics = self.metrics();
            info!(
                ticks = metrics.ticks_started,
                samples = metrics.samples_appended,
                failures = metrics.fetch_failures,
                "Price poller stopped"
            );
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
