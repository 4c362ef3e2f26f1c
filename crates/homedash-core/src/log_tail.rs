use crate::gateway::GatewayFuture;
use crate::log_buffer::{LogBuffer, parse_batch};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Where the raw log text comes from.
pub trait LogSource: Send + Sync {
    fn fetch(&self) -> GatewayFuture<'_, String>;
}

/// Wall clock used by the merge gate, in milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u128;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TailerConfig {
    pub period: Duration,
    pub highlight_delay: Duration,
}

impl Default for TailerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(2000),
            highlight_delay: Duration::from_millis(2000),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Merged(usize),
    /// The gate saw no clock progress since the previous cycle.
    Discarded,
}

#[derive(Default)]
struct CycleState {
    batch: u64,
    last_stamp: u128,
}

/// Polls a [`LogSource`] on a fixed period and appends what it returns to a [`LogBuffer`].
#[derive(Clone)]
pub struct LogTailer {
    source: Arc<dyn LogSource>,
    clock: Arc<dyn Clock>,
    buffer: LogBuffer,
    config: TailerConfig,
    cycle: Arc<Mutex<CycleState>>,
}

impl LogTailer {
    pub fn new(source: Arc<dyn LogSource>, config: TailerConfig) -> Self {
        Self::with_clock(source, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        source: Arc<dyn LogSource>,
        clock: Arc<dyn Clock>,
        config: TailerConfig,
    ) -> Self {
        Self {
            source,
            clock,
            buffer: LogBuffer::new(),
            config,
            cycle: Arc::new(Mutex::new(CycleState::default())),
        }
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    /// Runs one fetch cycle. Fetch errors are logged and returned; the buffer is untouched.
    pub async fn poll_once(&self) -> anyhow::Result<CycleOutcome> {
        let batch = self.next_batch();
        let blob = match self.source.fetch().await {
            Ok(blob) => blob,
            Err(err) => {
                warn!(error = %format!("{err:#}"), batch, "Error fetching logs");
                return Err(err);
            }
        };
        let entries = parse_batch(&blob, batch);
        let now = self.clock.now_millis();
        if !self.pass_gate(now) {
            debug!(batch, lines = entries.len(), "Log batch discarded");
            return Ok(CycleOutcome::Discarded);
        }
        let merged = self.buffer.append(entries);
        self.schedule_highlight_clear();
        debug!(batch, merged, total = self.buffer.len(), "Log batch merged");
        Ok(CycleOutcome::Merged(merged))
    }

    /// Polls immediately, then every period, until the handle is stopped or dropped.
    ///
    /// Each tick fetches on its own task, so a slow fetch does not delay the next tick.
    pub fn start(&self) -> TailerHandle {
        let tailer = self.clone();
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tailer.config.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let cycle = tailer.clone();
                tokio::spawn(async move {
                    // Failures are already logged; the next tick retries.
                    let _ = cycle.poll_once().await;
                });
            }
        });
        TailerHandle { ticker }
    }

    fn next_batch(&self) -> u64 {
        let Ok(mut state) = self.cycle.lock() else {
            return 0;
        };
        state.batch += 1;
        state.batch
    }

    /// Records `now` as the new threshold and reports whether it moved forward.
    fn pass_gate(&self, now: u128) -> bool {
        let Ok(mut state) = self.cycle.lock() else {
            return false;
        };
        let fresh = now > state.last_stamp;
        state.last_stamp = now;
        fresh
    }

    fn schedule_highlight_clear(&self) {
        let buffer = self.buffer.clone();
        let delay = self.config.highlight_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let cleared = buffer.clear_new_flags();
            debug!(cleared, "Cleared new-entry highlights");
        });
    }
}

/// Cancels the polling ticker when stopped or dropped. Fetches already in flight still land.
pub struct TailerHandle {
    ticker: JoinHandle<()>,
}

impl TailerHandle {
    pub fn stop(&self) {
        self.ticker.abort();
    }
}

impl Drop for TailerHandle {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}
