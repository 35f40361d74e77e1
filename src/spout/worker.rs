//! The production worker: one lane of log generation.
//!
//! A worker owns private clones of the token templates and the replacer set,
//! so the hot loop touches no shared mutable state beyond the output registry
//! and its TPS cell. It renders, serializes and writes events in a tight
//! loop, shaped by the configured think times, until it reaches its event
//! quota or the shared token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::metrics::TpsBoard;
use crate::output::Registry;
use crate::replacer::{simple_gaussian, Replacers};

/// How often a worker publishes its rolling per-second count.
const TPS_PUBLISH_INTERVAL: Duration = Duration::from_secs(1);

/// Divisor that stretches the time-of-day over the sine curve. Tunable; only
/// the smooth 24-hour peak/trough shape matters.
const DIURNAL_DIVISOR: f64 = 13751.0;

/// Rate-shaping parameters, all in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct RateShape {
    pub min_interval: u64,
    pub max_interval: u64,
    pub max_intra_latency: u64,
    pub uniform_load: bool,
    pub burst: bool,
}

impl RateShape {
    /// The pause between two lines of one transaction: a bounded Gaussian
    /// around the configured midpoint. `None` in burst mode.
    pub fn intra_latency<R: Rng>(&self, rng: &mut R) -> Option<Duration> {
        if self.burst || self.max_intra_latency == 0 {
            return None;
        }
        let ms = simple_gaussian(rng, self.max_intra_latency as usize) as u64;
        Some(Duration::from_millis(ms))
    }

    /// The think time between two transactions. `None` in burst mode.
    ///
    /// With `min == max` the pause is exactly `min`. Under uniform load it is
    /// a Gaussian draw within `[min, max]`. Otherwise a sum-of-squared-sines
    /// curve of the time of day scales the pause into `[min, max]`, emulating
    /// traffic with a daily peak and trough instead of flat load.
    pub fn think_duration<R: Rng>(
        &self,
        rng: &mut R,
        seconds_of_day: u32,
    ) -> Option<Duration> {
        if self.burst {
            return None;
        }

        let ms = if self.min_interval == self.max_interval {
            self.min_interval
        } else if self.uniform_load {
            let gap = (self.max_interval - self.min_interval) as usize;
            self.min_interval + simple_gaussian(rng, gap) as u64
        } else {
            let x = seconds_of_day as f64 / DIURNAL_DIVISOR;
            let y = (x.sin().powi(2) + (x / 2.0).sin().powi(2) + 0.2) / 1.7619;
            ((self.min_interval as f64 / y) as u64).clamp(self.min_interval, self.max_interval)
        };
        Some(Duration::from_millis(ms))
    }
}

/// Re-render one line of the working copy.
///
/// Every field with a configured replacer gets a fresh value, except that a
/// transaction-correlation field on a non-first line copies the value already
/// rendered for that field name on line 0 - this is what keeps a user or
/// order id identical across all lines of one transaction. A render error is
/// logged and the previous value stays in place.
pub(crate) fn render_line<R: Rng>(
    values: &mut [Vec<String>],
    names: &[Vec<String>],
    replacers: &mut Replacers,
    transaction_ids: &[String],
    line: usize,
    rng: &mut R,
) {
    for pos in 0..names[line].len() {
        let name = &names[line][pos];
        if name.is_empty() {
            continue;
        }
        let Some(replacer) = replacers.get_mut(name) else {
            continue;
        };

        if line != 0 && transaction_ids.contains(name) {
            if let Some(pos0) = names[0].iter().position(|n| n == name) {
                let correlated = values[0][pos0].clone();
                values[line][pos] = correlated;
                continue;
            }
            // Correlation field absent on line 0: render fresh below.
        }

        match replacer.render(rng) {
            Ok(value) => values[line][pos] = value,
            Err(e) => warn!(field = %name, error = %e, "replacement failed, keeping previous value"),
        }
    }
}

pub(crate) struct Worker {
    pub id: usize,
    /// This worker's share of the global max-events bound; `u64::MAX` when
    /// unbounded.
    pub quota: u64,
    /// Working copies of the template fragments, overwritten in place.
    pub values: Vec<Vec<String>>,
    /// Field name per fragment, parallel to `values`.
    pub names: Vec<Vec<String>>,
    pub replacers: Replacers,
    pub transaction_ids: Vec<String>,
    pub rate: RateShape,
    pub registry: Arc<Registry>,
    pub cancel: CancellationToken,
    pub board: Arc<TpsBoard>,
}

impl Worker {
    pub async fn run(mut self) {
        info!(worker = self.id, "worker spawned");

        let mut rng = StdRng::from_entropy();
        let lines = self.values.len();
        if lines == 0 {
            warn!(worker = self.id, "no templates to render");
            return;
        }
        let mut line = 0usize;
        let mut produced = 0u64;
        let mut tps = 0u64;
        let mut last_publish = Instant::now();

        loop {
            render_line(
                &mut self.values,
                &self.names,
                &mut self.replacers,
                &self.transaction_ids,
                line,
                &mut rng,
            );
            let event = self.values[line].concat();

            // One bad destination must not halt production; the registry
            // already tried every healthy sibling.
            if let Err(e) = self.registry.write(event.as_bytes()).await {
                warn!(worker = self.id, error = %e, "write failed");
            }

            produced += 1;
            tps += 1;

            if produced >= self.quota {
                info!(worker = self.id, produced, "worker reached its event quota");
                break;
            }

            if last_publish.elapsed() >= TPS_PUBLISH_INTERVAL {
                self.board.set(self.id, tps);
                tps = 0;
                last_publish = Instant::now();
            }

            if self.cancel.is_cancelled() {
                info!(worker = self.id, produced, "worker stopped");
                break;
            }

            // Pause between the lines of one transaction.
            if lines > 1 && line + 1 < lines {
                if let Some(latency) = self.rate.intra_latency(&mut rng) {
                    if self.sleep(latency).await {
                        break;
                    }
                }
            }

            line += 1;
            if line >= lines {
                line = 0;
                let seconds_of_day = chrono::Local::now().num_seconds_from_midnight();
                if let Some(pause) = self.rate.think_duration(&mut rng, seconds_of_day) {
                    if self.sleep(pause).await {
                        break;
                    }
                }
            }
        }

        info!(worker = self.id, "worker exiting");
    }

    /// Sleep, racing the shared token. Returns true when cancelled.
    async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.cancel.cancelled() => true,
        }
    }
}
