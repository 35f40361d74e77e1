//! The orchestrator: builds the engine from configuration, runs the workers
//! and manages graceful shutdown.

pub mod build;
pub(crate) mod worker;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::SpoutConfig;
use crate::console::{self, ConsoleState, Counter};
use crate::metrics::TpsBoard;
use crate::output::Registry;
use crate::pattern::Template;
use crate::replacer::Replacers;
use crate::spout::worker::{RateShape, Worker};

pub use build::BuildError;

/// The assembled production engine.
///
/// All shared state lives behind `Arc`s so that workers, the console and the
/// signal watcher can run concurrently; the spout itself stays the single
/// owner of the configuration.
pub struct Spout {
    config: SpoutConfig,
    config_path: PathBuf,
    registry: Arc<Registry>,
    templates: Vec<Template>,
    /// The canonical replacer set; every worker clones it at spawn time.
    replacers: Replacers,
    board: Arc<TpsBoard>,
    cancel: CancellationToken,
    stopped: AtomicBool,
}

impl Spout {
    /// Build a spout from validated configuration. Fails fast on any seed,
    /// pattern or replacement problem; nothing is activated yet.
    pub async fn build(
        config: SpoutConfig,
        config_path: impl Into<PathBuf>,
    ) -> Result<Self, BuildError> {
        let seeds = build::load_seed_events(&config.sample_file)?;
        let templates = build::build_templates(&config.pattern, &seeds)?;
        let replacers = build::build_replacers(&config.replacement)?;
        let registry = build::build_registry(&config).await;
        let board = Arc::new(TpsBoard::new(config.concurrency));

        Ok(Self {
            config,
            config_path: config_path.into(),
            registry,
            templates,
            replacers,
            board,
            cancel: CancellationToken::new(),
            stopped: AtomicBool::new(false),
        })
    }

    /// The path of the configuration file this spout was built from.
    pub fn current_config_path(&self) -> &Path {
        &self.config_path
    }

    /// A snapshot of the per-worker throughput counters.
    pub fn fetch_counter(&self, details: bool) -> Counter {
        Counter::collect(&self.board, &self.config_path, details)
    }

    /// The registry owning this spout's destinations.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Run the spout to completion: activate the destinations, start the
    /// console and the signal watcher, spawn the workers and wait until they
    /// finish by quota, duration or external stop. Teardown runs exactly
    /// once.
    pub async fn run(&self) {
        // Activation failures are destination errors: logged, aggregated,
        // production continues with the healthy outputs.
        if let Err(e) = self.registry.for_all(|o| async move { o.activate().await }).await {
            warn!(error = %e, "some outputs failed to activate");
        }

        if self.config.console_port != 0 {
            let state = ConsoleState {
                board: Arc::clone(&self.board),
                config_path: self.config_path.clone(),
            };
            let port = self.config.console_port;
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                if let Err(e) = console::serve(state, port, cancel).await {
                    error!(error = %e, "management console failed");
                }
            });
        }

        self.watch_signals();

        if self.config.duration != 0 {
            let cancel = self.cancel.clone();
            let duration = Duration::from_secs(self.config.duration);
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {
                        info!(seconds = duration.as_secs(), "configured duration elapsed");
                        cancel.cancel();
                    }
                    _ = cancel.cancelled() => {}
                }
            });
        }

        let mut workers = JoinSet::new();
        for worker in self.spawn_set() {
            workers.spawn(worker.run());
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "worker task failed");
            }
        }

        self.stop().await;
    }

    /// Stop the spout: cancel the shared token and deactivate every output.
    /// Idempotent - concurrent calls from the signal handler and the timeout
    /// path tear down exactly once.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();

        if let Err(e) = self
            .registry
            .for_all(|o| async move { o.deactivate().await })
            .await
        {
            warn!(error = %e, "some outputs failed to deactivate");
        }
        info!("spout stopped");
    }

    /// Build one independent worker per configured lane. Each gets its own
    /// clones of the templates and replacers so the production loops never
    /// alias.
    fn spawn_set(&self) -> Vec<Worker> {
        let quota = self
            .config
            .max_events
            .map(|max| (max / self.config.concurrency as u64).max(1))
            .unwrap_or(u64::MAX);

        let rate = RateShape {
            min_interval: self.config.min_interval,
            max_interval: self.config.max_interval,
            max_intra_latency: self.config.max_intra_transaction_latency,
            uniform_load: self.config.uniform_load,
            burst: self.config.burst_mode,
        };

        let values: Vec<Vec<String>> = self
            .templates
            .iter()
            .map(|t| t.fragments().to_vec())
            .collect();
        let names: Vec<Vec<String>> = self.templates.iter().map(|t| t.names().to_vec()).collect();

        (0..self.config.concurrency)
            .map(|id| Worker {
                id,
                quota,
                values: values.clone(),
                names: names.clone(),
                replacers: self.replacers.clone(),
                transaction_ids: self.config.transaction_ids.clone(),
                rate,
                registry: Arc::clone(&self.registry),
                cancel: self.cancel.clone(),
                board: Arc::clone(&self.board),
            })
            .collect()
    }

    /// Route SIGINT and SIGTERM into the same graceful-stop path as the
    /// duration timer.
    fn watch_signals(&self) {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let ctrl_c = tokio::signal::ctrl_c();

            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let mut term = match signal(SignalKind::terminate()) {
                    Ok(term) => term,
                    Err(e) => {
                        error!(error = %e, "failed to install SIGTERM handler");
                        return;
                    }
                };
                tokio::select! {
                    _ = ctrl_c => info!("interrupt received, stopping"),
                    _ = term.recv() => info!("termination requested, stopping"),
                    _ = cancel.cancelled() => return,
                }
            }

            #[cfg(not(unix))]
            {
                tokio::select! {
                    _ = ctrl_c => info!("interrupt received, stopping"),
                    _ = cancel.cancelled() => return,
                }
            }

            cancel.cancel();
        });
    }
}
