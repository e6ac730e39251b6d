use crate::config::Config;
use crate::filter::PathFilter;
use crate::pool::{CopyTask, CopyWorkerPool, CycleStats};
use crate::prune::Pruner;
use crate::scanner::DirectoryScanner;
use std::path::PathBuf;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// The mirroring engine plus its fixed-interval scheduler.
///
/// A cycle is scan -> directory creation -> copy -> prune. All per-cycle
/// state is recomputed from the live filesystem; nothing carries over
/// between cycles.
pub struct MirrorEngine {
    config: Config,
    filter: PathFilter,
}

impl MirrorEngine {
    pub fn new(config: Config) -> crate::error::MirrorResult<Self> {
        config.validate()?;
        let filter = PathFilter::new(&config);
        Ok(Self { config, filter })
    }

    /// Run one cycle immediately, then one per interval tick, until the
    /// token is cancelled. An in-flight cycle observes cancellation at its
    /// own boundaries and is never interrupted mid-copy.
    pub async fn run(&self, token: CancellationToken) {
        let mut ticker = self.cycle_ticker();
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("Cancellation observed, scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {}
            }
            self.run_cycle(&token).await;
        }
    }

    /// A cycle that overruns the interval must not trigger back-to-back
    /// catch-up cycles; the scheduler waits for the next aligned tick.
    fn cycle_ticker(&self) -> tokio::time::Interval {
        let mut ticker = tokio::time::interval(self.config.cycle_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker
    }

    pub async fn run_cycle(&self, token: &CancellationToken) -> CycleStats {
        info!(
            "Starting mirror cycle: {:?} -> {:?}",
            self.config.source_root, self.config.dest_root
        );

        let scan = DirectoryScanner::new(&self.config.source_root, &self.filter)
            .scan()
            .await;
        if let Some(e) = &scan.error {
            error!("{}; continuing with partial scan result", e);
        }

        // Every destination directory must exist before any copy task is
        // dispatched.
        self.create_directories(&scan.dirs).await;

        let tasks: Vec<CopyTask> = scan
            .files
            .iter()
            .map(|rel| CopyTask {
                source: self.config.source_root.join(rel),
                dest: self.config.dest_root.join(rel),
                buffer_size: self.config.buffer_size,
                max_file_size: self.config.max_file_size,
            })
            .collect();

        let stats = CopyWorkerPool::run(self.config.max_workers, tasks, token).await;

        // Deferred: prune compares the cycle's final destination state.
        let pruner = Pruner::new(
            self.config.source_root.clone(),
            self.config.dest_root.clone(),
        );
        let deleted = pruner.prune().await;

        info!(
            "Mirror cycle complete: {} copied ({} bytes), {} skipped, {} rejected, {} failed, {} pruned",
            stats.copied, stats.bytes_copied, stats.skipped, stats.rejected, stats.failed, deleted
        );
        stats
    }

    /// Create all eligible destination directories concurrently and join
    /// them before returning.
    async fn create_directories(&self, dirs: &[PathBuf]) {
        let mut creators = JoinSet::new();
        for rel in dirs {
            let target = self.config.dest_root.join(rel);
            creators.spawn(async move {
                if let Err(e) = tokio::fs::create_dir_all(&target).await {
                    error!("Failed to create directory {:?}: {}", target, e);
                }
            });
        }
        while creators.join_next().await.is_some() {}
    }
}
