use crate::copier;
use crate::detect::{self, Decision};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// One eligible file queued for change detection and possible copy.
/// Created by the scanner, consumed exactly once by a worker.
#[derive(Debug, Clone)]
pub struct CopyTask {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub buffer_size: usize,
    pub max_file_size: u64,
}

/// Per-cycle outcome counters, summed from per-worker tallies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub copied: u64,
    pub skipped: u64,
    pub rejected: u64,
    pub failed: u64,
    pub bytes_copied: u64,
}

impl CycleStats {
    fn merge(&mut self, other: CycleStats) {
        self.copied += other.copied;
        self.skipped += other.skipped;
        self.rejected += other.rejected;
        self.failed += other.failed;
        self.bytes_copied += other.bytes_copied;
    }
}

pub struct CopyWorkerPool;

impl CopyWorkerPool {
    /// Drain `tasks` with `max_workers` concurrent worker loops.
    ///
    /// Cancellation is observed only between tasks: a copy already in
    /// progress always runs to completion. Per-task failures are logged and
    /// never stop the pool; there is no retry.
    pub async fn run(
        max_workers: usize,
        tasks: Vec<CopyTask>,
        token: &CancellationToken,
    ) -> CycleStats {
        let mut stats = CycleStats::default();
        if tasks.is_empty() {
            return stats;
        }

        let (sender, receiver) = mpsc::channel(tasks.len());
        for task in tasks {
            // Channel is sized to hold every task, send cannot block here.
            if sender.send(task).await.is_err() {
                break;
            }
        }
        drop(sender);

        let receiver = Arc::new(Mutex::new(receiver));
        let mut workers = JoinSet::new();

        for _ in 0..max_workers {
            let receiver = receiver.clone();
            let token = token.clone();
            workers.spawn(async move {
                let mut local = CycleStats::default();
                loop {
                    let task = {
                        let mut rx = receiver.lock().await;
                        tokio::select! {
                            biased;
                            _ = token.cancelled() => {
                                warn!("Worker received cancel signal");
                                None
                            }
                            task = rx.recv() => task,
                        }
                    };
                    match task {
                        Some(task) => Self::process(task, &mut local).await,
                        None => break,
                    }
                }
                local
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(local) => stats.merge(local),
                Err(e) => error!("Copy worker panicked: {}", e),
            }
        }

        stats
    }

    async fn process(task: CopyTask, stats: &mut CycleStats) {
        match detect::needs_copy(&task.source, &task.dest, task.max_file_size).await {
            Ok(Decision::Copy) => {
                match copier::copy(&task.source, &task.dest, task.buffer_size).await {
                    Ok(bytes) => {
                        info!("Copied {:?} -> {:?} ({} bytes)", task.source, task.dest, bytes);
                        stats.copied += 1;
                        stats.bytes_copied += bytes;
                    }
                    Err(e) => {
                        error!("{}", e);
                        stats.failed += 1;
                    }
                }
            }
            Ok(Decision::Skip) => {
                stats.skipped += 1;
            }
            Ok(Decision::Reject { reason }) => {
                warn!("Rejected {:?}: {}", task.source, reason);
                stats.rejected += 1;
            }
            Err(e) => {
                error!("{}", e);
                stats.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn task(temp: &TempDir, name: &str, content: &[u8]) -> CopyTask {
        let source = temp.path().join(name);
        std::fs::write(&source, content).unwrap();
        CopyTask {
            source,
            dest: temp.path().join(format!("{}.out", name)),
            buffer_size: 4096,
            max_file_size: 1024 * 1024,
        }
    }

    #[tokio::test]
    async fn test_pool_drains_all_tasks() {
        let temp = TempDir::new().unwrap();
        let tasks: Vec<_> = (0..8)
            .map(|i| task(&temp, &format!("f{}", i), b"payload"))
            .collect();
        let dests: Vec<_> = tasks.iter().map(|t| t.dest.clone()).collect();

        let stats = CopyWorkerPool::run(3, tasks, &CancellationToken::new()).await;
        assert_eq!(stats.copied, 8);
        assert_eq!(stats.failed, 0);
        for dest in dests {
            assert_eq!(std::fs::read(dest).unwrap(), b"payload");
        }
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_accepting_tasks() {
        let temp = TempDir::new().unwrap();
        let tasks: Vec<_> = (0..4)
            .map(|i| task(&temp, &format!("f{}", i), b"payload"))
            .collect();
        let dests: Vec<_> = tasks.iter().map(|t| t.dest.clone()).collect();

        let token = CancellationToken::new();
        token.cancel();
        let stats = CopyWorkerPool::run(2, tasks, &token).await;
        assert_eq!(stats.copied, 0);
        assert!(dests.iter().all(|d| !d.exists()));
    }

    #[tokio::test]
    async fn test_failed_task_does_not_stop_pool() {
        let temp = TempDir::new().unwrap();
        let mut tasks = vec![task(&temp, "good", b"fine")];
        tasks.push(CopyTask {
            source: temp.path().join("does-not-exist"),
            dest: temp.path().join("never"),
            buffer_size: 4096,
            max_file_size: 1024,
        });

        let stats = CopyWorkerPool::run(2, tasks, &CancellationToken::new()).await;
        assert_eq!(stats.copied, 1);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn test_oversized_task_is_rejected_without_io() {
        let temp = TempDir::new().unwrap();
        let mut oversized = task(&temp, "big", &vec![0u8; 200]);
        oversized.max_file_size = 100;
        let dest = oversized.dest.clone();

        let stats = CopyWorkerPool::run(1, vec![oversized], &CancellationToken::new()).await;
        assert_eq!(stats.rejected, 1);
        assert!(!dest.exists());
    }
}
