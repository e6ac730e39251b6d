use std::collections::HashSet;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, error, info};

/// Deletes destination entries with no counterpart anywhere in the source
/// tree. Runs after the copy phase so it reflects the cycle's final state.
///
/// The comparison is raw relative-path membership, independent of the path
/// filter: a destination entry that was never eligible for copying is still
/// deleted when nothing in the source matches it.
pub struct Pruner {
    source_root: PathBuf,
    dest_root: PathBuf,
}

impl Pruner {
    pub fn new(source_root: PathBuf, dest_root: PathBuf) -> Self {
        Self {
            source_root,
            dest_root,
        }
    }

    /// Returns the number of destination paths removed.
    pub async fn prune(&self) -> u64 {
        // Two independent unfiltered traversals, joined before the diff.
        let source_walk = tokio::spawn(collect_relative(self.source_root.clone()));
        let dest_walk = tokio::spawn(collect_relative(self.dest_root.clone()));

        let (source_walk, dest_walk) = match tokio::join!(source_walk, dest_walk) {
            (Ok(s), Ok(d)) => (s, d),
            _ => {
                error!("Prune traversal task failed, skipping prune for this cycle");
                return 0;
            }
        };

        let (source_set, source_err) = source_walk;
        let (dest_set, dest_err) = dest_walk;

        // A partial source set would make live destination entries look
        // stale, so an incomplete source walk skips the diff entirely. A
        // partial destination walk only means fewer deletions this cycle.
        if let Some(e) = source_err {
            error!("Source walk failed during prune, skipping prune: {}", e);
            return 0;
        }
        if let Some(e) = dest_err {
            error!("Destination walk incomplete during prune: {}", e);
        }

        let mut deleted = 0u64;
        for rel in dest_set.difference(&source_set) {
            let target = self.dest_root.join(rel);
            match fs::metadata(&target).await {
                Ok(meta) => {
                    let removal = if meta.is_dir() {
                        fs::remove_dir_all(&target).await
                    } else {
                        fs::remove_file(&target).await
                    };
                    match removal {
                        Ok(()) => {
                            info!("Pruned stale destination path: {:?}", target);
                            deleted += 1;
                        }
                        Err(e) => error!("Failed to delete stale path {:?}: {}", target, e),
                    }
                }
                // Already gone, typically removed with a pruned parent.
                Err(_) => debug!("Stale path already removed: {:?}", target),
            }
        }

        deleted
    }
}

/// Collect every path under `root`, relative to it, files and directories
/// alike. An I/O error stops the walk and is returned alongside whatever
/// was gathered.
async fn collect_relative(root: PathBuf) -> (HashSet<PathBuf>, Option<std::io::Error>) {
    let mut set = HashSet::new();
    let mut pending = vec![root.clone()];

    while let Some(dir) = pending.pop() {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => return (set, Some(e)),
        };
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    if let Ok(rel) = path.strip_prefix(&root) {
                        set.insert(rel.to_path_buf());
                    }
                    match entry.file_type().await {
                        Ok(t) if t.is_dir() => pending.push(path),
                        Ok(_) => {}
                        Err(e) => return (set, Some(e)),
                    }
                }
                Ok(None) => break,
                Err(e) => return (set, Some(e)),
            }
        }
    }

    (set, None)
}
