use crate::error::{MirrorError, MirrorResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    /// Number of concurrent copy workers.
    pub max_workers: usize,
    /// Bytes per copy chunk.
    pub buffer_size: usize,
    /// Files larger than this are never copied.
    pub max_file_size: u64,
    /// Seconds between cycle starts.
    pub cycle_interval_secs: u64,
    /// Directory base names whose entire subtree is excluded.
    pub restricted_dir_names: HashSet<String>,
    /// File base names excluded from copying.
    pub restricted_file_names: HashSet<String>,
    /// File extensions excluded from copying, with or without a leading dot.
    pub restricted_extensions: HashSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            dest_root: PathBuf::new(),
            max_workers: num_cpus::get(),
            buffer_size: 64 * 1024,
            max_file_size: 1024 * 1024 * 1024, // 1GB
            cycle_interval_secs: 300,
            restricted_dir_names: HashSet::new(),
            restricted_file_names: HashSet::new(),
            restricted_extensions: HashSet::new(),
        }
    }
}

impl Config {
    pub async fn load(path: &Path) -> MirrorResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MirrorError::Config {
                field: "config file".to_string(),
                reason: format!("cannot read {:?}: {}", path, e),
            })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {:?}", path);
        Ok(config)
    }

    /// Reject invalid settings before any cycle runs.
    pub fn validate(&self) -> MirrorResult<()> {
        if self.source_root.as_os_str().is_empty() {
            return Err(invalid("source_root", "must be set"));
        }
        if self.dest_root.as_os_str().is_empty() {
            return Err(invalid("dest_root", "must be set"));
        }
        if self.max_workers == 0 {
            return Err(invalid("max_workers", "expected a positive integer"));
        }
        if self.buffer_size == 0 {
            return Err(invalid("buffer_size", "expected a positive integer"));
        }
        if self.max_file_size == 0 {
            return Err(invalid("max_file_size", "expected a positive integer"));
        }
        if self.cycle_interval_secs == 0 {
            return Err(invalid("cycle_interval_secs", "expected a positive integer"));
        }
        Ok(())
    }

    /// Both roots must exist and be directories before the scheduler starts.
    pub async fn ensure_roots(&self) -> MirrorResult<()> {
        for (field, path) in [("source_root", &self.source_root), ("dest_root", &self.dest_root)] {
            match tokio::fs::metadata(path).await {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    return Err(invalid(field, &format!("{:?} is not a directory", path)));
                }
                Err(e) => {
                    return Err(invalid(field, &format!("cannot access {:?}: {}", path, e)));
                }
            }
        }
        Ok(())
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }
}

fn invalid(field: &str, reason: &str) -> MirrorError {
    MirrorError::Config {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
