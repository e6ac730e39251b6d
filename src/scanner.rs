use crate::error::MirrorError;
use crate::filter::{PathFilter, Verdict};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// What one walk of the source tree produced.
///
/// `dirs` lists eligible directories relative to the root, in an order where
/// a parent always precedes its children. `files` is the candidate copy set,
/// also root-relative. `error` records an aborted walk; the collected partial
/// result is still usable by the caller.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub dirs: Vec<PathBuf>,
    pub files: HashSet<PathBuf>,
    pub error: Option<MirrorError>,
}

/// Walks the source tree once per cycle, applying the path filter before
/// descending. Runs as a single task so the accumulated sets have exactly
/// one writer.
pub struct DirectoryScanner<'a> {
    root: &'a Path,
    filter: &'a PathFilter,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(root: &'a Path, filter: &'a PathFilter) -> Self {
        Self { root, filter }
    }

    pub async fn scan(&self) -> ScanResult {
        let mut result = ScanResult::default();
        let mut pending = vec![self.root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    result.error = Some(MirrorError::Scan { path: dir, source: e });
                    return result;
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        result.error = Some(MirrorError::Scan { path: dir, source: e });
                        return result;
                    }
                };

                let path = entry.path();
                let name = entry.file_name().to_string_lossy().into_owned();
                let file_type = match entry.file_type().await {
                    Ok(t) => t,
                    Err(e) => {
                        result.error = Some(MirrorError::Scan { path, source: e });
                        return result;
                    }
                };

                if file_type.is_dir() {
                    match self.filter.verdict_for_dir(&name) {
                        Verdict::Eligible => {
                            result.dirs.push(self.relative(&path));
                            pending.push(path);
                        }
                        _ => warn!("Skipping restricted directory: {}", name),
                    }
                } else if file_type.is_file() {
                    match self.filter.verdict_for_file(&name) {
                        Verdict::Eligible => {
                            result.files.insert(self.relative(&path));
                        }
                        _ => warn!("Skipping restricted file: {}", name),
                    }
                } else {
                    debug!("Ignoring non-regular entry: {:?}", path);
                }
            }
        }

        result
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.root).unwrap_or(path).to_path_buf()
    }
}
