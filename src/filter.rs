use crate::config::Config;
use std::collections::HashSet;

/// Outcome of applying the restriction rules to a single tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    /// Restricted directory: the entire subtree is omitted.
    SkipSubtree,
    /// Restricted file: only this entry is omitted.
    SkipEntry,
}

/// Name-based exclusion rules applied during the source walk.
///
/// Matching is against an entry's base name (directories, file names) or
/// extension (files). Purely a lookup, no filesystem access.
#[derive(Debug, Clone)]
pub struct PathFilter {
    dir_names: HashSet<String>,
    file_names: HashSet<String>,
    /// Stored without the leading dot.
    extensions: HashSet<String>,
}

impl PathFilter {
    pub fn new(config: &Config) -> Self {
        Self {
            dir_names: config.restricted_dir_names.clone(),
            file_names: config.restricted_file_names.clone(),
            extensions: config
                .restricted_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
        }
    }

    pub fn verdict_for_dir(&self, name: &str) -> Verdict {
        if self.dir_names.contains(name) {
            Verdict::SkipSubtree
        } else {
            Verdict::Eligible
        }
    }

    pub fn verdict_for_file(&self, name: &str) -> Verdict {
        if self.file_names.contains(name) {
            return Verdict::SkipEntry;
        }
        // Everything after the final dot counts as the extension, so a
        // dotfile whose whole name is the extension (a file literally named
        // ".tmp") is restricted too.
        if let Some((_, ext)) = name.rsplit_once('.') {
            if self.extensions.contains(ext) {
                return Verdict::SkipEntry;
            }
        }
        Verdict::Eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_with(dirs: &[&str], files: &[&str], exts: &[&str]) -> PathFilter {
        let config = Config {
            restricted_dir_names: dirs.iter().map(|s| s.to_string()).collect(),
            restricted_file_names: files.iter().map(|s| s.to_string()).collect(),
            restricted_extensions: exts.iter().map(|s| s.to_string()).collect(),
            ..Config::default()
        };
        PathFilter::new(&config)
    }

    #[test]
    fn test_restricted_dir_skips_subtree() {
        let filter = filter_with(&[".git"], &[], &[]);
        assert_eq!(filter.verdict_for_dir(".git"), Verdict::SkipSubtree);
        assert_eq!(filter.verdict_for_dir("src"), Verdict::Eligible);
    }

    #[test]
    fn test_restricted_file_name_skips_entry() {
        let filter = filter_with(&[], &["Thumbs.db"], &[]);
        assert_eq!(filter.verdict_for_file("Thumbs.db"), Verdict::SkipEntry);
        assert_eq!(filter.verdict_for_file("notes.txt"), Verdict::Eligible);
    }

    #[test]
    fn test_extension_matches_with_or_without_dot() {
        let filter = filter_with(&[], &[], &[".tmp", "swp"]);
        assert_eq!(filter.verdict_for_file("scratch.tmp"), Verdict::SkipEntry);
        assert_eq!(filter.verdict_for_file(".session.swp"), Verdict::SkipEntry);
        assert_eq!(filter.verdict_for_file("scratch.txt"), Verdict::Eligible);
    }

    #[test]
    fn test_file_without_extension() {
        let filter = filter_with(&[], &[], &["tmp"]);
        assert_eq!(filter.verdict_for_file("Makefile"), Verdict::Eligible);
    }

    #[test]
    fn test_dotfile_named_as_extension_is_restricted() {
        let filter = filter_with(&[], &[], &[".tmp"]);
        assert_eq!(filter.verdict_for_file(".tmp"), Verdict::SkipEntry);
        assert_eq!(filter.verdict_for_file(".gitignore"), Verdict::Eligible);
    }
}
