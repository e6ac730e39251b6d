pub mod config;
pub mod copier;
pub mod detect;
pub mod engine;
pub mod error;
pub mod filter;
pub mod pool;
pub mod prune;
pub mod scanner;

// Re-export commonly used types
pub use config::Config;
pub use detect::Decision;
pub use engine::MirrorEngine;
pub use error::{MirrorError, MirrorResult};
pub use filter::{PathFilter, Verdict};
pub use pool::{CopyTask, CopyWorkerPool, CycleStats};
pub use prune::Pruner;
pub use scanner::{DirectoryScanner, ScanResult};
