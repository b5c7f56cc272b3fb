use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::download::{DEFAULT_CHUNK_SIZE, DEFAULT_WORKER_LIMIT};

/// File-based defaults for the `get` command. Every field can be
/// overridden on the command line.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
    #[serde(default = "default_worker_limit")]
    pub worker_limit: usize,
    #[serde(default)]
    pub verify: bool,
    /// Relative output file names are placed here when set.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            worker_limit: DEFAULT_WORKER_LIMIT,
            verify: false,
            output_dir: None,
        }
    }
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}

fn default_worker_limit() -> usize {
    DEFAULT_WORKER_LIMIT
}
