use std::path::PathBuf;

use url::Url;

pub const DEFAULT_CHUNK_SIZE: u64 = 512_000;

/// Constrained by the number of open network connections the OS can
/// comfortably support.
pub const DEFAULT_WORKER_LIMIT: usize = 16;

#[derive(Clone, Copy, Debug)]
pub struct FetchOptions {
    /// Bytes requested per ranged GET.
    pub chunk_size: u64,
    /// Maximum concurrent in-flight chunk transfers.
    pub worker_limit: usize,
    /// Check the assembled file against the server's MD5 ETag.
    pub verify_digest: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            worker_limit: DEFAULT_WORKER_LIMIT,
            verify_digest: false,
        }
    }
}

/// Everything one download needs; immutable for its duration.
#[derive(Clone, Debug)]
pub struct FetchRequest {
    pub url: Url,
    pub output_path: PathBuf,
    pub options: FetchOptions,
}

/// Summary of a completed download.
#[derive(Clone, Copy, Debug)]
pub struct FetchReport {
    pub total_length: u64,
    pub chunk_count: usize,
    /// True only when verification was requested, a tag was advertised,
    /// and the digests matched.
    pub verified: bool,
}
