mod fetch;
mod plan;
mod probe;
mod sink;
mod transfer;
mod types;

pub use fetch::fetch_range;
pub use plan::{ChunkPlan, ChunkRange, plan_chunks};
pub use probe::{ContentDescriptor, probe};
pub use sink::{ChunkWriter, RangeSink};
pub use transfer::transfer_all;
pub use types::{
    DEFAULT_CHUNK_SIZE, DEFAULT_WORKER_LIMIT, FetchOptions, FetchReport, FetchRequest,
};

use std::fs::File;
use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use crate::error::ParfetchError;
use crate::verification::verify_file;

/// Runs one download end to end: probe, plan, bounded transfer, optional
/// integrity verification.
///
/// On failure the output file is left behind with whatever ranges landed
/// before the error; there is no rollback.
pub async fn fetch_file(
    client: &Client,
    request: &FetchRequest,
) -> Result<FetchReport, ParfetchError> {
    let descriptor = probe(client, &request.url).await?;
    info!(
        url = %request.url,
        total_length = descriptor.total_length,
        digest_tag = descriptor.digest_tag.as_deref().unwrap_or("-"),
        "probed remote file"
    );

    let plan = plan_chunks(descriptor.total_length, request.options.chunk_size);
    let chunk_count = plan.chunk_count();

    let sink = Arc::new(File::create(&request.output_path)?);
    info!(
        output = %request.output_path.display(),
        chunks = chunk_count,
        workers = request.options.worker_limit,
        "fetching"
    );
    transfer_all(
        client,
        &request.url,
        Arc::clone(&sink),
        plan,
        request.options.worker_limit,
    )
    .await?;
    sink.sync_all()?;

    let mut verified = false;
    if request.options.verify_digest {
        match descriptor.digest_tag.as_deref() {
            Some(expected) => {
                info!(expected, "verifying assembled file");
                verify_file(&request.output_path, expected).await?;
                verified = true;
            }
            None => {
                warn!("verification requested but the server sent no integrity tag");
            }
        }
    }

    Ok(FetchReport {
        total_length: descriptor.total_length,
        chunk_count,
        verified,
    })
}
