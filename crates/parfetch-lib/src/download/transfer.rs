use std::sync::Arc;

use futures::StreamExt;
use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

use crate::download::fetch::fetch_range;
use crate::download::plan::{ChunkPlan, ChunkRange};
use crate::download::sink::{ChunkWriter, RangeSink};
use crate::error::ParfetchError;

type ChunkResult = Result<(), ParfetchError>;

/// Downloads every planned range into the sink with at most `worker_limit`
/// transfers in flight.
///
/// Admission is a counting semaphore: a range is dispatched only after an
/// owned permit is acquired, and the task holds its permit for its whole
/// lifetime, so the permit is returned on success, failure, and
/// cancellation alike. After each dispatch the finished tasks are swept
/// non-blockingly; the first recorded failure stops further dispatch and
/// cancels the in-flight transfers. Every spawned task is drained before
/// this returns, so nothing touches the sink after the call completes.
/// Exactly one error survives; later failures are discarded.
pub async fn transfer_all<S>(
    client: &Client,
    url: &Url,
    sink: Arc<S>,
    plan: ChunkPlan,
    worker_limit: usize,
) -> Result<(), ParfetchError>
where
    S: RangeSink + 'static,
{
    let semaphore = Arc::new(Semaphore::new(worker_limit));
    let cancel = CancellationToken::new();
    let mut tasks: JoinSet<ChunkResult> = JoinSet::new();
    let mut first_error: Option<ParfetchError> = None;

    for range in plan {
        let permit = semaphore.clone().acquire_owned().await?;

        let client = client.clone();
        let url = url.clone();
        let sink = Arc::clone(&sink);
        let token = cancel.clone();
        tasks.spawn(async move {
            let _permit = permit;
            tokio::select! {
                result = transfer_range(&client, &url, sink.as_ref(), range) => result,
                _ = token.cancelled() => {
                    trace!(index = range.index, "chunk abandoned after cancellation");
                    Ok(())
                }
            }
        });

        // A task dispatched earlier may already have failed; stop handing
        // out new ranges as soon as that becomes visible.
        while let Some(joined) = tasks.try_join_next() {
            record_outcome(joined, &mut first_error, &cancel);
        }
        if first_error.is_some() {
            break;
        }
    }

    // Drain everything that was dispatched, on the failure path too.
    while let Some(joined) = tasks.join_next().await {
        record_outcome(joined, &mut first_error, &cancel);
    }

    match first_error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// First failure wins; everything after it is dropped on the floor, but a
/// failure always triggers cancellation of whatever is still in flight.
fn record_outcome(
    joined: Result<ChunkResult, JoinError>,
    first_error: &mut Option<ParfetchError>,
    cancel: &CancellationToken,
) {
    let outcome = match joined {
        Ok(outcome) => outcome,
        Err(join_error) => Err(ParfetchError::ChunkTask(join_error)),
    };
    if let Err(error) = outcome {
        if first_error.is_none() {
            *first_error = Some(error);
            cancel.cancel();
        }
    }
}

/// Fetches one range and streams its body to the sink at absolute offsets.
async fn transfer_range<S>(
    client: &Client,
    url: &Url,
    sink: &S,
    range: ChunkRange,
) -> Result<(), ParfetchError>
where
    S: RangeSink,
{
    let response = fetch_range(client, url, range).await?;

    let mut writer = ChunkWriter::new(sink, range.start);
    let mut stream = response.bytes_stream();
    while let Some(piece) = stream.next().await {
        writer.write(&piece?)?;
    }

    debug!(
        index = range.index,
        start = range.start,
        bytes = writer.bytes_written(),
        "chunk complete"
    );
    Ok(())
}
