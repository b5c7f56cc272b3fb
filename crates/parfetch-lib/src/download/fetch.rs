use reqwest::{Client, Response, StatusCode, header};
use url::Url;

use crate::download::plan::ChunkRange;
use crate::error::ParfetchError;

/// Requests one chunk with a `Range: bytes=start-end` header.
///
/// Anything other than `206 Partial Content` means the server did not honor
/// the range; the failure carries the chunk's starting offset so the broken
/// range is identifiable from the error alone. No retries: one failed chunk
/// fails the download.
pub async fn fetch_range(
    client: &Client,
    url: &Url,
    range: ChunkRange,
) -> Result<Response, ParfetchError> {
    let response = client
        .get(url.clone())
        .header(header::RANGE, range.header_value())
        .send()
        .await?;

    if response.status() != StatusCode::PARTIAL_CONTENT {
        return Err(ParfetchError::UnexpectedStatus {
            offset: range.start,
            status: response.status(),
        });
    }

    Ok(response)
}
