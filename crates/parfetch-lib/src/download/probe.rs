use reqwest::{Client, header};
use url::Url;

use crate::error::ParfetchError;

/// What the metadata probe learned about the remote file.
#[derive(Debug, Clone)]
pub struct ContentDescriptor {
    pub total_length: u64,
    pub digest_tag: Option<String>,
}

/// Issues the HEAD probe that precedes all chunk work.
///
/// A definite `Content-Length` is required: without it there is nothing to
/// partition, so the download fails before a single ranged request goes
/// out. The `ETag`, when present, is kept as the expected integrity tag.
pub async fn probe(client: &Client, url: &Url) -> Result<ContentDescriptor, ParfetchError> {
    let response = client.head(url.clone()).send().await?.error_for_status()?;

    let total_length = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .ok_or_else(|| ParfetchError::MissingContentLength {
            url: url.to_string(),
        })?;

    let digest_tag = response
        .headers()
        .get(header::ETAG)
        .and_then(|value| value.to_str().ok())
        .map(normalize_etag);

    Ok(ContentDescriptor {
        total_length,
        digest_tag,
    })
}

/// Servers quote ETags on the wire (`"abc"`, sometimes `W/"abc"`); the
/// digest comparison wants the bare value.
fn normalize_etag(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("W/").unwrap_or(trimmed);
    trimmed.trim_matches('"').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_quoted_etag() {
        assert_eq!(
            normalize_etag("\"5eb63bbbe01eeed093cb22bb8f5acdc3\""),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn test_normalize_weak_etag() {
        assert_eq!(normalize_etag("W/\"abc123\""), "abc123");
    }

    #[test]
    fn test_normalize_bare_etag() {
        assert_eq!(normalize_etag("abc123"), "abc123");
    }
}
