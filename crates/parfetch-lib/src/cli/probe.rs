use reqwest::Client;
use tracing;

use crate::cli::params::ProbeParams;
use crate::download::probe;
use crate::error::ParfetchError;

pub async fn run_probe(params: ProbeParams) -> Result<(), ParfetchError> {
    tracing::info!("Probing {}", params.url);

    let client = Client::new();
    let descriptor = probe(&client, &params.url).await?;

    println!("content-length: {}", descriptor.total_length);
    println!(
        "integrity-tag: {}",
        descriptor.digest_tag.as_deref().unwrap_or("(none)")
    );
    Ok(())
}
