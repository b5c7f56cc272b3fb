use reqwest::Client;
use tracing;

use crate::cli::params::GetParams;
use crate::download::{FetchRequest, fetch_file};
use crate::error::ParfetchError;

pub async fn run_get(params: GetParams) -> Result<(), ParfetchError> {
    let client = Client::new();
    let request = FetchRequest {
        url: params.url,
        output_path: params.output_path,
        options: params.options,
    };

    let report = fetch_file(&client, &request).await?;

    tracing::info!(
        total_length = report.total_length,
        chunks = report.chunk_count,
        verified = report.verified,
        "download completed successfully"
    );
    Ok(())
}
