use std::path::PathBuf;

use url::Url;

use crate::cli::args::Command;
use crate::cli::params::{GetParams, ProbeParams};
use crate::config::{Config, load_config};
use crate::download::FetchOptions;
use crate::error::ParfetchError;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Get(GetParams),
    Probe(ProbeParams),
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, ParfetchError> {
    match command {
        Command::Get {
            url,
            output,
            config_path,
            chunk_size,
            workers,
            verify,
        } => {
            let app_config = match config_path {
                Some(config_path) => load_config(&config_path)?,
                None => Config::default(),
            };

            let chunk_size = chunk_size.unwrap_or(app_config.chunk_size);
            let worker_limit = workers.unwrap_or(app_config.worker_limit);
            let verify_digest = verify || app_config.verify;

            if chunk_size == 0 {
                return Err(ParfetchError::CliArgumentValidation {
                    details: "chunk-size must be greater than 0.".to_string(),
                });
            }
            if worker_limit == 0 {
                return Err(ParfetchError::CliArgumentValidation {
                    details: "workers must be greater than 0.".to_string(),
                });
            }

            let url = Url::parse(&url)?;
            let output_path = resolve_output_path(&url, output.as_deref(), app_config.output_dir)?;

            Ok(ResolvedCommand::Get(GetParams {
                url,
                output_path,
                options: FetchOptions {
                    chunk_size,
                    worker_limit,
                    verify_digest,
                },
            }))
        }
        Command::Probe { url } => Ok(ResolvedCommand::Probe(ProbeParams {
            url: Url::parse(&url)?,
        })),
    }
}

/// The output file defaults to the last segment of the URL path, placed in
/// the configured output directory when one is set.
fn resolve_output_path(
    url: &Url,
    output: Option<&str>,
    output_dir: Option<PathBuf>,
) -> Result<PathBuf, ParfetchError> {
    let file_name = match output {
        Some(output) => PathBuf::from(output),
        None => {
            let segment = url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| ParfetchError::CliArgumentValidation {
                    details: format!("Cannot derive an output file name from {url}. Pass --output."),
                })?;
            PathBuf::from(segment)
        }
    };

    if file_name.is_absolute() {
        return Ok(file_name);
    }
    Ok(match output_dir {
        Some(output_dir) => output_dir.join(file_name),
        None => file_name,
    })
}
