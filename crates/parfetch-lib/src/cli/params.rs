use std::path::PathBuf;

use url::Url;

use crate::download::FetchOptions;

#[derive(Debug, Clone)]
pub struct GetParams {
    pub url: Url,
    pub output_path: PathBuf,
    pub options: FetchOptions,
}

#[derive(Debug, Clone)]
pub struct ProbeParams {
    pub url: Url,
}
