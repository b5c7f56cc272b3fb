use parfetch_lib::cli::{ResolvedCommand, parse_args, resolve_command, run_get, run_probe};
use parfetch_lib::error::ParfetchError;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), ParfetchError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command)?;

    match command {
        ResolvedCommand::Get(params) => run_get(params).await?,
        ResolvedCommand::Probe(params) => run_probe(params).await?,
    }

    Ok(())
}
