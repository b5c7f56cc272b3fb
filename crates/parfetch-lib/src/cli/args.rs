use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber;

#[derive(Debug, Clone)]
pub enum Command {
    Get {
        url: String,
        output: Option<String>,
        config_path: Option<String>,
        chunk_size: Option<u64>,
        workers: Option<usize>,
        verify: bool,
    },
    Probe {
        url: String,
    },
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "parfetch",
    version,
    about = "Download a large file over many parallel HTTP range requests"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Download a file in parallel chunks
    Get {
        #[arg(value_name = "URL", help = "URL of the file to download")]
        url: String,

        #[arg(
            short = 'o',
            long = "output",
            value_name = "FILE",
            help = "Output file path (default: last segment of the URL path)"
        )]
        output: Option<String>,

        #[arg(
            short = 'c',
            long = "config",
            value_name = "FILE",
            help = "Optional config file for chunk-size, worker and output-dir defaults"
        )]
        config: Option<String>,

        #[arg(
            long = "chunk-size",
            value_name = "BYTES",
            help = "Bytes requested per ranged GET"
        )]
        chunk_size: Option<u64>,

        #[arg(
            short = 'w',
            long = "workers",
            value_name = "N",
            help = "Maximum concurrent in-flight chunk transfers"
        )]
        workers: Option<usize>,

        #[arg(
            long = "verify",
            help = "Verify the assembled file against the server's MD5 ETag"
        )]
        verify: bool,
    },

    /// Probe a URL and print its content length and integrity tag
    Probe {
        #[arg(value_name = "URL", help = "URL of the file to probe")]
        url: String,
    },
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("hyper_util=warn".parse().unwrap()),
        )
        .init();

    let command = match cli.command {
        CliCommand::Get {
            url,
            output,
            config,
            chunk_size,
            workers,
            verify,
        } => Command::Get {
            url,
            output,
            config_path: config,
            chunk_size,
            workers,
            verify,
        },
        CliCommand::Probe { url } => Command::Probe { url },
    };

    Args { command, log_level }
}
