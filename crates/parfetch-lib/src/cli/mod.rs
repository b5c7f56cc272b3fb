mod args;
mod get;
mod params;
mod probe;
mod resolved_command;

pub use args::{Args, Command, parse_args};
pub use get::run_get;
pub use params::{GetParams, ProbeParams};
pub use probe::run_probe;
pub use resolved_command::{ResolvedCommand, resolve_command};
