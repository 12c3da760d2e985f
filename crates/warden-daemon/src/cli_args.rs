use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "warden-daemon",
    about = "Game-server log monitor and command dispatcher",
    version
)]
pub struct DaemonArgs {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "warden.toml")]
    pub config: PathBuf,

    /// Overrides the configured agent listener address.
    #[arg(long)]
    pub listen_addr: Option<String>,

    /// Tracing filter directives, e.g. `warden_pipeline=debug,info`.
    /// Takes precedence over `RUST_LOG`.
    #[arg(long)]
    pub log_filter: Option<String>,
}
