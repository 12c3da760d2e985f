mod account_store_file;
mod bootstrap_helpers;
mod cli_args;
mod daemon_config;
mod notification_log;
mod package_store_static;
mod runtime_loop;

use anyhow::Result;
use clap::Parser;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::DaemonArgs;
use crate::daemon_config::load_daemon_config;
use crate::runtime_loop::run_daemon;

#[tokio::main]
async fn main() -> Result<()> {
    let args = DaemonArgs::parse();
    init_tracing(args.log_filter.as_deref());
    let mut config = load_daemon_config(&args.config)?;
    if let Some(listen_addr) = args.listen_addr {
        config.listen_addr = listen_addr;
    }
    run_daemon(config).await
}
