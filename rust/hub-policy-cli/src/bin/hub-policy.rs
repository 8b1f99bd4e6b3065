use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use hub_policy_cli::HubPolicyCli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = HubPolicyCli::parse();

    // -v beats RUST_LOG, which beats the default
    let filter = match cli.log_directive() {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut stdout = std::io::stdout().lock();
    hub_policy_cli::run(&cli, &mut stdout)
}
