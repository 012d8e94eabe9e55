use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use authgate::config::{load_env_file, Cli, ServerConfig, ENV_FILE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Must run before clap reads JWT_SECRET_KEY / PORT / HOST.
    load_env_file(ENV_FILE);
    let cli = Cli::parse();
    // A missing signing secret halts the process before anything binds.
    let config = ServerConfig::from_cli(cli)?;

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(target: "startup", "authgate starting: RUST_LOG='{}', addr={}", rust_log, config.addr);

    authgate::server::run(config).await
}
