//! Process configuration.
//!
//! Flags override environment variables. The signing secret is mandatory;
//! a missing or empty secret is a startup error.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use clap::Parser;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_PORT: u16 = 8080;

/// Dotenv file read from the working directory at startup.
pub const ENV_FILE: &str = ".env";

/// Load `path` into the process environment. Variables already set are left
/// alone. A missing or unreadable file is not an error: startup continues with
/// the process environment. Returns whether the file was applied.
pub fn load_env_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match dotenvy::from_path(path) {
        Ok(()) => {
            info!(target: "startup", "loaded environment from {}", path.display());
            true
        }
        Err(e) => {
            warn!(target: "startup", ".env file not found, using environment variables");
            debug!(target: "startup", "{}: {e}", path.display());
            false
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET_KEY environment variable is required")]
    MissingSecret,
}

#[derive(Parser, Clone)]
#[command(name = "authgate", version, about = "Minimal authentication service")]
pub struct Cli {
    /// HMAC secret used to sign session tokens
    #[arg(long = "jwt-secret-key", env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub jwt_secret_key: Option<String>,

    /// HTTP listen port
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,
}

/// Validated, immutable server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    secret: Vec<u8>,
    pub addr: SocketAddr,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig").field("addr", &self.addr).field("secret", &"<redacted>").finish()
    }
}

impl ServerConfig {
    pub fn new(secret: impl Into<Vec<u8>>, addr: SocketAddr) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self { secret, addr })
    }

    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let secret = cli.jwt_secret_key.ok_or(ConfigError::MissingSecret)?;
        Self::new(secret, SocketAddr::new(cli.host, cli.port))
    }

    pub fn secret(&self) -> &[u8] { &self.secret }
}
