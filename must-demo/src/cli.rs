//! Command-line flags. Each flag falls back to an environment variable.

use clap::Parser;
use must_core::config::{ServerConfig, DEFAULT_HOST, DEFAULT_PORT};

use crate::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "must-demo")]
#[command(about = "User CRUD service demonstrating abort-and-recover error handling")]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Log filter, e.g. `info` or `must_core=debug`
    #[arg(long, env = "MUST_LOG", default_value = "info")]
    pub log_level: String,
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.host.clone(), self.port)
    }
}
