//! must-demo: serve the user API behind the JSON recovery boundary.

use clap::Parser;
use must_core::recover;
use must_demo::{init_logging, Cli, UserApi};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format)?;

    let config = cli.server_config();
    info!("try: GET /users?id=1  POST /users  PUT /users?id=1  DELETE /users?id=1  GET /users/all");
    must_core::run(recover(UserApi::seeded()), &config)?;
    Ok(())
}
