#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! ViralCast API server binary.

use std::path::PathBuf;

use clap::Parser;
use viralcast_server::ServerConfig;

#[derive(Parser)]
#[command(name = "viralcast_server", about = "COVID-19 case forecasting API server")]
struct Cli {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind to (overrides `BIND_ADDR`)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides `PORT`)
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding `models/` and `output/` (overrides
    /// `VIRALCAST_ASSETS_DIR`)
    #[arg(long)]
    assets_dir: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_toml_file(path).map_err(|e| {
            log::error!("Failed to read config {}: {e}", path.display());
            std::io::Error::other(e)
        })?,
        None => ServerConfig::default(),
    };
    config.apply_env();

    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(assets_dir) = cli.assets_dir {
        config.assets_dir = assets_dir;
    }

    viralcast_server::run_server(config).await
}
