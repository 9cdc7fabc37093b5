use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use gaspar_remap::app::{self, AppConfig};

/// Web front end for the Viddler to Gaspar mapping tool
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value_t = 50)]
    max_upload_mb: usize,
}

/// Main entry point for the web application
///
/// Starts the upload/download server. Logging is controlled with `RUST_LOG`
/// and defaults to `info`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = AppConfig {
        addr: SocketAddr::new(args.host, args.port),
        max_upload_bytes: args.max_upload_mb * 1024 * 1024,
    };

    app::run(config).await
}
