//! Skinflip server binary.

use clap::Parser;
use skinflip::api::ApiServer;
use skinflip::config::ConfigLoader;

#[derive(Parser, Debug)]
#[command(name = "skinflip")]
#[command(about = "Real-time coin-flip wagering server", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Listen address override
    #[arg(long)]
    host: Option<String>,

    /// Listen port override
    #[arg(long)]
    port: Option<u16>,

    /// Flip delay override in milliseconds
    #[arg(long)]
    flip_delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(ref path) = args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;

    if let Some(host) = args.host {
        config.server.listen_address = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(delay) = args.flip_delay_ms {
        config.game.flip_delay_ms = delay;
    }

    ApiServer::new(config).run().await
}
