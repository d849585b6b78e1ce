use anyhow::Result;
use clap::Parser;
use gemini_image_relay::models::Config;
use gemini_image_relay::server;
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-image-relay")]
#[command(about = "Relay image generation requests to Gemini")]
struct CliArgs {
    /// Listen address, overriding BIND_ADDR.
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_image_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gemini-image-relay");

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    if let Err(e) = server::serve(&config).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
