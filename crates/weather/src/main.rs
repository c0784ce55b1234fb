use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather::{WeatherConfig, WeatherService};

#[tokio::main]
async fn main() {
    // stdout carries the protocol
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = WeatherConfig::from_env()?;
    tracing::info!(url = %config.api_url, "serving weather over stdio");

    let service = WeatherService::new(config)?;
    mcp::serve_stdio(&service).await?;
    Ok(())
}
