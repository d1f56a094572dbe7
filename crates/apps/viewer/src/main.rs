use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use layers::headless::HeadlessMap;
use layers::{MapWidget, Viewport};
use overlays::HttpFetcher;
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewer::app::OverlayApp;
use viewer::config::{Args, ViewerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ViewerConfig::resolve(args, |key| std::env::var(key).ok())?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("wikimap/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()?;
    let fetcher = Arc::new(HttpFetcher::with_client(client));

    let mut map = HeadlessMap::new(Viewport::new(config.center, config.zoom, config.size_px));
    let mut app = OverlayApp::new(&config, fetcher)?;
    app.start(&mut map, &config);
    if let Some(bounds) = config.fit {
        map.fit_bounds(bounds);
    }

    let stats = app.run_until_idle(&mut map).await;
    info!("done: {} of {} request(s) applied", stats.applied, stats.issued);
    println!("{}", serde_json::to_string_pretty(&app.summary(&map))?);
    Ok(())
}
