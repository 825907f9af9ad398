// src/bin/tunnel_publisher.rs
use attendance_web::{
    config::TunnelConfig,
    tunnel::{get_tunnel_url, write_url_file, PublishedUrls},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    attendance_web::init_tracing();

    let config = TunnelConfig::from_env()?;
    let client = reqwest::Client::new();

    let urls = PublishedUrls {
        backend_url: get_tunnel_url(&client, &config.api_url, &config.backend_port).await,
        frontend_url: get_tunnel_url(&client, &config.api_url, &config.frontend_port).await,
    };

    if urls.backend_url.is_none() && urls.frontend_url.is_none() {
        tracing::warn!("No active ngrok tunnels found for backend or frontend ports");
        return Ok(());
    }
    write_url_file(&config.output_file, &urls).await
}
