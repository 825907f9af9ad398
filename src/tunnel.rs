// src/tunnel.rs
//! Finds the public ngrok URLs of both services and writes them where the
//! frontend can fetch them.
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TunnelList {
    #[serde(default)]
    tunnels: Vec<Tunnel>,
}

#[derive(Debug, Deserialize)]
struct Tunnel {
    public_url: Option<String>,
    #[serde(default)]
    config: TunnelTarget,
}

#[derive(Debug, Default, Deserialize)]
struct TunnelTarget {
    #[serde(default)]
    addr: String,
}

/// Contents of the published JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedUrls {
    pub backend_url: Option<String>,
    pub frontend_url: Option<String>,
}

/// Public URL of the first tunnel whose local address mentions `port`.
fn select_tunnel(list: &TunnelList, port: &str) -> Option<String> {
    list.tunnels
        .iter()
        .find(|t| t.config.addr.contains(port))
        .and_then(|t| t.public_url.clone())
}

/// Asks the local ngrok agent for its tunnels. Failures are logged and
/// read as "no tunnel".
pub async fn get_tunnel_url(client: &reqwest::Client, api_url: &str, port: &str) -> Option<String> {
    let list = async {
        client
            .get(api_url)
            .send()
            .await?
            .error_for_status()?
            .json::<TunnelList>()
            .await
    }
    .await;

    match list {
        Ok(list) => {
            let url = select_tunnel(&list, port);
            tracing::debug!("Tunnel for port {}: {:?}", port, url);
            url
        }
        Err(e) => {
            tracing::error!("Error fetching ngrok tunnels for port {}: {}", port, e);
            None
        }
    }
}

pub async fn write_url_file(path: &Path, urls: &PublishedUrls) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_vec(urls)?).await?;
    tracing::info!(
        "Written backend and frontend URLs to {}: backend={:?} frontend={:?}",
        path.display(),
        urls.backend_url,
        urls.frontend_url
    );
    Ok(())
}
