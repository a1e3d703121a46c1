use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::application::ports::AnimationPort;

/// Descarga la animación Lottie de la barra lateral una sola vez. Cualquier
/// fallo (red, estado HTTP, JSON inválido) deja la UI con el icono estático.
pub struct LottieAnimationFetcher {
    client: reqwest::Client,
    url: Option<String>,
    cached: OnceCell<Option<serde_json::Value>>,
}

impl LottieAnimationFetcher {
    pub fn new(url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, url, cached: OnceCell::new() }
    }

    async fn download(&self, url: &str) -> Option<serde_json::Value> {
        let res = match self.client.get(url).send().await {
            Ok(res) => res,
            Err(e) => {
                debug!("Animation fetch failed: {}", e);
                return None;
            }
        };
        if !res.status().is_success() {
            debug!("Animation fetch returned {}", res.status());
            return None;
        }
        match res.json::<serde_json::Value>().await {
            // Un Lottie válido es un objeto con la lista de capas.
            Ok(json) if json.get("layers").is_some_and(|l| l.is_array()) => {
                info!("✨ Sidebar animation loaded");
                Some(json)
            }
            Ok(_) => {
                debug!("Animation payload is not a Lottie document");
                None
            }
            Err(e) => {
                debug!("Animation payload is not JSON: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl AnimationPort for LottieAnimationFetcher {
    async fn fetch(&self) -> Option<serde_json::Value> {
        let url = self.url.as_deref()?;
        self.cached.get_or_init(|| self.download(url)).await.clone()
    }
}
