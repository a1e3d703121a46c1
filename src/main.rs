mod adapters;
mod application;
mod config;
mod domain;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::adapters::{
    assets::animation::LottieAnimationFetcher,
    http::{router, state::HttpState},
    onnx::{detector::OnnxDetector, model_catalog::OnnxModelCatalog},
    pdf::exporter::PdfReportExporter,
};
use crate::application::{
    directory::embedded_contacts,
    knowledge::KnowledgeStore,
    services::{AssetService, CalculatorService, DirectoryService, ScannerService},
};
use crate::config::Config;
use crate::domain::model::{parse_class_names, InferenceConfig, ModelId};

const EMBEDDED_LABELS: &str = include_str!("../assets/labels.txt");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cfg = Config::parse();
    cfg.validate()?;

    // 2. Datos estáticos: se cargan una vez y se comparten en solo lectura.
    let knowledge = Arc::new(KnowledgeStore::embedded().context("invalid condition table")?);
    let contacts = Arc::new(embedded_contacts().context("invalid contact directory")?);
    tracing::info!(
        "📚 {} protocols, {} directory contacts loaded",
        knowledge.len(),
        contacts.len()
    );

    tracing::debug!("Protocol keys: {:?}", knowledge.keys().collect::<Vec<_>>());

    let class_names = match &cfg.labels {
        Some(path) => parse_class_names(
            &std::fs::read_to_string(path).with_context(|| format!("reading labels file {path}"))?,
        ),
        None => parse_class_names(EMBEDDED_LABELS),
    };

    // 3. Adaptadores de infraestructura
    let model = ModelId { name: "tuklas-yolo".to_string(), onnx_path: cfg.model.clone() };
    let detector = Arc::new(OnnxDetector::new(InferenceConfig {
        model: model.clone(),
        params: cfg.yolo_params(),
        class_names,
    }));
    let model_cat = Arc::new(OnnxModelCatalog::new());
    let exporter = Arc::new(PdfReportExporter::new());
    let animation = Arc::new(LottieAnimationFetcher::new(cfg.animation_url.clone()));

    // 4. Servicios (casos de uso)
    let scanner = ScannerService::new(detector, model_cat, &model, knowledge.clone(), exporter, cfg.confidence).await;
    let state = HttpState {
        scanner: Arc::new(scanner),
        directory: Arc::new(DirectoryService::new(contacts)),
        calculator: Arc::new(CalculatorService::new(knowledge)),
        assets: Arc::new(AssetService::new(animation)),
    };

    // 5. Router de Axum y archivos estáticos
    let app = router(state, cfg.max_upload_bytes()).fallback_service(ServeDir::new(&cfg.static_dir));

    let addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!("🚀 TUKLAS Diagnostics en http://{}", addr);
    tracing::info!("📂 Archivos estáticos servidos desde '{}'", cfg.static_dir);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
