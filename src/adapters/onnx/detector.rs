use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::adapters::imaging;
use crate::adapters::onnx::yolo_engine::OnnxYoloEngine;
use crate::application::ports::DetectorPort;
use crate::domain::{
    detection::Detection,
    errors::{DomainError, DomainResult},
    model::InferenceConfig,
};

/// Adaptador del detector. La sesión ONNX se crea en la primera petición y
/// se reutiliza durante toda la vida del proceso; las inferencias se serializan.
pub struct OnnxDetector {
    config: InferenceConfig,
    engine: OnceCell<Arc<Mutex<OnnxYoloEngine>>>,
}

impl OnnxDetector {
    pub fn new(config: InferenceConfig) -> Self {
        Self { config, engine: OnceCell::new() }
    }

    async fn engine(&self) -> DomainResult<Arc<Mutex<OnnxYoloEngine>>> {
        self.engine
            .get_or_try_init(|| async {
                let path = self.config.model.onnx_path.clone();
                let names = self.config.class_names.clone();
                info!("🧠 Loading model {} from {}", self.config.model.name, path);

                let t0 = std::time::Instant::now();
                let engine = tokio::task::spawn_blocking(move || OnnxYoloEngine::load(&path, names))
                    .await
                    .map_err(|e| DomainError::OperationFailed(format!("model load task: {e}")))?
                    .map_err(|e| {
                        error!("Error cargando modelo YOLO: {:?}", e);
                        DomainError::ModelUnavailable(format!(
                            "failed to load {}: {e}",
                            self.config.model.onnx_path
                        ))
                    })?;

                info!("✅ Model ready in {:.0} ms", t0.elapsed().as_secs_f32() * 1000.0);
                Ok::<_, DomainError>(Arc::new(Mutex::new(engine)))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl DetectorPort for OnnxDetector {
    async fn detect(&self, image: &[u8], conf_threshold: f32) -> DomainResult<Vec<Detection>> {
        // Validar la imagen antes de pagar la carga del modelo.
        let rgb = imaging::decode_upload(image)?.to_rgb8();
        let engine = self.engine().await?;
        let params = self.config.params.with_threshold(conf_threshold);

        tokio::task::spawn_blocking(move || {
            let mut engine = engine
                .lock()
                .map_err(|_| DomainError::OperationFailed("engine lock poisoned".into()))?;
            engine
                .infer(&rgb, &params)
                .map_err(|e| DomainError::OperationFailed(format!("inference failed: {e}")))
        })
        .await
        .map_err(|e| DomainError::OperationFailed(format!("inference task: {e}")))?
    }
}
