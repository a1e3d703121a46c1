use async_trait::async_trait;

use crate::domain::{
    detection::Detection,
    errors::DomainResult,
    model::ModelId,
    report::ReportRequest,
};

#[async_trait]
pub trait DetectorPort: Send + Sync {
    /// Ejecuta el modelo sobre una imagen JPEG/PNG codificada.
    async fn detect(&self, image: &[u8], conf_threshold: f32) -> DomainResult<Vec<Detection>>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}

pub trait ReportExporterPort: Send + Sync {
    /// Devuelve el documento listo para descargar.
    fn export(&self, request: &ReportRequest) -> DomainResult<Vec<u8>>;
}

/// Recursos decorativos (animación de la barra lateral). Nunca falla: `None` = usar el icono estático.
#[async_trait]
pub trait AnimationPort: Send + Sync {
    async fn fetch(&self) -> Option<serde_json::Value>;
}
