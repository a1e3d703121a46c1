use async_trait::async_trait;
use std::path::Path;

use crate::application::ports::ModelCatalogPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::ModelId;

pub struct OnnxModelCatalog;

impl OnnxModelCatalog {
    pub fn new() -> Self { Self }
}

#[async_trait]
impl ModelCatalogPort for OnnxModelCatalog {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()> {
        if model.onnx_path.trim().is_empty() {
            return Err(DomainError::InvalidInput("onnx_path empty".into()));
        }
        let path = Path::new(&model.onnx_path);
        if !path.is_file() {
            let shown = std::fs::canonicalize(path.parent().unwrap_or(Path::new(".")))
                .map(|dir| dir.join(path.file_name().unwrap_or_default()))
                .unwrap_or_else(|_| path.to_path_buf());
            return Err(DomainError::NotFound(format!(
                "model file not found: {} (searched {})",
                model.onnx_path,
                shown.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(path: &str) -> ModelId {
        ModelId { name: "test".into(), onnx_path: path.into() }
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = OnnxModelCatalog::new()
            .validate_model(&model("models/does-not-exist.onnx"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(err.to_string().contains("models/does-not-exist.onnx"));
    }

    #[tokio::test]
    async fn empty_path_is_invalid() {
        let err = OnnxModelCatalog::new().validate_model(&model("  ")).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn existing_file_is_accepted() {
        assert!(OnnxModelCatalog::new().validate_model(&model("Cargo.toml")).await.is_ok());
    }
}
