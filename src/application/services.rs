use std::sync::{Arc, Mutex};

use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    application::{
        composer::ReportComposer,
        directory::{self, DirectoryResult},
        dosage::{self, DosageQuote},
        knowledge::{KnowledgeStore, Lookup},
        ports::{AnimationPort, DetectorPort, ModelCatalogPort, ReportExporterPort},
    },
    domain::{
        condition::Dosage,
        contact::ContactRecord,
        detection::{summarize_detections, DetectionSummary},
        errors::{DomainError, DomainResult},
        model::ModelId,
        report::{Advisory, CaseMeta, ReportRequest, ScanOutcome, NO_PROTOCOL_MESSAGE},
    },
};

/// Estado del escáner tras comprobar el modelo al arrancar.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScannerStatus {
    Ready,
    Disabled { reason: String },
}

/// Caso de uso principal: imagen -> detecciones -> narrativa + protocolo (+ PDF).
pub struct ScannerService {
    detector: Arc<dyn DetectorPort>,
    knowledge: Arc<KnowledgeStore>,
    exporter: Arc<dyn ReportExporterPort>,
    composer: Mutex<ReportComposer<StdRng>>,
    status: ScannerStatus,
    default_threshold: f32,
}

impl ScannerService {
    /// Valida el modelo antes de aceptar peticiones. Si falta, el escáner
    /// queda deshabilitado pero el resto de la aplicación sigue disponible.
    pub async fn new(
        detector: Arc<dyn DetectorPort>,
        model_catalog: Arc<dyn ModelCatalogPort>,
        model: &ModelId,
        knowledge: Arc<KnowledgeStore>,
        exporter: Arc<dyn ReportExporterPort>,
        default_threshold: f32,
    ) -> Self {
        let status = match model_catalog.validate_model(model).await {
            Ok(()) => ScannerStatus::Ready,
            Err(e) => {
                warn!("⚠️ Scanner disabled: {}", e);
                ScannerStatus::Disabled { reason: e.to_string() }
            }
        };
        Self {
            detector,
            knowledge,
            exporter,
            composer: Mutex::new(ReportComposer::new(StdRng::from_entropy())),
            status,
            default_threshold,
        }
    }

    /// Sustituye la fuente aleatoria del compositor (tests).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.composer = Mutex::new(ReportComposer::new(rng));
        self
    }

    pub fn status(&self) -> &ScannerStatus {
        &self.status
    }

    pub fn default_threshold(&self) -> f32 {
        self.default_threshold
    }

    pub async fn scan(&self, image: &[u8], threshold: Option<f32>) -> DomainResult<ScanOutcome> {
        if let ScannerStatus::Disabled { reason } = &self.status {
            return Err(DomainError::ModelUnavailable(reason.clone()));
        }
        let threshold = threshold.unwrap_or(self.default_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DomainError::InvalidInput(format!(
                "confidence threshold must be within [0, 1], got {threshold}"
            )));
        }

        let t0 = std::time::Instant::now();
        let detections = self.detector.detect(image, threshold).await?;
        let summary = DetectionSummary::from_detections(&detections);

        let advisory = self.advisory_for(&summary);
        let narrative = {
            let primary = summary.primary_label.as_deref().unwrap_or_default();
            let mut composer = self
                .composer
                .lock()
                .map_err(|_| DomainError::OperationFailed("composer lock poisoned".into()))?;
            composer.compose(&summary, primary)
        };

        info!(
            "🔍 Scan: {} detection(s) [{}] at threshold {:.2} in {:.0} ms",
            summary.count,
            summarize_detections(&detections),
            threshold,
            t0.elapsed().as_secs_f32() * 1000.0
        );

        Ok(ScanOutcome {
            detections,
            summary,
            narrative,
            advisory,
            threshold,
        })
    }

    /// Escanea y maqueta el informe descargable.
    pub async fn report(
        &self,
        image: Vec<u8>,
        threshold: Option<f32>,
        case: CaseMeta,
    ) -> DomainResult<(ScanOutcome, Vec<u8>)> {
        let outcome = self.scan(&image, threshold).await?;
        let request = ReportRequest {
            case,
            image,
            summary: outcome.summary.clone(),
            advisory: outcome.advisory.clone(),
        };

        let exporter = self.exporter.clone();
        let pdf = tokio::task::spawn_blocking(move || exporter.export(&request))
            .await
            .map_err(|e| DomainError::OperationFailed(format!("report task: {e}")))??;

        info!("📄 Report generated ({} bytes)", pdf.len());
        Ok((outcome, pdf))
    }

    fn advisory_for(&self, summary: &DetectionSummary) -> Advisory {
        let Some(label) = summary.primary_label.as_deref() else {
            return Advisory::NoFindings;
        };
        match self.knowledge.lookup(label) {
            Lookup::Exact(record) => Advisory::Protocol {
                matched_key: record.label.clone(),
                fuzzy: false,
                record: record.clone(),
            },
            Lookup::Fuzzy { key, record } => {
                info!("Protocol for '{}' resolved by partial match to '{}'", label, key);
                Advisory::Protocol {
                    matched_key: key.to_string(),
                    fuzzy: true,
                    record: record.clone(),
                }
            }
            Lookup::NotFound => {
                warn!("No protocol on file for label '{}'", label);
                Advisory::NoProtocolOnFile {
                    label: label.to_string(),
                    message: NO_PROTOCOL_MESSAGE.to_string(),
                }
            }
        }
    }
}

/// Directorio de oficinas agrícolas.
pub struct DirectoryService {
    contacts: Arc<Vec<ContactRecord>>,
}

impl DirectoryService {
    pub fn new(contacts: Arc<Vec<ContactRecord>>) -> Self {
        Self { contacts }
    }

    pub fn search(&self, query: &str) -> DirectoryResult {
        directory::filter(&self.contacts, query)
    }
}

/// Calculadora de dosis de la barra lateral.
pub struct CalculatorService {
    knowledge: Arc<KnowledgeStore>,
}

impl CalculatorService {
    pub fn new(knowledge: Arc<KnowledgeStore>) -> Self {
        Self { knowledge }
    }

    pub fn drugs(&self) -> Vec<Dosage> {
        self.knowledge.drugs().cloned().collect()
    }

    pub fn quote(&self, weight_kg: f64, drug_name: &str) -> DomainResult<DosageQuote> {
        dosage::calculate(&self.knowledge, weight_kg, drug_name)
    }
}

/// Animación decorativa; cualquier fallo se traduce en `None`.
pub struct AssetService {
    animation: Arc<dyn AnimationPort>,
}

impl AssetService {
    pub fn new(animation: Arc<dyn AnimationPort>) -> Self {
        Self { animation }
    }

    pub async fn animation(&self) -> Option<serde_json::Value> {
        self.animation.fetch().await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::domain::detection::Detection;
    use async_trait::async_trait;

    /// Detector de pega que devuelve siempre las mismas cajas.
    pub struct StubDetector(pub Vec<Detection>);

    #[async_trait]
    impl DetectorPort for StubDetector {
        async fn detect(&self, image: &[u8], conf_threshold: f32) -> DomainResult<Vec<Detection>> {
            if image.is_empty() {
                return Err(DomainError::UnreadableImage("empty upload".into()));
            }
            Ok(self.0.iter().filter(|d| d.score >= conf_threshold).cloned().collect())
        }
    }

    pub struct StubCatalog(pub bool);

    #[async_trait]
    impl ModelCatalogPort for StubCatalog {
        async fn validate_model(&self, model: &ModelId) -> DomainResult<()> {
            if self.0 {
                Ok(())
            } else {
                Err(DomainError::NotFound(format!("model file not found: {}", model.onnx_path)))
            }
        }
    }

    pub struct StubExporter;

    impl ReportExporterPort for StubExporter {
        fn export(&self, request: &ReportRequest) -> DomainResult<Vec<u8>> {
            Ok(format!("%PDF {}", request.case.case_id).into_bytes())
        }
    }

    pub fn model() -> ModelId {
        ModelId { name: "test".into(), onnx_path: "models/missing.onnx".into() }
    }

    pub async fn scanner(detections: Vec<Detection>, model_present: bool) -> ScannerService {
        ScannerService::new(
            Arc::new(StubDetector(detections)),
            Arc::new(StubCatalog(model_present)),
            &model(),
            Arc::new(KnowledgeStore::embedded().unwrap()),
            Arc::new(StubExporter),
            crate::domain::model::DEFAULT_CONF_THRESHOLD,
        )
        .await
        .with_rng(StdRng::seed_from_u64(42))
    }
}
