use serde::{Deserialize, Serialize};

use crate::{
    application::{directory::DirectoryResult, dosage::DosageQuote, services::ScannerStatus},
    domain::{
        condition::Dosage,
        contact::ContactRecord,
        detection::{Detection, DetectionSummary},
        page::Page,
        report::{Advisory, ScanOutcome},
    },
};

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub scanner: ScannerStatus,
    pub pages: Vec<PageInfo>,
    pub default_page: Page,
    pub default_threshold: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub id: Page,
    pub title: &'static str,
}

impl From<Page> for PageInfo {
    fn from(p: Page) -> Self {
        Self { id: p, title: p.title() }
    }
}

/// Resumen con la confianza ya en porcentaje para la UI.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub count: usize,
    pub labels: Vec<String>,
    pub primary_label: Option<String>,
    pub mean_confidence: f32,
    pub confidence_pct: f32,
}

impl From<&DetectionSummary> for SummaryView {
    fn from(s: &DetectionSummary) -> Self {
        Self {
            count: s.count,
            labels: s.labels.clone(),
            primary_label: s.primary_label.clone(),
            mean_confidence: s.mean_confidence,
            confidence_pct: s.confidence_pct(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub summary: SummaryView,
    pub narrative: String,
    pub advisory: Advisory,
    pub detections: Vec<Detection>,
    pub threshold: f32,
    /// `data:image/jpeg;base64,...` con las cajas dibujadas; ausente si no se pudo generar.
    pub annotated_image: Option<String>,
}

impl ScanResponse {
    pub fn new(outcome: ScanOutcome, annotated_image: Option<String>) -> Self {
        Self {
            summary: SummaryView::from(&outcome.summary),
            narrative: outcome.narrative,
            advisory: outcome.advisory,
            detections: outcome.detections,
            threshold: outcome.threshold,
            annotated_image,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryResponse {
    pub query: String,
    /// `false` cuando la búsqueda no encontró ningún municipio.
    pub found: bool,
    pub contacts: Vec<ContactRecord>,
}

impl DirectoryResponse {
    pub fn new(query: String, result: DirectoryResult) -> Self {
        match result {
            DirectoryResult::Entries(contacts) => Self { query, found: true, contacts },
            DirectoryResult::NoMatch => Self { query, found: false, contacts: Vec::new() },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DrugsResponse {
    pub drugs: Vec<Dosage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DosageRequest {
    pub weight_kg: f64,
    pub drug_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DosageResponse {
    #[serde(flatten)]
    pub quote: DosageQuote,
    pub administer: String,
}

impl From<DosageQuote> for DosageResponse {
    fn from(quote: DosageQuote) -> Self {
        Self { administer: quote.administer_text(), quote }
    }
}
