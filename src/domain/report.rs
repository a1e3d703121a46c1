use chrono::{DateTime, Local};
use serde::Serialize;

use super::{
    condition::ConditionRecord,
    detection::{Detection, DetectionSummary},
};

/// Mensaje mostrado cuando una etiqueta no tiene protocolo, ni siquiera por coincidencia parcial.
pub const NO_PROTOCOL_MESSAGE: &str = "No protocol on file for this classification. Consult a licensed veterinarian.";

/// Contenido consultivo asociado al resultado de un escaneo.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    NoFindings,
    Protocol {
        matched_key: String,
        fuzzy: bool,
        record: ConditionRecord,
    },
    NoProtocolOnFile {
        label: String,
        message: String,
    },
}

impl Advisory {
    pub fn record(&self) -> Option<&ConditionRecord> {
        match self {
            Advisory::Protocol { record, .. } => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub detections: Vec<Detection>,
    pub summary: DetectionSummary,
    pub narrative: String,
    pub advisory: Advisory,
    pub threshold: f32,
}

/// Identificación del caso impresa en la cabecera del informe.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseMeta {
    pub case_id: String,
    pub issued_at: DateTime<Local>,
}

impl CaseMeta {
    pub fn generate() -> Self {
        let issued_at = Local::now();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self {
            case_id: format!("TUK-{}-{}", issued_at.format("%Y%m%d"), &suffix[..8].to_uppercase()),
            issued_at,
        }
    }

    pub fn file_name(&self) -> String {
        format!("TUKLAS_Report_{}.pdf", self.issued_at.format("%Y%m%d_%H%M%S"))
    }
}

/// Todo lo que necesita el exportador para maquetar un informe.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub case: CaseMeta,
    pub image: Vec<u8>,
    pub summary: DetectionSummary,
    pub advisory: Advisory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_id_and_file_name_carry_the_timestamp() {
        let case = CaseMeta::generate();
        let day = case.issued_at.format("%Y%m%d").to_string();
        assert!(case.case_id.starts_with(&format!("TUK-{day}-")));
        assert_eq!(case.case_id.len(), "TUK-YYYYMMDD-".len() + 8);
        assert!(case.file_name().starts_with(&format!("TUKLAS_Report_{day}_")));
        assert!(case.file_name().ends_with(".pdf"));
    }
}
