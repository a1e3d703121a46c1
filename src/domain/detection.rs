use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Una caja devuelta por el detector. La geometría solo se usa para dibujar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
    pub label: String,
}

/// Vista agregada de una inferencia: total, etiquetas únicas y confianza media.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionSummary {
    pub count: usize,
    /// Etiquetas únicas en orden de primera aparición.
    pub labels: Vec<String>,
    /// Media en [0,1]; 0 cuando no hay detecciones.
    pub mean_confidence: f32,
    /// Etiqueta de la detección con mayor confianza.
    pub primary_label: Option<String>,
}

impl DetectionSummary {
    pub fn from_detections(detections: &[Detection]) -> Self {
        let mut labels: Vec<String> = Vec::new();
        for det in detections {
            if !labels.iter().any(|l| l == &det.label) {
                labels.push(det.label.clone());
            }
        }

        let mean_confidence = if detections.is_empty() {
            0.0
        } else {
            detections.iter().map(|d| d.score).sum::<f32>() / detections.len() as f32
        };

        let primary_label = detections
            .iter()
            .fold(None::<&Detection>, |best, det| match best {
                Some(b) if b.score >= det.score => Some(b),
                _ => Some(det),
            })
            .map(|d| d.label.clone());

        Self {
            count: detections.len(),
            labels,
            mean_confidence,
            primary_label,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Confianza media en porcentaje, tal como se muestra en la UI y el PDF.
    pub fn confidence_pct(&self) -> f32 {
        self.mean_confidence * 100.0
    }
}

/// "2 Sarcoptic Mange, 1 Swine Pox" para los logs.
pub fn summarize_detections(detections: &[Detection]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for det in detections {
        let entry = counts.entry(det.label.as_str()).or_insert_with(|| {
            order.push(det.label.as_str());
            0
        });
        *entry += 1;
    }
    order
        .iter()
        .map(|label| format!("{} {}", counts[label], label))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
pub(crate) fn det(label: &str, score: f32) -> Detection {
    Detection {
        x1: 0.0,
        y1: 0.0,
        x2: 10.0,
        y2: 10.0,
        score,
        class_id: 0,
        label: label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_confidence_of_two_detections() {
        let summary = DetectionSummary::from_detections(&[det("Swine Pox", 0.8), det("Swine Pox", 0.6)]);
        assert_eq!(summary.count, 2);
        assert!((summary.mean_confidence - 0.7).abs() < 1e-6);
        assert!((summary.confidence_pct() - 70.0).abs() < 1e-4);
        assert_eq!(format!("{:.1}", summary.confidence_pct()), "70.0");
    }

    #[test]
    fn empty_summary_has_zero_confidence() {
        let summary = DetectionSummary::from_detections(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.mean_confidence, 0.0);
        assert!(summary.labels.is_empty());
        assert_eq!(summary.primary_label, None);
    }

    #[test]
    fn labels_are_unique_in_first_seen_order() {
        let summary = DetectionSummary::from_detections(&[
            det("Ringworm", 0.5),
            det("Sarcoptic Mange", 0.9),
            det("Ringworm", 0.4),
        ]);
        assert_eq!(summary.labels, vec!["Ringworm", "Sarcoptic Mange"]);
        assert_eq!(summary.primary_label.as_deref(), Some("Sarcoptic Mange"));
    }

    #[test]
    fn summarize_counts_per_label() {
        let text = summarize_detections(&[det("A", 0.5), det("B", 0.5), det("A", 0.5)]);
        assert_eq!(text, "2 A, 1 B");
    }
}
