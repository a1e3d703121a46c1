use serde::{Deserialize, Serialize};

/// Sensibilidad por defecto del escáner.
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.40;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,       // logical name, e.g. "tuklas-yolo11n"
    pub onnx_path: String,  // filesystem path
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoloParams {
    pub input_size: u32,        // 640 typical
    pub conf_threshold: f32,    // 0..1
    pub iou_threshold: f32,     // 0..1
    pub max_detections: usize,  // e.g. 100
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: 0.45,
            max_detections: 100,
        }
    }
}

impl YoloParams {
    /// Copia de los parámetros con otro umbral de confianza.
    pub fn with_threshold(&self, conf_threshold: f32) -> Self {
        Self { conf_threshold, ..self.clone() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub model: ModelId,
    pub params: YoloParams,
    /// Nombre de cada clase, indexado por class_id.
    pub class_names: Vec<String>,
}

/// Una etiqueta por línea; se ignoran líneas vacías y comentarios `#`.
pub fn parse_class_names(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
