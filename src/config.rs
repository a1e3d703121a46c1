use clap::Parser;

use crate::domain::model::{YoloParams, DEFAULT_CONF_THRESHOLD};

/// TUKLAS: escáner de lesiones cutáneas porcinas con informe veterinario.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Fichero ONNX del detector (YOLO). Si falta, el escáner queda deshabilitado.
    #[arg(long, env = "TUKLAS_MODEL", default_value = "models/best.onnx", value_name = "FILE")]
    pub model: String,

    /// Nombres de clase, uno por línea, en orden de class_id. Por defecto la lista embebida.
    #[arg(long, env = "TUKLAS_LABELS", value_name = "FILE")]
    pub labels: Option<String>,

    #[arg(long, env = "TUKLAS_PORT", default_value_t = 8090)]
    pub port: u16,

    /// Carpeta con la página estática.
    #[arg(long, env = "TUKLAS_STATIC_DIR", default_value = "static", value_name = "DIR")]
    pub static_dir: String,

    /// Tamaño máximo de una subida, en MiB.
    #[arg(long, env = "TUKLAS_MAX_UPLOAD_MB", default_value_t = 10)]
    pub max_upload_mb: usize,

    /// Sensibilidad por defecto (0.0 - 1.0).
    #[arg(long, env = "TUKLAS_CONFIDENCE", default_value_t = DEFAULT_CONF_THRESHOLD)]
    pub confidence: f32,

    /// Lado de la entrada del modelo en píxeles.
    #[arg(long, env = "TUKLAS_INPUT_SIZE", default_value_t = 640)]
    pub input_size: u32,

    /// Umbral IoU de NMS (0.0 - 1.0).
    #[arg(long, env = "TUKLAS_IOU", default_value_t = 0.45)]
    pub iou: f32,

    #[arg(long, env = "TUKLAS_MAX_DETECTIONS", default_value_t = 100)]
    pub max_detections: usize,

    /// URL de la animación Lottie de la barra lateral (opcional, decorativa).
    #[arg(long, env = "TUKLAS_ANIMATION_URL", value_name = "URL")]
    pub animation_url: Option<String>,
}

impl Config {
    pub fn yolo_params(&self) -> YoloParams {
        YoloParams {
            input_size: self.input_size,
            conf_threshold: self.confidence,
            iou_threshold: self.iou,
            max_detections: self.max_detections,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.confidence) {
            anyhow::bail!("--confidence must be within [0, 1], got {}", self.confidence);
        }
        if !(0.0..=1.0).contains(&self.iou) {
            anyhow::bail!("--iou must be within [0, 1], got {}", self.iou);
        }
        if self.input_size == 0 || self.max_upload_mb == 0 {
            anyhow::bail!("--input-size and --max-upload-mb must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_scanner_flow() {
        let cfg = Config::parse_from(["tuklas-scanner"]);
        assert_eq!(cfg.model, "models/best.onnx");
        assert_eq!(cfg.port, 8090);
        assert_eq!(cfg.confidence, 0.40);
        assert_eq!(cfg.max_upload_bytes(), 10 * 1024 * 1024);
        assert!(cfg.animation_url.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let cfg = Config::parse_from(["tuklas-scanner", "--confidence", "1.5"]);
        assert!(cfg.validate().is_err());
    }
}
