use std::sync::Arc;
use crate::application::services::{AssetService, CalculatorService, DirectoryService, ScannerService};

/// Estado compartido para los manejadores HTTP de Axum.
/// Siguiendo la Arquitectura Hexagonal, el estado contiene los servicios (Casos de Uso).
#[derive(Clone)]
pub struct HttpState {
    /// Detección, narrativa e informe PDF.
    pub scanner: Arc<ScannerService>,
    /// Búsqueda de oficinas agrícolas por municipio.
    pub directory: Arc<DirectoryService>,
    /// Calculadora de dosis.
    pub calculator: Arc<CalculatorService>,
    pub assets: Arc<AssetService>,
}
