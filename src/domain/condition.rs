use serde::{Deserialize, Serialize};

/// Parámetros de dosificación: `dosage_rate` mL por cada `dosage_per_kg` kg.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dosage {
    pub drug_name: String,
    pub dosage_rate: f64,
    pub dosage_per_kg: f64,
}

impl Dosage {
    pub fn rate_description(&self) -> String {
        format!("{}mL per {}kg", self.dosage_rate, self.dosage_per_kg)
    }
}

/// Ficha de protocolo asociada a una clase del detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionRecord {
    pub label: String,
    pub severity: String,
    pub cause: String,
    pub harm: String,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
    /// En orden de ejecución.
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub dosage: Option<Dosage>,
}
