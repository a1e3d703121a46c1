use serde::{Deserialize, Serialize};

use crate::{
    application::knowledge::KnowledgeStore,
    domain::errors::{DomainError, DomainResult},
};

/// Volumen a inyectar: `(peso / peso_referencia) * volumen_referencia`.
/// `reference_weight_kg > 0` lo garantiza la validación de la tabla.
pub fn dose_volume(body_weight_kg: f64, reference_weight_kg: f64, reference_volume_ml: f64) -> f64 {
    (body_weight_kg / reference_weight_kg) * reference_volume_ml
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DosageQuote {
    pub drug_name: String,
    pub weight_kg: f64,
    pub volume_ml: f64,
    /// "1mL per 10kg"
    pub rate: String,
}

impl DosageQuote {
    pub fn administer_text(&self) -> String {
        format!("Administer: {:.2} mL", self.volume_ml)
    }
}

pub fn calculate(store: &KnowledgeStore, weight_kg: f64, drug_name: &str) -> DomainResult<DosageQuote> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(DomainError::InvalidInput(format!("body weight must be > 0 kg, got {weight_kg}")));
    }
    let dosage = store
        .drug(drug_name)
        .ok_or_else(|| DomainError::NotFound(format!("medication {drug_name}")))?;

    Ok(DosageQuote {
        drug_name: dosage.drug_name.clone(),
        weight_kg,
        volume_ml: dose_volume(weight_kg, dosage.dosage_per_kg, dosage.dosage_rate),
        rate: dosage.rate_description(),
    })
}
