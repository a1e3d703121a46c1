use std::collections::HashSet;

use crate::domain::{
    condition::{ConditionRecord, Dosage},
    errors::{DomainError, DomainResult},
};

const EMBEDDED_CONDITIONS: &str = include_str!("../../assets/conditions.json");

/// Resultado de resolver una etiqueta del detector contra la tabla de protocolos.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    Exact(&'a ConditionRecord),
    /// La clave `key` contiene a la etiqueta o viceversa.
    Fuzzy { key: &'a str, record: &'a ConditionRecord },
    NotFound,
}

impl<'a> Lookup<'a> {
    pub fn record(&self) -> Option<&'a ConditionRecord> {
        match self {
            Lookup::Exact(r) => Some(*r),
            Lookup::Fuzzy { record, .. } => Some(*record),
            Lookup::NotFound => None,
        }
    }
}

/// Tabla estática etiqueta -> protocolo. Se carga una vez y solo se lee.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    // Vec y no HashMap: el orden del fichero decide el empate del match difuso.
    records: Vec<ConditionRecord>,
}

impl KnowledgeStore {
    pub fn embedded() -> DomainResult<Self> {
        Self::from_json(EMBEDDED_CONDITIONS)
    }

    pub fn from_json(json: &str) -> DomainResult<Self> {
        let records: Vec<ConditionRecord> = serde_json::from_str(json)
            .map_err(|e| DomainError::InvalidInput(format!("condition table: {e}")))?;
        Self::new(records)
    }

    pub fn new(records: Vec<ConditionRecord>) -> DomainResult<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.label.as_str()) {
                return Err(DomainError::InvalidInput(format!(
                    "duplicate condition key: {}",
                    record.label
                )));
            }
            if let Some(d) = &record.dosage {
                if !(d.dosage_per_kg > 0.0) || !d.dosage_rate.is_finite() {
                    return Err(DomainError::InvalidInput(format!(
                        "invalid dosage for {}: {} mL per {} kg",
                        record.label, d.dosage_rate, d.dosage_per_kg
                    )));
                }
            }
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.label.as_str())
    }

    /// Coincidencia exacta; si no, la primera clave (en orden de tabla) que
    /// contiene a la etiqueta o está contenida en ella.
    pub fn lookup(&self, label: &str) -> Lookup<'_> {
        if let Some(record) = self.records.iter().find(|r| r.label == label) {
            return Lookup::Exact(record);
        }
        if label.is_empty() {
            return Lookup::NotFound;
        }
        self.records
            .iter()
            .find(|r| label.contains(r.label.as_str()) || r.label.contains(label))
            .map(|record| Lookup::Fuzzy { key: record.label.as_str(), record })
            .unwrap_or(Lookup::NotFound)
    }

    /// Fármacos con dosificación, en orden de tabla.
    pub fn drugs(&self) -> impl Iterator<Item = &Dosage> {
        self.records.iter().filter_map(|r| r.dosage.as_ref())
    }

    pub fn drug(&self, name: &str) -> Option<&Dosage> {
        self.drugs().find(|d| d.drug_name == name)
    }
}
