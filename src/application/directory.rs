use crate::domain::contact::ContactRecord;

const EMBEDDED_CONTACTS: &str = include_str!("../../assets/contacts.json");

pub fn embedded_contacts() -> serde_json::Result<Vec<ContactRecord>> {
    serde_json::from_str(EMBEDDED_CONTACTS)
}

/// Resultado de filtrar el directorio; "sin coincidencias" es un valor, no un error.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryResult {
    Entries(Vec<ContactRecord>),
    NoMatch,
}

#[cfg(test)]
impl DirectoryResult {
    pub fn contacts(&self) -> &[ContactRecord] {
        match self {
            DirectoryResult::Entries(c) => c,
            DirectoryResult::NoMatch => &[],
        }
    }
}

/// Búsqueda por municipio, sin distinguir mayúsculas. Consulta vacía = todo.
pub fn filter(contacts: &[ContactRecord], query: &str) -> DirectoryResult {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return DirectoryResult::Entries(contacts.to_vec());
    }
    let hits: Vec<ContactRecord> = contacts
        .iter()
        .filter(|c| c.municipality.to_lowercase().contains(&query))
        .cloned()
        .collect();
    if hits.is_empty() {
        DirectoryResult::NoMatch
    } else {
        DirectoryResult::Entries(hits)
    }
}
