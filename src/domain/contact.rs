use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactRecord {
    pub municipality: String,
    pub office: String,
    pub person: String,
    pub phone: String,
    pub email: String,
}
