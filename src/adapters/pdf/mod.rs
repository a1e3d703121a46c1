pub mod exporter;
pub mod layout;
