pub mod composer;
pub mod directory;
pub mod dosage;
pub mod dto;
pub mod knowledge;
pub mod ports;
pub mod services;
