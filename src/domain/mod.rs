pub mod condition;
pub mod contact;
pub mod detection;
pub mod errors;
pub mod model;
pub mod page;
pub mod report;
