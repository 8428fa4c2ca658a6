pub mod mapping;
pub mod pdf;
