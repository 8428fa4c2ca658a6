pub mod data_sources;
pub mod merge;
pub mod pdf;
pub mod templates;
