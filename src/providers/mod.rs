//! Data sources for fund registrations and quotes

pub mod cvm_catalog;
pub mod quote_file;
