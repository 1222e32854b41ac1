//! Persistence for fund registrations and quotes

pub mod disk;
pub mod memory;
