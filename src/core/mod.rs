//! Configuration, domain types and shared state

pub mod config;
pub mod models;
pub mod registry;
