//! All model-inference functionality

pub mod client;
pub mod prompt;

// Re-export main types for convenience
pub use client::{ChatMessage, ChatRole, ModelClient, ModelProfiles, WatsonxClient};
