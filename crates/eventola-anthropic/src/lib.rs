// Anthropic Provider Implementation
//
// This crate provides an Anthropic Claude implementation of the CopyWriter
// trait from eventola-core, used for generating event taglines and
// descriptions through the Messages API.

mod client;

pub use client::AnthropicCopyWriter;

// Re-export core types for convenience
pub use eventola_core::copy::{CopyConfig, CopyWriter};
