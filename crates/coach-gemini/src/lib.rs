//! Gemini analysis client for the hoopcoach backend.
//!
//! This crate provides:
//! - A Files API upload + poll + generate flow for shot-by-shot analysis
//! - A deterministic mock fallback when no API key is configured
//! - Pure fenced-JSON extraction of the model's reply

pub mod client;
pub mod error;
pub mod response;

// Re-export common types
pub use client::{mock_analysis, GeminiClient, GeminiConfig};
pub use error::{GeminiError, GeminiResult};
pub use response::{extract_json_payload, parse_analysis};
