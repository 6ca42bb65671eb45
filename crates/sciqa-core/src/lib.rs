//! sciqa-core
//!
//! Document-to-chunk pipeline (normalization, section splitting,
//! equation-aware chunking), citation rendering, shared types, collaborator
//! traits and configuration.

pub mod chunker;
pub mod citations;
pub mod config;
pub mod document;
pub mod error;
pub mod normalize;
pub mod sections;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
