//! Database models for the Cafe POS backend
//!
//! Re-exports models from the shared crate and adds backend-specific models

pub use shared::models::*;
