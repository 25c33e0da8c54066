//! Trellis Core Types
//!
//! This crate provides the foundational types used throughout Trellis:
//! - Handle types (ElementId, ValueId, ClassId, FeatureId)
//! - The record format used for extract/create/paste
//! - Structural error types
//! - Problem message texts shared by the constraint engine

mod error;
mod id;
pub mod messages;
mod record;

pub use error::*;
pub use id::*;
pub use record::*;
