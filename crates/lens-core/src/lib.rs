//! # lens-core
//!
//! Core types and error taxonomy for Label Lens.
//!
//! This crate provides the foundational types shared across all Label Lens crates:
//! - The structured verdict ([`result::AnalysisResult`]) and its parts
//! - Input units handed to the inference collaborator
//! - The persona catalog and per-request persona context
//! - The classified error taxonomy raised at the invoker boundary
//! - The [`analyzer::Analyzer`] seam implemented by inference clients

pub mod analyzer;
pub mod credential;
pub mod errors;
pub mod input;
pub mod persona;
pub mod result;

pub use analyzer::Analyzer;
pub use credential::Credential;
pub use errors::{AnalysisError, CatalogError, ErrorKind};
pub use input::{ImageUnit, InputUnit};
pub use persona::{Persona, PersonaCatalog, PersonaContext, SubOption};
pub use result::{
    AnalysisResult, DietaryClass, DimensionScore, Insight, InsightCategory, Tradeoffs,
    Uncertainty, Villain,
};
