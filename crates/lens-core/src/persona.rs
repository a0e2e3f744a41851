//! Persona catalog and per-request persona context.
//!
//! A persona is a named lens (for example a health condition) with
//! sub-options that narrow it. The catalog is read-only; a fresh
//! [`PersonaContext`] is built for every selection.
//!
//! Catalog TOML shape:
//!
//! ```toml
//! [personas.diabetes]
//! label = "Diabetes"
//! base_instruction = "Assess the product for someone managing diabetes."
//!
//! [personas.diabetes.sub_options.type2]
//! label = "Type 2"
//! instruction = "Weigh added sugars and refined carbohydrates heavily."
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonaCatalog {
    #[serde(default)]
    pub personas: BTreeMap<String, Persona>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub label: String,
    pub base_instruction: String,
    #[serde(default)]
    pub sub_options: BTreeMap<String, SubOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubOption {
    pub label: String,
    pub instruction: String,
}

impl PersonaCatalog {
    /// Parse a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Toml`] if the text does not match the catalog shape.
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, or
    /// [`CatalogError::Toml`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    #[must_use]
    pub fn persona(&self, id: &str) -> Option<&Persona> {
        self.personas.get(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

/// The persona selection an analysis request is issued under.
///
/// A value object: compared by value to detect stale in-flight results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaContext {
    pub persona_id: String,
    pub sub_option_id: String,
    pub instruction_fragment: String,
}
