// src/catalog/mod.rs

//! Provider rule catalog
//!
//! For each supported cloud provider the catalog lists the container
//! formats it imports, the hard requirements an image must meet, and the
//! weights used to score everything else. The table is TOML, embedded in
//! the binary as the default and replaceable with a file of the same shape:
//!
//! ```toml
//! version = 1
//!
//! [[provider]]
//! name = "GCP"
//! accepted_formats = ["raw", "qcow2"]
//!
//! [provider.requires]
//! cloud_init = true
//!
//! [provider.weights]
//! uefi_boot = 2
//! format = 2
//! ```
//!
//! Loading validates every entry up front. A catalog that loads can always
//! be evaluated.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::debug;

/// Current catalog file version
pub const CATALOG_VERSION: u32 = 1;

/// The catalog shipped with the binary
pub const BUILTIN_CATALOG: &str = include_str!("providers.toml");

/// Recognized feature keys
///
/// The derivation of each key from an image is fixed and shared by every
/// provider; providers only differ in which keys they require or weigh.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeatureKey {
    BiosBoot,
    UefiBoot,
    CloudInit,
    Format,
    NoBackingFile,
    NotCorrupt,
    RefcountBits,
    LazyRefcounts,
}

/// Errors that can occur when loading a catalog ("CatalogValidationError")
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid catalog version: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Catalog defines no providers")]
    Empty,

    #[error("Provider name must not be empty")]
    EmptyProviderName,

    #[error("Provider '{0}' is defined more than once")]
    DuplicateProvider(String),

    #[error("Provider '{provider}': unknown feature key '{key}'")]
    UnknownKey { provider: String, key: String },

    #[error("Provider '{provider}': requirement '{key}' must be a boolean, found {value}")]
    InvalidRequirement {
        provider: String,
        key: String,
        value: String,
    },

    #[error("Provider '{provider}': weight '{key}' must be a positive integer, found {value}")]
    InvalidWeight {
        provider: String,
        key: String,
        value: String,
    },

    #[error("Provider '{provider}': weights must sum to at most {max}", max = u32::MAX)]
    WeightOverflow { provider: String },

    #[error("Provider '{provider}': accepted format '{format}' must be non-empty lower-case")]
    InvalidFormat { provider: String, format: String },
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Rules for one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderProfile {
    pub name: String,
    /// Container formats the provider imports, lower-case
    pub accepted_formats: Vec<String>,
    /// Keys whose derived value must equal the given boolean, in catalog order
    pub hard_requirements: Vec<(FeatureKey, bool)>,
    /// Positive weights, in catalog order
    pub score_weights: Vec<(FeatureKey, u32)>,
}

impl ProviderProfile {
    /// Whether `format` (any case) is accepted
    pub fn accepts(&self, format: &str) -> bool {
        self.accepted_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }

    /// Sum of all weights; validated catalogs never overflow it
    pub fn max_score(&self) -> u32 {
        self.score_weights.iter().map(|(_, w)| w).sum()
    }
}

/// Validated, ordered set of provider profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderCatalog {
    pub version: u32,
    providers: Vec<ProviderProfile>,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    provider: Vec<RawProvider>,
}

#[derive(Debug, Deserialize)]
struct RawProvider {
    name: String,
    #[serde(default)]
    accepted_formats: Vec<String>,
    #[serde(default)]
    requires: toml::Table,
    #[serde(default)]
    weights: toml::Table,
}

fn default_version() -> u32 {
    CATALOG_VERSION
}

impl ProviderCatalog {
    /// The embedded catalog
    pub fn builtin() -> CatalogResult<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Load and validate a catalog file
    pub fn load(path: &Path) -> CatalogResult<Self> {
        debug!("Loading provider catalog from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate catalog TOML
    pub fn from_toml_str(content: &str) -> CatalogResult<Self> {
        let raw: RawCatalog = toml::from_str(content)?;
        if raw.version != CATALOG_VERSION {
            return Err(CatalogError::VersionMismatch {
                expected: CATALOG_VERSION,
                found: raw.version,
            });
        }
        if raw.provider.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        let mut providers = Vec::with_capacity(raw.provider.len());
        for entry in raw.provider {
            let profile = validate_provider(entry)?;
            if !seen.insert(profile.name.clone()) {
                return Err(CatalogError::DuplicateProvider(profile.name));
            }
            providers.push(profile);
        }

        debug!("Catalog loaded with {} providers", providers.len());
        Ok(Self {
            version: raw.version,
            providers,
        })
    }

    /// Providers in definition order
    pub fn providers(&self) -> &[ProviderProfile] {
        &self.providers
    }

    pub fn get(&self, name: &str) -> Option<&ProviderProfile> {
        self.providers.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn parse_key(provider: &str, key: &str) -> CatalogResult<FeatureKey> {
    key.parse().map_err(|_| CatalogError::UnknownKey {
        provider: provider.to_string(),
        key: key.to_string(),
    })
}

fn validate_provider(raw: RawProvider) -> CatalogResult<ProviderProfile> {
    let name = raw.name.trim().to_string();
    if name.is_empty() {
        return Err(CatalogError::EmptyProviderName);
    }

    let mut accepted_formats: Vec<String> = Vec::new();
    for format in raw.accepted_formats {
        if format.is_empty() || format != format.to_ascii_lowercase() {
            return Err(CatalogError::InvalidFormat {
                provider: name,
                format,
            });
        }
        if !accepted_formats.contains(&format) {
            accepted_formats.push(format);
        }
    }

    let mut hard_requirements = Vec::with_capacity(raw.requires.len());
    for (key, value) in &raw.requires {
        let feature = parse_key(&name, key)?;
        let required = value.as_bool().ok_or_else(|| CatalogError::InvalidRequirement {
            provider: name.clone(),
            key: key.clone(),
            value: value.to_string(),
        })?;
        hard_requirements.push((feature, required));
    }

    let mut score_weights = Vec::with_capacity(raw.weights.len());
    let mut total: u32 = 0;
    for (key, value) in &raw.weights {
        let feature = parse_key(&name, key)?;
        let weight = value
            .as_integer()
            .filter(|w| *w > 0)
            .and_then(|w| u32::try_from(w).ok())
            .ok_or_else(|| CatalogError::InvalidWeight {
                provider: name.clone(),
                key: key.clone(),
                value: value.to_string(),
            })?;
        total = total
            .checked_add(weight)
            .ok_or_else(|| CatalogError::WeightOverflow {
                provider: name.clone(),
            })?;
        score_weights.push((feature, weight));
    }

    Ok(ProviderProfile {
        name,
        accepted_formats,
        hard_requirements,
        score_weights,
    })
}
