//! Source configuration.
//!
//! Filenames and header-skip offsets per export were hard-coded at every
//! call site historically; this moves them into one validated structure.
//! Defaults match the standard PetPoint report names, so most deployments
//! never write a config file at all.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ShelterError;

/// One export file: its name under the base path, the number of metadata
/// rows above the header, and (for XLSX sources) an optional sheet name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub filename: String,
    #[serde(default)]
    pub skip_rows: usize,
    #[serde(default)]
    pub sheet: Option<String>,
}

impl SourceSpec {
    fn new(filename: &str, skip_rows: usize) -> Self {
        Self {
            filename: filename.to_string(),
            skip_rows,
            sheet: None,
        }
    }

    /// True when the filename points at an Excel workbook rather than CSV.
    pub fn is_xlsx(&self) -> bool {
        let lower = self.filename.to_ascii_lowercase();
        lower.ends_with(".xlsx") || lower.ends_with(".xls")
    }
}

/// Filenames and offsets for every export the model can load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub base_path: PathBuf,
    #[serde(default = "defaults::inventory")]
    pub inventory: SourceSpec,
    #[serde(default = "defaults::foster_current")]
    pub foster_current: SourceSpec,
    #[serde(default = "defaults::hold_foster_dates")]
    pub hold_foster_dates: SourceSpec,
    #[serde(default = "defaults::outcomes")]
    pub outcomes: SourceSpec,
    #[serde(default = "defaults::intakes")]
    pub intakes: SourceSpec,
    #[serde(default = "defaults::pathways")]
    pub pathways: SourceSpec,
}

mod defaults {
    use super::SourceSpec;

    pub fn inventory() -> SourceSpec {
        SourceSpec::new("AnimalInventory.csv", 3)
    }
    pub fn foster_current() -> SourceSpec {
        SourceSpec::new("FosterCurrent.csv", 6)
    }
    pub fn hold_foster_dates() -> SourceSpec {
        SourceSpec::new("Hold - Foster Stage Date.csv", 2)
    }
    pub fn outcomes() -> SourceSpec {
        SourceSpec::new("AnimalOutcome.csv", 3)
    }
    pub fn intakes() -> SourceSpec {
        SourceSpec::new("AnimalIntake.csv", 3)
    }
    pub fn pathways() -> SourceSpec {
        SourceSpec::new("Pathways for Care.csv", 0)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::new(),
            inventory: defaults::inventory(),
            foster_current: defaults::foster_current(),
            hold_foster_dates: defaults::hold_foster_dates(),
            outcomes: defaults::outcomes(),
            intakes: defaults::intakes(),
            pathways: defaults::pathways(),
        }
    }
}

impl SourceConfig {
    /// Default source names rooted at `base_path`.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON config file from a path.
    pub fn from_path(path: &Path) -> Result<Self, ShelterError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a JSON config from a string.
    pub fn parse(json: &str) -> Result<Self, ShelterError> {
        let config: SourceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Absolute path of one source file.
    pub fn path_of(&self, spec: &SourceSpec) -> PathBuf {
        self.base_path.join(&spec.filename)
    }

    fn specs(&self) -> [(&'static str, &SourceSpec); 6] {
        [
            ("inventory", &self.inventory),
            ("foster_current", &self.foster_current),
            ("hold_foster_dates", &self.hold_foster_dates),
            ("outcomes", &self.outcomes),
            ("intakes", &self.intakes),
            ("pathways", &self.pathways),
        ]
    }

    fn validate(&self) -> Result<(), ShelterError> {
        let mut seen = HashSet::new();
        for (name, spec) in self.specs() {
            if spec.filename.trim().is_empty() {
                return Err(ShelterError::Validation(format!(
                    "source '{name}' has an empty filename"
                )));
            }
            if !seen.insert(spec.filename.as_str()) {
                return Err(ShelterError::Validation(format!(
                    "filename '{}' is used by more than one source",
                    spec.filename
                )));
            }
        }
        Ok(())
    }
}
