//! petpoint-core: the classification and join core behind the shelter's
//! operational dashboards.
//!
//! The PetPoint case-management system exports a handful of CSV/XLSX
//! reports with inconsistent header offsets, identifier formats, and
//! free-text stage names. This crate loads them, normalizes identifiers
//! to one canonical form, classifies every animal into exactly one
//! operational category, joins foster/hold/welfare attributes, and
//! derives length of stay - producing the single table every front end
//! (web dashboard, morning email, workbook export) renders.

pub mod schema;

mod classify;
mod config;
mod dates;
mod error;
mod ids;
mod loader;
mod model;
mod report;
mod stage;

#[cfg(feature = "python")]
mod python;

pub use classify::{classify, Category};
pub use config::{SourceConfig, SourceSpec};
pub use dates::{los_days, parse_date, parse_datetime};
pub use error::ShelterError;
pub use ids::{normalize_animal_id, normalize_person_id};
pub use loader::{read_csv_as_strings, read_xlsx_as_strings};
pub use model::ShelterModel;
pub use report::MorningReport;
pub use stage::{canonicalize_stage, StageCode};
