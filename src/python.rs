//! Python bindings.
//!
//! The dashboards are Python processes; they construct a `ShelterModel`
//! pointed at the export directory and render whatever `dashboard` /
//! `morning_report` return. DataFrames cross the boundary via
//! pyo3-polars; column names come from the `schema` submodules so the
//! Python side never spells a string twice.

use chrono::{NaiveDate, NaiveDateTime};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDate, PyDateTime, PyModule};
use pyo3_polars::PyDataFrame;

use crate::classify;
use crate::config::SourceConfig;
use crate::ids;
use crate::model::ShelterModel as CoreModel;
use crate::report::MorningReport;
use crate::schema;
use crate::stage;

#[pyclass]
pub struct ShelterModel {
    inner: CoreModel,
}

#[pymethods]
impl ShelterModel {
    /// A model over the default export filenames under `base_path`.
    #[new]
    fn new(base_path: String) -> Self {
        Self {
            inner: CoreModel::new(base_path),
        }
    }

    /// A model configured from a JSON source-config file.
    #[staticmethod]
    fn from_config(path: String) -> PyResult<Self> {
        let config = SourceConfig::from_path(std::path::Path::new(&path))?;
        Ok(Self {
            inner: CoreModel::with_config(config),
        })
    }

    // ── Data loading ────────────────────────────────────────────────────────

    fn load_inventory(&mut self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.load_inventory()?))
    }

    fn load_foster_current(&mut self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.load_foster_current()?))
    }

    fn load_hold_foster_dates(&mut self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.load_hold_foster_dates()?))
    }

    fn load_outcomes(&mut self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.load_outcomes()?))
    }

    fn load_intakes(&mut self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.load_intakes()?))
    }

    fn load_pathways(&mut self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.load_pathways()?))
    }

    /// Load every export; missing optional files log a warning and leave
    /// an empty table in place.
    fn load_all(&mut self) -> PyResult<()> {
        self.inner.load_all()?;
        Ok(())
    }

    // ── Derivation ──────────────────────────────────────────────────────────

    /// The classified dashboard table.
    fn dashboard(&self, now: Bound<PyDateTime>) -> PyResult<PyDataFrame> {
        let now = extract_naive(&now)?;
        Ok(PyDataFrame(self.inner.dashboard(now)?))
    }

    /// The rendered morning report for `date`.
    fn morning_report(&self, date: Bound<PyDate>, now: Bound<PyDateTime>) -> PyResult<String> {
        let date: NaiveDate = date.extract()?;
        let now = extract_naive(&now)?;
        let report = MorningReport::build(&self.inner, date, now)?;
        Ok(report.render_text()?)
    }

    // ── Properties ──────────────────────────────────────────────────────────

    #[getter]
    fn inventory_df(&self) -> Option<PyDataFrame> {
        self.inner.inventory_df().cloned().map(PyDataFrame)
    }

    #[getter]
    fn foster_current_df(&self) -> Option<PyDataFrame> {
        self.inner.foster_current_df().cloned().map(PyDataFrame)
    }

    #[getter]
    fn hold_foster_dates_df(&self) -> Option<PyDataFrame> {
        self.inner.hold_foster_dates_df().cloned().map(PyDataFrame)
    }

    #[getter]
    fn outcomes_df(&self) -> Option<PyDataFrame> {
        self.inner.outcomes_df().cloned().map(PyDataFrame)
    }

    #[getter]
    fn intakes_df(&self) -> Option<PyDataFrame> {
        self.inner.intakes_df().cloned().map(PyDataFrame)
    }

    #[getter]
    fn pathways_df(&self) -> Option<PyDataFrame> {
        self.inner.pathways_df().cloned().map(PyDataFrame)
    }
}

/// Reject timezone-aware datetimes; the exports carry naive local time.
fn extract_naive(timestamp: &Bound<PyDateTime>) -> PyResult<NaiveDateTime> {
    if !timestamp.getattr("tzinfo")?.is_none() {
        return Err(PyValueError::new_err(
            "petpoint-core requires naive datetime objects (no timezone info). \
             Use datetime(2024, 6, 15, 9, 0, 0) instead of datetime(..., tzinfo=...)",
        ));
    }
    timestamp.extract()
}

// ── Module-level helpers ────────────────────────────────────────────────────

/// Canonical 8-digit animal identifier.
#[pyfunction]
fn normalize_animal_id(raw: &str) -> String {
    ids::normalize_animal_id(raw)
}

/// Canonical 9-digit caregiver identifier.
#[pyfunction]
fn normalize_person_id(raw: &str) -> String {
    ids::normalize_person_id(raw)
}

/// Canonical matching form of a stage string.
#[pyfunction]
fn canonicalize_stage(raw: &str) -> String {
    stage::canonicalize_stage(raw)
}

/// Category label for a (stage, foster-roster membership) pair.
#[pyfunction]
fn classify_stage(stage: &str, in_foster_roster: bool) -> &'static str {
    classify::classify(stage, in_foster_roster).label()
}

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Animal
    let animal = PyModule::new(m.py(), "animal")?;
    animal.add("ANIMAL_ID", schema::animal::ANIMAL_ID)?;
    animal.add("NAME", schema::animal::NAME)?;
    animal.add("SPECIES", schema::animal::SPECIES)?;
    animal.add("BREED", schema::animal::BREED)?;
    animal.add("SEX", schema::animal::SEX)?;
    animal.add("AGE", schema::animal::AGE)?;
    animal.add("STAGE", schema::animal::STAGE)?;
    animal.add("LOCATION", schema::animal::LOCATION)?;
    animal.add("SUB_LOCATION", schema::animal::SUB_LOCATION)?;
    animal.add("INTAKE_DATETIME", schema::animal::INTAKE_DATETIME)?;
    animal.add("DATE_OF_BIRTH", schema::animal::DATE_OF_BIRTH)?;
    animal.add("SPAYED_NEUTERED", schema::animal::SPAYED_NEUTERED)?;
    m.add_submodule(&animal)?;

    // Foster
    let foster = PyModule::new(m.py(), "foster")?;
    foster.add("CAREGIVER_ID", schema::foster::CAREGIVER_ID)?;
    foster.add("CAREGIVER_NAME", schema::foster::CAREGIVER_NAME)?;
    foster.add("FOSTER_START_DATE", schema::foster::FOSTER_START_DATE)?;
    m.add_submodule(&foster)?;

    // Hold
    let hold = PyModule::new(m.py(), "hold")?;
    hold.add("HOLD_STAGE", schema::hold::HOLD_STAGE)?;
    hold.add("HOLD_START_DATE", schema::hold::HOLD_START_DATE)?;
    m.add_submodule(&hold)?;

    // Events
    let event = PyModule::new(m.py(), "event")?;
    event.add("OUTCOME_TYPE", schema::event::OUTCOME_TYPE)?;
    event.add("OUTCOME_SUBTYPE", schema::event::OUTCOME_SUBTYPE)?;
    event.add("OUTCOME_DATETIME", schema::event::OUTCOME_DATETIME)?;
    event.add("INTAKE_TYPE", schema::event::INTAKE_TYPE)?;
    event.add("INTAKE_SUBTYPE", schema::event::INTAKE_SUBTYPE)?;
    event.add("INTAKE_DATETIME", schema::event::INTAKE_DATETIME)?;
    m.add_submodule(&event)?;

    // Pathways
    let pathways = PyModule::new(m.py(), "pathways")?;
    pathways.add("WELFARE_NOTES", schema::pathways::WELFARE_NOTES)?;
    pathways.add("FOSTER_ATTEMPTED", schema::pathways::FOSTER_ATTEMPTED)?;
    m.add_submodule(&pathways)?;

    // Dashboard
    let dashboard = PyModule::new(m.py(), "dashboard")?;
    dashboard.add("CATEGORY", schema::dashboard::CATEGORY)?;
    dashboard.add("LOS_DAYS", schema::dashboard::LOS_DAYS)?;
    dashboard.add("COUNT", schema::dashboard::COUNT)?;
    m.add_submodule(&dashboard)?;

    // Defaults
    let defaults = PyModule::new(m.py(), "defaults")?;
    defaults.add("NOT_IN_FOSTER", schema::defaults::NOT_IN_FOSTER)?;
    defaults.add("UNKNOWN", schema::defaults::UNKNOWN)?;
    m.add_submodule(&defaults)?;

    Ok(())
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ShelterModel>()?;
    m.add_function(wrap_pyfunction!(normalize_animal_id, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_person_id, m)?)?;
    m.add_function(wrap_pyfunction!(canonicalize_stage, m)?)?;
    m.add_function(wrap_pyfunction!(classify_stage, m)?)?;
    add_schema_exports(m)?;
    Ok(())
}
