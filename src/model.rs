//! The shelter model: loads the PetPoint exports, normalizes identifiers,
//! and derives the classified dashboard table every front end consumes.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use polars::prelude::*;

use crate::classify::classify;
use crate::config::{SourceConfig, SourceSpec};
use crate::dates;
use crate::error::ShelterError;
use crate::ids::{normalize_animal_id, normalize_person_id};
use crate::loader;
use crate::schema::{animal, dashboard, defaults, event, export, foster, hold, pathways};

/// Canonical columns of a loaded foster roster.
const FOSTER_COLUMNS: [&str; 4] = [
    animal::ANIMAL_ID,
    foster::CAREGIVER_ID,
    foster::CAREGIVER_NAME,
    foster::FOSTER_START_DATE,
];

/// Canonical columns of a loaded hold-stage-date table.
const HOLD_COLUMNS: [&str; 3] = [animal::ANIMAL_ID, hold::HOLD_STAGE, hold::HOLD_START_DATE];

/// Canonical columns of a loaded outcome table.
const OUTCOME_COLUMNS: [&str; 4] = [
    animal::ANIMAL_ID,
    event::OUTCOME_TYPE,
    event::OUTCOME_SUBTYPE,
    event::OUTCOME_DATETIME,
];

/// Canonical columns of a loaded intake table.
const INTAKE_COLUMNS: [&str; 4] = [
    animal::ANIMAL_ID,
    event::INTAKE_TYPE,
    event::INTAKE_SUBTYPE,
    event::INTAKE_DATETIME,
];

/// Canonical columns of a loaded pathways table.
const PATHWAYS_COLUMNS: [&str; 3] = [
    animal::ANIMAL_ID,
    pathways::WELFARE_NOTES,
    pathways::FOSTER_ATTEMPTED,
];

/// Inventory columns guaranteed present after load, whatever the schema
/// version of the export.
const INVENTORY_COLUMNS: [&str; 11] = [
    animal::NAME,
    animal::SPECIES,
    animal::BREED,
    animal::SEX,
    animal::AGE,
    animal::STAGE,
    animal::LOCATION,
    animal::SUB_LOCATION,
    animal::INTAKE_DATETIME,
    animal::DATE_OF_BIRTH,
    animal::SPAYED_NEUTERED,
];

/// One caregiver assignment from the foster roster.
#[derive(Debug, Clone, Default)]
struct FosterAssignment {
    caregiver_id: String,
    caregiver_name: String,
    start_date: String,
}

pub struct ShelterModel {
    config: SourceConfig,
    inventory: Option<DataFrame>,
    foster_current: Option<DataFrame>,
    hold_foster_dates: Option<DataFrame>,
    outcomes: Option<DataFrame>,
    intakes: Option<DataFrame>,
    pathways: Option<DataFrame>,
}

impl ShelterModel {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self::with_config(SourceConfig::with_base_path(base_path))
    }

    pub fn with_config(config: SourceConfig) -> Self {
        Self {
            config,
            inventory: None,
            foster_current: None,
            hold_foster_dates: None,
            outcomes: None,
            intakes: None,
            pathways: None,
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load the primary inventory snapshot. Required: without it there is
    /// no dashboard, so a missing file is an error, not a warning.
    pub fn load_inventory(&mut self) -> Result<DataFrame, ShelterError> {
        let rename = rename_map(&[
            (export::inventory::ANIMAL_NAME, animal::NAME),
            (export::inventory::SPECIES, animal::SPECIES),
            (export::inventory::PRIMARY_BREED, animal::BREED),
            (export::inventory::SEX, animal::SEX),
            (export::inventory::AGE, animal::AGE),
            (export::inventory::STAGE, animal::STAGE),
            (export::inventory::LOCATION, animal::LOCATION),
            (export::inventory::SUB_LOCATION, animal::SUB_LOCATION),
            (export::inventory::INTAKE_DATETIME, animal::INTAKE_DATETIME),
            (export::inventory::DATE_OF_BIRTH, animal::DATE_OF_BIRTH),
            (export::inventory::SPAYED_NEUTERED, animal::SPAYED_NEUTERED),
        ]);

        let spec = self.config.inventory.clone();
        let raw = self.read_source(&spec, Some(&rename))?;
        require_columns(&raw, &[export::inventory::ANIMAL_NUMBER, animal::STAGE])?;

        let df = with_normalized_id(raw, export::inventory::ANIMAL_NUMBER, animal::ANIMAL_ID)?;
        let df = ensure_string_columns(df, &INVENTORY_COLUMNS)?;

        self.inventory = Some(df.clone());
        Ok(df)
    }

    /// Load the current foster roster.
    ///
    /// The export is a report-builder artifact whose key columns carry
    /// generated `textboxN` headers; they are renamed at load time and the
    /// caregiver person-id is normalized alongside the animal id.
    pub fn load_foster_current(&mut self) -> Result<DataFrame, ShelterError> {
        let rename = rename_map(&[
            (export::foster::CAREGIVER_ID, foster::CAREGIVER_ID),
            (export::foster::CAREGIVER_NAME, foster::CAREGIVER_NAME),
            (export::foster::START_STATUS_DATE, foster::FOSTER_START_DATE),
        ]);

        let spec = self.config.foster_current.clone();
        let raw = self.read_source(&spec, Some(&rename))?;
        require_columns(&raw, &[export::foster::ANIMAL_ID])?;

        let df = with_normalized_id(raw, export::foster::ANIMAL_ID, animal::ANIMAL_ID)?;
        let df = ensure_string_columns(df, &FOSTER_COLUMNS)?;
        let df = map_string_column(df, foster::CAREGIVER_ID, normalize_person_id)?;

        self.foster_current = Some(df.clone());
        Ok(df)
    }

    /// Load the hold-stage start-date export: three positional columns
    /// (animal id, stage, stage-start date) with no stable headers.
    pub fn load_hold_foster_dates(&mut self) -> Result<DataFrame, ShelterError> {
        let spec = self.config.hold_foster_dates.clone();
        let raw = self.read_source(&spec, None)?;
        let df = loader::rename_positional(raw, &HOLD_COLUMNS)?;
        let df = map_string_column(df, animal::ANIMAL_ID, normalize_animal_id)?;

        self.hold_foster_dates = Some(df.clone());
        Ok(df)
    }

    /// Load outcome event records.
    pub fn load_outcomes(&mut self) -> Result<DataFrame, ShelterError> {
        let rename = rename_map(&[
            (export::outcome::OUTCOME_TYPE, event::OUTCOME_TYPE),
            (export::outcome::OUTCOME_SUBTYPE, event::OUTCOME_SUBTYPE),
            (export::outcome::OUTCOME_DATETIME, event::OUTCOME_DATETIME),
        ]);

        let spec = self.config.outcomes.clone();
        let raw = self.read_source(&spec, Some(&rename))?;
        require_columns(&raw, &[export::outcome::ANIMAL_NUMBER])?;

        let df = with_normalized_id(raw, export::outcome::ANIMAL_NUMBER, animal::ANIMAL_ID)?;
        let df = ensure_string_columns(df, &OUTCOME_COLUMNS)?;

        self.outcomes = Some(df.clone());
        Ok(df)
    }

    /// Load intake event records.
    pub fn load_intakes(&mut self) -> Result<DataFrame, ShelterError> {
        let rename = rename_map(&[
            (export::intake::INTAKE_TYPE, event::INTAKE_TYPE),
            (export::intake::INTAKE_SUBTYPE, event::INTAKE_SUBTYPE),
            (export::intake::INTAKE_DATETIME, event::INTAKE_DATETIME),
        ]);

        let spec = self.config.intakes.clone();
        let raw = self.read_source(&spec, Some(&rename))?;
        require_columns(&raw, &[export::intake::ANIMAL_NUMBER])?;

        let df = with_normalized_id(raw, export::intake::ANIMAL_NUMBER, animal::ANIMAL_ID)?;
        let df = ensure_string_columns(df, &INTAKE_COLUMNS)?;

        self.intakes = Some(df.clone());
        Ok(df)
    }

    /// Load the Pathways for Care welfare-tracking export.
    pub fn load_pathways(&mut self) -> Result<DataFrame, ShelterError> {
        let rename = rename_map(&[
            (export::pathways::WELFARE_NOTES, pathways::WELFARE_NOTES),
            (export::pathways::FOSTER_ATTEMPTED, pathways::FOSTER_ATTEMPTED),
        ]);

        let spec = self.config.pathways.clone();
        let raw = self.read_source(&spec, Some(&rename))?;
        require_columns(&raw, &[export::pathways::AID])?;

        let df = with_normalized_id(raw, export::pathways::AID, animal::ANIMAL_ID)?;
        let df = ensure_string_columns(df, &PATHWAYS_COLUMNS)?;

        self.pathways = Some(df.clone());
        Ok(df)
    }

    /// Load every export. The inventory is required and its errors
    /// propagate; a missing optional export is downgraded to a warning and
    /// an empty table, so joins against it become no-ops.
    pub fn load_all(&mut self) -> Result<(), ShelterError> {
        self.load_inventory()?;

        if let Err(e) = self.load_foster_current() {
            self.foster_current = Some(optional_fallback("FosterCurrent", e, &FOSTER_COLUMNS)?);
        }
        if let Err(e) = self.load_hold_foster_dates() {
            self.hold_foster_dates =
                Some(optional_fallback("Hold - Foster Stage Date", e, &HOLD_COLUMNS)?);
        }
        if let Err(e) = self.load_outcomes() {
            self.outcomes = Some(optional_fallback("AnimalOutcome", e, &OUTCOME_COLUMNS)?);
        }
        if let Err(e) = self.load_intakes() {
            self.intakes = Some(optional_fallback("AnimalIntake", e, &INTAKE_COLUMNS)?);
        }
        if let Err(e) = self.load_pathways() {
            self.pathways = Some(optional_fallback("Pathways for Care", e, &PATHWAYS_COLUMNS)?);
        }

        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn inventory_df(&self) -> Option<&DataFrame> {
        self.inventory.as_ref()
    }

    pub fn foster_current_df(&self) -> Option<&DataFrame> {
        self.foster_current.as_ref()
    }

    pub fn hold_foster_dates_df(&self) -> Option<&DataFrame> {
        self.hold_foster_dates.as_ref()
    }

    pub fn outcomes_df(&self) -> Option<&DataFrame> {
        self.outcomes.as_ref()
    }

    pub fn intakes_df(&self) -> Option<&DataFrame> {
        self.intakes.as_ref()
    }

    pub fn pathways_df(&self) -> Option<&DataFrame> {
        self.pathways.as_ref()
    }

    // ── Dashboard derivation ────────────────────────────────────────────────

    /// Derive the classified dashboard table: one row per inventory animal
    /// with category, caregiver assignment, hold date, welfare notes, and
    /// length of stay. Pure function of the loaded frames and `now`;
    /// re-running on unchanged inputs yields an identical table.
    pub fn dashboard(&self, now: NaiveDateTime) -> Result<DataFrame, ShelterError> {
        let inventory = self
            .inventory
            .as_ref()
            .ok_or_else(|| ShelterError::NotLoaded("inventory".into()))?;

        let roster = foster_roster(self.foster_current.as_ref())?;
        let hold_dates = string_lookup(
            self.hold_foster_dates.as_ref(),
            animal::ANIMAL_ID,
            hold::HOLD_START_DATE,
        )?;
        let notes = string_lookup(
            self.pathways.as_ref(),
            animal::ANIMAL_ID,
            pathways::WELFARE_NOTES,
        )?;
        let attempts = string_lookup(
            self.pathways.as_ref(),
            animal::ANIMAL_ID,
            pathways::FOSTER_ATTEMPTED,
        )?;

        let n = inventory.height();
        let ids = inventory.column(animal::ANIMAL_ID)?.str()?;
        let stages = inventory.column(animal::STAGE)?.str()?;
        let locations = inventory.column(animal::LOCATION)?.str()?;
        let intakes = inventory.column(animal::INTAKE_DATETIME)?.str()?;

        let mut categories: Vec<String> = Vec::with_capacity(n);
        let mut caregiver_ids: Vec<String> = Vec::with_capacity(n);
        let mut caregiver_names: Vec<String> = Vec::with_capacity(n);
        let mut foster_starts: Vec<String> = Vec::with_capacity(n);
        let mut hold_starts: Vec<String> = Vec::with_capacity(n);
        let mut welfare_notes: Vec<String> = Vec::with_capacity(n);
        let mut foster_attempted: Vec<String> = Vec::with_capacity(n);
        let mut location_out: Vec<String> = Vec::with_capacity(n);
        let mut los: Vec<Option<i64>> = Vec::with_capacity(n);

        for i in 0..n {
            let id = ids.get(i).unwrap_or_default();
            let stage = stages.get(i).unwrap_or_default();

            let category = classify(stage, roster.contains_key(id));
            categories.push(category.label().to_string());

            // Caregiver columns populate only for foster categories;
            // everything else reads "Not in Foster" downstream.
            let assignment = if category.is_foster() {
                roster.get(id)
            } else {
                None
            };
            match assignment {
                Some(a) => {
                    caregiver_ids.push(a.caregiver_id.clone());
                    caregiver_names.push(a.caregiver_name.clone());
                    foster_starts.push(a.start_date.clone());
                }
                None => {
                    caregiver_ids.push(String::new());
                    caregiver_names.push(defaults::NOT_IN_FOSTER.to_string());
                    foster_starts.push(String::new());
                }
            }

            hold_starts.push(hold_dates.get(id).cloned().unwrap_or_default());
            welfare_notes.push(notes.get(id).cloned().unwrap_or_default());
            foster_attempted.push(attempts.get(id).cloned().unwrap_or_default());

            let loc = locations.get(i).unwrap_or_default().trim();
            location_out.push(if loc.is_empty() {
                defaults::UNKNOWN.to_string()
            } else {
                loc.to_string()
            });

            los.push(
                intakes
                    .get(i)
                    .and_then(dates::parse_datetime)
                    .map(|intake| dates::los_days(intake, now)),
            );
        }

        let mut out = inventory.select([
            animal::ANIMAL_ID,
            animal::NAME,
            animal::SPECIES,
            animal::BREED,
            animal::SEX,
            animal::AGE,
            animal::STAGE,
            animal::LOCATION,
            animal::SUB_LOCATION,
            animal::INTAKE_DATETIME,
            animal::DATE_OF_BIRTH,
            animal::SPAYED_NEUTERED,
        ])?;

        out.with_column(Column::new(animal::LOCATION.into(), location_out))?;
        out.with_column(Column::new(dashboard::CATEGORY.into(), categories))?;
        out.with_column(Column::new(dashboard::LOS_DAYS.into(), los))?;
        out.with_column(Column::new(foster::CAREGIVER_ID.into(), caregiver_ids))?;
        out.with_column(Column::new(foster::CAREGIVER_NAME.into(), caregiver_names))?;
        out.with_column(Column::new(foster::FOSTER_START_DATE.into(), foster_starts))?;
        out.with_column(Column::new(hold::HOLD_START_DATE.into(), hold_starts))?;
        out.with_column(Column::new(pathways::WELFARE_NOTES.into(), welfare_notes))?;
        out.with_column(Column::new(pathways::FOSTER_ATTEMPTED.into(), foster_attempted))?;

        let out = out.sort([animal::ANIMAL_ID], SortMultipleOptions::default())?;
        Ok(out)
    }

    // ── Private helpers ─────────────────────────────────────────────────────

    fn read_source(
        &self,
        spec: &SourceSpec,
        rename: Option<&HashMap<String, String>>,
    ) -> Result<DataFrame, ShelterError> {
        let path = self.config.path_of(spec);
        if spec.is_xlsx() {
            loader::read_xlsx_as_strings(&path, spec.sheet.as_deref(), spec.skip_rows, rename)
        } else {
            loader::read_csv_as_strings(&path, spec.skip_rows, rename)
        }
    }
}

fn rename_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), ShelterError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(ShelterError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

/// Add a canonical-id column derived from a source id column.
fn with_normalized_id(
    mut df: DataFrame,
    source_col: &str,
    target_col: &str,
) -> Result<DataFrame, ShelterError> {
    let ids: Vec<String> = df
        .column(source_col)?
        .str()?
        .into_iter()
        .map(|v| normalize_animal_id(v.unwrap_or_default()))
        .collect();
    df.with_column(Column::new(target_col.into(), ids))?;
    Ok(df)
}

/// Rewrite a string column through a normalization function.
fn map_string_column(
    mut df: DataFrame,
    column: &str,
    f: impl Fn(&str) -> String,
) -> Result<DataFrame, ShelterError> {
    let mapped: Vec<String> = df
        .column(column)?
        .str()?
        .into_iter()
        .map(|v| f(v.unwrap_or_default()))
        .collect();
    df.with_column(Column::new(column.into(), mapped))?;
    Ok(df)
}

/// Add empty-string columns for any canonical column a schema version of
/// the export doesn't carry.
fn ensure_string_columns(mut df: DataFrame, columns: &[&str]) -> Result<DataFrame, ShelterError> {
    let height = df.height();
    for name in columns {
        if df.column(name).is_err() {
            df.with_column(Column::new((*name).into(), vec![String::new(); height]))?;
        }
    }
    Ok(df)
}

fn optional_fallback(
    name: &str,
    err: ShelterError,
    columns: &[&str],
) -> Result<DataFrame, ShelterError> {
    if err.is_missing_file() {
        tracing::warn!("{name} export not found; continuing with an empty table");
        loader::empty_frame(columns)
    } else {
        Err(err)
    }
}

/// Build the foster lookup keyed on canonical animal id. Duplicate ids
/// resolve last-write-wins in row order.
fn foster_roster(
    df: Option<&DataFrame>,
) -> Result<HashMap<String, FosterAssignment>, ShelterError> {
    let mut map = HashMap::new();
    let Some(df) = df else {
        return Ok(map);
    };

    let ids = df.column(animal::ANIMAL_ID)?.str()?;
    let caregiver_ids = df.column(foster::CAREGIVER_ID)?.str()?;
    let caregiver_names = df.column(foster::CAREGIVER_NAME)?.str()?;
    let starts = df.column(foster::FOSTER_START_DATE)?.str()?;

    for i in 0..df.height() {
        let id = ids.get(i).unwrap_or_default();
        if id.is_empty() {
            continue; // unnormalizable key; never joins
        }
        map.insert(
            id.to_string(),
            FosterAssignment {
                caregiver_id: caregiver_ids.get(i).unwrap_or_default().to_string(),
                caregiver_name: caregiver_names.get(i).unwrap_or_default().to_string(),
                start_date: starts.get(i).unwrap_or_default().to_string(),
            },
        );
    }
    Ok(map)
}

/// Generic one-column lookup keyed on canonical animal id, last-write-wins.
fn string_lookup(
    df: Option<&DataFrame>,
    key_col: &str,
    value_col: &str,
) -> Result<HashMap<String, String>, ShelterError> {
    let mut map = HashMap::new();
    let Some(df) = df else {
        return Ok(map);
    };

    let keys = df.column(key_col)?.str()?;
    let values = df.column(value_col)?.str()?;
    for i in 0..df.height() {
        let key = keys.get(i).unwrap_or_default();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), values.get(i).unwrap_or_default().to_string());
    }
    Ok(map)
}
