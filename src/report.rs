//! Morning-report aggregation and rendering.
//!
//! Builds the summary tables the morning email is assembled from and
//! renders them as a self-contained plain-text report. The Word/Excel
//! writers downstream consume the same tables; only the text rendering
//! lives here.

use std::fmt::Write as FmtWrite;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::classify::Category;
use crate::dates;
use crate::error::ShelterError;
use crate::loader;
use crate::model::ShelterModel;
use crate::schema::{animal, dashboard, event};

/// Outcome types counted in the "RTOs & Transfers" section.
const RTO_TRANSFER_TYPES: [&str; 2] = ["Return to Owner", "Transfer Out"];

/// Summary tables for one report date.
pub struct MorningReport {
    pub date: NaiveDate,
    pub adoptions: DataFrame,
    pub stage_counts: DataFrame,
    pub category_counts: DataFrame,
    pub occupancy: DataFrame,
    pub things_to_do: DataFrame,
    pub strays: DataFrame,
    pub intakes: DataFrame,
    pub rtos_transfers: DataFrame,
}

impl MorningReport {
    /// Build every section from a loaded model. `now` anchors the
    /// length-of-stay column of the underlying dashboard table; `date` is
    /// the day whose intake/outcome events are reported.
    pub fn build(
        model: &ShelterModel,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Self, ShelterError> {
        let board = model.dashboard(now)?;

        let stage_counts = count_by(&board, animal::STAGE)?;
        let category_counts = count_by(&board, dashboard::CATEGORY)?;
        let occupancy = count_by(&board, animal::LOCATION)?;
        let things_to_do = filter_categories(
            &board,
            &[Category::NeedsFosterNow, Category::Unrecognized],
        )?;

        let adoptions = events_on(
            model.outcomes_df(),
            event::OUTCOME_TYPE,
            event::OUTCOME_SUBTYPE,
            event::OUTCOME_DATETIME,
            date,
            |outcome_type, _| outcome_type.eq_ignore_ascii_case("Adoption"),
        )?;
        let rtos_transfers = events_on(
            model.outcomes_df(),
            event::OUTCOME_TYPE,
            event::OUTCOME_SUBTYPE,
            event::OUTCOME_DATETIME,
            date,
            |outcome_type, _| {
                RTO_TRANSFER_TYPES
                    .iter()
                    .any(|t| outcome_type.eq_ignore_ascii_case(t))
            },
        )?;
        let intakes = events_on(
            model.intakes_df(),
            event::INTAKE_TYPE,
            event::INTAKE_SUBTYPE,
            event::INTAKE_DATETIME,
            date,
            |_, _| true,
        )?;
        let strays = events_on(
            model.intakes_df(),
            event::INTAKE_TYPE,
            event::INTAKE_SUBTYPE,
            event::INTAKE_DATETIME,
            date,
            |_, subtype| subtype.eq_ignore_ascii_case("Stray"),
        )?;

        Ok(Self {
            date,
            adoptions,
            stage_counts,
            category_counts,
            occupancy,
            things_to_do,
            strays,
            intakes,
            rtos_transfers,
        })
    }

    /// Render the report as plain text. Section order is fixed; the email
    /// template and the workbook sheets follow the same sequence.
    pub fn render_text(&self) -> Result<String, ShelterError> {
        let mut out = String::new();
        writeln!(out, "Morning Report - {}", self.date.format("%A, %B %d, %Y"))?;
        writeln!(out)?;

        write_event_section(
            &mut out,
            "Adoptions",
            &self.adoptions,
            &[animal::ANIMAL_ID, event::OUTCOME_TYPE, event::OUTCOME_SUBTYPE],
        )?;
        write_count_section(&mut out, "Stage Count", &self.stage_counts, animal::STAGE)?;
        write_count_section(&mut out, "Occupancy", &self.occupancy, animal::LOCATION)?;
        write_event_section(
            &mut out,
            "Things to Do",
            &self.things_to_do,
            &[
                animal::ANIMAL_ID,
                animal::NAME,
                animal::STAGE,
                dashboard::CATEGORY,
            ],
        )?;
        write_event_section(
            &mut out,
            "Stray",
            &self.strays,
            &[animal::ANIMAL_ID, event::INTAKE_SUBTYPE],
        )?;
        write_event_section(
            &mut out,
            "Intake",
            &self.intakes,
            &[animal::ANIMAL_ID, event::INTAKE_TYPE, event::INTAKE_SUBTYPE],
        )?;
        write_event_section(
            &mut out,
            "RTOs & Transfers",
            &self.rtos_transfers,
            &[animal::ANIMAL_ID, event::OUTCOME_TYPE],
        )?;

        Ok(out)
    }
}

/// Count dashboard rows per distinct value of `column`.
fn count_by(board: &DataFrame, column: &str) -> Result<DataFrame, ShelterError> {
    let out = board
        .clone()
        .lazy()
        .group_by([col(column)])
        .agg([col(animal::ANIMAL_ID).count().alias(dashboard::COUNT)])
        .sort([column], SortMultipleOptions::default())
        .collect()?;
    Ok(out)
}

/// Dashboard rows whose category is one of `wanted`.
fn filter_categories(
    board: &DataFrame,
    wanted: &[Category],
) -> Result<DataFrame, ShelterError> {
    let labels: Vec<&str> = wanted.iter().map(Category::label).collect();
    let categories = board.column(dashboard::CATEGORY)?.str()?;
    let mask: BooleanChunked = categories
        .into_iter()
        .map(|v| Some(labels.contains(&v.unwrap_or_default())))
        .collect();
    Ok(board.filter(&mask)?)
}

/// Event rows landing on `date` that pass the (type, subtype) predicate.
fn events_on(
    df: Option<&DataFrame>,
    type_col: &str,
    subtype_col: &str,
    datetime_col: &str,
    date: NaiveDate,
    pred: impl Fn(&str, &str) -> bool,
) -> Result<DataFrame, ShelterError> {
    let Some(df) = df else {
        return loader::empty_frame(&[animal::ANIMAL_ID, type_col, subtype_col, datetime_col]);
    };

    let types = df.column(type_col)?.str()?;
    let subtypes = df.column(subtype_col)?.str()?;
    let datetimes = df.column(datetime_col)?.str()?;

    let mask: BooleanChunked = (0..df.height())
        .map(|i| {
            let on_date = datetimes
                .get(i)
                .and_then(dates::parse_datetime)
                .map(|dt| dt.date() == date)
                .unwrap_or(false);
            Some(
                on_date
                    && pred(
                        types.get(i).unwrap_or_default(),
                        subtypes.get(i).unwrap_or_default(),
                    ),
            )
        })
        .collect();

    Ok(df.filter(&mask)?)
}

fn write_count_section(
    out: &mut String,
    title: &str,
    df: &DataFrame,
    label_col: &str,
) -> Result<(), ShelterError> {
    writeln!(out, "## {title}")?;
    if df.height() == 0 {
        writeln!(out, "(none)")?;
        writeln!(out)?;
        return Ok(());
    }

    let labels = df.column(label_col)?;
    let counts = df.column(dashboard::COUNT)?;
    for i in 0..df.height() {
        let label = anyvalue_to_string(&labels.get(i)?);
        let count = anyvalue_to_string(&counts.get(i)?);
        writeln!(out, "{label}: {count}")?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_event_section(
    out: &mut String,
    title: &str,
    df: &DataFrame,
    columns: &[&str],
) -> Result<(), ShelterError> {
    writeln!(out, "## {title} ({})", df.height())?;
    if df.height() == 0 {
        writeln!(out, "(none)")?;
        writeln!(out)?;
        return Ok(());
    }

    let series: Vec<&Column> = columns
        .iter()
        .map(|c| df.column(c))
        .collect::<Result<_, _>>()?;

    for i in 0..df.height() {
        let fields: Vec<String> = series
            .iter()
            .map(|s| s.get(i).map(|v| anyvalue_to_string(&v)))
            .collect::<Result<_, _>>()?;
        writeln!(out, "- {}", fields.join(" | "))?;
    }
    writeln!(out)?;
    Ok(())
}

fn anyvalue_to_string(val: &AnyValue) -> String {
    match val {
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Null => String::new(),
        other => format!("{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::defaults;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn board_fixture() -> DataFrame {
        df!(
            animal::ANIMAL_ID => ["00000001", "00000002", "00000003"],
            animal::NAME => ["Biscuit", "Mochi", "Juniper"],
            animal::STAGE => ["Hold - Foster", "Available", "Hold - Cryptid"],
            animal::LOCATION => ["Dog Adoptions", "Cat Adoptions", defaults::UNKNOWN],
            dashboard::CATEGORY => ["Needs Foster Now", "Other", "Unrecognized Stage"],
        )
        .unwrap()
    }

    #[test]
    fn count_by_groups_and_sorts() {
        let board = df!(
            animal::ANIMAL_ID => ["1", "2", "3"],
            animal::STAGE => ["Available", "Available", "In Foster"],
        )
        .unwrap();
        let counts = count_by(&board, animal::STAGE).unwrap();
        assert_eq!(counts.height(), 2);
        let stages = counts.column(animal::STAGE).unwrap().str().unwrap();
        assert_eq!(stages.get(0), Some("Available"));
        assert_eq!(stages.get(1), Some("In Foster"));
    }

    #[test]
    fn filter_categories_picks_needs_and_unrecognized() {
        let board = board_fixture();
        let todo = filter_categories(
            &board,
            &[Category::NeedsFosterNow, Category::Unrecognized],
        )
        .unwrap();
        assert_eq!(todo.height(), 2);
    }

    #[test]
    fn events_on_filters_by_date_and_type() {
        let outcomes = df!(
            animal::ANIMAL_ID => ["00000001", "00000002", "00000003"],
            event::OUTCOME_TYPE => ["Adoption", "Adoption", "Transfer Out"],
            event::OUTCOME_SUBTYPE => ["", "", ""],
            event::OUTCOME_DATETIME => [
                "6/14/2024 10:00 AM",
                "6/15/2024 10:00 AM",
                "6/14/2024 11:00 AM",
            ],
        )
        .unwrap();

        let adoptions = events_on(
            Some(&outcomes),
            event::OUTCOME_TYPE,
            event::OUTCOME_SUBTYPE,
            event::OUTCOME_DATETIME,
            date("2024-06-14"),
            |t, _| t.eq_ignore_ascii_case("Adoption"),
        )
        .unwrap();
        assert_eq!(adoptions.height(), 1);

        let missing = events_on(
            None,
            event::OUTCOME_TYPE,
            event::OUTCOME_SUBTYPE,
            event::OUTCOME_DATETIME,
            date("2024-06-14"),
            |_, _| true,
        )
        .unwrap();
        assert_eq!(missing.height(), 0);
    }

    #[test]
    fn render_text_has_fixed_section_order() {
        let board = board_fixture();
        let empty_events = loader::empty_frame(&[
            animal::ANIMAL_ID,
            event::OUTCOME_TYPE,
            event::OUTCOME_SUBTYPE,
            event::INTAKE_TYPE,
            event::INTAKE_SUBTYPE,
        ])
        .unwrap();

        let report = MorningReport {
            date: date("2024-06-15"),
            adoptions: empty_events.clone(),
            stage_counts: count_by(&board, animal::STAGE).unwrap(),
            category_counts: count_by(&board, dashboard::CATEGORY).unwrap(),
            occupancy: count_by(&board, animal::LOCATION).unwrap(),
            things_to_do: filter_categories(
                &board,
                &[Category::NeedsFosterNow, Category::Unrecognized],
            )
            .unwrap(),
            strays: empty_events.clone(),
            intakes: empty_events.clone(),
            rtos_transfers: empty_events,
        };

        let text = report.render_text().unwrap();
        let order = [
            "## Adoptions",
            "## Stage Count",
            "## Occupancy",
            "## Things to Do",
            "## Stray",
            "## Intake",
            "## RTOs & Transfers",
        ];
        let mut last = 0;
        for section in order {
            let pos = text.find(section).unwrap_or_else(|| panic!("missing {section}"));
            assert!(pos >= last, "{section} out of order");
            last = pos;
        }
        assert!(text.contains("Hold - Foster: 1"));
        assert!(text.contains("Biscuit"));
    }
}
