//! End-to-end pipeline tests: real export files on disk, full
//! load -> normalize -> classify -> join -> derive runs.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tempfile::TempDir;

use petpoint_core::{MorningReport, ShelterError, ShelterModel, SourceConfig};

const INVENTORY_HEADER: &str = "AnimalNumber,AnimalName,Species,PrimaryBreed,Sex,Age,Stage,Location,SubLocation,IntakeDateTime,DateOfBirth,SpayedNeutered";

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

fn write_export(dir: &Path, name: &str, preamble_rows: usize, body: &str) {
    let mut content = String::new();
    for i in 0..preamble_rows {
        content.push_str(&format!("metadata row {i}\n"));
    }
    content.push_str(body);
    fs::write(dir.join(name), content).unwrap();
}

fn write_inventory(dir: &Path, rows: &[&str]) {
    let body = format!("{INVENTORY_HEADER}\n{}\n", rows.join("\n"));
    write_export(dir, "AnimalInventory.csv", 3, &body);
}

fn now() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-06-15 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

fn str_cell(df: &DataFrame, column: &str, row: usize) -> String {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .get(row)
        .unwrap_or_default()
        .to_string()
}

#[test]
fn full_pipeline_with_all_exports() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    write_inventory(
        dir.path(),
        &[
            "A0012345678,Biscuit,Dog,Terrier,Male,2 years,Hold - Foster,Dog Adoptions,Kennel 4,6/5/2024 9:00 PM,3/1/2022,Yes",
            "A0022222222,Mochi,Cat,DSH,Female,1 year,Hold \u{2013} SAFE Foster,Cat Adoptions,Cage 2,6/1/2024 10:00 AM,5/1/2023,Yes",
            "A0033333333,Juniper,Dog,Hound,Female,4 years,Hold - Cryptid,,,6/10/2024 8:00 AM,1/1/2020,No",
        ],
    );
    write_export(
        dir.path(),
        "FosterCurrent.csv",
        6,
        "textbox9,textbox10,textbox11,StartStatusDate,Stage\n\
         12345678,P000111222,Jane Doe,6/7/2024,Hold - Foster\n",
    );
    write_export(
        dir.path(),
        "Hold - Foster Stage Date.csv",
        2,
        "AnimalNumber,Stage,StageStartDate\n\
         A0012345678,Hold - Foster,6/6/2024\n",
    );
    write_export(
        dir.path(),
        "AnimalOutcome.csv",
        3,
        "AnimalNumber,OutcomeType,OutcomeSubtype,OutcomeDateTime\n\
         A0044444444,Adoption,Walk-In,6/14/2024 3:00 PM\n\
         A0055555555,Transfer Out,Partner,6/14/2024 4:00 PM\n",
    );
    write_export(
        dir.path(),
        "AnimalIntake.csv",
        3,
        "AnimalNumber,IntakeType,IntakeSubtype,IntakeDateTime\n\
         A0066666666,Stray,Stray,6/14/2024 11:00 AM\n",
    );
    fs::write(
        dir.path().join("Pathways for Care.csv"),
        "AID,Welfare Notes,Foster Attempted\n\
         A0033333333,Shy with new people,Yes\n",
    )
    .unwrap();

    let mut model = ShelterModel::new(dir.path());
    model.load_all().unwrap();

    let board = model.dashboard(now()).unwrap();
    assert_eq!(board.height(), 3);

    // Sorted by canonical id: 12345678, 22222222, 33333333
    assert_eq!(str_cell(&board, "animal_id", 0), "12345678");

    // Roster membership outranks the bare Hold - Foster stage.
    assert_eq!(str_cell(&board, "category", 0), "In Foster");
    assert_eq!(str_cell(&board, "caregiver_name", 0), "Jane Doe");
    assert_eq!(str_cell(&board, "caregiver_id", 0), "000111222");
    assert_eq!(str_cell(&board, "foster_start_date", 0), "6/7/2024");
    assert_eq!(str_cell(&board, "hold_start_date", 0), "6/6/2024");

    // En-dash SAFE stage classifies like the hyphen form.
    assert_eq!(str_cell(&board, "category", 1), "In Behavior Program");

    // Unknown stage surfaces instead of hiding in Other; pathways notes
    // joined by canonical id; blank location reads Unknown.
    assert_eq!(str_cell(&board, "category", 2), "Unrecognized Stage");
    assert_eq!(str_cell(&board, "welfare_notes", 2), "Shy with new people");
    assert_eq!(str_cell(&board, "foster_attempted", 2), "Yes");
    assert_eq!(str_cell(&board, "location", 2), "Unknown");

    // LOS: intake 6/5 9:00 PM to 6/15 9:00 AM is 9.5 days, floored.
    let los = board.column("los_days").unwrap().i64().unwrap();
    assert_eq!(los.get(0), Some(9));
}

#[test]
fn missing_foster_current_degrades_to_needs_foster_now() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    write_inventory(
        dir.path(),
        &["A0012345678,Biscuit,Dog,Terrier,Male,2 years,Hold - Foster,Dog Adoptions,,6/5/2024 9:00 PM,,Yes"],
    );

    let mut model = ShelterModel::new(dir.path());
    model.load_all().unwrap();

    let board = model.dashboard(now()).unwrap();
    assert_eq!(str_cell(&board, "category", 0), "Needs Foster Now");
    assert_eq!(str_cell(&board, "caregiver_name", 0), "Not in Foster");
    assert_eq!(str_cell(&board, "hold_start_date", 0), "");
}

#[test]
fn missing_inventory_is_a_hard_stop() {
    let dir = TempDir::new().unwrap();
    let mut model = ShelterModel::new(dir.path());
    let err = model.load_all().unwrap_err();
    assert!(matches!(err, ShelterError::MissingFile(_)));
}

#[test]
fn pipeline_is_idempotent_on_unchanged_files() {
    let dir = TempDir::new().unwrap();

    write_inventory(
        dir.path(),
        &[
            "A0012345678,Biscuit,Dog,Terrier,Male,2 years,Hold - Foster,Dog Adoptions,,6/5/2024 9:00 PM,,Yes",
            "A0022222222,Mochi,Cat,DSH,Female,1 year,Available,Cat Adoptions,,6/1/2024 10:00 AM,,Yes",
        ],
    );
    write_export(
        dir.path(),
        "FosterCurrent.csv",
        6,
        "textbox9,textbox10,textbox11,StartStatusDate,Stage\n\
         12345678,P000111222,Jane Doe,6/7/2024,Hold - Foster\n",
    );

    let mut first = ShelterModel::new(dir.path());
    first.load_all().unwrap();
    let mut second = ShelterModel::new(dir.path());
    second.load_all().unwrap();

    let a = first.dashboard(now()).unwrap();
    let b = second.dashboard(now()).unwrap();
    assert!(a.equals_missing(&b));
}

#[test]
fn morning_report_sections_from_files() {
    let dir = TempDir::new().unwrap();

    write_inventory(
        dir.path(),
        &[
            "A0012345678,Biscuit,Dog,Terrier,Male,2 years,Hold - Foster,Dog Adoptions,,6/5/2024 9:00 PM,,Yes",
            "A0022222222,Mochi,Cat,DSH,Female,1 year,Available,Cat Adoptions,,6/1/2024 10:00 AM,,Yes",
        ],
    );
    write_export(
        dir.path(),
        "AnimalOutcome.csv",
        3,
        "AnimalNumber,OutcomeType,OutcomeSubtype,OutcomeDateTime\n\
         A0044444444,Adoption,Walk-In,6/14/2024 3:00 PM\n\
         A0055555555,Adoption,Web,6/13/2024 3:00 PM\n\
         A0077777777,Return to Owner,,6/14/2024 5:00 PM\n",
    );
    write_export(
        dir.path(),
        "AnimalIntake.csv",
        3,
        "AnimalNumber,IntakeType,IntakeSubtype,IntakeDateTime\n\
         A0066666666,Stray,Stray,6/14/2024 11:00 AM\n\
         A0088888888,Owner Surrender,,6/14/2024 1:00 PM\n",
    );

    let mut model = ShelterModel::new(dir.path());
    model.load_all().unwrap();

    let date = NaiveDate::parse_from_str("2024-06-14", "%Y-%m-%d").unwrap();
    let report = MorningReport::build(&model, date, now()).unwrap();

    // Only the 6/14 adoption counts; the RTO lands in its own section.
    assert_eq!(report.adoptions.height(), 1);
    assert_eq!(report.rtos_transfers.height(), 1);
    assert_eq!(report.intakes.height(), 2);
    assert_eq!(report.strays.height(), 1);
    assert_eq!(report.things_to_do.height(), 1);

    let text = report.render_text().unwrap();
    assert!(text.contains("## Adoptions (1)"));
    assert!(text.contains("## RTOs & Transfers (1)"));
    assert!(text.contains("Hold - Foster: 1"));
}

#[test]
fn config_file_overrides_source_names() {
    let dir = TempDir::new().unwrap();

    // Same export, different filename and preamble depth.
    let body = format!("{INVENTORY_HEADER}\nA0012345678,Biscuit,Dog,Terrier,Male,2 years,Available,Dog Adoptions,,6/5/2024 9:00 PM,,Yes\n");
    write_export(dir.path(), "Inventory-Snapshot.csv", 5, &body);

    let config_json = format!(
        r#"{{
            "base_path": {:?},
            "inventory": {{ "filename": "Inventory-Snapshot.csv", "skip_rows": 5 }}
        }}"#,
        dir.path(),
    );
    let config = SourceConfig::parse(&config_json).unwrap();

    let mut model = ShelterModel::with_config(config);
    model.load_all().unwrap();

    let board = model.dashboard(now()).unwrap();
    assert_eq!(board.height(), 1);
    assert_eq!(str_cell(&board, "category", 0), "Other");
}
