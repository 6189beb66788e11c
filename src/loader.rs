//! Raw export loading.
//!
//! Every PetPoint export loads as an all-string DataFrame: report files
//! carry a variable number of metadata rows above the header, column
//! types drift between schema versions, and ids must stay strings to
//! survive normalization. Typed parsing (dates, day counts) happens
//! downstream against canonical columns.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;

use crate::error::ShelterError;

/// Read a CSV export with all columns as String dtype.
///
/// `skip_rows` drops the metadata preamble above the header row. Encoding
/// fallback order: strict UTF-8, then Windows-1252, then lossy UTF-8 with
/// malformed rows dropped. Column names are whitespace-trimmed and run
/// through the optional rename map; renames for columns a schema version
/// doesn't carry are skipped rather than failing the load.
pub fn read_csv_as_strings(
    path: &Path,
    skip_rows: usize,
    rename: Option<&HashMap<String, String>>,
) -> Result<DataFrame, ShelterError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ShelterError::MissingFile(path.to_path_buf())
        } else {
            ShelterError::Io(e)
        }
    })?;

    let df = parse_csv_bytes(bytes, skip_rows)?;
    finish_frame(df, rename)
}

fn parse_csv_bytes(bytes: Vec<u8>, skip_rows: usize) -> Result<DataFrame, ShelterError> {
    if std::str::from_utf8(&bytes).is_ok() {
        if let Ok(df) = parse_csv(bytes.clone(), skip_rows, false) {
            return Ok(df);
        }
    } else {
        let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(&bytes);
        if !had_errors {
            if let Ok(df) = parse_csv(text.into_owned().into_bytes(), skip_rows, false) {
                return Ok(df);
            }
        }
    }

    // Last resort: drop whatever doesn't parse.
    parse_csv(bytes, skip_rows, true)
}

fn parse_csv(data: Vec<u8>, skip_rows: usize, lenient: bool) -> Result<DataFrame, ShelterError> {
    let mut options = CsvReadOptions::default()
        .with_has_header(true)
        .with_skip_rows(skip_rows)
        .with_infer_schema_length(Some(0)); // all columns as String

    if lenient {
        options = options.with_ignore_errors(true).with_parse_options(
            CsvParseOptions::default()
                .with_encoding(CsvEncoding::LossyUtf8)
                .with_truncate_ragged_lines(true),
        );
    }

    let df = options
        .into_reader_with_file_handle(Cursor::new(data))
        .finish()?;
    Ok(df)
}

/// Read an XLSX/XLS export with all cells stringified.
///
/// `sheet` picks a named sheet; `None` takes the first. The row at
/// `skip_rows` becomes the header, matching the CSV loaders.
pub fn read_xlsx_as_strings(
    path: &Path,
    sheet: Option<&str>,
    skip_rows: usize,
    rename: Option<&HashMap<String, String>>,
) -> Result<DataFrame, ShelterError> {
    if !path.exists() {
        return Err(ShelterError::MissingFile(path.to_path_buf()));
    }
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ShelterError::InvalidData("workbook has no sheets".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ShelterError::InvalidData(format!("sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows().skip(skip_rows);
    let header_row = rows
        .next()
        .ok_or_else(|| ShelterError::InvalidData(format!("sheet '{sheet_name}' has no header row")))?;

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell_to_string(cell).trim().to_string();
            if name.is_empty() {
                format!("column_{i}")
            } else {
                name
            }
        })
        .collect();

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for row in rows {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        for (i, col) in columns.iter_mut().enumerate() {
            col.push(row.get(i).map(cell_to_string).unwrap_or_default());
        }
    }

    let cols: Vec<Column> = headers
        .iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name.as_str().into(), values))
        .collect();

    let df = DataFrame::new(cols)?;
    finish_frame(df, rename)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            // Ids come back as floats after a spreadsheet round trip;
            // keep integral values free of the ".0" suffix.
            if f.fract() == 0.0 {
                format!("{f:.0}")
            } else {
                format!("{f}")
            }
        }
        Data::Int(i) => format!("{i}"),
        Data::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        Data::Error(e) => format!("#ERROR: {e:?}"),
        Data::DateTime(dt) => format!("{dt}"),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Trim column names and apply the rename map (missing sources skipped).
fn finish_frame(
    mut df: DataFrame,
    rename: Option<&HashMap<String, String>>,
) -> Result<DataFrame, ShelterError> {
    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    if let Some(map) = rename {
        let old: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
        let new: Vec<&str> = map.values().map(|s| s.as_str()).collect();
        df = df.lazy().rename(old, new, false).collect()?;
    }

    Ok(df)
}

/// Rename the first columns of a positional export (no stable headers).
pub fn rename_positional(df: DataFrame, names: &[&str]) -> Result<DataFrame, ShelterError> {
    let existing: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.to_string())
        .collect();
    if existing.len() < names.len() {
        return Err(ShelterError::InvalidData(format!(
            "expected at least {} columns, found {}",
            names.len(),
            existing.len(),
        )));
    }

    let mut df = df;
    let new_names: Vec<String> = names
        .iter()
        .map(|n| n.to_string())
        .chain(existing.into_iter().skip(names.len()))
        .collect();
    df.set_column_names(new_names.as_slice())?;
    Ok(df)
}

/// An empty all-string frame with the given columns, used in place of a
/// missing optional export so downstream joins become no-ops.
pub fn empty_frame(columns: &[&str]) -> Result<DataFrame, ShelterError> {
    let cols: Vec<Column> = columns
        .iter()
        .map(|c| Column::new((*c).into(), Vec::<String>::new()))
        .collect();
    Ok(DataFrame::new(cols)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn skips_metadata_preamble() {
        let file = write_temp(
            b"Animal Inventory Report\nGenerated 1/1/2024\nShelter Operations\nAnimalNumber,Stage\nA001,Available\n",
        );
        let df = read_csv_as_strings(file.path(), 3, None).unwrap();
        assert_eq!(df.height(), 1);
        assert!(df.column("AnimalNumber").is_ok());
    }

    #[test]
    fn trims_header_whitespace() {
        let file = write_temp(b" AnimalNumber , Stage \nA001,Available\n");
        let df = read_csv_as_strings(file.path(), 0, None).unwrap();
        assert!(df.column("AnimalNumber").is_ok());
        assert!(df.column("Stage").is_ok());
    }

    #[test]
    fn applies_rename_map_skipping_missing_sources() {
        let mut rename = HashMap::new();
        rename.insert("textbox9".to_string(), "animal_id".to_string());
        rename.insert("NotThere".to_string(), "ghost".to_string());

        let file = write_temp(b"textbox9,Stage\n58757250,In Foster\n");
        let df = read_csv_as_strings(file.path(), 0, Some(&rename)).unwrap();
        assert!(df.column("animal_id").is_ok());
        assert!(df.column("ghost").is_err());
    }

    #[test]
    fn falls_back_to_windows_1252() {
        // 0xE9 is 'é' in Windows-1252 and invalid UTF-8.
        let file = write_temp(b"AnimalNumber,AnimalName\nA001,Andr\xe9\n");
        let df = read_csv_as_strings(file.path(), 0, None).unwrap();
        let name = df.column("AnimalName").unwrap().str().unwrap().get(0).unwrap();
        assert_eq!(name, "André");
    }

    #[test]
    fn missing_file_is_distinguishable() {
        let err = read_csv_as_strings(Path::new("/nonexistent/AnimalInventory.csv"), 3, None)
            .unwrap_err();
        assert!(err.is_missing_file());
    }

    #[test]
    fn missing_xlsx_is_distinguishable() {
        let err =
            read_xlsx_as_strings(Path::new("/nonexistent/AnimalInventory.xlsx"), None, 0, None)
                .unwrap_err();
        assert!(err.is_missing_file());
    }

    #[test]
    fn positional_rename() {
        let file = write_temp(b"c0,c1,c2\nA001,Hold - Foster,1/1/2024\n");
        let df = read_csv_as_strings(file.path(), 0, None).unwrap();
        let df = rename_positional(df, &["animal_id", "hold_stage"]).unwrap();
        assert!(df.column("animal_id").is_ok());
        assert!(df.column("hold_stage").is_ok());
        assert!(df.column("c2").is_ok());
    }

    #[test]
    fn empty_frame_has_columns_no_rows() {
        let df = empty_frame(&["animal_id", "caregiver_name"]).unwrap();
        assert_eq!(df.height(), 0);
        assert!(df.column("caregiver_name").is_ok());
    }
}
