//! Bulk import of pasted text or CSV files.
//!
//! Turns loosely formatted `date<sep>value` rows into observations that are
//! safe to merge into the store.
//!
//! Design goals:
//! - **Forgiving layout**: tab, comma, semicolon or whitespace separated; an
//!   optional header row is skipped
//! - **Row-level validation**: bad rows are reported with their line number,
//!   not fatal
//! - **Deterministic behavior**: duplicates resolve last-write-wins when merged

use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::Observation;
use crate::error::AppError;

/// A row-level error encountered during import.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Import output: parsed observations (input order) plus row errors.
#[derive(Debug, Clone)]
pub struct ImportedRows {
    pub observations: Vec<Observation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub header_skipped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Byte(u8),
    Whitespace,
}

/// Read and parse an import file.
pub fn load_import_file(path: &Path) -> Result<ImportedRows, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read import file '{}': {e}", path.display())))?;
    parse_pasted_text(&text)
}

/// Parse pasted text into observations.
///
/// Fails only when no row at all could be used.
pub fn parse_pasted_text(text: &str) -> Result<ImportedRows, AppError> {
    let separator = detect_separator(text);
    let rows = split_rows(text, separator)?;

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut header_skipped = false;
    let rows_read = rows.len();

    for (pos, (line, fields)) in rows.into_iter().enumerate() {
        match parse_row(&fields) {
            Ok(obs) => observations.push(obs),
            Err(_) if pos == 0 && looks_like_header(&fields) => header_skipped = true,
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if observations.is_empty() {
        return Err(AppError::new(2, "No valid rows found in import."));
    }

    tracing::info!(
        rows_read,
        used = observations.len(),
        errors = row_errors.len(),
        "parsed import"
    );

    Ok(ImportedRows {
        observations,
        row_errors,
        rows_read: if header_skipped { rows_read - 1 } else { rows_read },
        header_skipped,
    })
}

/// Parse a user-entered date.
///
/// We store ISO dates (`YYYY-MM-DD`), but pasted spreadsheet columns often
/// use `DD/MM/YYYY` or `DD-MM-YYYY`. We accept a small fixed set of formats so
/// parsing stays deterministic.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

/// Parse a user-entered value. Must be a finite number.
pub fn parse_value(s: &str) -> Result<f64, String> {
    let s = s.trim();
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid value '{s}'. Expected a finite number.")),
    }
}

fn detect_separator(text: &str) -> Separator {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if first.contains('\t') {
        Separator::Byte(b'\t')
    } else if first.contains(';') {
        Separator::Byte(b';')
    } else if first.contains(',') {
        Separator::Byte(b',')
    } else {
        Separator::Whitespace
    }
}

fn split_rows(text: &str, separator: Separator) -> Result<Vec<(usize, Vec<String>)>, AppError> {
    let byte = match separator {
        Separator::Whitespace => {
            return Ok(text
                .lines()
                .enumerate()
                .filter(|(_, l)| !l.trim().is_empty())
                .map(|(idx, l)| (idx + 1, l.split_whitespace().map(str::to_string).collect()))
                .collect());
        }
        Separator::Byte(b) => b,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(byte)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::new(2, format!("Failed to parse import: {e}")))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 1);
        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        rows.push((line, fields));
    }
    Ok(rows)
}

fn parse_row(fields: &[String]) -> Result<Observation, String> {
    let (Some(date), Some(value)) = (fields.first(), fields.get(1)) else {
        return Err("Expected two columns: date and value.".to_string());
    };
    Ok(Observation::new(parse_date(date)?, parse_value(value)?))
}

fn looks_like_header(fields: &[String]) -> bool {
    // Excel and other tools sometimes emit UTF-8 with a BOM prefix on the
    // first cell; strip it before deciding.
    fields
        .first()
        .map(|f| f.trim_start_matches('\u{feff}'))
        .is_some_and(|f| parse_date(f).is_err() && f.chars().any(|c| c.is_alphabetic()))
}
