use crate::errors::{ExpenseError, Result};
use crate::models::expense::ExpenseRecord;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// One line of the expense file, kept as raw text until parsed.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Amount")]
    amount: String,
}

impl From<&ExpenseRecord> for StoredRow {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            category: record.category.clone(),
            amount: record.amount.to_string(),
        }
    }
}

/// Flat-file persistence for expense records.
///
/// The whole file is rewritten on every append. A missing file is an empty
/// ledger, not an error.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads every record in file order.
    pub fn load(&self) -> Result<Vec<ExpenseRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "expense file missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::None)
            .from_reader(file);

        let headers = reader.headers().map_err(malformed_csv)?.clone();
        let mut records = Vec::new();
        for result in reader.records() {
            let raw = result.map_err(malformed_csv)?;
            // Physical line in the file, header included.
            let line = raw.position().map_or(0, |pos| pos.line() as usize);
            let row: StoredRow = raw
                .deserialize(Some(&headers))
                .map_err(|e| ExpenseError::Malformed {
                    line,
                    message: e.to_string(),
                })?;
            records.push(parse_row(row, line)?);
        }

        debug!(path = %self.path.display(), count = records.len(), "loaded expenses");
        Ok(records)
    }

    /// Adds one record at the end and rewrites the file.
    pub fn append(&self, record: &ExpenseRecord) -> Result<()> {
        let mut records = self.load()?;
        records.push(record.clone());
        self.write_all(&records)?;
        debug!(
            path = %self.path.display(),
            count = records.len(),
            category = %record.category,
            amount = %record.amount,
            "appended expense"
        );
        Ok(())
    }

    /// Deletes the backing file. Clearing a ledger that has no file is an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "cleared all expenses");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ExpenseError::NotFound(self.path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, records: &[ExpenseRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;
        for record in records {
            writer.serialize(StoredRow::from(record))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Shape problems in the file become `Malformed`; anything else stays a CSV error.
fn malformed_csv(err: csv::Error) -> ExpenseError {
    let line = err.position().map_or(0, |pos| pos.line() as usize);
    match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => ExpenseError::Malformed {
            line,
            message: format!("expected {} fields, found {}", expected_len, len),
        },
        csv::ErrorKind::Utf8 { .. } | csv::ErrorKind::Deserialize { .. } => {
            ExpenseError::Malformed {
                line,
                message: err.to_string(),
            }
        }
        _ => ExpenseError::Csv(err),
    }
}

fn parse_row(row: StoredRow, line: usize) -> Result<ExpenseRecord> {
    let date = parse_stored_date(&row.date).ok_or_else(|| ExpenseError::Malformed {
        line,
        message: format!("invalid date '{}'", row.date),
    })?;
    let amount = parse_stored_amount(&row.amount).ok_or_else(|| ExpenseError::Malformed {
        line,
        message: format!("invalid amount '{}'", row.amount),
    })?;
    Ok(ExpenseRecord::from_stored(date, row.category, amount))
}

fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_stored_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .ok()
        .or_else(|| Decimal::from_scientific(raw).ok())
}
