// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Donation import from two-column `name,amount` CSV files.
//!
//! The first row is always treated as a header and discarded. Every other
//! non-blank row becomes one [`Donation`] with a fresh id and timestamp. A
//! single bad row rejects the whole batch.

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use pledgewall_core::{Donation, PledgeError};
use thiserror::Error;
use tracing::{debug, info};

/// Why an import batch was rejected.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid amount format in line {line}: {content}")]
    InvalidAmount { line: u64, content: String },

    #[error("missing amount in line {line}: {content}")]
    MissingAmount { line: u64, content: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl From<ImportError> for PledgeError {
    fn from(err: ImportError) -> Self {
        PledgeError::Import {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Parses a donation amount typed by a person: `$` and `,` are ignored.
///
/// Rejects anything that is not a finite, non-negative number.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let amount: f64 = cleaned.trim().parse().ok()?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

fn unquote(field: &str) -> &str {
    let field = field.trim();
    let field = field.strip_prefix('"').unwrap_or(field);
    field.strip_suffix('"').unwrap_or(field)
}

fn parse_record(record: &StringRecord) -> Result<Option<Donation>, ImportError> {
    if record.iter().all(|f| f.trim().is_empty()) {
        return Ok(None);
    }

    let line = record.position().map(|p| p.line()).unwrap_or_default();
    let content = record.iter().collect::<Vec<_>>().join(",");

    let name = unquote(record.get(0).unwrap_or_default()).to_string();

    // An unquoted "$1,000" arrives split across fields; stitch it back.
    let amount_text: String = record.iter().skip(1).map(unquote).collect();
    if amount_text.trim().is_empty() {
        return Err(ImportError::MissingAmount { line, content });
    }

    let amount = parse_amount(&amount_text).ok_or(ImportError::InvalidAmount {
        line,
        content: content.clone(),
    })?;

    Donation::new(name, amount)
        .map(Some)
        .map_err(|_| ImportError::InvalidAmount { line, content })
}

/// Parses every donation in `reader`. All-or-nothing.
pub fn parse_reader<R: Read>(reader: R) -> Result<Vec<Donation>, ImportError> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut donations = Vec::new();
    for record in csv.records() {
        if let Some(donation) = parse_record(&record?)? {
            donations.push(donation);
        }
    }
    debug!(count = donations.len(), "donation CSV parsed");
    Ok(donations)
}

/// Parses donations from CSV text.
pub fn parse_donations(input: &str) -> Result<Vec<Donation>, ImportError> {
    parse_reader(input.as_bytes())
}

/// Reads and parses a CSV file.
pub fn import_file(path: &Path) -> Result<Vec<Donation>, ImportError> {
    let file = std::fs::File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let donations = parse_reader(file)?;
    info!(path = %path.display(), count = donations.len(), "donation file imported");
    Ok(donations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_rows() {
        let donations = parse_donations("name,amount\nAlice,100\nBob,$50.25\n").unwrap();
        assert_eq!(donations.len(), 2);
        assert_eq!(donations[0].name, "Alice");
        assert_eq!(donations[0].amount, 100.0);
        assert_eq!(donations[1].name, "Bob");
        assert_eq!(donations[1].amount, 50.25);
        assert_ne!(donations[0].id, donations[1].id);
    }

    #[test]
    fn invalid_amount_rejects_whole_batch() {
        let err = parse_donations("name,amount\nAlice,100\nCarol,abc\n").unwrap_err();
        match err {
            ImportError::InvalidAmount { line, content } => {
                assert_eq!(line, 3);
                assert_eq!(content, "Carol,abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_is_discarded_whatever_it_says() {
        let donations = parse_donations("Dana,10\nEve,20\n").unwrap();
        assert_eq!(donations.len(), 1);
        assert_eq!(donations[0].name, "Eve");
    }

    #[test]
    fn blank_lines_and_whitespace_are_ignored() {
        let input = "name,amount\n\n  Alice , 5 \n   \n\"Bob Smith\",\"$7\"\n";
        let donations = parse_donations(input).unwrap();
        assert_eq!(donations.len(), 2);
        assert_eq!(donations[0].name, "Alice");
        assert_eq!(donations[0].amount, 5.0);
        assert_eq!(donations[1].name, "Bob Smith");
        assert_eq!(donations[1].amount, 7.0);
    }

    #[test]
    fn thousands_separator_is_handled() {
        let donations = parse_donations("name,amount\nBob,$1,000\nCarol,\"$2,500.50\"\n").unwrap();
        assert_eq!(donations[0].amount, 1000.0);
        assert_eq!(donations[1].amount, 2500.5);
    }

    #[test]
    fn missing_amount_is_an_error() {
        let err = parse_donations("name,amount\nAlice\n").unwrap_err();
        assert!(matches!(err, ImportError::MissingAmount { line: 2, .. }));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let err = parse_donations("name,amount\nMallory,-5\n").unwrap_err();
        assert!(matches!(err, ImportError::InvalidAmount { .. }));
    }

    #[test]
    fn parse_amount_rules() {
        assert_eq!(parse_amount("$1,234.5"), Some(1234.5));
        assert_eq!(parse_amount(" 0 "), Some(0.0));
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("-1"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn import_error_converts_to_pledge_error() {
        let err: PledgeError = parse_donations("name,amount\nCarol,abc\n").unwrap_err().into();
        assert!(matches!(err, PledgeError::Import { .. }));
        assert!(err.to_string().contains("Carol,abc"));
    }

    #[test]
    fn import_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("donations.csv");
        std::fs::write(&path, "name,amount\nAlice,1\nBob,2\n").unwrap();
        assert_eq!(import_file(&path).unwrap().len(), 2);

        let missing = import_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(missing, ImportError::Io { .. }));
    }
}
