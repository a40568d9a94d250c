use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseErrorKind {
    #[error("Expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },
    #[error("Invalid integer in column {column} '{name}' (value: '{value}')")]
    InvalidInt {
        column: usize,
        name: &'static str,
        value: String,
    },
    #[error("Invalid float in column {column} '{name}' (value: '{value}')")]
    InvalidFloat {
        column: usize,
        name: &'static str,
        value: String,
    },
}

/// Splits a whitespace-delimited record, skipping blank lines and `#` comments.
pub(crate) fn record_fields(line: &str) -> Option<Vec<&str>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.first() {
        None => None,
        Some(first) if first.starts_with('#') => None,
        Some(_) => Some(fields),
    }
}

pub(crate) fn parse_int(
    fields: &[&str],
    column: usize,
    name: &'static str,
) -> Result<u32, ParseErrorKind> {
    fields[column]
        .parse::<u32>()
        .map_err(|_| ParseErrorKind::InvalidInt {
            column: column + 1,
            name,
            value: fields[column].to_string(),
        })
}

pub(crate) fn parse_float(
    fields: &[&str],
    column: usize,
    name: &'static str,
) -> Result<f64, ParseErrorKind> {
    fields[column]
        .parse::<f64>()
        .map_err(|_| ParseErrorKind::InvalidFloat {
            column: column + 1,
            name,
            value: fields[column].to_string(),
        })
}

pub(crate) fn expect_columns(fields: &[&str], expected: usize) -> Result<(), ParseErrorKind> {
    if fields.len() < expected {
        Err(ParseErrorKind::ColumnCount {
            expected,
            found: fields.len(),
        })
    } else {
        Ok(())
    }
}
