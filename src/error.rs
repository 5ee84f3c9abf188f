use std::path::PathBuf;
use thiserror::Error;

/// errors raised while converting a csv file into sql.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("File '{}' not found or invalid.", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("File '{}' could not be read: {reason}", .path.display())]
    InputUnreadable { path: PathBuf, reason: String },

    #[error("could not determine delimiter: {reason}")]
    DialectUndetermined { reason: String },

    #[error("input has no header row")]
    MissingHeader,

    /// a data row does not carry one field per header.
    /// `row` is the 1-based index of the data row, the header excluded.
    #[error("row {row} has {actual} fields, expected {expected}")]
    MalformedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("cannot read header row: {source}")]
    Header {
        #[source]
        source: csv::Error,
    },

    /// `position` is 1-based.
    #[error("header {position} has no usable characters left after sanitizing")]
    EmptyColumnName { position: usize },

    #[error("duplicate column name '{name}' after sanitizing headers")]
    DuplicateColumn { name: String },

    #[error("cannot derive a table name from '{}'", .path.display())]
    TableName { path: PathBuf },

    #[error("csv error in row {row}: {source}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write '{}': {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// process exit status for this error.
    /// problems with the input file are reported like usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::InputNotFound { .. }
            | ConvertError::InputUnreadable { .. }
            | ConvertError::DialectUndetermined { .. }
            | ConvertError::MissingHeader
            | ConvertError::Header { .. }
            | ConvertError::TableName { .. } => 2,
            ConvertError::Csv { .. } if self.is_invalid_utf8() => 2,
            _ => 1,
        }
    }

    /// whether the input bytes could not be decoded as utf-8.
    pub fn is_invalid_utf8(&self) -> bool {
        match self {
            ConvertError::Csv { source, .. } | ConvertError::Header { source } => {
                matches!(source.kind(), csv::ErrorKind::Utf8 { .. })
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
