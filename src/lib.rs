use std::fs::File;
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

mod dialect;
mod error;
mod source;
mod sql_generator;
mod table;
mod type_inference;

pub use dialect::{Dialect, SAMPLE_SIZE, sniff};
pub use error::{ConvertError, Result};
pub use source::{CsvSource, Row, check_row_width};
pub use sql_generator::{
    DEFAULT_VARCHAR_WIDTH, VarcharWidth, escape_literal, generate_create_table, generate_inserts,
    generate_script, sql_type,
};
pub use table::{Column, Table, sanitize_header, table_name_from_path};
pub use type_inference::{
    CellClass, ColumnType, NarrowingPolicy, classify_cell, infer_column_types, infer_table_types,
};

/// settings for a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// field delimiter; sniffed from the input when `None`.
    pub delimiter: Option<u8>,
    pub policy: NarrowingPolicy,
    pub varchar_width: VarcharWidth,
}

/// the result of converting one csv input.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub table: Table,
    pub create_table: String,
    pub inserts: String,
}

impl Conversion {
    /// the full contents of the `.sql` output file.
    pub fn script(&self) -> String {
        generate_script(&self.create_table, &self.inserts)
    }
}

/// converts csv data into a `create table` statement and an insert script.
/// the input is read twice: once to infer column types and once to render the rows.
pub fn convert<R: Read + Seek>(reader: R, table_name: &str, options: &ConvertOptions) -> Result<Conversion> {
    let mut source = CsvSource::open(reader, options.delimiter.map(Dialect::with_delimiter))?;
    let mut table = Table::from_headers(table_name, source.headers())?;
    debug!(table = %table.name, columns = ?table.column_names().collect::<Vec<_>>(), "read headers");

    infer_table_types(&mut table, source.rows()?, options.policy)?;
    let create_table = generate_create_table(&table, options.varchar_width);
    let inserts = generate_inserts(&table.name, table.len(), source.rows()?)?;

    Ok(Conversion {
        table,
        create_table,
        inserts,
    })
}

/// converts the csv file at `input` and writes the script to `output`, or to
/// `<table name>.sql` in the working directory. returns the path written.
/// nothing is written unless the whole conversion succeeds.
pub fn convert_file(input: &Path, output: Option<&Path>, options: &ConvertOptions) -> Result<PathBuf> {
    let table_name = table_name_from_path(input)?;

    let unreadable = |err: io::Error| ConvertError::InputUnreadable {
        path: input.to_path_buf(),
        reason: err.to_string(),
    };
    let file = File::open(input).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => ConvertError::InputNotFound {
            path: input.to_path_buf(),
        },
        _ => unreadable(err),
    })?;

    let conversion = convert(BufReader::new(file), &table_name, options).map_err(|err| match err {
        ConvertError::Io(err) => unreadable(err),
        err if err.is_invalid_utf8() => ConvertError::InputUnreadable {
            path: input.to_path_buf(),
            reason: err.to_string(),
        },
        other => other,
    })?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{}.sql", table_name)));
    write_atomically(&output, conversion.script().as_bytes())?;
    info!(path = %output.display(), columns = conversion.table.len(), "wrote sql");

    Ok(output)
}

// writes to a temporary file next to `path` and renames it into place.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let output_error = |source: io::Error| ConvertError::Output {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(output_error)?;
    file.write_all(contents).map_err(output_error)?;
    file.persist(path).map_err(|err| output_error(err.error))?;
    Ok(())
}
