use std::collections::HashSet;
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::type_inference::ColumnType;

/// a column of the generated table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub inferred_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inferred_type: ColumnType::default(),
        }
    }
}

/// the table a csv file is converted into. columns keep the header order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// builds a table from raw header fields, sanitizing each one.
    /// headers that sanitize to nothing or to the same name as another are rejected.
    pub fn from_headers<I, S>(name: impl Into<String>, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for (index, header) in headers.into_iter().enumerate() {
            let column_name = sanitize_header(header.as_ref());
            if column_name.is_empty() {
                return Err(ConvertError::EmptyColumnName { position: index + 1 });
            }
            if !seen.insert(column_name.clone()) {
                return Err(ConvertError::DuplicateColumn { name: column_name });
            }
            columns.push(Column::new(column_name));
        }

        Ok(Self {
            name: name.into(),
            columns,
        })
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// drops a `:typehint` suffix and every character other than ascii letters, digits,
/// space, hyphen and underscore.
pub fn sanitize_header(header: &str) -> String {
    let name = header.split(':').next().unwrap_or_default();
    strip_disallowed(name)
}

/// the table name for an input path: its file name up to the first `.`, with the
/// characters `sanitize_header` drops removed as well.
pub fn table_name_from_path(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .map(strip_disallowed)
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| ConvertError::TableName {
            path: path.to_path_buf(),
        })
}

fn strip_disallowed(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect()
}
