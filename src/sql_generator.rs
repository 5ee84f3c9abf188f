use std::borrow::Cow;

use tracing::trace;

use crate::error::Result;
use crate::source::{Row, check_row_width};
use crate::table::Table;
use crate::type_inference::ColumnType;

/// width of text columns unless `VarcharWidth::Fit` is requested.
pub const DEFAULT_VARCHAR_WIDTH: usize = 255;

/// how text columns are sized in `create table`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VarcharWidth {
    /// always `VARCHAR(255)`.
    #[default]
    Fixed,
    /// the longest value seen in the column, at least 1.
    Fit,
}

pub fn sql_type(column_type: ColumnType, width: VarcharWidth) -> String {
    match (column_type, width) {
        (ColumnType::Integer, _) => "BIGINT".to_string(),
        (ColumnType::Decimal, _) => "DECIMAL".to_string(),
        (ColumnType::Varchar(_), VarcharWidth::Fixed) => format!("VARCHAR({})", DEFAULT_VARCHAR_WIDTH),
        // varchar(0) is rejected by most databases
        (ColumnType::Varchar(len), VarcharWidth::Fit) => format!("VARCHAR({})", len.max(1)),
    }
}

/// generates a `create table if not exists` statement with one line per column, in column order.
pub fn generate_create_table(table: &Table, width: VarcharWidth) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS `{}` (\n", table.name);

    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|column| format!("  `{}` {}", column.name, sql_type(column.inferred_type, width)))
        .collect();

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n);");

    sql
}

/// generates one `insert into` statement per row, each on its own line.
/// every value is written as a quoted string literal, whatever the column type.
pub fn generate_inserts<I>(table_name: &str, column_count: usize, rows: I) -> Result<String>
where
    I: IntoIterator<Item = Result<Row>>,
{
    let mut sql = String::new();

    for (index, row) in rows.into_iter().enumerate() {
        let row = row?;
        check_row_width(index + 1, column_count, &row)?;
        trace!(row = index + 1, values = ?row, "rendering insert");

        let values: Vec<String> = row
            .iter()
            .map(|value| format!("'{}'", escape_literal(value)))
            .collect();
        sql.push_str(&format!(
            "INSERT INTO `{}` VALUES ({});\n",
            table_name,
            values.join(",")
        ));
    }

    Ok(sql)
}

/// escapes single quotes as `\'`. double quotes, backslashes and control characters
/// are left as they are.
pub fn escape_literal(value: &str) -> Cow<'_, str> {
    if value.contains('\'') {
        Cow::Owned(value.replace('\'', "\\'"))
    } else {
        Cow::Borrowed(value)
    }
}

/// joins the two statement blocks into the contents of the output file.
pub fn generate_script(create_table: &str, inserts: &str) -> String {
    format!("{}\n{}\n", create_table, inserts)
}
