use std::io::{Read, Seek, SeekFrom};

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::dialect::{self, Dialect, SAMPLE_SIZE};
use crate::error::{ConvertError, Result};

/// the raw fields of one data row, in header order.
pub type Row = Vec<String>;

/// a csv input that can be read from the start any number of times.
/// every call to `rows` rewinds the underlying reader, so no row is kept in memory
/// between passes.
pub struct CsvSource<R> {
    inner: R,
    dialect: Dialect,
    headers: StringRecord,
}

impl<R: Read + Seek> CsvSource<R> {
    /// reads the header row. the dialect is sniffed from the first `SAMPLE_SIZE`
    /// bytes unless one is given.
    pub fn open(mut inner: R, dialect: Option<Dialect>) -> Result<Self> {
        let dialect = match dialect {
            Some(dialect) => dialect,
            None => {
                let mut sample = Vec::with_capacity(SAMPLE_SIZE);
                inner.by_ref().take(SAMPLE_SIZE as u64).read_to_end(&mut sample)?;
                dialect::sniff(&sample)?
            }
        };
        debug!(delimiter = ?(dialect.delimiter as char), "using dialect");

        inner.seek(SeekFrom::Start(0))?;
        let headers = reader_builder(&dialect)
            .from_reader(&mut inner)
            .headers()
            .map_err(|source| ConvertError::Header { source })?
            .clone();
        if headers.is_empty() {
            return Err(ConvertError::MissingHeader);
        }

        Ok(Self {
            inner,
            dialect,
            headers,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// starts a new pass over the data rows, the header row excluded.
    /// errors carry the 1-based index of the offending data row.
    pub fn rows(&mut self) -> Result<impl Iterator<Item = Result<Row>> + '_> {
        self.inner.seek(SeekFrom::Start(0))?;
        let records = reader_builder(&self.dialect)
            .from_reader(&mut self.inner)
            .into_records();

        Ok(records.enumerate().map(|(index, record)| {
            record
                .map(|record| record.iter().map(str::to_string).collect::<Row>())
                .map_err(|source| ConvertError::Csv {
                    row: index + 1,
                    source,
                })
        }))
    }
}

/// fails with `MalformedRow` unless `row` has exactly `expected` fields.
pub fn check_row_width(row_index: usize, expected: usize, row: &[String]) -> Result<()> {
    if row.len() == expected {
        Ok(())
    } else {
        Err(ConvertError::MalformedRow {
            row: row_index,
            expected,
            actual: row.len(),
        })
    }
}

// row widths are validated by the consumers so a short row is reported with its
// counts instead of as a generic csv error.
fn reader_builder(dialect: &Dialect) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .delimiter(dialect.delimiter)
        .quote(dialect.quote);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect_rows<R: Read + Seek>(source: &mut CsvSource<R>) -> Vec<Row> {
        source.rows().unwrap().collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn test_open_reads_headers_and_sniffs() {
        let source = CsvSource::open(Cursor::new("id;name\n1;Alice\n2;Bob\n3;Carol\n"), None).unwrap();
        assert_eq!(source.headers().iter().collect::<Vec<_>>(), ["id", "name"]);
        assert_eq!(source.dialect().delimiter, b';');
    }

    #[test]
    fn test_rows_can_be_read_twice() {
        let csv_data = "id,name\n1,\"O'Brien, Pat\"\n2,Bob\n";
        let mut source = CsvSource::open(Cursor::new(csv_data), Some(Dialect::default())).unwrap();
        let first = collect_rows(&mut source);
        let second = collect_rows(&mut source);
        assert_eq!(first, vec![vec!["1", "O'Brien, Pat"], vec!["2", "Bob"]]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_explicit_dialect_skips_sniffing() {
        let pipe = Dialect::with_delimiter(b'|');
        let mut source = CsvSource::open(Cursor::new("name|note\nAlice|a,b\n"), Some(pipe)).unwrap();
        assert_eq!(source.dialect(), pipe);
        assert_eq!(collect_rows(&mut source), vec![vec!["Alice", "a,b"]]);
    }

    #[test]
    fn test_short_rows_are_passed_through() {
        let mut source =
            CsvSource::open(Cursor::new("a,b,c\n1,2,3\n4,5\n"), Some(Dialect::default())).unwrap();
        let rows = collect_rows(&mut source);
        assert_eq!(rows[1], vec!["4", "5"]);
        match check_row_width(2, 3, &rows[1]) {
            Err(ConvertError::MalformedRow { row, expected, actual }) => {
                assert_eq!((row, expected, actual), (2, 3, 2));
            }
            other => panic!("expected malformed row, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_header_is_a_header_error() {
        let result = CsvSource::open(Cursor::new(&b"id,nam\xe9\n1,x\n"[..]), Some(Dialect::default()));
        match result {
            Err(err @ ConvertError::Header { .. }) => {
                assert!(err.is_invalid_utf8());
                assert_eq!(err.exit_code(), 2);
                assert!(err.to_string().starts_with("cannot read header row"));
            }
            Err(other) => panic!("expected header error, got {:?}", other),
            Ok(_) => panic!("expected header error"),
        }
    }

    #[test]
    fn test_invalid_utf8_row_carries_its_index() {
        let mut source =
            CsvSource::open(Cursor::new(&b"id,name\n1,Ann\n2,Jos\xe9\n"[..]), Some(Dialect::default())).unwrap();
        let results: Vec<Result<Row>> = source.rows().unwrap().collect();
        assert!(results[0].is_ok());
        match &results[1] {
            Err(err @ ConvertError::Csv { row: 2, .. }) => assert!(err.is_invalid_utf8()),
            other => panic!("expected csv error in row 2, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let result = CsvSource::open(Cursor::new(""), Some(Dialect::default()));
        assert!(matches!(result, Err(ConvertError::MissingHeader)));
    }
}
