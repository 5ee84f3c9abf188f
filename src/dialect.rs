use csv_nose::{Quote, SampleSize, Sniffer};

use crate::error::{ConvertError, Result};

/// number of leading bytes of the input inspected by `sniff`.
pub const SAMPLE_SIZE: usize = 128;

const QUOTE: u8 = b'"';

/// the delimiter and quote convention of a csv file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Dialect {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter, quote: QUOTE }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::with_delimiter(b',')
    }
}

/// detects the dialect from at most the first `SAMPLE_SIZE` bytes of `sample`.
/// when no quote character shows up in the sample, `"` is assumed.
pub fn sniff(sample: &[u8]) -> Result<Dialect> {
    let sample = &sample[..sample.len().min(SAMPLE_SIZE)];
    if sample.iter().all(u8::is_ascii_whitespace) {
        return Err(ConvertError::DialectUndetermined {
            reason: "the input is empty".to_string(),
        });
    }

    let mut sniffer = Sniffer::new();
    sniffer.sample_size(SampleSize::Bytes(SAMPLE_SIZE));
    let metadata = sniffer
        .sniff_bytes(sample)
        .map_err(|err| ConvertError::DialectUndetermined {
            reason: err.to_string(),
        })?;

    let quote = match &metadata.dialect.quote {
        Quote::Some(quote) => *quote,
        _ => QUOTE,
    };
    Ok(Dialect {
        delimiter: metadata.dialect.delimiter,
        quote,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_comma() {
        let dialect = sniff(b"a,b,c\n1,2,3\n4,5,6\n").unwrap();
        assert_eq!(dialect.delimiter, b',');
    }

    #[test]
    fn test_sniff_semicolon_and_tab() {
        let semicolon = sniff(b"id;name;city\n1;Alice;Paris\n2;Bob;Rome\n3;Carol;Oslo\n").unwrap();
        assert_eq!(semicolon.delimiter, b';');
        let tab = sniff(b"id\tname\tcity\n1\tAlice\tParis\n2\tBob\tRome\n3\tCarol\tOslo\n").unwrap();
        assert_eq!(tab.delimiter, b'\t');
    }

    #[test]
    fn test_sniff_fails_on_empty_sample() {
        assert!(matches!(sniff(b""), Err(ConvertError::DialectUndetermined { .. })));
        assert!(matches!(sniff(b"\n \n"), Err(ConvertError::DialectUndetermined { .. })));
    }

    #[test]
    fn test_default_dialect() {
        assert_eq!(Dialect::default(), Dialect { delimiter: b',', quote: b'"' });
    }
}
