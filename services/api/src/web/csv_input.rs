//! services/api/src/web/csv_input.rs
//!
//! Reads the `text` column out of an uploaded CSV file.

/// Name of the column that holds the texts to analyze.
pub const TEXT_COLUMN: &str = "text";

#[derive(Debug, thiserror::Error)]
pub enum CsvInputError {
    #[error("CSV must have a 'text' column")]
    MissingTextColumn,
    #[error("Could not parse CSV: {0}")]
    Malformed(String),
}

/// Returns the `text` cell of every record, in file order.
///
/// Rows shorter than the header yield an empty text. A leading UTF-8 byte order
/// mark is ignored.
pub fn read_text_column(bytes: &[u8]) -> Result<Vec<String>, CsvInputError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| CsvInputError::Malformed(e.to_string()))?;
    let column = headers
        .iter()
        .position(|h| h.trim() == TEXT_COLUMN)
        .ok_or(CsvInputError::MissingTextColumn)?;

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.get(column).unwrap_or_default().to_string())
                .map_err(|e| CsvInputError::Malformed(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_text_column_in_order() {
        let csv = b"id,text\n1,I love this\n2,\"Meh, it's fine\"\n";
        assert_eq!(
            read_text_column(csv).unwrap(),
            vec!["I love this".to_string(), "Meh, it's fine".to_string()]
        );
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read_text_column(b"id,body\n1,hello\n").unwrap_err();
        assert!(matches!(err, CsvInputError::MissingTextColumn));
        assert_eq!(err.to_string(), "CSV must have a 'text' column");
    }

    #[test]
    fn empty_upload_has_no_text_column() {
        assert!(matches!(
            read_text_column(b""),
            Err(CsvInputError::MissingTextColumn)
        ));
    }

    #[test]
    fn byte_order_mark_and_short_rows_are_tolerated() {
        let csv = b"\xEF\xBB\xBFtext,score\nhello,1\n";
        assert_eq!(read_text_column(csv).unwrap(), vec!["hello".to_string()]);
        let csv = b"id,text\n1\n";
        assert_eq!(read_text_column(csv).unwrap(), vec![String::new()]);
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let csv = b"text\n\xff\xfe\n";
        assert!(matches!(
            read_text_column(csv),
            Err(CsvInputError::Malformed(_))
        ));
    }
}
