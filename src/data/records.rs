use log::{info, warn};
use std::path::PathBuf;

use super::DataRow;
use crate::runner::outcome::Classification;

/// Reads credential rows from a CSV file: `email,password,expected`, header skipped
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// All usable rows in file order.
    ///
    /// A missing or unreadable file yields no rows rather than an error; so does a file
    /// with only a header.
    pub fn rows(&self) -> Vec<DataRow> {
        let mut reader = match ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(::csv::Trim::All)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(e) => {
                warn!("Cannot open data file {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let line = index + 2;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping malformed line {} of {}: {}", line, self.path.display(), e);
                    continue;
                }
            };

            match (record.get(0), record.get(1), record.get(2)) {
                (Some(email), Some(password), Some(expected)) => rows.push(DataRow {
                    email: email.to_string(),
                    password: password.to_string(),
                    expected: Classification::from_cell(expected),
                }),
                _ => warn!(
                    "Skipping line {} of {}: expected 3 columns, found {}",
                    line,
                    self.path.display(),
                    record.len()
                ),
            }
        }

        info!("Loaded {} rows from {}", rows.len(), self.path.display());
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_rows_in_order_skipping_header() {
        let file = write_csv(
            "username,password,res\n\
             a@shop.test,pass1,Valid\n\
             b@shop.test,pass2,Invalid\n",
        );
        let rows = CsvRecordSource::new(file.path()).rows();
        assert_eq!(
            rows,
            vec![
                DataRow {
                    email: "a@shop.test".into(),
                    password: "pass1".into(),
                    expected: Classification::Valid,
                },
                DataRow {
                    email: "b@shop.test".into(),
                    password: "pass2".into(),
                    expected: Classification::Invalid,
                },
            ]
        );
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let file = write_csv("username,password,res\n");
        assert!(CsvRecordSource::new(file.path()).rows().is_empty());
    }

    #[test]
    fn test_missing_file_yields_no_rows() {
        assert!(CsvRecordSource::new("/nonexistent/LoginData.csv")
            .rows()
            .is_empty());
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let file = write_csv(
            "username,password,res\n\
             only-email@shop.test\n\
             c@shop.test,pass3,valid\n",
        );
        let rows = CsvRecordSource::new(file.path()).rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "c@shop.test");
    }
}
