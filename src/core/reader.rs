use crate::domain::model::{HeaderList, Record};
use crate::utils::error::{ImportError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Single pass over a delimited file.
///
/// The first row becomes the [`HeaderList`]; every following row is yielded
/// as a [`Record`] until `max_rows` data rows have been produced or a row
/// starts with an empty field.
pub struct RowReader<R: Read> {
    headers: HeaderList,
    records: csv::StringRecordsIntoIter<R>,
    max_rows: Option<usize>,
    yielded: usize,
    next_row: usize,
    finished: bool,
}

impl RowReader<File> {
    pub fn open<P: AsRef<Path>>(path: P, delimiter: u8, max_rows: Option<usize>) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|source| ImportError::FileOpen {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_reader(file, delimiter, max_rows)
    }
}

impl<R: Read> RowReader<R> {
    pub fn from_reader(reader: R, delimiter: u8, max_rows: Option<usize>) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(b'"')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = HeaderList::new(csv_reader.headers()?.iter().map(str::to_string).collect());
        tracing::debug!("Header columns: {:?}", headers.names());

        Ok(Self {
            headers,
            records: csv_reader.into_records(),
            max_rows,
            yielded: 0,
            // 標題列為第 1 列
            next_row: 2,
            finished: false,
        })
    }

    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.max_rows.is_some_and(|max| self.yielded >= max) {
            tracing::debug!("Reached max rows ({})", self.yielded);
            self.finished = true;
            return None;
        }

        let raw = match self.records.next()? {
            Ok(raw) => raw,
            Err(e) => {
                self.finished = true;
                return Some(Err(e.into()));
            }
        };
        let row = self.next_row;
        self.next_row += 1;

        if raw.get(0).map_or(true, str::is_empty) {
            tracing::debug!("Row {} has an empty first field, stopping", row);
            self.finished = true;
            return None;
        }

        self.yielded += 1;

        if raw.len() < self.headers.len() {
            return Some(Err(ImportError::FormatError {
                row,
                expected: self.headers.len(),
                found: raw.len(),
            }));
        }
        if raw.len() > self.headers.len() {
            tracing::debug!(
                "Row {} has {} extra field(s), ignoring them",
                row,
                raw.len() - self.headers.len()
            );
        }

        Some(Ok(Record {
            row,
            fields: raw.iter().take(self.headers.len()).map(str::to_string).collect(),
        }))
    }
}
