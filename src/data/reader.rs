use crate::data::dataset::Dataset;
use crate::errors::DatasetError;
use csv::{ReaderBuilder, Trim};
use std::io;
use std::path::Path;

/// Reads a delimited file into a `Dataset<String, String>`.
///
/// The last column holds the label. Without a header row the features are
/// named `feature_0`, `feature_1`, ... and the label column `label`.
/// Fields are taken verbatim, so `" Cool "` and `"Cool"` are distinct
/// values unless [`trim`](Self::trim) is enabled.
///
/// ```no_run
/// use rusty_id3::data::reader::CsvReader;
///
/// let dataset = CsvReader::default()
///     .delimiter(b';')
///     .read_path("data.csv")
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct CsvReader {
    has_headers: bool,
    delimiter: u8,
    trim: bool,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReader {
    pub fn new() -> Self {
        Self {
            has_headers: true,
            delimiter: b',',
            trim: false,
        }
    }

    /// Whether the first record names the columns. Default is `true`.
    pub fn has_headers(mut self, flag: bool) -> Self {
        self.has_headers = flag;
        self
    }

    /// Field delimiter. Default is `,`.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Strip surrounding whitespace from headers and fields. Default is `false`.
    pub fn trim(mut self, flag: bool) -> Self {
        self.trim = flag;
        self
    }

    pub fn read_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Dataset<String, String>, DatasetError> {
        let reader = self.builder().from_path(path)?;
        self.collect(reader)
    }

    pub fn read<R: io::Read>(&self, source: R) -> Result<Dataset<String, String>, DatasetError> {
        let reader = self.builder().from_reader(source);
        self.collect(reader)
    }

    fn builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(self.has_headers)
            .delimiter(self.delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            // Width is validated by `Dataset::from_records` so the error can
            // name the offending row.
            .flexible(true);
        builder
    }

    fn collect<R: io::Read>(
        &self,
        mut reader: csv::Reader<R>,
    ) -> Result<Dataset<String, String>, DatasetError> {
        let headers = if self.has_headers {
            Some(
                reader
                    .headers()?
                    .iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            )
        } else {
            None
        };

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let headers = match headers {
            Some(headers) => headers,
            None => {
                let width = rows.first().map(Vec::len).ok_or(DatasetError::Empty)?;
                (0..width.saturating_sub(1))
                    .map(|i| format!("feature_{i}"))
                    .chain(std::iter::once("label".to_string()))
                    .collect()
            }
        };

        Dataset::from_records(&headers, &rows)
    }
}
