//! Fixed-length hourly series: load and per-unit generation traces.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::SeriesError;
use crate::sim::types::HOURS_PER_YEAR;

/// Named hourly series, each exactly [`HOURS_PER_YEAR`] values long.
#[derive(Debug, Clone, Default)]
pub struct HourlySeriesStore {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl HourlySeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a series and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::Length`] for a series of the wrong length and
    /// [`SeriesError::Duplicate`] if the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<usize, SeriesError> {
        let name = name.into();
        if values.len() != HOURS_PER_YEAR {
            return Err(SeriesError::Length {
                name,
                found: values.len(),
                expected: HOURS_PER_YEAR,
            });
        }
        if self.index_of(&name).is_some() {
            return Err(SeriesError::Duplicate(name));
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(self.columns.len() - 1)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Raw values of a series.
    ///
    /// # Panics
    ///
    /// Panics if `index` was not returned by this store.
    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    /// Values of a series with a unit multiplier applied.
    pub fn scaled(&self, index: usize, multiplier: f64) -> Vec<f64> {
        self.columns[index].iter().map(|v| v * multiplier).collect()
    }

    /// Reads one series per CSV column; the header row names them.
    ///
    /// Empty cells read as 0.
    ///
    /// # Errors
    ///
    /// Returns a [`SeriesError`] for malformed CSV, unparsable values,
    /// duplicate column names, or a row count other than [`HOURS_PER_YEAR`].
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, SeriesError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(HOURS_PER_YEAR); headers.len()];

        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            for (col, field) in record.iter().enumerate() {
                let value = if field.is_empty() {
                    0.0
                } else {
                    field.parse::<f64>().map_err(|_| SeriesError::Value {
                        column: headers[col].clone(),
                        row: row + 1,
                        value: field.to_string(),
                    })?
                };
                columns[col].push(value);
            }
        }

        let mut store = Self::new();
        for (name, values) in headers.into_iter().zip(columns) {
            store.insert(name, values)?;
        }
        debug!(series = store.len(), "series loaded");
        Ok(store)
    }

    /// Reads a series CSV from disk.
    ///
    /// # Errors
    ///
    /// See [`HourlySeriesStore::from_csv_reader`]; also [`SeriesError::Io`]
    /// when the file cannot be opened.
    pub fn from_csv_path(path: &Path) -> Result<Self, SeriesError> {
        let file = File::open(path).map_err(|source| SeriesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_reader(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_csv(rows: usize) -> String {
        let mut csv = String::from("Load,Wind\n");
        for h in 0..rows {
            csv.push_str(&format!("{},{}\n", 100 + h % 24, h % 7));
        }
        csv
    }

    #[test]
    fn reads_named_columns() {
        let store = HourlySeriesStore::from_csv_reader(make_csv(HOURS_PER_YEAR).as_bytes()).unwrap();
        assert_eq!(store.len(), 2);
        let load = store.index_of("Load").unwrap();
        assert_eq!(store.column(load)[1], 101.0);
        let wind = store.index_of("Wind").unwrap();
        assert_eq!(store.scaled(wind, 2.0)[3], 6.0);
        assert_eq!(store.names().collect::<Vec<_>>(), ["Load", "Wind"]);
    }

    #[test]
    fn rejects_short_file() {
        let err = HourlySeriesStore::from_csv_reader(make_csv(100).as_bytes()).unwrap_err();
        assert!(matches!(err, SeriesError::Length { found: 100, .. }));
    }

    #[test]
    fn rejects_non_numeric_cell() {
        let mut csv = make_csv(HOURS_PER_YEAR);
        csv.push_str("oops,1\n");
        let err = HourlySeriesStore::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SeriesError::Value { ref column, .. } if column == "Load"));
    }

    #[test]
    fn rejects_duplicate_insert() {
        let mut store = HourlySeriesStore::new();
        store.insert("Load", vec![1.0; HOURS_PER_YEAR]).unwrap();
        assert!(matches!(
            store.insert("Load", vec![1.0; HOURS_PER_YEAR]),
            Err(SeriesError::Duplicate(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = HourlySeriesStore::from_csv_path(Path::new("/nonexistent/series.csv")).unwrap_err();
        assert!(matches!(err, SeriesError::Io { .. }));
    }
}
