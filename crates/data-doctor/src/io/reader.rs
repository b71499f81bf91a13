use crate::error::{QualityError, Result};
use crate::io::DataFormat;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Source of tabular data for the pipeline.
///
/// Implementations must be shareable across worker threads; every chunk unit
/// calls [`read_range`](DatasetReader::read_range) independently.
pub trait DatasetReader: Send + Sync {
    /// Read the whole dataset.
    fn load(&self, path: &Path) -> Result<DataFrame>;

    /// Read rows `[start, end)`. Ranges past the end yield an empty frame;
    /// `start > end` is an error.
    ///
    /// When `schema` is given, formats that infer types per read must use it
    /// so every range of one file agrees on column types.
    fn read_range(
        &self,
        path: &Path,
        start: usize,
        end: usize,
        schema: Option<&SchemaRef>,
    ) -> Result<DataFrame>;

    /// Column types shared by every range read of `path`, or `None` when
    /// range reads already agree without one.
    fn schema(&self, _path: &Path) -> Result<Option<SchemaRef>> {
        Ok(None)
    }

    /// Number of data rows, header excluded.
    fn count_rows(&self, path: &Path) -> Result<usize>;
}

/// Reads CSV, JSON record arrays and Parquet files from disk.
#[derive(Debug, Clone)]
pub struct FileReader {
    infer_schema_length: Option<usize>,
}

impl Default for FileReader {
    fn default() -> Self {
        Self {
            infer_schema_length: Some(100),
        }
    }
}

impl FileReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn format(path: &Path) -> Result<DataFormat> {
        match DataFormat::from_path(path) {
            Some(format) if format.is_supported() => Ok(format),
            _ => Err(QualityError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn read_failed(path: &Path, err: impl ToString) -> QualityError {
        QualityError::ReadFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }

    fn csv_options(&self) -> CsvReadOptions {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
    }

    fn read_csv(&self, path: &Path, options: CsvReadOptions) -> Result<DataFrame> {
        options
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))
            .and_then(|reader| reader.finish())
            .map_err(|e| Self::read_failed(path, e))
    }

    fn read_whole(&self, path: &Path, format: DataFormat) -> Result<DataFrame> {
        match format {
            DataFormat::Csv => self.read_csv(path, self.csv_options()),
            DataFormat::Json => {
                let file = File::open(path).map_err(|e| Self::read_failed(path, e))?;
                JsonReader::new(file)
                    .finish()
                    .map_err(|e| Self::read_failed(path, e))
            }
            DataFormat::Parquet => {
                let file = File::open(path).map_err(|e| Self::read_failed(path, e))?;
                ParquetReader::new(file)
                    .finish()
                    .map_err(|e| Self::read_failed(path, e))
            }
            DataFormat::Spreadsheet => Err(QualityError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Count newlines without parsing, streaming the file. Returns `None`
    /// when the file contains quote characters, since quoted fields may span
    /// lines.
    fn fast_csv_row_count(path: &Path) -> std::io::Result<Option<usize>> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut newlines = 0usize;
        let mut last_byte = None;

        loop {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            if buf.contains(&b'"') {
                return Ok(None);
            }
            newlines += buf.iter().filter(|b| **b == b'\n').count();
            last_byte = buf.last().copied();
            let consumed = buf.len();
            reader.consume(consumed);
        }

        let lines = match last_byte {
            None => return Ok(Some(0)),
            Some(b'\n') => newlines,
            Some(_) => newlines + 1,
        };
        Ok(Some(lines.saturating_sub(1)))
    }
}

impl DatasetReader for FileReader {
    fn load(&self, path: &Path) -> Result<DataFrame> {
        let format = Self::format(path)?;
        let df = self.read_whole(path, format)?;
        debug!(
            "Loaded {} ({}): {} rows x {} columns",
            path.display(),
            format,
            df.height(),
            df.width()
        );
        Ok(df)
    }

    fn read_range(
        &self,
        path: &Path,
        start: usize,
        end: usize,
        schema: Option<&SchemaRef>,
    ) -> Result<DataFrame> {
        if start > end {
            return Err(QualityError::InvalidRange {
                path: path.to_path_buf(),
                start,
                end,
            });
        }

        match Self::format(path)? {
            DataFormat::Csv => {
                let options = self
                    .csv_options()
                    .with_schema(schema.cloned())
                    .with_skip_rows_after_header(start)
                    .with_n_rows(Some(end - start));
                self.read_csv(path, options)
            }
            format => {
                let df = self.read_whole(path, format)?;
                Ok(df.slice(start as i64, end - start))
            }
        }
    }

    /// CSV ranges would each infer types from their own rows, so a column
    /// that is empty within one range would come back as text. The schema is
    /// inferred once from the head of the file instead.
    fn schema(&self, path: &Path) -> Result<Option<SchemaRef>> {
        if Self::format(path)? != DataFormat::Csv {
            return Ok(None);
        }

        let head = self.read_csv(path, self.csv_options().with_n_rows(self.infer_schema_length))?;
        let schema: Schema = head
            .get_columns()
            .iter()
            .map(|col| Field::new(col.name().clone(), col.dtype().clone()))
            .collect();
        debug!("Inferred schema of {}: {:?}", path.display(), schema);
        Ok(Some(Arc::new(schema)))
    }

    fn count_rows(&self, path: &Path) -> Result<usize> {
        match Self::format(path)? {
            DataFormat::Csv => {
                if let Some(rows) =
                    Self::fast_csv_row_count(path).map_err(|e| Self::read_failed(path, e))?
                {
                    return Ok(rows);
                }
                debug!("Falling back to a full read to count rows of {}", path.display());
                Ok(self.load(path)?.height())
            }
            _ => Ok(self.load(path)?.height()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_count_rows_with_and_without_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let reader = FileReader::new();

        let path = write_file(&dir, "a.csv", "id,v\n1,a\n2,b\n3,c\n");
        assert_eq!(reader.count_rows(&path).unwrap(), 3);

        let path = write_file(&dir, "b.csv", "id,v\n1,a\n2,b");
        assert_eq!(reader.count_rows(&path).unwrap(), 2);
    }

    #[test]
    fn test_count_rows_streams_past_one_buffer() {
        let dir = TempDir::new().unwrap();
        let mut content = String::from("id,label\n");
        for i in 0..3000 {
            content.push_str(&format!("{i},row-{i}\n"));
        }
        let path = write_file(&dir, "big.csv", &content);
        assert_eq!(FileReader::new().count_rows(&path).unwrap(), 3000);

        // A quote after the first buffer still forces the parsed count
        content.push_str("3000,\"quoted\"\n");
        let path = write_file(&dir, "late_quote.csv", &content);
        assert_eq!(FileReader::new().count_rows(&path).unwrap(), 3001);
    }

    #[test]
    fn test_count_rows_of_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.csv", "");
        assert_eq!(FileReader::fast_csv_row_count(&path).unwrap(), Some(0));
    }

    #[test]
    fn test_count_rows_falls_back_for_quoted_newlines() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "q.csv", "id,note\n1,\"two\nlines\"\n2,plain\n");
        assert_eq!(FileReader::new().count_rows(&path).unwrap(), 2);
    }

    #[test]
    fn test_read_range_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "r.csv", "id,v\n0,a\n1,b\n2,c\n3,d\n4,e\n");
        let reader = FileReader::new();

        let df = reader.read_range(&path, 1, 3, None).unwrap();
        assert_eq!(df.height(), 2);
        let ids: Vec<Option<i64>> = df
            .column("id")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_csv_ranges_share_file_schema() {
        let dir = TempDir::new().unwrap();
        let mut content = String::from("id,age\n");
        for i in 0..20 {
            if i < 10 {
                content.push_str(&format!("{i},{}\n", 30 + i));
            } else {
                content.push_str(&format!("{i},\n"));
            }
        }
        let path = write_file(&dir, "ages.csv", &content);
        let reader = FileReader::new();

        let schema = reader.schema(&path).unwrap().unwrap();
        assert_eq!(schema.get("age"), Some(&DataType::Int64));

        let tail = reader.read_range(&path, 10, 20, Some(&schema)).unwrap();
        assert_eq!(tail.height(), 10);
        assert_eq!(tail.column("age").unwrap().dtype(), &DataType::Int64);
        assert_eq!(tail.column("age").unwrap().null_count(), 10);
    }

    #[test]
    fn test_schema_only_for_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "s.json", r#"[{"id": 0}]"#);
        assert!(FileReader::new().schema(&path).unwrap().is_none());
    }

    #[test]
    fn test_read_range_json_slices() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "r.json",
            r#"[{"id": 0}, {"id": 1}, {"id": 2}, {"id": 3}]"#,
        );
        let reader = FileReader::new();

        assert_eq!(reader.read_range(&path, 2, 4, None).unwrap().height(), 2);
        assert_eq!(reader.read_range(&path, 10, 20, None).unwrap().height(), 0);
        assert_eq!(reader.count_rows(&path).unwrap(), 4);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let reader = FileReader::new();
        let err = reader.read_range(Path::new("x.csv"), 5, 2, None).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_RANGE");
    }

    #[test]
    fn test_unsupported_formats() {
        let reader = FileReader::new();
        let err = reader.load(Path::new("book.xlsx")).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
        assert!(err.to_string().contains("book.xlsx"));

        let err = reader.count_rows(Path::new("notes.txt")).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = FileReader::new()
            .load(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert_eq!(err.error_code(), "READ_FAILED");
        assert!(err.to_string().contains("here.csv"));
    }
}
