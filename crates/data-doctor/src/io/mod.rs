//! Dataset loading.
//!
//! [`DatasetReader`] is the seam between the pipeline and storage. The chunk
//! orchestrator only ever asks for a row count and for half-open row ranges,
//! so alternative sources can be plugged in without touching the pipeline.

mod reader;

pub use reader::{DatasetReader, FileReader};

use std::fmt;
use std::path::Path;

/// File formats recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
    Parquet,
    /// `.xlsx` / `.xls`; recognized so the error can say so, but not readable.
    Spreadsheet,
}

impl DataFormat {
    /// Classify `path` by its (case-insensitive) extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "parquet" => Some(Self::Parquet),
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Spreadsheet)
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Parquet => "parquet",
            Self::Spreadsheet => "spreadsheet",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(DataFormat::from_path(Path::new("a/b.csv")), Some(DataFormat::Csv));
        assert_eq!(DataFormat::from_path(Path::new("B.JSON")), Some(DataFormat::Json));
        assert_eq!(
            DataFormat::from_path(Path::new("x.parquet")),
            Some(DataFormat::Parquet)
        );
        assert_eq!(
            DataFormat::from_path(Path::new("sheet.xlsx")),
            Some(DataFormat::Spreadsheet)
        );
        assert_eq!(DataFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(DataFormat::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_spreadsheet_is_not_supported() {
        assert!(!DataFormat::Spreadsheet.is_supported());
        assert!(DataFormat::Csv.is_supported());
    }
}
