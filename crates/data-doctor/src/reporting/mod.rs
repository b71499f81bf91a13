//! Report generation module.
//!
//! Before/after comparisons of a fix pass, the serializable fix report the
//! CLI prints, and CSV output of repaired datasets.

mod comparison;

pub use comparison::generate_comparison;

use crate::error::{Result, ResultExt};
use crate::types::{DataComparison, DataFix};
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// Outcome of a whole-dataset fix pass.
#[derive(Debug, Clone, Serialize)]
pub struct FixReport {
    pub fixes_applied: Vec<DataFix>,
    pub comparison: DataComparison,
}

/// Write `df` as a comma-separated file with a header row, creating parent
/// directories as needed.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Writing {}", path.display()))?;

    info!("Dataset saved: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_csv_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("fixed.csv");
        let mut df = df![
            "id" => [1, 2],
            "name" => ["a", "b, c"],
        ]
        .unwrap();

        write_csv(&mut df, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "id,name\n1,a\n2,\"b, c\"\n");
    }
}
