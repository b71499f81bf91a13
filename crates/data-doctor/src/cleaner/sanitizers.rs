//! Data sanitization functions for text columns.

use crate::types::{DataFix, FixType};
use crate::utils::{string_mode, text_values};
use polars::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

/// Text values with their positions, rewritten by `rewrite`. Returns the new
/// column values plus the `(row, old, new)` triples that changed. Nulls pass
/// through untouched.
fn rewrite_text<F>(
    values: Vec<Option<String>>,
    mut rewrite: F,
) -> (Vec<Option<String>>, Vec<(usize, String, String)>)
where
    F: FnMut(&str) -> Option<String>,
{
    let mut changes = Vec::new();
    let rewritten = values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            let old = value?;
            match rewrite(&old) {
                Some(new) if new != old => {
                    changes.push((idx, old, new.clone()));
                    Some(new)
                }
                _ => Some(old),
            }
        })
        .collect();
    (rewritten, changes)
}

fn into_fix(
    fix_type: FixType,
    column: &str,
    description: &str,
    confidence: f64,
    changes: Vec<(usize, String, String)>,
) -> DataFix {
    let mut rows_affected = Vec::with_capacity(changes.len());
    let mut old_values = Vec::with_capacity(changes.len());
    let mut new_values = Vec::with_capacity(changes.len());
    for (row, old, new) in changes {
        rows_affected.push(row);
        old_values.push(json!(old));
        new_values.push(json!(new));
    }

    DataFix {
        fix_type,
        column: column.to_string(),
        description: description.to_string(),
        rows_affected,
        old_values,
        new_values,
        confidence,
        uncertainty_reason: None,
    }
}

/// Trim leading and trailing whitespace from every value of a text column.
pub(crate) fn trim_whitespace(df: &mut DataFrame, column: &str) -> PolarsResult<Option<DataFix>> {
    let series = df.column(column)?.as_materialized_series().clone();
    let (trimmed, changes) =
        rewrite_text(text_values(&series)?, |val| Some(val.trim().to_string()));
    if changes.is_empty() {
        return Ok(None);
    }

    df.replace(column, Series::new(series.name().clone(), trimmed))?;
    debug!("Trimmed whitespace in {} values of '{}'", changes.len(), column);

    Ok(Some(into_fix(
        FixType::StandardizeFormat,
        column,
        "Trimmed leading and trailing whitespace",
        0.9,
        changes,
    )))
}

/// Rewrite every case variant of a value to the group's most frequent
/// spelling. `"paris"`, `"Paris"`, `"Paris"` all become `"Paris"`.
pub(crate) fn standardize_case(df: &mut DataFrame, column: &str) -> PolarsResult<Option<DataFix>> {
    let series = df.column(column)?.as_materialized_series().clone();
    let values = text_values(&series)?;

    let mut groups: HashMap<String, Vec<&str>> = HashMap::new();
    for val in values.iter().flatten() {
        groups.entry(val.to_lowercase()).or_default().push(val);
    }
    let canonical: HashMap<String, String> = groups
        .into_iter()
        .filter_map(|(key, spellings)| string_mode(spellings).map(|best| (key, best)))
        .collect();

    let (standardized, changes) =
        rewrite_text(values, |val| canonical.get(&val.to_lowercase()).cloned());
    if changes.is_empty() {
        return Ok(None);
    }

    df.replace(column, Series::new(series.name().clone(), standardized))?;
    debug!("Standardized case in {} values of '{}'", changes.len(), column);

    Ok(Some(into_fix(
        FixType::StandardizeCase,
        column,
        "Standardized case variants to the most frequent spelling",
        0.75,
        changes,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(df: &DataFrame, column: &str) -> Vec<Option<String>> {
        text_values(df.column(column).unwrap().as_materialized_series()).unwrap()
    }

    #[test]
    fn test_trim_whitespace_records_only_changed_rows() {
        let mut df = df![
            "name" => [Some(" Ann"), Some("Bob"), None, Some("Cy  ")],
        ]
        .unwrap();

        let fix = trim_whitespace(&mut df, "name").unwrap().unwrap();

        assert_eq!(fix.fix_type, FixType::StandardizeFormat);
        assert_eq!(fix.rows_affected, vec![0, 3]);
        assert_eq!(fix.old_values, vec![json!(" Ann"), json!("Cy  ")]);
        assert_eq!(fix.new_values, vec![json!("Ann"), json!("Cy")]);
        assert_eq!(
            strings(&df, "name"),
            vec![
                Some("Ann".to_string()),
                Some("Bob".to_string()),
                None,
                Some("Cy".to_string())
            ]
        );
    }

    #[test]
    fn test_trim_whitespace_noop() {
        let mut df = df!["name" => ["Ann", "Bob"]].unwrap();
        assert!(trim_whitespace(&mut df, "name").unwrap().is_none());
    }

    #[test]
    fn test_standardize_case_uses_most_frequent_spelling() {
        let mut df = df![
            "city" => [Some("Paris"), Some("paris"), Some("Paris"), None, Some("ROME")],
        ]
        .unwrap();

        let fix = standardize_case(&mut df, "city").unwrap().unwrap();

        assert_eq!(fix.fix_type, FixType::StandardizeCase);
        assert_eq!(fix.rows_affected, vec![1]);
        assert_eq!(strings(&df, "city")[1].as_deref(), Some("Paris"));
        assert_eq!(strings(&df, "city")[4].as_deref(), Some("ROME"));
        assert!(standardize_case(&mut df, "city").unwrap().is_none());
    }
}
