use crate::types::Issue;

/// Collapse a list of issues into a quality score in [0, 1].
///
/// Each issue contributes its severity weight, scaled by the share of rows it
/// affects when it lists any. The summed penalty is divided by the number of
/// issues, capped at 1, and subtracted from 1.
pub fn calculate_quality_score(issues: &[Issue], total_rows: usize) -> f64 {
    if issues.is_empty() || total_rows == 0 {
        return 1.0;
    }

    let total_penalty: f64 = issues
        .iter()
        .map(|issue| {
            let weight = issue.severity.weight();
            if issue.affected_rows.is_empty() {
                weight
            } else {
                weight * (issue.affected_rows.len() as f64 / total_rows as f64)
            }
        })
        .sum();

    let normalized = (total_penalty / issues.len() as f64).min(1.0);
    (1.0 - normalized).max(0.0)
}
