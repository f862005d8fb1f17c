//! Dataset loading: labeled churn CSV into feature matrices

use std::path::Path;

use ndarray::Array2;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::features::{FEATURE_COUNT, FEATURE_NAMES};
use crate::{AppError, AppResult};

/// Label column name in the input CSV
pub const LABEL_COLUMN: &str = "churn";

/// Customer identifier column name in the input CSV
pub const ID_COLUMN: &str = "customer_id";

/// A fully materialized labeled dataset
#[derive(Debug)]
pub struct ChurnDataset {
    /// Customer IDs, one per row
    pub customer_ids: Vec<String>,
    /// Feature matrix, (n_rows, FEATURE_COUNT), contract column order
    pub features: Array2<f64>,
    /// Binary churn labels, one per row
    pub labels: Vec<u8>,
}

impl ChurnDataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature values of one row in contract order
    pub fn row(&self, index: usize) -> [f64; FEATURE_COUNT] {
        let mut values = [0.0; FEATURE_COUNT];
        for (j, v) in values.iter_mut().enumerate() {
            *v = self.features[[index, j]];
        }
        values
    }
}

/// Load and validate the labeled dataset from a CSV file
pub fn load(path: &Path) -> AppResult<ChurnDataset> {
    if !path.exists() {
        return Err(AppError::Data(format!(
            "dataset not found: {}",
            path.display()
        )));
    }

    let df = LazyCsvReader::new(path).finish()?.collect()?;

    let present = df.get_column_names();
    let missing: Vec<&str> = std::iter::once(ID_COLUMN)
        .chain(FEATURE_NAMES)
        .chain(std::iter::once(LABEL_COLUMN))
        .filter(|col| !present.contains(col))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Data(format!(
            "dataset is missing required columns: {}",
            missing.join(", ")
        )));
    }

    let n_rows = df.height();
    if n_rows == 0 {
        return Err(AppError::Data("dataset contains no rows".into()));
    }

    let customer_ids: Vec<String> = df
        .column(ID_COLUMN)?
        .cast(&DataType::Utf8)?
        .utf8()?
        .into_no_null_iter()
        .map(str::to_string)
        .collect();

    let mut flat = Vec::with_capacity(n_rows * FEATURE_COUNT);
    let mut columns = Vec::with_capacity(FEATURE_COUNT);
    for name in FEATURE_NAMES {
        let series = df.column(name)?.cast(&DataType::Float64)?;
        if series.null_count() > 0 {
            return Err(AppError::Data(format!("column {name} contains null values")));
        }
        columns.push(series.f64()?.into_no_null_iter().collect::<Vec<f64>>());
    }
    for i in 0..n_rows {
        for column in &columns {
            flat.push(column[i]);
        }
    }
    let features = Array2::from_shape_vec((n_rows, FEATURE_COUNT), flat)?;

    let labels: Vec<u8> = df
        .column(LABEL_COLUMN)?
        .cast(&DataType::Int64)?
        .i64()?
        .into_no_null_iter()
        .map(|v| match v {
            0 => Ok(0u8),
            1 => Ok(1u8),
            other => Err(AppError::Data(format!(
                "column {LABEL_COLUMN} must be 0 or 1, found {other}"
            ))),
        })
        .collect::<AppResult<_>>()?;

    if customer_ids.len() != n_rows || labels.len() != n_rows {
        return Err(AppError::Data(
            "dataset columns have inconsistent lengths".into(),
        ));
    }

    Ok(ChurnDataset {
        customer_ids,
        features,
        labels,
    })
}

/// Split row indices into (train, test) sets, stratified per label.
///
/// Each class keeps at least one row on both sides whenever it has two or
/// more rows, so a small dataset still yields a usable evaluation split.
pub fn stratified_split(
    labels: &[u8],
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == class)
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            continue;
        }
        indices.shuffle(&mut rng);

        let n_test = if indices.len() >= 2 {
            ((indices.len() as f64) * test_fraction)
                .round()
                .max(1.0)
                .min((indices.len() - 1) as f64) as usize
        } else {
            0
        };

        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(rows: &[(&str, [f64; FEATURE_COUNT], u8)]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "customer_id,engagement_momentum,behavioral_drift,silence_index,response_degradation,session_decay_rate,consistency_score,churn"
        )
        .unwrap();
        for (id, f, label) in rows {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{}",
                id, f[0], f[1], f[2], f[3], f[4], f[5], label
            )
            .unwrap();
        }
        file
    }

    #[test]
    fn test_load_valid_csv() {
        let file = write_csv(&[
            ("CUST_001", [5.0, 10.0, 2.0, 40.0, 5.0, 80.0], 0),
            ("CUST_002", [-35.0, 55.0, 12.0, 150.0, 40.0, 30.0], 1),
        ]);

        let dataset = load(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.customer_ids, vec!["CUST_001", "CUST_002"]);
        assert_eq!(dataset.labels, vec![0, 1]);
        assert_eq!(dataset.row(1)[0], -35.0);
        assert_eq!(dataset.features[[0, 5]], 80.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/churn.csv")).unwrap_err();
        assert!(err.to_string().contains("dataset not found"));
    }

    #[test]
    fn test_load_missing_columns() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "customer_id,engagement_momentum,churn").unwrap();
        writeln!(file, "CUST_001,5.0,0").unwrap();

        let err = load(file.path()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing required columns"));
        assert!(msg.contains("behavioral_drift"));
        assert!(!msg.contains("engagement_momentum"));
    }

    #[test]
    fn test_stratified_split_keeps_both_classes() {
        let labels: Vec<u8> = (0..50).map(|i| (i % 2) as u8).collect();
        let (train, test) = stratified_split(&labels, 0.2, 42);

        assert_eq!(train.len() + test.len(), 50);
        assert_eq!(test.len(), 10);
        assert!(test.iter().any(|&i| labels[i] == 0));
        assert!(test.iter().any(|&i| labels[i] == 1));

        // deterministic for a fixed seed
        let (train2, test2) = stratified_split(&labels, 0.2, 42);
        assert_eq!(train, train2);
        assert_eq!(test, test2);
    }

    #[test]
    fn test_stratified_split_tiny_class() {
        let labels = vec![0u8, 0, 0, 0, 1];
        let (train, test) = stratified_split(&labels, 0.2, 42);
        // the single positive row must stay in the training set
        assert!(train.contains(&4));
        assert!(!test.contains(&4));
    }
}
