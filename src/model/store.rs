//! Artifact persistence: the scaler and the forest live on disk as two JSON
//! files and are only ever loaded together

use std::fs;
use std::path::{Path, PathBuf};

use super::{RandomForest, StandardScaler};
use crate::AppResult;

pub const MODEL_FILE: &str = "churn_model.json";
pub const SCALER_FILE: &str = "scaler.json";

/// Locations of the two persisted artifacts
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join(MODEL_FILE),
            scaler: dir.join(SCALER_FILE),
        }
    }
}

/// Persist a fitted pair
pub fn save(paths: &ArtifactPaths, forest: &RandomForest, scaler: &StandardScaler) -> AppResult<()> {
    if let Some(parent) = paths.model.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&paths.model, serde_json::to_vec(forest)?)?;
    fs::write(&paths.scaler, serde_json::to_vec(scaler)?)?;
    tracing::info!(
        "Persisted model artifacts: {} + {}",
        paths.model.display(),
        paths.scaler.display()
    );
    Ok(())
}

/// Load a persisted pair. Returns `None` unless both artifacts exist and
/// parse, so a half-written state never produces a mismatched scaler/model.
pub fn load(paths: &ArtifactPaths) -> Option<(RandomForest, StandardScaler)> {
    let forest_bytes = fs::read(&paths.model).ok()?;
    let scaler_bytes = fs::read(&paths.scaler).ok()?;

    let forest = match serde_json::from_slice(&forest_bytes) {
        Ok(forest) => forest,
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}", paths.model.display(), e);
            return None;
        }
    };
    let scaler = match serde_json::from_slice(&scaler_bytes) {
        Ok(scaler) => scaler,
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}", paths.scaler.display(), e);
            return None;
        }
    };
    Some((forest, scaler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForestConfig;
    use ndarray::Array2;
    use tempfile::TempDir;

    fn fitted_pair() -> (RandomForest, StandardScaler) {
        let mut flat = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let churned = i % 2 == 0;
            let base = if churned { -30.0 } else { 20.0 };
            flat.extend_from_slice(&[base, base + 1.0, 2.0, 3.0, 4.0, base + 5.0]);
            labels.push(u8::from(churned));
        }
        let features = Array2::from_shape_vec((30, 6), flat).unwrap();
        let scaler = StandardScaler::fit(&features);
        let scaled = scaler.transform(&features);
        let config = ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        };
        (
            RandomForest::fit(&scaled, &labels, config).unwrap(),
            scaler,
        )
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let (forest, scaler) = fitted_pair();

        save(&paths, &forest, &scaler).unwrap();
        let (loaded_forest, loaded_scaler) = load(&paths).unwrap();

        let raw = [-30.0, -29.0, 2.0, 3.0, 4.0, -25.0];
        let scaled = scaler.transform_row(&raw);
        let scaled_after = loaded_scaler.transform_row(&raw);
        assert_eq!(scaled, scaled_after);
        assert_eq!(
            forest.predict_proba(&scaled),
            loaded_forest.predict_proba(&scaled_after)
        );
    }

    #[test]
    fn test_load_requires_both_artifacts() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let (forest, scaler) = fitted_pair();

        save(&paths, &forest, &scaler).unwrap();
        std::fs::remove_file(&paths.scaler).unwrap();
        assert!(load(&paths).is_none());
    }

    #[test]
    fn test_load_rejects_corrupt_artifact() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let (forest, scaler) = fitted_pair();

        save(&paths, &forest, &scaler).unwrap();
        std::fs::write(&paths.model, b"not json").unwrap();
        assert!(load(&paths).is_none());
    }
}
