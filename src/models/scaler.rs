//! Fitted standard scaler loaded from its JSON statistics

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Per-feature mean/scale standardization fitted at training time.
///
/// The statistics are read-only once loaded; no re-fitting happens here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Column means
    #[serde(alias = "mean_")]
    pub mean: Vec<f64>,

    /// Column standard deviations
    #[serde(alias = "scale_")]
    pub scale: Vec<f64>,

    /// Column names seen during fitting, if recorded
    #[serde(default, alias = "feature_names_in_")]
    pub feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    /// Build a scaler from known statistics
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let scaler = Self {
            mean,
            scale,
            feature_names: None,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Load and validate a scaler artifact
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler from {:?}", path))?;
        let scaler: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse scaler from {:?}", path))?;
        scaler.validate()?;

        info!(
            path = %path.display(),
            features = scaler.feature_count(),
            names = ?scaler.feature_names,
            "Scaler statistics parsed"
        );

        Ok(scaler)
    }

    fn validate(&self) -> Result<()> {
        if self.mean.is_empty() {
            anyhow::bail!("scaler has no features");
        }
        if self.mean.len() != self.scale.len() {
            anyhow::bail!(
                "scaler mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            );
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.mean.len() {
                anyhow::bail!(
                    "scaler lists {} feature names for {} features",
                    names.len(),
                    self.mean.len()
                );
            }
        }
        if self
            .mean
            .iter()
            .chain(self.scale.iter())
            .any(|v| !v.is_finite())
        {
            anyhow::bail!("scaler statistics contain non-finite values");
        }
        Ok(())
    }

    /// Ensure the recorded column names, if any, match the extraction order.
    ///
    /// Scalers saved without names are trusted to follow that order.
    pub fn check_feature_order(&self, expected: &[&str]) -> Result<()> {
        let Some(names) = &self.feature_names else {
            return Ok(());
        };

        if names.len() != expected.len() || names.iter().zip(expected).any(|(n, e)| n != e) {
            anyhow::bail!(
                "scaler was fitted on columns {:?}, expected {:?}",
                names,
                expected
            );
        }
        Ok(())
    }

    /// Number of features the scaler was fitted on
    pub fn feature_count(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one row: `(x - mean) / scale`.
    ///
    /// A zero scale marks a constant column and leaves it centered but unscaled.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.feature_count() {
            anyhow::bail!(
                "scaler expects {} features, got {}",
                self.feature_count(),
                row.len()
            );
        }

        let scaled: Vec<f64> = row
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&mean, &scale))| {
                let scale = if scale == 0.0 { 1.0 } else { scale };
                (x - mean) / scale
            })
            .collect();

        if scaled.iter().any(|v| !v.is_finite()) {
            anyhow::bail!("scaled features are not finite: {:?}", scaled);
        }

        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_standardizes() {
        let scaler = StandardScaler::new(vec![37.5, 70000.0], vec![10.0, 20000.0]).unwrap();
        let scaled = scaler.transform(&[47.5, 50000.0]).unwrap();
        assert_eq!(scaled, vec![1.0, -1.0]);
    }

    #[test]
    fn test_zero_scale_is_unit() {
        let scaler = StandardScaler::new(vec![5.0, 0.0], vec![0.0, 2.0]).unwrap();
        assert_eq!(scaler.transform(&[7.0, 4.0]).unwrap(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let scaler = StandardScaler::new(vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]).unwrap();
        let err = scaler.transform(&[30.0, 50000.0]).unwrap_err();
        assert!(err.to_string().contains("expects 3 features, got 2"));
    }

    #[test]
    fn test_invalid_statistics_rejected() {
        assert!(StandardScaler::new(vec![], vec![]).is_err());
        assert!(StandardScaler::new(vec![1.0, 2.0], vec![1.0]).is_err());
        assert!(StandardScaler::new(vec![f64::NAN, 2.0], vec![1.0, 1.0]).is_err());
    }

    #[test]
    fn test_load_accepts_fitted_attribute_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(
            &path,
            r#"{"mean_": [37.65, 69742.5], "scale_": [10.47, 34054.3],
                "feature_names_in_": ["Age", "EstimatedSalary"]}"#,
        )
        .unwrap();

        let scaler = StandardScaler::load(&path).unwrap();
        assert_eq!(scaler.feature_count(), 2);
        assert_eq!(
            scaler.feature_names.as_deref(),
            Some(&["Age".to_string(), "EstimatedSalary".to_string()][..])
        );
    }

    #[test]
    fn test_feature_order_must_match() {
        let mut scaler = StandardScaler::new(vec![69742.5, 37.65], vec![34054.3, 10.47]).unwrap();
        assert!(scaler.check_feature_order(&["Age", "EstimatedSalary"]).is_ok());

        scaler.feature_names = Some(vec!["EstimatedSalary".to_string(), "Age".to_string()]);
        let err = scaler
            .check_feature_order(&["Age", "EstimatedSalary"])
            .unwrap_err();
        assert!(err.to_string().contains("EstimatedSalary"));

        scaler.feature_names = Some(vec!["Age".to_string(), "EstimatedSalary".to_string()]);
        assert!(scaler.check_feature_order(&["Age", "EstimatedSalary"]).is_ok());
    }

    #[test]
    fn test_load_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(&path, b"\x80\x04\x95 not json").unwrap();

        assert!(StandardScaler::load(&path).is_err());
    }
}
