//! Serialized model artifacts.
//!
//! Artifacts are JSON files produced by the offline training jobs and
//! loaded read-only at process start. Each service takes its artifact
//! explicitly at construction, so tests can build artifacts inline.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PredictError, Result};

fn load_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        PredictError::Artifact(format!("cannot read {what} artifact at {}: {e}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        PredictError::Artifact(format!("malformed {what} artifact at {}: {e}", path.display()))
    })
}

/// Scaled logistic-regression model for attrition risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttritionArtifact {
    /// Required feature keys, in coefficient order.
    pub feature_names: Vec<String>,
    /// Per-feature means used for standardization.
    pub means: Vec<f64>,
    /// Per-feature standard deviations used for standardization.
    pub stds: Vec<f64>,
    /// Logistic-regression coefficients over the scaled features.
    pub coefficients: Vec<f64>,
    /// Model intercept.
    pub intercept: f64,
}

impl AttritionArtifact {
    /// Load and validate an artifact from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let artifact: Self = load_json(path.as_ref(), "attrition")?;
        artifact.validate()?;
        info!(features = artifact.feature_names.len(), "attrition artifact loaded");
        Ok(artifact)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(PredictError::Artifact("attrition artifact has no features".into()));
        }
        if self.means.len() != n || self.stds.len() != n || self.coefficients.len() != n {
            return Err(PredictError::Artifact(format!(
                "attrition artifact shape mismatch: {n} features, {} means, {} stds, {} coefficients",
                self.means.len(),
                self.stds.len(),
                self.coefficients.len()
            )));
        }
        if self.stds.iter().any(|&s| s <= 0.0) {
            return Err(PredictError::Artifact(
                "attrition artifact has a non-positive standard deviation".into(),
            ));
        }
        Ok(())
    }
}

/// One observed month of demand for a skill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DemandPoint {
    /// Observation date.
    pub date: NaiveDate,
    /// Open positions requiring the skill.
    pub demand: f64,
}

/// Linear lag-feature model plus per-skill demand history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastArtifact {
    /// Coefficients over the engineered features (see `forecast::FEATURE_COUNT`).
    pub coefficients: Vec<f64>,
    /// Model intercept.
    pub intercept: f64,
    /// Monthly demand history per skill, oldest first.
    pub history: HashMap<String, Vec<DemandPoint>>,
}

impl ForecastArtifact {
    /// Load and validate an artifact from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let artifact: Self = load_json(path.as_ref(), "forecast")?;
        artifact.validate()?;
        info!(skills = artifact.history.len(), "forecast artifact loaded");
        Ok(artifact)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.coefficients.len() != crate::forecast::FEATURE_COUNT {
            return Err(PredictError::Artifact(format!(
                "forecast artifact has {} coefficients, expected {}",
                self.coefficients.len(),
                crate::forecast::FEATURE_COUNT
            )));
        }
        for (skill, series) in &self.history {
            if series.windows(2).any(|w| w[0].date > w[1].date) {
                return Err(PredictError::Artifact(format!(
                    "forecast history for '{skill}' is not sorted by date"
                )));
            }
        }
        Ok(())
    }
}

/// Roster facts about one employee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterEntry {
    /// Current job role.
    pub job_role: String,
    /// Department.
    pub department: String,
}

/// Skill-graph node embeddings plus employee/skill adjacency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobilityArtifact {
    /// Embedding per graph node (employee ids and skill names).
    pub embeddings: HashMap<String, Vec<f32>>,
    /// Skills attached to each employee.
    pub employee_skills: HashMap<String, Vec<String>>,
    /// Role and department per employee.
    pub roster: HashMap<String, RosterEntry>,
}

impl MobilityArtifact {
    /// Load and validate an artifact from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let artifact: Self = load_json(path.as_ref(), "mobility")?;
        artifact.validate()?;
        info!(
            employees = artifact.employee_skills.len(),
            nodes = artifact.embeddings.len(),
            "mobility artifact loaded"
        );
        Ok(artifact)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        let dim = match self.embeddings.values().next() {
            Some(first) => first.len(),
            None => return Err(PredictError::Artifact("mobility artifact has no embeddings".into())),
        };
        if self.embeddings.values().any(|e| e.len() != dim) {
            return Err(PredictError::Artifact(
                "mobility embeddings have inconsistent dimensionality".into(),
            ));
        }
        Ok(())
    }
}
