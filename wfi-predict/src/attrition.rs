//! Employee attrition risk prediction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::artifact::AttritionArtifact;
use crate::error::{PredictError, Result};

/// Risk bands derived from the attrition probability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    /// Probability below 0.4.
    Low,
    /// Probability in [0.4, 0.7).
    Medium,
    /// Probability of 0.7 or above.
    High,
}

impl RiskLevel {
    fn from_probability(p: f64) -> Self {
        if p >= 0.7 {
            RiskLevel::High
        } else if p >= 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// A structured attrition prediction for one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttritionPrediction {
    /// Probability the employee leaves.
    pub probability: f64,
    /// Whether the probability crosses the decision threshold (0.5).
    pub will_leave: bool,
    /// Banded risk level.
    pub risk_level: RiskLevel,
    /// Suggested retention actions for the given risk level.
    pub recommendations: Vec<String>,
}

/// Predicts attrition risk with a standardized logistic-regression model.
///
/// Pure function of its inputs and the loaded artifact; safe to share
/// read-only across concurrent requests.
pub struct AttritionPredictor {
    artifact: AttritionArtifact,
}

impl AttritionPredictor {
    /// Create a predictor over a loaded artifact.
    pub fn new(artifact: AttritionArtifact) -> Result<Self> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    /// The feature keys `predict` requires.
    pub fn feature_names(&self) -> &[String] {
        &self.artifact.feature_names
    }

    /// Predict attrition risk from a feature mapping.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::Validation`] if any required feature is
    /// missing or not numeric; the message lists every offender.
    pub fn predict(&self, features: &Map<String, Value>) -> Result<AttritionPrediction> {
        let values = self.extract_features(features)?;

        let mut z = self.artifact.intercept;
        for (i, &x) in values.iter().enumerate() {
            let scaled = (x - self.artifact.means[i]) / self.artifact.stds[i];
            z += self.artifact.coefficients[i] * scaled;
        }
        let probability = 1.0 / (1.0 + (-z).exp());
        let will_leave = probability >= 0.5;
        let risk_level = RiskLevel::from_probability(probability);

        debug!(probability, ?risk_level, "attrition prediction computed");

        Ok(AttritionPrediction {
            probability,
            will_leave,
            risk_level,
            recommendations: self.recommendations(features, risk_level),
        })
    }

    fn extract_features(&self, features: &Map<String, Value>) -> Result<Vec<f64>> {
        let mut values = Vec::with_capacity(self.artifact.feature_names.len());
        let mut problems = Vec::new();

        for name in &self.artifact.feature_names {
            match features.get(name) {
                Some(v) => match v.as_f64() {
                    Some(x) => values.push(x),
                    None => problems.push(format!("'{name}' is not numeric")),
                },
                None => problems.push(format!("'{name}' is missing")),
            }
        }

        if !problems.is_empty() {
            return Err(PredictError::Validation(format!(
                "invalid attrition features: {}",
                problems.join(", ")
            )));
        }
        Ok(values)
    }

    fn recommendations(&self, features: &Map<String, Value>, risk: RiskLevel) -> Vec<String> {
        let get = |key: &str| features.get(key).and_then(Value::as_f64);
        let mut out = Vec::new();

        match risk {
            RiskLevel::High => {
                if get("satisfaction_level").is_some_and(|s| s < 0.5) {
                    out.push("Critical: schedule a 1-on-1 meeting".to_string());
                    out.push("Consider a role adjustment".to_string());
                }
                if get("last_promotion_years").is_some_and(|y| y > 3.0) {
                    out.push("Evaluate for promotion or raise".to_string());
                }
                if get("training_hours").is_some_and(|h| h < 20.0) {
                    out.push("Provide development opportunities".to_string());
                }
            }
            RiskLevel::Medium => {
                out.push("Monitor engagement levels".to_string());
                out.push("Schedule regular check-ins".to_string());
            }
            RiskLevel::Low => {
                out.push("Employee appears engaged".to_string());
            }
        }
        out
    }
}
