//! Prediction services as agent tools.
//!
//! Each tool wraps one prediction service behind the [`wfi_core::Tool`]
//! interface with a fixed input schema. The agent dispatcher holds these in
//! a closed map; there is no open-ended dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;
use wfi_core::{CoreError, Tool};

use crate::attrition::AttritionPredictor;
use crate::forecast::SkillDemandForecaster;
use crate::mobility::MobilityAnalyzer;

fn require_str<'a>(args: &'a Value, key: &str) -> wfi_core::Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| CoreError::Validation(format!("missing required '{key}' parameter")))
}

/// Predicts attrition risk from an employee feature mapping.
pub struct AttritionTool {
    predictor: Arc<AttritionPredictor>,
}

impl AttritionTool {
    /// Create a new `AttritionTool`.
    pub fn new(predictor: Arc<AttritionPredictor>) -> Self {
        Self { predictor }
    }
}

#[async_trait]
impl Tool for AttritionTool {
    fn name(&self) -> &str {
        "predict_attrition"
    }

    fn description(&self) -> &str {
        "Predict an employee's attrition risk from their feature values \
         (age, tenure, income, performance, satisfaction, promotion gap, training hours)"
    }

    fn parameters_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .predictor
            .feature_names()
            .iter()
            .map(|name| (name.clone(), json!({ "type": "number" })))
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": self.predictor.feature_names(),
        })
    }

    async fn execute(&self, args: Value) -> wfi_core::Result<Value> {
        let features = args
            .as_object()
            .ok_or_else(|| CoreError::Validation("arguments must be an object".into()))?;

        info!("predict_attrition tool called");
        let prediction = self.predictor.predict(features).map_err(CoreError::from)?;

        serde_json::to_value(&prediction).map_err(|e| CoreError::Tool {
            tool: "predict_attrition".into(),
            message: format!("failed to serialize prediction: {e}"),
        })
    }
}

/// Forecasts demand for a named skill.
pub struct ForecastTool {
    forecaster: Arc<SkillDemandForecaster>,
}

impl ForecastTool {
    /// Create a new `ForecastTool`.
    pub fn new(forecaster: Arc<SkillDemandForecaster>) -> Self {
        Self { forecaster }
    }
}

#[async_trait]
impl Tool for ForecastTool {
    fn name(&self) -> &str {
        "forecast_skill_demand"
    }

    fn description(&self) -> &str {
        "Forecast hiring demand for a skill over the coming months"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "skill_name": {
                    "type": "string",
                    "description": "The skill to forecast, e.g. 'Python'"
                },
                "months_ahead": {
                    "type": "integer",
                    "description": "Forecast horizon in months (1-24, default 6)"
                }
            },
            "required": ["skill_name"]
        })
    }

    async fn execute(&self, args: Value) -> wfi_core::Result<Value> {
        let skill_name = require_str(&args, "skill_name")?;
        let months_ahead = match args.get("months_ahead") {
            None | Some(Value::Null) => 6,
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    CoreError::Validation(format!("'months_ahead' must be a positive integer, got {v}"))
                })?,
        };

        info!(skill_name, months_ahead, "forecast_skill_demand tool called");
        let points = self.forecaster.forecast(skill_name, months_ahead).map_err(CoreError::from)?;

        if points.is_empty() {
            return Ok(json!({
                "skill_name": skill_name,
                "forecasts": [],
                "note": format!("no demand history recorded for '{skill_name}'"),
            }));
        }
        Ok(json!({ "skill_name": skill_name, "forecasts": points }))
    }
}

/// Recommends career paths for an employee.
pub struct MobilityTool {
    analyzer: Arc<MobilityAnalyzer>,
}

impl MobilityTool {
    /// Create a new `MobilityTool`.
    pub fn new(analyzer: Arc<MobilityAnalyzer>) -> Self {
        Self { analyzer }
    }
}

#[async_trait]
impl Tool for MobilityTool {
    fn name(&self) -> &str {
        "recommend_career_paths"
    }

    fn description(&self) -> &str {
        "Recommend career paths for an employee based on skill similarity to colleagues"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "employee_id": {
                    "type": "string",
                    "description": "Employee id, e.g. 'EMP1001'"
                },
                "target_role": {
                    "type": "string",
                    "description": "Optional role to filter recommendations by"
                }
            },
            "required": ["employee_id"]
        })
    }

    async fn execute(&self, args: Value) -> wfi_core::Result<Value> {
        let employee_id = require_str(&args, "employee_id")?;
        let target_role = args.get("target_role").and_then(|v| v.as_str());

        info!(employee_id, ?target_role, "recommend_career_paths tool called");

        let current_skills = self.analyzer.employee_skills(employee_id);
        let paths = self.analyzer.recommend_paths(employee_id, target_role);

        Ok(json!({
            "employee_id": employee_id,
            "current_skills": current_skills,
            "career_paths": paths,
        }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::attrition;
    use crate::forecast;
    use crate::mobility;

    #[tokio::test]
    async fn attrition_tool_rejects_missing_features() {
        let tool = AttritionTool::new(Arc::new(
            AttritionPredictor::new(attrition::tests::artifact()).unwrap(),
        ));
        let err = tool.execute(json!({})).await;
        assert!(matches!(err, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn forecast_tool_reports_unknown_skill_gracefully() {
        let tool = ForecastTool::new(Arc::new(
            SkillDemandForecaster::new(forecast::tests::artifact()).unwrap(),
        ));
        let result = tool.execute(json!({ "skill_name": "Cobol" })).await.unwrap();
        assert!(result["note"].as_str().unwrap().contains("Cobol"));
    }

    #[tokio::test]
    async fn forecast_tool_rejects_non_u32_horizon() {
        let tool = ForecastTool::new(Arc::new(
            SkillDemandForecaster::new(forecast::tests::artifact()).unwrap(),
        ));
        // Values that would truncate or wrap must fail, not silently clamp.
        for bad in [json!(u64::from(u32::MAX) + 3), json!(-2), json!("six")] {
            let err = tool.execute(json!({ "skill_name": "Python", "months_ahead": bad })).await;
            assert!(matches!(err, Err(CoreError::Validation(_))), "accepted {bad}");
        }
    }

    #[tokio::test]
    async fn mobility_tool_returns_ranked_paths() {
        let tool = MobilityTool::new(Arc::new(
            MobilityAnalyzer::new(mobility::tests::artifact()).unwrap(),
        ));
        let result = tool.execute(json!({ "employee_id": "EMP1001" })).await.unwrap();
        assert_eq!(result["career_paths"][0]["target_role"], "Data Engineer");
    }
}
