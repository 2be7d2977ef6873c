//! Skill-demand forecasting.
//!
//! Iterative one-step-ahead prediction over a linear model of calendar and
//! lag features. Each forecasted month is appended to the working history
//! so later months see it as a lag value.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::artifact::{DemandPoint, ForecastArtifact};
use crate::error::{PredictError, Result};

/// Number of engineered features the model expects:
/// year, month, quarter, days since series start,
/// lag-1, lag-3, lag-6, lag-12, 3-month rolling mean, 3-month rolling std.
pub const FEATURE_COUNT: usize = 10;

/// Longest supported forecast horizon in months.
pub const MAX_MONTHS_AHEAD: u32 = 24;

/// One forecasted month of demand for a skill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    /// Forecasted date.
    pub date: NaiveDate,
    /// Forecasted open positions, non-negative.
    pub demand: u64,
    /// Qualitative confidence label.
    pub confidence: String,
}

/// A skill with its recent demand growth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingSkill {
    /// Skill name.
    pub skill_name: String,
    /// Percent growth of the last 3 months over the previous 3.
    pub growth_rate: f64,
    /// Mean demand over the last 3 months.
    pub current_demand: u64,
    /// `Rising`, `Stable`, or `Declining`.
    pub trend: String,
}

/// Forecasts skill demand with a linear lag-feature model.
pub struct SkillDemandForecaster {
    artifact: ForecastArtifact,
}

impl SkillDemandForecaster {
    /// Create a forecaster over a loaded artifact.
    pub fn new(artifact: ForecastArtifact) -> Result<Self> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    /// Skills with recorded history.
    pub fn known_skills(&self) -> impl Iterator<Item = &str> {
        self.artifact.history.keys().map(String::as_str)
    }

    /// Forecast demand for a skill over the next `months_ahead` months.
    ///
    /// Returns an empty series for a skill with no recorded history.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::Validation`] if `months_ahead` is zero or
    /// exceeds [`MAX_MONTHS_AHEAD`].
    pub fn forecast(&self, skill_name: &str, months_ahead: u32) -> Result<Vec<ForecastPoint>> {
        if months_ahead == 0 || months_ahead > MAX_MONTHS_AHEAD {
            return Err(PredictError::Validation(format!(
                "months_ahead must be between 1 and {MAX_MONTHS_AHEAD}, got {months_ahead}"
            )));
        }

        let Some(series) = self.artifact.history.get(skill_name) else {
            warn!(skill = skill_name, "no demand history for skill");
            return Ok(Vec::new());
        };
        if series.is_empty() {
            return Ok(Vec::new());
        }

        let start_date = series[0].date;
        let last_date = series[series.len() - 1].date;
        let mut history: Vec<DemandPoint> = series.clone();
        let mut forecasts = Vec::with_capacity(months_ahead as usize);

        for i in 1..=i64::from(months_ahead) {
            let forecast_date = last_date + Duration::days(30 * i);
            let features = self.features(&history, start_date, forecast_date);

            let mut demand = self.artifact.intercept;
            for (coef, x) in self.artifact.coefficients.iter().zip(&features) {
                demand += coef * x;
            }
            let demand = demand.max(0.0).round();

            debug!(skill = skill_name, %forecast_date, demand, "forecast step");

            forecasts.push(ForecastPoint {
                date: forecast_date,
                demand: demand as u64,
                confidence: "Medium".to_string(),
            });
            history.push(DemandPoint { date: forecast_date, demand });
        }

        Ok(forecasts)
    }

    fn features(
        &self,
        history: &[DemandPoint],
        start_date: NaiveDate,
        forecast_date: NaiveDate,
    ) -> [f64; FEATURE_COUNT] {
        let lag = |n: usize| {
            history
                .len()
                .checked_sub(n)
                .map(|i| history[i].demand)
                .unwrap_or_else(|| history[history.len() - 1].demand)
        };

        let tail: Vec<f64> = history.iter().rev().take(3).map(|p| p.demand).collect();
        let mean = tail.iter().sum::<f64>() / tail.len() as f64;
        let std = if tail.len() > 1 {
            let var =
                tail.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (tail.len() - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        let month = forecast_date.month();
        [
            f64::from(forecast_date.year()),
            f64::from(month),
            f64::from((month - 1) / 3 + 1),
            (forecast_date - start_date).num_days() as f64,
            lag(1),
            lag(3),
            lag(6),
            lag(12),
            mean,
            std,
        ]
    }

    /// Rank skills by demand growth: last 3 months against the previous 3.
    ///
    /// Skills with fewer than 12 observations are skipped. Growth above 5%
    /// is `Rising`, below -5% is `Declining`, otherwise `Stable`.
    pub fn trending_skills(&self, top_n: usize) -> Vec<TrendingSkill> {
        let mut trends: Vec<TrendingSkill> = self
            .artifact
            .history
            .iter()
            .filter(|(_, series)| series.len() >= 12)
            .map(|(skill, series)| {
                let n = series.len();
                let mean = |points: &[DemandPoint]| {
                    points.iter().map(|p| p.demand).sum::<f64>() / points.len() as f64
                };
                let recent = mean(&series[n - 3..]);
                let previous = mean(&series[n - 6..n - 3]);
                let growth_rate =
                    if previous > 0.0 { (recent - previous) / previous * 100.0 } else { 0.0 };

                let trend = if growth_rate > 5.0 {
                    "Rising"
                } else if growth_rate > -5.0 {
                    "Stable"
                } else {
                    "Declining"
                };

                TrendingSkill {
                    skill_name: skill.clone(),
                    growth_rate,
                    current_demand: recent.round() as u64,
                    trend: trend.to_string(),
                }
            })
            .collect();

        trends.sort_by(|a, b| {
            b.growth_rate.partial_cmp(&a.growth_rate).unwrap_or(std::cmp::Ordering::Equal)
        });
        trends.truncate(top_n);
        trends
    }
}
