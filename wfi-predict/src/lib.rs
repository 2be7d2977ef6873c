//! # wfi-predict
//!
//! Classical-ML prediction services for Workforce Intelligence:
//!
//! - [`AttritionPredictor`] — attrition probability and risk band
//! - [`SkillDemandForecaster`] — monthly skill-demand time series
//! - [`MobilityAnalyzer`] — career-path recommendations over skill-graph
//!   embeddings
//!
//! Model artifacts are JSON files loaded read-only at process start and
//! shared behind `Arc`; every service is a pure function of its inputs and
//! the artifact. Each service also ships a [`wfi_core::Tool`] wrapper so
//! the chat agent can call it.

pub mod artifact;
pub mod attrition;
pub mod error;
pub mod forecast;
pub mod mobility;
pub mod tool;

pub use artifact::{AttritionArtifact, DemandPoint, ForecastArtifact, MobilityArtifact, RosterEntry};
pub use attrition::{AttritionPrediction, AttritionPredictor, RiskLevel};
pub use error::{PredictError, Result};
pub use forecast::{ForecastPoint, SkillDemandForecaster, TrendingSkill};
pub use mobility::{CareerPath, MobilityAnalyzer, SimilarEmployee};
pub use tool::{AttritionTool, ForecastTool, MobilityTool};
