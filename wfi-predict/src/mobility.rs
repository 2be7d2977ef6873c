//! Career mobility analysis over skill-graph embeddings.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::artifact::MobilityArtifact;
use crate::error::Result;

/// An employee similar to the query employee in embedding space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarEmployee {
    /// Employee id.
    pub employee_id: String,
    /// Cosine similarity to the query employee.
    pub similarity_score: f32,
}

/// A recommended career move, ranked by skill match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerPath {
    /// Role held by the similar employee.
    pub target_role: String,
    /// Department of that role.
    pub department: String,
    /// Embedding similarity to the employee holding the role.
    pub similarity_score: f32,
    /// Share of the target role's skills the employee already has.
    pub skill_match_percentage: f64,
    /// Skills the employee would need to acquire.
    pub missing_skills: Vec<String>,
    /// Skills the employee already shares with the role.
    pub matched_skills: Vec<String>,
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Analyzes career mobility from pre-trained skill-graph embeddings.
///
/// Pure function of its inputs and the loaded artifact; safe to share
/// read-only across concurrent requests.
pub struct MobilityAnalyzer {
    artifact: MobilityArtifact,
}

impl MobilityAnalyzer {
    /// Create an analyzer over a loaded artifact.
    pub fn new(artifact: MobilityArtifact) -> Result<Self> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    /// Skills attached to an employee. Unknown employees have none.
    pub fn employee_skills(&self, employee_id: &str) -> Vec<String> {
        self.artifact.employee_skills.get(employee_id).cloned().unwrap_or_default()
    }

    /// The `top_k` employees closest to `employee_id` in embedding space.
    ///
    /// Returns an empty list for an employee with no embedding.
    pub fn similar_employees(&self, employee_id: &str, top_k: usize) -> Vec<SimilarEmployee> {
        let Some(target) = self.artifact.embeddings.get(employee_id) else {
            warn!(employee_id, "employee not found in embeddings");
            return Vec::new();
        };

        let mut similarities: Vec<SimilarEmployee> = self
            .artifact
            .embeddings
            .iter()
            .filter(|(node, _)| node.starts_with("EMP") && node.as_str() != employee_id)
            .map(|(node, embedding)| SimilarEmployee {
                employee_id: node.clone(),
                similarity_score: cosine(target, embedding),
            })
            .collect();

        similarities.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        similarities.truncate(top_k);
        similarities
    }

    /// Recommend career paths based on the roles of similar employees.
    ///
    /// Candidates are deduplicated by (role, department), keeping the most
    /// similar holder, then ranked by skill match percentage (descending)
    /// with missing-skill count as the tie breaker. At most five paths are
    /// returned. Unknown employees get an empty list.
    pub fn recommend_paths(&self, employee_id: &str, target_role: Option<&str>) -> Vec<CareerPath> {
        let similar = self.similar_employees(employee_id, 10);
        let current_skills = self.employee_skills(employee_id);

        let mut best: Vec<CareerPath> = Vec::new();

        for candidate in similar {
            let Some(entry) = self.artifact.roster.get(&candidate.employee_id) else {
                continue;
            };
            if target_role.is_some_and(|role| role != entry.job_role) {
                continue;
            }

            let candidate_skills = self.employee_skills(&candidate.employee_id);
            let matched: Vec<String> = candidate_skills
                .iter()
                .filter(|s| current_skills.contains(s))
                .cloned()
                .collect();
            let missing: Vec<String> = candidate_skills
                .iter()
                .filter(|s| !current_skills.contains(s))
                .cloned()
                .collect();
            let skill_match_percentage = if candidate_skills.is_empty() {
                0.0
            } else {
                matched.len() as f64 / candidate_skills.len() as f64 * 100.0
            };

            let path = CareerPath {
                target_role: entry.job_role.clone(),
                department: entry.department.clone(),
                similarity_score: candidate.similarity_score,
                skill_match_percentage,
                missing_skills: missing,
                matched_skills: matched,
            };

            match best.iter_mut().find(|p| {
                p.target_role == path.target_role && p.department == path.department
            }) {
                Some(existing) => {
                    if path.similarity_score > existing.similarity_score {
                        *existing = path;
                    }
                }
                None => best.push(path),
            }
        }

        best.sort_by(|a, b| {
            b.skill_match_percentage
                .partial_cmp(&a.skill_match_percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.missing_skills.len().cmp(&b.missing_skills.len()))
        });
        best.truncate(5);

        debug!(employee_id, path_count = best.len(), "career paths recommended");
        best
    }
}
