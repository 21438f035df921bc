//! Remediation estimates — how long and how much it takes to learn a missing skill.
//!
//! Caller-supplied catalog entries always win. Skills missing from the catalog follow
//! the configured `FallbackPolicy`; every estimate carries its `RemediationSource`.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;
use crate::models::plan::RemediationSource;
use crate::models::skill::{normalize_skill, Tier};

/// Skills treated as multi-month undertakings by the heuristic table.
const COMPLEX_SKILLS: &[&str] = &[
    "machine learning",
    "data science",
    "cloud architecture",
    "devops",
    "full stack",
    "deep learning",
    "natural language processing",
    "computer vision",
    "kubernetes",
    "microservices",
    "distributed systems",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Unknown skills cost nothing (0 months, $0), flagged `Defaulted`.
    #[default]
    Zero,
    /// Unknown skills get a tier/complexity table estimate, flagged `Heuristic`.
    Heuristic,
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero" => Ok(FallbackPolicy::Zero),
            "heuristic" => Ok(FallbackPolicy::Heuristic),
            other => Err(format!(
                "unknown remediation fallback '{other}' (expected zero or heuristic)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemediationEstimate {
    pub time_months: f64,
    pub cost_dollars: f64,
    pub source: RemediationSource,
}

/// One caller-supplied estimate, as received over the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemediationInput {
    pub skill: String,
    pub time_months: f64,
    pub cost_dollars: f64,
}

/// Per-skill remediation estimates for one request.
#[derive(Debug, Clone, Default)]
pub struct RemediationCatalog {
    entries: BTreeMap<String, (f64, f64)>,
    fallback: FallbackPolicy,
}

impl RemediationCatalog {
    pub fn new(fallback: FallbackPolicy) -> Self {
        Self {
            entries: BTreeMap::new(),
            fallback,
        }
    }

    pub fn from_inputs(
        inputs: &[RemediationInput],
        fallback: FallbackPolicy,
    ) -> Result<Self, AnalysisError> {
        inputs.iter().try_fold(Self::new(fallback), |catalog, input| {
            catalog.with_estimate(&input.skill, input.time_months, input.cost_dollars)
        })
    }

    pub fn with_estimate(
        mut self,
        skill: &str,
        time_months: f64,
        cost_dollars: f64,
    ) -> Result<Self, AnalysisError> {
        let id = normalize_skill(skill);
        if id.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "remediation entry has an empty skill identifier".to_string(),
            ));
        }
        for (name, value) in [("time_months", time_months), ("cost_dollars", cost_dollars)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::InvalidInput(format!(
                    "remediation {name} for '{id}' must be a finite non-negative number, got {value}"
                )));
            }
        }
        if self.entries.insert(id.clone(), (time_months, cost_dollars)).is_some() {
            return Err(AnalysisError::InvalidInput(format!(
                "remediation estimate for '{id}' supplied more than once"
            )));
        }
        Ok(self)
    }

    pub fn estimate(&self, skill_id: &str, tier: Tier) -> RemediationEstimate {
        if let Some(&(time_months, cost_dollars)) = self.entries.get(skill_id) {
            return RemediationEstimate {
                time_months,
                cost_dollars,
                source: RemediationSource::Provided,
            };
        }
        match self.fallback {
            FallbackPolicy::Zero => RemediationEstimate {
                time_months: 0.0,
                cost_dollars: 0.0,
                source: RemediationSource::Defaulted,
            },
            FallbackPolicy::Heuristic => {
                let (time_months, cost_dollars) = heuristic_estimate(skill_id, tier);
                RemediationEstimate {
                    time_months,
                    cost_dollars,
                    source: RemediationSource::Heuristic,
                }
            }
        }
    }
}

/// Whether `skill_id` names a multi-month undertaking.
pub fn is_complex_skill(skill_id: &str) -> bool {
    COMPLEX_SKILLS.iter().any(|c| skill_id.contains(c))
}

/// Table estimate by tier and complexity: (months, dollars).
pub fn heuristic_estimate(skill_id: &str, tier: Tier) -> (f64, f64) {
    match (tier, is_complex_skill(skill_id)) {
        (Tier::Required, false) => (0.5, 50.0),
        (Tier::Required, true) => (2.0, 200.0),
        (Tier::Preferred, false) => (0.25, 30.0),
        (Tier::Preferred, true) => (1.0, 150.0),
        (Tier::Bonus, false) => (0.125, 20.0),
        (Tier::Bonus, true) => (0.5, 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provided_estimate_wins() {
        let catalog = RemediationCatalog::new(FallbackPolicy::Heuristic)
            .with_estimate("SQL", 2.0, 100.0)
            .unwrap();
        let est = catalog.estimate("sql", Tier::Preferred);
        assert_eq!(est.time_months, 2.0);
        assert_eq!(est.cost_dollars, 100.0);
        assert_eq!(est.source, RemediationSource::Provided);
    }

    #[test]
    fn test_zero_fallback_is_flagged_defaulted() {
        let est = RemediationCatalog::new(FallbackPolicy::Zero).estimate("rust", Tier::Required);
        assert_eq!(est.time_months, 0.0);
        assert_eq!(est.cost_dollars, 0.0);
        assert_eq!(est.source, RemediationSource::Defaulted);
    }

    #[test]
    fn test_heuristic_fallback_distinguishes_complex_skills() {
        let catalog = RemediationCatalog::new(FallbackPolicy::Heuristic);
        let simple = catalog.estimate("git", Tier::Required);
        let complex = catalog.estimate("kubernetes", Tier::Required);
        assert_eq!((simple.time_months, simple.cost_dollars), (0.5, 50.0));
        assert_eq!((complex.time_months, complex.cost_dollars), (2.0, 200.0));
        assert_eq!(complex.source, RemediationSource::Heuristic);
    }

    #[test]
    fn test_heuristic_table_by_tier() {
        assert_eq!(heuristic_estimate("excel", Tier::Bonus), (0.125, 20.0));
        assert_eq!(heuristic_estimate("applied machine learning", Tier::Preferred), (1.0, 150.0));
    }

    #[test]
    fn test_negative_or_nan_estimates_rejected() {
        assert!(RemediationCatalog::default()
            .with_estimate("sql", -1.0, 10.0)
            .is_err());
        assert!(RemediationCatalog::default()
            .with_estimate("sql", 1.0, f64::NAN)
            .is_err());
    }

    #[test]
    fn test_duplicate_estimates_rejected() {
        let inputs = vec![
            RemediationInput {
                skill: "SQL".to_string(),
                time_months: 1.0,
                cost_dollars: 10.0,
            },
            RemediationInput {
                skill: "sql".to_string(),
                time_months: 2.0,
                cost_dollars: 20.0,
            },
        ];
        let err = RemediationCatalog::from_inputs(&inputs, FallbackPolicy::Zero).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_fallback_policy_from_str() {
        assert_eq!("Heuristic".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::Heuristic);
        assert_eq!("zero".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::Zero);
        assert!("guess".parse::<FallbackPolicy>().is_err());
    }
}
