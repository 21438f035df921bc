//! Skill reference data — normalized identifiers, priority tiers and job profiles.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;

/// Whitespace and separator punctuation collapse to a single space.
/// `+`, `#` and `.` are kept: they distinguish C, C++ and C#, or Node.js.
static RE_SEPARATORS: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"[\s\-_/,;:]+").unwrap());

pub const DEFAULT_CATEGORY: &str = "General";

/// Normalizes a raw skill name into its comparison identifier.
pub fn normalize_skill(raw: &str) -> String {
    let lower = raw.to_lowercase();
    RE_SEPARATORS.replace_all(&lower, " ").trim().to_string()
}

/// Priority class of a job requirement. Ordering is Required < Preferred < Bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Required,
    Preferred,
    Bonus,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Required, Tier::Preferred, Tier::Bonus];
}

/// Scoring weight per tier. Fixed for the lifetime of the service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierWeights {
    pub required: f64,
    pub preferred: f64,
    pub bonus: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            required: 1.0,
            preferred: 0.6,
            bonus: 0.3,
        }
    }
}

impl TierWeights {
    pub fn weight(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Required => self.required,
            Tier::Preferred => self.preferred,
            Tier::Bonus => self.bonus,
        }
    }
}

/// A normalized skill and the single category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub category: String,
}

impl Skill {
    pub fn new(raw: &str, category: Option<&str>) -> Result<Self, AnalysisError> {
        let id = normalize_skill(raw);
        if id.is_empty() {
            return Err(AnalysisError::InvalidInput(format!(
                "skill identifier '{raw}' is empty after normalization"
            )));
        }
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();
        Ok(Self { id, category })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub skill: Skill,
    pub tier: Tier,
}

/// The set of skill requirements for one role. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobProfile {
    requirements: Vec<SkillRequirement>,
}

impl JobProfile {
    /// Builds a profile, rejecting empty profiles and skills listed more than once.
    /// Requirements are stored sorted by skill identifier.
    pub fn new(mut requirements: Vec<SkillRequirement>) -> Result<Self, AnalysisError> {
        if requirements.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "job profile has no requirements".to_string(),
            ));
        }

        requirements.sort_by(|a, b| a.skill.id.cmp(&b.skill.id));
        if let Some(dup) = requirements
            .windows(2)
            .find(|pair| pair[0].skill.id == pair[1].skill.id)
        {
            return Err(AnalysisError::InvalidInput(format!(
                "skill '{}' appears more than once in the job profile",
                dup[0].skill.id
            )));
        }

        Ok(Self { requirements })
    }

    /// Convenience builder from per-tier skill name lists.
    #[cfg(test)]
    pub fn from_tiers(
        required: &[&str],
        preferred: &[&str],
        bonus: &[&str],
    ) -> Result<Self, AnalysisError> {
        let mut requirements = Vec::with_capacity(required.len() + preferred.len() + bonus.len());
        for (tier, names) in [
            (Tier::Required, required),
            (Tier::Preferred, preferred),
            (Tier::Bonus, bonus),
        ] {
            for name in names {
                requirements.push(SkillRequirement {
                    skill: Skill::new(name, None)?,
                    tier,
                });
            }
        }
        Self::new(requirements)
    }

    pub fn requirements(&self) -> &[SkillRequirement] {
        &self.requirements
    }
}
