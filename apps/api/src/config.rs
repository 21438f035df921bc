use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::analysis::AnalysisConfig;
use crate::matching::matcher::{MatcherConfig, DEFAULT_SIMILARITY_THRESHOLD};
use crate::matching::similarity::SimilarityBackend;
use crate::models::skill::TierWeights;
use crate::optimizer::{SolverConfig, DEFAULT_MAX_EXACT_ITEMS, DEFAULT_MAX_NODES};
use crate::scoring::remediation::FallbackPolicy;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub similarity_threshold: f64,
    pub similarity_backend: SimilarityBackend,
    pub solver_timeout_ms: u64,
    pub solver_max_nodes: u64,
    pub solver_max_exact_items: usize,
    pub enable_exact_solver: bool,
    pub remediation_fallback: FallbackPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Config {
            port: parse_or("PORT", &lookup, 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            similarity_threshold: parse_or(
                "SIMILARITY_THRESHOLD",
                &lookup,
                DEFAULT_SIMILARITY_THRESHOLD,
            )?,
            similarity_backend: parse_with(
                "SIMILARITY_BACKEND",
                &lookup,
                SimilarityBackend::Levenshtein,
            )?,
            solver_timeout_ms: parse_or("SOLVER_TIMEOUT_MS", &lookup, 2_000)?,
            solver_max_nodes: parse_or("SOLVER_MAX_NODES", &lookup, DEFAULT_MAX_NODES)?,
            solver_max_exact_items: parse_or(
                "SOLVER_MAX_EXACT_ITEMS",
                &lookup,
                DEFAULT_MAX_EXACT_ITEMS,
            )?,
            enable_exact_solver: parse_or("ENABLE_EXACT_SOLVER", &lookup, true)?,
            remediation_fallback: parse_with(
                "REMEDIATION_FALLBACK",
                &lookup,
                FallbackPolicy::Zero,
            )?,
        };

        config
            .analysis_config()
            .matcher
            .validate()
            .context("SIMILARITY_THRESHOLD is out of range")?;

        Ok(config)
    }

    /// The immutable settings handed to every analysis request.
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            matcher: MatcherConfig {
                similarity_threshold: self.similarity_threshold,
            },
            tier_weights: TierWeights::default(),
            solver: SolverConfig {
                exact_enabled: self.enable_exact_solver,
                timeout: Duration::from_millis(self.solver_timeout_ms),
                max_nodes: self.solver_max_nodes,
                max_exact_items: self.solver_max_exact_items,
            },
            remediation_fallback: self.remediation_fallback,
        }
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

/// Like `parse_or`, for the config enums whose `FromStr` error is a plain message.
fn parse_with<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T>
where
    T: FromStr<Err = String>,
{
    match lookup(key) {
        Some(raw) => raw.parse::<T>().map_err(|e| anyhow!("{key}: {e}")),
        None => Ok(default),
    }
}
