use std::sync::Arc;

use crate::analysis::AnalysisConfig;
use crate::config::Config;
use crate::matching::similarity::SimilarityOracle;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Immutable analysis settings derived from `config` at startup.
    pub analysis: Arc<AnalysisConfig>,
    /// Pluggable similarity oracle. Default: Levenshtein. Swap via SIMILARITY_BACKEND env.
    pub oracle: Arc<dyn SimilarityOracle>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let analysis = Arc::new(config.analysis_config());
        let oracle = config.similarity_backend.build();
        Self {
            config,
            analysis,
            oracle,
        }
    }
}
