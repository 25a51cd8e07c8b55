use std::sync::Arc;

use crate::config::Config;
use crate::extractors::innertube::InnertubeClient;
use crate::extractors::{
    CaptionStrategy, NextPanelStrategy, PageScrapeStrategy, PlayerStrategy, RetrievalOutcome, VideoId,
};
use crate::transport::{HttpTransport, ReqwestTransport};

pub mod normalizer;

/// A strategy that did not produce a transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    pub strategy: String,
    pub outcome: RetrievalOutcome,
}

impl StrategyFailure {
    /// `"<strategy>: <reason>"`
    pub fn describe(&self) -> String {
        format!("{}: {}", self.strategy, self.outcome.reason().unwrap_or("unknown"))
    }
}

/// Final result of running the fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// `Success`, or `NotFound` carrying the aggregated diagnostic
    pub outcome: RetrievalOutcome,

    /// Every strategy that was tried and failed, in order
    pub failures: Vec<StrategyFailure>,
}

impl Resolution {
    /// Per-strategy reasons joined with `"; "`
    pub fn diagnostic(&self) -> String {
        join_failures(&self.failures)
    }
}

fn join_failures(failures: &[StrategyFailure]) -> String {
    failures
        .iter()
        .map(StrategyFailure::describe)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Fallback orchestrator over a fixed, ordered list of caption strategies
pub struct TranscriptPipeline {
    strategies: Vec<Box<dyn CaptionStrategy>>,
}

impl TranscriptPipeline {
    /// Production pipeline over a reqwest transport
    pub fn new(config: &Config) -> crate::Result<Self> {
        let transport = ReqwestTransport::new(config.innertube.request_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Standard strategy order: one direct-player strategy per configured persona,
    /// then the engagement panel, then the watch-page scrape
    pub fn with_transport(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        let client = InnertubeClient::new(transport, config.innertube.clone());

        let mut strategies: Vec<Box<dyn CaptionStrategy>> = Vec::new();
        for persona in &config.innertube.player_clients {
            strategies.push(Box::new(PlayerStrategy::new(client.clone(), persona.clone())));
        }
        strategies.push(Box::new(NextPanelStrategy::new(
            client.clone(),
            config.innertube.transcript_client.clone(),
        )));
        strategies.push(Box::new(PageScrapeStrategy::new(client)));

        Self::with_strategies(strategies)
    }

    pub fn with_strategies(strategies: Vec<Box<dyn CaptionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Strategy names in the order they are tried
    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the strategies one after another until one succeeds
    pub async fn resolve(&self, video_id: &VideoId) -> Resolution {
        tracing::info!("Resolving transcript for {}", video_id);
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            let name = strategy.name();
            tracing::debug!("Trying strategy {} for {}", name, video_id);

            let outcome = strategy.run(video_id).await;
            if outcome.is_success() {
                tracing::info!("Strategy {} produced a transcript for {}", name, video_id);
                return Resolution { outcome, failures };
            }

            let failure = StrategyFailure { strategy: name, outcome };
            tracing::warn!("Strategy failed for {}: {}", video_id, failure.describe());
            failures.push(failure);
        }

        let diagnostic = join_failures(&failures);
        tracing::error!("All caption methods failed for {}: [{}]", video_id, diagnostic);

        Resolution {
            outcome: RetrievalOutcome::NotFound { reason: diagnostic },
            failures,
        }
    }
}
