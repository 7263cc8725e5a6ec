//! Timestamped performance reports

mod score;

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{distributions::Uniform, Rng};
use serde::{Serialize, Deserialize};

pub use score::{impact_score, raw_impact_score, recommendations, ImpactLevel, MAX_IMPACT_SCORE};

use crate::metrics::MetricSnapshot;

/// Immutable capture of the metric state plus its derived score.
///
/// Field names serialize in camelCase, matching what the dashboard reads
/// back from the persisted log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    /// Capture time, ms since the Unix epoch
    pub timestamp: u64,
    /// Monitor session that produced the report
    pub session_id: String,
    /// Host user agent
    pub user_agent: String,
    /// Full metric state at capture time
    pub metrics: MetricSnapshot,
    /// Whether the suppression layer was installed
    pub suppression_active: bool,
    /// Rounded impact score, 0..=100
    pub impact_score: u8,
    /// Advice in fixed order, never empty
    pub recommendations: Vec<String>,
}

impl PerformanceReport {
    /// Score a snapshot and stamp it with the current time
    pub fn capture(
        metrics: MetricSnapshot,
        session_id: impl Into<String>,
        user_agent: impl Into<String>,
        suppression_active: bool,
    ) -> Self {
        let raw_score = raw_impact_score(&metrics);
        let recommendations = recommendations(&metrics, raw_score);

        Self {
            timestamp: epoch_millis(),
            session_id: session_id.into(),
            user_agent: user_agent.into(),
            metrics,
            suppression_active,
            impact_score: score::round_score(raw_score),
            recommendations,
        }
    }

    /// Dashboard bucket for the score
    pub fn impact_level(&self) -> ImpactLevel {
        ImpactLevel::from_score(self.impact_score)
    }
}

pub(crate) fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// `<prefix>_<epoch ms>_<9 base-36 chars>`; unique in practice, not by
/// construction.
pub fn generate_session_id(prefix: &str) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let suffix: String = rand::thread_rng()
        .sample_iter(Uniform::from(0..ALPHABET.len()))
        .take(9)
        .map(|i| ALPHABET[i] as char)
        .collect();

    format!("{}_{}_{}", prefix, epoch_millis(), suffix)
}
