//! Impact score and recommendations.
//!
//! The score is an additive heuristic, not a fitted model. Memory, frame and
//! long-task pressure are bucketed (only the highest matching bucket counts)
//! while console and mutation overhead scale linearly up to a cap.

use serde::{Serialize, Deserialize};

use crate::{
    error::{MonitorError, Result},
    metrics::MetricSnapshot,
};

/// Upper bound of the impact score
pub const MAX_IMPACT_SCORE: u8 = 100;

/// Score above 70
pub const HIGH_IMPACT: &str =
    "High performance impact detected. Consider reducing error suppression scope.";
/// Console interception above 20 ms
pub const CONSOLE_OVERHEAD: &str =
    "Console override causing significant overhead. Optimize keyword matching.";
/// Script inspection above 10 ms
pub const MUTATION_OVERHEAD: &str =
    "Mutation observer overhead detected. Consider reducing observation scope.";
/// Heap above 80% of its limit
pub const HIGH_MEMORY: &str =
    "High memory usage detected. Monitor for memory leaks in suppression code.";
/// More than 50 dropped frames
pub const FRAME_DROPS: &str =
    "Frame drops detected. Error suppression may be impacting rendering performance.";
/// More than 5 long tasks
pub const LONG_TASKS: &str =
    "Long tasks detected. Consider async processing for error suppression.";
/// More than 1000 suppressed messages
pub const HIGH_VOLUME: &str =
    "High volume of suppressed messages. Consider more targeted filtering.";
/// Nothing triggered
pub const OPTIMAL: &str = "Error suppression performing optimally with minimal impact.";
/// Recommendations could not be computed
pub const RECOMMENDATION_FAILURE: &str =
    "Unable to generate recommendations due to monitoring error.";

/// Dashboard classification of an impact score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    /// Below 30
    Low,
    /// 30 to 59
    Moderate,
    /// 60 and above
    High,
}

impl ImpactLevel {
    /// Bucket a score
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => ImpactLevel::Low,
            30..=59 => ImpactLevel::Moderate,
            _ => ImpactLevel::High,
        }
    }
}

/// A failed term contributes nothing rather than poisoning the sum
fn guarded(term: f64) -> f64 {
    if term.is_finite() && term > 0.0 {
        term
    } else {
        0.0
    }
}

fn console_term(millis: f64) -> f64 {
    if millis > 10.0 {
        (millis / 2.0).min(20.0)
    } else {
        0.0
    }
}

fn mutation_term(millis: f64) -> f64 {
    if millis > 5.0 {
        millis.min(15.0)
    } else {
        0.0
    }
}

fn memory_term(ratio: f64) -> f64 {
    if ratio > 0.8 {
        25.0
    } else if ratio > 0.6 {
        15.0
    } else if ratio > 0.4 {
        5.0
    } else {
        0.0
    }
}

fn frame_term(drops: u64) -> f64 {
    match drops {
        d if d > 100 => 20.0,
        d if d > 50 => 10.0,
        d if d > 20 => 5.0,
        _ => 0.0,
    }
}

fn long_task_term(tasks: u64) -> f64 {
    match tasks {
        t if t > 10 => 20.0,
        t if t > 5 => 10.0,
        t if t > 2 => 5.0,
        _ => 0.0,
    }
}

/// Unrounded impact total, capped at [`MAX_IMPACT_SCORE`]
pub fn raw_impact_score(metrics: &MetricSnapshot) -> f64 {
    let terms = [
        guarded(console_term(metrics.console_override_time.unwrap_or(0.0))),
        guarded(mutation_term(metrics.mutation_observer_time.unwrap_or(0.0))),
        guarded(
            metrics
                .memory_usage
                .and_then(|m| m.usage_ratio())
                .map(memory_term)
                .unwrap_or(0.0),
        ),
        guarded(frame_term(metrics.frame_drops.unwrap_or(0))),
        guarded(long_task_term(metrics.long_tasks.unwrap_or(0))),
    ];

    let total: f64 = terms.iter().sum();
    total.min(f64::from(MAX_IMPACT_SCORE))
}

/// Impact of the monitoring and suppression layer on the page, 0..=100,
/// higher is worse. Absent metrics contribute nothing.
pub fn impact_score(metrics: &MetricSnapshot) -> u8 {
    round_score(raw_impact_score(metrics))
}

pub(crate) fn round_score(raw: f64) -> u8 {
    raw.round() as u8
}

fn finite(metric: &'static str, value: Option<f64>) -> Result<f64> {
    let value = value.unwrap_or(0.0);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MonitorError::Computation { metric })
    }
}

fn try_recommendations(metrics: &MetricSnapshot, raw_score: f64) -> Result<Vec<String>> {
    let console = finite("consoleOverrideTime", metrics.console_override_time)?;
    let mutation = finite("mutationObserverTime", metrics.mutation_observer_time)?;
    let memory_ratio = metrics.memory_usage.and_then(|m| m.usage_ratio());

    let checks = [
        (raw_score > 70.0, HIGH_IMPACT),
        (console > 20.0, CONSOLE_OVERHEAD),
        (mutation > 10.0, MUTATION_OVERHEAD),
        (memory_ratio.is_some_and(|r| r > 0.8), HIGH_MEMORY),
        (metrics.frame_drops.unwrap_or(0) > 50, FRAME_DROPS),
        (metrics.long_tasks.unwrap_or(0) > 5, LONG_TASKS),
        (metrics.suppressed_messages() > 1000, HIGH_VOLUME),
    ];

    let mut recommendations: Vec<String> = checks
        .iter()
        .filter(|(triggered, _)| *triggered)
        .map(|(_, text)| text.to_string())
        .collect();

    if recommendations.is_empty() {
        recommendations.push(OPTIMAL.to_string());
    }

    Ok(recommendations)
}

/// Human-readable advice, in a fixed order. Never empty.
///
/// `raw_score` is the unrounded total from [`raw_impact_score`]; the
/// high-impact threshold applies before rounding.
pub fn recommendations(metrics: &MetricSnapshot, raw_score: f64) -> Vec<String> {
    try_recommendations(metrics, raw_score).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "falling back to generic recommendation");
        vec![RECOMMENDATION_FAILURE.to_string()]
    })
}
