//! Extension-noise suppression: the keyword heuristic and the interception
//! entry points that report every swallowed message to a [`SuppressionSink`].

mod filter;
mod layer;

use std::time::Duration;

pub use filter::KeywordFilter;
pub use layer::{ConsoleLevel, SuppressionLayer, Verdict};

use crate::types::{SuppressionKind, TimingKind};

/// Capability the interception layer reports into.
///
/// Implementations must not panic and must not block: they are called from
/// inside console and error-handling paths, and a failure there would
/// re-enter the same path.
pub trait SuppressionSink: Send + Sync {
    /// Count one swallowed item of `kind`
    fn record_suppression(&self, kind: SuppressionKind);

    /// Add time spent inside the interception layer
    fn record_overhead(&self, _kind: TimingKind, _elapsed: Duration) {}
}
