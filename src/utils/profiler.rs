use std::time::Instant;

use crate::{suppression::SuppressionSink, types::TimingKind};

/// Guard that measures a scope and reports the elapsed time to a sink when
/// dropped.
pub struct OverheadTimer<'a> {
    sink: &'a dyn SuppressionSink,
    kind: TimingKind,
    start_time: Instant,
}

impl<'a> OverheadTimer<'a> {
    /// Start timing a scope of `kind`
    pub fn start(sink: &'a dyn SuppressionSink, kind: TimingKind) -> Self {
        Self {
            sink,
            kind,
            start_time: Instant::now(),
        }
    }
}

impl<'a> Drop for OverheadTimer<'a> {
    fn drop(&mut self) {
        self.sink.record_overhead(self.kind, self.start_time.elapsed());
    }
}

/// Time a scope against a sink
#[macro_export]
macro_rules! overhead_span {
    ($sink:expr, $kind:expr) => {
        let _overhead_guard = $crate::utils::OverheadTimer::start($sink, $kind);
    };
}
