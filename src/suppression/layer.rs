use std::sync::Arc;

use super::{KeywordFilter, SuppressionSink};
use crate::{
    config::SuppressionConfig,
    types::{SuppressionKind, TimingKind},
    utils::OverheadTimer,
};

/// Console method a message was written through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    /// `console.error`
    Error,
    /// `console.warn`
    Warn,
    /// `console.log`
    Log,
    /// `console.info`
    Info,
    /// `console.debug`
    Debug,
}

impl ConsoleLevel {
    fn suppression_kind(self) -> SuppressionKind {
        match self {
            ConsoleLevel::Error => SuppressionKind::Error,
            ConsoleLevel::Warn => SuppressionKind::Warning,
            ConsoleLevel::Log | ConsoleLevel::Info | ConsoleLevel::Debug => SuppressionKind::Log,
        }
    }
}

/// Outcome of an interception
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Let the message, request or script through
    Pass,
    /// Swallow it
    Suppress,
}

impl Verdict {
    /// True for [`Verdict::Suppress`]
    pub fn is_suppressed(self) -> bool {
        self == Verdict::Suppress
    }
}

/// Interception entry points for the host's console, error events, fetch
/// and script injection. Every swallow is counted through the injected sink
/// and the time spent deciding is reported as overhead.
pub struct SuppressionLayer {
    filter: KeywordFilter,
    sink: Arc<dyn SuppressionSink>,
    enabled: bool,
}

impl SuppressionLayer {
    /// An enabled layer over `filter`
    pub fn new(filter: KeywordFilter, sink: Arc<dyn SuppressionSink>) -> Self {
        Self {
            filter,
            sink,
            enabled: true,
        }
    }

    /// Build from configuration; preparing the keyword list is recorded as
    /// event-listener setup time.
    pub fn from_config(config: &SuppressionConfig, sink: Arc<dyn SuppressionSink>) -> Self {
        let filter = {
            crate::overhead_span!(sink.as_ref(), TimingKind::EventListenerSetup);
            KeywordFilter::new(&config.keywords)
        };

        Self {
            filter,
            sink,
            enabled: config.enabled,
        }
    }

    /// Whether anything can be suppressed
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A console call with its arguments already joined by spaces
    pub fn console(&self, level: ConsoleLevel, message: &str) -> Verdict {
        self.intercept(message, level.suppression_kind(), TimingKind::ConsoleOverride)
    }

    /// An unhandled promise rejection, by its stringified reason
    pub fn unhandled_rejection(&self, reason: &str) -> Verdict {
        self.intercept(reason, SuppressionKind::Error, TimingKind::ErrorSuppression)
    }

    /// A global error event, by its message
    pub fn error_event(&self, message: &str) -> Verdict {
        self.intercept(message, SuppressionKind::Error, TimingKind::ErrorSuppression)
    }

    /// An outgoing request, by URL
    pub fn request(&self, url: &str) -> Verdict {
        self.intercept(url, SuppressionKind::Request, TimingKind::ErrorSuppression)
    }

    /// A script element's `src` attribute being set
    pub fn script_src(&self, src: &str) -> Verdict {
        self.intercept(src, SuppressionKind::Script, TimingKind::MutationObserver)
    }

    fn intercept(&self, text: &str, kind: SuppressionKind, timing: TimingKind) -> Verdict {
        if !self.enabled {
            return Verdict::Pass;
        }

        let _timer = OverheadTimer::start(self.sink.as_ref(), timing);
        if self.filter.should_suppress(text) {
            self.sink.record_suppression(kind);
            Verdict::Suppress
        } else {
            Verdict::Pass
        }
    }
}
