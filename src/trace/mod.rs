//! Propagation engine.
//!
//! This module traces how ground and signal spread through a patch-bay.
//!
//! ## Ground trace
//!
//! Starting from a grounded source pin, every pin tied to it is marked
//! `GROUNDED`. At each pin the trace expands one hop over active DIRECT
//! relations (the bus), then follows every external connection leaving the
//! bus, except the one it just arrived over. A pin already grounded stops the
//! walk.
//!
//! ## Signal trace
//!
//! Starting from an injection pin, signal spreads the same way but also
//! crosses SIGNAL_D / SIGNAL_R taps. Each tap crossed appends a label
//! `{device}_{relation}` to the branch's path. Ground dominates signal:
//!
//! 1. A branch leaving a grounded pin is absorbed.
//! 2. A branch reaching a grounded pin stops there.
//! 3. A branch reaching a pin that already carries signal is reported as
//!    [`SignalContention`] and stops; the rest of the trace continues.
//!
//! Ground is expected to be traced before signal.

mod events;
mod tracer;

pub use events::{
    Absorption, EventLog, NetworkEvent, NetworkObserver, SignalContention, TraceReport, WireColor,
    WireEvent,
};
pub use tracer::Tracer;

/// Default recursion depth ceiling.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Configuration for tracing.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Deepest recursion allowed before a trace is aborted.
    pub max_depth: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TraceConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recursion depth ceiling.
    ///
    /// Well-formed networks never come close: depth is bounded by the number
    /// of pins. The ceiling guards against relation sets that are not closed
    /// under reversal.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
