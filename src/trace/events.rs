//! Trace output: wire notifications, diagnostics, and observers.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::network::{Connection, PinRef};

/// Color tag of a drawn wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireColor {
    /// Wire carrying ground
    Ground,
    /// Wire carrying signal
    Signal,
    /// Wire drawn as plain topology, independent of any trace
    Static,
}

impl fmt::Display for WireColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ground => "ground",
            Self::Signal => "signal",
            Self::Static => "static",
        };
        f.write_str(name)
    }
}

/// One wire to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WireEvent {
    pub from: PinRef,
    pub to: PinRef,
    pub color: WireColor,
}

impl WireEvent {
    pub fn new(connection: Connection, color: WireColor) -> Self {
        Self {
            from: connection.from,
            to: connection.to,
            color,
        }
    }
}

/// A signal trace reached a pin that already carries signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalContention {
    /// Pin the signal arrived from
    pub from: PinRef,
    /// Pin already carrying signal
    pub at: PinRef,
    /// Tap labels accumulated along the arriving path
    pub path: Vec<String>,
}

impl fmt::Display for SignalContention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "signal contention at {} (from {}) via [{}]",
            self.at,
            self.from,
            self.path.join(", ")
        )
    }
}

/// A signal branch that ran into a grounded pin and was absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Absorption {
    /// Grounded pin that absorbed the signal
    pub at: PinRef,
    /// Tap labels accumulated along the path
    pub path: Vec<String>,
}

/// Everything one trace produced besides pin status changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceReport {
    /// Wires in the order they were traversed
    pub wires: Vec<WireEvent>,
    /// Signal-meets-signal diagnostics
    pub contentions: Vec<SignalContention>,
    /// Signal branches absorbed by ground
    pub absorbed: Vec<Absorption>,
    /// Number of pins that changed status
    pub marked: usize,
}

impl TraceReport {
    /// Whether the trace finished without contention.
    pub fn is_clean(&self) -> bool {
        self.contentions.is_empty()
    }
}

/// A notification from the network to its observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NetworkEvent {
    /// A device was added; carries the new pin count and candidate count
    PinCountChanged {
        pins: usize,
        candidates: Option<u128>,
    },
    Wire(WireEvent),
    Contention(SignalContention),
}

/// Receiver of network notifications.
///
/// Notifications never influence tracing. An observer may buffer, animate,
/// or drop them.
pub trait NetworkObserver {
    fn notify(&mut self, event: &NetworkEvent);
}

/// Observer that records every event.
///
/// Clones share the same log, so a clone kept by the caller sees what the
/// network delivered to the subscribed one.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<NetworkEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<NetworkEvent> {
        self.events.borrow().clone()
    }

    /// Recorded wire events of one color.
    pub fn wires(&self, color: WireColor) -> Vec<WireEvent> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                NetworkEvent::Wire(wire) if wire.color == color => Some(*wire),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl NetworkObserver for EventLog {
    fn notify(&mut self, event: &NetworkEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_clones_share_storage() {
        let log = EventLog::new();
        let mut subscribed = log.clone();

        let wire = Connection {
            from: PinRef::new(0, 1),
            to: PinRef::new(1, 0),
        };
        subscribed.notify(&NetworkEvent::Wire(WireEvent::new(wire, WireColor::Ground)));
        subscribed.notify(&NetworkEvent::PinCountChanged {
            pins: 4,
            candidates: Some(64),
        });

        assert_eq!(log.events().len(), 2);
        assert_eq!(log.wires(WireColor::Ground).len(), 1);
        assert!(log.wires(WireColor::Signal).is_empty());

        log.clear();
        assert!(subscribed.events().is_empty());
    }

    #[test]
    fn test_contention_display() {
        let contention = SignalContention {
            from: PinRef::new(2, 1),
            at: PinRef::new(0, 0),
            path: vec!["0_SIGNAL_D".to_string()],
        };
        assert_eq!(
            contention.to_string(),
            "signal contention at D0.0 (from D2.1) via [0_SIGNAL_D]"
        );
    }
}
