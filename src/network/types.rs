//! Core types for network addressing.

use std::fmt;

use serde::Serialize;

/// A unique identifier for a device in the network.
/// Devices are numbered in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DeviceId(pub usize);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// A pin addressed by its device and its local index on that device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PinRef {
    pub device: DeviceId,
    pub pin: usize,
}

impl PinRef {
    /// Create a pin reference.
    pub fn new(device: usize, pin: usize) -> Self {
        Self {
            device: DeviceId(device),
            pin,
        }
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.device, self.pin)
    }
}

/// An external wire between two pins, stored on the device owning `from`.
///
/// Connections are always created in mirrored pairs so traversal can step
/// outward from either endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    pub from: PinRef,
    pub to: PinRef,
}

impl Connection {
    /// The mirrored connection stored on the other endpoint.
    pub fn mirrored(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// The edge a tracer arrives over. `from` is `None` for the root call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEdge {
    pub from: Option<PinRef>,
    pub to: PinRef,
}

impl TraceEdge {
    /// Root edge injecting at `pin`.
    pub fn root(pin: PinRef) -> Self {
        Self { from: None, to: pin }
    }

    /// Whether this trace starts here rather than arriving over a wire.
    pub fn is_root(&self) -> bool {
        self.from.is_none()
    }

    /// Whether `connection` leads straight back over the wire just traversed.
    pub fn is_reversed_by(&self, connection: &Connection) -> bool {
        self.from == Some(connection.to)
    }
}

impl From<Connection> for TraceEdge {
    fn from(connection: Connection) -> Self {
        Self {
            from: Some(connection.from),
            to: connection.to,
        }
    }
}
