//! Device models for the patch-bay.
//!
//! This module provides the closed set of device variants:
//! - [`GenericDevice`]: two points with continuity between them
//! - [`Pickup`]: a coil with a forward and a return signal tap
//! - [`Switcher`]: a three-position switch gating ladder rungs
//! - [`Out`]: an output jack whose sleeve is grounded
//!
//! Every variant owns a [`DeviceCore`] holding its pins, per-pin status,
//! relation set, and outgoing connections. [`Device`] dispatches to it by tag.

mod passive;
mod pins;
mod relations;
mod switcher;

pub use passive::{GenericDevice, Out, Pickup};
pub use pins::{PinKind, PinStatus};
pub use relations::{build_relations, Relation, RelationKey, RelationSet, RelationType};
pub use switcher::Switcher;

use std::fmt;

use serde::Serialize;

use crate::network::Connection;

/// State shared by every device variant.
#[derive(Debug, Clone)]
pub struct DeviceCore {
    pins: Vec<PinKind>,
    status: Vec<PinStatus>,
    relations: RelationSet,
    connections: Vec<Connection>,
}

impl DeviceCore {
    /// Create a device core. Pin status starts from each kind's initial status.
    pub fn new(pins: Vec<PinKind>, relations: RelationSet) -> Self {
        let status = pins.iter().map(PinKind::initial_status).collect();
        Self {
            pins,
            status,
            relations,
            connections: Vec::new(),
        }
    }

    /// Pin kinds in pin order.
    pub fn pins(&self) -> &[PinKind] {
        &self.pins
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    pub fn pin_kind(&self, pin: usize) -> Option<PinKind> {
        self.pins.get(pin).copied()
    }

    /// Status of one pin.
    pub fn status(&self, pin: usize) -> Option<PinStatus> {
        self.status.get(pin).copied()
    }

    /// Status of all pins, parallel to [`pins`](Self::pins).
    pub fn statuses(&self) -> &[PinStatus] {
        &self.status
    }

    /// Move a pin out of `Break`.
    ///
    /// Returns `true` if the pin transitioned. Pins already grounded or
    /// carrying signal are left untouched, as is any request to go back to
    /// `Break`.
    pub fn promote(&mut self, pin: usize, status: PinStatus) -> bool {
        match self.status.get_mut(pin) {
            Some(current) if *current == PinStatus::Break && status != PinStatus::Break => {
                *current = status;
                true
            }
            _ => false,
        }
    }

    pub fn relations(&self) -> &RelationSet {
        &self.relations
    }

    pub(crate) fn relations_mut(&mut self) -> &mut RelationSet {
        &mut self.relations
    }

    /// Outgoing connections in creation order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn push_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    /// `pin` plus every pin one hop away over an active DIRECT relation.
    pub fn direct_reach(&self, pin: usize) -> Vec<usize> {
        let mut reach = vec![pin];
        reach.extend(
            self.relations
                .active_from(pin)
                .filter(|r| r.kind == RelationType::Direct)
                .map(|r| r.to),
        );
        reach
    }

    /// Pins one hop away over an active signal tap, tagged with the tap type.
    pub fn tap_reach(&self, pin: usize) -> Vec<(usize, RelationType)> {
        self.relations
            .active_from(pin)
            .filter(|r| r.kind.is_tap())
            .map(|r| (r.to, r.kind))
            .collect()
    }
}

/// Device variant tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Generic,
    Pickup,
    Switcher,
    Out,
}

impl DeviceKind {
    /// Parse a device kind from its DSL keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "device" | "generic" => Some(Self::Generic),
            "pickup" => Some(Self::Pickup),
            "switcher" | "switch" => Some(Self::Switcher),
            "out" | "jack" => Some(Self::Out),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generic => "generic",
            Self::Pickup => "pickup",
            Self::Switcher => "switcher",
            Self::Out => "out",
        };
        f.write_str(name)
    }
}

/// A device in the patch-bay.
#[derive(Debug, Clone)]
pub enum Device {
    Generic(GenericDevice),
    Pickup(Pickup),
    Switcher(Switcher),
    Out(Out),
}

impl Device {
    /// Create a fresh device of the given kind.
    pub fn new(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Generic => Device::Generic(GenericDevice::new()),
            DeviceKind::Pickup => Device::Pickup(Pickup::new()),
            DeviceKind::Switcher => Device::Switcher(Switcher::new()),
            DeviceKind::Out => Device::Out(Out::new()),
        }
    }

    /// Get the variant tag.
    pub fn kind(&self) -> DeviceKind {
        match self {
            Device::Generic(_) => DeviceKind::Generic,
            Device::Pickup(_) => DeviceKind::Pickup,
            Device::Switcher(_) => DeviceKind::Switcher,
            Device::Out(_) => DeviceKind::Out,
        }
    }

    pub fn core(&self) -> &DeviceCore {
        match self {
            Device::Generic(d) => &d.core,
            Device::Pickup(p) => &p.core,
            Device::Switcher(s) => &s.core,
            Device::Out(o) => &o.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut DeviceCore {
        match self {
            Device::Generic(d) => &mut d.core,
            Device::Pickup(p) => &mut p.core,
            Device::Switcher(s) => &mut s.core,
            Device::Out(o) => &mut o.core,
        }
    }

    /// Get the switcher, if this device is one.
    pub fn as_switcher_mut(&mut self) -> Option<&mut Switcher> {
        match self {
            Device::Switcher(s) => Some(s),
            _ => None,
        }
    }

    /// First pin of the given kind.
    pub fn find_pin(&self, kind: PinKind) -> Option<usize> {
        self.core().pins().iter().position(|&k| k == kind)
    }
}

impl From<GenericDevice> for Device {
    fn from(device: GenericDevice) -> Self {
        Device::Generic(device)
    }
}

impl From<Pickup> for Device {
    fn from(pickup: Pickup) -> Self {
        Device::Pickup(pickup)
    }
}

impl From<Switcher> for Device {
    fn from(switcher: Switcher) -> Self {
        Device::Switcher(switcher)
    }
}

impl From<Out> for Device {
    fn from(out: Out) -> Self {
        Device::Out(out)
    }
}
