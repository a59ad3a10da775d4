//! Serializable view of a network for renderers.

use serde::Serialize;

use super::{Connection, DeviceId};
use crate::devices::{DeviceKind, PinKind, PinStatus};

/// Full device and connection state, suitable for initial layout.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub pin_count: usize,
    pub devices: Vec<DeviceSnapshot>,
}

/// One device in a [`Snapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSnapshot {
    pub id: DeviceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: DeviceKind,
    /// Selected position, for switchers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<usize>,
    pub pins: Vec<PinSnapshot>,
    pub connections: Vec<Connection>,
}

/// One pin in a [`DeviceSnapshot`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PinSnapshot {
    pub kind: PinKind,
    pub status: PinStatus,
}
