//! Patch-bay network: devices, pin index, and external connections.
//!
//! The [`Network`] owns every device of one session. It flattens their pins
//! into a linear pin index, materializes connection matrices into mirrored
//! [`Connection`] pairs, and runs traces.

mod graph;
mod snapshot;
mod types;
mod validate;

pub use graph::Network;
pub use snapshot::{DeviceSnapshot, PinSnapshot, Snapshot};
pub use types::*;
pub use validate::{validate_device, validate_matrix};
