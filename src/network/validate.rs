//! Topology validation.

use crate::devices::Device;
use crate::error::{PatchbayError, Result};
use crate::topology::ConnectionMatrix;

use super::DeviceId;

/// Validate a device before it joins a network.
///
/// Checks:
/// - Every relation joins two pins of the device
/// - The relation set is closed under reversal
pub fn validate_device(id: DeviceId, device: &Device) -> Result<()> {
    let core = device.core();
    let pins = core.pin_count();

    if let Some(relation) = core
        .relations()
        .iter()
        .find(|r| r.from >= pins || r.to >= pins)
    {
        return Err(PatchbayError::MalformedRelations {
            device: id,
            message: format!(
                "relation {} references a pin outside 0..{}",
                relation.key(),
                pins
            ),
        });
    }

    let unpaired = core.relations().unpaired();
    if !unpaired.is_empty() {
        let keys: Vec<String> = unpaired.iter().map(ToString::to_string).collect();
        return Err(PatchbayError::MalformedRelations {
            device: id,
            message: format!("relations without a reverse: {}", keys.join(", ")),
        });
    }

    Ok(())
}

/// Validate that a connection matrix covers exactly the network's pins.
pub fn validate_matrix(matrix: &ConnectionMatrix, pin_count: usize) -> Result<()> {
    if matrix.size() != pin_count {
        return Err(PatchbayError::incomplete(format!(
            "matrix is {}x{} but the network has {} pins",
            matrix.size(),
            matrix.size(),
            pin_count
        )));
    }
    Ok(())
}
