//! Fixed-topology devices: generic two-pin device, pickup, and output jack.

use super::relations::{build_relations, RelationType};
use super::{DeviceCore, PinKind};

/// A plain two-pin device with continuity between its pins.
#[derive(Debug, Clone)]
pub struct GenericDevice {
    pub core: DeviceCore,
}

impl GenericDevice {
    pub fn new() -> Self {
        Self {
            core: DeviceCore::new(
                vec![PinKind::Point, PinKind::Point],
                build_relations(&[(0, 1, RelationType::Direct)]),
            ),
        }
    }
}

impl Default for GenericDevice {
    fn default() -> Self {
        Self::new()
    }
}

/// A pickup coil.
///
/// The coil is asymmetric: START -> END is a forward tap, END -> START a
/// return tap. Neither direction carries ground.
#[derive(Debug, Clone)]
pub struct Pickup {
    pub core: DeviceCore,
}

impl Pickup {
    /// Index of the START pin.
    pub const START: usize = 0;
    /// Index of the END pin.
    pub const END: usize = 1;

    pub fn new() -> Self {
        Self {
            core: DeviceCore::new(
                vec![PinKind::Start, PinKind::End],
                build_relations(&[
                    (Self::START, Self::END, RelationType::SignalD),
                    (Self::END, Self::START, RelationType::SignalR),
                ]),
            ),
        }
    }
}

impl Default for Pickup {
    fn default() -> Self {
        Self::new()
    }
}

/// An output jack: a tip and a sleeve that is grounded from creation.
#[derive(Debug, Clone)]
pub struct Out {
    pub core: DeviceCore,
}

impl Out {
    /// Index of the tip pin.
    pub const TIP: usize = 0;
    /// Index of the ground pin.
    pub const GROUND: usize = 1;

    pub fn new() -> Self {
        Self {
            core: DeviceCore::new(
                vec![PinKind::Out, PinKind::Ground],
                build_relations(&[(Self::TIP, Self::GROUND, RelationType::Out)]),
            ),
        }
    }
}

impl Default for Out {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::PinStatus;

    #[test]
    fn test_generic_device() {
        let device = GenericDevice::new();
        assert_eq!(device.core.pins(), &[PinKind::Point, PinKind::Point]);
        assert_eq!(device.core.direct_reach(0), vec![0, 1]);
        assert_eq!(device.core.direct_reach(1), vec![1, 0]);
    }

    #[test]
    fn test_pickup_taps() {
        let pickup = Pickup::new();
        assert_eq!(pickup.core.direct_reach(Pickup::START), vec![Pickup::START]);
        assert_eq!(
            pickup.core.tap_reach(Pickup::START),
            vec![(Pickup::END, RelationType::SignalD)]
        );
        assert_eq!(
            pickup.core.tap_reach(Pickup::END),
            vec![(Pickup::START, RelationType::SignalR)]
        );
    }

    #[test]
    fn test_out_ground_starts_grounded() {
        let jack = Out::new();
        assert_eq!(jack.core.status(Out::GROUND), Some(PinStatus::Grounded));
        assert_eq!(jack.core.status(Out::TIP), Some(PinStatus::Break));
        // The tip-to-sleeve relation is a sink, not continuity
        assert_eq!(jack.core.direct_reach(Out::GROUND), vec![Out::GROUND]);
    }
}
