//! Ground and signal propagation.

use tracing::{debug, trace, warn};

use super::events::{Absorption, SignalContention, TraceReport, WireColor, WireEvent};
use super::TraceConfig;
use crate::devices::{Device, DeviceCore, PinStatus, RelationType};
use crate::error::{PatchbayError, Result};
use crate::network::{Connection, DeviceId, PinRef, TraceEdge};

/// A single trace session over a device list.
///
/// Both traces are depth-first and recursive. Pin status only ever leaves
/// `Break`, so every pin is marked at most once; that plus the back-traversal
/// exclusion bounds the walk. The depth ceiling only trips on relation sets
/// that break those guarantees.
pub struct Tracer<'a> {
    devices: &'a mut [Device],
    max_depth: usize,
    report: TraceReport,
}

impl<'a> Tracer<'a> {
    pub fn new(devices: &'a mut [Device], config: &TraceConfig) -> Self {
        Self {
            devices,
            max_depth: config.max_depth,
            report: TraceReport::default(),
        }
    }

    /// Flood ground outward from `root`.
    pub fn ground(mut self, root: PinRef) -> Result<TraceReport> {
        debug!(root = %root, "ground trace starting");
        self.trace_ground(TraceEdge::root(root), 0)?;
        debug!(
            marked = self.report.marked,
            wires = self.report.wires.len(),
            "ground trace complete"
        );
        Ok(self.report)
    }

    /// Propagate signal outward from `root`.
    pub fn signal(mut self, root: PinRef) -> Result<TraceReport> {
        debug!(root = %root, "signal trace starting");
        self.trace_signal(TraceEdge::root(root), Vec::new(), 0)?;
        debug!(
            marked = self.report.marked,
            wires = self.report.wires.len(),
            contentions = self.report.contentions.len(),
            absorbed = self.report.absorbed.len(),
            "signal trace complete"
        );
        Ok(self.report)
    }

    fn core_mut(&mut self, device: DeviceId) -> Result<&mut DeviceCore> {
        self.devices
            .get_mut(device.0)
            .map(Device::core_mut)
            .ok_or(PatchbayError::DeviceNotFound { device })
    }

    fn status(&self, pin: PinRef) -> Result<PinStatus> {
        self.devices
            .get(pin.device.0)
            .ok_or(PatchbayError::DeviceNotFound { device: pin.device })?
            .core()
            .status(pin.pin)
            .ok_or(PatchbayError::PinNotFound { pin })
    }

    fn check_depth(&self, depth: usize, pin: PinRef) -> Result<()> {
        if depth > self.max_depth {
            return Err(PatchbayError::RecursionLimit {
                limit: self.max_depth,
                pin,
            });
        }
        Ok(())
    }

    fn trace_ground(&mut self, edge: TraceEdge, depth: usize) -> Result<()> {
        let pin = edge.to;
        self.check_depth(depth, pin)?;

        match self.status(pin)? {
            PinStatus::Grounded if !edge.is_root() => return Ok(()),
            PinStatus::Signal => {
                debug!(pin = %pin, "ground stopped at signal pin");
                return Ok(());
            }
            _ => {}
        }

        let core = self.core_mut(pin.device)?;
        let reach = core.direct_reach(pin.pin);
        let marked = reach
            .iter()
            .filter(|&&p| core.promote(p, PinStatus::Grounded))
            .count();
        let next: Vec<Connection> = core
            .connections()
            .iter()
            .filter(|c| !edge.is_reversed_by(c) && reach.contains(&c.from.pin))
            .copied()
            .collect();

        self.report.marked += marked;
        trace!(pin = %pin, ?reach, wires = next.len(), "grounded");

        for connection in next {
            self.report
                .wires
                .push(WireEvent::new(connection, WireColor::Ground));
            self.trace_ground(connection.into(), depth + 1)?;
        }

        Ok(())
    }

    fn trace_signal(&mut self, edge: TraceEdge, path: Vec<String>, depth: usize) -> Result<()> {
        let pin = edge.to;
        self.check_depth(depth, pin)?;

        if let Some(from) = edge.from {
            if self.status(from)? == PinStatus::Grounded {
                trace!(at = %from, ?path, "signal absorbed by ground");
                self.report.absorbed.push(Absorption { at: from, path });
                return Ok(());
            }
        }

        match (self.status(pin)?, edge.from) {
            (PinStatus::Signal, Some(from)) => {
                let contention = SignalContention { from, at: pin, path };
                warn!(%contention, "signal contention");
                self.report.contentions.push(contention);
                return Ok(());
            }
            (PinStatus::Grounded, _) => return Ok(()),
            _ => {}
        }

        let core = self.core_mut(pin.device)?;
        let direct = core.direct_reach(pin.pin);
        let taps = core.tap_reach(pin.pin);

        let marked = direct
            .iter()
            .chain(taps.iter().map(|(p, _)| p))
            .filter(|&&p| core.promote(p, PinStatus::Signal))
            .count();

        let mut bus: Vec<Connection> = Vec::new();
        let mut tapped: Vec<(Connection, RelationType)> = Vec::new();
        for connection in core.connections() {
            if edge.is_reversed_by(connection) {
                continue;
            }
            if direct.contains(&connection.from.pin) {
                bus.push(*connection);
            }
            if let Some(&(_, kind)) = taps.iter().find(|(p, _)| *p == connection.from.pin) {
                tapped.push((*connection, kind));
            }
        }

        self.report.marked += marked;
        if let Some(from) = edge.from {
            self.report.wires.push(WireEvent::new(
                Connection { from, to: pin },
                WireColor::Signal,
            ));
        }
        trace!(pin = %pin, ?direct, ?taps, "signal");

        for connection in bus {
            self.trace_signal(connection.into(), path.clone(), depth + 1)?;
        }

        for (connection, kind) in tapped {
            let mut branch = path.clone();
            branch.push(format!("{}_{}", connection.from.device.0, kind));
            self.trace_signal(connection.into(), branch, depth + 1)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{DeviceKind, Out, Pickup};

    fn wire(devices: &mut [Device], a: PinRef, b: PinRef) {
        let connection = Connection { from: a, to: b };
        devices[a.device.0].core_mut().push_connection(connection);
        devices[b.device.0].core_mut().push_connection(connection.mirrored());
    }

    fn status(devices: &[Device], pin: PinRef) -> PinStatus {
        devices[pin.device.0].core().status(pin.pin).unwrap()
    }

    #[test]
    fn test_ground_expands_over_generic_device() {
        let mut devices = vec![
            Device::new(DeviceKind::Out),
            Device::new(DeviceKind::Generic),
            Device::new(DeviceKind::Pickup),
        ];
        wire(&mut devices, PinRef::new(0, Out::GROUND), PinRef::new(1, 0));
        wire(&mut devices, PinRef::new(1, 1), PinRef::new(2, Pickup::END));

        let report = Tracer::new(&mut devices, &TraceConfig::default())
            .ground(PinRef::new(0, Out::GROUND))
            .unwrap();

        assert_eq!(status(&devices, PinRef::new(1, 0)), PinStatus::Grounded);
        assert_eq!(status(&devices, PinRef::new(1, 1)), PinStatus::Grounded);
        assert_eq!(status(&devices, PinRef::new(2, Pickup::END)), PinStatus::Grounded);
        assert_eq!(status(&devices, PinRef::new(2, Pickup::START)), PinStatus::Break);
        assert_eq!(report.wires.len(), 2);
        assert!(report.wires.iter().all(|w| w.color == WireColor::Ground));
    }

    #[test]
    fn test_ground_terminates_on_loops() {
        // Two generic devices wired into a ring
        let mut devices = vec![
            Device::new(DeviceKind::Out),
            Device::new(DeviceKind::Generic),
            Device::new(DeviceKind::Generic),
        ];
        wire(&mut devices, PinRef::new(0, Out::GROUND), PinRef::new(1, 0));
        wire(&mut devices, PinRef::new(1, 1), PinRef::new(2, 0));
        wire(&mut devices, PinRef::new(2, 1), PinRef::new(1, 0));

        Tracer::new(&mut devices, &TraceConfig::default())
            .ground(PinRef::new(0, Out::GROUND))
            .unwrap();

        for pin in [PinRef::new(1, 0), PinRef::new(1, 1), PinRef::new(2, 0), PinRef::new(2, 1)] {
            assert_eq!(status(&devices, pin), PinStatus::Grounded, "{pin}");
        }
    }

    #[test]
    fn test_signal_through_pickup_tap() {
        let mut devices = vec![Device::new(DeviceKind::Pickup), Device::new(DeviceKind::Generic)];
        wire(&mut devices, PinRef::new(0, Pickup::END), PinRef::new(1, 0));

        let report = Tracer::new(&mut devices, &TraceConfig::default())
            .signal(PinRef::new(0, Pickup::START))
            .unwrap();

        assert_eq!(status(&devices, PinRef::new(0, Pickup::START)), PinStatus::Signal);
        assert_eq!(status(&devices, PinRef::new(0, Pickup::END)), PinStatus::Signal);
        assert_eq!(status(&devices, PinRef::new(1, 0)), PinStatus::Signal);
        assert_eq!(status(&devices, PinRef::new(1, 1)), PinStatus::Signal);
        assert!(report.is_clean());
        assert_eq!(
            report.wires,
            vec![WireEvent {
                from: PinRef::new(0, Pickup::END),
                to: PinRef::new(1, 0),
                color: WireColor::Signal,
            }]
        );
    }

    #[test]
    fn test_signal_absorbed_by_ground() {
        let mut devices = vec![
            Device::new(DeviceKind::Pickup),
            Device::new(DeviceKind::Generic),
            Device::new(DeviceKind::Out),
        ];
        wire(&mut devices, PinRef::new(0, Pickup::END), PinRef::new(1, 0));
        wire(&mut devices, PinRef::new(1, 1), PinRef::new(2, Out::GROUND));

        Tracer::new(&mut devices, &TraceConfig::default())
            .ground(PinRef::new(2, Out::GROUND))
            .unwrap();
        let report = Tracer::new(&mut devices, &TraceConfig::default())
            .signal(PinRef::new(0, Pickup::START))
            .unwrap();

        assert_eq!(status(&devices, PinRef::new(0, Pickup::END)), PinStatus::Grounded);
        assert_eq!(status(&devices, PinRef::new(1, 0)), PinStatus::Grounded);
        assert_eq!(report.absorbed.len(), 1);
        assert_eq!(report.absorbed[0].at, PinRef::new(0, Pickup::END));
        assert_eq!(report.absorbed[0].path, vec!["0_SIGNAL_D".to_string()]);
        assert!(report.wires.is_empty());
    }

    #[test]
    fn test_signal_contention_is_reported_not_fatal() {
        // Pickup looped back onto itself through a generic device
        let mut devices = vec![Device::new(DeviceKind::Pickup), Device::new(DeviceKind::Generic)];
        wire(&mut devices, PinRef::new(0, Pickup::END), PinRef::new(1, 0));
        wire(&mut devices, PinRef::new(1, 1), PinRef::new(0, Pickup::START));

        let report = Tracer::new(&mut devices, &TraceConfig::default())
            .signal(PinRef::new(0, Pickup::START))
            .unwrap();

        assert!(!report.is_clean());
        assert!(report
            .contentions
            .iter()
            .any(|c| c.path == vec!["0_SIGNAL_D".to_string()]));
        assert_eq!(status(&devices, PinRef::new(1, 1)), PinStatus::Signal);
    }

    #[test]
    fn test_signal_crosses_return_tap() {
        // Enter the pickup at END, leave at START, loop back to the root
        let mut devices = vec![
            Device::new(DeviceKind::Generic),
            Device::new(DeviceKind::Pickup),
            Device::new(DeviceKind::Generic),
        ];
        wire(&mut devices, PinRef::new(0, 1), PinRef::new(1, Pickup::END));
        wire(&mut devices, PinRef::new(1, Pickup::START), PinRef::new(2, 0));
        wire(&mut devices, PinRef::new(2, 1), PinRef::new(0, 0));

        let report = Tracer::new(&mut devices, &TraceConfig::default())
            .signal(PinRef::new(0, 0))
            .unwrap();

        assert_eq!(status(&devices, PinRef::new(1, Pickup::START)), PinStatus::Signal);
        assert_eq!(status(&devices, PinRef::new(2, 1)), PinStatus::Signal);
        assert!(report
            .contentions
            .iter()
            .any(|c| c.path == vec!["1_SIGNAL_R".to_string()]));
        assert!(report
            .contentions
            .iter()
            .flat_map(|c| &c.path)
            .all(|label| label != "1_SIGNAL_D"));
    }

    #[test]
    fn test_jack_relation_carries_nothing() {
        let tip = PinRef::new(0, Out::TIP);
        let ground = PinRef::new(0, Out::GROUND);

        let mut devices = vec![Device::new(DeviceKind::Out)];
        let report = Tracer::new(&mut devices, &TraceConfig::default())
            .ground(ground)
            .unwrap();
        assert_eq!(status(&devices, tip), PinStatus::Break);
        assert_eq!(report.marked, 0);

        let report = Tracer::new(&mut devices, &TraceConfig::default())
            .signal(tip)
            .unwrap();
        assert_eq!(status(&devices, tip), PinStatus::Signal);
        assert_eq!(status(&devices, ground), PinStatus::Grounded);
        assert_eq!(report.marked, 1);
        assert!(report.absorbed.is_empty());

        // Signal first, then ground: the tip keeps its signal
        let mut devices = vec![Device::new(DeviceKind::Out)];
        Tracer::new(&mut devices, &TraceConfig::default())
            .signal(tip)
            .unwrap();
        Tracer::new(&mut devices, &TraceConfig::default())
            .ground(ground)
            .unwrap();
        assert_eq!(status(&devices, tip), PinStatus::Signal);
    }

    #[test]
    fn test_recursion_limit() {
        let mut devices = vec![Device::new(DeviceKind::Out)];
        for _ in 0..4 {
            devices.push(Device::new(DeviceKind::Generic));
        }
        wire(&mut devices, PinRef::new(0, Out::GROUND), PinRef::new(1, 0));
        for d in 1..4 {
            wire(&mut devices, PinRef::new(d, 1), PinRef::new(d + 1, 0));
        }

        let err = Tracer::new(&mut devices, &TraceConfig::new().with_max_depth(2))
            .ground(PinRef::new(0, Out::GROUND))
            .unwrap_err();
        assert!(matches!(err, PatchbayError::RecursionLimit { limit: 2, .. }));
    }

    #[test]
    fn test_unknown_root() {
        let mut devices = vec![Device::new(DeviceKind::Pickup)];
        let err = Tracer::new(&mut devices, &TraceConfig::default())
            .signal(PinRef::new(0, 5))
            .unwrap_err();
        assert!(matches!(err, PatchbayError::PinNotFound { .. }));

        let err = Tracer::new(&mut devices, &TraceConfig::default())
            .ground(PinRef::new(3, 0))
            .unwrap_err();
        assert!(matches!(err, PatchbayError::DeviceNotFound { .. }));
    }
}
