//! The patch-bay network.

use std::collections::HashMap;

use tracing::{debug, info};

use super::snapshot::{DeviceSnapshot, PinSnapshot, Snapshot};
use super::types::{Connection, DeviceId, PinRef};
use super::validate::{validate_device, validate_matrix};
use crate::devices::{Device, PinStatus};
use crate::dsl::{PatchAst, PinSelector, PinSpec};
use crate::error::{PatchbayError, Result};
use crate::topology::{candidate_count, ConnectionMatrix, MatrixCandidates};
use crate::trace::{
    NetworkEvent, NetworkObserver, TraceConfig, TraceReport, Tracer, WireColor, WireEvent,
};

/// One patch-bay session.
///
/// Owns the devices, the linear pin index, and the registered observers.
/// Pin status only moves forward within a session; start a new `Network`
/// to trace from a clean state.
pub struct Network {
    /// All devices, in insertion order
    devices: Vec<Device>,

    /// Linear pin index: device insertion order, then pin order
    pin_index: Vec<PinRef>,

    /// Device names from a patch description
    names: HashMap<String, DeviceId>,

    /// Tracing configuration
    config: TraceConfig,

    /// Receivers of draw and notify events
    observers: Vec<Box<dyn NetworkObserver>>,
}

impl Network {
    /// Create an empty network with default configuration.
    pub fn new() -> Self {
        Self::with_config(TraceConfig::default())
    }

    /// Create an empty network with custom configuration.
    pub fn with_config(config: TraceConfig) -> Self {
        Self {
            devices: Vec::new(),
            pin_index: Vec::new(),
            names: HashMap::new(),
            config,
            observers: Vec::new(),
        }
    }

    /// Build a network from a parsed patch.
    ///
    /// Devices are added in declaration order, switch positions applied, and
    /// every `.wire` collected into one connection matrix which is then
    /// materialized. Traces are not run.
    pub fn from_ast(ast: &PatchAst, config: TraceConfig) -> Result<Self> {
        let mut network = Self::with_config(config);

        for def in &ast.devices {
            if network.names.contains_key(&def.name) {
                return Err(PatchbayError::DuplicateDevice {
                    name: def.name.clone(),
                    line: def.line,
                });
            }

            let mut device = Device::new(def.kind);
            if let Some(mode) = def.mode {
                device
                    .as_switcher_mut()
                    .ok_or_else(|| {
                        PatchbayError::parse(
                            def.line,
                            format!("'{}' is a {} and has no modes", def.name, def.kind),
                        )
                    })?
                    .set_mode(mode)?;
            }

            let id = network.add_device(device)?;
            network.names.insert(def.name.clone(), id);
        }

        let mut matrix = ConnectionMatrix::new(network.pin_count());
        for wire in &ast.wires {
            let a = network.find_pin(&wire.a)?;
            let b = network.find_pin(&wire.b)?;
            if a == b {
                return Err(PatchbayError::parse(
                    wire.line,
                    format!("wire joins {} to itself", wire.a),
                ));
            }
            let i = network.linear_position(a, wire.line)?;
            let j = network.linear_position(b, wire.line)?;
            matrix.connect(i, j);
        }
        network.apply_connections(&matrix)?;

        Ok(network)
    }

    /// Register an observer for draw and notify events.
    pub fn subscribe(&mut self, observer: impl NetworkObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, event: NetworkEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }

    /// Add a device and rebuild the pin index.
    ///
    /// Observers receive the new pin count together with the number of
    /// candidate wirings it allows.
    pub fn add_device(&mut self, device: impl Into<Device>) -> Result<DeviceId> {
        let device = device.into();
        let id = DeviceId(self.devices.len());
        validate_device(id, &device)?;

        info!(device = %id, kind = %device.kind(), "device added");
        self.devices.push(device);
        self.rebuild_pin_index();

        let pins = self.pin_count();
        self.notify(NetworkEvent::PinCountChanged {
            pins,
            candidates: candidate_count(pins),
        });

        Ok(id)
    }

    fn rebuild_pin_index(&mut self) {
        self.pin_index = self
            .devices
            .iter()
            .enumerate()
            .flat_map(|(device, d)| (0..d.core().pin_count()).map(move |pin| PinRef::new(device, pin)))
            .collect();
    }

    /// All devices, in insertion order.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, id: DeviceId) -> Result<&Device> {
        self.devices
            .get(id.0)
            .ok_or(PatchbayError::DeviceNotFound { device: id })
    }

    /// Look up a device by its patch name.
    pub fn device_id(&self, name: &str) -> Option<DeviceId> {
        self.names.get(name).copied()
    }

    /// Total number of pins across all devices.
    pub fn pin_count(&self) -> usize {
        self.pin_index.len()
    }

    /// The linear pin index.
    pub fn pin_index(&self) -> &[PinRef] {
        &self.pin_index
    }

    /// Resolve a linear pin index.
    pub fn resolve(&self, index: usize) -> Result<PinRef> {
        self.pin_index
            .get(index)
            .copied()
            .ok_or(PatchbayError::PinIndexOutOfRange {
                index,
                pin_count: self.pin_count(),
            })
    }

    /// Linear index of a pin.
    pub fn linear_index(&self, pin: PinRef) -> Option<usize> {
        self.pin_index.iter().position(|&p| p == pin)
    }

    fn linear_position(&self, pin: PinRef, line: usize) -> Result<usize> {
        self.linear_index(pin)
            .ok_or_else(|| PatchbayError::parse(line, format!("pin {} is not indexed", pin)))
    }

    /// Resolve a `device.pin` reference from a patch description.
    pub fn find_pin(&self, spec: &PinSpec) -> Result<PinRef> {
        let id = self.device_id(&spec.device).ok_or_else(|| PatchbayError::UnknownDevice {
            name: spec.device.clone(),
            line: spec.line,
        })?;
        let device = self.device(id)?;

        let pin = match spec.pin {
            PinSelector::Index(index) if index < device.core().pin_count() => Some(index),
            PinSelector::Index(_) => None,
            PinSelector::Kind(kind) => device.find_pin(kind),
        };

        pin.map(|pin| PinRef { device: id, pin })
            .ok_or_else(|| PatchbayError::InvalidPin {
                device: spec.device.clone(),
                pin: spec.pin.to_string(),
                line: spec.line,
            })
    }

    /// Select a switcher position.
    pub fn set_mode(&mut self, id: DeviceId, mode: usize) -> Result<()> {
        let device = self
            .devices
            .get_mut(id.0)
            .ok_or(PatchbayError::DeviceNotFound { device: id })?;
        device
            .as_switcher_mut()
            .ok_or(PatchbayError::NotASwitcher { device: id })?
            .set_mode(mode)?;
        info!(device = %id, mode, "switcher mode selected");
        Ok(())
    }

    /// Wire linear pins `a` and `b`.
    ///
    /// Appends mirrored connections to both endpoint devices.
    pub fn create_connection(&mut self, a: usize, b: usize) -> Result<()> {
        let from = self.resolve(a)?;
        let to = self.resolve(b)?;
        let connection = Connection { from, to };

        self.devices[from.device.0]
            .core_mut()
            .push_connection(connection);
        self.devices[to.device.0]
            .core_mut()
            .push_connection(connection.mirrored());

        debug!(%connection, "connection created");
        Ok(())
    }

    /// Materialize every wire in the upper triangle of `matrix`.
    ///
    /// Returns the number of wires created.
    pub fn apply_connections(&mut self, matrix: &ConnectionMatrix) -> Result<usize> {
        validate_matrix(matrix, self.pin_count())?;

        let pairs: Vec<_> = matrix.upper_pairs().collect();
        for &(i, j) in &pairs {
            self.create_connection(i, j)?;
        }

        info!(wires = pairs.len(), "connections applied");
        Ok(pairs.len())
    }

    /// Every stored connection, both directions of each wire.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.devices.iter().flat_map(|d| d.core().connections())
    }

    /// Status of one pin.
    pub fn status(&self, pin: PinRef) -> Option<PinStatus> {
        self.devices.get(pin.device.0)?.core().status(pin.pin)
    }

    /// All pins currently in `status`, in pin index order.
    pub fn pins_with_status(&self, status: PinStatus) -> Vec<PinRef> {
        self.pin_index
            .iter()
            .copied()
            .filter(|&pin| self.status(pin) == Some(status))
            .collect()
    }

    /// Flood ground outward from `root`.
    pub fn trace_ground(&mut self, root: PinRef) -> Result<TraceReport> {
        info!(root = %root, "tracing ground");
        let report = Tracer::new(&mut self.devices, &self.config).ground(root)?;
        self.publish(&report);
        Ok(report)
    }

    /// Propagate signal outward from `root`.
    pub fn trace_signal(&mut self, root: PinRef) -> Result<TraceReport> {
        info!(root = %root, "tracing signal");
        let report = Tracer::new(&mut self.devices, &self.config).signal(root)?;
        self.publish(&report);
        Ok(report)
    }

    fn publish(&mut self, report: &TraceReport) {
        if self.observers.is_empty() {
            return;
        }
        for wire in &report.wires {
            self.notify(NetworkEvent::Wire(*wire));
        }
        for contention in &report.contentions {
            self.notify(NetworkEvent::Contention(contention.clone()));
        }
    }

    /// Send every stored connection to observers as a static wire.
    pub fn emit_wiring(&mut self) {
        let wires: Vec<WireEvent> = self
            .connections()
            .map(|&c| WireEvent::new(c, WireColor::Static))
            .collect();
        for wire in wires {
            self.notify(NetworkEvent::Wire(wire));
        }
    }

    /// Number of candidate wirings for the current pin count.
    pub fn candidate_count(&self) -> Option<u128> {
        candidate_count(self.pin_count())
    }

    /// Iterate over every candidate wiring for the current pin count.
    pub fn candidates(&self) -> Result<MatrixCandidates> {
        MatrixCandidates::new(self.pin_count())
    }

    /// Full device and connection state.
    pub fn snapshot(&self) -> Snapshot {
        let mut names: Vec<Option<String>> = vec![None; self.devices.len()];
        for (name, id) in &self.names {
            names[id.0] = Some(name.clone());
        }

        let devices = self
            .devices
            .iter()
            .zip(names)
            .enumerate()
            .map(|(index, (device, name))| {
                let core = device.core();
                DeviceSnapshot {
                    id: DeviceId(index),
                    name,
                    kind: device.kind(),
                    mode: match device {
                        Device::Switcher(s) => Some(s.mode()),
                        _ => None,
                    },
                    pins: core
                        .pins()
                        .iter()
                        .zip(core.statuses())
                        .map(|(&kind, &status)| PinSnapshot { kind, status })
                        .collect(),
                    connections: core.connections().to_vec(),
                }
            })
            .collect();

        Snapshot {
            pin_count: self.pin_count(),
            devices,
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{DeviceKind, Out, Pickup, Switcher};
    use crate::trace::EventLog;

    /// Two pickups, a switcher in position 2 and an output jack.
    ///
    /// Linear pins: P0 0-1, P1 2-3, S 4-11, O 12-13.
    fn bench() -> Network {
        let mut network = Network::new();
        network.add_device(Pickup::new()).unwrap();
        network.add_device(Pickup::new()).unwrap();
        network.add_device(Switcher::with_mode(2).unwrap()).unwrap();
        network.add_device(Out::new()).unwrap();
        network
    }

    /// O.GROUND to S.5, S.7 to P1.END.
    fn bench_wiring() -> ConnectionMatrix {
        let mut matrix = ConnectionMatrix::new(14);
        matrix.connect(13, 9);
        matrix.connect(11, 3);
        matrix
    }

    const O_GROUND: PinRef = PinRef {
        device: DeviceId(3),
        pin: Out::GROUND,
    };
    const P1_START: PinRef = PinRef {
        device: DeviceId(1),
        pin: Pickup::START,
    };
    const P1_END: PinRef = PinRef {
        device: DeviceId(1),
        pin: Pickup::END,
    };

    #[test]
    fn test_pin_index() {
        let network = bench();
        assert_eq!(network.pin_count(), 14);
        assert_eq!(network.resolve(0).unwrap(), PinRef::new(0, 0));
        assert_eq!(network.resolve(3).unwrap(), P1_END);
        assert_eq!(network.resolve(9).unwrap(), PinRef::new(2, 5));
        assert_eq!(network.resolve(13).unwrap(), O_GROUND);
        assert!(matches!(
            network.resolve(14),
            Err(PatchbayError::PinIndexOutOfRange { index: 14, pin_count: 14 })
        ));
        assert_eq!(network.linear_index(PinRef::new(2, 7)), Some(11));
    }

    #[test]
    fn test_connections_are_mirrored() {
        let mut network = bench();
        network.create_connection(13, 9).unwrap();

        assert_eq!(
            network.devices()[3].core().connections(),
            &[Connection {
                from: O_GROUND,
                to: PinRef::new(2, 5)
            }]
        );
        assert_eq!(
            network.devices()[2].core().connections(),
            &[Connection {
                from: PinRef::new(2, 5),
                to: O_GROUND
            }]
        );
        assert!(network.create_connection(0, 99).is_err());
    }

    #[test]
    fn test_apply_connections_rejects_wrong_size() {
        let mut network = bench();
        let err = network.apply_connections(&ConnectionMatrix::new(13)).unwrap_err();
        assert!(matches!(err, PatchbayError::IncompleteTopology { .. }));
        assert_eq!(network.connections().count(), 0);
    }

    #[test]
    fn test_ground_scenario() {
        let mut network = bench();
        assert_eq!(network.apply_connections(&bench_wiring()).unwrap(), 2);

        network.trace_ground(O_GROUND).unwrap();

        assert_eq!(
            network.pins_with_status(PinStatus::Grounded),
            vec![P1_END, PinRef::new(2, 5), PinRef::new(2, 7), O_GROUND]
        );
        assert_eq!(network.status(PinRef::new(0, 0)), Some(PinStatus::Break));
        assert_eq!(network.status(PinRef::new(0, 1)), Some(PinStatus::Break));
    }

    #[test]
    fn test_ground_trace_is_idempotent() {
        let mut network = bench();
        network.apply_connections(&bench_wiring()).unwrap();

        let first = network.trace_ground(O_GROUND).unwrap();
        let grounded = network.pins_with_status(PinStatus::Grounded);
        let second = network.trace_ground(O_GROUND).unwrap();

        assert_eq!(network.pins_with_status(PinStatus::Grounded), grounded);
        assert_eq!(first.marked, 3);
        assert_eq!(second.marked, 0);
    }

    #[test]
    fn test_signal_without_ground_path() {
        let mut network = bench();
        network.trace_signal(P1_START).unwrap();

        assert_eq!(network.status(P1_START), Some(PinStatus::Signal));
        assert_eq!(network.status(P1_END), Some(PinStatus::Signal));
        assert_eq!(network.status(PinRef::new(0, 0)), Some(PinStatus::Break));
    }

    #[test]
    fn test_ground_dominates_signal() {
        let mut network = bench();
        network.apply_connections(&bench_wiring()).unwrap();

        network.trace_ground(O_GROUND).unwrap();
        let before: Vec<_> = network
            .pin_index()
            .iter()
            .map(|&p| network.status(p))
            .collect();

        let report = network.trace_signal(P1_START).unwrap();

        assert_eq!(network.status(P1_END), Some(PinStatus::Grounded));
        assert_eq!(network.status(P1_START), Some(PinStatus::Signal));
        assert_eq!(report.absorbed.len(), 1);
        assert!(report.is_clean());

        // Nothing that was marked went back or changed sides
        for (&pin, old) in network.pin_index().iter().zip(before) {
            if old != Some(PinStatus::Break) {
                assert_eq!(network.status(pin), old, "{pin}");
            }
        }
    }

    #[test]
    fn test_set_mode_routing() {
        let mut network = bench();
        assert!(network.set_mode(DeviceId(2), 0).is_ok());
        assert!(matches!(
            network.set_mode(DeviceId(0), 1),
            Err(PatchbayError::NotASwitcher { .. })
        ));
        assert!(matches!(
            network.set_mode(DeviceId(2), 3),
            Err(PatchbayError::InvalidModeIndex { mode: 3, modes: 3 })
        ));
        assert!(matches!(
            network.set_mode(DeviceId(9), 0),
            Err(PatchbayError::DeviceNotFound { .. })
        ));

        // Position 0 no longer bridges 5 and 7, so ground stops at S.5
        network.apply_connections(&bench_wiring()).unwrap();
        network.trace_ground(O_GROUND).unwrap();
        assert_eq!(network.status(PinRef::new(2, 7)), Some(PinStatus::Break));
        assert_eq!(network.status(P1_END), Some(PinStatus::Break));
    }

    #[test]
    fn test_observers_receive_events() {
        let log = EventLog::new();
        let mut network = Network::new();
        network.subscribe(log.clone());

        network.add_device(Device::new(DeviceKind::Pickup)).unwrap();
        network.add_device(Device::new(DeviceKind::Out)).unwrap();
        assert_eq!(
            log.events(),
            vec![
                NetworkEvent::PinCountChanged {
                    pins: 2,
                    candidates: Some(2)
                },
                NetworkEvent::PinCountChanged {
                    pins: 4,
                    candidates: Some(64)
                },
            ]
        );

        network.create_connection(1, 3).unwrap();
        log.clear();
        network.trace_ground(PinRef::new(1, Out::GROUND)).unwrap();
        assert_eq!(log.wires(WireColor::Ground).len(), 1);

        log.clear();
        network.emit_wiring();
        assert_eq!(log.wires(WireColor::Static).len(), 2);
    }

    #[test]
    fn test_from_ast() {
        let ast = crate::dsl::parse(
            ".device P0 pickup\n\
             .device P1 pickup\n\
             .device S switcher mode=2\n\
             .device O out\n\
             .wire O.ground S.5\n\
             .wire S.7 P1.end\n",
        )
        .unwrap();
        let mut network = Network::from_ast(&ast, TraceConfig::default()).unwrap();

        assert_eq!(network.device_id("S"), Some(DeviceId(2)));
        assert_eq!(network.connections().count(), 4);

        network.trace_ground(O_GROUND).unwrap();
        assert_eq!(network.status(P1_END), Some(PinStatus::Grounded));
    }

    #[test]
    fn test_from_ast_errors() {
        let duplicate = crate::dsl::parse(".device A pickup\n.device A out").unwrap();
        assert!(matches!(
            Network::from_ast(&duplicate, TraceConfig::default()),
            Err(PatchbayError::DuplicateDevice { line: 2, .. })
        ));

        let unknown = crate::dsl::parse(".device A pickup\n.wire A.0 B.1").unwrap();
        assert!(matches!(
            Network::from_ast(&unknown, TraceConfig::default()),
            Err(PatchbayError::UnknownDevice { .. })
        ));

        let bad_pin = crate::dsl::parse(".device A pickup\n.device B out\n.wire A.ground B.0").unwrap();
        assert!(matches!(
            Network::from_ast(&bad_pin, TraceConfig::default()),
            Err(PatchbayError::InvalidPin { .. })
        ));

        let self_wire = crate::dsl::parse(".device A device\n.wire A.0 A.0").unwrap();
        assert!(matches!(
            Network::from_ast(&self_wire, TraceConfig::default()),
            Err(PatchbayError::ParseError { line: 2, .. })
        ));

        // Same pin named two ways
        let aliased = crate::dsl::parse(".device O out\n.wire O.1 O.ground").unwrap();
        assert!(matches!(
            Network::from_ast(&aliased, TraceConfig::default()),
            Err(PatchbayError::ParseError { line: 2, .. })
        ));

        let moded = crate::dsl::parse(".device A pickup mode=1").unwrap();
        assert!(Network::from_ast(&moded, TraceConfig::default()).is_err());
    }

    #[test]
    fn test_snapshot() {
        let mut network = bench();
        network.apply_connections(&bench_wiring()).unwrap();
        network.trace_ground(O_GROUND).unwrap();

        let snapshot = network.snapshot();
        assert_eq!(snapshot.pin_count, 14);
        assert_eq!(snapshot.devices[2].mode, Some(2));
        assert_eq!(snapshot.devices[3].pins[1].status, PinStatus::Grounded);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"GROUNDED\""));
        assert!(json.contains("\"switcher\""));
    }

    #[test]
    fn test_candidates_follow_pin_count() {
        let mut network = Network::new();
        network.add_device(Device::new(DeviceKind::Generic)).unwrap();
        network.add_device(Device::new(DeviceKind::Generic)).unwrap();
        assert_eq!(network.candidate_count(), Some(64));
        assert_eq!(network.candidates().unwrap().count(), 64);
    }
}
