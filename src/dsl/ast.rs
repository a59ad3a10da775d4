//! Abstract Syntax Tree types for the patch DSL.

use std::fmt;

use serde::Serialize;

use crate::devices::{DeviceKind, PinKind};

/// Complete AST representation of a parsed patch.
#[derive(Debug, Clone, Default)]
pub struct PatchAst {
    /// Device declarations, in file order
    pub devices: Vec<DeviceDef>,
    /// Wire declarations
    pub wires: Vec<WireDef>,
    /// Traces to run, in file order
    pub traces: Vec<TraceDef>,
}

impl PatchAst {
    /// Create a new empty patch AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A `.device` declaration.
#[derive(Debug, Clone)]
pub struct DeviceDef {
    /// Unique device name
    pub name: String,
    pub kind: DeviceKind,
    /// Initial switch position (`mode=N`)
    pub mode: Option<usize>,
    /// Source line number for error reporting
    pub line: usize,
}

/// How a pin is selected on its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinSelector {
    /// Local pin index
    Index(usize),
    /// First pin of this kind
    Kind(PinKind),
}

impl PinSelector {
    /// Parse `3`, `end`, `ground`, ...
    pub fn parse(text: &str) -> Option<Self> {
        if let Ok(index) = text.parse::<usize>() {
            return Some(Self::Index(index));
        }
        PinKind::from_name(text).map(Self::Kind)
    }
}

impl fmt::Display for PinSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{}", index),
            Self::Kind(kind) => write!(f, "{}", kind),
        }
    }
}

/// A `device.pin` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSpec {
    pub device: String,
    pub pin: PinSelector,
    pub line: usize,
}

impl fmt::Display for PinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.device, self.pin)
    }
}

/// A `.wire` declaration.
#[derive(Debug, Clone)]
pub struct WireDef {
    pub a: PinSpec,
    pub b: PinSpec,
    pub line: usize,
}

/// Which tracer a `.ground` / `.signal` directive runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Ground,
    Signal,
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ground => f.write_str("ground"),
            Self::Signal => f.write_str("signal"),
        }
    }
}

/// A trace directive.
#[derive(Debug, Clone)]
pub struct TraceDef {
    pub kind: TraceKind,
    pub root: PinSpec,
    pub line: usize,
}
