//! Pin kinds and propagation status.

use std::fmt;

use serde::Serialize;

/// The fixed role of a pin, assigned when its device is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PinKind {
    /// Signal-side terminal of a pickup coil
    Start,
    /// Return-side terminal of a pickup coil
    End,
    /// Permanently grounded terminal
    Ground,
    /// Plain solder point
    Point,
    /// Output jack tip
    Out,
}

impl PinKind {
    /// Parse a pin kind from its name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "START" => Some(Self::Start),
            "END" => Some(Self::End),
            "GROUND" | "GND" => Some(Self::Ground),
            "POINT" => Some(Self::Point),
            "OUT" | "TIP" => Some(Self::Out),
            _ => None,
        }
    }

    /// Status a pin of this kind starts with.
    pub fn initial_status(&self) -> PinStatus {
        match self {
            Self::Ground => PinStatus::Grounded,
            _ => PinStatus::Break,
        }
    }
}

impl fmt::Display for PinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::End => "END",
            Self::Ground => "GROUND",
            Self::Point => "POINT",
            Self::Out => "OUT",
        };
        f.write_str(name)
    }
}

/// What a trace has established about a pin.
///
/// Transitions are monotonic within a session: only `Break -> Grounded` and
/// `Break -> Signal` ever happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PinStatus {
    /// Not reached by any trace
    #[default]
    Break,
    /// Tied to a ground source
    Grounded,
    /// Carries signal from the injection point
    Signal,
}

impl fmt::Display for PinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Break => "BREAK",
            Self::Grounded => "GROUNDED",
            Self::Signal => "SIGNAL",
        };
        f.write_str(name)
    }
}
