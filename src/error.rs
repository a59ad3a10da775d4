//! Error types for the patch-bay engine.
//!
//! This module provides a unified error type [`PatchbayError`] that covers
//! all error conditions that can occur during patch parsing, topology
//! construction, and tracing.
//!
//! Signal contention is not an error; it is reported through
//! [`TraceReport`](crate::trace::TraceReport).

use thiserror::Error;

use crate::network::{DeviceId, PinRef};

/// Result type alias using [`PatchbayError`].
pub type Result<T> = std::result::Result<T, PatchbayError>;

/// Unified error type for all patch-bay operations.
#[derive(Error, Debug)]
pub enum PatchbayError {
    // ============ DSL Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Unknown device kind in a `.device` declaration
    #[error("Unknown device kind '{kind}' at line {line}")]
    UnknownDeviceKind { kind: String, line: usize },

    /// Device name declared twice
    #[error("Duplicate device name '{name}' at line {line}")]
    DuplicateDevice { name: String, line: usize },

    /// Reference to a device name that was never declared
    #[error("Undefined device '{name}' referenced at line {line}")]
    UnknownDevice { name: String, line: usize },

    /// Pin selector that does not match any pin of the device
    #[error("Device '{device}' has no pin '{pin}' (line {line})")]
    InvalidPin {
        device: String,
        pin: String,
        line: usize,
    },

    // ============ Topology Errors ============
    /// Device index outside the network
    #[error("Device {device} not found in network")]
    DeviceNotFound { device: DeviceId },

    /// Pin index outside the device
    #[error("Pin {pin} not found")]
    PinNotFound { pin: PinRef },

    /// Linear pin index outside the pin index
    #[error("Linear pin index {index} out of range (network has {pin_count} pins)")]
    PinIndexOutOfRange { index: usize, pin_count: usize },

    /// Mode selection on a device that has no modes
    #[error("Device {device} is not a switcher")]
    NotASwitcher { device: DeviceId },

    /// Mode outside the switcher's mode groups
    #[error("Invalid mode index {mode} (switcher has {modes} modes)")]
    InvalidModeIndex { mode: usize, modes: usize },

    /// Connection matrix that does not describe the whole network
    #[error("Incomplete topology: {message}")]
    IncompleteTopology { message: String },

    /// Relation set that is not closed under reversal
    #[error("Malformed relations on device {device}: {message}")]
    MalformedRelations { device: DeviceId, message: String },

    /// Vector enumeration wider than the supported ceiling
    #[error("Cannot enumerate 2^{length} vectors (limit is 2^{limit})")]
    EnumerationTooLarge { length: usize, limit: usize },

    // ============ Trace Errors ============
    /// Traversal exceeded the configured depth ceiling
    #[error("Trace exceeded recursion limit of {limit} at pin {pin}")]
    RecursionLimit { limit: usize, pin: PinRef },

    // ============ I/O Errors ============
    /// Error reading patch file
    #[error("Failed to read patch file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a report
    #[error("Output error: {message}")]
    OutputError { message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl PatchbayError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an incomplete topology error
    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::IncompleteTopology {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::OutputError {
            message: message.into(),
        }
    }
}
