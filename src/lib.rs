//! # Patchbay Core
//!
//! Continuity and signal-path tracer for guitar wiring patch-bays.
//!
//! This library provides:
//! - Device models for pickups, three-way switchers, output jacks and plain
//!   two-pin devices, each with an internal relation graph
//! - A network that wires devices together through external connections
//! - Ground and signal propagation with contention diagnostics
//! - Enumeration of every candidate wiring for a pin count
//! - A small line-oriented DSL for describing patches
//!
//! ## Architecture
//!
//! - [`devices`] - Pin kinds, relations and the device variants
//! - [`network`] - Pin index, connections, snapshots
//! - [`trace`] - Ground/signal tracer, reports and observers
//! - [`topology`] - Connection matrices and candidate enumeration
//! - [`dsl`] - Parser for the patch description language
//! - [`report`] - Text and JSON output (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! patchbay trace bench.patch --json
//! patchbay count 14
//! patchbay enumerate 3
//! ```
//!
//! ### Library
//!
//! ```
//! use patchbay_core::devices::{Out, Pickup, PinStatus};
//! use patchbay_core::network::PinRef;
//! use patchbay_core::Network;
//!
//! let mut network = Network::new();
//! let pickup = network.add_device(Pickup::new()).unwrap();
//! let jack = network.add_device(Out::new()).unwrap();
//! network.create_connection(1, 3).unwrap();
//!
//! network.trace_ground(PinRef { device: jack, pin: Out::GROUND }).unwrap();
//! let end = PinRef { device: pickup, pin: Pickup::END };
//! assert_eq!(network.status(end), Some(PinStatus::Grounded));
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmPatchbay } from 'patchbay_core';
//!
//! const bay = WasmPatchbay.from_dsl(patchDsl);
//! const report = JSON.parse(bay.trace_ground(13));
//! ```

pub mod devices;
pub mod dsl;
pub mod error;
pub mod network;
pub mod topology;
pub mod trace;

#[cfg(feature = "cli")]
pub mod report;

// Re-export main types for convenience
pub use error::{PatchbayError, Result};
pub use network::Network;
pub use trace::TraceConfig;

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmPatchbay;
