//! WASM bindings for Patchbay Core.
//!
//! Pins are addressed by linear index from JavaScript. Reports and snapshots
//! are returned as JSON strings.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmPatchbay } from 'patchbay_core';
//!
//! await init();
//!
//! const bay = new WasmPatchbay();
//! bay.add_device("pickup");
//! bay.add_device("out");
//! bay.connect(1, 3);
//!
//! const report = JSON.parse(bay.trace_ground(3));
//! const state = JSON.parse(bay.snapshot_json());
//! ```

use wasm_bindgen::prelude::*;

use crate::devices::{Device, DeviceKind};
use crate::dsl;
use crate::error::PatchbayError;
use crate::network::{DeviceId, Network};
use crate::topology::{build_matrix, ConnectionMatrix};
use crate::trace::{TraceConfig, TraceReport};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_error(e: PatchbayError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json(report: &TraceReport) -> Result<String, JsValue> {
    serde_json::to_string(report).map_err(|e| {
        js_error(PatchbayError::WasmError {
            message: e.to_string(),
        })
    })
}

/// WASM-compatible patch-bay session.
#[wasm_bindgen]
pub struct WasmPatchbay {
    network: Network,
}

#[wasm_bindgen]
impl WasmPatchbay {
    /// Create an empty patch-bay.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmPatchbay {
        WasmPatchbay {
            network: Network::new(),
        }
    }

    /// Build a patch-bay from a patch DSL string.
    ///
    /// Trace directives in the patch are not run.
    #[wasm_bindgen]
    pub fn from_dsl(patch_dsl: &str) -> Result<WasmPatchbay, JsValue> {
        let ast = dsl::parse(patch_dsl).map_err(js_error)?;
        let network = Network::from_ast(&ast, TraceConfig::default()).map_err(js_error)?;
        Ok(WasmPatchbay { network })
    }

    /// Add a device by kind keyword (`pickup`, `switcher`, `out`, `device`).
    ///
    /// Returns the new device id.
    #[wasm_bindgen]
    pub fn add_device(&mut self, kind: &str) -> Result<usize, JsValue> {
        let kind = DeviceKind::from_keyword(kind).ok_or_else(|| {
            js_error(PatchbayError::WasmError {
                message: format!("unknown device kind '{}'", kind),
            })
        })?;
        let id = self
            .network
            .add_device(Device::new(kind))
            .map_err(js_error)?;
        Ok(id.0)
    }

    /// Select a switcher position.
    #[wasm_bindgen]
    pub fn set_mode(&mut self, device: usize, mode: usize) -> Result<(), JsValue> {
        self.network
            .set_mode(DeviceId(device), mode)
            .map_err(js_error)
    }

    /// Wire two pins by linear index.
    #[wasm_bindgen]
    pub fn connect(&mut self, a: usize, b: usize) -> Result<(), JsValue> {
        self.network.create_connection(a, b).map_err(js_error)
    }

    /// Apply a flattened `pin_count x pin_count` 0/1 matrix.
    ///
    /// Returns the number of wires created.
    #[wasm_bindgen]
    pub fn apply_matrix(&mut self, flat: &[u8]) -> Result<usize, JsValue> {
        let pins = self.network.pin_count();
        if flat.len() != pins * pins {
            return Err(js_error(PatchbayError::incomplete(format!(
                "expected {} cells for {} pins, got {}",
                pins * pins,
                pins,
                flat.len()
            ))));
        }

        let rows: Vec<Vec<u8>> = flat.chunks(pins.max(1)).map(<[u8]>::to_vec).collect();
        let matrix = ConnectionMatrix::from_rows(&rows).map_err(js_error)?;
        self.network.apply_connections(&matrix).map_err(js_error)
    }

    /// Apply one candidate described by its per-row enumerated vectors.
    ///
    /// `flat` holds `pin_count - 1` vectors of width `pin_count`, back to back.
    #[wasm_bindgen]
    pub fn apply_row_vectors(&mut self, flat: &[u8]) -> Result<usize, JsValue> {
        let pins = self.network.pin_count();
        let rows: Vec<&[u8]> = flat.chunks(pins.max(1)).collect();
        let matrix = build_matrix(pins, &rows).map_err(js_error)?;
        self.network.apply_connections(&matrix).map_err(js_error)
    }

    /// Trace ground from a pin; returns the trace report as JSON.
    #[wasm_bindgen]
    pub fn trace_ground(&mut self, pin: usize) -> Result<String, JsValue> {
        let root = self.network.resolve(pin).map_err(js_error)?;
        let report = self.network.trace_ground(root).map_err(js_error)?;
        to_json(&report)
    }

    /// Trace signal from a pin; returns the trace report as JSON.
    #[wasm_bindgen]
    pub fn trace_signal(&mut self, pin: usize) -> Result<String, JsValue> {
        let root = self.network.resolve(pin).map_err(js_error)?;
        let report = self.network.trace_signal(root).map_err(js_error)?;
        to_json(&report)
    }

    #[wasm_bindgen(getter)]
    pub fn pin_count(&self) -> usize {
        self.network.pin_count()
    }

    /// Number of candidate wirings, as a decimal string.
    ///
    /// Returns `undefined` once the count no longer fits in 128 bits.
    #[wasm_bindgen]
    pub fn candidate_count(&self) -> Option<String> {
        self.network.candidate_count().map(|count| count.to_string())
    }

    /// Full device and connection state as JSON.
    #[wasm_bindgen]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.network.snapshot()).map_err(|e| {
            js_error(PatchbayError::WasmError {
                message: e.to_string(),
            })
        })
    }
}

impl Default for WasmPatchbay {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
