//! Trace reports for the CLI frontend.
//!
//! Runs the traces declared in a patch and writes the outcome as plain text
//! or JSON.

use std::io::Write;

use serde::Serialize;
use tracing::info;

use crate::dsl::{PatchAst, TraceKind};
use crate::error::{PatchbayError, Result};
use crate::network::{Network, Snapshot};
use crate::topology::ConnectionMatrix;
use crate::trace::{TraceConfig, TraceReport};

/// One executed `.ground` / `.signal` directive.
#[derive(Debug, Clone, Serialize)]
pub struct TraceRun {
    pub kind: TraceKind,
    /// Root pin as written in the patch
    pub root: String,
    pub report: TraceReport,
}

/// Final network state plus every trace that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct PatchReport {
    pub snapshot: Snapshot,
    pub traces: Vec<TraceRun>,
}

impl PatchReport {
    /// Build the network described by `ast` and run its traces in file order.
    pub fn run(ast: &PatchAst, config: TraceConfig) -> Result<Self> {
        let mut network = Network::from_ast(ast, config)?;
        let mut traces = Vec::with_capacity(ast.traces.len());

        for def in &ast.traces {
            let root = network.find_pin(&def.root)?;
            let report = match def.kind {
                TraceKind::Ground => network.trace_ground(root)?,
                TraceKind::Signal => network.trace_signal(root)?,
            };
            traces.push(TraceRun {
                kind: def.kind,
                root: def.root.to_string(),
                report,
            });
        }

        info!(traces = traces.len(), "patch traced");
        Ok(Self {
            snapshot: network.snapshot(),
            traces,
        })
    }

    /// Whether no trace reported signal contention.
    pub fn is_clean(&self) -> bool {
        self.traces.iter().all(|t| t.report.is_clean())
    }
}

fn io_error(e: std::io::Error) -> PatchbayError {
    PatchbayError::output(e.to_string())
}

/// Write a human-readable report.
pub fn write_text(out: &mut impl Write, report: &PatchReport) -> Result<()> {
    let snapshot = &report.snapshot;
    writeln!(out, "pins: {}", snapshot.pin_count).map_err(io_error)?;

    for device in &snapshot.devices {
        let name = device.name.as_deref().unwrap_or("-");
        let header = match device.mode {
            Some(mode) => writeln!(out, "{} {} {} mode={}", device.id, name, device.kind, mode),
            None => writeln!(out, "{} {} {}", device.id, name, device.kind),
        };
        header.map_err(io_error)?;

        for (index, pin) in device.pins.iter().enumerate() {
            writeln!(out, "  {:>2} {:<6} {}", index, pin.kind.to_string(), pin.status).map_err(io_error)?;
        }
    }

    for run in &report.traces {
        writeln!(
            out,
            "{} {}: {} marked, {} wires",
            run.kind,
            run.root,
            run.report.marked,
            run.report.wires.len()
        )
        .map_err(io_error)?;

        for wire in &run.report.wires {
            writeln!(out, "  {} {} -> {}", wire.color, wire.from, wire.to).map_err(io_error)?;
        }
        for absorbed in &run.report.absorbed {
            writeln!(
                out,
                "  absorbed at {} via [{}]",
                absorbed.at,
                absorbed.path.join(", ")
            )
            .map_err(io_error)?;
        }
        for contention in &run.report.contentions {
            writeln!(out, "  {}", contention).map_err(io_error)?;
        }
    }

    Ok(())
}

/// Write the report as pretty-printed JSON.
pub fn write_json(out: &mut impl Write, report: &PatchReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)
        .map_err(|e| PatchbayError::output(e.to_string()))?;
    writeln!(out).map_err(io_error)
}

/// Write candidate matrices, separated by blank lines.
pub fn write_matrices(
    out: &mut impl Write,
    matrices: impl Iterator<Item = ConnectionMatrix>,
) -> Result<usize> {
    let mut written = 0;
    for matrix in matrices {
        if written > 0 {
            writeln!(out).map_err(io_error)?;
        }
        write!(out, "{}", matrix).map_err(io_error)?;
        written += 1;
    }
    Ok(written)
}
