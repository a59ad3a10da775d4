//! DSL (Domain Specific Language) parser for patch descriptions.
//!
//! The DSL is line-oriented and human-editable. Each line holds one
//! directive.
//!
//! # Grammar Overview
//!
//! ```text
//! patch       = { line }
//! line        = comment | directive | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = device | wire | trace
//! device      = ".device" name kind { param }
//! wire        = ".wire" pin pin
//! trace       = (".ground" | ".signal") pin
//!
//! kind        = "pickup" | "switcher" | "out" | "jack" | "device" | "generic"
//! param       = "mode" '=' number
//! pin         = name '.' (number | pin_kind)
//! pin_kind    = "start" | "end" | "ground" | "point" | "out"
//! name        = (letter | '_') { letter | digit | '_' }
//! ```
//!
//! # Example
//!
//! ```text
//! # Bridge pickup grounded through position 3 of a switch
//! .device NECK    pickup
//! .device BRIDGE  pickup
//! .device SW      switcher mode=2
//! .device JACK    out
//!
//! .wire JACK.ground SW.5
//! .wire SW.7        BRIDGE.end
//!
//! .ground JACK.ground
//! .signal BRIDGE.start
//! ```
//!
//! Wires are collected into a connection matrix by
//! [`Network::from_ast`](crate::network::Network::from_ast); traces are run in
//! file order by the caller.

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

use tracing::debug;

use crate::error::Result;

/// Parse a patch DSL string into an AST.
pub fn parse(input: &str) -> Result<PatchAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    let ast = parser.parse()?;
    debug!(
        devices = ast.devices.len(),
        wires = ast.wires.len(),
        traces = ast.traces.len(),
        "patch parsed"
    );
    Ok(ast)
}

/// Parse a patch DSL file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<PatchAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::PatchbayError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
