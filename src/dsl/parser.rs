//! Parser for the patch DSL.

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use crate::devices::DeviceKind;
use crate::error::{PatchbayError, Result};

/// Parser for patch DSL.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire patch description.
    pub fn parse(&mut self) -> Result<PatchAst> {
        let mut ast = PatchAst::new();

        while self.current.kind != TokenKind::Eof {
            // Skip empty lines
            if self.current.kind == TokenKind::Newline {
                self.advance()?;
                continue;
            }

            if self.current.kind != TokenKind::Directive {
                return Err(PatchbayError::parse(
                    self.current.line,
                    format!("expected a directive, got {:?}", self.current.text),
                ));
            }
            self.parse_directive(&mut ast)?;

            match self.current.kind {
                TokenKind::Newline => self.advance()?,
                TokenKind::Eof => {}
                _ => {
                    return Err(PatchbayError::parse(
                        self.current.line,
                        format!("unexpected trailing token {:?}", self.current.text),
                    ));
                }
            }
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(PatchbayError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    fn parse_directive(&mut self, ast: &mut PatchAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".device" => {
                let device = self.parse_device_def(line)?;
                ast.devices.push(device);
            }
            ".wire" => {
                let a = self.parse_pin_spec()?;
                let b = self.parse_pin_spec()?;
                ast.wires.push(WireDef { a, b, line });
            }
            ".ground" => {
                let root = self.parse_pin_spec()?;
                ast.traces.push(TraceDef {
                    kind: TraceKind::Ground,
                    root,
                    line,
                });
            }
            ".signal" => {
                let root = self.parse_pin_spec()?;
                ast.traces.push(TraceDef {
                    kind: TraceKind::Signal,
                    root,
                    line,
                });
            }
            _ => {
                return Err(PatchbayError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_device_def(&mut self, line: usize) -> Result<DeviceDef> {
        let name = self.expect(TokenKind::Identifier)?.text;
        if name.contains('.') {
            return Err(PatchbayError::parse(
                line,
                format!("device name '{}' must not contain '.'", name),
            ));
        }

        let kind_text = self.expect(TokenKind::Identifier)?.text;
        let kind = DeviceKind::from_keyword(&kind_text).ok_or(PatchbayError::UnknownDeviceKind {
            kind: kind_text,
            line,
        })?;

        let mut mode = None;

        // Parse parameters: key=value
        while self.current.kind == TokenKind::Identifier {
            let param = self.expect(TokenKind::Identifier)?.text;
            self.expect(TokenKind::Equals)?;
            let value = self.expect(TokenKind::Number)?.text;

            match param.to_lowercase().as_str() {
                "mode" => {
                    let parsed = value.parse::<usize>().map_err(|_| {
                        PatchbayError::parse(line, format!("invalid mode: {}", value))
                    })?;
                    mode = Some(parsed);
                }
                _ => {
                    return Err(PatchbayError::parse(
                        line,
                        format!("unknown device parameter: {}", param),
                    ));
                }
            }
        }

        Ok(DeviceDef {
            name,
            kind,
            mode,
            line,
        })
    }

    fn parse_pin_spec(&mut self) -> Result<PinSpec> {
        let tok = self.expect(TokenKind::Identifier)?;

        let (device, pin) = tok.text.split_once('.').ok_or_else(|| {
            PatchbayError::parse(
                tok.line,
                format!("expected <device>.<pin>, got '{}'", tok.text),
            )
        })?;

        let selector = PinSelector::parse(pin).ok_or_else(|| {
            PatchbayError::parse(tok.line, format!("invalid pin selector '{}'", pin))
        })?;

        Ok(PinSpec {
            device: device.to_string(),
            pin: selector,
            line: tok.line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::PinKind;

    const BENCH: &str = "\
# two pickups through a three-way switch
.device P0 pickup
.device P1 pickup
.device S switcher mode=2
.device O out

.wire O.ground S.5
.wire S.7 P1.end

.ground O.ground
.signal P1.start
";

    #[test]
    fn test_parse_bench() {
        let ast = super::super::parse(BENCH).unwrap();
        assert_eq!(ast.devices.len(), 4);
        assert_eq!(ast.devices[2].name, "S");
        assert_eq!(ast.devices[2].kind, DeviceKind::Switcher);
        assert_eq!(ast.devices[2].mode, Some(2));
        assert_eq!(ast.devices[3].kind, DeviceKind::Out);

        assert_eq!(ast.wires.len(), 2);
        assert_eq!(ast.wires[0].a.device, "O");
        assert_eq!(ast.wires[0].a.pin, PinSelector::Kind(PinKind::Ground));
        assert_eq!(ast.wires[0].b.pin, PinSelector::Index(5));
        assert_eq!(ast.wires[0].line, 7);

        assert_eq!(ast.traces.len(), 2);
        assert_eq!(ast.traces[0].kind, TraceKind::Ground);
        assert_eq!(ast.traces[1].kind, TraceKind::Signal);
        assert_eq!(ast.traces[1].root.to_string(), "P1.START");
    }

    #[test]
    fn test_unknown_device_kind() {
        let err = super::super::parse(".device A amplifier").unwrap_err();
        assert!(matches!(
            err,
            PatchbayError::UnknownDeviceKind { line: 1, .. }
        ));
    }

    #[test]
    fn test_bad_pin_reference() {
        assert!(super::super::parse(".wire A B.1").is_err());
        assert!(super::super::parse(".wire A.x B.1").is_err());
    }

    #[test]
    fn test_unknown_directive_and_trailing_tokens() {
        assert!(super::super::parse(".solder A.1").is_err());
        assert!(super::super::parse(".ground O.1 O.0").is_err());
        assert!(super::super::parse("pickup P").is_err());
    }
}
