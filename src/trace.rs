//! Recorded input traces.
//!
//! One polling cycle per line: `<touch> [gpio]`. Values may be hex (`0x`),
//! binary (`0b`) or decimal, with `_` separators. A touch value of `!` marks a
//! cycle where the sensors could not be read. `gpio` defaults to every pin
//! released. `#` starts a comment.

use std::{fs, path::Path};

use crate::error::TraceError;
use crate::gamepad::GPIO_IDLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchReading {
    Mask(u32),
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    /// 1-based line in the source text.
    pub line: usize,
    pub touch: TouchReading,
    pub gpio: u32,
}

pub fn read(path: &Path) -> Result<Vec<Cycle>, TraceError> {
    parse(&fs::read_to_string(path)?)
}

pub fn parse(text: &str) -> Result<Vec<Cycle>, TraceError> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let body = raw.split('#').next().unwrap_or("").trim();
        if body.is_empty() {
            continue;
        }

        let mut fields = body.split_whitespace();
        let syntax = |reason: String| TraceError::Syntax { line, reason };

        let touch = match fields.next() {
            Some("!") => TouchReading::Unavailable,
            Some(tok) => TouchReading::Mask(parse_value(tok).map_err(syntax)?),
            None => continue,
        };
        let gpio = match fields.next() {
            Some(tok) => parse_value(tok).map_err(syntax)?,
            None => GPIO_IDLE,
        };
        if let Some(extra) = fields.next() {
            return Err(syntax(format!("unexpected field '{extra}'")));
        }

        out.push(Cycle { line, touch, gpio });
    }
    Ok(out)
}

pub fn parse_value(tok: &str) -> Result<u32, String> {
    let clean = tok.replace('_', "");
    let parsed = if let Some(hex) = clean
        .strip_prefix("0x")
        .or_else(|| clean.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)
    } else if let Some(bin) = clean
        .strip_prefix("0b")
        .or_else(|| clean.strip_prefix("0B"))
    {
        u32::from_str_radix(bin, 2)
    } else {
        clean.parse::<u32>()
    };
    parsed.map_err(|e| format!("bad value '{tok}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_forms() {
        assert_eq!(parse_value("0x30"), Ok(0x30));
        assert_eq!(parse_value("0b0000_0011_0000"), Ok(0x30));
        assert_eq!(parse_value("48"), Ok(48));
        assert_eq!(parse_value("0xFFFF_FFFF"), Ok(u32::MAX));
        assert!(parse_value("0x1_0000_0000").is_err());
        assert!(parse_value("twelve").is_err());
    }

    #[test]
    fn parses_lines_comments_and_defaults() {
        let text = "\
# header
0x0030

0b11 0xFFFF_FFFB   # dpad down held
!
";
        let cycles = parse(text).unwrap();
        assert_eq!(
            cycles,
            vec![
                Cycle {
                    line: 2,
                    touch: TouchReading::Mask(0x30),
                    gpio: GPIO_IDLE,
                },
                Cycle {
                    line: 4,
                    touch: TouchReading::Mask(0b11),
                    gpio: 0xFFFF_FFFB,
                },
                Cycle {
                    line: 5,
                    touch: TouchReading::Unavailable,
                    gpio: GPIO_IDLE,
                },
            ]
        );
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse("0x1\n0x2 0x3 0x4\n").unwrap_err();
        assert!(matches!(err, TraceError::Syntax { line: 2, .. }));

        let err = parse("0x1\n\nzz\n").unwrap_err();
        assert_eq!(err.to_string().split(':').next(), Some("line 3"));
    }

    #[test]
    fn shipped_trace_parses() {
        let cycles = parse(include_str!("../traces/two_sliders.trace")).unwrap();
        assert_eq!(cycles.len(), 8);
        assert_eq!(cycles[3].gpio, 0xFFFF_FFBF);
        assert_eq!(cycles[6].touch, TouchReading::Unavailable);
    }
}
