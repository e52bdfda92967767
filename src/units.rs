use crate::document::Bounds;
use crate::error::{Result, SvgError};

/// Which extent of a bounding box a percentage refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
    /// `sqrt((w² + h²) / 2)`, used for stroke widths, radii and dash values.
    Diagonal,
}

impl Bounds {
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Width => self.w,
            Axis::Height => self.h,
            Axis::Diagonal => libm::sqrt((self.w * self.w + self.h * self.h) / 2.0),
        }
    }

    /// Resolves a length that is either a plain number or a percentage of
    /// this box along `axis`.
    pub fn resolve_length(&self, raw: &str, axis: Axis) -> Result<f64> {
        resolve_length(raw, axis, self)
    }
}

pub fn resolve_length(raw: &str, axis: Axis, bounds: &Bounds) -> Result<f64> {
    let s = raw.trim();
    if let Some(pct) = s.strip_suffix('%') {
        let v = parse_plain(pct.trim_end(), raw)?;
        return Ok(v / 100.0 * bounds.extent(axis));
    }
    parse_basic_float(s)
}

/// Parses a single number. A trailing absolute unit is tolerated and read as
/// user units.
pub fn parse_basic_float(raw: &str) -> Result<f64> {
    let s = raw.trim();
    let s = ["px", "pt", "mm", "cm", "in"]
        .iter()
        .find_map(|unit| s.strip_suffix(unit))
        .unwrap_or(s)
        .trim_end();
    parse_plain(s, raw)
}

fn parse_plain(s: &str, raw: &str) -> Result<f64> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(SvgError::malformed(format!("invalid number '{}'", raw))),
    }
}

/// Reads a gradient stop offset: a fraction or a percentage, clamped to `[0, 1]`.
pub fn read_fraction(raw: &str) -> Result<f64> {
    let s = raw.trim();
    let v = match s.strip_suffix('%') {
        Some(pct) => parse_plain(pct.trim_end(), raw)? / 100.0,
        None => parse_plain(s, raw)?,
    };
    Ok(v.clamp(0.0, 1.0))
}

/// Reads a comma/whitespace separated list of numbers (`viewBox`, `points`,
/// transform arguments). Each token may itself be a compressed run.
pub fn read_number_list(raw: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for token in raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
    {
        out.extend(read_float_run(token)?);
    }
    Ok(out)
}

/// Reads SVG's compressed number syntax, where a sign or a second decimal
/// point starts a new value: `"23.4.56"` is `[23.4, 0.56]`.
pub fn read_float_run(raw: &str) -> Result<Vec<f64>> {
    let mut scanner = NumberScanner::new(raw);
    let mut out = Vec::new();
    loop {
        scanner.skip_separators();
        if scanner.at_end() {
            break;
        }
        match scanner.next_number() {
            Some(v) => out.push(v),
            None => {
                return Err(SvgError::malformed(format!(
                    "invalid number at offset {} in '{}'",
                    scanner.position(),
                    raw
                )));
            }
        }
    }
    Ok(out)
}

pub(crate) struct NumberScanner<'a> {
    bytes: &'a [u8],
    i: usize,
}

impl<'a> NumberScanner<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            i: 0,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.i
    }

    pub(crate) fn at_end(&self) -> bool {
        self.i >= self.bytes.len()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.i).copied()
    }

    pub(crate) fn bump(&mut self) {
        self.i += 1;
    }

    pub(crate) fn skip_separators(&mut self) {
        while let Some(b) = self.peek() {
            if b == b' ' || b == b'\n' || b == b'\r' || b == b'\t' || b == b',' {
                self.i += 1;
            } else {
                break;
            }
        }
    }

    fn eat_digits(&mut self) -> bool {
        let start = self.i;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.i += 1;
        }
        self.i > start
    }

    /// Scans one number. On failure the position is left unchanged.
    pub(crate) fn next_number(&mut self) -> Option<f64> {
        self.skip_separators();
        let start = self.i;

        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.i += 1;
        }
        let mut has = self.eat_digits();
        if self.peek() == Some(b'.') {
            self.i += 1;
            has |= self.eat_digits();
        }
        if !has {
            self.i = start;
            return None;
        }

        // Exponent only when digits follow, so "2e" stays a number and a command.
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.i;
            self.i += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.i += 1;
            }
            if !self.eat_digits() {
                self.i = mark;
            }
        }

        let s = std::str::from_utf8(&self.bytes[start..self.i]).ok()?;
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                self.i = start;
                None
            }
        }
    }

    /// Arc flags are a single `0` or `1` and need no separator.
    pub(crate) fn next_flag(&mut self) -> Option<bool> {
        self.skip_separators();
        match self.peek() {
            Some(b'0') => {
                self.i += 1;
                Some(false)
            }
            Some(b'1') => {
                self.i += 1;
                Some(true)
            }
            _ => None,
        }
    }
}
