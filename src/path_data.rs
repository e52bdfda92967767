use crate::error::{Result, SvgError};
use crate::path::Path;
use crate::units::NumberScanner;

/// Compiles the `d` attribute of a `<path>` into path operations.
///
/// `(dx, dy)` is added to every absolute coordinate; relative commands follow
/// from the shifted current point.
pub fn compile_path_data(d: &str, dx: f64, dy: f64) -> Result<Path> {
    let mut compiler = PathCompiler::new(d, dx, dy);
    compiler.run()?;
    Ok(compiler.path)
}

struct PathCompiler<'a> {
    input: &'a str,
    scan: NumberScanner<'a>,
    path: Path,
    offset: (f64, f64),
    cur: (f64, f64),
    start: (f64, f64),
    // reflected control points for S and T
    last_cubic_ctrl: Option<(f64, f64)>,
    last_quad_ctrl: Option<(f64, f64)>,
}

impl<'a> PathCompiler<'a> {
    fn new(input: &'a str, dx: f64, dy: f64) -> Self {
        Self {
            input,
            scan: NumberScanner::new(input),
            path: Path::new(),
            offset: (dx, dy),
            cur: (dx, dy),
            start: (dx, dy),
            last_cubic_ctrl: None,
            last_quad_ctrl: None,
        }
    }

    fn error(&self, what: &str) -> SvgError {
        SvgError::malformed(format!(
            "{} at offset {} in path data '{}'",
            what,
            self.scan.position(),
            self.input
        ))
    }

    fn run(&mut self) -> Result<()> {
        loop {
            self.scan.skip_separators();
            let Some(b) = self.scan.peek() else {
                return Ok(());
            };
            if !b.is_ascii_alphabetic() {
                return Err(if self.path.is_empty() {
                    self.error("path data must begin with a command")
                } else {
                    self.error("unexpected character")
                });
            }
            self.scan.bump();
            self.command(b as char)?;
        }
    }

    /// Reads one argument group of `N` numbers. `Ok(None)` when no further
    /// group follows; an error when a group is cut short.
    fn group<const N: usize>(&mut self) -> Result<Option<[f64; N]>> {
        let Some(first) = self.scan.next_number() else {
            return Ok(None);
        };
        let mut out = [first; N];
        for slot in out.iter_mut().skip(1) {
            *slot = self
                .scan
                .next_number()
                .ok_or_else(|| self.error("incomplete argument group"))?;
        }
        Ok(Some(out))
    }

    fn first_group<const N: usize>(&mut self, cmd: char) -> Result<[f64; N]> {
        self.group::<N>()?
            .ok_or_else(|| self.error(&format!("command '{}' expects {} arguments", cmd, N)))
    }

    fn arc_group(&mut self) -> Result<Option<(f64, f64, f64, bool, bool, f64, f64)>> {
        let Some([rx, ry, rot]) = self.group::<3>()? else {
            return Ok(None);
        };
        let large = self
            .scan
            .next_flag()
            .ok_or_else(|| self.error("invalid arc flag"))?;
        let sweep = self
            .scan
            .next_flag()
            .ok_or_else(|| self.error("invalid arc flag"))?;
        let [x, y] = self
            .group::<2>()?
            .ok_or_else(|| self.error("incomplete argument group"))?;
        Ok(Some((rx, ry, rot, large, sweep, x, y)))
    }

    fn abs(&self, rel: bool, x: f64, y: f64) -> (f64, f64) {
        if rel {
            (self.cur.0 + x, self.cur.1 + y)
        } else {
            (self.offset.0 + x, self.offset.1 + y)
        }
    }

    fn command(&mut self, cmd: char) -> Result<()> {
        let rel = cmd.is_ascii_lowercase();
        match cmd.to_ascii_uppercase() {
            'M' => {
                let [x, y] = self.first_group::<2>(cmd)?;
                let p = self.abs(rel, x, y);
                self.path.start(p.0, p.1);
                self.cur = p;
                self.start = p;
                // further pairs are implicit linetos
                while let Some([x, y]) = self.group::<2>()? {
                    let p = self.abs(rel, x, y);
                    self.path.line(p.0, p.1);
                    self.cur = p;
                }
                self.reset_ctrl();
            }
            'L' => {
                let mut next = Some(self.first_group::<2>(cmd)?);
                while let Some([x, y]) = next {
                    let p = self.abs(rel, x, y);
                    self.path.line(p.0, p.1);
                    self.cur = p;
                    next = self.group::<2>()?;
                }
                self.reset_ctrl();
            }
            'H' => {
                let mut next = Some(self.first_group::<1>(cmd)?);
                while let Some([x]) = next {
                    let x = if rel { self.cur.0 + x } else { self.offset.0 + x };
                    self.path.line(x, self.cur.1);
                    self.cur.0 = x;
                    next = self.group::<1>()?;
                }
                self.reset_ctrl();
            }
            'V' => {
                let mut next = Some(self.first_group::<1>(cmd)?);
                while let Some([y]) = next {
                    let y = if rel { self.cur.1 + y } else { self.offset.1 + y };
                    self.path.line(self.cur.0, y);
                    self.cur.1 = y;
                    next = self.group::<1>()?;
                }
                self.reset_ctrl();
            }
            'C' => {
                let mut next = Some(self.first_group::<6>(cmd)?);
                while let Some([x1, y1, x2, y2, x, y]) = next {
                    let c1 = self.abs(rel, x1, y1);
                    let c2 = self.abs(rel, x2, y2);
                    let p = self.abs(rel, x, y);
                    self.path.cubic(c1.0, c1.1, c2.0, c2.1, p.0, p.1);
                    self.cur = p;
                    self.last_cubic_ctrl = Some(c2);
                    self.last_quad_ctrl = None;
                    next = self.group::<6>()?;
                }
            }
            'S' => {
                let mut next = Some(self.first_group::<4>(cmd)?);
                while let Some([x2, y2, x, y]) = next {
                    let c1 = reflect(self.last_cubic_ctrl, self.cur);
                    let c2 = self.abs(rel, x2, y2);
                    let p = self.abs(rel, x, y);
                    self.path.cubic(c1.0, c1.1, c2.0, c2.1, p.0, p.1);
                    self.cur = p;
                    self.last_cubic_ctrl = Some(c2);
                    self.last_quad_ctrl = None;
                    next = self.group::<4>()?;
                }
            }
            'Q' => {
                let mut next = Some(self.first_group::<4>(cmd)?);
                while let Some([x1, y1, x, y]) = next {
                    let c = self.abs(rel, x1, y1);
                    let p = self.abs(rel, x, y);
                    self.path.quad(c.0, c.1, p.0, p.1);
                    self.cur = p;
                    self.last_quad_ctrl = Some(c);
                    self.last_cubic_ctrl = None;
                    next = self.group::<4>()?;
                }
            }
            'T' => {
                let mut next = Some(self.first_group::<2>(cmd)?);
                while let Some([x, y]) = next {
                    let c = reflect(self.last_quad_ctrl, self.cur);
                    let p = self.abs(rel, x, y);
                    self.path.quad(c.0, c.1, p.0, p.1);
                    self.cur = p;
                    self.last_quad_ctrl = Some(c);
                    self.last_cubic_ctrl = None;
                    next = self.group::<2>()?;
                }
            }
            'A' => {
                let mut next = Some(
                    self.arc_group()?
                        .ok_or_else(|| self.error("command 'A' expects 7 arguments"))?,
                );
                while let Some((rx, ry, rot, large, sweep, x, y)) = next {
                    let p = self.abs(rel, x, y);
                    self.path
                        .arc(self.cur.0, self.cur.1, rx, ry, rot, large, sweep, p.0, p.1);
                    self.cur = p;
                    next = self.arc_group()?;
                }
                self.reset_ctrl();
            }
            'Z' => {
                self.path.close();
                self.cur = self.start;
                self.reset_ctrl();
            }
            _ => {
                return Err(self.error(&format!("unknown path command '{}'", cmd)));
            }
        }
        Ok(())
    }

    fn reset_ctrl(&mut self) {
        self.last_cubic_ctrl = None;
        self.last_quad_ctrl = None;
    }
}

/// Mirror of the previous control point about `cur`, or `cur` itself.
fn reflect(ctrl: Option<(f64, f64)>, cur: (f64, f64)) -> (f64, f64) {
    match ctrl {
        Some((x, y)) => (2.0 * cur.0 - x, 2.0 * cur.1 - y),
        None => cur,
    }
}
