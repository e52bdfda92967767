use crate::error::{Result, SvgError};
use crate::path::Point;
use crate::units::read_number_list;

/// 2D affine transform.
///
/// ```text
/// [a c e]
/// [b d f]
/// [0 0 1]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix2D {
    pub const IDENTITY: Matrix2D = Matrix2D {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// `self * other`: `other` is applied first, then `self`.
    pub fn multiply(&self, other: &Matrix2D) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn translate(&self, tx: f64, ty: f64) -> Self {
        self.multiply(&Matrix2D::new(1.0, 0.0, 0.0, 1.0, tx, ty))
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        self.multiply(&Matrix2D::new(sx, 0.0, 0.0, sy, 0.0, 0.0))
    }

    /// Rotation by `theta` radians.
    pub fn rotate(&self, theta: f64) -> Self {
        let (s, c) = (libm::sin(theta), libm::cos(theta));
        self.multiply(&Matrix2D::new(c, s, -s, c, 0.0, 0.0))
    }

    pub fn skew_x(&self, theta: f64) -> Self {
        self.multiply(&Matrix2D::new(1.0, 0.0, libm::tan(theta), 1.0, 0.0, 0.0))
    }

    pub fn skew_y(&self, theta: f64) -> Self {
        self.multiply(&Matrix2D::new(1.0, libm::tan(theta), 0.0, 1.0, 0.0, 0.0))
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse by cofactor expansion of the 3x3 form.
    pub fn invert(&self) -> Result<Self> {
        let m = [
            [self.a, self.c, self.e],
            [self.b, self.d, self.f],
            [0.0, 0.0, 1.0],
        ];
        let cofactor = |r: usize, c: usize| -> f64 {
            let rows: Vec<usize> = (0..3).filter(|&i| i != r).collect();
            let cols: Vec<usize> = (0..3).filter(|&j| j != c).collect();
            let minor = m[rows[0]][cols[0]] * m[rows[1]][cols[1]]
                - m[rows[0]][cols[1]] * m[rows[1]][cols[0]];
            if (r + c) % 2 == 0 { minor } else { -minor }
        };

        let det = (0..3).map(|c| m[0][c] * cofactor(0, c)).sum::<f64>();
        if det.abs() < 1e-12 || !det.is_finite() {
            return Err(SvgError::NonInvertible);
        }

        // inverse[i][j] = cofactor(j, i) / det
        let inv = |i: usize, j: usize| cofactor(j, i) / det;
        Ok(Self {
            a: inv(0, 0),
            c: inv(0, 1),
            e: inv(0, 2),
            b: inv(1, 0),
            d: inv(1, 1),
            f: inv(1, 2),
        })
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Like [`Matrix2D::transform_point`] without the translation part.
    pub fn transform_vector(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y, self.b * x + self.d * y)
    }

    pub fn transform_fixed(&self, p: Point) -> Point {
        let (x, y) = self.transform_point(p.x_f64(), p.y_f64());
        Point::from_f64(x, y)
    }

    /// Approximate uniform scale: `sqrt(|det|)`.
    pub fn scale_factor(&self) -> f64 {
        libm::sqrt(self.determinant().abs())
    }

    pub fn approx_eq(&self, other: &Matrix2D, eps: f64) -> bool {
        (self.a - other.a).abs() <= eps
            && (self.b - other.b).abs() <= eps
            && (self.c - other.c).abs() <= eps
            && (self.d - other.d).abs() <= eps
            && (self.e - other.e).abs() <= eps
            && (self.f - other.f).abs() <= eps
    }
}

/// Parses a `transform` attribute value into a single matrix.
///
/// Items are composed so that the rightmost item is applied to the geometry
/// first. Any malformed item rejects the whole list.
pub fn parse_transform_list(input: &str) -> Result<Matrix2D> {
    let mut out = Matrix2D::IDENTITY;
    for (name, args) in split_transform_items(input)? {
        out = out.multiply(&transform_item(name, &args)?);
    }
    Ok(out)
}

fn split_transform_items(input: &str) -> Result<Vec<(&str, Vec<f64>)>> {
    let mut items = Vec::new();
    let mut s = input.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    while !s.is_empty() {
        let Some(open) = s.find('(') else {
            return Err(SvgError::mismatch(format!(
                "badly formed transform '{}'",
                input
            )));
        };
        let Some(close) = s[open + 1..].find(')') else {
            return Err(SvgError::mismatch(format!(
                "unterminated transform '{}'",
                input
            )));
        };
        let name = s[..open].trim();
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(SvgError::mismatch(format!(
                "badly formed transform '{}'",
                input
            )));
        }
        let args = read_number_list(&s[open + 1..open + 1 + close])?;
        items.push((name, args));
        s = s[open + 1 + close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }
    Ok(items)
}

fn transform_item(name: &str, args: &[f64]) -> Result<Matrix2D> {
    let id = Matrix2D::IDENTITY;
    let arity_error = || {
        SvgError::mismatch(format!(
            "{}() does not take {} argument(s)",
            name,
            args.len()
        ))
    };
    let m = match (name.to_ascii_lowercase().as_str(), args) {
        ("rotate", [deg]) => id.rotate(deg.to_radians()),
        ("rotate", [deg, cx, cy]) => id
            .translate(*cx, *cy)
            .rotate(deg.to_radians())
            .translate(-cx, -cy),
        // a lone argument moves both axes
        ("translate", [t]) => id.translate(*t, *t),
        ("translate", [tx, ty]) => id.translate(*tx, *ty),
        ("scale", [s]) => id.scale(*s, *s),
        ("scale", [sx, sy]) => id.scale(*sx, *sy),
        ("skewx", [deg]) => id.skew_x(deg.to_radians()),
        ("skewy", [deg]) => id.skew_y(deg.to_radians()),
        ("matrix", [a, b, c, d, e, f]) => Matrix2D::new(*a, *b, *c, *d, *e, *f),
        ("rotate" | "translate" | "scale" | "skewx" | "skewy" | "matrix", _) => {
            return Err(arity_error());
        }
        _ => {
            return Err(SvgError::mismatch(format!(
                "unknown transform function '{}'",
                name
            )));
        }
    };
    Ok(m)
}
