use fixed::types::I26F6;
use std::f64::consts::PI;

use crate::matrix::Matrix2D;

/// Kappa for a quarter-circle cubic.
const CIRCLE_K: f64 = 0.5522847498;

/// A coordinate in 1/64 user units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: I26F6,
    pub y: I26F6,
}

impl Point {
    pub fn new(x: I26F6, y: I26F6) -> Self {
        Self { x, y }
    }

    /// Saturates out-of-range values. NaN maps to zero.
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self {
            x: to_fixed(x),
            y: to_fixed(y),
        }
    }

    pub fn x_f64(&self) -> f64 {
        self.x.to_num::<f64>()
    }

    pub fn y_f64(&self) -> f64 {
        self.y.to_num::<f64>()
    }
}

fn to_fixed(v: f64) -> I26F6 {
    if v.is_nan() {
        I26F6::ZERO
    } else {
        I26F6::saturating_from_num(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOp {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// An ordered list of path operations, built up the way a pen moves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    ops: Vec<PathOp>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn extend(&mut self, other: Path) {
        self.ops.extend(other.ops);
    }

    /// Takes the operations out, leaving this path empty.
    pub fn take(&mut self) -> Path {
        std::mem::take(self)
    }

    pub fn start(&mut self, x: f64, y: f64) {
        self.ops.push(PathOp::MoveTo(Point::from_f64(x, y)));
    }

    pub fn line(&mut self, x: f64, y: f64) {
        self.ops.push(PathOp::LineTo(Point::from_f64(x, y)));
    }

    pub fn quad(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.ops.push(PathOp::QuadTo(
            Point::from_f64(cx, cy),
            Point::from_f64(x, y),
        ));
    }

    pub fn cubic(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.ops.push(PathOp::CubicTo(
            Point::from_f64(c1x, c1y),
            Point::from_f64(c2x, c2y),
            Point::from_f64(x, y),
        ));
    }

    pub fn close(&mut self) {
        self.ops.push(PathOp::Close);
    }

    /// Appends an elliptical arc from `(x0, y0)` to `(x, y)` as cubics of at
    /// most a quarter turn each. Zero radii degrade to a straight line.
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        x0: f64,
        y0: f64,
        rx: f64,
        ry: f64,
        x_axis_rotation_deg: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) {
        let mut rx = rx.abs();
        let mut ry = ry.abs();
        if rx == 0.0 || ry == 0.0 {
            self.line(x, y);
            return;
        }
        if x0 == x && y0 == y {
            return;
        }

        let phi = x_axis_rotation_deg.to_radians();
        let (sin_phi, cos_phi) = (libm::sin(phi), libm::cos(phi));

        // endpoint to center parameterization
        let dx2 = (x0 - x) / 2.0;
        let dy2 = (y0 - y) / 2.0;
        let x1p = cos_phi * dx2 + sin_phi * dy2;
        let y1p = -sin_phi * dx2 + cos_phi * dy2;

        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let s = libm::sqrt(lambda);
            rx *= s;
            ry *= s;
        }

        let rx2 = rx * rx;
        let ry2 = ry * ry;
        let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
        let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
        let coef = if den != 0.0 {
            let sign = if large_arc == sweep { -1.0 } else { 1.0 };
            sign * libm::sqrt((num / den).max(0.0))
        } else {
            0.0
        };
        let cxp = coef * (rx * y1p / ry);
        let cyp = coef * (-ry * x1p / rx);
        let cx = cos_phi * cxp - sin_phi * cyp + (x0 + x) / 2.0;
        let cy = sin_phi * cxp + cos_phi * cyp + (y0 + y) / 2.0;
        // coordinates near the f64 limits overflow the center math
        if !(cx.is_finite() && cy.is_finite() && rx.is_finite() && ry.is_finite()) {
            self.line(x, y);
            return;
        }

        let angle = |ux: f64, uy: f64, vx: f64, vy: f64| {
            libm::atan2(ux * vy - uy * vx, ux * vx + uy * vy)
        };
        let ux = (x1p - cxp) / rx;
        let uy = (y1p - cyp) / ry;
        let vx = (-x1p - cxp) / rx;
        let vy = (-y1p - cyp) / ry;
        let mut theta = angle(1.0, 0.0, ux, uy);
        let mut dtheta = angle(ux, uy, vx, vy);
        if !(theta.is_finite() && dtheta.is_finite()) {
            self.line(x, y);
            return;
        }
        if !sweep && dtheta > 0.0 {
            dtheta -= 2.0 * PI;
        } else if sweep && dtheta < 0.0 {
            dtheta += 2.0 * PI;
        }

        let count = libm::ceil(dtheta.abs() / (PI / 2.0) - 1e-9).max(1.0) as usize;
        let delta = dtheta / count as f64;
        let map = |ux: f64, uy: f64| {
            let (ex, ey) = (rx * ux, ry * uy);
            (
                cx + cos_phi * ex - sin_phi * ey,
                cy + sin_phi * ex + cos_phi * ey,
            )
        };
        for i in 0..count {
            let t1 = theta;
            let t2 = theta + delta;
            let k = (4.0 / 3.0) * libm::tan(delta / 4.0);
            let (s1, c1) = (libm::sin(t1), libm::cos(t1));
            let (s2, c2) = (libm::sin(t2), libm::cos(t2));
            let (c1x, c1y) = map(c1 - k * s1, s1 + k * c1);
            let (c2x, c2y) = map(c2 + k * s2, s2 - k * c2);
            // land exactly on the requested end point
            let (ex, ey) = if i + 1 == count { (x, y) } else { map(c2, s2) };
            self.cubic(c1x, c1y, c2x, c2y, ex, ey);
            theta = t2;
        }
    }

    /// Closed rectangle, optionally with elliptical corners.
    pub fn add_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rx: f64, ry: f64) {
        let rx = rx.clamp(0.0, w / 2.0);
        let ry = ry.clamp(0.0, h / 2.0);
        if rx == 0.0 || ry == 0.0 {
            self.start(x, y);
            self.line(x + w, y);
            self.line(x + w, y + h);
            self.line(x, y + h);
            self.close();
            return;
        }
        self.start(x + rx, y);
        self.line(x + w - rx, y);
        self.arc(x + w - rx, y, rx, ry, 0.0, false, true, x + w, y + ry);
        self.line(x + w, y + h - ry);
        self.arc(x + w, y + h - ry, rx, ry, 0.0, false, true, x + w - rx, y + h);
        self.line(x + rx, y + h);
        self.arc(x + rx, y + h, rx, ry, 0.0, false, true, x, y + h - ry);
        self.line(x, y + ry);
        self.arc(x, y + ry, rx, ry, 0.0, false, true, x + rx, y);
        self.close();
    }

    /// Closed ellipse as four cubics, starting at the rightmost point.
    pub fn add_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) {
        let ox = rx * CIRCLE_K;
        let oy = ry * CIRCLE_K;
        self.start(cx + rx, cy);
        self.cubic(cx + rx, cy + oy, cx + ox, cy + ry, cx, cy + ry);
        self.cubic(cx - ox, cy + ry, cx - rx, cy + oy, cx - rx, cy);
        self.cubic(cx - rx, cy - oy, cx - ox, cy - ry, cx, cy - ry);
        self.cubic(cx + ox, cy - ry, cx + rx, cy - oy, cx + rx, cy);
        self.close();
    }

    /// Bounding box of every point, control points included:
    /// `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut out: Option<(f64, f64, f64, f64)> = None;
        let mut add = |p: &Point| {
            let (x, y) = (p.x_f64(), p.y_f64());
            out = Some(match out {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        };
        for op in &self.ops {
            match op {
                PathOp::MoveTo(p) | PathOp::LineTo(p) => add(p),
                PathOp::QuadTo(c, p) => {
                    add(c);
                    add(p);
                }
                PathOp::CubicTo(c1, c2, p) => {
                    add(c1);
                    add(c2);
                    add(p);
                }
                PathOp::Close => {}
            }
        }
        out
    }

    /// A copy with every point mapped through `m`.
    pub fn transformed(&self, m: &Matrix2D) -> Path {
        let ops = self
            .ops
            .iter()
            .map(|op| match *op {
                PathOp::MoveTo(p) => PathOp::MoveTo(m.transform_fixed(p)),
                PathOp::LineTo(p) => PathOp::LineTo(m.transform_fixed(p)),
                PathOp::QuadTo(c, p) => PathOp::QuadTo(m.transform_fixed(c), m.transform_fixed(p)),
                PathOp::CubicTo(c1, c2, p) => PathOp::CubicTo(
                    m.transform_fixed(c1),
                    m.transform_fixed(c2),
                    m.transform_fixed(p),
                ),
                PathOp::Close => PathOp::Close,
            })
            .collect();
        Path { ops }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end_point(op: &PathOp) -> Option<Point> {
        match *op {
            PathOp::MoveTo(p) | PathOp::LineTo(p) | PathOp::QuadTo(_, p) => Some(p),
            PathOp::CubicTo(_, _, p) => Some(p),
            PathOp::Close => None,
        }
    }

    #[test]
    fn points_are_quantized_to_sixty_fourths() {
        let p = Point::from_f64(1.0 / 64.0, 10.2);
        assert_eq!(p.x, I26F6::from_bits(1));
        assert!((p.y_f64() - 10.2).abs() <= 1.0 / 64.0);
    }

    #[test]
    fn square_rect_is_five_ops() {
        let mut path = Path::new();
        path.add_round_rect(10.0, 20.0, 30.0, 40.0, 0.0, 0.0);
        assert_eq!(path.len(), 5);
        assert_eq!(path.ops()[0], PathOp::MoveTo(Point::from_f64(10.0, 20.0)));
        assert_eq!(path.ops()[2], PathOp::LineTo(Point::from_f64(40.0, 60.0)));
        assert_eq!(path.ops()[4], PathOp::Close);
    }

    #[test]
    fn rounded_rect_corners_clamp_and_close() {
        let mut path = Path::new();
        path.add_round_rect(0.0, 0.0, 20.0, 10.0, 50.0, 50.0);
        let cubics = path
            .ops()
            .iter()
            .filter(|op| matches!(op, PathOp::CubicTo(..)))
            .count();
        assert_eq!(cubics, 4);
        assert_eq!(path.ops().last(), Some(&PathOp::Close));
        let (x0, y0, x1, y1) = path.bounds().unwrap();
        assert_eq!((x0, y0, x1, y1), (0.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn ellipse_has_four_quadrants() {
        let mut path = Path::new();
        path.add_ellipse(50.0, 50.0, 20.0, 10.0);
        assert_eq!(path.len(), 6);
        assert_eq!(path.ops()[0], PathOp::MoveTo(Point::from_f64(70.0, 50.0)));
        assert_eq!(end_point(&path.ops()[2]), Some(Point::from_f64(30.0, 50.0)));
        assert_eq!(end_point(&path.ops()[4]), Some(Point::from_f64(70.0, 50.0)));
    }

    #[test]
    fn half_circle_arc_splits_into_quarters() {
        let mut path = Path::new();
        path.arc(0.0, 0.0, 10.0, 10.0, 0.0, false, true, 20.0, 0.0);
        assert_eq!(path.len(), 2);
        assert_eq!(end_point(&path.ops()[1]), Some(Point::from_f64(20.0, 0.0)));
        // sweep=1 passes over the top with y pointing down
        let mid = end_point(&path.ops()[0]).unwrap();
        assert!((mid.x_f64() - 10.0).abs() < 0.05);
        assert!((mid.y_f64() + 10.0).abs() < 0.05);
    }

    #[test]
    fn degenerate_arcs() {
        let mut path = Path::new();
        path.arc(0.0, 0.0, 0.0, 5.0, 0.0, false, false, 3.0, 4.0);
        assert_eq!(path.ops(), &[PathOp::LineTo(Point::from_f64(3.0, 4.0))]);
        path.clear();
        path.arc(1.0, 1.0, 5.0, 5.0, 0.0, false, false, 1.0, 1.0);
        assert!(path.is_empty());
    }

    #[test]
    fn nan_and_overflowing_coordinates_do_not_panic() {
        assert_eq!(Point::from_f64(f64::NAN, 2.0), Point::from_f64(0.0, 2.0));
        assert_eq!(Point::from_f64(f64::INFINITY, 0.0).x, I26F6::MAX);

        let mut path = Path::new();
        path.arc(1e308, 0.0, 1.0, 1.0, 0.0, false, true, -1e308, 0.0);
        assert_eq!(path.ops(), &[PathOp::LineTo(Point::from_f64(-1e308, 0.0))]);

        path.clear();
        path.add_round_rect(1e308, 0.0, 1e308, 10.0, 1.0, 1.0);
        assert_eq!(path.ops().first(), Some(&PathOp::MoveTo(Point::from_f64(1e308, 0.0))));
        assert_eq!(path.ops().last(), Some(&PathOp::Close));
    }

    #[test]
    fn transformed_maps_every_point() {
        let mut path = Path::new();
        path.start(1.0, 1.0);
        path.quad(2.0, 2.0, 3.0, 1.0);
        let moved = path.transformed(&Matrix2D::IDENTITY.translate(10.0, 0.0));
        assert_eq!(moved.ops()[0], PathOp::MoveTo(Point::from_f64(11.0, 1.0)));
        assert_eq!(
            moved.ops()[1],
            PathOp::QuadTo(Point::from_f64(12.0, 2.0), Point::from_f64(13.0, 1.0))
        );
        assert_eq!(path.bounds(), Some((1.0, 1.0, 3.0, 2.0)));
        assert_eq!(Path::new().bounds(), None);
    }
}
