use std::collections::HashMap;

use crate::cursor::Definition;
use crate::matrix::Matrix2D;
use crate::paint::Gradient;
use crate::path::Path;
use crate::style::PathStyle;

/// An axis-aligned box: a view box, a mask region or a percentage reference.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Bounds {
    /// The object bounding box unit square.
    pub const UNIT: Bounds = Bounds {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// A path frozen together with the style in effect when it was emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledPath {
    pub path: Path,
    pub style: PathStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub id: String,
    /// Declared region. Stored as given; not applied to the mask's paths.
    pub bounds: Bounds,
    pub paths: Vec<StyledPath>,
    pub transform: Matrix2D,
}

/// The parsed document. Read-only once returned by the parser.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) view_box: Bounds,
    pub(crate) width: String,
    pub(crate) height: String,
    pub(crate) paths: Vec<StyledPath>,
    pub(crate) titles: Vec<String>,
    pub(crate) descriptions: Vec<String>,
    pub(crate) masks: HashMap<String, Mask>,
    pub(crate) gradients: HashMap<String, Gradient>,
    pub(crate) defs: HashMap<String, Vec<Definition>>,
    pub(crate) warnings: Vec<String>,
}

impl Document {
    pub fn view_box(&self) -> Bounds {
        self.view_box
    }

    /// The `width` attribute of the root element, verbatim.
    pub fn width(&self) -> &str {
        &self.width
    }

    pub fn height(&self) -> &str {
        &self.height
    }

    /// Styled paths in document order.
    pub fn paths(&self) -> &[StyledPath] {
        &self.paths
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    pub fn masks(&self) -> &HashMap<String, Mask> {
        &self.masks
    }

    pub fn mask(&self, id: &str) -> Option<&Mask> {
        self.masks.get(id)
    }

    /// Looks up the gradient a [`crate::Paint::Gradient`] refers to.
    pub fn gradient(&self, id: &str) -> Option<&Gradient> {
        self.gradients.get(id)
    }

    /// Conditions tolerated in warn mode, in the order they occurred.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Maps the view box onto the target rectangle `(x, y, w, h)`.
    ///
    /// The two axes scale independently. A degenerate view box only
    /// translates.
    pub fn viewport_transform(&self, x: f64, y: f64, w: f64, h: f64) -> Matrix2D {
        let vb = self.view_box;
        let sx = if vb.w != 0.0 { w / vb.w } else { 1.0 };
        let sy = if vb.h != 0.0 { h / vb.h } else { 1.0 };
        Matrix2D::IDENTITY
            .translate(x, y)
            .scale(sx, sy)
            .translate(-vb.x, -vb.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_maps_view_box_corners() {
        let doc = Document {
            view_box: Bounds::new(10.0, 20.0, 100.0, 50.0),
            ..Document::default()
        };
        let m = doc.viewport_transform(0.0, 0.0, 200.0, 200.0);
        let (x, y) = m.transform_point(10.0, 20.0);
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
        let (x, y) = m.transform_point(110.0, 70.0);
        assert!((x - 200.0).abs() < 1e-9 && (y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_view_box_only_translates() {
        let doc = Document::default();
        let m = doc.viewport_transform(5.0, 6.0, 100.0, 100.0);
        assert_eq!(m, Matrix2D::IDENTITY.translate(5.0, 6.0));
    }
}
