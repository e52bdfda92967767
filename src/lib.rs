mod cursor;
mod document;
mod elements;
mod error;
mod matrix;
mod paint;
mod path;
mod path_data;
mod style;
mod tokens;
mod units;

pub use document::{Bounds, Document, Mask, StyledPath};
pub use error::{ErrorKind, ErrorMode, Result, SvgError};
pub use matrix::{Matrix2D, parse_transform_list};
pub use paint::{
    Color, Gradient, GradientDirection, GradientStop, GradientUnits, Paint, Spread, parse_color,
    parse_url_selector,
};
pub use path::{Path, PathOp, Point};
pub use path_data::compile_path_data;
pub use style::{DashOptions, FillRule, JoinOptions, LineCap, LineGap, LineJoin, PathStyle};
pub use tokens::{Token, decode, tokenize};
pub use units::{
    Axis, parse_basic_float, read_float_run, read_fraction, read_number_list, resolve_length,
};

use std::io::Read;

const DEFAULT_MAX_USE_DEPTH: usize = 32;

/// A configured SVG parser. Cheap to clone; holds no per-document state.
#[derive(Debug, Clone)]
pub struct Parser {
    error_mode: ErrorMode,
    max_use_depth: usize,
}

impl Parser {
    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    pub fn parse_str(&self, text: &str) -> Result<Document> {
        let tokens = tokenize(text)?;
        cursor::Cursor::new(self.error_mode, self.max_use_depth).run(tokens)
    }

    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Document> {
        self.parse_str(decode(bytes)?)
    }

    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<Document> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.parse_bytes(&bytes)
    }

    pub fn parse_file(&self, path: impl AsRef<std::path::Path>) -> Result<Document> {
        let path = path.as_ref();
        log::debug!("parsing {}", path.display());
        let bytes = std::fs::read(path)?;
        self.parse_bytes(&bytes)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::default(),
            max_use_depth: DEFAULT_MAX_USE_DEPTH,
        }
    }
}

pub struct ParserBuilder {
    error_mode: ErrorMode,
    max_use_depth: usize,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self {
            error_mode: ErrorMode::default(),
            max_use_depth: DEFAULT_MAX_USE_DEPTH,
        }
    }

    pub fn error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// How deeply `<use>` replays may nest before the parse fails.
    pub fn max_use_depth(mut self, depth: usize) -> Self {
        self.max_use_depth = depth;
        self
    }

    pub fn build(self) -> Result<Parser> {
        if self.max_use_depth == 0 {
            return Err(SvgError::InvalidConfiguration(
                "max_use_depth must be at least 1".to_string(),
            ));
        }
        Ok(Parser {
            error_mode: self.error_mode,
            max_use_depth: self.max_use_depth,
        })
    }
}

impl Default for ParserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses an SVG document held in memory.
pub fn parse(text: &str, mode: ErrorMode) -> Result<Document> {
    Parser {
        error_mode: mode,
        ..Parser::default()
    }
    .parse_str(text)
}

/// Reads and parses the SVG file at `path`.
pub fn parse_file(path: impl AsRef<std::path::Path>, mode: ErrorMode) -> Result<Document> {
    Parser {
        error_mode: mode,
        ..Parser::default()
    }
    .parse_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SHAPES: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 100" width="400" height="200">
  <title>Shapes</title>
  <desc>Basic <!-- c -->shapes</desc>
  <rect x="10" y="10" width="50" height="30" fill="#ff0000"/>
  <rect x="10" y="10" width="0" height="30"/>
  <circle cx="100" cy="50" r="20" stroke="blue" stroke-width="2"/>
  <ellipse cx="150" cy="50" rx="20" ry="10"/>
  <line x1="0" y1="0" x2="200" y2="100" stroke="black"/>
  <polyline points="0,0 10,10 20,0" fill="none" stroke="green"/>
  <polygon points="0,0 10,10 20,0"/>
  <path d="M0 0 L10 10 Z"/>
</svg>"##;

    const DEFS_AND_USE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 100 100">
  <defs>
    <g id="pair" fill="red">
      <rect width="10" height="10"/>
      <circle cx="20" cy="5" r="5" fill="blue"/>
    </g>
    <rect id="single" width="5" height="5" stroke="black"/>
  </defs>
  <use href="#pair" x="10" y="20"/>
  <use xlink:href="#pair" x="50" y="50"/>
  <use href="#single"/>
</svg>"##;

    const GRADIENTS: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 100">
  <defs>
    <linearGradient id="lin" x1="0" y1="0" x2="100%" y2="0">
      <stop offset="0" stop-color="red"/>
      <stop offset="100%" style="stop-color: blue; stop-opacity: 0.5"/>
    </linearGradient>
    <radialGradient id="rad" gradientUnits="userSpaceOnUse" cx="50%" cy="50%" r="10"
        spreadMethod="reflect">
      <stop offset="0.5" stop-color="#00ff00"/>
    </radialGradient>
    <linearGradient id="lin2" href="#lin" x2="0" y2="1"/>
  </defs>
  <rect width="100" height="100" fill="url(#lin)" stroke="url(#rad)"/>
</svg>"##;

    const MASKS: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
  <defs>
    <mask id="m" x="0" y="0" width="100" height="100">
      <rect width="100" height="100" fill="white"/>
      <circle cx="50" cy="50" r="10" fill="black"/>
    </mask>
  </defs>
  <g mask="url(#m)"><rect width="10" height="10"/></g>
</svg>"##;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        std::env::temp_dir().join(format!("svgpath_{}_{}_{}", std::process::id(), nanos, name))
    }

    fn first_point(path: &StyledPath) -> Point {
        match path.path.ops()[0] {
            PathOp::MoveTo(p) => p,
            other => panic!("expected MoveTo, got {other:?}"),
        }
    }

    #[test]
    fn basic_shapes_document() {
        let doc = parse(SHAPES, ErrorMode::Warn).expect("shapes parse");
        assert_eq!(doc.view_box(), Bounds::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(doc.width(), "400");
        assert_eq!(doc.height(), "200");
        assert_eq!(doc.titles(), &["Shapes".to_string()]);
        assert_eq!(doc.descriptions(), &["Basic shapes".to_string()]);
        // the zero-width rect emits nothing
        assert_eq!(doc.paths().len(), 7);
        assert!(doc.warnings().is_empty());

        let rect = &doc.paths()[0];
        assert_eq!(rect.style.fill, Paint::Solid(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(first_point(rect), Point::from_f64(10.0, 10.0));

        let circle = &doc.paths()[1];
        assert_eq!(circle.style.stroke_width, 2.0);
        assert_eq!(circle.style.stroke, Paint::Solid(Color::rgb(0.0, 0.0, 1.0)));
        assert_eq!(first_point(circle), Point::from_f64(120.0, 50.0));

        let polyline = &doc.paths()[4];
        assert!(polyline.style.fill.is_none());
        assert_eq!(polyline.path.len(), 3);
        let polygon = &doc.paths()[5];
        assert_eq!(polygon.path.ops().last(), Some(&PathOp::Close));
    }

    #[test]
    fn use_replays_definitions_independently() {
        let doc = parse(DEFS_AND_USE, ErrorMode::Warn).expect("defs parse");
        assert!(doc.warnings().is_empty());
        // two shapes per use of the group, one for the single rect
        assert_eq!(doc.paths().len(), 5);

        let red = Paint::Solid(Color::rgb(1.0, 0.0, 0.0));
        let blue = Paint::Solid(Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(doc.paths()[0].style.fill, red);
        assert_eq!(doc.paths()[1].style.fill, blue);
        assert_eq!(doc.paths()[2].style.fill, red);
        assert_eq!(doc.paths()[3].style.fill, blue);

        assert_eq!(first_point(&doc.paths()[0]), Point::from_f64(10.0, 20.0));
        assert_eq!(first_point(&doc.paths()[2]), Point::from_f64(50.0, 50.0));
        assert_ne!(doc.paths()[0].path, doc.paths()[2].path);

        let single = &doc.paths()[4];
        assert_eq!(first_point(single), Point::from_f64(0.0, 0.0));
        assert_eq!(single.style.fill, Paint::Solid(Color::BLACK));
        assert_eq!(single.style.stroke, Paint::Solid(Color::BLACK));
    }

    #[test]
    fn use_of_undefined_id_is_structural() {
        let src = r##"<svg><use href="#nope"/></svg>"##;
        for mode in [ErrorMode::Strict, ErrorMode::Warn, ErrorMode::Ignore] {
            let err = parse(src, mode).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Structural);
        }
        let err = parse(r#"<svg><use href="other.svg#a"/></svg>"#, ErrorMode::Ignore).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        let err = parse(r#"<svg><use x="3"/></svg>"#, ErrorMode::Ignore).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn recursive_use_hits_depth_limit() {
        let src = r##"<svg><defs><g id="loop"><use href="#loop"/></g></defs><use href="#loop"/></svg>"##;
        let parser = ParserBuilder::new()
            .max_use_depth(4)
            .build()
            .expect("parser");
        let err = parser.parse_str(src).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn percentages_resolve_against_view_box() {
        let src = r#"<svg viewBox="0 0 300 400"><rect width="50%" height="25%" stroke-width="10%"/></svg>"#;
        let doc = parse(src, ErrorMode::Warn).expect("percent parse");
        assert!(doc.warnings().is_empty());
        assert_eq!(doc.paths().len(), 1);
        let styled = &doc.paths()[0];
        assert_eq!(styled.path.bounds(), Some((0.0, 0.0, 150.0, 100.0)));
        let diag = libm::sqrt((300.0f64 * 300.0 + 400.0 * 400.0) / 2.0);
        assert!((styled.style.stroke_width - diag * 0.1).abs() < 1e-9);
    }

    #[test]
    fn linear_and_radial_gradients() {
        let doc = parse(GRADIENTS, ErrorMode::Warn).expect("gradient parse");
        assert!(doc.warnings().is_empty());
        assert_eq!(doc.paths().len(), 1);
        let style = &doc.paths()[0].style;
        assert_eq!(style.fill, Paint::Gradient("lin".into()));
        assert_eq!(style.stroke, Paint::Gradient("rad".into()));

        let lin = doc.gradient("lin").expect("lin");
        assert_eq!(lin.units, GradientUnits::ObjectBoundingBox);
        assert_eq!(
            lin.direction,
            GradientDirection::Linear {
                x1: 0.0,
                y1: 0.0,
                x2: 1.0,
                y2: 0.0
            }
        );
        assert_eq!(lin.stops.len(), 2);
        assert_eq!(lin.stops[1].offset, 1.0);
        assert_eq!(lin.stops[1].opacity, 0.5);
        assert_eq!(lin.stops[1].color, Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(lin.stops[0].opacity, 1.0);

        let rad = doc.gradient("rad").expect("rad");
        assert_eq!(rad.spread, Spread::Reflect);
        match rad.direction {
            GradientDirection::Radial {
                cx,
                cy,
                fx,
                fy,
                r,
                fr,
            } => {
                assert_eq!((cx, cy), (100.0, 50.0));
                assert_eq!((fx, fy), (100.0, 50.0));
                assert_eq!(r, 10.0);
                let diag = libm::sqrt((200.0f64 * 200.0 + 100.0 * 100.0) / 2.0);
                assert!((fr - diag * 0.5).abs() < 1e-9);
            }
            other => panic!("expected radial, got {other:?}"),
        }

        let lin2 = doc.gradient("lin2").expect("lin2");
        assert_eq!(lin2.stops, lin.stops);
        assert_eq!(
            lin2.direction,
            GradientDirection::Linear {
                x1: 0.0,
                y1: 0.0,
                x2: 0.0,
                y2: 1.0
            }
        );
    }

    #[test]
    fn masks_collect_their_own_paths() {
        let doc = parse(MASKS, ErrorMode::Warn).expect("mask parse");
        assert_eq!(doc.paths().len(), 1);
        assert_eq!(doc.paths()[0].style.masks, vec!["m".to_string()]);
        let mask = doc.mask("m").expect("mask m");
        assert_eq!(mask.paths.len(), 2);
        assert_eq!(mask.bounds, Bounds::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(mask.paths[0].style.fill, Paint::Solid(Color::WHITE));
        assert_eq!(mask.transform, Matrix2D::IDENTITY);
    }

    #[test]
    fn group_inside_defs_mask_keeps_definition_balanced() {
        let src = r##"<svg>
  <defs>
    <g id="a" fill="red">
      <mask id="m"><g><rect/></g></mask>
      <rect width="2" height="2"/>
    </g>
  </defs>
  <use href="#a"/>
</svg>"##;
        let doc = parse(src, ErrorMode::Strict).expect("parse");
        assert!(doc.mask("m").is_some());
        assert_eq!(doc.paths().len(), 1);
        assert_eq!(
            doc.paths()[0].style.fill,
            Paint::Solid(Color::rgb(1.0, 0.0, 0.0))
        );
    }

    #[test]
    fn extreme_arc_endpoints_parse_without_panicking() {
        let src = r#"<svg><path d="M1e308 0 A1 1 0 0 1 -1e308 0"/><rect x="1e308" width="1e308" height="1" rx="1"/></svg>"#;
        let doc = parse(src, ErrorMode::Strict).expect("parse");
        assert_eq!(doc.paths().len(), 2);
        assert_eq!(doc.paths()[0].path.len(), 2);
    }

    #[test]
    fn invalid_input_is_empty_document_in_every_mode() {
        for mode in [ErrorMode::Strict, ErrorMode::Warn, ErrorMode::Ignore] {
            let err = parse("dummy", mode).unwrap_err();
            assert!(matches!(err, SvgError::EmptyDocument), "{mode:?}: {err:?}");
        }
    }

    #[test]
    fn unknown_element_follows_error_mode() {
        let src = r#"<svg><text>hi</text><rect width="1" height="1"/></svg>"#;

        let err = parse(src, ErrorMode::Strict).unwrap_err();
        assert!(matches!(err, SvgError::UnrecognizedElement(ref t) if t == "text"));

        let doc = parse(src, ErrorMode::Warn).expect("warn parse");
        assert_eq!(doc.paths().len(), 1);
        assert_eq!(doc.warnings().len(), 1);
        assert!(doc.warnings()[0].contains("<text>"));

        let doc = parse(src, ErrorMode::Ignore).expect("ignore parse");
        assert_eq!(doc.paths().len(), 1);
        assert!(doc.warnings().is_empty());
    }

    #[test]
    fn unknown_style_value_follows_error_mode() {
        let src = r#"<svg><rect width="1" height="1" fill-rule="sideways" stroke-linecap="round"/></svg>"#;
        let err = parse(src, ErrorMode::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedStyleValue);

        let doc = parse(src, ErrorMode::Warn).expect("warn parse");
        assert_eq!(doc.warnings().len(), 1);
        let style = &doc.paths()[0].style;
        assert_eq!(style.fill_rule, FillRule::NonZero);
        assert_eq!(style.join.trail_line_cap, LineCap::Round);
    }

    #[test]
    fn structural_errors_ignore_error_mode() {
        let odd = r#"<svg><polygon points="0,0 10,10 20"/></svg>"#;
        let err = parse(odd, ErrorMode::Ignore).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);

        let bad_number = r#"<svg><rect width="wide" height="1"/></svg>"#;
        let err = parse(bad_number, ErrorMode::Ignore).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedValue);

        let bad_transform = r#"<svg><g transform="rotate(1,2)"/></svg>"#;
        let err = parse(bad_transform, ErrorMode::Ignore).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterMismatch);

        let bad_view_box = r#"<svg viewBox="0 0 10"/>"#;
        let err = parse(bad_view_box, ErrorMode::Ignore).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterMismatch);
    }

    #[test]
    fn zero_sized_shapes_are_skipped() {
        let src = r#"<svg><rect width="0" height="5"/><rect width="5" height="0"/><circle r="0"/><ellipse rx="3"/></svg>"#;
        let doc = parse(src, ErrorMode::Strict).expect("parse");
        assert!(doc.paths().is_empty());
    }

    #[test]
    fn polylines_need_three_points() {
        let src = r#"<svg><polyline points="0,0 10,10"/><polygon points="0 0 5 5"/><polyline points="0,0 10,10 20,0"/></svg>"#;
        let doc = parse(src, ErrorMode::Strict).expect("parse");
        assert_eq!(doc.paths().len(), 1);
        assert_eq!(doc.paths()[0].path.len(), 3);
    }

    #[test]
    fn direct_attribute_beats_style_attribute() {
        let src = r#"<svg><rect width="1" height="1" style="fill:blue;stroke:red" fill="lime"/></svg>"#;
        let doc = parse(src, ErrorMode::Strict).expect("parse");
        let style = &doc.paths()[0].style;
        assert_eq!(style.fill, Paint::Solid(Color::rgb(0.0, 1.0, 0.0)));
        assert_eq!(style.stroke, Paint::Solid(Color::rgb(1.0, 0.0, 0.0)));
    }

    #[test]
    fn emitted_styles_are_frozen() {
        let src = r#"<svg><g fill="red" transform="translate(10,0)"><rect transform="scale(2)" width="1" height="1"/></g><rect width="1" height="1"/></svg>"#;
        let doc = parse(src, ErrorMode::Strict).expect("parse");
        assert_eq!(doc.paths().len(), 2);
        let inner = &doc.paths()[0].style;
        assert_eq!(inner.fill, Paint::Solid(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(inner.transform.transform_point(1.0, 1.0), (12.0, 2.0));
        let outer = &doc.paths()[1].style;
        assert_eq!(outer.fill, Paint::Solid(Color::BLACK));
        assert_eq!(outer.transform, Matrix2D::IDENTITY);
    }

    #[test]
    fn opacity_accumulates_through_groups() {
        let src = r#"<svg><g opacity="0.5"><g fill-opacity="0.5"><rect width="1" height="1"/></g></g></svg>"#;
        let doc = parse(src, ErrorMode::Strict).expect("parse");
        let style = &doc.paths()[0].style;
        assert_eq!(style.fill_opacity, 0.25);
        assert_eq!(style.stroke_opacity, 0.5);
    }

    #[test]
    fn parse_file_and_reader() {
        let path = temp_path("shapes.svg");
        std::fs::write(&path, SHAPES).expect("write temp svg");
        let doc = parse_file(&path, ErrorMode::Warn).expect("parse file");
        assert_eq!(doc.paths().len(), 7);
        let _ = std::fs::remove_file(&path);

        let err = parse_file(temp_path("missing.svg"), ErrorMode::Warn).unwrap_err();
        assert!(matches!(err, SvgError::Io(_)));

        let parser = Parser::default();
        let doc = parser.parse_reader(MASKS.as_bytes()).expect("reader");
        assert_eq!(doc.masks().len(), 1);
    }

    #[test]
    fn builder_rejects_zero_use_depth() {
        let err = ParserBuilder::new().max_use_depth(0).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        let parser = ParserBuilder::new()
            .error_mode(ErrorMode::Strict)
            .build()
            .expect("parser");
        assert_eq!(parser.error_mode(), ErrorMode::Strict);
    }
}
