use std::collections::HashMap;

use fixed::types::I26F6;

use crate::document::Bounds;
use crate::error::{Result, SvgError};
use crate::matrix::{Matrix2D, parse_transform_list};
use crate::paint::{Color, Gradient, Paint, parse_color, parse_url_selector};
use crate::units::{Axis, parse_basic_float, resolve_length};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    MiterClip,
    ArcClip,
    Round,
    Arc,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
    Cubic,
    Quadratic,
}

/// How the stroker fills the gap on the outside of a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineGap {
    #[default]
    Flat,
    Round,
    Cubic,
    Quadratic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOptions {
    pub miter_limit: I26F6,
    pub line_join: LineJoin,
    /// `stroke-leadlinecap`: cap at the start of an open subpath.
    pub lead_line_cap: LineCap,
    /// `stroke-linecap`: cap at the end of an open subpath.
    pub trail_line_cap: LineCap,
    pub line_gap: LineGap,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            miter_limit: I26F6::from_num(4),
            line_join: LineJoin::Miter,
            lead_line_cap: LineCap::Butt,
            trail_line_cap: LineCap::Butt,
            line_gap: LineGap::Flat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashOptions {
    /// Empty means solid.
    pub dash: Vec<f64>,
    pub offset: f64,
}

/// Fully cascaded drawing state for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStyle {
    pub fill_opacity: f64,
    pub stroke_opacity: f64,
    pub stroke_width: f64,
    pub fill_rule: FillRule,
    pub join: JoinOptions,
    pub dash: DashOptions,
    pub fill: Paint,
    pub stroke: Paint,
    /// Mask ids, outermost first.
    pub masks: Vec<String>,
    pub transform: Matrix2D,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            fill_opacity: 1.0,
            stroke_opacity: 1.0,
            stroke_width: 1.0,
            fill_rule: FillRule::NonZero,
            join: JoinOptions::default(),
            dash: DashOptions::default(),
            fill: Paint::Solid(Color::BLACK),
            stroke: Paint::None,
            masks: Vec::new(),
            transform: Matrix2D::IDENTITY,
        }
    }
}

/// What a style property may consult while being applied.
pub(crate) struct StyleScope<'a> {
    pub view_box: Bounds,
    pub gradients: &'a HashMap<String, Gradient>,
}

impl PathStyle {
    /// Applies one presentation property. Unknown property names are not an
    /// error; unknown keyword values are [`SvgError::UnrecognizedStyleValue`].
    pub(crate) fn apply(&mut self, scope: &StyleScope<'_>, name: &str, value: &str) -> Result<()> {
        match name {
            "fill" => self.fill = resolve_paint(scope, value, &self.fill)?,
            "stroke" => self.stroke = resolve_paint(scope, value, &self.stroke)?,
            "fill-rule" => {
                self.fill_rule = keyword(
                    name,
                    value,
                    &[("nonzero", FillRule::NonZero), ("evenodd", FillRule::EvenOdd)],
                )?
            }
            "stroke-linegap" => {
                self.join.line_gap = keyword(
                    name,
                    value,
                    &[
                        ("flat", LineGap::Flat),
                        ("round", LineGap::Round),
                        ("cubic", LineGap::Cubic),
                        ("quadratic", LineGap::Quadratic),
                    ],
                )?
            }
            "stroke-leadlinecap" => self.join.lead_line_cap = line_cap(name, value)?,
            "stroke-linecap" => self.join.trail_line_cap = line_cap(name, value)?,
            "stroke-linejoin" => {
                self.join.line_join = keyword(
                    name,
                    value,
                    &[
                        ("miter", LineJoin::Miter),
                        ("miter-clip", LineJoin::MiterClip),
                        ("arc-clip", LineJoin::ArcClip),
                        ("round", LineJoin::Round),
                        ("arc", LineJoin::Arc),
                        ("bevel", LineJoin::Bevel),
                    ],
                )?
            }
            "stroke-miterlimit" => {
                self.join.miter_limit = I26F6::saturating_from_num(parse_basic_float(value)?)
            }
            "stroke-width" => {
                self.stroke_width = resolve_length(value, Axis::Diagonal, &scope.view_box)?
            }
            "stroke-dashoffset" => {
                self.dash.offset = resolve_length(value, Axis::Diagonal, &scope.view_box)?
            }
            "stroke-dasharray" => {
                self.dash.dash = if value == "none" {
                    Vec::new()
                } else {
                    value
                        .split(|c: char| c.is_whitespace() || c == ',')
                        .filter(|s| !s.is_empty())
                        .map(|d| resolve_length(d, Axis::Diagonal, &scope.view_box))
                        .collect::<Result<Vec<_>>>()?
                };
            }
            "opacity" | "fill-opacity" | "stroke-opacity" => {
                let op = parse_basic_float(value)?;
                if name != "stroke-opacity" {
                    self.fill_opacity *= op;
                }
                if name != "fill-opacity" {
                    self.stroke_opacity *= op;
                }
            }
            "transform" => {
                self.transform = self.transform.multiply(&parse_transform_list(value)?);
            }
            "mask" => {
                if let Some(id) = parse_url_selector(value)? {
                    self.masks.push(id);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn keyword<T: Copy>(property: &str, value: &str, table: &[(&str, T)]) -> Result<T> {
    table
        .iter()
        .find(|(k, _)| *k == value)
        .map(|(_, v)| *v)
        .ok_or_else(|| SvgError::UnrecognizedStyleValue {
            property: property.to_string(),
            value: value.to_string(),
        })
}

fn line_cap(property: &str, value: &str) -> Result<LineCap> {
    keyword(
        property,
        value,
        &[
            ("butt", LineCap::Butt),
            ("round", LineCap::Round),
            ("square", LineCap::Square),
            ("cubic", LineCap::Cubic),
            ("quadratic", LineCap::Quadratic),
        ],
    )
}

fn resolve_paint(scope: &StyleScope<'_>, value: &str, inherited: &Paint) -> Result<Paint> {
    match value {
        "none" => Ok(Paint::None),
        "currentColor" | "inherit" => Ok(inherited.clone()),
        v if v.starts_with("url(") => match parse_url_selector(v)? {
            Some(id) if scope.gradients.contains_key(&id) => Ok(Paint::Gradient(id)),
            Some(id) => {
                log::debug!("paint references unknown gradient '{}'", id);
                Ok(Paint::None)
            }
            None => Ok(Paint::None),
        },
        v => parse_color(v).map(Paint::Solid),
    }
}

/// Flattens an element's attributes and its `style="k:v;..."` entries into
/// one ordered list of `(property, value)` pairs.
///
/// Direct attributes come first. A `style` entry whose property is also
/// given as a direct attribute is dropped.
pub(crate) fn style_pairs(attrs: &[(String, String)]) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = attrs
        .iter()
        .filter(|(k, _)| !k.eq_ignore_ascii_case("style"))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let direct = pairs.len();

    for (_, style) in attrs.iter().filter(|(k, _)| k.eq_ignore_ascii_case("style")) {
        for decl in style.split(';') {
            let Some((k, v)) = decl.split_once(':') else {
                continue;
            };
            let k = k.trim().to_ascii_lowercase();
            if k.is_empty() || pairs[..direct].iter().any(|(d, _)| *d == k) {
                continue;
            }
            pairs.push((k, v.trim().to_string()));
        }
    }
    pairs
}
