use lightningcss::traits::Parse;
use lightningcss::values::color::{CssColor, SRGB};

use crate::document::Bounds;
use crate::error::{Result, SvgError};
use crate::matrix::Matrix2D;
use crate::units::{Axis, resolve_length};

/// Straight (non-premultiplied) RGBA, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// What a fill or stroke is painted with.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Paint {
    #[default]
    None,
    Solid(Color),
    /// Identifier of a gradient in the document's gradient table.
    Gradient(String),
}

impl Paint {
    pub fn is_none(&self) -> bool {
        matches!(self, Paint::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientUnits {
    #[default]
    ObjectBoundingBox,
    UserSpaceOnUse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spread {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientDirection {
    Linear {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Radial {
        cx: f64,
        cy: f64,
        fx: f64,
        fy: f64,
        r: f64,
        fr: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// In `[0, 1]`.
    pub offset: f64,
    pub color: Color,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub id: String,
    pub direction: GradientDirection,
    pub spread: Spread,
    pub units: GradientUnits,
    /// `gradientTransform`.
    pub matrix: Matrix2D,
    /// The view box at the time the gradient was declared.
    pub bounds: Bounds,
    pub stops: Vec<GradientStop>,
    /// Gradient this one inherits stops from.
    pub href: Option<String>,
}

impl Gradient {
    pub(crate) fn new(id: String, direction: GradientDirection, bounds: Bounds) -> Self {
        Self {
            id,
            direction,
            spread: Spread::default(),
            units: GradientUnits::default(),
            matrix: Matrix2D::IDENTITY,
            bounds,
            stops: Vec::new(),
            href: None,
        }
    }

    /// Box that percentages in the gradient's coordinates refer to.
    pub fn resolution_box(&self) -> Bounds {
        match self.units {
            GradientUnits::ObjectBoundingBox => Bounds::UNIT,
            GradientUnits::UserSpaceOnUse => self.bounds,
        }
    }
}

/// Raw coordinate strings of a gradient, kept until `gradientUnits` is known.
#[derive(Debug, Clone)]
pub(crate) enum RawDirection {
    Linear([String; 4]),
    Radial {
        coords: [String; 6],
        fx_set: bool,
        fy_set: bool,
    },
}

impl RawDirection {
    pub(crate) fn linear() -> Self {
        RawDirection::Linear(["0%", "0%", "100%", "0"].map(String::from))
    }

    pub(crate) fn radial() -> Self {
        RawDirection::Radial {
            coords: ["50%"; 6].map(String::from),
            fx_set: false,
            fy_set: false,
        }
    }

    /// Records a coordinate attribute. Returns false for non-coordinate names.
    pub(crate) fn set(&mut self, name: &str, value: &str) -> bool {
        let slot = match self {
            RawDirection::Linear(c) => match name {
                "x1" => &mut c[0],
                "y1" => &mut c[1],
                "x2" => &mut c[2],
                "y2" => &mut c[3],
                _ => return false,
            },
            RawDirection::Radial {
                coords,
                fx_set,
                fy_set,
            } => match name {
                "cx" => &mut coords[0],
                "cy" => &mut coords[1],
                "fx" => {
                    *fx_set = true;
                    &mut coords[2]
                }
                "fy" => {
                    *fy_set = true;
                    &mut coords[3]
                }
                "r" => &mut coords[4],
                "fr" => &mut coords[5],
                _ => return false,
            },
        };
        *slot = value.to_string();
        true
    }

    /// Second pass: resolves every coordinate against `bbox`.
    pub(crate) fn resolve(&self, bbox: &Bounds) -> Result<GradientDirection> {
        match self {
            RawDirection::Linear(c) => Ok(GradientDirection::Linear {
                x1: resolve_length(&c[0], Axis::Width, bbox)?,
                y1: resolve_length(&c[1], Axis::Height, bbox)?,
                x2: resolve_length(&c[2], Axis::Width, bbox)?,
                y2: resolve_length(&c[3], Axis::Height, bbox)?,
            }),
            RawDirection::Radial {
                coords,
                fx_set,
                fy_set,
            } => {
                let fx = if *fx_set { &coords[2] } else { &coords[0] };
                let fy = if *fy_set { &coords[3] } else { &coords[1] };
                Ok(GradientDirection::Radial {
                    cx: resolve_length(&coords[0], Axis::Width, bbox)?,
                    cy: resolve_length(&coords[1], Axis::Height, bbox)?,
                    fx: resolve_length(fx, Axis::Width, bbox)?,
                    fy: resolve_length(fy, Axis::Height, bbox)?,
                    r: resolve_length(&coords[4], Axis::Diagonal, bbox)?,
                    fr: resolve_length(&coords[5], Axis::Diagonal, bbox)?,
                })
            }
        }
    }
}

/// Parses a CSS color value (named, hex, `rgb()`, `hsl()`, ...).
pub fn parse_color(raw: &str) -> Result<Color> {
    let v = raw.trim();
    let parsed = CssColor::parse_string(v)
        .map_err(|_| SvgError::malformed(format!("invalid color '{}'", raw)))?;
    css_color_to_color(&parsed)
        .ok_or_else(|| SvgError::malformed(format!("unsupported color '{}'", raw)))
}

fn css_color_to_color(color: &CssColor) -> Option<Color> {
    if let CssColor::RGBA(rgba) = color {
        return Some(Color::rgba(
            rgba.red as f32 / 255.0,
            rgba.green as f32 / 255.0,
            rgba.blue as f32 / 255.0,
            (rgba.alpha as f32 / 255.0).clamp(0.0, 1.0),
        ));
    }
    if let Ok(srgb) = SRGB::try_from(color) {
        return Some(Color::rgba(
            srgb.r.clamp(0.0, 1.0),
            srgb.g.clamp(0.0, 1.0),
            srgb.b.clamp(0.0, 1.0),
            srgb.alpha.clamp(0.0, 1.0),
        ));
    }
    None
}

/// Extracts `id` from `url(#id)`.
///
/// `Ok(None)` for an empty value or `none`. A missing `)` is malformed; any
/// reference other than a local id is a structural error.
pub fn parse_url_selector(raw: &str) -> Result<Option<String>> {
    let v = raw.trim();
    if v.is_empty() || v == "none" {
        return Ok(None);
    }
    let Some(rest) = v.strip_prefix("url(") else {
        return Err(SvgError::structural(format!("unsupported selector: {}", v)));
    };
    let Some(close) = rest.find(')') else {
        return Err(SvgError::malformed(format!("unterminated url: {}", v)));
    };
    let inner = rest[..close].trim().trim_matches('"').trim_matches('\'');
    match inner.strip_prefix('#') {
        Some(id) if !id.is_empty() => Ok(Some(id.to_string())),
        _ => Err(SvgError::structural(format!(
            "unsupported url selector: {}",
            inner
        ))),
    }
}
