use crate::cursor::Cursor;
use crate::document::{Bounds, Mask};
use crate::error::{Result, SvgError};
use crate::matrix::{Matrix2D, parse_transform_list};
use crate::paint::{
    Color, Gradient, GradientStop, GradientUnits, RawDirection, Spread, parse_color,
};
use crate::path_data::compile_path_data;
use crate::style::style_pairs;
use crate::units::{Axis, parse_basic_float, read_fraction, read_number_list};

pub(crate) type Handler = fn(&mut Cursor, &[(String, String)]) -> Result<()>;

/// Element handlers by tag name.
const HANDLERS: &[(&str, Handler)] = &[
    ("svg", svg),
    ("g", group),
    ("line", line),
    ("stop", stop),
    ("rect", rect),
    ("circle", ellipse),
    ("ellipse", ellipse),
    ("polyline", polyline),
    ("polygon", polygon),
    ("path", path),
    ("desc", desc),
    ("defs", defs),
    ("title", title),
    ("linearGradient", linear_gradient),
    ("radialGradient", radial_gradient),
    ("use", use_element),
    ("mask", mask),
];

pub(crate) fn handler(tag: &str) -> Option<Handler> {
    HANDLERS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, h)| *h)
}

pub(crate) fn is_gradient(tag: &str) -> bool {
    tag == "linearGradient" || tag == "radialGradient"
}

fn svg(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    c.doc.view_box = Bounds::default();
    let (mut width, mut height) = (0.0, 0.0);
    for (name, value) in attrs {
        match name.as_str() {
            "viewBox" => {
                let nums = read_number_list(value)?;
                let [x, y, w, h] = nums[..] else {
                    return Err(SvgError::mismatch(format!(
                        "viewBox needs 4 numbers, got '{}'",
                        value
                    )));
                };
                c.doc.view_box = Bounds::new(x, y, w, h);
            }
            "width" => {
                c.doc.width = value.clone();
                width = display_length(value)?;
            }
            "height" => {
                c.doc.height = value.clone();
                height = display_length(value)?;
            }
            _ => {}
        }
    }
    if c.doc.view_box.w == 0.0 {
        c.doc.view_box.w = width;
    }
    if c.doc.view_box.h == 0.0 {
        c.doc.view_box.h = height;
    }
    Ok(())
}

/// Root `width`/`height`. A percentage says nothing about the view box.
fn display_length(value: &str) -> Result<f64> {
    if value.trim_end().ends_with('%') {
        return Ok(0.0);
    }
    parse_basic_float(value)
}

fn group(_: &mut Cursor, _: &[(String, String)]) -> Result<()> {
    Ok(())
}

fn rect(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    let (mut x, mut y, mut w, mut h) = (0.0, 0.0, 0.0, 0.0);
    let (mut rx, mut ry) = (None, None);
    for (name, value) in attrs {
        match name.as_str() {
            "x" => x = c.length(value, Axis::Width)?,
            "y" => y = c.length(value, Axis::Height)?,
            "width" => w = c.length(value, Axis::Width)?,
            "height" => h = c.length(value, Axis::Height)?,
            "rx" => rx = Some(c.length(value, Axis::Width)?),
            "ry" => ry = Some(c.length(value, Axis::Height)?),
            _ => {}
        }
    }
    if w <= 0.0 || h <= 0.0 {
        return Ok(());
    }
    let (rx, ry) = match (rx, ry) {
        (Some(rx), Some(ry)) => (rx, ry),
        (Some(r), None) | (None, Some(r)) => (r, r),
        (None, None) => (0.0, 0.0),
    };
    let (ox, oy) = c.offset;
    c.path.add_round_rect(x + ox, y + oy, w, h, rx, ry);
    Ok(())
}

/// `circle` and `ellipse`.
fn ellipse(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    let (mut cx, mut cy, mut rx, mut ry) = (0.0, 0.0, 0.0, 0.0);
    for (name, value) in attrs {
        match name.as_str() {
            "cx" => cx = c.length(value, Axis::Width)?,
            "cy" => cy = c.length(value, Axis::Height)?,
            "r" => {
                rx = c.length(value, Axis::Diagonal)?;
                ry = rx;
            }
            "rx" => rx = c.length(value, Axis::Width)?,
            "ry" => ry = c.length(value, Axis::Height)?,
            _ => {}
        }
    }
    if rx <= 0.0 || ry <= 0.0 {
        return Ok(());
    }
    let (ox, oy) = c.offset;
    c.path.add_ellipse(cx + ox, cy + oy, rx, ry);
    Ok(())
}

fn line(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    let (mut x1, mut y1, mut x2, mut y2) = (0.0, 0.0, 0.0, 0.0);
    for (name, value) in attrs {
        match name.as_str() {
            "x1" => x1 = c.length(value, Axis::Width)?,
            "y1" => y1 = c.length(value, Axis::Height)?,
            "x2" => x2 = c.length(value, Axis::Width)?,
            "y2" => y2 = c.length(value, Axis::Height)?,
            _ => {}
        }
    }
    let (ox, oy) = c.offset;
    c.path.start(x1 + ox, y1 + oy);
    c.path.line(x2 + ox, y2 + oy);
    Ok(())
}

fn points(c: &mut Cursor, attrs: &[(String, String)], close: bool) -> Result<()> {
    let Some((_, raw)) = attrs.iter().find(|(k, _)| k == "points") else {
        return Ok(());
    };
    let nums = read_number_list(raw)?;
    if nums.len() % 2 != 0 {
        return Err(SvgError::structural(format!(
            "odd number of coordinates in points '{}'",
            raw
        )));
    }
    // fewer than three points draws nothing
    if nums.len() < 6 {
        return Ok(());
    }
    let (ox, oy) = c.offset;
    c.path.start(nums[0] + ox, nums[1] + oy);
    for pair in nums[2..].chunks_exact(2) {
        c.path.line(pair[0] + ox, pair[1] + oy);
    }
    if close {
        c.path.close();
    }
    Ok(())
}

fn polyline(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    points(c, attrs, false)
}

fn polygon(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    points(c, attrs, true)
}

fn path(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    if let Some((_, d)) = attrs.iter().find(|(k, _)| k == "d") {
        let compiled = compile_path_data(d, c.offset.0, c.offset.1)?;
        c.path.extend(compiled);
    }
    Ok(())
}

fn desc(c: &mut Cursor, _: &[(String, String)]) -> Result<()> {
    c.in_desc = true;
    c.doc.descriptions.push(String::new());
    Ok(())
}

fn title(c: &mut Cursor, _: &[(String, String)]) -> Result<()> {
    c.in_title = true;
    c.doc.titles.push(String::new());
    Ok(())
}

fn defs(c: &mut Cursor, _: &[(String, String)]) -> Result<()> {
    c.in_defs = true;
    Ok(())
}

fn linear_gradient(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    gradient(c, attrs, RawDirection::linear())
}

fn radial_gradient(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    gradient(c, attrs, RawDirection::radial())
}

/// Collects coordinates as raw strings, then resolves them once
/// `gradientUnits` is known.
fn gradient(c: &mut Cursor, attrs: &[(String, String)], mut raw: RawDirection) -> Result<()> {
    c.in_grad = true;
    let mut id = String::new();
    let mut units = GradientUnits::default();
    let mut spread = Spread::default();
    let mut matrix = Matrix2D::IDENTITY;
    let mut href = None;

    for (name, value) in attrs {
        if raw.set(name, value) {
            continue;
        }
        match name.as_str() {
            "id" => id = value.clone(),
            "gradientUnits" => match value.trim() {
                "objectBoundingBox" => units = GradientUnits::ObjectBoundingBox,
                "userSpaceOnUse" => units = GradientUnits::UserSpaceOnUse,
                other => c.tolerate(unsupported(name, other))?,
            },
            "spreadMethod" => match value.trim() {
                "pad" => spread = Spread::Pad,
                "reflect" => spread = Spread::Reflect,
                "repeat" => spread = Spread::Repeat,
                other => c.tolerate(unsupported(name, other))?,
            },
            "gradientTransform" => matrix = parse_transform_list(value)?,
            "href" => href = value.trim().strip_prefix('#').map(str::to_string),
            _ => {}
        }
    }

    let bbox = match units {
        GradientUnits::ObjectBoundingBox => Bounds::UNIT,
        GradientUnits::UserSpaceOnUse => c.doc.view_box,
    };
    let mut grad = Gradient::new(id, raw.resolve(&bbox)?, c.doc.view_box);
    grad.units = units;
    grad.spread = spread;
    grad.matrix = matrix;
    grad.href = href;
    c.gradient = Some(grad);
    Ok(())
}

fn unsupported(property: &str, value: &str) -> SvgError {
    SvgError::UnrecognizedStyleValue {
        property: property.to_string(),
        value: value.to_string(),
    }
}

fn stop(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    if !c.in_grad {
        return Ok(());
    }
    let mut stop = GradientStop {
        offset: 0.0,
        color: Color::BLACK,
        opacity: 1.0,
    };
    for (name, value) in style_pairs(attrs) {
        match name.as_str() {
            "offset" => stop.offset = read_fraction(&value)?,
            "stop-color" => match value.as_str() {
                "currentColor" | "inherit" => {}
                v => stop.color = parse_color(v)?,
            },
            "stop-opacity" => stop.opacity = parse_basic_float(&value)?,
            _ => {}
        }
    }
    if let Some(grad) = c.gradient.as_mut() {
        grad.stops.push(stop);
    }
    Ok(())
}

fn use_element(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    let (mut href, mut x, mut y) = ("", 0.0, 0.0);
    for (name, value) in attrs {
        match name.as_str() {
            "href" => href = value.as_str(),
            "x" => x = c.length(value, Axis::Width)?,
            "y" => y = c.length(value, Axis::Height)?,
            _ => {}
        }
    }
    if href.is_empty() {
        return Err(SvgError::structural("only use tags with href are supported"));
    }
    let Some(id) = href.strip_prefix('#') else {
        return Err(SvgError::structural(format!(
            "only local id references are supported in use, got '{}'",
            href
        )));
    };
    c.replay(id, x, y)
}

fn mask(c: &mut Cursor, attrs: &[(String, String)]) -> Result<()> {
    let mut id = String::new();
    let (mut x, mut y) = (c.length("-10%", Axis::Width)?, c.length("-10%", Axis::Height)?);
    let (mut w, mut h) = (c.length("120%", Axis::Width)?, c.length("120%", Axis::Height)?);
    for (name, value) in attrs {
        match name.as_str() {
            "id" => id = value.clone(),
            "x" => x = c.length(value, Axis::Width)?,
            "y" => y = c.length(value, Axis::Height)?,
            "width" => w = c.length(value, Axis::Width)?,
            "height" => h = c.length(value, Axis::Height)?,
            _ => {}
        }
    }
    c.in_mask = true;
    c.mask = Some(Mask {
        id,
        bounds: Bounds::new(x, y, w, h),
        paths: Vec::new(),
        transform: c.style().transform,
    });
    Ok(())
}
