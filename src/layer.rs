use crate::color::DomColor;
use crate::dom::{FilterEffect, TextAnchor};
use crate::path::Path;
use crate::types::{FillRule, LineCap, LineJoin, Point, Rect, Size, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    P3,
}

/// Resolved paint color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    None,
    Rgba {
        r: f32,
        g: f32,
        b: f32,
        a: f32,
        space: ColorSpace,
    },
    Gray {
        white: f32,
        a: f32,
    },
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Color {
        Color::Rgba {
            r,
            g,
            b,
            a: 1.0,
            space: ColorSpace::Srgb,
        }
    }

    fn from_u8(rgb: [u8; 3]) -> Color {
        Color::rgb(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    /// `current` is the cascaded `color` property used for `currentColor`.
    pub fn create(color: &DomColor, current: &DomColor) -> Color {
        match color {
            DomColor::None => Color::None,
            DomColor::CurrentColor => Color::create(current, &DomColor::None),
            DomColor::Keyword(name) => match crate::color::keyword_rgb(name) {
                Some(rgb) => Color::from_u8(rgb),
                None => Color::None,
            },
            DomColor::Rgbi(r, g, b) | DomColor::Hex(r, g, b) => Color::from_u8([*r, *g, *b]),
            DomColor::Rgbf(r, g, b) => Color::rgb(*r, *g, *b),
            DomColor::P3(r, g, b) => Color::Rgba {
                r: *r,
                g: *g,
                b: *b,
                a: 1.0,
                space: ColorSpace::P3,
            },
        }
    }

    pub fn alpha(&self) -> f32 {
        match *self {
            Color::None => 0.0,
            Color::Rgba { a, .. } | Color::Gray { a, .. } => a,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Color::None)
    }

    pub fn is_opaque(&self) -> bool {
        !self.is_none() && self.alpha() >= 1.0
    }

    pub fn is_p3(&self) -> bool {
        matches!(
            self,
            Color::Rgba {
                space: ColorSpace::P3,
                ..
            }
        )
    }

    pub fn with_alpha(self, alpha: f32) -> Color {
        match self {
            Color::None => Color::None,
            Color::Rgba { r, g, b, space, .. } => Color::Rgba {
                r,
                g,
                b,
                a: alpha,
                space,
            },
            Color::Gray { white, .. } => Color::Gray { white, a: alpha },
        }
    }

    pub fn with_multiplying_alpha(self, alpha: f32) -> Color {
        let current = self.alpha();
        self.with_alpha(current * alpha)
    }

    /// Fully transparent colors collapse to `None`.
    pub fn maybe_none(self) -> Color {
        if self.alpha() > 0.0 { self } else { Color::None }
    }
}

/// Maps colors while building a layer subtree.
pub trait ColorConverter {
    fn convert(&self, color: Color) -> Color;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultColorConverter;

impl ColorConverter for DefaultColorConverter {
    fn convert(&self, color: Color) -> Color {
        color
    }
}

/// Turns colors into alpha-only gray using BT.709 luma, for masks.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuminanceColorConverter;

impl ColorConverter for LuminanceColorConverter {
    fn convert(&self, color: Color) -> Color {
        match color {
            Color::Rgba { r, g, b, a, .. } => Color::Gray {
                white: 0.0,
                a: (r * 0.2126 + g * 0.7152 + b * 0.0722) * a,
            },
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    UserSpaceOnUse,
    #[default]
    ObjectBoundingBox,
}

impl From<crate::dom::Units> for Units {
    fn from(units: crate::dom::Units) -> Self {
        match units {
            crate::dom::Units::UserSpaceOnUse => Units::UserSpaceOnUse,
            crate::dom::Units::ObjectBoundingBox => Units::ObjectBoundingBox,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
    pub opacity: f32,
}

impl GradientStop {
    pub fn is_opaque(&self) -> bool {
        self.color.is_opaque() && self.opacity >= 1.0
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gradient {
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    pub fn color_space(&self) -> ColorSpace {
        if self.stops.iter().any(|s| s.color.is_p3()) {
            ColorSpace::P3
        } else {
            ColorSpace::Srgb
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.stops.iter().all(GradientStop::is_opaque)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub gradient: Gradient,
    pub start: Point,
    pub end: Point,
    pub units: Units,
    pub transform: Vec<Transform>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub gradient: Gradient,
    pub center: Point,
    pub radius: f32,
    pub end_center: Point,
    pub end_radius: f32,
    pub units: Units,
    pub transform: Vec<Transform>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub frame: Rect,
    pub contents: Vec<Contents>,
}

impl Pattern {
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            contents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

/// Encoded bitmap with its pixel size and placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub format: ImageFormat,
    pub data: Vec<u8>,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub frame: Rect,
}

impl Image {
    /// None for empty data or an unsupported MIME type.
    pub fn new(mime: &str, data: Vec<u8>) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        Some(Self {
            format: ImageFormat::from_mime(mime)?,
            data,
            pixel_width: 0,
            pixel_height: 0,
            frame: Rect::ZERO,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line(Vec<Point>),
    Rect { rect: Rect, radii: Size },
    Ellipse(Rect),
    Polygon(Vec<Point>),
    Path(Path),
}

impl Shape {
    pub fn path(&self) -> Path {
        match self {
            Shape::Line(points) => Path::make_line(points),
            Shape::Rect { rect, radii } => Path::make_rect(*rect, *radii),
            Shape::Ellipse(rect) => Path::make_ellipse(*rect),
            Shape::Polygon(points) => Path::make_polygon(points),
            Shape::Path(path) => path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stroke {
    Color(Color),
    LinearGradient(LinearGradient),
    RadialGradient(RadialGradient),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeAttributes {
    pub color: Stroke,
    /// Applied to gradient strokes; solid colors carry it in their alpha.
    pub opacity: f32,
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Color(Color),
    Pattern(Pattern),
    LinearGradient(LinearGradient),
    RadialGradient(RadialGradient),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillAttributes {
    pub fill: Fill,
    pub opacity: f32,
    pub rule: FillRule,
}

impl FillAttributes {
    pub fn color(color: Color, rule: FillRule) -> Self {
        Self {
            fill: Fill::Color(color),
            opacity: 1.0,
            rule,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextAttributes {
    pub color: Color,
    pub font_name: String,
    pub size: f32,
    pub anchor: TextAnchor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Contents {
    Shape(Shape, StrokeAttributes, FillAttributes),
    Image(Image),
    Text(String, Point, TextAttributes),
    Layer(Layer),
}

/// A node of the resolved scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub contents: Vec<Contents>,
    pub opacity: f32,
    pub transform: Vec<Transform>,
    pub clip: Vec<Shape>,
    pub clip_rule: Option<FillRule>,
    pub mask: Option<Box<Layer>>,
    pub filters: Vec<FilterEffect>,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            contents: Vec::new(),
            opacity: 1.0,
            transform: Vec::new(),
            clip: Vec::new(),
            clip_rule: None,
            mask: None,
            filters: Vec::new(),
        }
    }
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends contents. Empty nested layers are dropped and simple ones are
    /// replaced by their single item.
    pub fn append_contents(&mut self, contents: Contents) {
        match contents {
            Contents::Layer(layer) => {
                if layer.contents.is_empty() {
                    return;
                }
                match layer.into_simple_contents() {
                    Ok(simple) => self.contents.push(simple),
                    Err(layer) => self.contents.push(Contents::Layer(layer)),
                }
            }
            other => self.contents.push(other),
        }
    }

    /// True when the layer has exactly one item and no effect of its own.
    pub fn is_simple(&self) -> bool {
        self.contents.len() == 1
            && self.opacity == 1.0
            && self.transform.is_empty()
            && self.clip.is_empty()
            && self.mask.is_none()
            && self.filters.is_empty()
    }

    pub fn simple_contents(&self) -> Option<&Contents> {
        if self.is_simple() {
            self.contents.first()
        } else {
            None
        }
    }

    fn into_simple_contents(mut self) -> Result<Contents, Layer> {
        if !self.is_simple() {
            return Err(self);
        }
        match self.contents.pop() {
            Some(contents) => Ok(contents),
            None => Err(self),
        }
    }
}
