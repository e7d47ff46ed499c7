use std::collections::HashMap;
use std::str::FromStr;

use crate::color::{DomColor, DomFill};
use crate::error::ParseError;
use crate::path_data::PathSegment;
use crate::stylesheet::Selector;
use crate::transform::DomTransform;
use crate::types::{FillRule, LineCap, LineJoin, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    None,
    Inline,
}

impl FromStr for DisplayMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(DisplayMode::None),
            "inline" => Ok(DisplayMode::Inline),
            other => Err(ParseError::invalid(format!("unknown display '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl FromStr for TextAnchor {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(TextAnchor::Start),
            "middle" => Ok(TextAnchor::Middle),
            "end" => Ok(TextAnchor::End),
            other => Err(ParseError::invalid(format!("unknown text anchor '{other}'"))),
        }
    }
}

/// Coordinate system of gradient and pattern geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    UserSpaceOnUse,
    #[default]
    ObjectBoundingBox,
}

impl FromStr for Units {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "userSpaceOnUse" => Ok(Units::UserSpaceOnUse),
            "objectBoundingBox" => Ok(Units::ObjectBoundingBox),
            other => Err(ParseError::invalid(format!("unknown units '{other}'"))),
        }
    }
}

/// Every cascading property; unset fields defer to lower-precedence sources.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PresentationAttributes {
    pub opacity: Option<f32>,
    pub display: Option<DisplayMode>,
    pub color: Option<DomColor>,

    pub stroke: Option<DomFill>,
    pub stroke_width: Option<f32>,
    pub stroke_opacity: Option<f32>,
    pub stroke_line_cap: Option<LineCap>,
    pub stroke_line_join: Option<LineJoin>,
    pub stroke_miter_limit: Option<f32>,
    pub stroke_dash_array: Option<Vec<f32>>,

    pub fill: Option<DomFill>,
    pub fill_opacity: Option<f32>,
    pub fill_rule: Option<FillRule>,

    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub text_anchor: Option<TextAnchor>,

    pub transform: Option<Vec<DomTransform>>,
    pub clip_path: Option<String>,
    pub clip_rule: Option<FillRule>,
    pub mask: Option<String>,
    pub filter: Option<String>,
}

impl PresentationAttributes {
    /// Field-wise override: a field set in `other` wins.
    pub fn applying(&self, other: &PresentationAttributes) -> PresentationAttributes {
        fn pick<T: Clone>(high: &Option<T>, low: &Option<T>) -> Option<T> {
            high.clone().or_else(|| low.clone())
        }
        PresentationAttributes {
            opacity: pick(&other.opacity, &self.opacity),
            display: pick(&other.display, &self.display),
            color: pick(&other.color, &self.color),
            stroke: pick(&other.stroke, &self.stroke),
            stroke_width: pick(&other.stroke_width, &self.stroke_width),
            stroke_opacity: pick(&other.stroke_opacity, &self.stroke_opacity),
            stroke_line_cap: pick(&other.stroke_line_cap, &self.stroke_line_cap),
            stroke_line_join: pick(&other.stroke_line_join, &self.stroke_line_join),
            stroke_miter_limit: pick(&other.stroke_miter_limit, &self.stroke_miter_limit),
            stroke_dash_array: pick(&other.stroke_dash_array, &self.stroke_dash_array),
            fill: pick(&other.fill, &self.fill),
            fill_opacity: pick(&other.fill_opacity, &self.fill_opacity),
            fill_rule: pick(&other.fill_rule, &self.fill_rule),
            font_family: pick(&other.font_family, &self.font_family),
            font_size: pick(&other.font_size, &self.font_size),
            text_anchor: pick(&other.text_anchor, &self.text_anchor),
            transform: pick(&other.transform, &self.transform),
            clip_path: pick(&other.clip_path, &self.clip_path),
            clip_rule: pick(&other.clip_rule, &self.clip_rule),
            mask: pick(&other.mask, &self.mask),
            filter: pick(&other.filter, &self.filter),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementCommon {
    pub id: Option<String>,
    pub class: Option<String>,
    pub attributes: PresentationAttributes,
    pub style: PresentationAttributes,
    pub location: Option<(u32, u32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Circle {
        cx: Option<f32>,
        cy: Option<f32>,
        r: f32,
    },
    Ellipse {
        cx: Option<f32>,
        cy: Option<f32>,
        rx: f32,
        ry: f32,
    },
    Rect {
        x: Option<f32>,
        y: Option<f32>,
        width: f32,
        height: f32,
        rx: Option<f32>,
        ry: Option<f32>,
    },
    Polyline {
        points: Vec<Point>,
    },
    Polygon {
        points: Vec<Point>,
    },
    Path {
        segments: Vec<PathSegment>,
    },
    Text {
        x: Option<f32>,
        y: Option<f32>,
        value: String,
    },
    Image {
        href: String,
        x: Option<f32>,
        y: Option<f32>,
        width: f32,
        height: f32,
    },
    Group {
        children: Vec<GraphicsElement>,
    },
    Anchor {
        href: Option<String>,
        children: Vec<GraphicsElement>,
    },
    Use {
        href: String,
        x: Option<f32>,
        y: Option<f32>,
    },
    Svg {
        width: f32,
        height: f32,
        view_box: Option<ViewBox>,
        children: Vec<GraphicsElement>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsElement {
    pub common: ElementCommon,
    pub kind: ElementKind,
}

impl GraphicsElement {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            common: ElementCommon::default(),
            kind,
        }
    }

    pub fn element_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Line { .. } => "line",
            ElementKind::Circle { .. } => "circle",
            ElementKind::Ellipse { .. } => "ellipse",
            ElementKind::Rect { .. } => "rect",
            ElementKind::Polyline { .. } => "polyline",
            ElementKind::Polygon { .. } => "polygon",
            ElementKind::Path { .. } => "path",
            ElementKind::Text { .. } => "text",
            ElementKind::Image { .. } => "image",
            ElementKind::Group { .. } => "g",
            ElementKind::Anchor { .. } => "a",
            ElementKind::Use { .. } => "use",
            ElementKind::Svg { .. } => "svg",
        }
    }

    pub fn children(&self) -> &[GraphicsElement] {
        match &self.kind {
            ElementKind::Group { children }
            | ElementKind::Anchor { children, .. }
            | ElementKind::Svg { children, .. } => children,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipPath {
    pub id: String,
    pub children: Vec<GraphicsElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub id: String,
    pub children: Vec<GraphicsElement>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub offset: f32,
    pub color: DomColor,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearGradient {
    pub id: String,
    pub x1: Option<f32>,
    pub y1: Option<f32>,
    pub x2: Option<f32>,
    pub y2: Option<f32>,
    pub stops: Vec<Stop>,
    pub units: Option<Units>,
    pub transform: Vec<DomTransform>,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RadialGradient {
    pub id: String,
    pub cx: Option<f32>,
    pub cy: Option<f32>,
    pub r: Option<f32>,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
    pub fr: Option<f32>,
    pub stops: Vec<Stop>,
    pub units: Option<Units>,
    pub transform: Vec<DomTransform>,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub id: String,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: f32,
    pub height: f32,
    pub pattern_units: Option<Units>,
    pub pattern_content_units: Option<Units>,
    pub children: Vec<GraphicsElement>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterEffect {
    GaussianBlur { std_deviation: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub id: String,
    pub effects: Vec<FilterEffect>,
}

/// Referenceable definitions. Lookups return the first entry for an id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Defs {
    pub clip_paths: Vec<ClipPath>,
    pub linear_gradients: Vec<LinearGradient>,
    pub radial_gradients: Vec<RadialGradient>,
    pub masks: Vec<Mask>,
    pub patterns: Vec<Pattern>,
    pub filters: Vec<Filter>,
    pub elements: HashMap<String, GraphicsElement>,
}

impl Defs {
    pub fn clip_path(&self, id: &str) -> Option<&ClipPath> {
        self.clip_paths.iter().find(|c| c.id == id)
    }

    pub fn mask(&self, id: &str) -> Option<&Mask> {
        self.masks.iter().find(|m| m.id == id)
    }

    pub fn linear_gradient(&self, id: &str) -> Option<&LinearGradient> {
        self.linear_gradients.iter().find(|g| g.id == id)
    }

    pub fn radial_gradient(&self, id: &str) -> Option<&RadialGradient> {
        self.radial_gradients.iter().find(|g| g.id == id)
    }

    pub fn pattern(&self, id: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn filter(&self, id: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.id == id)
    }

    pub fn element(&self, id: &str) -> Option<&GraphicsElement> {
        self.elements.get(id)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleSheet {
    pub attributes: HashMap<Selector, PresentationAttributes>,
}

/// The document root.
#[derive(Debug, Clone, PartialEq)]
pub struct Svg {
    pub common: ElementCommon,
    pub width: f32,
    pub height: f32,
    pub view_box: Option<ViewBox>,
    pub children: Vec<GraphicsElement>,
    pub styles: Vec<StyleSheet>,
    pub defs: Defs,
}

/// `#id` or `url(#id)` style references name an id; anything else does not.
pub fn fragment(href: &str) -> Option<&str> {
    let id = href.trim().strip_prefix('#')?;
    (!id.is_empty()).then_some(id)
}

/// Cascaded attributes: element attributes, then rules for the tag, each
/// class (in order), the id, and finally the inline style.
pub fn presentation_attributes(
    common: &ElementCommon,
    element_name: &str,
    styles: &[StyleSheet],
) -> PresentationAttributes {
    let mut attributes = common.attributes.clone();
    for selector in selectors(common, element_name) {
        for sheet in styles {
            if let Some(rule) = sheet.attributes.get(&selector) {
                attributes = attributes.applying(rule);
            }
        }
    }
    attributes.applying(&common.style)
}

fn selectors(common: &ElementCommon, element_name: &str) -> Vec<Selector> {
    let mut selectors = vec![Selector::Element(element_name.to_string())];
    if let Some(class) = &common.class {
        selectors.extend(
            class
                .split_whitespace()
                .map(|c| Selector::Class(c.to_string())),
        );
    }
    if let Some(id) = &common.id {
        selectors.push(Selector::Id(id.trim().to_string()));
    }
    selectors
}
