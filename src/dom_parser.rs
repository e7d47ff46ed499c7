use std::collections::HashMap;

use crate::dom::{
    ClipPath, Defs, ElementCommon, ElementKind, Filter, FilterEffect, GraphicsElement,
    LinearGradient, Mask, Pattern, PresentationAttributes, RadialGradient, Stop, StyleSheet, Svg,
    ViewBox,
};
use crate::color::DomColor;
use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::path_data::parse_path_data;
use crate::stylesheet::{parse_style_attribute, parse_style_sheet};
use crate::transform::parse_transform;
use crate::values::{
    AttributeParser, Attributes, parse_coordinate_or_percentage, parse_floats, parse_percentage,
};
use crate::xml::XmlElement;

/// Builds the DOM from a generic markup tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser {
    pub options: ParseOptions,
}

impl XmlParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn parse_svg(&self, root: &XmlElement) -> Result<Svg, ParseError> {
        if root.name != "svg" {
            return Err(ParseError::InvalidDocument {
                element: Some(root.name.clone()),
                line: root.line().unwrap_or(1),
                column: root.column().unwrap_or(1),
                message: "expected <svg> root element".to_string(),
            });
        }
        let att = self.attributes(root)?;
        let view_box = att.parse_opt("viewBox", parse_view_box)?;
        let width = att
            .parse_float_opt("width")?
            .or(view_box.map(|v| v.width))
            .ok_or_else(|| ParseError::missing("width"))?;
        let height = att
            .parse_float_opt("height")?
            .or(view_box.map(|v| v.height))
            .ok_or_else(|| ParseError::missing("height"))?;

        let styles = self.parse_style_sheets(root);
        let defs = self.parse_defs(root)?;
        let children = self.parse_container_children(root)?;
        let common = self.parse_common(root, &att)?;

        tracing::debug!(
            width,
            height,
            children = children.len(),
            styles = styles.len(),
            "parsed svg document"
        );

        Ok(Svg {
            common,
            width,
            height,
            view_box,
            children,
            styles,
            defs,
        })
    }

    /// Graphics children of a container. Failing children are dropped (and
    /// logged) under `SKIP_INVALID_ELEMENTS`, otherwise the error propagates.
    pub fn parse_container_children(
        &self,
        element: &XmlElement,
    ) -> Result<Vec<GraphicsElement>, ParseError> {
        let mut children = Vec::new();
        for child in &element.children {
            match self.parse_graphics_element(child) {
                Ok(Some(parsed)) => children.push(parsed),
                Ok(None) => {}
                Err(err) if self.options.contains(ParseOptions::SKIP_INVALID_ELEMENTS) => {
                    tracing::warn!(element = %child.name, error = %err, "skipping invalid element");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(children)
    }

    /// `Ok(None)` for elements that are not drawn directly (defs, style, ...).
    pub fn parse_graphics_element(
        &self,
        element: &XmlElement,
    ) -> Result<Option<GraphicsElement>, ParseError> {
        self.parse_graphics_element_inner(element)
            .map_err(|source| wrap_element_error(element, source))
    }

    fn parse_graphics_element_inner(
        &self,
        element: &XmlElement,
    ) -> Result<Option<GraphicsElement>, ParseError> {
        let att = self.attributes(element)?;
        let kind = match element.name.as_str() {
            "line" => ElementKind::Line {
                x1: att.parse_coordinate_opt("x1")?.unwrap_or(0.0),
                y1: att.parse_coordinate_opt("y1")?.unwrap_or(0.0),
                x2: att.parse_coordinate_opt("x2")?.unwrap_or(0.0),
                y2: att.parse_coordinate_opt("y2")?.unwrap_or(0.0),
            },
            "circle" => ElementKind::Circle {
                cx: att.parse_coordinate_opt("cx")?,
                cy: att.parse_coordinate_opt("cy")?,
                r: att.parse_coordinate("r")?,
            },
            "ellipse" => ElementKind::Ellipse {
                cx: att.parse_coordinate_opt("cx")?,
                cy: att.parse_coordinate_opt("cy")?,
                rx: att.parse_coordinate("rx")?,
                ry: att.parse_coordinate("ry")?,
            },
            "rect" => ElementKind::Rect {
                x: att.parse_coordinate_opt("x")?,
                y: att.parse_coordinate_opt("y")?,
                width: att.parse_coordinate("width")?,
                height: att.parse_coordinate("height")?,
                rx: att.parse_coordinate_opt("rx")?,
                ry: att.parse_coordinate_opt("ry")?,
            },
            "polyline" => ElementKind::Polyline {
                points: att.parse_points_opt("points")?.unwrap_or_default(),
            },
            "polygon" => ElementKind::Polygon {
                points: att.parse_points_opt("points")?.unwrap_or_default(),
            },
            "path" => ElementKind::Path {
                segments: att.parse("d", parse_path_data)?,
            },
            "text" => {
                let Some(value) = element
                    .inner_text
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                else {
                    return Ok(None);
                };
                ElementKind::Text {
                    x: att.parse_coordinate_opt("x")?,
                    y: att.parse_coordinate_opt("y")?,
                    value: value.to_string(),
                }
            }
            "image" => ElementKind::Image {
                href: parse_href(&att)?,
                x: att.parse_coordinate_opt("x")?,
                y: att.parse_coordinate_opt("y")?,
                width: att.parse_coordinate("width")?,
                height: att.parse_coordinate("height")?,
            },
            "g" => ElementKind::Group {
                children: self.parse_container_children(element)?,
            },
            "a" => ElementKind::Anchor {
                href: parse_href_opt(&att)?,
                children: self.parse_container_children(element)?,
            },
            "use" => ElementKind::Use {
                href: parse_href(&att)?,
                x: att.parse_coordinate_opt("x")?,
                y: att.parse_coordinate_opt("y")?,
            },
            "svg" => {
                let view_box = att.parse_opt("viewBox", parse_view_box)?;
                ElementKind::Svg {
                    width: att
                        .parse_float_opt("width")?
                        .or(view_box.map(|v| v.width))
                        .unwrap_or(0.0),
                    height: att
                        .parse_float_opt("height")?
                        .or(view_box.map(|v| v.height))
                        .unwrap_or(0.0),
                    view_box,
                    children: self.parse_container_children(element)?,
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(GraphicsElement {
            common: self.parse_common(element, &att)?,
            kind,
        }))
    }

    fn parse_common(
        &self,
        element: &XmlElement,
        att: &Attributes<'_>,
    ) -> Result<ElementCommon, ParseError> {
        let attributes = parse_presentation_attributes(&ElementOnly {
            values: &element.attributes,
            options: self.options,
        })?;
        let style = parse_presentation_attributes(&StyleOnly(att))?;
        Ok(ElementCommon {
            id: element.attribute("id").map(|s| s.trim().to_string()),
            class: element.attribute("class").map(str::to_string),
            attributes,
            style,
            location: element.location,
        })
    }

    /// Element attributes merged with its parsed `style` attribute.
    pub fn attributes<'a>(&self, element: &'a XmlElement) -> Result<Attributes<'a>, ParseError> {
        let style = match element.attribute("style") {
            None => HashMap::new(),
            Some(text) => match parse_style_attribute(text) {
                Ok(style) => style,
                Err(_) if self.options.contains(ParseOptions::SKIP_INVALID_ATTRIBUTES) => {
                    HashMap::new()
                }
                Err(_) => {
                    return Err(ParseError::InvalidAttribute {
                        name: "style".to_string(),
                        value: text.to_string(),
                    });
                }
            },
        };
        Ok(Attributes {
            element: &element.attributes,
            style,
            options: self.options,
        })
    }

    /// Every `<style>` element in the document; unparsable sheets are
    /// logged and skipped.
    pub fn parse_style_sheets(&self, root: &XmlElement) -> Vec<StyleSheet> {
        let mut sheets = Vec::new();
        visit(root, &mut |element| {
            if element.name != "style" {
                return true;
            }
            let text = element.inner_text.as_deref().unwrap_or_default();
            match parse_style_sheet(text).and_then(|entries| {
                entries
                    .into_iter()
                    .map(|(selector, declarations)| {
                        Ok((selector, parse_presentation_attributes(&declarations)?))
                    })
                    .collect::<Result<HashMap<_, _>, ParseError>>()
            }) {
                Ok(attributes) => sheets.push(StyleSheet { attributes }),
                Err(err) => tracing::warn!(
                    line = ?element.line(),
                    error = %err,
                    "skipping invalid style sheet"
                ),
            }
            false
        });
        sheets
    }

    /// Collects definitions from anywhere in the document, in document order.
    pub fn parse_defs(&self, root: &XmlElement) -> Result<Defs, ParseError> {
        let mut defs = Defs::default();
        let mut failure: Option<ParseError> = None;
        visit(root, &mut |element| {
            if failure.is_some() {
                return false;
            }
            if let Err(err) = self.parse_definition(element, &mut defs) {
                let err = wrap_element_error(element, err);
                if self.options.contains(ParseOptions::SKIP_INVALID_ELEMENTS) {
                    tracing::warn!(element = %element.name, error = %err, "skipping invalid definition");
                } else {
                    failure = Some(err);
                }
            }
            true
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(defs),
        }
    }

    fn parse_definition(&self, element: &XmlElement, defs: &mut Defs) -> Result<(), ParseError> {
        match element.name.as_str() {
            "clipPath" => defs.clip_paths.push(ClipPath {
                id: self.attributes(element)?.parse_string("id")?,
                children: self.parse_container_children(element)?,
            }),
            "mask" => defs.masks.push(Mask {
                id: self.attributes(element)?.parse_string("id")?,
                children: self.parse_container_children(element)?,
            }),
            "linearGradient" => defs.linear_gradients.push(self.parse_linear_gradient(element)?),
            "radialGradient" => defs.radial_gradients.push(self.parse_radial_gradient(element)?),
            "pattern" => defs.patterns.push(self.parse_pattern(element)?),
            "filter" => defs.filters.push(self.parse_filter(element)?),
            _ => {
                if element.attribute("id").is_some() {
                    if let Some(parsed) = self.parse_graphics_element(element)? {
                        if let Some(id) = parsed.common.id.clone() {
                            defs.elements.entry(id).or_insert(parsed);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn parse_linear_gradient(&self, element: &XmlElement) -> Result<LinearGradient, ParseError> {
        let att = self.attributes(element)?;
        Ok(LinearGradient {
            id: att.parse_string("id")?,
            x1: att.parse_opt("x1", parse_coordinate_or_percentage)?,
            y1: att.parse_opt("y1", parse_coordinate_or_percentage)?,
            x2: att.parse_opt("x2", parse_coordinate_or_percentage)?,
            y2: att.parse_opt("y2", parse_coordinate_or_percentage)?,
            stops: self.parse_stops(element)?,
            units: att.parse_raw_opt("gradientUnits")?,
            transform: att.parse_opt("gradientTransform", parse_transform)?.unwrap_or_default(),
            href: parse_href_opt(&att)?,
        })
    }

    pub fn parse_radial_gradient(&self, element: &XmlElement) -> Result<RadialGradient, ParseError> {
        let att = self.attributes(element)?;
        Ok(RadialGradient {
            id: att.parse_string("id")?,
            cx: att.parse_opt("cx", parse_coordinate_or_percentage)?,
            cy: att.parse_opt("cy", parse_coordinate_or_percentage)?,
            r: att.parse_opt("r", parse_coordinate_or_percentage)?,
            fx: att.parse_opt("fx", parse_coordinate_or_percentage)?,
            fy: att.parse_opt("fy", parse_coordinate_or_percentage)?,
            fr: att.parse_opt("fr", parse_coordinate_or_percentage)?,
            stops: self.parse_stops(element)?,
            units: att.parse_raw_opt("gradientUnits")?,
            transform: att.parse_opt("gradientTransform", parse_transform)?.unwrap_or_default(),
            href: parse_href_opt(&att)?,
        })
    }

    /// Stops default to offset 0, black, fully opaque.
    fn parse_stops(&self, element: &XmlElement) -> Result<Vec<Stop>, ParseError> {
        let mut stops = Vec::new();
        for child in element.children.iter().filter(|c| c.name == "stop") {
            let att = self.attributes(child)?;
            let offset = att.parse("offset", parse_percentage).ok();
            let color = att.parse_color_opt("stop-color").ok().flatten();
            let opacity = att.parse_opt("stop-opacity", parse_percentage)?;
            stops.push(Stop {
                offset: offset.unwrap_or(0.0),
                color: color.unwrap_or(DomColor::Keyword("black")),
                opacity: opacity.unwrap_or(1.0),
            });
        }
        Ok(stops)
    }

    pub fn parse_pattern(&self, element: &XmlElement) -> Result<Pattern, ParseError> {
        let att = self.attributes(element)?;
        Ok(Pattern {
            id: att.parse_string("id")?,
            x: att.parse_coordinate_opt("x")?,
            y: att.parse_coordinate_opt("y")?,
            width: att.parse_coordinate("width")?,
            height: att.parse_coordinate("height")?,
            pattern_units: att.parse_raw_opt("patternUnits")?,
            pattern_content_units: att.parse_raw_opt("patternContentUnits")?,
            children: self.parse_container_children(element)?,
        })
    }

    pub fn parse_filter(&self, element: &XmlElement) -> Result<Filter, ParseError> {
        let att = self.attributes(element)?;
        let mut effects = Vec::new();
        for child in &element.children {
            if child.name == "feGaussianBlur" {
                let effect_att = self.attributes(child)?;
                effects.push(FilterEffect::GaussianBlur {
                    std_deviation: effect_att.parse_float("stdDeviation")?,
                });
            }
        }
        Ok(Filter {
            id: att.parse_string("id")?,
            effects,
        })
    }
}

/// Parses every cascading property from a keyed source.
pub fn parse_presentation_attributes(
    att: &impl AttributeParser,
) -> Result<PresentationAttributes, ParseError> {
    Ok(PresentationAttributes {
        opacity: att.parse_opt("opacity", parse_coordinate_or_percentage)?,
        display: att.parse_raw_opt("display")?,
        color: att.parse_color_opt("color")?,
        stroke: att.parse_fill_opt("stroke")?,
        stroke_width: att.parse_float_opt("stroke-width")?,
        stroke_opacity: att.parse_opt("stroke-opacity", parse_coordinate_or_percentage)?,
        stroke_line_cap: att.parse_raw_opt("stroke-linecap")?,
        stroke_line_join: att.parse_raw_opt("stroke-linejoin")?,
        stroke_miter_limit: att.parse_float_opt("stroke-miterlimit")?,
        stroke_dash_array: att.parse_opt("stroke-dasharray", parse_dash_array)?,
        fill: att.parse_fill_opt("fill")?,
        fill_opacity: att.parse_opt("fill-opacity", parse_coordinate_or_percentage)?,
        fill_rule: att.parse_raw_opt("fill-rule")?,
        font_family: att.parse_opt("font-family", parse_font_family)?,
        font_size: att.parse_float_opt("font-size")?,
        text_anchor: att.parse_raw_opt("text-anchor")?,
        transform: att.parse_opt("transform", parse_transform)?,
        clip_path: att.parse_url_selector_opt("clip-path")?,
        clip_rule: att.parse_raw_opt("clip-rule")?,
        mask: att.parse_url_selector_opt("mask")?,
        filter: att.parse_url_selector_opt("filter")?,
    })
}

fn parse_dash_array(value: &str) -> Result<Vec<f32>, ParseError> {
    if value.trim() == "none" {
        return Ok(Vec::new());
    }
    parse_floats(value)
}

fn parse_font_family(value: &str) -> Result<String, ParseError> {
    let family = value
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '\'' || c == '"');
    if family.is_empty() {
        return Err(ParseError::invalid("empty font family"));
    }
    Ok(family.to_string())
}

fn parse_view_box(value: &str) -> Result<ViewBox, ParseError> {
    match parse_floats(value)?.as_slice() {
        &[x, y, width, height] => Ok(ViewBox {
            x,
            y,
            width,
            height,
        }),
        _ => Err(ParseError::invalid(format!("viewBox needs four numbers: '{value}'"))),
    }
}

fn parse_href(att: &impl AttributeParser) -> Result<String, ParseError> {
    match att.parse_url("xlink:href") {
        Err(ParseError::MissingAttribute { .. }) => att.parse_url("href"),
        other => other,
    }
}

fn parse_href_opt(att: &impl AttributeParser) -> Result<Option<String>, ParseError> {
    match att.parse_url_opt("xlink:href")? {
        Some(href) => Ok(Some(href)),
        None => att.parse_url_opt("href"),
    }
}

fn wrap_element_error(element: &XmlElement, source: ParseError) -> ParseError {
    match source {
        ParseError::InvalidElement { .. } | ParseError::InvalidDocument { .. } => source,
        source => ParseError::InvalidElement {
            name: element.name.clone(),
            line: element.line(),
            column: element.column(),
            source: Box::new(source),
        },
    }
}

/// Depth-first, document-order walk; `f` returns whether to descend.
fn visit(element: &XmlElement, f: &mut impl FnMut(&XmlElement) -> bool) {
    for child in &element.children {
        if f(child) {
            visit(child, f);
        }
    }
}

/// Bare element attributes under the parser's strictness.
struct ElementOnly<'a> {
    values: &'a HashMap<String, String>,
    options: ParseOptions,
}

impl AttributeParser for ElementOnly<'_> {
    fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn options(&self) -> ParseOptions {
        self.options
    }
}

/// The inline `style` half of an element's attributes.
struct StyleOnly<'a, 'b>(&'b Attributes<'a>);

impl AttributeParser for StyleOnly<'_, '_> {
    fn value(&self, key: &str) -> Option<&str> {
        self.0.style.get(key).map(String::as_str)
    }

    fn options(&self) -> ParseOptions {
        self.0.options
    }
}
