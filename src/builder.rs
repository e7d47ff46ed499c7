use std::collections::HashSet;
use std::sync::Arc;

use base64::Engine;
use image::GenericImageView;

use crate::color::{DomColor, DomFill};
use crate::debug::{DiagnosticKind, Diagnostics};
use crate::dom::{
    self, DisplayMode, ElementKind, GraphicsElement, PresentationAttributes, Svg, TextAnchor,
    ViewBox, fragment, presentation_attributes,
};
use crate::error::LayerTreeError;
use crate::layer::{
    Color, Contents, Fill, FillAttributes, Gradient, GradientStop, Image, ImageFormat, Layer,
    LinearGradient, Pattern, RadialGradient, Shape, Stroke, StrokeAttributes, TextAttributes,
    Units,
};
use crate::path::Path;
use crate::renderer::TextOutlineService;
use crate::transform::{DomTransform, layer_transforms};
use crate::types::{
    FillRule, LineCap, LineJoin, Point, Rect, Size, Transform, transforms_to_matrix,
};

/// Inherited cascade state while walking the DOM.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub color: DomColor,
    pub fill: DomFill,
    pub fill_opacity: f32,
    pub fill_rule: FillRule,
    pub stroke: DomFill,
    pub stroke_width: f32,
    pub stroke_opacity: f32,
    pub stroke_line_cap: LineCap,
    pub stroke_line_join: LineJoin,
    pub stroke_miter_limit: f32,
    pub font_family: String,
    pub font_size: f32,
    pub text_anchor: TextAnchor,
}

impl Default for State {
    fn default() -> Self {
        Self {
            color: DomColor::Keyword("black"),
            fill: DomFill::Color(DomColor::Keyword("black")),
            fill_opacity: 1.0,
            fill_rule: FillRule::NonZero,
            stroke: DomFill::Color(DomColor::None),
            stroke_width: 1.0,
            stroke_opacity: 1.0,
            stroke_line_cap: LineCap::Butt,
            stroke_line_join: LineJoin::Miter,
            stroke_miter_limit: 4.0,
            font_family: "Helvetica".to_string(),
            font_size: 12.0,
            text_anchor: TextAnchor::Start,
        }
    }
}

impl State {
    /// Child state: inheritable attributes override, everything else carries.
    pub fn inheriting(&self, attributes: &PresentationAttributes) -> State {
        State {
            color: attributes.color.unwrap_or(self.color),
            fill: attributes.fill.clone().unwrap_or_else(|| self.fill.clone()),
            fill_opacity: attributes.fill_opacity.unwrap_or(self.fill_opacity),
            fill_rule: attributes.fill_rule.unwrap_or(self.fill_rule),
            stroke: attributes
                .stroke
                .clone()
                .unwrap_or_else(|| self.stroke.clone()),
            stroke_width: attributes.stroke_width.unwrap_or(self.stroke_width),
            stroke_opacity: attributes.stroke_opacity.unwrap_or(self.stroke_opacity),
            stroke_line_cap: attributes.stroke_line_cap.unwrap_or(self.stroke_line_cap),
            stroke_line_join: attributes.stroke_line_join.unwrap_or(self.stroke_line_join),
            stroke_miter_limit: attributes
                .stroke_miter_limit
                .unwrap_or(self.stroke_miter_limit),
            font_family: attributes
                .font_family
                .clone()
                .unwrap_or_else(|| self.font_family.clone()),
            font_size: attributes.font_size.unwrap_or(self.font_size),
            text_anchor: attributes.text_anchor.unwrap_or(self.text_anchor),
        }
    }
}

/// Resolves a parsed document into a layer tree.
pub struct LayerTreeBuilder<'a> {
    svg: &'a Svg,
    text_service: Option<Arc<dyn TextOutlineService + Send + Sync>>,
    drop_failing_subtrees: bool,
    diagnostics: Diagnostics,
    active_references: Vec<String>,
}

impl<'a> LayerTreeBuilder<'a> {
    pub fn new(svg: &'a Svg) -> Self {
        Self {
            svg,
            text_service: None,
            drop_failing_subtrees: true,
            diagnostics: Diagnostics::new(),
            active_references: Vec::new(),
        }
    }

    pub fn text_service(
        mut self,
        service: Option<Arc<dyn TextOutlineService + Send + Sync>>,
    ) -> Self {
        self.text_service = service;
        self
    }

    pub fn drop_failing_subtrees(mut self, enabled: bool) -> Self {
        self.drop_failing_subtrees = enabled;
        self
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    pub fn build(&mut self) -> Result<Layer, LayerTreeError> {
        let svg = self.svg;
        let attributes = presentation_attributes(&svg.common, "svg", &svg.styles);
        let state = State::default().inheriting(&attributes);

        let mut layer = Layer::new();
        layer.transform = view_box_transforms(svg.width, svg.height, svg.view_box);
        self.apply_layer_attributes(&mut layer, &attributes, &state)?;
        for child in &svg.children {
            self.append_child(&mut layer, child, &state)?;
        }
        tracing::debug!(
            contents = layer.contents.len(),
            dropped = self.diagnostics.count(DiagnosticKind::DroppedElement),
            "built layer tree"
        );
        Ok(layer)
    }

    fn append_child(
        &mut self,
        layer: &mut Layer,
        element: &GraphicsElement,
        state: &State,
    ) -> Result<(), LayerTreeError> {
        match self.make_layer(element, state) {
            Ok(child) => layer.append_contents(Contents::Layer(child)),
            Err(err) if self.drop_failing_subtrees => {
                self.diagnostics.record(
                    DiagnosticKind::DroppedElement,
                    format!("dropped <{}>: {err}", element.element_name()),
                );
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    pub fn make_layer(
        &mut self,
        element: &GraphicsElement,
        state: &State,
    ) -> Result<Layer, LayerTreeError> {
        let attributes =
            presentation_attributes(&element.common, element.element_name(), &self.svg.styles);
        if attributes.display == Some(DisplayMode::None) {
            return Ok(Layer::new());
        }
        let state = state.inheriting(&attributes);

        let mut layer = Layer::new();
        self.apply_layer_attributes(&mut layer, &attributes, &state)?;

        match &element.kind {
            ElementKind::Group { children } | ElementKind::Anchor { children, .. } => {
                for child in children {
                    self.append_child(&mut layer, child, &state)?;
                }
            }
            ElementKind::Svg {
                width,
                height,
                view_box,
                children,
            } => {
                layer
                    .transform
                    .extend(view_box_transforms(*width, *height, *view_box));
                for child in children {
                    self.append_child(&mut layer, child, &state)?;
                }
            }
            ElementKind::Use { href, x, y } => {
                let (x, y) = (x.unwrap_or(0.0), y.unwrap_or(0.0));
                let contents = self.make_use_contents(href, x, y, &state)?;
                layer.append_contents(contents);
            }
            ElementKind::Text { x, y, value } => {
                let point = Point::new(x.unwrap_or(0.0), y.unwrap_or(0.0));
                layer.append_contents(self.make_text_contents(value, point, &state));
            }
            ElementKind::Image {
                href,
                x,
                y,
                width,
                height,
            } => {
                let frame = Rect::new(x.unwrap_or(0.0), y.unwrap_or(0.0), *width, *height);
                layer.append_contents(Contents::Image(make_image(href, frame)?));
            }
            _ => {
                if let Some(shape) = make_shape(element) {
                    let contents = self.make_shape_contents(shape, &state)?;
                    layer.append_contents(contents);
                }
            }
        }
        Ok(layer)
    }

    fn apply_layer_attributes(
        &mut self,
        layer: &mut Layer,
        attributes: &PresentationAttributes,
        state: &State,
    ) -> Result<(), LayerTreeError> {
        let svg = self.svg;
        let defs = &svg.defs;
        layer.opacity = attributes.opacity.unwrap_or(1.0).clamp(0.0, 1.0);
        if let Some(transform) = &attributes.transform {
            layer.transform.extend(layer_transforms(transform));
        }
        if let Some(href) = &attributes.clip_path {
            let clip = fragment(href)
                .and_then(|id| defs.clip_path(id))
                .ok_or_else(|| LayerTreeError::MissingReference(href.clone()))?;
            layer.clip = clip.children.iter().filter_map(|c| self.make_clip_shape(c)).collect();
            layer.clip_rule = attributes.clip_rule;
        }
        if let Some(href) = &attributes.mask {
            let mask = fragment(href)
                .and_then(|id| defs.mask(id))
                .ok_or_else(|| LayerTreeError::MissingReference(href.clone()))?;
            let mut mask_layer = Layer::new();
            self.enter(href, &mask.id)?;
            let result = mask
                .children
                .iter()
                .try_for_each(|child| self.append_child(&mut mask_layer, child, state));
            self.leave();
            result?;
            layer.mask = Some(Box::new(mask_layer));
        }
        if let Some(href) = &attributes.filter {
            let filter = fragment(href)
                .and_then(|id| defs.filter(id))
                .ok_or_else(|| LayerTreeError::MissingReference(href.clone()))?;
            layer.filters = filter.effects.clone();
        }
        Ok(())
    }

    /// Clip children keep their own transform baked into the outline.
    fn make_clip_shape(&self, element: &GraphicsElement) -> Option<Shape> {
        let shape = make_shape(element)?;
        let attributes =
            presentation_attributes(&element.common, element.element_name(), &self.svg.styles);
        match attributes.transform.as_deref() {
            Some(transform) if !transform.is_empty() => {
                let matrix = transforms_to_matrix(&layer_transforms(transform));
                Some(Shape::Path(shape.path().applying(matrix)))
            }
            _ => Some(shape),
        }
    }

    fn enter(&mut self, href: &str, id: &str) -> Result<(), LayerTreeError> {
        if self.active_references.iter().any(|a| a == id) {
            return Err(LayerTreeError::CyclicReference(href.to_string()));
        }
        self.active_references.push(id.to_string());
        Ok(())
    }

    fn leave(&mut self) {
        self.active_references.pop();
    }

    fn make_use_contents(
        &mut self,
        href: &str,
        x: f32,
        y: f32,
        state: &State,
    ) -> Result<Contents, LayerTreeError> {
        let svg = self.svg;
        let (id, element) = fragment(href)
            .and_then(|id| svg.defs.element(id).map(|e| (id, e)))
            .ok_or_else(|| LayerTreeError::MissingReference(href.to_string()))?;
        self.enter(href, id)?;
        let result = self.make_layer(element, state);
        self.leave();
        let mut layer = result?;
        if x != 0.0 || y != 0.0 {
            layer.transform.insert(0, Transform::Translate { tx: x, ty: y });
        }
        Ok(Contents::Layer(layer))
    }

    fn make_text_contents(&self, text: &str, mut point: Point, state: &State) -> Contents {
        let color = match &state.fill {
            DomFill::Color(color) => Color::create(color, &state.color),
            DomFill::Url(_) => Color::BLACK,
        };
        let attributes = TextAttributes {
            color: color.with_multiplying_alpha(state.fill_opacity),
            font_name: state.font_family.clone(),
            size: state.font_size,
            anchor: state.text_anchor,
        };
        point.x += self.text_x_offset(text, &attributes);
        Contents::Text(text.to_string(), point, attributes)
    }

    fn text_x_offset(&self, text: &str, attributes: &TextAttributes) -> f32 {
        let Some(service) = &self.text_service else {
            return 0.0;
        };
        let Some(outline) = service.outline(text, &attributes.font_name, attributes.size) else {
            return 0.0;
        };
        match attributes.anchor {
            TextAnchor::Start => 0.0,
            TextAnchor::Middle => -outline.bounds.mid_x(),
            TextAnchor::End => -outline.bounds.max_x(),
        }
    }

    fn make_shape_contents(
        &mut self,
        shape: Shape,
        state: &State,
    ) -> Result<Contents, LayerTreeError> {
        let stroke = self.make_stroke_attributes(state)?;
        let fill = self.make_fill_attributes(state)?;
        Ok(Contents::Shape(shape, stroke, fill))
    }

    fn make_stroke_attributes(&mut self, state: &State) -> Result<StrokeAttributes, LayerTreeError> {
        let color = match &state.stroke {
            DomFill::Color(color) => Stroke::Color(
                Color::create(color, &state.color)
                    .with_multiplying_alpha(state.stroke_opacity)
                    .maybe_none(),
            ),
            DomFill::Url(href) => match self.make_paint_server(href, state)? {
                PaintServer::Linear(gradient) => Stroke::LinearGradient(gradient),
                PaintServer::Radial(gradient) => Stroke::RadialGradient(gradient),
                PaintServer::Pattern(_) => {
                    tracing::debug!(href = %href, "pattern strokes are not supported");
                    Stroke::Color(Color::None)
                }
            },
        };
        Ok(StrokeAttributes {
            color,
            opacity: state.stroke_opacity,
            width: state.stroke_width,
            cap: state.stroke_line_cap,
            join: state.stroke_line_join,
            miter_limit: state.stroke_miter_limit,
        })
    }

    fn make_fill_attributes(&mut self, state: &State) -> Result<FillAttributes, LayerTreeError> {
        let fill = match &state.fill {
            DomFill::Color(color) => {
                let color = Color::create(color, &state.color)
                    .with_multiplying_alpha(state.fill_opacity)
                    .maybe_none();
                return Ok(FillAttributes::color(color, state.fill_rule));
            }
            DomFill::Url(href) => match self.make_paint_server(href, state)? {
                PaintServer::Linear(gradient) => Fill::LinearGradient(gradient),
                PaintServer::Radial(gradient) => Fill::RadialGradient(gradient),
                PaintServer::Pattern(pattern) => Fill::Pattern(pattern),
            },
        };
        Ok(FillAttributes {
            fill,
            opacity: state.fill_opacity,
            rule: state.fill_rule,
        })
    }

    fn make_paint_server(&mut self, href: &str, state: &State) -> Result<PaintServer, LayerTreeError> {
        let svg = self.svg;
        let missing = || LayerTreeError::MissingReference(href.to_string());
        let id = fragment(href).ok_or_else(missing)?;
        if let Some(gradient) = svg.defs.linear_gradient(id) {
            return Ok(PaintServer::Linear(self.make_linear_gradient(gradient, state)?));
        }
        if let Some(gradient) = svg.defs.radial_gradient(id) {
            return Ok(PaintServer::Radial(self.make_radial_gradient(gradient, state)?));
        }
        if let Some(pattern) = svg.defs.pattern(id) {
            self.enter(href, id)?;
            let result = self.make_pattern(pattern, state);
            self.leave();
            return Ok(PaintServer::Pattern(result?));
        }
        Err(missing())
    }

    fn make_pattern(&mut self, pattern: &dom::Pattern, state: &State) -> Result<Pattern, LayerTreeError> {
        let frame = Rect::new(
            pattern.x.unwrap_or(0.0),
            pattern.y.unwrap_or(0.0),
            pattern.width,
            pattern.height,
        );
        let mut layer = Layer::new();
        for child in &pattern.children {
            self.append_child(&mut layer, child, state)?;
        }
        Ok(Pattern {
            frame,
            contents: layer.contents,
        })
    }

    fn make_linear_gradient(
        &self,
        element: &'a dom::LinearGradient,
        state: &State,
    ) -> Result<LinearGradient, LayerTreeError> {
        let mut resolved = element.clone();
        for ancestor in self.gradient_chain(&element.id, element.href.as_deref())? {
            if let GradientRef::Linear(parent) = ancestor {
                resolved.x1 = resolved.x1.or(parent.x1);
                resolved.y1 = resolved.y1.or(parent.y1);
                resolved.x2 = resolved.x2.or(parent.x2);
                resolved.y2 = resolved.y2.or(parent.y2);
            }
            ancestor.inherit_into(&mut resolved.stops, &mut resolved.units, &mut resolved.transform);
        }
        Ok(LinearGradient {
            gradient: make_gradient(&resolved.stops, state),
            start: Point::new(resolved.x1.unwrap_or(0.0), resolved.y1.unwrap_or(0.0)),
            end: Point::new(resolved.x2.unwrap_or(1.0), resolved.y2.unwrap_or(0.0)),
            units: resolved.units.map(Units::from).unwrap_or_default(),
            transform: layer_transforms(&resolved.transform),
        })
    }

    fn make_radial_gradient(
        &self,
        element: &'a dom::RadialGradient,
        state: &State,
    ) -> Result<RadialGradient, LayerTreeError> {
        let mut resolved = element.clone();
        for ancestor in self.gradient_chain(&element.id, element.href.as_deref())? {
            if let GradientRef::Radial(parent) = ancestor {
                resolved.cx = resolved.cx.or(parent.cx);
                resolved.cy = resolved.cy.or(parent.cy);
                resolved.r = resolved.r.or(parent.r);
                resolved.fx = resolved.fx.or(parent.fx);
                resolved.fy = resolved.fy.or(parent.fy);
                resolved.fr = resolved.fr.or(parent.fr);
            }
            ancestor.inherit_into(&mut resolved.stops, &mut resolved.units, &mut resolved.transform);
        }
        let cx = resolved.cx.unwrap_or(0.5);
        let cy = resolved.cy.unwrap_or(0.5);
        Ok(RadialGradient {
            gradient: make_gradient(&resolved.stops, state),
            center: Point::new(resolved.fx.unwrap_or(cx), resolved.fy.unwrap_or(cy)),
            radius: resolved.fr.unwrap_or(0.0),
            end_center: Point::new(cx, cy),
            end_radius: resolved.r.unwrap_or(0.5),
            units: resolved.units.map(Units::from).unwrap_or_default(),
            transform: layer_transforms(&resolved.transform),
        })
    }

    /// Gradients reached by following `href` from `id`, nearest first.
    fn gradient_chain(
        &self,
        id: &str,
        mut href: Option<&'a str>,
    ) -> Result<Vec<GradientRef<'a>>, LayerTreeError> {
        let svg: &'a Svg = self.svg;
        let defs = &svg.defs;
        let mut visited: HashSet<&str> = HashSet::from([id]);
        let mut chain = Vec::new();
        while let Some(link) = href {
            let missing = || LayerTreeError::MissingReference(link.to_string());
            let next = fragment(link).ok_or_else(missing)?;
            if !visited.insert(next) {
                return Err(LayerTreeError::CyclicReference(link.to_string()));
            }
            let parent = if let Some(g) = defs.linear_gradient(next) {
                href = g.href.as_deref();
                GradientRef::Linear(g)
            } else if let Some(g) = defs.radial_gradient(next) {
                href = g.href.as_deref();
                GradientRef::Radial(g)
            } else {
                return Err(missing());
            };
            chain.push(parent);
        }
        Ok(chain)
    }
}

enum PaintServer {
    Linear(LinearGradient),
    Radial(RadialGradient),
    Pattern(Pattern),
}

enum GradientRef<'a> {
    Linear(&'a dom::LinearGradient),
    Radial(&'a dom::RadialGradient),
}

impl GradientRef<'_> {
    /// Fills stops, units and transform the referencing gradient left unset.
    fn inherit_into(
        &self,
        stops: &mut Vec<dom::Stop>,
        units: &mut Option<dom::Units>,
        transform: &mut Vec<DomTransform>,
    ) {
        let (parent_stops, parent_units, parent_transform) = match self {
            GradientRef::Linear(g) => (&g.stops, g.units, &g.transform),
            GradientRef::Radial(g) => (&g.stops, g.units, &g.transform),
        };
        if stops.is_empty() {
            stops.extend_from_slice(parent_stops);
        }
        if units.is_none() {
            *units = parent_units;
        }
        if transform.is_empty() {
            transform.extend_from_slice(parent_transform);
        }
    }
}

fn make_gradient(stops: &[dom::Stop], state: &State) -> Gradient {
    Gradient {
        stops: stops
            .iter()
            .map(|stop| GradientStop {
                offset: stop.offset,
                color: Color::create(&stop.color, &state.color),
                opacity: stop.opacity,
            })
            .collect(),
    }
}

/// `[scale, translate]` mapping the view box onto the viewport.
fn view_box_transforms(width: f32, height: f32, view_box: Option<ViewBox>) -> Vec<Transform> {
    let Some(view_box) = view_box else {
        return Vec::new();
    };
    let mut transforms = Vec::new();
    if view_box.width > 0.0 && view_box.height > 0.0 {
        let sx = width / view_box.width;
        let sy = height / view_box.height;
        if sx != 1.0 || sy != 1.0 {
            transforms.push(Transform::Scale { sx, sy });
        }
    }
    if view_box.x != 0.0 || view_box.y != 0.0 {
        transforms.push(Transform::Translate {
            tx: -view_box.x,
            ty: -view_box.y,
        });
    }
    transforms
}

pub fn make_shape(element: &GraphicsElement) -> Option<Shape> {
    match &element.kind {
        ElementKind::Line { x1, y1, x2, y2 } => {
            Some(Shape::Line(vec![Point::new(*x1, *y1), Point::new(*x2, *y2)]))
        }
        ElementKind::Circle { cx, cy, r } => {
            let (cx, cy) = (cx.unwrap_or(0.0), cy.unwrap_or(0.0));
            Some(Shape::Ellipse(Rect::new(cx - r, cy - r, r * 2.0, r * 2.0)))
        }
        ElementKind::Ellipse { cx, cy, rx, ry } => {
            let (cx, cy) = (cx.unwrap_or(0.0), cy.unwrap_or(0.0));
            Some(Shape::Ellipse(Rect::new(cx - rx, cy - ry, rx * 2.0, ry * 2.0)))
        }
        ElementKind::Rect {
            x,
            y,
            width,
            height,
            rx,
            ry,
        } => Some(Shape::Rect {
            rect: Rect::new(x.unwrap_or(0.0), y.unwrap_or(0.0), *width, *height),
            radii: Size::new(
                rx.or(*ry).unwrap_or(0.0),
                ry.or(*rx).unwrap_or(0.0),
            ),
        }),
        ElementKind::Polyline { points } => Some(Shape::Line(points.clone())),
        ElementKind::Polygon { points } => Some(Shape::Polygon(points.clone())),
        ElementKind::Path { segments } => Some(Shape::Path(Path::from_dom(segments))),
        _ => None,
    }
}

fn make_image(href: &str, frame: Rect) -> Result<Image, LayerTreeError> {
    let (mime, data) = decode_data_url(href)
        .ok_or_else(|| LayerTreeError::Decode(format!("not a data url: {}", truncate(href))))?;
    let mut image = Image::new(&mime, data)
        .ok_or_else(|| LayerTreeError::Decode(format!("unsupported image data: {mime}")))?;
    let format = match image.format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
    };
    let decoded = image::load_from_memory_with_format(&image.data, format)
        .map_err(|err| LayerTreeError::Decode(err.to_string()))?;
    (image.pixel_width, image.pixel_height) = decoded.dimensions();
    image.frame = frame;
    Ok(image)
}

/// MIME type and payload of a `data:` URL.
fn decode_data_url(href: &str) -> Option<(String, Vec<u8>)> {
    let (header, payload) = href.strip_prefix("data:")?.split_once(',')?;
    let mime = header
        .split(';')
        .next()
        .filter(|v| !v.is_empty())
        .unwrap_or("text/plain")
        .to_ascii_lowercase();
    let data = if header.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.as_bytes())
            .ok()?
    } else {
        payload.as_bytes().to_vec()
    };
    Some((mime, data))
}

fn truncate(href: &str) -> &str {
    match href.char_indices().nth(32) {
        Some((idx, _)) => &href[..idx],
        None => href,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom_parser::XmlParser;
    use crate::renderer::TextOutline;
    use crate::xml::parse_xml;

    fn parse(text: &str) -> Svg {
        let root = parse_xml(text).expect("xml");
        XmlParser::default().parse_svg(&root).expect("svg")
    }

    fn build(text: &str) -> Result<Layer, LayerTreeError> {
        let svg = parse(text);
        LayerTreeBuilder::new(&svg).drop_failing_subtrees(false).build()
    }

    fn png_data_url() -> String {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).expect("png");
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes.into_inner());
        format!("data:image/png;base64,{payload}")
    }

    const NS: &str = r#"xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink""#;

    #[test]
    fn view_box_maps_to_size() {
        let layer = build(&format!(
            r#"<svg {NS} width="200" height="100" viewBox="10 10 100 50"><rect width="5" height="5"/></svg>"#
        ))
        .unwrap();
        assert_eq!(
            layer.transform,
            vec![
                Transform::Scale { sx: 2.0, sy: 2.0 },
                Transform::Translate { tx: -10.0, ty: -10.0 }
            ]
        );
        assert_eq!(layer.contents.len(), 1);
    }

    #[test]
    fn current_color_and_fill_opacity() {
        let layer = build(&format!(
            r#"<svg {NS} width="10" height="10"><g color="red"><rect width="5" height="5" fill="currentColor" fill-opacity="0.5" stroke="blue"/></g></svg>"#
        ))
        .unwrap();
        let Contents::Shape(_, stroke, fill) = &layer.contents[0] else {
            panic!("expected collapsed shape, got {:?}", layer.contents);
        };
        assert_eq!(fill.fill, Fill::Color(Color::rgb(1.0, 0.0, 0.0).with_alpha(0.5)));
        assert_eq!(stroke.color, Stroke::Color(Color::rgb(0.0, 0.0, 1.0)));
    }

    #[test]
    fn display_none_and_clamped_opacity() {
        let layer = build(&format!(
            r#"<svg {NS} width="10" height="10"><rect width="5" height="5" display="none"/><g opacity="3"><rect width="1" height="1"/><rect width="2" height="2"/></g></svg>"#
        ))
        .unwrap();
        assert_eq!(layer.contents.len(), 1);
        let Contents::Layer(group) = &layer.contents[0] else {
            panic!("expected group layer");
        };
        assert_eq!(group.opacity, 1.0);
        assert_eq!(group.contents.len(), 2);
    }

    #[test]
    fn use_prepends_translate() {
        let layer = build(&format!(
            r##"<svg {NS} width="10" height="10"><defs><rect id="r" width="1" height="1" transform="scale(2)"/></defs><use xlink:href="#r" x="3" y="4"/></svg>"##
        ))
        .unwrap();
        let Contents::Layer(used) = &layer.contents[0] else {
            panic!("expected use layer, got {:?}", layer.contents);
        };
        assert_eq!(used.transform[0], Transform::Translate { tx: 3.0, ty: 4.0 });
        assert_eq!(used.transform[1], Transform::Scale { sx: 2.0, sy: 2.0 });
    }

    #[test]
    fn missing_use_reference_names_href() {
        let err = build(&format!(
            r##"<svg {NS} width="10" height="10"><use href="#ghost"/></svg>"##
        ))
        .unwrap_err();
        assert_eq!(err, LayerTreeError::MissingReference("#ghost".to_string()));
        assert_eq!(err.to_string(), "missing referenced element: #ghost");
    }

    #[test]
    fn failing_subtrees_are_dropped_by_default() {
        let svg = parse(&format!(
            r##"<svg {NS} width="10" height="10"><use href="#ghost"/><rect width="1" height="1"/></svg>"##
        ));
        let mut builder = LayerTreeBuilder::new(&svg);
        let layer = builder.build().unwrap();
        assert_eq!(layer.contents.len(), 1);
        assert_eq!(builder.diagnostics().count(DiagnosticKind::DroppedElement), 1);
    }

    #[test]
    fn cyclic_use_fails_closed() {
        let err = build(&format!(
            r##"<svg {NS} width="10" height="10"><g id="loop"><use href="#loop"/></g></svg>"##
        ))
        .unwrap_err();
        assert_eq!(err, LayerTreeError::CyclicReference("#loop".to_string()));
    }

    #[test]
    fn gradient_href_inherits_stops() {
        let layer = build(&format!(
            r##"<svg {NS} width="10" height="10"><defs>
                <linearGradient id="base" gradientUnits="userSpaceOnUse"><stop offset="0" stop-color="red"/><stop offset="1" stop-color="blue" stop-opacity="0.5"/></linearGradient>
                <linearGradient id="child" href="#base" x2="10"/>
                <radialGradient id="round" href="#child" fx="0.2"/>
            </defs>
            <rect width="10" height="10" fill="url(#child)"/>
            <rect width="10" height="10" fill="url(#round)"/></svg>"##
        ))
        .unwrap();
        let Contents::Shape(_, _, fill) = &layer.contents[0] else {
            panic!("expected shape");
        };
        let Fill::LinearGradient(linear) = &fill.fill else {
            panic!("expected linear gradient");
        };
        assert_eq!(linear.gradient.stops.len(), 2);
        assert_eq!(linear.units, Units::UserSpaceOnUse);
        assert_eq!(linear.end, Point::new(10.0, 0.0));
        assert!(!linear.gradient.is_opaque());

        let Contents::Shape(_, _, fill) = &layer.contents[1] else {
            panic!("expected shape");
        };
        let Fill::RadialGradient(radial) = &fill.fill else {
            panic!("expected radial gradient");
        };
        assert_eq!(radial.center, Point::new(0.2, 0.5));
        assert_eq!(radial.end_center, Point::new(0.5, 0.5));
        assert_eq!(radial.end_radius, 0.5);
        assert_eq!(radial.gradient.stops.len(), 2);
    }

    #[test]
    fn cyclic_gradient_href_fails() {
        let err = build(&format!(
            r##"<svg {NS} width="10" height="10"><defs>
                <linearGradient id="a" href="#b"/><linearGradient id="b" href="#a"/>
            </defs><rect width="1" height="1" fill="url(#a)"/></svg>"##
        ))
        .unwrap_err();
        assert_eq!(err, LayerTreeError::CyclicReference("#a".to_string()));
    }

    #[test]
    fn clip_mask_and_filter_resolve() {
        let layer = build(&format!(
            r##"<svg {NS} width="10" height="10"><defs>
                <clipPath id="c"><rect width="4" height="4" transform="translate(1,1)"/><circle r="2"/></clipPath>
                <mask id="m"><rect width="10" height="10" fill="white"/></mask>
                <filter id="f"><feGaussianBlur stdDeviation="3"/></filter>
            </defs>
            <g clip-path="url(#c)" clip-rule="evenodd" mask="url(#m)" filter="url(#f)"><rect width="1" height="1"/></g></svg>"##
        ))
        .unwrap();
        let Contents::Layer(group) = &layer.contents[0] else {
            panic!("expected group layer");
        };
        assert_eq!(group.clip.len(), 2);
        assert!(matches!(group.clip[0], Shape::Path(_)));
        assert_eq!(group.clip[0].path().bounds(), Rect::new(1.0, 1.0, 4.0, 4.0));
        assert_eq!(group.clip_rule, Some(FillRule::EvenOdd));
        assert_eq!(group.mask.as_ref().map(|m| m.contents.len()), Some(1));
        assert_eq!(group.filters, vec![dom::FilterEffect::GaussianBlur { std_deviation: 3.0 }]);
    }

    #[test]
    fn pattern_fill_collects_contents() {
        let layer = build(&format!(
            r##"<svg {NS} width="10" height="10"><defs>
                <pattern id="p" width="4" height="4"><circle cx="2" cy="2" r="1"/></pattern>
            </defs><rect width="10" height="10" fill="url(#p)"/></svg>"##
        ))
        .unwrap();
        let Contents::Shape(_, _, fill) = &layer.contents[0] else {
            panic!("expected shape");
        };
        let Fill::Pattern(pattern) = &fill.fill else {
            panic!("expected pattern");
        };
        assert_eq!(pattern.frame, Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(pattern.contents.len(), 1);
    }

    #[test]
    fn images_decode_png_data() {
        let url = png_data_url();
        let layer = build(&format!(
            r#"<svg {NS} width="10" height="10"><image href="{url}" x="1" width="6" height="4"/></svg>"#
        ))
        .unwrap();
        let Contents::Image(image) = &layer.contents[0] else {
            panic!("expected image");
        };
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!((image.pixel_width, image.pixel_height), (3, 2));
        assert_eq!(image.frame, Rect::new(1.0, 0.0, 6.0, 4.0));
    }

    #[test]
    fn empty_or_unknown_images_fail() {
        let err = build(&format!(
            r#"<svg {NS} width="10" height="10"><image href="data:image/png;base64," width="1" height="1"/></svg>"#
        ))
        .unwrap_err();
        assert!(matches!(err, LayerTreeError::Decode(_)));
        let err = build(&format!(
            r#"<svg {NS} width="10" height="10"><image href="data:image/gif;base64,R0lGOD" width="1" height="1"/></svg>"#
        ))
        .unwrap_err();
        assert!(matches!(err, LayerTreeError::Decode(_)));
    }

    struct WideGlyphs;

    impl TextOutlineService for WideGlyphs {
        fn outline(&self, text: &str, _font_family: &str, size: f32) -> Option<TextOutline> {
            let bounds = Rect::new(0.0, -size, text.len() as f32 * 10.0, size);
            Some(TextOutline {
                path: Path::make_rect(bounds, Size::ZERO),
                bounds,
            })
        }
    }

    #[test]
    fn text_anchor_offsets_use_ink_bounds() {
        let svg = parse(&format!(
            r#"<svg {NS} width="100" height="100">
                <text x="50" y="10" text-anchor="middle" font-family="'Courier', monospace">abcd</text>
                <text x="50" y="20" text-anchor="end" font-size="20">ab</text>
                <text x="50" y="30">ab</text></svg>"#
        ));
        let layer = LayerTreeBuilder::new(&svg)
            .text_service(Some(Arc::new(WideGlyphs)))
            .build()
            .unwrap();
        let points: Vec<(Point, &TextAttributes)> = layer
            .contents
            .iter()
            .filter_map(|c| match c {
                Contents::Text(_, point, att) => Some((*point, att)),
                _ => None,
            })
            .collect();
        assert_eq!(points[0].0, Point::new(30.0, 10.0));
        assert_eq!(points[0].1.font_name, "Courier");
        assert_eq!(points[1].0, Point::new(30.0, 20.0));
        assert_eq!(points[1].1.size, 20.0);
        assert_eq!(points[2].0, Point::new(50.0, 30.0));
        assert_eq!(points[2].1.color, Color::BLACK);
    }

    #[test]
    fn rect_radii_default_to_each_other() {
        let element = GraphicsElement::new(ElementKind::Rect {
            x: None,
            y: None,
            width: 10.0,
            height: 10.0,
            rx: Some(2.0),
            ry: None,
        });
        assert_eq!(
            make_shape(&element),
            Some(Shape::Rect {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                radii: Size::new(2.0, 2.0)
            })
        );
    }
}
