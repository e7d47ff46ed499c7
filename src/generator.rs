use crate::debug::{DiagnosticKind, Diagnostics};
use crate::dom::FilterEffect;
use crate::layer::{
    ColorConverter, Contents, DefaultColorConverter, Fill, FillAttributes, Gradient,
    Image, Layer, LinearGradient, LuminanceColorConverter, RadialGradient, Shape, Stroke,
    StrokeAttributes, TextAttributes, Units,
};
use crate::options::RenderOptions;
use crate::renderer::{RendererCommand, RendererTypeProvider};
use crate::types::{BlendMode, FillRule, Point, Rect, Transform};

type Commands<P> = Vec<RendererCommand<<P as RendererTypeProvider>::Types>>;

/// Lowers a layer tree into renderer commands for one provider.
///
/// Capability warnings are logged once per generator; use a fresh instance
/// for each independent render.
pub struct CommandGenerator<P: RendererTypeProvider> {
    provider: P,
    options: RenderOptions,
    diagnostics: Diagnostics,
}

impl<P: RendererTypeProvider> CommandGenerator<P> {
    pub fn new(provider: P, options: RenderOptions) -> Self {
        Self {
            provider,
            options,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    pub fn render_commands(&mut self, layer: &Layer) -> Commands<P> {
        self.layer_commands(layer, &DefaultColorConverter)
    }

    fn transparency_disabled(&self) -> bool {
        self.options
            .contains(RenderOptions::DISABLE_TRANSPARENCY_LAYERS)
    }

    fn layer_commands(&mut self, layer: &Layer, converter: &dyn ColorConverter) -> Commands<P> {
        if layer.opacity <= 0.0 {
            return Vec::new();
        }
        if !layer.filters.is_empty() {
            if self.options.contains(RenderOptions::HIDE_UNSUPPORTED_FILTERS) {
                return Vec::new();
            }
            self.log_unsupported_filters(&layer.filters);
        }

        let transform_commands = self.transform_commands(&layer.transform);
        let opacity_commands = self.opacity_commands(layer.opacity);
        let clip_commands = self.clip_commands(&layer.clip, layer.clip_rule);
        let mask_commands = match &layer.mask {
            Some(mask) => self.mask_commands(mask),
            None => Vec::new(),
        };
        if !mask_commands.is_empty() && self.transparency_disabled() {
            self.diagnostics.warn_once(DiagnosticKind::UnsupportedMask, || {
                "PDF does not support transparency masks".to_string()
            });
            return Vec::new();
        }

        let opens_layer = opacity_commands
            .iter()
            .any(|c| matches!(c, RendererCommand::PushTransparencyLayer));
        let needs_state = !transform_commands.is_empty()
            || !opacity_commands.is_empty()
            || !clip_commands.is_empty()
            || !mask_commands.is_empty();

        let mut commands = Vec::new();
        if needs_state {
            commands.push(RendererCommand::PushState);
        }
        commands.extend(transform_commands);
        commands.extend(opacity_commands);
        commands.extend(clip_commands);

        let masked = !mask_commands.is_empty();
        if masked {
            commands.push(RendererCommand::PushTransparencyLayer);
        }
        for contents in &layer.contents {
            commands.extend(self.contents_commands(contents, converter));
        }
        if masked {
            commands.extend(mask_commands);
            commands.push(RendererCommand::PopTransparencyLayer);
        }
        if opens_layer {
            commands.push(RendererCommand::PopTransparencyLayer);
        }
        if needs_state {
            commands.push(RendererCommand::PopState);
        }
        commands
    }

    fn contents_commands(&mut self, contents: &Contents, converter: &dyn ColorConverter) -> Commands<P> {
        match contents {
            Contents::Shape(shape, stroke, fill) => self.shape_commands(shape, stroke, fill, converter),
            Contents::Image(image) => self.image_commands(image),
            Contents::Text(text, point, attributes) => {
                self.text_commands(text, *point, attributes, converter)
            }
            Contents::Layer(layer) => self.layer_commands(layer, converter),
        }
    }

    fn shape_commands(
        &mut self,
        shape: &Shape,
        stroke: &StrokeAttributes,
        fill: &FillAttributes,
        converter: &dyn ColorConverter,
    ) -> Commands<P> {
        let mut commands = Vec::new();
        let path = self.provider.create_path(shape);

        match &fill.fill {
            Fill::Color(color) => {
                if !color.is_none() {
                    commands.push(RendererCommand::SetFillColor(
                        self.provider.create_color(converter.convert(*color)),
                    ));
                    commands.push(RendererCommand::Fill {
                        path: path.clone(),
                        rule: self.provider.create_fill_rule(fill.rule),
                    });
                }
            }
            Fill::Pattern(pattern) => {
                let mut contents = Vec::new();
                for item in &pattern.contents {
                    contents.extend(self.contents_commands(item, converter));
                }
                let pattern = self.provider.create_pattern(pattern, contents);
                commands.push(RendererCommand::SetFillPattern(pattern));
                commands.push(RendererCommand::Fill {
                    path: path.clone(),
                    rule: self.provider.create_fill_rule(fill.rule),
                });
            }
            Fill::LinearGradient(gradient) => {
                if self.can_render_gradient(&gradient.gradient) {
                    let bounds = self.provider.get_bounds(shape);
                    commands.push(RendererCommand::PushState);
                    commands.push(RendererCommand::SetClip {
                        path: path.clone(),
                        rule: self.provider.create_fill_rule(fill.rule),
                    });
                    commands.extend(self.linear_gradient_commands(gradient, bounds, fill.opacity, converter));
                    commands.push(RendererCommand::PopState);
                }
            }
            Fill::RadialGradient(gradient) => {
                if self.can_render_gradient(&gradient.gradient) {
                    let bounds = self.provider.get_bounds(shape);
                    commands.push(RendererCommand::PushState);
                    commands.push(RendererCommand::SetClip {
                        path: path.clone(),
                        rule: self.provider.create_fill_rule(fill.rule),
                    });
                    commands.extend(self.radial_gradient_commands(gradient, bounds, fill.opacity, converter));
                    commands.push(RendererCommand::PopState);
                }
            }
        }

        match &stroke.color {
            Stroke::Color(color) => {
                if !color.is_none() && stroke.width > 0.0 {
                    commands.extend(self.line_commands(stroke));
                    commands.push(RendererCommand::SetStrokeColor(
                        self.provider.create_color(converter.convert(*color)),
                    ));
                    commands.push(RendererCommand::Stroke(path));
                }
            }
            Stroke::LinearGradient(gradient) => {
                if self.can_render_gradient(&gradient.gradient) {
                    let bounds = self.provider.get_bounds(shape);
                    commands.push(RendererCommand::PushState);
                    commands.extend(self.line_commands(stroke));
                    commands.push(RendererCommand::ClipStrokeOutline(path));
                    commands.extend(self.linear_gradient_commands(gradient, bounds, stroke.opacity, converter));
                    commands.push(RendererCommand::PopState);
                }
            }
            Stroke::RadialGradient(gradient) => {
                if self.can_render_gradient(&gradient.gradient) {
                    let bounds = self.provider.get_bounds(shape);
                    commands.push(RendererCommand::PushState);
                    commands.extend(self.line_commands(stroke));
                    commands.push(RendererCommand::ClipStrokeOutline(path));
                    commands.extend(self.radial_gradient_commands(gradient, bounds, stroke.opacity, converter));
                    commands.push(RendererCommand::PopState);
                }
            }
        }
        commands
    }

    fn line_commands(&self, stroke: &StrokeAttributes) -> Commands<P> {
        vec![
            RendererCommand::SetLineCap(self.provider.create_line_cap(stroke.cap)),
            RendererCommand::SetLineJoin(self.provider.create_line_join(stroke.join)),
            RendererCommand::SetLineWidth(self.provider.create_float(stroke.width)),
            RendererCommand::SetLineMiterLimit(self.provider.create_float(stroke.miter_limit)),
        ]
    }

    fn image_commands(&self, image: &Image) -> Commands<P> {
        match self.provider.create_image(image) {
            Some(image) => vec![RendererCommand::DrawImage(image)],
            None => Vec::new(),
        }
    }

    fn text_commands(
        &self,
        text: &str,
        point: Point,
        attributes: &TextAttributes,
        converter: &dyn ColorConverter,
    ) -> Commands<P> {
        let Some(path) = self.provider.create_text_path(text, point, attributes) else {
            return Vec::new();
        };
        vec![
            RendererCommand::SetFillColor(
                self.provider.create_color(converter.convert(attributes.color)),
            ),
            RendererCommand::Fill {
                path,
                rule: self.provider.create_fill_rule(FillRule::NonZero),
            },
        ]
    }

    /// Alpha inside a transparency layer, or bare alpha when layers are disabled.
    fn opacity_commands(&self, opacity: f32) -> Commands<P> {
        if opacity >= 1.0 {
            return Vec::new();
        }
        let mut commands = vec![RendererCommand::SetAlpha(self.provider.create_float(opacity))];
        if !self.transparency_disabled() {
            commands.push(RendererCommand::PushTransparencyLayer);
        }
        commands
    }

    fn transform_commands(&self, transforms: &[Transform]) -> Commands<P> {
        transforms
            .iter()
            .map(|transform| match *transform {
                Transform::Matrix(m) => RendererCommand::Concatenate(self.provider.create_transform(m)),
                Transform::Translate { tx, ty } => RendererCommand::Translate {
                    tx: self.provider.create_float(tx),
                    ty: self.provider.create_float(ty),
                },
                Transform::Scale { sx, sy } => RendererCommand::Scale {
                    sx: self.provider.create_float(sx),
                    sy: self.provider.create_float(sy),
                },
                Transform::Rotate { radians } => {
                    RendererCommand::Rotate(self.provider.create_float(radians))
                }
            })
            .collect()
    }

    fn clip_commands(&self, shapes: &[Shape], rule: Option<FillRule>) -> Commands<P> {
        if shapes.is_empty() {
            return Vec::new();
        }
        let paths = shapes.iter().map(|s| self.provider.create_path(s)).collect();
        vec![RendererCommand::SetClip {
            path: self.provider.create_compound_path(paths),
            rule: self.provider.create_fill_rule(rule.unwrap_or_default()),
        }]
    }

    /// Luminance of the mask contents composited with destination-in.
    fn mask_commands(&mut self, mask: &Layer) -> Commands<P> {
        let mut commands = vec![
            RendererCommand::SetBlendMode(self.provider.create_blend_mode(BlendMode::DestinationIn)),
            RendererCommand::PushTransparencyLayer,
            RendererCommand::SetBlendMode(self.provider.create_blend_mode(BlendMode::Copy)),
        ];
        for contents in &mask.contents {
            commands.extend(self.contents_commands(contents, &LuminanceColorConverter));
        }
        commands.push(RendererCommand::PopTransparencyLayer);
        commands
    }

    fn can_render_gradient(&mut self, gradient: &Gradient) -> bool {
        if !self.transparency_disabled() || gradient.is_opaque() {
            return true;
        }
        self.diagnostics.warn_once(DiagnosticKind::UnsupportedGradient, || {
            "PDF does not support gradients with stop-opacity".to_string()
        });
        false
    }

    fn linear_gradient_commands(
        &self,
        gradient: &LinearGradient,
        bounds: Rect,
        opacity: f32,
        converter: &dyn ColorConverter,
    ) -> Commands<P> {
        let (start, end) = match gradient.units {
            Units::ObjectBoundingBox => (
                point_in(bounds, gradient.start),
                point_in(bounds, gradient.end),
            ),
            Units::UserSpaceOnUse => (gradient.start, gradient.end),
        };
        let mut commands = self.transform_commands(&gradient.transform);
        commands.push(RendererCommand::SetAlpha(self.provider.create_float(opacity)));
        commands.push(RendererCommand::DrawLinearGradient {
            gradient: self
                .provider
                .create_gradient(&convert_stops(&gradient.gradient, converter)),
            start: self.provider.create_point(start),
            end: self.provider.create_point(end),
        });
        commands
    }

    fn radial_gradient_commands(
        &self,
        gradient: &RadialGradient,
        bounds: Rect,
        opacity: f32,
        converter: &dyn ColorConverter,
    ) -> Commands<P> {
        let (start_center, start_radius, end_center, end_radius) = match gradient.units {
            Units::ObjectBoundingBox => {
                let extent = bounds.width().max(bounds.height());
                (
                    point_in(bounds, gradient.center),
                    extent * gradient.radius,
                    point_in(bounds, gradient.end_center),
                    extent * gradient.end_radius,
                )
            }
            Units::UserSpaceOnUse => (
                gradient.center,
                gradient.radius,
                gradient.end_center,
                gradient.end_radius,
            ),
        };
        let mut commands = self.transform_commands(&gradient.transform);
        commands.push(RendererCommand::SetAlpha(self.provider.create_float(opacity)));
        commands.push(RendererCommand::DrawRadialGradient {
            gradient: self
                .provider
                .create_gradient(&convert_stops(&gradient.gradient, converter)),
            start_center: self.provider.create_point(start_center),
            start_radius: self.provider.create_float(start_radius),
            end_center: self.provider.create_point(end_center),
            end_radius: self.provider.create_float(end_radius),
        });
        commands
    }

    fn log_unsupported_filters(&mut self, filters: &[FilterEffect]) {
        let names = filters
            .iter()
            .map(|f| match f {
                FilterEffect::GaussianBlur { .. } => "<feGaussianBlur>",
            })
            .collect::<Vec<_>>()
            .join(", ");
        let hint = if self.options.contains(RenderOptions::COMMAND_LINE) {
            "[--hideUnsupportedFilters]"
        } else {
            "RenderOptions::HIDE_UNSUPPORTED_FILTERS"
        };
        self.diagnostics.warn_once(DiagnosticKind::UnsupportedFilter, || {
            format!("{names} is not supported. Elements with this filter can be hidden with {hint}")
        });
    }
}

/// Maps a unit-square offset onto `bounds`.
fn point_in(bounds: Rect, offset: Point) -> Point {
    Point::new(
        bounds.x() + bounds.width() * offset.x,
        bounds.y() + bounds.height() * offset.y,
    )
}

/// Stop colors through the converter with stop-opacity folded into alpha.
fn convert_stops(gradient: &Gradient, converter: &dyn ColorConverter) -> Gradient {
    Gradient {
        stops: gradient
            .stops
            .iter()
            .map(|stop| {
                let mut stop = *stop;
                stop.color = converter.convert(stop.color).with_multiplying_alpha(stop.opacity);
                stop
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{Color, GradientStop, Pattern};
    use crate::renderer::{LayerTreeProvider, LayerTreeTypes};
    use crate::types::{LineCap, LineJoin, Size};

    type Command = RendererCommand<LayerTreeTypes>;

    fn square() -> Shape {
        Shape::Rect {
            rect: Rect::new(10.0, 20.0, 100.0, 50.0),
            radii: Size::ZERO,
        }
    }

    fn no_stroke() -> StrokeAttributes {
        StrokeAttributes {
            color: Stroke::Color(Color::None),
            opacity: 1.0,
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
        }
    }

    fn red_fill() -> FillAttributes {
        FillAttributes::color(Color::rgb(1.0, 0.0, 0.0), FillRule::NonZero)
    }

    fn shape_layer(stroke: StrokeAttributes, fill: FillAttributes) -> Layer {
        let mut layer = Layer::new();
        layer.contents.push(Contents::Shape(square(), stroke, fill));
        layer
    }

    fn make_generator(options: RenderOptions) -> CommandGenerator<LayerTreeProvider> {
        CommandGenerator::new(LayerTreeProvider::new(), options)
    }

    fn translucent_gradient() -> Gradient {
        Gradient {
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: Color::BLACK,
                    opacity: 1.0,
                },
                GradientStop {
                    offset: 1.0,
                    color: Color::WHITE,
                    opacity: 0.5,
                },
            ],
        }
    }

    fn linear(gradient: Gradient) -> LinearGradient {
        LinearGradient {
            gradient,
            start: Point::new(0.0, 0.0),
            end: Point::new(1.0, 0.0),
            units: Units::ObjectBoundingBox,
            transform: Vec::new(),
        }
    }

    #[test]
    fn plain_layer_needs_no_state() {
        let commands = make_generator(RenderOptions::NONE).render_commands(&shape_layer(no_stroke(), red_fill()));
        assert_eq!(
            commands,
            vec![
                Command::SetFillColor(Color::rgb(1.0, 0.0, 0.0)),
                Command::Fill {
                    path: vec![square()],
                    rule: FillRule::NonZero
                },
            ]
        );
    }

    #[test]
    fn simple_layer_matches_its_contents() {
        let inner = shape_layer(no_stroke(), red_fill());
        let mut outer = Layer::new();
        outer.contents.push(Contents::Layer(inner.clone()));
        let mut generator = make_generator(RenderOptions::NONE);
        assert_eq!(generator.render_commands(&outer), generator.render_commands(&inner));
    }

    #[test]
    fn scopes_open_in_order() {
        let mut layer = shape_layer(no_stroke(), red_fill());
        layer.transform = vec![Transform::Translate { tx: 1.0, ty: 2.0 }];
        layer.opacity = 0.5;
        layer.clip = vec![Shape::Ellipse(Rect::new(0.0, 0.0, 5.0, 5.0))];
        let commands = make_generator(RenderOptions::NONE).render_commands(&layer);
        assert_eq!(commands[0], Command::PushState);
        assert_eq!(commands[1], Command::Translate { tx: 1.0, ty: 2.0 });
        assert_eq!(commands[2], Command::SetAlpha(0.5));
        assert_eq!(commands[3], Command::PushTransparencyLayer);
        assert!(matches!(commands[4], Command::SetClip { rule: FillRule::NonZero, .. }));
        let n = commands.len();
        assert_eq!(commands[n - 2], Command::PopTransparencyLayer);
        assert_eq!(commands[n - 1], Command::PopState);
    }

    #[test]
    fn transparent_layers_render_nothing() {
        let mut layer = shape_layer(no_stroke(), red_fill());
        layer.opacity = 0.0;
        assert!(make_generator(RenderOptions::NONE).render_commands(&layer).is_empty());
    }

    #[test]
    fn mask_wraps_contents_and_uses_luminance() {
        let mut layer = shape_layer(no_stroke(), red_fill());
        layer.mask = Some(Box::new(shape_layer(
            no_stroke(),
            FillAttributes::color(Color::WHITE, FillRule::NonZero),
        )));
        let commands = make_generator(RenderOptions::NONE).render_commands(&layer);
        let expected_tail = vec![
            Command::SetBlendMode(BlendMode::DestinationIn),
            Command::PushTransparencyLayer,
            Command::SetBlendMode(BlendMode::Copy),
            Command::SetFillColor(LuminanceColorConverter.convert(Color::WHITE)),
            Command::Fill {
                path: vec![square()],
                rule: FillRule::NonZero,
            },
            Command::PopTransparencyLayer,
            Command::PopTransparencyLayer,
            Command::PopState,
        ];
        assert_eq!(commands[0], Command::PushState);
        assert_eq!(commands[1], Command::PushTransparencyLayer);
        assert_eq!(&commands[commands.len() - expected_tail.len()..], &expected_tail[..]);
    }

    #[test]
    fn masks_are_dropped_without_transparency_layers() {
        let mut layer = shape_layer(no_stroke(), red_fill());
        layer.mask = Some(Box::new(shape_layer(no_stroke(), red_fill())));
        let mut generator = make_generator(RenderOptions::DISABLE_TRANSPARENCY_LAYERS);
        assert!(generator.render_commands(&layer).is_empty());
        assert!(generator.render_commands(&layer).is_empty());
        assert_eq!(generator.diagnostics().records().len(), 1);
        assert_eq!(generator.diagnostics().count(DiagnosticKind::UnsupportedMask), 2);
    }

    #[test]
    fn linear_gradient_maps_bounding_box() {
        let mut fill = red_fill();
        fill.fill = Fill::LinearGradient(linear(translucent_gradient()));
        fill.opacity = 0.8;
        let commands = make_generator(RenderOptions::NONE).render_commands(&shape_layer(no_stroke(), fill));
        assert_eq!(commands[0], Command::PushState);
        assert!(matches!(commands[1], Command::SetClip { .. }));
        assert_eq!(commands[2], Command::SetAlpha(0.8));
        match &commands[3] {
            Command::DrawLinearGradient {
                gradient,
                start,
                end,
            } => {
                assert_eq!(*start, Point::new(10.0, 20.0));
                assert_eq!(*end, Point::new(110.0, 20.0));
                assert_eq!(gradient.stops[1].color.alpha(), 0.5);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(commands[4], Command::PopState);
    }

    #[test]
    fn translucent_gradients_are_suppressed_once() {
        let mut fill = red_fill();
        fill.fill = Fill::LinearGradient(linear(translucent_gradient()));
        let layer = shape_layer(no_stroke(), fill);
        let mut root = Layer::new();
        root.contents = vec![Contents::Layer(layer.clone()), Contents::Layer(layer)];
        let mut generator = make_generator(RenderOptions::DISABLE_TRANSPARENCY_LAYERS);
        assert!(generator.render_commands(&root).is_empty());
        assert_eq!(generator.diagnostics().records().len(), 1);
        assert_eq!(
            generator.diagnostics().records()[0].message,
            "PDF does not support gradients with stop-opacity"
        );
    }

    #[test]
    fn radial_gradient_stroke_clips_to_outline() {
        let stroke = StrokeAttributes {
            color: Stroke::RadialGradient(RadialGradient {
                gradient: translucent_gradient(),
                center: Point::new(0.5, 0.5),
                radius: 0.0,
                end_center: Point::new(0.5, 0.5),
                end_radius: 0.5,
                units: Units::ObjectBoundingBox,
                transform: Vec::new(),
            }),
            opacity: 0.25,
            width: 2.0,
            cap: LineCap::Round,
            join: LineJoin::Bevel,
            miter_limit: 4.0,
        };
        let mut fill = red_fill();
        fill.fill = Fill::Color(Color::None);
        let commands = make_generator(RenderOptions::NONE).render_commands(&shape_layer(stroke, fill));
        assert_eq!(commands[0], Command::PushState);
        assert_eq!(commands[1], Command::SetLineCap(LineCap::Round));
        assert_eq!(commands[5], Command::ClipStrokeOutline(vec![square()]));
        assert_eq!(commands[6], Command::SetAlpha(0.25));
        match &commands[7] {
            Command::DrawRadialGradient {
                start_center,
                end_radius,
                ..
            } => {
                assert_eq!(*start_center, Point::new(60.0, 45.0));
                assert_eq!(*end_radius, 50.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn solid_stroke_sets_line_state() {
        let mut stroke = no_stroke();
        stroke.color = Stroke::Color(Color::BLACK);
        let mut fill = red_fill();
        fill.fill = Fill::Color(Color::None);
        let commands = make_generator(RenderOptions::NONE).render_commands(&shape_layer(stroke, fill));
        assert_eq!(
            commands,
            vec![
                Command::SetLineCap(LineCap::Butt),
                Command::SetLineJoin(LineJoin::Miter),
                Command::SetLineWidth(1.0),
                Command::SetLineMiterLimit(4.0),
                Command::SetStrokeColor(Color::BLACK),
                Command::Stroke(vec![square()]),
            ]
        );
    }

    #[test]
    fn pattern_fill_sets_pattern() {
        let mut pattern = Pattern::new(Rect::new(0.0, 0.0, 4.0, 4.0));
        pattern.contents.push(Contents::Shape(
            Shape::Ellipse(Rect::new(0.0, 0.0, 2.0, 2.0)),
            no_stroke(),
            red_fill(),
        ));
        let mut fill = red_fill();
        fill.fill = Fill::Pattern(pattern.clone());
        let commands = make_generator(RenderOptions::NONE).render_commands(&shape_layer(no_stroke(), fill));
        assert_eq!(commands[0], Command::SetFillPattern(pattern));
        assert!(matches!(commands[1], Command::Fill { .. }));
    }

    #[test]
    fn filters_warn_or_hide() {
        let mut layer = shape_layer(no_stroke(), red_fill());
        layer.filters = vec![FilterEffect::GaussianBlur { std_deviation: 2.0 }];

        assert!(make_generator(RenderOptions::HIDE_UNSUPPORTED_FILTERS)
            .render_commands(&layer)
            .is_empty());

        let mut generator = make_generator(RenderOptions::COMMAND_LINE);
        assert_eq!(generator.render_commands(&layer).len(), 2);
        let message = &generator.diagnostics().records()[0].message;
        assert!(message.starts_with("<feGaussianBlur> is not supported"), "{message}");
        assert!(message.ends_with("[--hideUnsupportedFilters]"), "{message}");
    }

    #[test]
    fn opacity_without_transparency_layers_sets_alpha_only() {
        let mut layer = shape_layer(no_stroke(), red_fill());
        layer.opacity = 0.5;
        let commands = make_generator(RenderOptions::DISABLE_TRANSPARENCY_LAYERS).render_commands(&layer);
        assert!(!commands.iter().any(|c| matches!(c, Command::PushTransparencyLayer)));
        assert_eq!(commands[1], Command::SetAlpha(0.5));
        assert_eq!(commands.last(), Some(&Command::PopState));
    }
}
