use std::fmt::Debug;
use std::sync::Arc;

use crate::layer::{Color, Gradient, Image, Pattern, Shape, TextAttributes};
use crate::path::Path;
use crate::types::{BlendMode, FillRule, LineCap, LineJoin, Matrix, Point, Rect, Size, Transform};

/// The value types a backend draws with.
pub trait RendererTypes {
    type Float: Debug + Clone + PartialEq;
    type Point: Debug + Clone + PartialEq;
    type Size: Debug + Clone + PartialEq;
    type Rect: Debug + Clone + PartialEq;
    type Color: Debug + Clone + PartialEq;
    type Gradient: Debug + Clone + PartialEq;
    type Mask: Debug + Clone + PartialEq;
    type Path: Debug + Clone + PartialEq;
    type Pattern: Debug + Clone + PartialEq;
    type Transform: Debug + Clone + PartialEq;
    type BlendMode: Debug + Clone + PartialEq;
    type FillRule: Debug + Clone + PartialEq;
    type LineCap: Debug + Clone + PartialEq;
    type LineJoin: Debug + Clone + PartialEq;
    type Image: Debug + Clone + PartialEq;
}

/// Converts layer tree values into a backend's native values.
pub trait RendererTypeProvider {
    type Types: RendererTypes;

    fn create_float(&self, float: f32) -> <Self::Types as RendererTypes>::Float;
    fn create_point(&self, point: Point) -> <Self::Types as RendererTypes>::Point;
    fn create_size(&self, size: Size) -> <Self::Types as RendererTypes>::Size;
    fn create_rect(&self, rect: Rect) -> <Self::Types as RendererTypes>::Rect;
    fn create_color(&self, color: Color) -> <Self::Types as RendererTypes>::Color;
    fn create_gradient(&self, gradient: &Gradient) -> <Self::Types as RendererTypes>::Gradient;
    fn create_blend_mode(&self, mode: BlendMode) -> <Self::Types as RendererTypes>::BlendMode;
    fn create_transform(&self, matrix: Matrix) -> <Self::Types as RendererTypes>::Transform;
    fn create_path(&self, shape: &Shape) -> <Self::Types as RendererTypes>::Path;
    fn create_compound_path(
        &self,
        paths: Vec<<Self::Types as RendererTypes>::Path>,
    ) -> <Self::Types as RendererTypes>::Path;
    fn create_text_path(
        &self,
        text: &str,
        origin: Point,
        attributes: &TextAttributes,
    ) -> Option<<Self::Types as RendererTypes>::Path>;
    fn create_pattern(
        &self,
        pattern: &Pattern,
        contents: Vec<RendererCommand<Self::Types>>,
    ) -> <Self::Types as RendererTypes>::Pattern;
    fn create_fill_rule(&self, rule: FillRule) -> <Self::Types as RendererTypes>::FillRule;
    fn create_line_cap(&self, cap: LineCap) -> <Self::Types as RendererTypes>::LineCap;
    fn create_line_join(&self, join: LineJoin) -> <Self::Types as RendererTypes>::LineJoin;
    fn create_image(&self, image: &Image) -> Option<<Self::Types as RendererTypes>::Image>;

    fn get_bounds(&self, shape: &Shape) -> Rect;
}

/// One backend-agnostic drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererCommand<T: RendererTypes> {
    PushState,
    PopState,
    PushTransparencyLayer,
    PopTransparencyLayer,

    Concatenate(T::Transform),
    Translate { tx: T::Float, ty: T::Float },
    Rotate(T::Float),
    Scale { sx: T::Float, sy: T::Float },

    SetFillColor(T::Color),
    SetFillPattern(T::Pattern),
    SetStrokeColor(T::Color),
    SetLineWidth(T::Float),
    SetLineCap(T::LineCap),
    SetLineJoin(T::LineJoin),
    SetLineMiterLimit(T::Float),
    SetClip { path: T::Path, rule: T::FillRule },
    SetClipMask { mask: T::Mask, frame: T::Rect },
    SetAlpha(T::Float),
    SetBlendMode(T::BlendMode),

    Stroke(T::Path),
    ClipStrokeOutline(T::Path),
    Fill { path: T::Path, rule: T::FillRule },

    DrawImage(T::Image),
    DrawLinearGradient {
        gradient: T::Gradient,
        start: T::Point,
        end: T::Point,
    },
    DrawRadialGradient {
        gradient: T::Gradient,
        start_center: T::Point,
        start_radius: T::Float,
        end_center: T::Point,
        end_radius: T::Float,
    },
}

impl<T: RendererTypes> RendererCommand<T> {
    pub fn is_push_state(&self) -> bool {
        matches!(self, RendererCommand::PushState)
    }

    pub fn is_pop_state(&self) -> bool {
        matches!(self, RendererCommand::PopState)
    }
}

/// A drawing surface. `perform` dispatches one command to one method.
pub trait Renderer {
    type Types: RendererTypes;

    fn push_state(&mut self);
    fn pop_state(&mut self);
    fn push_transparency_layer(&mut self);
    fn pop_transparency_layer(&mut self);

    fn concatenate(&mut self, transform: &<Self::Types as RendererTypes>::Transform);
    fn translate(
        &mut self,
        tx: &<Self::Types as RendererTypes>::Float,
        ty: &<Self::Types as RendererTypes>::Float,
    );
    fn rotate(&mut self, angle: &<Self::Types as RendererTypes>::Float);
    fn scale(
        &mut self,
        sx: &<Self::Types as RendererTypes>::Float,
        sy: &<Self::Types as RendererTypes>::Float,
    );

    fn set_fill_color(&mut self, color: &<Self::Types as RendererTypes>::Color);
    fn set_fill_pattern(&mut self, pattern: &<Self::Types as RendererTypes>::Pattern);
    fn set_stroke_color(&mut self, color: &<Self::Types as RendererTypes>::Color);
    fn set_line_width(&mut self, width: &<Self::Types as RendererTypes>::Float);
    fn set_line_cap(&mut self, cap: &<Self::Types as RendererTypes>::LineCap);
    fn set_line_join(&mut self, join: &<Self::Types as RendererTypes>::LineJoin);
    fn set_line_miter_limit(&mut self, limit: &<Self::Types as RendererTypes>::Float);
    fn set_clip(
        &mut self,
        path: &<Self::Types as RendererTypes>::Path,
        rule: &<Self::Types as RendererTypes>::FillRule,
    );
    fn set_clip_mask(
        &mut self,
        mask: &<Self::Types as RendererTypes>::Mask,
        frame: &<Self::Types as RendererTypes>::Rect,
    );
    fn set_alpha(&mut self, alpha: &<Self::Types as RendererTypes>::Float);
    fn set_blend_mode(&mut self, mode: &<Self::Types as RendererTypes>::BlendMode);

    fn stroke(&mut self, path: &<Self::Types as RendererTypes>::Path);
    fn clip_stroke_outline(&mut self, path: &<Self::Types as RendererTypes>::Path);
    fn fill(
        &mut self,
        path: &<Self::Types as RendererTypes>::Path,
        rule: &<Self::Types as RendererTypes>::FillRule,
    );
    fn draw_image(&mut self, image: &<Self::Types as RendererTypes>::Image);
    fn draw_linear_gradient(
        &mut self,
        gradient: &<Self::Types as RendererTypes>::Gradient,
        start: &<Self::Types as RendererTypes>::Point,
        end: &<Self::Types as RendererTypes>::Point,
    );
    fn draw_radial_gradient(
        &mut self,
        gradient: &<Self::Types as RendererTypes>::Gradient,
        start_center: &<Self::Types as RendererTypes>::Point,
        start_radius: &<Self::Types as RendererTypes>::Float,
        end_center: &<Self::Types as RendererTypes>::Point,
        end_radius: &<Self::Types as RendererTypes>::Float,
    );

    fn perform(&mut self, command: &RendererCommand<Self::Types>) {
        use RendererCommand as C;
        match command {
            C::PushState => self.push_state(),
            C::PopState => self.pop_state(),
            C::PushTransparencyLayer => self.push_transparency_layer(),
            C::PopTransparencyLayer => self.pop_transparency_layer(),
            C::Concatenate(t) => self.concatenate(t),
            C::Translate { tx, ty } => self.translate(tx, ty),
            C::Rotate(angle) => self.rotate(angle),
            C::Scale { sx, sy } => self.scale(sx, sy),
            C::SetFillColor(color) => self.set_fill_color(color),
            C::SetFillPattern(pattern) => self.set_fill_pattern(pattern),
            C::SetStrokeColor(color) => self.set_stroke_color(color),
            C::SetLineWidth(width) => self.set_line_width(width),
            C::SetLineCap(cap) => self.set_line_cap(cap),
            C::SetLineJoin(join) => self.set_line_join(join),
            C::SetLineMiterLimit(limit) => self.set_line_miter_limit(limit),
            C::SetClip { path, rule } => self.set_clip(path, rule),
            C::SetClipMask { mask, frame } => self.set_clip_mask(mask, frame),
            C::SetAlpha(alpha) => self.set_alpha(alpha),
            C::SetBlendMode(mode) => self.set_blend_mode(mode),
            C::Stroke(path) => self.stroke(path),
            C::ClipStrokeOutline(path) => self.clip_stroke_outline(path),
            C::Fill { path, rule } => self.fill(path, rule),
            C::DrawImage(image) => self.draw_image(image),
            C::DrawLinearGradient {
                gradient,
                start,
                end,
            } => self.draw_linear_gradient(gradient, start, end),
            C::DrawRadialGradient {
                gradient,
                start_center,
                start_radius,
                end_center,
                end_radius,
            } => self.draw_radial_gradient(
                gradient,
                start_center,
                start_radius,
                end_center,
                end_radius,
            ),
        }
    }

    fn perform_all(&mut self, commands: &[RendererCommand<Self::Types>]) {
        for command in commands {
            self.perform(command);
        }
    }
}

/// Glyph outlines and ink bounds for a run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOutline {
    pub path: Path,
    pub bounds: Rect,
}

/// External text shaping. The crate never shapes text itself.
pub trait TextOutlineService {
    fn outline(&self, text: &str, font_family: &str, size: f32) -> Option<TextOutline>;
}

/// Backend types equal to the layer tree's own values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerTreeTypes;

impl RendererTypes for LayerTreeTypes {
    type Float = f32;
    type Point = Point;
    type Size = Size;
    type Rect = Rect;
    type Color = Color;
    type Gradient = Gradient;
    type Mask = Vec<Shape>;
    type Path = Vec<Shape>;
    type Pattern = Pattern;
    type Transform = Transform;
    type BlendMode = BlendMode;
    type FillRule = FillRule;
    type LineCap = LineCap;
    type LineJoin = LineJoin;
    type Image = Image;
}

/// Identity provider for dry runs and tests.
#[derive(Clone, Default)]
pub struct LayerTreeProvider {
    text_service: Option<Arc<dyn TextOutlineService + Send + Sync>>,
}

impl LayerTreeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_service(service: Arc<dyn TextOutlineService + Send + Sync>) -> Self {
        Self {
            text_service: Some(service),
        }
    }
}

impl Debug for LayerTreeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerTreeProvider")
            .field("text_service", &self.text_service.is_some())
            .finish()
    }
}

impl RendererTypeProvider for LayerTreeProvider {
    type Types = LayerTreeTypes;

    fn create_float(&self, float: f32) -> f32 {
        float
    }

    fn create_point(&self, point: Point) -> Point {
        point
    }

    fn create_size(&self, size: Size) -> Size {
        size
    }

    fn create_rect(&self, rect: Rect) -> Rect {
        rect
    }

    fn create_color(&self, color: Color) -> Color {
        color
    }

    fn create_gradient(&self, gradient: &Gradient) -> Gradient {
        gradient.clone()
    }

    fn create_blend_mode(&self, mode: BlendMode) -> BlendMode {
        mode
    }

    fn create_transform(&self, matrix: Matrix) -> Transform {
        Transform::Matrix(matrix)
    }

    fn create_path(&self, shape: &Shape) -> Vec<Shape> {
        vec![shape.clone()]
    }

    fn create_compound_path(&self, paths: Vec<Vec<Shape>>) -> Vec<Shape> {
        paths.into_iter().flatten().collect()
    }

    fn create_text_path(
        &self,
        text: &str,
        origin: Point,
        attributes: &TextAttributes,
    ) -> Option<Vec<Shape>> {
        let service = self.text_service.as_ref()?;
        let outline = service.outline(text, &attributes.font_name, attributes.size)?;
        let path = outline
            .path
            .applying(Matrix::translate(origin.x, origin.y));
        Some(vec![Shape::Path(path)])
    }

    fn create_pattern(&self, pattern: &Pattern, _contents: Vec<RendererCommand<LayerTreeTypes>>) -> Pattern {
        pattern.clone()
    }

    fn create_fill_rule(&self, rule: FillRule) -> FillRule {
        rule
    }

    fn create_line_cap(&self, cap: LineCap) -> LineCap {
        cap
    }

    fn create_line_join(&self, join: LineJoin) -> LineJoin {
        join
    }

    fn create_image(&self, image: &Image) -> Option<Image> {
        Some(image.clone())
    }

    fn get_bounds(&self, shape: &Shape) -> Rect {
        shape.path().bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes one line per dispatched method.
    #[derive(Default)]
    struct TraceRenderer {
        calls: Vec<String>,
    }

    impl Renderer for TraceRenderer {
        type Types = LayerTreeTypes;

        fn push_state(&mut self) {
            self.calls.push("push".into());
        }
        fn pop_state(&mut self) {
            self.calls.push("pop".into());
        }
        fn push_transparency_layer(&mut self) {
            self.calls.push("push-layer".into());
        }
        fn pop_transparency_layer(&mut self) {
            self.calls.push("pop-layer".into());
        }
        fn concatenate(&mut self, _transform: &Transform) {
            self.calls.push("concat".into());
        }
        fn translate(&mut self, tx: &f32, ty: &f32) {
            self.calls.push(format!("translate {tx} {ty}"));
        }
        fn rotate(&mut self, angle: &f32) {
            self.calls.push(format!("rotate {angle}"));
        }
        fn scale(&mut self, sx: &f32, sy: &f32) {
            self.calls.push(format!("scale {sx} {sy}"));
        }
        fn set_fill_color(&mut self, _color: &Color) {
            self.calls.push("fill-color".into());
        }
        fn set_fill_pattern(&mut self, _pattern: &Pattern) {
            self.calls.push("fill-pattern".into());
        }
        fn set_stroke_color(&mut self, _color: &Color) {
            self.calls.push("stroke-color".into());
        }
        fn set_line_width(&mut self, width: &f32) {
            self.calls.push(format!("width {width}"));
        }
        fn set_line_cap(&mut self, _cap: &LineCap) {
            self.calls.push("cap".into());
        }
        fn set_line_join(&mut self, _join: &LineJoin) {
            self.calls.push("join".into());
        }
        fn set_line_miter_limit(&mut self, _limit: &f32) {
            self.calls.push("miter".into());
        }
        fn set_clip(&mut self, path: &Vec<Shape>, _rule: &FillRule) {
            self.calls.push(format!("clip {}", path.len()));
        }
        fn set_clip_mask(&mut self, _mask: &Vec<Shape>, _frame: &Rect) {
            self.calls.push("clip-mask".into());
        }
        fn set_alpha(&mut self, alpha: &f32) {
            self.calls.push(format!("alpha {alpha}"));
        }
        fn set_blend_mode(&mut self, _mode: &BlendMode) {
            self.calls.push("blend".into());
        }
        fn stroke(&mut self, _path: &Vec<Shape>) {
            self.calls.push("stroke".into());
        }
        fn clip_stroke_outline(&mut self, _path: &Vec<Shape>) {
            self.calls.push("clip-stroke".into());
        }
        fn fill(&mut self, _path: &Vec<Shape>, _rule: &FillRule) {
            self.calls.push("fill".into());
        }
        fn draw_image(&mut self, _image: &Image) {
            self.calls.push("image".into());
        }
        fn draw_linear_gradient(&mut self, _gradient: &Gradient, _start: &Point, _end: &Point) {
            self.calls.push("linear".into());
        }
        fn draw_radial_gradient(
            &mut self,
            _gradient: &Gradient,
            _start_center: &Point,
            _start_radius: &f32,
            _end_center: &Point,
            _end_radius: &f32,
        ) {
            self.calls.push("radial".into());
        }
    }

    struct FixedOutline;

    impl TextOutlineService for FixedOutline {
        fn outline(&self, text: &str, _font_family: &str, size: f32) -> Option<TextOutline> {
            let width = text.len() as f32 * size / 2.0;
            let bounds = Rect::new(0.0, -size, width, size);
            Some(TextOutline {
                path: Path::make_rect(bounds, Size::ZERO),
                bounds,
            })
        }
    }

    #[test]
    fn perform_all_dispatches_in_order() {
        let commands: Vec<RendererCommand<LayerTreeTypes>> = vec![
            RendererCommand::PushState,
            RendererCommand::Translate { tx: 1.0, ty: 2.0 },
            RendererCommand::SetAlpha(0.5),
            RendererCommand::SetClip {
                path: vec![Shape::Ellipse(Rect::new(0.0, 0.0, 1.0, 1.0))],
                rule: FillRule::EvenOdd,
            },
            RendererCommand::PopState,
        ];
        let mut renderer = TraceRenderer::default();
        renderer.perform_all(&commands);
        assert_eq!(
            renderer.calls,
            vec!["push", "translate 1 2", "alpha 0.5", "clip 1", "pop"]
        );
    }

    #[test]
    fn identity_provider_keeps_values() {
        let provider = LayerTreeProvider::new();
        let shape = Shape::Rect {
            rect: Rect::new(1.0, 2.0, 3.0, 4.0),
            radii: Size::ZERO,
        };
        assert_eq!(provider.create_path(&shape), vec![shape.clone()]);
        assert_eq!(provider.get_bounds(&shape), Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(
            provider.create_compound_path(vec![vec![shape.clone()], vec![shape.clone()]]).len(),
            2
        );
        assert_eq!(
            provider.create_transform(Matrix::IDENTITY),
            Transform::Matrix(Matrix::IDENTITY)
        );
    }

    #[test]
    fn text_paths_need_a_service() {
        let attributes = TextAttributes {
            color: Color::BLACK,
            font_name: "Helvetica".to_string(),
            size: 10.0,
            anchor: crate::dom::TextAnchor::Start,
        };
        let origin = Point::new(5.0, 20.0);
        assert!(LayerTreeProvider::new()
            .create_text_path("hi", origin, &attributes)
            .is_none());

        let provider = LayerTreeProvider::with_text_service(Arc::new(FixedOutline));
        let path = provider
            .create_text_path("hi", origin, &attributes)
            .expect("expected text outline");
        assert_eq!(provider.get_bounds(&path[0]), Rect::new(5.0, 10.0, 10.0, 10.0));
    }
}
