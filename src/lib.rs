mod builder;
mod color;
mod debug;
pub mod dom;
mod dom_parser;
mod error;
mod generator;
pub mod layer;
mod optimizer;
mod options;
mod path;
mod path_data;
mod renderer;
mod scanner;
mod stylesheet;
mod svg_writer;
mod transform;
mod types;
mod values;
mod xml;

use rayon::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

pub use builder::{LayerTreeBuilder, State, make_shape};
pub use color::{DomColor, DomFill, keyword_rgb, parse_color, parse_fill};
pub use debug::{Diagnostic, DiagnosticKind, Diagnostics};
pub use dom::Svg;
pub use dom_parser::XmlParser;
pub use error::{Error, LayerTreeError, ParseError};
pub use generator::CommandGenerator;
pub use layer::{Color, ColorConverter, Contents, Layer, Shape};
pub use optimizer::CommandOptimizer;
pub use options::{OptimizerOptions, ParseOptions, RenderOptions};
pub use path::{Direction, Path, Segment, arc_to_cubics};
pub use path_data::{CoordinateSpace, PathSegment, parse_path_data};
pub use renderer::{
    LayerTreeProvider, LayerTreeTypes, Renderer, RendererCommand, RendererTypeProvider,
    RendererTypes, TextOutline, TextOutlineService,
};
pub use stylesheet::{Selector, StyleEntries, parse_style_attribute, parse_style_sheet};
pub use svg_writer::{CoordinateFormatter, format_path, format_path_segments, make_expanded};
pub use transform::{DomTransform, parse_transform};
pub use types::{
    BlendMode, FillRule, LineCap, LineJoin, Matrix, Point, Rect, Size, Transform,
    transforms_to_matrix,
};
pub use values::{
    AttributeParser, Attributes, parse_bool, parse_coordinate, parse_float, parse_floats,
    parse_length, parse_percentage, parse_points, parse_raw, parse_url, parse_url_selector,
};
pub use xml::{XmlElement, parse_xml, parse_xml_bytes};

type SharedTextService = Arc<dyn TextOutlineService + Send + Sync>;

/// Output of one render: the optimized command stream and everything the
/// pipeline reported while producing it.
#[derive(Debug, Clone)]
pub struct Rendering<T: RendererTypes> {
    pub commands: Vec<RendererCommand<T>>,
    pub diagnostics: Diagnostics,
}

/// Configured SVG → command pipeline.
///
/// A converter holds configuration only. Every render builds its own layer
/// tree, generator and optimizer, so one converter can be shared across threads.
#[derive(Clone)]
pub struct SvgConverter {
    parse_options: ParseOptions,
    render_options: RenderOptions,
    optimizer_options: OptimizerOptions,
    drop_failing_subtrees: bool,
    text_service: Option<SharedTextService>,
    debug_path: Option<PathBuf>,
}

impl std::fmt::Debug for SvgConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgConverter")
            .field("parse_options", &self.parse_options)
            .field("render_options", &self.render_options)
            .field("optimizer_options", &self.optimizer_options)
            .field("drop_failing_subtrees", &self.drop_failing_subtrees)
            .field("text_service", &self.text_service.is_some())
            .field("debug_path", &self.debug_path)
            .finish()
    }
}

impl SvgConverter {
    pub fn builder() -> SvgBuilder {
        SvgBuilder::new()
    }

    pub fn parse_options(&self) -> ParseOptions {
        self.parse_options
    }

    pub fn render_options(&self) -> RenderOptions {
        self.render_options
    }

    pub fn optimizer_options(&self) -> OptimizerOptions {
        self.optimizer_options
    }

    pub fn parse_svg(&self, bytes: &[u8]) -> Result<Svg, Error> {
        let root = parse_xml_bytes(bytes)?;
        self.parse_root(&root)
    }

    pub fn parse_svg_str(&self, text: &str) -> Result<Svg, Error> {
        let root = parse_xml(text)?;
        self.parse_root(&root)
    }

    fn parse_root(&self, root: &XmlElement) -> Result<Svg, Error> {
        let svg = XmlParser::new(self.parse_options).parse_svg(root)?;
        tracing::debug!(
            width = svg.width,
            height = svg.height,
            children = svg.children.len(),
            "parsed svg"
        );
        Ok(svg)
    }

    /// Builds the layer tree, returning it with the builder's diagnostics.
    pub fn layer_tree(&self, svg: &Svg) -> Result<(Layer, Diagnostics), Error> {
        let mut builder = LayerTreeBuilder::new(svg)
            .text_service(self.text_service.clone())
            .drop_failing_subtrees(self.drop_failing_subtrees);
        let layer = builder.build()?;
        Ok((layer, builder.into_diagnostics()))
    }

    /// Generates and optimizes commands for an already built layer tree.
    pub fn render_layer<P: RendererTypeProvider>(
        &self,
        layer: &Layer,
        provider: P,
        options: RenderOptions,
    ) -> Rendering<P::Types> {
        let mut generator = CommandGenerator::new(provider, options);
        let commands = generator.render_commands(layer);
        let generated = commands.len();
        let commands = CommandOptimizer::new(self.optimizer_options).optimize(commands);
        tracing::debug!(generated, optimized = commands.len(), "rendered commands");
        Rendering {
            commands,
            diagnostics: generator.into_diagnostics(),
        }
    }

    /// Full pipeline against a caller supplied provider.
    pub fn render_with<P: RendererTypeProvider>(
        &self,
        svg: &Svg,
        provider: P,
    ) -> Result<Rendering<P::Types>, Error> {
        self.render_variant_with(svg, provider, self.render_options)
    }

    fn render_variant_with<P: RendererTypeProvider>(
        &self,
        svg: &Svg,
        provider: P,
        options: RenderOptions,
    ) -> Result<Rendering<P::Types>, Error> {
        let (layer, mut diagnostics) = self.layer_tree(svg)?;
        let rendering = self.render_layer(&layer, provider, options);
        diagnostics.merge(rendering.diagnostics);
        Ok(Rendering {
            commands: rendering.commands,
            diagnostics,
        })
    }

    fn provider(&self) -> LayerTreeProvider {
        match &self.text_service {
            Some(service) => LayerTreeProvider::with_text_service(service.clone()),
            None => LayerTreeProvider::new(),
        }
    }

    /// Full pipeline with the identity provider.
    pub fn render(&self, svg: &Svg) -> Result<Rendering<LayerTreeTypes>, Error> {
        let rendering = self.render_with(svg, self.provider())?;
        self.emit_debug_summary("render", &rendering.diagnostics)?;
        Ok(rendering)
    }

    pub fn render_bytes(&self, bytes: &[u8]) -> Result<Rendering<LayerTreeTypes>, Error> {
        let svg = self.parse_svg(bytes)?;
        self.render(&svg)
    }

    /// Renders one document under several option sets in parallel.
    ///
    /// Results keep the order of `variants`; an invalid option set fails only
    /// its own slot.
    pub fn render_variants(
        &self,
        svg: &Svg,
        variants: &[RenderOptions],
    ) -> Vec<Result<Rendering<LayerTreeTypes>, Error>> {
        let results: Vec<_> = variants
            .par_iter()
            .map(|options| {
                validate_render_options(*options)?;
                self.render_variant_with(svg, self.provider(), *options)
            })
            .collect();
        for (idx, result) in results.iter().enumerate() {
            let Ok(rendering) = result else { continue };
            let context = format!("variant[{idx}]");
            if let Err(err) = self.emit_debug_summary(&context, &rendering.diagnostics) {
                tracing::warn!(error = %err, "failed to write diagnostics");
            }
        }
        results
    }

    /// Appends diagnostics as JSON lines when a debug path is configured.
    fn emit_debug_summary(&self, context: &str, diagnostics: &Diagnostics) -> Result<(), Error> {
        let Some(path) = &self.debug_path else {
            return Ok(());
        };
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        file.write_all(diagnostics.to_json_lines(context).as_bytes())?;
        Ok(())
    }
}

fn validate_render_options(options: RenderOptions) -> Result<(), Error> {
    let unknown = options.unknown_bits();
    if unknown != 0 {
        return Err(Error::InvalidConfiguration(format!(
            "unknown render option bits {unknown:#x}"
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct SvgBuilder {
    parse_options: ParseOptions,
    render_options: RenderOptions,
    optimizer_options: OptimizerOptions,
    drop_failing_subtrees: bool,
    text_service: Option<SharedTextService>,
    debug_path: Option<PathBuf>,
}

impl Default for SvgBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgBuilder {
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
            optimizer_options: OptimizerOptions::default(),
            drop_failing_subtrees: true,
            text_service: None,
            debug_path: None,
        }
    }

    pub fn parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    pub fn render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    pub fn optimizer_options(mut self, options: OptimizerOptions) -> Self {
        self.optimizer_options = options;
        self
    }

    pub fn drop_failing_subtrees(mut self, enabled: bool) -> Self {
        self.drop_failing_subtrees = enabled;
        self
    }

    pub fn text_service(mut self, service: SharedTextService) -> Self {
        self.text_service = Some(service);
        self
    }

    pub fn debug_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<SvgConverter, Error> {
        validate_render_options(self.render_options)?;
        Ok(SvgConverter {
            parse_options: self.parse_options,
            render_options: self.render_options,
            optimizer_options: self.optimizer_options,
            drop_failing_subtrees: self.drop_failing_subtrees,
            text_service: self.text_service,
            debug_path: self.debug_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns="http://www.w3.org/2000/svg""#;

    fn converter() -> SvgConverter {
        SvgConverter::builder().build().expect("converter")
    }

    fn init_logging() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn renders_a_filled_rect() {
        let text = format!(r#"<svg {NS} width="10" height="10"><rect width="4" height="4" fill="red"/></svg>"#);
        let rendering = converter().render_bytes(text.as_bytes()).expect("render");
        assert_eq!(
            rendering.commands[0],
            RendererCommand::SetFillColor(Color::rgb(1.0, 0.0, 0.0))
        );
        assert!(matches!(
            rendering.commands[1],
            RendererCommand::Fill {
                rule: FillRule::NonZero,
                ..
            }
        ));
        assert!(rendering.diagnostics.is_empty());
    }

    #[test]
    fn unknown_render_bits_are_rejected() {
        let err = SvgConverter::builder()
            .render_options(RenderOptions::from_bits(1 << 20))
            .build()
            .expect_err("unknown bits");
        assert!(matches!(err, Error::InvalidConfiguration(_)), "{err}");

        let backend = RenderOptions::backend(2).expect("backend bit");
        assert!(SvgConverter::builder()
            .render_options(RenderOptions::COMMAND_LINE | backend)
            .build()
            .is_ok());
    }

    #[test]
    fn malformed_markup_is_a_parse_error() {
        let err = converter()
            .parse_svg(b"<svg><rect></svg>")
            .expect_err("malformed");
        assert!(matches!(err, Error::Parse(ParseError::InvalidDocument { .. })), "{err}");
    }

    #[test]
    fn strict_mode_surfaces_reference_errors() {
        let text = format!(r##"<svg {NS} width="10" height="10"><use href="#ghost"/></svg>"##);
        let strict = SvgConverter::builder()
            .drop_failing_subtrees(false)
            .build()
            .expect("converter");
        let svg = strict.parse_svg_str(&text).expect("svg");
        let err = strict.render(&svg).expect_err("missing reference");
        assert!(matches!(err, Error::LayerTree(LayerTreeError::MissingReference(_))), "{err}");

        let lenient = converter().render(&svg).expect("lenient render");
        assert_eq!(lenient.diagnostics.count(DiagnosticKind::DroppedElement), 1);
    }

    #[test]
    fn variants_render_independently() {
        init_logging();
        let text = format!(
            r##"<svg {NS} width="10" height="10">
                <defs><filter id="blur"><feGaussianBlur stdDeviation="2"/></filter></defs>
                <rect width="4" height="4" filter="url(#blur)"/>
                <rect width="4" height="4" filter="url(#blur)"/>
            </svg>"##
        );
        let converter = converter();
        let svg = converter.parse_svg_str(&text).expect("svg");
        let results = converter.render_variants(
            &svg,
            &[
                RenderOptions::NONE,
                RenderOptions::HIDE_UNSUPPORTED_FILTERS,
                RenderOptions::from_bits(1 << 20),
            ],
        );
        assert_eq!(results.len(), 3);

        let shown = results[0].as_ref().expect("shown");
        assert!(!shown.commands.is_empty());
        assert_eq!(shown.diagnostics.records().len(), 1);
        assert_eq!(shown.diagnostics.count(DiagnosticKind::UnsupportedFilter), 2);

        let hidden = results[1].as_ref().expect("hidden");
        assert!(hidden.commands.is_empty());
        assert!(hidden.diagnostics.is_empty());

        assert!(matches!(results[2], Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn debug_path_receives_json_lines() {
        let path = std::env::temp_dir().join(format!("svgdraw-debug-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let converter = SvgConverter::builder()
            .debug_path(&path)
            .build()
            .expect("converter");
        let text = format!(
            r##"<svg {NS} width="10" height="10">
                <defs><filter id="blur"><feGaussianBlur stdDeviation="2"/></filter></defs>
                <rect width="4" height="4" filter="url(#blur)"/>
            </svg>"##
        );
        converter.render_bytes(text.as_bytes()).expect("render");
        let written = std::fs::read_to_string(&path).expect("debug file");
        let _ = std::fs::remove_file(&path);
        assert!(written.contains(r#""type":"diagnostic""#), "{written}");
        assert!(written.contains("diagnostic.summary"), "{written}");
    }

    #[test]
    fn text_service_feeds_text_paths() {
        #[derive(Debug)]
        struct Square;

        impl TextOutlineService for Square {
            fn outline(&self, _text: &str, _font: &str, size: f32) -> Option<TextOutline> {
                let rect = Rect::new(0.0, -size, size, size);
                Some(TextOutline {
                    path: Path::make_rect(rect, Size::ZERO),
                    bounds: rect,
                })
            }
        }

        let text = format!(r#"<svg {NS} width="40" height="40"><text x="5" y="20">A</text></svg>"#);
        let converter = SvgConverter::builder()
            .text_service(Arc::new(Square))
            .build()
            .expect("converter");
        let rendering = converter.render_bytes(text.as_bytes()).expect("render");
        assert!(rendering
            .commands
            .iter()
            .any(|c| matches!(c, RendererCommand::Fill { path, .. } if !path.is_empty())));
    }
}
