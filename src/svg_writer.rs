use crate::error::ParseError;
use crate::path::{Path, Segment};
use crate::path_data::{PathSegment, parse_path_data};
use crate::transform::{layer_transforms, parse_transform};
use crate::types::transforms_to_matrix;

/// Prints coordinates with a fixed cap on fraction digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateFormatter {
    pub delimiter: &'static str,
    pub precision: usize,
}

impl Default for CoordinateFormatter {
    fn default() -> Self {
        Self {
            delimiter: " ",
            precision: 5,
        }
    }
}

impl CoordinateFormatter {
    pub fn new(delimiter: &'static str, precision: usize) -> Self {
        Self {
            delimiter,
            precision,
        }
    }

    /// Rounds to `precision` digits and trims trailing zeros. Never prints `-0`.
    pub fn format_value(&self, value: f32) -> String {
        if !value.is_finite() {
            return "0".to_string();
        }
        let mut s = format!("{:.*}", self.precision, value as f64);
        if s.contains('.') {
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
        }
        if s == "-0" {
            s.remove(0);
        }
        s
    }

    pub fn format(&self, values: &[f32]) -> String {
        values
            .iter()
            .map(|v| self.format_value(*v))
            .collect::<Vec<_>>()
            .join(self.delimiter)
    }

    pub fn format_flag(&self, flag: bool) -> &'static str {
        if flag { "1" } else { "0" }
    }
}

/// Re-serializes parsed path data, keeping each command's letter case.
pub fn format_path_segments(segments: &[PathSegment], formatter: &CoordinateFormatter) -> String {
    segments
        .iter()
        .map(|segment| {
            let letter = segment.command();
            let args = match *segment {
                PathSegment::Move { x, y, .. }
                | PathSegment::Line { x, y, .. }
                | PathSegment::QuadraticSmooth { x, y, .. } => formatter.format(&[x, y]),
                PathSegment::Horizontal { x, .. } => formatter.format_value(x),
                PathSegment::Vertical { y, .. } => formatter.format_value(y),
                PathSegment::Cubic {
                    x1, y1, x2, y2, x, y, ..
                } => format!(
                    "{} {} {}",
                    formatter.format(&[x1, y1]),
                    formatter.format(&[x2, y2]),
                    formatter.format(&[x, y])
                ),
                PathSegment::CubicSmooth { x2, y2, x, y, .. } => format!(
                    "{} {}",
                    formatter.format(&[x2, y2]),
                    formatter.format(&[x, y])
                ),
                PathSegment::Quadratic { x1, y1, x, y, .. } => format!(
                    "{} {}",
                    formatter.format(&[x1, y1]),
                    formatter.format(&[x, y])
                ),
                PathSegment::Arc {
                    rx,
                    ry,
                    rotate,
                    large,
                    sweep,
                    x,
                    y,
                    ..
                } => format!(
                    "{} {} {} {} {}",
                    formatter.format(&[rx, ry]),
                    formatter.format_value(rotate),
                    formatter.format_flag(large),
                    formatter.format_flag(sweep),
                    formatter.format(&[x, y])
                ),
                PathSegment::Close => String::new(),
            };
            format!("{letter}{args}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Absolute `M`/`L`/`C`/`Z` form of a layer tree path.
pub fn format_path(path: &Path, precision: usize) -> String {
    let formatter = CoordinateFormatter::new(",", precision);
    path.segments
        .iter()
        .map(|segment| match segment {
            Segment::Move(p) => format!("M{}", formatter.format(&[p.x, p.y])),
            Segment::Line(p) => format!("L{}", formatter.format(&[p.x, p.y])),
            Segment::Cubic {
                to,
                control1,
                control2,
            } => format!(
                "C{} {} {}",
                formatter.format(&[control1.x, control1.y]),
                formatter.format(&[control2.x, control2.y]),
                formatter.format(&[to.x, to.y])
            ),
            Segment::Close => "Z".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bakes an SVG transform list into path data.
///
/// `make_expanded("M0,0 L10,0", "translate(5 5)", 4)` yields `"M5,5 L15,5"`.
pub fn make_expanded(path: &str, transform: &str, precision: usize) -> Result<String, ParseError> {
    let segments = parse_path_data(path)?;
    let transforms = parse_transform(transform)?;
    let matrix = transforms_to_matrix(&layer_transforms(&transforms));
    let path = Path::from_dom(&segments).applying(matrix);
    Ok(format_path(&path, precision))
}
