use crate::path_data::{CoordinateSpace, PathSegment};
use crate::types::{Matrix, Point, Rect, Size};

/// Absolute LayerTree path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Move(Point),
    Line(Point),
    Cubic {
        to: Point,
        control1: Point,
        control2: Point,
    },
    Close,
}

impl Segment {
    pub fn location(&self) -> Option<Point> {
        match *self {
            Segment::Move(p) | Segment::Line(p) => Some(p),
            Segment::Cubic { to, .. } => Some(to),
            Segment::Close => None,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Segment::Move(_))
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Segment::Close)
    }

    fn is_edge(&self) -> bool {
        matches!(self, Segment::Line(_) | Segment::Cubic { .. })
    }

    fn applying(&self, m: Matrix) -> Segment {
        match *self {
            Segment::Move(p) => Segment::Move(m.apply(p)),
            Segment::Line(p) => Segment::Line(m.apply(p)),
            Segment::Cubic {
                to,
                control1,
                control2,
            } => Segment::Cubic {
                to: m.apply(to),
                control1: m.apply(control1),
                control2: m.apply(control2),
            },
            Segment::Close => Segment::Close,
        }
    }

    /// The same edge traced back towards `point`.
    fn reversing(&self, point: Option<Point>) -> Option<Segment> {
        let point = point?;
        match *self {
            Segment::Move(_) => Some(Segment::Move(point)),
            Segment::Line(_) => Some(Segment::Line(point)),
            Segment::Cubic {
                control1, control2, ..
            } => Some(Segment::Cubic {
                to: point,
                control1: control2,
                control2: control1,
            }),
            Segment::Close => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    Anticlockwise,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Clockwise => Direction::Anticlockwise,
            Direction::Anticlockwise => Direction::Clockwise,
        }
    }
}

/// An owned, append-only segment list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub segments: Vec<Segment>,
}

impl Path {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Current point: the last located segment, or after a close the start
    /// of the subpath it closed.
    pub fn location(&self) -> Option<Point> {
        let mut start: Option<Point> = None;
        let mut location: Option<Point> = None;
        for segment in &self.segments {
            match *segment {
                Segment::Move(p) => {
                    start = Some(p);
                    location = Some(p);
                }
                Segment::Close => location = start,
                _ => location = segment.location(),
            }
        }
        location
    }

    pub fn move_to(&mut self, p: Point) {
        self.segments.push(Segment::Move(p));
    }

    pub fn line_to(&mut self, p: Point) {
        self.segments.push(Segment::Line(p));
    }

    pub fn cubic_to(&mut self, to: Point, control1: Point, control2: Point) {
        self.segments.push(Segment::Cubic {
            to,
            control1,
            control2,
        });
    }

    pub fn close(&mut self) {
        self.segments.push(Segment::Close);
    }

    /// Elliptical arc from the current point; ignored when there is none.
    pub fn arc_to(&mut self, to: Point, radii: Size, rotation: f32, large: bool, sweep: bool) {
        let Some(from) = self.location() else {
            return;
        };
        self.segments
            .extend(arc_to_cubics(from, to, radii.width, radii.height, rotation, large, sweep));
    }

    pub fn applying(&self, m: Matrix) -> Path {
        Path::new(self.segments.iter().map(|s| s.applying(m)).collect())
    }

    /// Lowers DOM path data to absolute moves, lines, cubics and closes.
    pub fn from_dom(segments: &[PathSegment]) -> Path {
        PathLowering::default().lower(segments)
    }

    pub fn make_line(points: &[Point]) -> Path {
        let mut path = Path::default();
        if let Some((first, rest)) = points.split_first() {
            path.move_to(*first);
            for p in rest {
                path.line_to(*p);
            }
        }
        path
    }

    pub fn make_polygon(points: &[Point]) -> Path {
        let mut path = Path::make_line(points);
        if !path.is_empty() {
            path.close();
        }
        path
    }

    /// Four lines when `radii` is zero, otherwise alternating lines and
    /// corner arcs starting from the middle of the right edge.
    pub fn make_rect(rect: Rect, radii: Size) -> Path {
        let mut path = Path::default();
        if radii == Size::ZERO {
            path.move_to(Point::new(rect.max_x(), rect.min_y()));
            path.line_to(Point::new(rect.max_x(), rect.max_y()));
            path.line_to(Point::new(rect.min_x(), rect.max_y()));
            path.line_to(Point::new(rect.min_x(), rect.min_y()));
            path.close();
            return path;
        }
        let (rx, ry) = (radii.width, radii.height);
        path.move_to(Point::new(rect.max_x(), rect.mid_y()));
        path.line_to(Point::new(rect.max_x(), rect.max_y() - ry));
        path.arc_to(Point::new(rect.max_x() - rx, rect.max_y()), radii, 0.0, false, true);
        path.line_to(Point::new(rect.min_x() + rx, rect.max_y()));
        path.arc_to(Point::new(rect.min_x(), rect.max_y() - ry), radii, 0.0, false, true);
        path.line_to(Point::new(rect.min_x(), rect.min_y() + ry));
        path.arc_to(Point::new(rect.min_x() + rx, rect.min_y()), radii, 0.0, false, true);
        path.line_to(Point::new(rect.max_x() - rx, rect.min_y()));
        path.arc_to(Point::new(rect.max_x(), rect.min_y() + ry), radii, 0.0, false, true);
        path.close();
        path
    }

    pub fn make_ellipse(rect: Rect) -> Path {
        let radii = Size::new(rect.width() / 2.0, rect.height() / 2.0);
        let mut path = Path::default();
        path.move_to(Point::new(rect.min_x(), rect.mid_y()));
        path.arc_to(Point::new(rect.max_x(), rect.mid_y()), radii, 0.0, false, true);
        path.arc_to(Point::new(rect.min_x(), rect.mid_y()), radii, 0.0, true, true);
        path.close();
        path
    }

    /// Tight bounds, including the extrema of curved segments.
    pub fn bounds(&self) -> Rect {
        let mut min = Point::new(f32::INFINITY, f32::INFINITY);
        let mut max = Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        let mut include = |p: Point| {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        };
        let mut current = Point::ZERO;
        for segment in &self.segments {
            match *segment {
                Segment::Move(p) | Segment::Line(p) => {
                    include(p);
                    current = p;
                }
                Segment::Cubic {
                    to,
                    control1,
                    control2,
                } => {
                    include(to);
                    for t in cubic_extrema(current, control1, control2, to) {
                        include(cubic_point(current, control1, control2, to, t));
                    }
                    current = to;
                }
                Segment::Close => {}
            }
        }
        if min.x > max.x {
            return Rect::ZERO;
        }
        Rect::from_points(min, max)
    }

    /// Winding direction from the signed area (y axis pointing down).
    pub fn direction(&self) -> Direction {
        let points = self.outline_points();
        let mut area = 0.0f32;
        for (idx, a) in points.iter().enumerate() {
            let b = points[(idx + 1) % points.len()];
            area += a.x * b.y - b.x * a.y;
        }
        if area >= 0.0 {
            Direction::Clockwise
        } else {
            Direction::Anticlockwise
        }
    }

    fn outline_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        let mut current = Point::ZERO;
        for segment in &self.segments {
            match *segment {
                Segment::Move(p) | Segment::Line(p) => {
                    points.push(p);
                    current = p;
                }
                Segment::Cubic {
                    to,
                    control1,
                    control2,
                } => {
                    for step in 1..=8 {
                        let t = step as f32 / 8.0;
                        points.push(cubic_point(current, control1, control2, to, t));
                    }
                    current = to;
                }
                Segment::Close => {}
            }
        }
        points
    }

    /// Splits at every close and move. A trailing subpath without edges is
    /// dropped; a move directly after a move replaces it.
    pub fn subpaths(&self) -> Vec<Path> {
        let mut subpaths = Vec::new();
        let mut current: Vec<Segment> = Vec::new();
        let mut start: Option<Point> = None;
        let mut location = Point::ZERO;

        for segment in &self.segments {
            match *segment {
                Segment::Move(p) => {
                    match current.last_mut() {
                        Some(last) if last.is_move() => *last = *segment,
                        _ => current.push(*segment),
                    }
                    location = p;
                    start = None;
                }
                Segment::Line(p) | Segment::Cubic { to: p, .. } => {
                    current.push(*segment);
                    start.get_or_insert(location);
                    location = p;
                }
                Segment::Close => {
                    current.push(*segment);
                    subpaths.push(Path::new(std::mem::take(&mut current)));
                    if let Some(start) = start.take() {
                        location = start;
                        current.push(Segment::Move(start));
                    }
                }
            }
        }
        if current.iter().any(Segment::is_edge) {
            subpaths.push(Path::new(current));
        }
        subpaths
    }

    /// The same outline traced in the opposite direction.
    pub fn reversed(&self) -> Path {
        let mut reversed: Vec<Segment> = self
            .segments
            .iter()
            .rev()
            .zip(self.segments.iter().rev().skip(1))
            .filter_map(|(segment, next)| segment.reversing(next.location()))
            .collect();

        if let Some(point) = self.segments.iter().rev().find_map(Segment::location) {
            reversed.insert(0, Segment::Move(point));
        }
        while reversed.last().is_some_and(Segment::is_move) {
            reversed.pop();
        }
        if self.segments.last().is_some_and(Segment::is_close) {
            reversed.push(Segment::Close);
        }
        Path::new(reversed)
    }

    /// Rewinds nested subpaths so that a non-zero fill renders holes: each
    /// subpath is nested under the smallest larger one whose bounds contain
    /// its centre, regardless of order, and depth alternates the winding.
    /// Subpaths keep their original order.
    pub fn make_non_zero(&self) -> Path {
        let subpaths = self.subpaths();
        let mut nodes: Vec<SubpathNode> = Vec::new();
        for (index, subpath) in subpaths.iter().enumerate() {
            insert_node(&mut nodes, SubpathNode::new(index, subpath));
        }

        let mut required = vec![Direction::Clockwise; subpaths.len()];
        for node in &nodes {
            node.wind(node.direction, &mut required);
        }

        let mut segments = Vec::new();
        for (subpath, direction) in subpaths.iter().zip(required) {
            if subpath.direction() == direction {
                segments.extend_from_slice(&subpath.segments);
            } else {
                segments.extend(subpath.reversed().segments);
            }
        }
        Path::new(segments)
    }
}

struct SubpathNode {
    index: usize,
    bounds: Rect,
    direction: Direction,
    children: Vec<SubpathNode>,
}

impl SubpathNode {
    fn new(index: usize, path: &Path) -> Self {
        Self {
            index,
            bounds: path.bounds(),
            direction: path.direction(),
            children: Vec::new(),
        }
    }

    fn wind(&self, direction: Direction, required: &mut [Direction]) {
        required[self.index] = direction;
        for child in &self.children {
            child.wind(direction.opposite(), required);
        }
    }

    /// Whether `other`'s centre lies inside these bounds and `other` is no
    /// larger. Duplicates nest under whichever came first.
    fn encloses(&self, other: &SubpathNode) -> bool {
        self.bounds.contains(other.bounds.center()) && area(self.bounds) >= area(other.bounds)
    }
}

fn area(rect: Rect) -> f32 {
    rect.width() * rect.height()
}

/// Descends into the node that encloses `node`, or takes over the siblings
/// `node` strictly encloses when no such node exists at this level.
fn insert_node(nodes: &mut Vec<SubpathNode>, mut node: SubpathNode) {
    if let Some(parent) = nodes.iter_mut().find(|n| n.encloses(&node)) {
        insert_node(&mut parent.children, node);
        return;
    }
    let (inside, outside): (Vec<_>, Vec<_>) = std::mem::take(nodes)
        .into_iter()
        .partition(|n| node.encloses(n) && area(node.bounds) > area(n.bounds));
    *nodes = outside;
    node.children.extend(inside);
    nodes.push(node);
}

/// Running state while turning relative and shorthand commands into
/// absolute geometry.
#[derive(Default)]
struct PathLowering {
    path: Path,
    current: Point,
    start: Point,
    last_cubic_control: Option<Point>,
    last_quad_control: Option<Point>,
}

impl PathLowering {
    fn lower(mut self, segments: &[PathSegment]) -> Path {
        for segment in segments {
            self.append(segment);
        }
        self.path
    }

    fn absolute(&self, x: f32, y: f32, space: CoordinateSpace) -> Point {
        match space {
            CoordinateSpace::Absolute => Point::new(x, y),
            CoordinateSpace::Relative => Point::new(self.current.x + x, self.current.y + y),
        }
    }

    fn append(&mut self, segment: &PathSegment) {
        let mut cubic_control = None;
        let mut quad_control = None;
        match *segment {
            PathSegment::Move { x, y, space } => {
                let p = self.absolute(x, y, space);
                self.path.move_to(p);
                self.current = p;
                self.start = p;
            }
            PathSegment::Line { x, y, space } => {
                let p = self.absolute(x, y, space);
                self.path.line_to(p);
                self.current = p;
            }
            PathSegment::Horizontal { x, space } => {
                let x = match space {
                    CoordinateSpace::Absolute => x,
                    CoordinateSpace::Relative => self.current.x + x,
                };
                let p = Point::new(x, self.current.y);
                self.path.line_to(p);
                self.current = p;
            }
            PathSegment::Vertical { y, space } => {
                let y = match space {
                    CoordinateSpace::Absolute => y,
                    CoordinateSpace::Relative => self.current.y + y,
                };
                let p = Point::new(self.current.x, y);
                self.path.line_to(p);
                self.current = p;
            }
            PathSegment::Cubic {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
                space,
            } => {
                let c1 = self.absolute(x1, y1, space);
                let c2 = self.absolute(x2, y2, space);
                let p = self.absolute(x, y, space);
                self.path.cubic_to(p, c1, c2);
                self.current = p;
                cubic_control = Some(c2);
            }
            PathSegment::CubicSmooth { x2, y2, x, y, space } => {
                let c1 = reflect(self.last_cubic_control, self.current);
                let c2 = self.absolute(x2, y2, space);
                let p = self.absolute(x, y, space);
                self.path.cubic_to(p, c1, c2);
                self.current = p;
                cubic_control = Some(c2);
            }
            PathSegment::Quadratic { x1, y1, x, y, space } => {
                let q = self.absolute(x1, y1, space);
                let p = self.absolute(x, y, space);
                self.quad_to(q, p);
                quad_control = Some(q);
            }
            PathSegment::QuadraticSmooth { x, y, space } => {
                let q = reflect(self.last_quad_control, self.current);
                let p = self.absolute(x, y, space);
                self.quad_to(q, p);
                quad_control = Some(q);
            }
            PathSegment::Arc {
                rx,
                ry,
                rotate,
                large,
                sweep,
                x,
                y,
                space,
            } => {
                let p = self.absolute(x, y, space);
                self.path
                    .segments
                    .extend(arc_to_cubics(self.current, p, rx, ry, rotate, large, sweep));
                self.current = p;
            }
            PathSegment::Close => {
                self.path.close();
                self.current = self.start;
            }
        }
        self.last_cubic_control = cubic_control;
        self.last_quad_control = quad_control;
    }

    fn quad_to(&mut self, control: Point, to: Point) {
        let p0 = self.current;
        let c1 = Point::new(
            p0.x + (2.0 / 3.0) * (control.x - p0.x),
            p0.y + (2.0 / 3.0) * (control.y - p0.y),
        );
        let c2 = Point::new(
            to.x + (2.0 / 3.0) * (control.x - to.x),
            to.y + (2.0 / 3.0) * (control.y - to.y),
        );
        self.path.cubic_to(to, c1, c2);
        self.current = to;
    }
}

/// Reflection of the previous control point about the current point, or the
/// current point itself when the previous segment was of another family.
fn reflect(control: Option<Point>, current: Point) -> Point {
    match control {
        Some(c) => Point::new(2.0 * current.x - c.x, 2.0 * current.y - c.y),
        None => current,
    }
}

/// Approximates an SVG elliptical arc with cubics of at most 90 degrees each
/// (endpoint to centre parameterisation). Zero radii or coincident endpoints
/// give a straight line.
pub fn arc_to_cubics(
    from: Point,
    to: Point,
    rx: f32,
    ry: f32,
    rotation_deg: f32,
    large: bool,
    sweep: bool,
) -> Vec<Segment> {
    use std::f32::consts::PI;

    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx == 0.0 || ry == 0.0 || from == to {
        return vec![Segment::Line(to)];
    }

    let phi = rotation_deg.to_radians();
    let sin_phi = libm::sinf(phi);
    let cos_phi = libm::cosf(phi);

    let dx2 = (from.x - to.x) / 2.0;
    let dy2 = (from.y - to.y) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // Scale up radii that cannot span the endpoints.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = libm::sqrtf(lambda);
        rx *= s;
        ry *= s;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
    let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let coef = if den != 0.0 {
        let sign = if large == sweep { -1.0 } else { 1.0 };
        sign * libm::sqrtf((num / den).max(0.0))
    } else {
        0.0
    };
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * (-ry * x1p / rx);

    let cx = cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0;

    fn angle(ux: f32, uy: f32, vx: f32, vy: f32) -> f32 {
        libm::atan2f(ux * vy - uy * vx, ux * vx + uy * vy)
    }

    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;

    let mut theta = angle(1.0, 0.0, ux, uy);
    let mut dtheta = angle(ux, uy, vx, vy);
    if !sweep && dtheta > 0.0 {
        dtheta -= 2.0 * PI;
    } else if sweep && dtheta < 0.0 {
        dtheta += 2.0 * PI;
    }

    let count = libm::ceilf(dtheta.abs() / (PI / 2.0) - 1e-4).max(1.0) as usize;
    let delta = dtheta / count as f32;

    let map = |x: f32, y: f32| {
        let x = rx * x;
        let y = ry * y;
        Point::new(cx + cos_phi * x - sin_phi * y, cy + sin_phi * x + cos_phi * y)
    };

    let mut out = Vec::with_capacity(count);
    for idx in 0..count {
        let t1 = theta;
        let t2 = theta + delta;
        let k = (4.0 / 3.0) * libm::tanf((t2 - t1) / 4.0);
        let (s1, c1) = (libm::sinf(t1), libm::cosf(t1));
        let (s2, c2) = (libm::sinf(t2), libm::cosf(t2));
        let end = if idx + 1 == count { to } else { map(c2, s2) };
        out.push(Segment::Cubic {
            to: end,
            control1: map(c1 - k * s1, s1 + k * c1),
            control2: map(c2 + k * s2, s2 - k * c2),
        });
        theta = t2;
    }
    out
}

fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Parameters in (0, 1) where either coordinate of the cubic has a turning point.
fn cubic_extrema(p0: Point, p1: Point, p2: Point, p3: Point) -> Vec<f32> {
    let mut ts = Vec::new();
    for (a0, a1, a2, a3) in [(p0.x, p1.x, p2.x, p3.x), (p0.y, p1.y, p2.y, p3.y)] {
        // Derivative: a t^2 + b t + c.
        let a = 3.0 * (-a0 + 3.0 * a1 - 3.0 * a2 + a3);
        let b = 6.0 * (a0 - 2.0 * a1 + a2);
        let c = 3.0 * (a1 - a0);
        if a.abs() < 1e-6 {
            if b.abs() > 1e-6 {
                ts.push(-c / b);
            }
            continue;
        }
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            continue;
        }
        let root = libm::sqrtf(disc);
        ts.push((-b + root) / (2.0 * a));
        ts.push((-b - root) / (2.0 * a));
    }
    ts.retain(|t| *t > 0.0 && *t < 1.0);
    ts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_data::parse_path_data;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn square(x: f32, y: f32, size: f32) -> Vec<Segment> {
        vec![
            Segment::Move(p(x, y)),
            Segment::Line(p(x + size, y)),
            Segment::Line(p(x + size, y + size)),
            Segment::Line(p(x, y + size)),
            Segment::Close,
        ]
    }

    fn close_to(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn lowers_relative_and_shorthand_commands() {
        let dom = parse_path_data("m10 10 h5 v5 H0 q5 5 10 0 t10 0 z l1 1").unwrap();
        let path = Path::from_dom(&dom);
        assert_eq!(path.segments[0], Segment::Move(p(10.0, 10.0)));
        assert_eq!(path.segments[1], Segment::Line(p(15.0, 10.0)));
        assert_eq!(path.segments[2], Segment::Line(p(15.0, 15.0)));
        assert_eq!(path.segments[3], Segment::Line(p(0.0, 15.0)));
        match path.segments[5] {
            Segment::Cubic { to, control1, .. } => {
                assert!(close_to(to, p(20.0, 15.0)));
                // Reflected quadratic control (15, 10) at 2/3 from (10, 15).
                assert!(close_to(control1, p(10.0 + 10.0 / 3.0, 15.0 - 10.0 / 3.0)));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(path.segments[6], Segment::Close);
        // Close returns to the subpath start.
        assert_eq!(path.segments[7], Segment::Line(p(11.0, 11.0)));
    }

    #[test]
    fn quadratic_becomes_exact_cubic() {
        let path = Path::from_dom(&parse_path_data("M0 0 Q 3 3 6 0").unwrap());
        assert_eq!(
            path.segments[1],
            Segment::Cubic {
                to: p(6.0, 0.0),
                control1: p(2.0, 2.0),
                control2: p(4.0, 2.0)
            }
        );
    }

    #[test]
    fn degenerate_arcs_are_lines() {
        assert_eq!(
            arc_to_cubics(p(0.0, 0.0), p(10.0, 0.0), 0.0, 5.0, 0.0, false, true),
            vec![Segment::Line(p(10.0, 0.0))]
        );
        assert_eq!(
            arc_to_cubics(p(1.0, 1.0), p(1.0, 1.0), 5.0, 5.0, 0.0, false, true),
            vec![Segment::Line(p(1.0, 1.0))]
        );
    }

    #[test]
    fn half_circle_arc_splits_into_quarters() {
        let cubics = arc_to_cubics(p(0.0, 0.0), p(10.0, 0.0), 5.0, 5.0, 0.0, false, true);
        assert_eq!(cubics.len(), 2);
        let mut path = Path::new(vec![Segment::Move(p(0.0, 0.0))]);
        path.segments.extend(cubics);
        let bounds = path.bounds();
        assert!((bounds.height() - 5.0).abs() < 0.05, "bounds {bounds:?}");
        assert_eq!(path.location(), Some(p(10.0, 0.0)));
    }

    #[test]
    fn rect_without_radii_has_four_lines() {
        let path = Path::make_rect(Rect::new(0.0, 0.0, 10.0, 5.0), Size::ZERO);
        assert_eq!(path.segments.len(), 5);
        assert!(path.segments.iter().all(|s| !matches!(s, Segment::Cubic { .. })));
        assert_eq!(path.segments[0], Segment::Move(p(10.0, 0.0)));
        assert_eq!(path.segments[4], Segment::Close);
    }

    #[test]
    fn rounded_rect_alternates_lines_and_arcs() {
        let path = Path::make_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Size::new(2.0, 2.0));
        let kinds: String = path
            .segments
            .iter()
            .map(|s| match s {
                Segment::Move(_) => 'M',
                Segment::Line(_) => 'L',
                Segment::Cubic { .. } => 'C',
                Segment::Close => 'Z',
            })
            .collect();
        assert_eq!(kinds, "MLCLCLCLCZ");
        let start = path.segments[0].location().unwrap();
        let end = path.segments[8].location().unwrap();
        assert!(close_to(end, p(10.0, 2.0)));
        assert!(close_to(start, p(10.0, 5.0)));
    }

    #[test]
    fn ellipse_bounds_match_rect() {
        let rect = Rect::new(2.0, 4.0, 20.0, 10.0);
        let bounds = Path::make_ellipse(rect).bounds();
        assert!((bounds.x() - 2.0).abs() < 0.05);
        assert!((bounds.max_y() - 14.0).abs() < 0.05);
    }

    #[test]
    fn subpaths_split_and_drop_trailing_moves() {
        let mut segments = square(0.0, 0.0, 10.0);
        segments.push(Segment::Move(p(50.0, 50.0)));
        segments.push(Segment::Move(p(20.0, 20.0)));
        segments.push(Segment::Line(p(30.0, 20.0)));
        segments.push(Segment::Move(p(40.0, 40.0)));
        let subpaths = Path::new(segments).subpaths();
        assert_eq!(subpaths.len(), 2);
        assert_eq!(subpaths[0].segments, square(0.0, 0.0, 10.0));
        // The restart move after close is replaced by the explicit move.
        assert_eq!(
            subpaths[1].segments,
            vec![
                Segment::Move(p(20.0, 20.0)),
                Segment::Line(p(30.0, 20.0)),
                Segment::Move(p(40.0, 40.0)),
            ]
        );
    }

    #[test]
    fn reversal_swaps_controls_and_keeps_close() {
        let path = Path::new(vec![
            Segment::Move(p(0.0, 0.0)),
            Segment::Line(p(10.0, 0.0)),
            Segment::Cubic {
                to: p(10.0, 10.0),
                control1: p(12.0, 3.0),
                control2: p(12.0, 7.0),
            },
            Segment::Close,
        ]);
        let reversed = path.reversed();
        assert_eq!(
            reversed.segments,
            vec![
                Segment::Move(p(10.0, 10.0)),
                Segment::Cubic {
                    to: p(10.0, 0.0),
                    control1: p(12.0, 7.0),
                    control2: p(12.0, 3.0),
                },
                Segment::Line(p(0.0, 0.0)),
                Segment::Close,
            ]
        );
        assert_ne!(path.direction(), reversed.direction());
    }

    #[test]
    fn non_zero_of_simple_path_is_unchanged() {
        let path = Path::new(square(0.0, 0.0, 10.0));
        assert_eq!(path.make_non_zero(), path);
    }

    #[test]
    fn non_zero_reverses_nested_hole() {
        let mut segments = square(0.0, 0.0, 30.0);
        segments.extend(square(10.0, 10.0, 10.0));
        let path = Path::new(segments).make_non_zero();
        let subpaths = path.subpaths();
        assert_eq!(subpaths.len(), 2);
        assert_ne!(subpaths[0].direction(), subpaths[1].direction());
    }

    #[test]
    fn non_zero_nests_hole_declared_before_its_outline() {
        let mut segments = square(10.0, 10.0, 10.0);
        segments.extend(square(0.0, 0.0, 100.0));
        let path = Path::new(segments).make_non_zero();
        let subpaths = path.subpaths();
        assert_eq!(subpaths.len(), 2);
        assert_eq!(subpaths[0].bounds(), Rect::new(10.0, 10.0, 10.0, 10.0));
        assert_eq!(subpaths[1].direction(), Direction::Clockwise);
        assert_eq!(subpaths[0].direction(), Direction::Anticlockwise);
    }

    #[test]
    fn non_zero_alternates_with_depth() {
        let mut segments = square(0.0, 0.0, 90.0);
        segments.extend(square(20.0, 20.0, 50.0));
        segments.extend(square(40.0, 40.0, 10.0));
        let subpaths = Path::new(segments).make_non_zero().subpaths();
        let directions: Vec<_> = subpaths.iter().map(Path::direction).collect();
        assert_eq!(
            directions,
            vec![
                Direction::Clockwise,
                Direction::Anticlockwise,
                Direction::Clockwise
            ]
        );

        let mut segments = square(40.0, 40.0, 10.0);
        segments.extend(square(0.0, 0.0, 90.0));
        segments.extend(square(20.0, 20.0, 50.0));
        let subpaths = Path::new(segments).make_non_zero().subpaths();
        let directions: Vec<_> = subpaths.iter().map(Path::direction).collect();
        assert_eq!(
            directions,
            vec![
                Direction::Clockwise,
                Direction::Clockwise,
                Direction::Anticlockwise
            ]
        );
    }

    #[test]
    fn non_zero_sibling_holes_share_a_direction() {
        let mut segments = square(0.0, 0.0, 100.0);
        segments.extend(square(10.0, 10.0, 20.0));
        segments.extend(square(60.0, 60.0, 20.0));
        let subpaths = Path::new(segments).make_non_zero().subpaths();
        assert_eq!(subpaths.len(), 3);
        assert_eq!(subpaths[0].direction(), Direction::Clockwise);
        assert_eq!(subpaths[1].direction(), Direction::Anticlockwise);
        assert_eq!(subpaths[2].direction(), Direction::Anticlockwise);
    }

    #[test]
    fn non_zero_off_center_hole_is_reversed() {
        let mut segments = square(0.0, 0.0, 100.0);
        segments.extend(square(80.0, 5.0, 10.0));
        let subpaths = Path::new(segments).make_non_zero().subpaths();
        assert_ne!(subpaths[0].direction(), subpaths[1].direction());
        assert_eq!(subpaths[1].bounds(), Rect::new(80.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn non_zero_leaves_disjoint_shapes_alone() {
        let mut segments = square(0.0, 0.0, 10.0);
        segments.extend(square(20.0, 0.0, 10.0));
        let path = Path::new(segments);
        assert_eq!(path.make_non_zero(), path);
    }

    #[test]
    fn applying_matrix() {
        let path = Path::new(square(0.0, 0.0, 1.0)).applying(Matrix::scale(2.0, 3.0));
        assert_eq!(path.bounds(), Rect::new(0.0, 0.0, 2.0, 3.0));
    }
}
