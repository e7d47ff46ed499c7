use crate::error::ParseError;
use crate::scanner::Scanner;
use crate::types::{Matrix, Transform};

/// A transform-list function as written; angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomTransform {
    Matrix { a: f32, b: f32, c: f32, d: f32, e: f32, f: f32 },
    Translate { tx: f32, ty: f32 },
    Scale { sx: f32, sy: f32 },
    Rotate { angle: f32 },
    RotatePoint { angle: f32, cx: f32, cy: f32 },
    SkewX { angle: f32 },
    SkewY { angle: f32 },
}

impl DomTransform {
    /// Lowers to LayerTree steps; a rotation about a point becomes
    /// translate, rotate, translate back.
    pub fn layer_transforms(&self) -> Vec<Transform> {
        match *self {
            DomTransform::Matrix { a, b, c, d, e, f } => {
                vec![Transform::Matrix(Matrix::new(a, b, c, d, e, f))]
            }
            DomTransform::Translate { tx, ty } => vec![Transform::Translate { tx, ty }],
            DomTransform::Scale { sx, sy } => vec![Transform::Scale { sx, sy }],
            DomTransform::Rotate { angle } => vec![Transform::Rotate {
                radians: angle.to_radians(),
            }],
            DomTransform::RotatePoint { angle, cx, cy } => vec![
                Transform::Translate { tx: cx, ty: cy },
                Transform::Rotate {
                    radians: angle.to_radians(),
                },
                Transform::Translate { tx: -cx, ty: -cy },
            ],
            DomTransform::SkewX { angle } => {
                vec![Transform::Matrix(Matrix::skew_x(angle.to_radians()))]
            }
            DomTransform::SkewY { angle } => {
                vec![Transform::Matrix(Matrix::skew_y(angle.to_radians()))]
            }
        }
    }
}

pub fn layer_transforms(transforms: &[DomTransform]) -> Vec<Transform> {
    transforms.iter().flat_map(DomTransform::layer_transforms).collect()
}

/// Parses a `transform` attribute. Anything left over after the last
/// recognised function is an error.
pub fn parse_transform(data: &str) -> Result<Vec<DomTransform>, ParseError> {
    let mut scanner = Scanner::new(data);
    let mut transforms = Vec::new();
    while let Some(transform) = parse_function(&mut scanner)? {
        transforms.push(transform);
        scanner.scan_string_if_possible(",");
    }
    if !scanner.is_eof() {
        return Err(ParseError::invalid(format!(
            "unexpected transform '{}'",
            scanner.remainder()
        )));
    }
    Ok(transforms)
}

fn parse_function(scanner: &mut Scanner<'_>) -> Result<Option<DomTransform>, ParseError> {
    let transform = if scanner.scan_string_if_possible("matrix(") {
        let mut m = [0.0f32; 6];
        for (idx, slot) in m.iter_mut().enumerate() {
            if idx > 0 {
                scanner.scan_string_if_possible(",");
            }
            *slot = scanner.scan_float()?;
        }
        scanner.scan_string(")")?;
        let [a, b, c, d, e, f] = m;
        DomTransform::Matrix { a, b, c, d, e, f }
    } else if scanner.scan_string_if_possible("translate(") {
        let tx = scanner.scan_float()?;
        let ty = optional_second(scanner)?.unwrap_or(0.0);
        DomTransform::Translate { tx, ty }
    } else if scanner.scan_string_if_possible("scale(") {
        let sx = scanner.scan_float()?;
        let sy = optional_second(scanner)?.unwrap_or(sx);
        DomTransform::Scale { sx, sy }
    } else if scanner.scan_string_if_possible("rotate(") {
        let angle = scanner.scan_float()?;
        if scanner.scan_string_if_possible(")") {
            DomTransform::Rotate { angle }
        } else {
            scanner.scan_string_if_possible(",");
            let cx = scanner.scan_float()?;
            scanner.scan_string_if_possible(",");
            let cy = scanner.scan_float()?;
            scanner.scan_string(")")?;
            DomTransform::RotatePoint { angle, cx, cy }
        }
    } else if scanner.scan_string_if_possible("skewX(") {
        let angle = scanner.scan_float()?;
        scanner.scan_string(")")?;
        DomTransform::SkewX { angle }
    } else if scanner.scan_string_if_possible("skewY(") {
        let angle = scanner.scan_float()?;
        scanner.scan_string(")")?;
        DomTransform::SkewY { angle }
    } else {
        return Ok(None);
    };
    Ok(Some(transform))
}

/// Either `)` or `[,] value )`.
fn optional_second(scanner: &mut Scanner<'_>) -> Result<Option<f32>, ParseError> {
    if scanner.scan_string_if_possible(")") {
        return Ok(None);
    }
    scanner.scan_string_if_possible(",");
    let value = scanner.scan_float()?;
    scanner.scan_string(")")?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, transforms_to_matrix};

    #[test]
    fn parses_sequence() {
        let list = parse_transform("translate(10) scale(2), rotate(45) skewX(10)").unwrap();
        assert_eq!(
            list,
            vec![
                DomTransform::Translate { tx: 10.0, ty: 0.0 },
                DomTransform::Scale { sx: 2.0, sy: 2.0 },
                DomTransform::Rotate { angle: 45.0 },
                DomTransform::SkewX { angle: 10.0 },
            ]
        );
    }

    #[test]
    fn matrix_accepts_commas_or_spaces() {
        let list = parse_transform("matrix(1,0 0,1 5 6)").unwrap();
        assert_eq!(
            list,
            vec![DomTransform::Matrix { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 5.0, f: 6.0 }]
        );
    }

    #[test]
    fn rotate_about_point_differs_from_origin_rotation() {
        let plain = parse_transform("rotate(45)").unwrap();
        assert_eq!(plain, vec![DomTransform::Rotate { angle: 45.0 }]);
        let about = parse_transform("rotate(45, 10, 10)").unwrap();
        assert_eq!(
            about,
            vec![DomTransform::RotatePoint { angle: 45.0, cx: 10.0, cy: 10.0 }]
        );

        let m1 = transforms_to_matrix(&layer_transforms(&plain));
        let m2 = transforms_to_matrix(&layer_transforms(&about));
        assert_ne!(m1, m2);
        // The centre is a fixed point.
        let p = m2.apply(Point::new(10.0, 10.0));
        assert!((p.x - 10.0).abs() < 1e-4 && (p.y - 10.0).abs() < 1e-4);

        let origin = transforms_to_matrix(&layer_transforms(&parse_transform("rotate(45 0 0)").unwrap()));
        assert!((origin.a - m1.a).abs() < 1e-6 && origin.e.abs() < 1e-6);
    }

    #[test]
    fn trailing_garbage_fails() {
        assert!(parse_transform("scale(2) wobble(3)").is_err());
        assert!(parse_transform("translate(1 2 3)").is_err());
        assert!(parse_transform("").unwrap().is_empty());
    }
}
