use crate::error::ParseError;
use crate::scanner::Scanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSpace {
    Absolute,
    Relative,
}

/// One path-data command with its raw operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    Move { x: f32, y: f32, space: CoordinateSpace },
    Line { x: f32, y: f32, space: CoordinateSpace },
    Horizontal { x: f32, space: CoordinateSpace },
    Vertical { y: f32, space: CoordinateSpace },
    Cubic { x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32, space: CoordinateSpace },
    CubicSmooth { x2: f32, y2: f32, x: f32, y: f32, space: CoordinateSpace },
    Quadratic { x1: f32, y1: f32, x: f32, y: f32, space: CoordinateSpace },
    QuadraticSmooth { x: f32, y: f32, space: CoordinateSpace },
    Arc {
        rx: f32,
        ry: f32,
        rotate: f32,
        large: bool,
        sweep: bool,
        x: f32,
        y: f32,
        space: CoordinateSpace,
    },
    Close,
}

impl PathSegment {
    /// The command letter, lower case for relative segments.
    pub fn command(&self) -> char {
        let (upper, space) = match *self {
            PathSegment::Move { space, .. } => ('M', space),
            PathSegment::Line { space, .. } => ('L', space),
            PathSegment::Horizontal { space, .. } => ('H', space),
            PathSegment::Vertical { space, .. } => ('V', space),
            PathSegment::Cubic { space, .. } => ('C', space),
            PathSegment::CubicSmooth { space, .. } => ('S', space),
            PathSegment::Quadratic { space, .. } => ('Q', space),
            PathSegment::QuadraticSmooth { space, .. } => ('T', space),
            PathSegment::Arc { space, .. } => ('A', space),
            PathSegment::Close => return 'Z',
        };
        match space {
            CoordinateSpace::Absolute => upper,
            CoordinateSpace::Relative => upper.to_ascii_lowercase(),
        }
    }
}

const COMMANDS: &[u8] = b"MmLlHhVvCcSsQqTtAaZz";
const DELIMITERS: &[u8] = b",;";

/// Parses the `d` mini-language.
///
/// Operands after a move without a new command letter continue as a line of
/// the same case; otherwise the previous command repeats. Empty input yields
/// an empty list.
pub fn parse_path_data(data: &str) -> Result<Vec<PathSegment>, ParseError> {
    let mut segments = Vec::new();
    let mut scanner = Scanner::new(data);
    let mut last: Option<u8> = None;

    while !scanner.is_eof() {
        let command = match scanner.scan_first_of(COMMANDS) {
            Some(cmd) => cmd,
            None => match last {
                Some(b'M') => b'L',
                Some(b'm') => b'l',
                Some(b'Z' | b'z') | None => {
                    return Err(ParseError::invalid(format!(
                        "expected path command at '{}'",
                        scanner.remainder()
                    )));
                }
                Some(cmd) => cmd,
            },
        };
        last = Some(command);
        segments.push(parse_segment(command, &mut scanner)?);
    }
    Ok(segments)
}

fn parse_segment(command: u8, scanner: &mut Scanner<'_>) -> Result<PathSegment, ParseError> {
    let space = if command.is_ascii_lowercase() {
        CoordinateSpace::Relative
    } else {
        CoordinateSpace::Absolute
    };

    let segment = match command.to_ascii_uppercase() {
        b'M' => PathSegment::Move { x: coordinate(scanner)?, y: coordinate(scanner)?, space },
        b'L' => PathSegment::Line { x: coordinate(scanner)?, y: coordinate(scanner)?, space },
        b'H' => PathSegment::Horizontal { x: coordinate(scanner)?, space },
        b'V' => PathSegment::Vertical { y: coordinate(scanner)?, space },
        b'C' => PathSegment::Cubic {
            x1: coordinate(scanner)?,
            y1: coordinate(scanner)?,
            x2: coordinate(scanner)?,
            y2: coordinate(scanner)?,
            x: coordinate(scanner)?,
            y: coordinate(scanner)?,
            space,
        },
        b'S' => PathSegment::CubicSmooth {
            x2: coordinate(scanner)?,
            y2: coordinate(scanner)?,
            x: coordinate(scanner)?,
            y: coordinate(scanner)?,
            space,
        },
        b'Q' => PathSegment::Quadratic {
            x1: coordinate(scanner)?,
            y1: coordinate(scanner)?,
            x: coordinate(scanner)?,
            y: coordinate(scanner)?,
            space,
        },
        b'T' => PathSegment::QuadraticSmooth { x: coordinate(scanner)?, y: coordinate(scanner)?, space },
        b'A' => {
            let rx = coordinate(scanner)?;
            let ry = coordinate(scanner)?;
            let rotate = coordinate(scanner)?;
            let large = flag(scanner)?;
            let sweep = flag(scanner)?;
            let x = coordinate(scanner)?;
            let y = coordinate(scanner)?;
            PathSegment::Arc { rx, ry, rotate, large, sweep, x, y, space }
        }
        _ => PathSegment::Close,
    };
    Ok(segment)
}

fn coordinate(scanner: &mut Scanner<'_>) -> Result<f32, ParseError> {
    let value = scanner.scan_float()?;
    scanner.scan_first_of(DELIMITERS);
    Ok(value)
}

fn flag(scanner: &mut Scanner<'_>) -> Result<bool, ParseError> {
    let value = scanner.scan_bool()?;
    scanner.scan_first_of(DELIMITERS);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use CoordinateSpace::*;

    #[test]
    fn implicit_commands_after_move_become_lines() {
        let segments = parse_path_data("M10 20 30 40 m1 2 3 4").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Move { x: 10.0, y: 20.0, space: Absolute },
                PathSegment::Line { x: 30.0, y: 40.0, space: Absolute },
                PathSegment::Move { x: 1.0, y: 2.0, space: Relative },
                PathSegment::Line { x: 3.0, y: 4.0, space: Relative },
            ]
        );
    }

    #[test]
    fn other_commands_repeat() {
        let segments = parse_path_data("M0,0 h10 20 v5").unwrap();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[2], PathSegment::Horizontal { x: 20.0, space: Relative });
    }

    #[test]
    fn compact_numbers_and_arc_flags() {
        let segments = parse_path_data("M0-1.5.5 1a25,25 -30 0110,20z").unwrap();
        assert_eq!(segments[0], PathSegment::Move { x: 0.0, y: -1.5, space: Absolute });
        assert_eq!(segments[1], PathSegment::Line { x: 0.5, y: 1.0, space: Absolute });
        assert!(matches!(
            segments[2],
            PathSegment::Arc { large: false, sweep: true, x, y, space: Relative, .. } if x == 10.0 && y == 20.0
        ));
        assert_eq!(segments[3], PathSegment::Close);
    }

    #[test]
    fn missing_operand_fails() {
        assert!(parse_path_data("M 10").is_err());
        assert!(parse_path_data("C 1 2 3 4 5").is_err());
    }

    #[test]
    fn empty_data_and_numbers_after_close() {
        assert!(parse_path_data("").unwrap().is_empty());
        assert!(parse_path_data("   ").unwrap().is_empty());
        assert!(parse_path_data("M0 0 Z 5 5").is_err());
        assert!(parse_path_data("10 10").is_err());
    }

    #[test]
    fn command_letters_keep_case() {
        let segments = parse_path_data("m1 1 L2 2 q1 1 2 2 Z").unwrap();
        let letters: String = segments.iter().map(PathSegment::command).collect();
        assert_eq!(letters, "mLqZ");
    }
}
