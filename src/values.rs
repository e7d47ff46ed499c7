use std::collections::HashMap;
use std::str::FromStr;

use crate::color::{DomColor, DomFill, parse_fill};
use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::scanner::Scanner;
use crate::types::Point;

/// A number with an optional unit suffix (`12`, `12px`, `100%`); the unit
/// itself is not interpreted.
pub fn parse_float(value: &str) -> Result<f32, ParseError> {
    let mut scanner = Scanner::new(value);
    let v = scanner.scan_float()?;
    let unit = scanner.remainder();
    if !unit.is_empty() && !unit.trim_end().bytes().all(|b| b.is_ascii_alphabetic() || b == b'%') {
        return Err(ParseError::invalid(format!("unexpected trailing text in '{value}'")));
    }
    Ok(v)
}

pub fn parse_floats(value: &str) -> Result<Vec<f32>, ParseError> {
    let mut out = Vec::new();
    let mut scanner = Scanner::new(value);
    while !scanner.is_eof() {
        out.push(scanner.scan_float()?);
        scanner.scan_string_if_possible(",");
    }
    Ok(out)
}

/// `NN%` → NN/100, otherwise a bare float in 0..=1.
pub fn parse_percentage(value: &str) -> Result<f32, ParseError> {
    let mut scanner = Scanner::new(value);
    let v = match scanner.scan_percentage() {
        Ok(v) => v,
        Err(_) => scanner.scan_percentage_float()?,
    };
    expect_eof(&mut scanner, value)?;
    Ok(v)
}

pub fn parse_coordinate(value: &str) -> Result<f32, ParseError> {
    parse_float(value)
}

/// A coordinate that may also be written as a percentage (gradient geometry).
pub fn parse_coordinate_or_percentage(value: &str) -> Result<f32, ParseError> {
    let mut scanner = Scanner::new(value);
    let v = match scanner.scan_percentage() {
        Ok(v) => v,
        Err(_) => {
            let v = scanner.scan_float()?;
            scanner.scan_string_if_possible("px");
            v
        }
    };
    expect_eof(&mut scanner, value)?;
    Ok(v)
}

pub fn parse_length(value: &str) -> Result<f32, ParseError> {
    let v = parse_float(value)?;
    if v < 0.0 {
        return Err(ParseError::invalid(format!("negative length '{value}'")));
    }
    Ok(v)
}

pub fn parse_bool(value: &str) -> Result<bool, ParseError> {
    let mut scanner = Scanner::new(value);
    let v = scanner.scan_bool()?;
    expect_eof(&mut scanner, value)?;
    Ok(v)
}

/// Plain URL or reference (`#id`); data URLs lose their embedded whitespace.
pub fn parse_url(value: &str) -> Result<String, ParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ParseError::invalid("empty url"));
    }
    if trimmed.starts_with("data:") {
        return Ok(trimmed
            .chars()
            .filter(|c| !matches!(c, '\t' | '\n' | '\r' | ' '))
            .collect());
    }
    Ok(trimmed.to_string())
}

/// `url(#id)`.
pub fn parse_url_selector(value: &str) -> Result<String, ParseError> {
    let mut scanner = Scanner::new(value);
    scanner.scan_string("url(")?;
    let inner = scanner.scan_up_to(b")")?;
    scanner.scan_string_if_possible(")");
    let url = inner.trim().trim_matches(|c| c == '\'' || c == '"');
    if url.is_empty() || !scanner.is_eof() {
        return Err(ParseError::invalid(format!("malformed url selector '{value}'")));
    }
    parse_url(url)
}

pub fn parse_points(value: &str) -> Result<Vec<Point>, ParseError> {
    let mut points = Vec::new();
    let mut scanner = Scanner::new(value);
    while !scanner.is_eof() {
        let x = scanner.scan_float()?;
        scanner.scan_first_of(b",;");
        let y = scanner.scan_float()?;
        scanner.scan_first_of(b",;");
        points.push(Point::new(x, y));
    }
    Ok(points)
}

pub fn parse_raw<T: FromStr>(value: &str) -> Result<T, ParseError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ParseError::invalid(format!("unknown value '{}'", value.trim())))
}

fn expect_eof(scanner: &mut Scanner<'_>, value: &str) -> Result<(), ParseError> {
    if scanner.is_eof() {
        Ok(())
    } else {
        Err(ParseError::invalid(format!("unexpected trailing text in '{value}'")))
    }
}

/// Typed access to a keyed set of raw attribute values.
///
/// `parse` fails with `MissingAttribute` or `InvalidAttribute`; the optional
/// variant maps "missing" to `None` and, under `SKIP_INVALID_ATTRIBUTES`,
/// does the same for unparsable values.
pub trait AttributeParser {
    fn value(&self, key: &str) -> Option<&str>;

    fn options(&self) -> ParseOptions;

    fn parse<T>(
        &self,
        key: &str,
        exp: impl Fn(&str) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let value = self.value(key).ok_or_else(|| ParseError::missing(key))?;
        exp(value).map_err(|_| ParseError::InvalidAttribute {
            name: key.to_string(),
            value: value.to_string(),
        })
    }

    fn parse_opt<T>(
        &self,
        key: &str,
        exp: impl Fn(&str) -> Result<T, ParseError>,
    ) -> Result<Option<T>, ParseError> {
        match self.parse(key, exp) {
            Ok(v) => Ok(Some(v)),
            Err(ParseError::MissingAttribute { .. }) => Ok(None),
            Err(_) if self.options().contains(ParseOptions::SKIP_INVALID_ATTRIBUTES) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn parse_string(&self, key: &str) -> Result<String, ParseError> {
        self.parse(key, |v| Ok(v.to_string()))
    }

    fn parse_float(&self, key: &str) -> Result<f32, ParseError> {
        self.parse(key, parse_float)
    }

    fn parse_coordinate(&self, key: &str) -> Result<f32, ParseError> {
        self.parse(key, parse_coordinate)
    }

    fn parse_url(&self, key: &str) -> Result<String, ParseError> {
        self.parse(key, parse_url)
    }

    fn parse_string_opt(&self, key: &str) -> Result<Option<String>, ParseError> {
        self.parse_opt(key, |v| Ok(v.to_string()))
    }

    fn parse_float_opt(&self, key: &str) -> Result<Option<f32>, ParseError> {
        self.parse_opt(key, parse_float)
    }

    fn parse_floats_opt(&self, key: &str) -> Result<Option<Vec<f32>>, ParseError> {
        self.parse_opt(key, parse_floats)
    }

    fn parse_percentage_opt(&self, key: &str) -> Result<Option<f32>, ParseError> {
        self.parse_opt(key, parse_percentage)
    }

    fn parse_coordinate_opt(&self, key: &str) -> Result<Option<f32>, ParseError> {
        self.parse_opt(key, parse_coordinate)
    }

    fn parse_fill_opt(&self, key: &str) -> Result<Option<DomFill>, ParseError> {
        self.parse_opt(key, parse_fill)
    }

    fn parse_color_opt(&self, key: &str) -> Result<Option<DomColor>, ParseError> {
        self.parse_opt(key, |v| match parse_fill(v)? {
            DomFill::Color(color) => Ok(color),
            DomFill::Url(_) => Err(ParseError::invalid("expected color")),
        })
    }

    fn parse_url_opt(&self, key: &str) -> Result<Option<String>, ParseError> {
        self.parse_opt(key, parse_url)
    }

    /// `none` clears the reference.
    fn parse_url_selector_opt(&self, key: &str) -> Result<Option<String>, ParseError> {
        if self.value(key).is_some_and(|v| v.trim() == "none") {
            return Ok(None);
        }
        self.parse_opt(key, parse_url_selector)
    }

    fn parse_points_opt(&self, key: &str) -> Result<Option<Vec<Point>>, ParseError> {
        self.parse_opt(key, parse_points)
    }

    fn parse_raw_opt<T: FromStr>(&self, key: &str) -> Result<Option<T>, ParseError> {
        self.parse_opt(key, parse_raw::<T>)
    }
}

/// Style-sheet declaration blocks are parsed with default strictness.
impl AttributeParser for HashMap<String, String> {
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn options(&self) -> ParseOptions {
        ParseOptions::NONE
    }
}

/// Element attributes merged with its inline `style` properties.
///
/// A style property takes precedence; an invalid style value falls back to
/// the element attribute only when invalid attributes are skipped.
pub struct Attributes<'a> {
    pub element: &'a HashMap<String, String>,
    pub style: HashMap<String, String>,
    pub options: ParseOptions,
}

impl AttributeParser for Attributes<'_> {
    fn value(&self, key: &str) -> Option<&str> {
        self.style
            .get(key)
            .or_else(|| self.element.get(key))
            .map(String::as_str)
    }

    fn options(&self) -> ParseOptions {
        self.options
    }

    fn parse<T>(
        &self,
        key: &str,
        exp: impl Fn(&str) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let from_element = |exp: &dyn Fn(&str) -> Result<T, ParseError>| {
            let value = self.element.get(key).ok_or_else(|| ParseError::missing(key))?;
            exp(value).map_err(|_| ParseError::InvalidAttribute {
                name: key.to_string(),
                value: value.clone(),
            })
        };
        let Some(value) = self.style.get(key) else {
            return from_element(&exp);
        };
        match exp(value) {
            Ok(v) => Ok(v),
            Err(_) if self.options.contains(ParseOptions::SKIP_INVALID_ATTRIBUTES) => {
                from_element(&exp)
            }
            Err(_) => Err(ParseError::InvalidAttribute {
                name: key.to_string(),
                value: value.clone(),
            }),
        }
    }
}
