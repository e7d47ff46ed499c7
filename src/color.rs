use crate::error::ParseError;
use crate::scanner::Scanner;
use crate::values::parse_url_selector;

/// A color as written in the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomColor {
    None,
    CurrentColor,
    Keyword(&'static str),
    Rgbi(u8, u8, u8),
    Rgbf(f32, f32, f32),
    Hex(u8, u8, u8),
    P3(f32, f32, f32),
}

/// A `fill`/`stroke` paint.
#[derive(Debug, Clone, PartialEq)]
pub enum DomFill {
    Color(DomColor),
    Url(String),
}

impl DomFill {
    pub fn color(&self) -> Option<DomColor> {
        match self {
            DomFill::Color(color) => Some(*color),
            DomFill::Url(_) => None,
        }
    }
}

impl DomColor {
    /// sRGB components in 0..=1, or `None` for `none`, `currentColor` and P3.
    pub fn srgb(&self) -> Option<[f32; 3]> {
        let bytes = |r: u8, g: u8, b: u8| {
            Some([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0])
        };
        match *self {
            DomColor::Rgbi(r, g, b) | DomColor::Hex(r, g, b) => bytes(r, g, b),
            DomColor::Rgbf(r, g, b) => Some([r, g, b]),
            DomColor::Keyword(name) => {
                let [r, g, b] = keyword_rgb(name)?;
                bytes(r, g, b)
            }
            DomColor::None | DomColor::CurrentColor | DomColor::P3(..) => None,
        }
    }
}

/// Tries, in order: `rgb()`, hex, `color(display-p3 ...)`, `currentColor`,
/// a named keyword, `none`, `url(...)`.
pub fn parse_fill(value: &str) -> Result<DomFill, ParseError> {
    if let Some(color) = parse_color_rgb(value)? {
        return Ok(DomFill::Color(color));
    }
    if let Some(color) = parse_color_hex(value)? {
        return Ok(DomFill::Color(color));
    }
    if let Some(color) = parse_color_p3(value)? {
        return Ok(DomFill::Color(color));
    }
    let raw = value.trim();
    if raw == "currentColor" {
        return Ok(DomFill::Color(DomColor::CurrentColor));
    }
    if let Some(name) = keyword(raw) {
        return Ok(DomFill::Color(DomColor::Keyword(name)));
    }
    if raw == "none" {
        return Ok(DomFill::Color(DomColor::None));
    }
    if raw.starts_with("url(") {
        return parse_url_selector(raw).map(DomFill::Url);
    }
    Err(ParseError::invalid(format!("unknown paint '{raw}'")))
}

pub fn parse_color(value: &str) -> Result<DomColor, ParseError> {
    match parse_fill(value)? {
        DomFill::Color(color) => Ok(color),
        DomFill::Url(url) => Err(ParseError::invalid(format!("expected color, found url {url}"))),
    }
}

fn parse_color_rgb(value: &str) -> Result<Option<DomColor>, ParseError> {
    let mut scanner = Scanner::new(value);
    if !scanner.scan_string_if_possible("rgb(") {
        return Ok(None);
    }
    if let Ok(color) = parse_rgb_components(value, |s| s.scan_percentage(), DomColor::Rgbf) {
        return Ok(Some(color));
    }
    parse_rgb_components(value, |s| s.scan_u8(), DomColor::Rgbi).map(Some)
}

fn parse_rgb_components<T>(
    value: &str,
    mut component: impl FnMut(&mut Scanner<'_>) -> Result<T, ParseError>,
    make: impl Fn(T, T, T) -> DomColor,
) -> Result<DomColor, ParseError> {
    let mut scanner = Scanner::new(value);
    scanner.scan_string("rgb(")?;
    let r = component(&mut scanner)?;
    scanner.scan_string_if_possible(",");
    let g = component(&mut scanner)?;
    scanner.scan_string_if_possible(",");
    let b = component(&mut scanner)?;
    scanner.scan_string(")")?;
    if !scanner.is_eof() {
        return Err(ParseError::invalid(format!("trailing text after '{value}'")));
    }
    Ok(make(r, g, b))
}

fn parse_color_p3(value: &str) -> Result<Option<DomColor>, ParseError> {
    let mut scanner = Scanner::new(value);
    if !scanner.scan_string_if_possible("color(display-p3") {
        return Ok(None);
    }
    let r = scanner.scan_float()?;
    scanner.scan_string_if_possible(",");
    let g = scanner.scan_float()?;
    scanner.scan_string_if_possible(",");
    let b = scanner.scan_float()?;
    scanner.scan_string(")")?;
    Ok(Some(DomColor::P3(r, g, b)))
}

/// `#rgb` duplicates each nibble (`#abc` is `#aabbcc`).
fn parse_color_hex(value: &str) -> Result<Option<DomColor>, ParseError> {
    let raw = value.trim();
    let Some(code) = raw.strip_prefix('#') else {
        return Ok(None);
    };
    if !code.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::invalid(format!("invalid hex color '{raw}'")));
    }
    let expanded: String = match code.len() {
        3 => code.chars().flat_map(|c| [c, c]).collect(),
        6 => code.to_string(),
        _ => return Err(ParseError::invalid(format!("invalid hex color '{raw}'"))),
    };
    let hex = u32::from_str_radix(&expanded, 16)
        .map_err(|_| ParseError::invalid(format!("invalid hex color '{raw}'")))?;
    Ok(Some(DomColor::Hex(
        ((hex >> 16) & 0xff) as u8,
        ((hex >> 8) & 0xff) as u8,
        (hex & 0xff) as u8,
    )))
}

fn keyword(name: &str) -> Option<&'static str> {
    KEYWORDS
        .binary_search_by(|(k, _)| (*k).cmp(name))
        .ok()
        .map(|idx| KEYWORDS[idx].0)
}

pub fn keyword_rgb(name: &str) -> Option<[u8; 3]> {
    KEYWORDS
        .binary_search_by(|(k, _)| (*k).cmp(name))
        .ok()
        .map(|idx| KEYWORDS[idx].1)
}

// Sorted for binary search.
static KEYWORDS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkgrey", [169, 169, 169]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkslategrey", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("grey", [128, 128, 128]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightgrey", [211, 211, 211]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightslategrey", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("slategrey", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_is_sorted() {
        assert!(KEYWORDS.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(KEYWORDS.len(), 147);
    }

    #[test]
    fn short_hex_duplicates_nibbles() {
        assert_eq!(parse_color("#abc").unwrap(), parse_color("#aabbcc").unwrap());
        assert_eq!(parse_color("#f00").unwrap(), DomColor::Hex(255, 0, 0));
        assert!(parse_color("#abcd").is_err());
        assert!(parse_color("#ggg").is_err());
    }

    #[test]
    fn rgb_prefers_percentages_then_integers() {
        assert_eq!(
            parse_color("rgb(50%, 0%, 100%)").unwrap(),
            DomColor::Rgbf(0.5, 0.0, 1.0)
        );
        assert_eq!(
            parse_color("rgb(10, 20, 30)").unwrap(),
            DomColor::Rgbi(10, 20, 30)
        );
        assert!(parse_color("rgb(300, 0, 0)").is_err());
    }

    #[test]
    fn p3_keywords_and_specials() {
        assert_eq!(
            parse_color("color(display-p3 1 0.5 0)").unwrap(),
            DomColor::P3(1.0, 0.5, 0.0)
        );
        assert_eq!(parse_color(" currentColor ").unwrap(), DomColor::CurrentColor);
        assert_eq!(parse_color("rebeccapurple").ok(), None);
        assert_eq!(parse_color("teal").unwrap(), DomColor::Keyword("teal"));
        assert_eq!(parse_color("none").unwrap(), DomColor::None);
    }

    #[test]
    fn url_paint() {
        assert_eq!(parse_fill("url(#g1)").unwrap(), DomFill::Url("#g1".to_string()));
        assert!(parse_color("url(#g1)").is_err());
    }

    #[test]
    fn srgb_components() {
        assert_eq!(DomColor::Keyword("white").srgb(), Some([1.0, 1.0, 1.0]));
        assert_eq!(DomColor::Hex(0, 0, 255).srgb(), Some([0.0, 0.0, 1.0]));
        assert_eq!(DomColor::None.srgb(), None);
    }
}
