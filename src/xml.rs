use std::collections::HashMap;

use crate::error::ParseError;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Generic attributed tree produced by the markup parser.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: HashMap<String, String>,
    pub children: Vec<XmlElement>,
    pub inner_text: Option<String>,
    /// 1-based (line, column) of the start tag.
    pub location: Option<(u32, u32)>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn line(&self) -> Option<u32> {
        self.location.map(|(line, _)| line)
    }

    pub fn column(&self) -> Option<u32> {
        self.location.map(|(_, column)| column)
    }
}

pub fn parse_xml_bytes(bytes: &[u8]) -> Result<XmlElement, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|err| ParseError::InvalidDocument {
        element: None,
        line: 1,
        column: 1,
        message: format!("document is not valid UTF-8: {err}"),
    })?;
    parse_xml(text)
}

/// Parses markup and keeps only the SVG-namespace elements.
pub fn parse_xml(text: &str) -> Result<XmlElement, ParseError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options).map_err(|err| {
        let pos = err.pos();
        ParseError::InvalidDocument {
            element: innermost_open_element(text, pos.row, pos.col),
            line: pos.row,
            column: pos.col,
            message: err.to_string(),
        }
    })?;

    let root = doc.root_element();
    if root.tag_name().namespace() != Some(SVG_NAMESPACE) {
        let pos = doc.text_pos_at(root.range().start);
        return Err(ParseError::InvalidDocument {
            element: Some(root.tag_name().name().to_string()),
            line: pos.row,
            column: pos.col,
            message: "root element is not in the SVG namespace".to_string(),
        });
    }
    Ok(convert_node(&doc, root))
}

fn convert_node(doc: &roxmltree::Document<'_>, node: roxmltree::Node<'_, '_>) -> XmlElement {
    let pos = doc.text_pos_at(node.range().start);
    let mut element = XmlElement::new(node.tag_name().name());
    element.location = Some((pos.row, pos.col));

    for attr in node.attributes() {
        let key = match attr.namespace() {
            Some(XLINK_NAMESPACE) => format!("xlink:{}", attr.name()),
            Some(XML_NAMESPACE) => format!("xml:{}", attr.name()),
            _ => attr.name().to_string(),
        };
        element.attributes.insert(key, attr.value().to_string());
    }

    let mut text: Option<String> = None;
    for child in node.children() {
        if child.is_element() {
            // Foreign-namespace subtrees are dropped whole.
            if child.tag_name().namespace() == Some(SVG_NAMESPACE) {
                element.children.push(convert_node(doc, child));
            }
        } else if child.is_text() {
            if let Some(chunk) = child.text() {
                text.get_or_insert_with(String::new).push_str(chunk);
            }
        }
    }
    element.inner_text = text;
    element
}

/// Name of the element still open at a (1-based) line/column in the source.
fn innermost_open_element(text: &str, row: u32, col: u32) -> Option<String> {
    let offset = byte_offset(text, row, col).min(text.len());
    let bytes = text[..offset].as_bytes();
    let mut stack: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let rest = &text[i..offset];
        if rest.starts_with("<!--") {
            i += rest.find("-->").map(|p| p + 3).unwrap_or(rest.len());
            continue;
        }
        if rest.starts_with("<![CDATA[") {
            i += rest.find("]]>").map(|p| p + 3).unwrap_or(rest.len());
            continue;
        }
        if rest.starts_with("<?") || rest.starts_with("<!") {
            i += rest.find('>').map(|p| p + 1).unwrap_or(rest.len());
            continue;
        }
        let closing = rest.starts_with("</");
        let name_start = if closing { 2 } else { 1 };
        let name_len = rest[name_start..]
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len() - name_start);
        let name = &rest[name_start..name_start + name_len];
        let tag_end = rest.find('>');
        if closing {
            stack.pop();
        } else if !name.is_empty() {
            let self_closing = tag_end.map(|p| rest[..p].ends_with('/')).unwrap_or(false);
            if !self_closing {
                stack.push(name);
            }
        }
        i += tag_end.map(|p| p + 1).unwrap_or(rest.len());
    }
    stack
        .last()
        .map(|name| name.rsplit(':').next().unwrap_or(name).to_string())
}

fn byte_offset(text: &str, row: u32, col: u32) -> usize {
    let mut offset = 0;
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        if idx + 1 == row as usize {
            let chars = col.saturating_sub(1) as usize;
            return offset
                + line
                    .char_indices()
                    .nth(chars)
                    .map(|(pos, _)| pos)
                    .unwrap_or(line.len());
        }
        offset += line.len();
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_svg_namespace_elements_only() {
        let text = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:x="urn:other">
  <rect width="10" height="5"/>
  <x:thing><rect width="1" height="1"/></x:thing>
</svg>"#;
        let root = parse_xml(text).expect("expected parsed tree");
        assert_eq!(root.name, "svg");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].attribute("width"), Some("10"));
        assert_eq!(root.children[0].location, Some((2, 3)));
    }

    #[test]
    fn xlink_attributes_keep_prefix() {
        let text = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
<use xlink:href="#a"/></svg>"##;
        let root = parse_xml(text).expect("expected parsed tree");
        assert_eq!(root.children[0].attribute("xlink:href"), Some("#a"));
    }

    #[test]
    fn inner_text_is_verbatim() {
        let text = r#"<svg xmlns="http://www.w3.org/2000/svg"><text>  Hello
 world </text></svg>"#;
        let root = parse_xml(text).expect("expected parsed tree");
        assert_eq!(root.children[0].inner_text.as_deref(), Some("  Hello\n world "));
    }

    #[test]
    fn malformed_document_reports_element_and_position() {
        let text = "<svg xmlns=\"http://www.w3.org/2000/svg\">\n<g>\n<rect></g>\n</svg>";
        let err = parse_xml(text).expect_err("expected a document error");
        match err {
            ParseError::InvalidDocument {
                element, line, column, ..
            } => {
                assert!(
                    matches!(element.as_deref(), Some("rect") | Some("g")),
                    "unexpected element {element:?}"
                );
                assert_eq!(line, 3);
                assert!(column >= 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_svg_root_is_rejected() {
        let err = parse_xml("<html/>").expect_err("expected a document error");
        assert!(matches!(err, ParseError::InvalidDocument { .. }));
    }

    #[test]
    fn invalid_utf8_is_a_document_error() {
        let err = parse_xml_bytes(&[0x3c, 0xff, 0xfe]).expect_err("expected a document error");
        assert!(matches!(err, ParseError::InvalidDocument { line: 1, column: 1, .. }));
    }
}
