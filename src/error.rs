use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid document{}: {message} (line {line}, column {column})", element_suffix(.element))]
    InvalidDocument {
        element: Option<String>,
        line: u32,
        column: u32,
        message: String,
    },
    #[error("missing attribute: {name}")]
    MissingAttribute { name: String },
    #[error("invalid value '{value}' for attribute '{name}'")]
    InvalidAttribute { name: String, value: String },
    #[error("invalid element <{name}>{}: {source}", location_suffix(.line, .column))]
    InvalidElement {
        name: String,
        line: Option<u32>,
        column: Option<u32>,
        #[source]
        source: Box<ParseError>,
    },
    #[error("invalid value: {0}")]
    Invalid(String),
}

impl ParseError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ParseError::Invalid(message.into())
    }

    pub(crate) fn missing(name: &str) -> Self {
        ParseError::MissingAttribute {
            name: name.to_string(),
        }
    }
}

fn element_suffix(element: &Option<String>) -> String {
    match element {
        Some(name) => format!(" in <{name}>"),
        None => String::new(),
    }
}

fn location_suffix(line: &Option<u32>, column: &Option<u32>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(" at {line}:{column}"),
        (Some(line), None) => format!(" at line {line}"),
        _ => String::new(),
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayerTreeError {
    #[error("missing referenced element: {0}")]
    MissingReference(String),
    #[error("cyclic reference: {0}")]
    CyclicReference(String),
    #[error("cannot decode image: {0}")]
    Decode(String),
}

impl LayerTreeError {
    /// The href or reason carried by the error.
    pub fn reference(&self) -> &str {
        match self {
            LayerTreeError::MissingReference(href)
            | LayerTreeError::CyclicReference(href)
            | LayerTreeError::Decode(href) => href,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    LayerTree(#[from] LayerTreeError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_error_names_element_and_position() {
        let err = ParseError::InvalidDocument {
            element: Some("rect".to_string()),
            line: 3,
            column: 7,
            message: "unexpected end of stream".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("<rect>"), "{text}");
        assert!(text.contains("line 3, column 7"), "{text}");
    }

    #[test]
    fn reference_error_names_href() {
        let err = LayerTreeError::MissingReference("#ghost".to_string());
        assert_eq!(err.to_string(), "missing referenced element: #ghost");
        assert_eq!(err.reference(), "#ghost");
    }

    #[test]
    fn element_error_keeps_source() {
        let err = ParseError::InvalidElement {
            name: "circle".to_string(),
            line: Some(2),
            column: Some(4),
            source: Box::new(ParseError::missing("r")),
        };
        assert!(err.to_string().contains("<circle> at 2:4"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
