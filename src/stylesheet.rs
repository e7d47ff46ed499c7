use std::collections::HashMap;

use crate::error::ParseError;
use crate::scanner::Scanner;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Element(String),
    Id(String),
    Class(String),
}

/// Raw declarations per selector, in first-appearance order.
pub type StyleEntries = Vec<(Selector, HashMap<String, String>)>;

/// Parses the text of a `<style>` element.
///
/// Only `.class`, `#id` and bare element selectors are understood. A
/// selector that appears twice has its declarations merged, later ones
/// winning.
pub fn parse_style_sheet(text: &str) -> Result<StyleEntries, ParseError> {
    let stripped = remove_comments(text);
    let mut scanner = Scanner::new(&stripped);
    let mut entries: StyleEntries = Vec::new();

    while let Some(selector) = scan_selector(&mut scanner)? {
        let declarations = scan_block(&mut scanner)?;
        match entries.iter_mut().find(|(s, _)| *s == selector) {
            Some((_, existing)) => existing.extend(declarations),
            None => entries.push((selector, declarations)),
        }
    }
    Ok(entries)
}

/// Parses an inline `style="k: v; ..."` attribute.
pub fn parse_style_attribute(text: &str) -> Result<HashMap<String, String>, ParseError> {
    let mut scanner = Scanner::new(text);
    let mut declarations = HashMap::new();
    while !scanner.is_eof() {
        if scanner.scan_string_if_possible(";") {
            continue;
        }
        let (key, value) = scan_declaration(&mut scanner)?;
        declarations.insert(key, value);
    }
    Ok(declarations)
}

fn remove_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn scan_selector(scanner: &mut Scanner<'_>) -> Result<Option<Selector>, ParseError> {
    if scanner.is_eof() {
        return Ok(None);
    }
    let make: fn(String) -> Selector = if scanner.scan_string_if_possible(".") {
        Selector::Class
    } else if scanner.scan_string_if_possible("#") {
        Selector::Id
    } else {
        Selector::Element
    };
    let name = scanner.scan_up_to(b"{")?.trim();
    if name.is_empty() || scanner.peek() != Some(b'{') {
        return Err(ParseError::invalid(format!("malformed selector '{name}'")));
    }
    Ok(Some(make(name.to_string())))
}

fn scan_block(scanner: &mut Scanner<'_>) -> Result<HashMap<String, String>, ParseError> {
    scanner.scan_string("{")?;
    let mut declarations = HashMap::new();
    loop {
        if scanner.scan_string_if_possible("}") {
            return Ok(declarations);
        }
        if scanner.is_eof() {
            return Err(ParseError::invalid("unterminated style block"));
        }
        if scanner.scan_string_if_possible(";") {
            continue;
        }
        let (key, value) = scan_declaration(scanner)?;
        declarations.insert(key, value);
    }
}

fn scan_declaration(scanner: &mut Scanner<'_>) -> Result<(String, String), ParseError> {
    let key = scanner.scan_up_to(b":;}")?.trim().to_string();
    scanner.scan_string(":")?;
    let value = scanner.scan_up_to(b";\n}")?.trim().to_string();
    scanner.scan_string_if_possible(";");
    Ok((key, value))
}
