use crate::error::ParseError;

/// Left-to-right byte scanner shared by the attribute, path, transform and
/// style-sheet parsers. Whitespace is skipped before every token; a failed
/// scan leaves the position unchanged.
pub(crate) struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    i: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            i: 0,
        }
    }

    pub fn skip_ws(&mut self) {
        while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_whitespace() {
            self.i += 1;
        }
    }

    pub fn is_eof(&mut self) -> bool {
        self.skip_ws();
        self.i >= self.bytes.len()
    }

    pub fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes.get(self.i).copied()
    }

    pub fn remainder(&self) -> &'a str {
        &self.text[self.i..]
    }

    pub fn scan_string(&mut self, token: &str) -> Result<(), ParseError> {
        if self.scan_string_if_possible(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{token}'")))
        }
    }

    pub fn scan_string_if_possible(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.text[self.i..].starts_with(token) {
            self.i += token.len();
            true
        } else {
            false
        }
    }

    /// Consumes one byte if it is in `set`.
    pub fn scan_first_of(&mut self, set: &[u8]) -> Option<u8> {
        let b = self.peek()?;
        if set.contains(&b) {
            self.i += 1;
            Some(b)
        } else {
            None
        }
    }

    /// Everything up to (not including) the first byte in `stop`, or to the
    /// end of input. Fails when nothing would be consumed.
    pub fn scan_up_to(&mut self, stop: &[u8]) -> Result<&'a str, ParseError> {
        self.skip_ws();
        let start = self.i;
        let mut end = start;
        while end < self.bytes.len() && !stop.contains(&self.bytes[end]) {
            end += 1;
        }
        if end == start {
            return Err(self.error("expected text"));
        }
        self.i = end;
        Ok(&self.text[start..end])
    }

    pub fn scan_float(&mut self) -> Result<f32, ParseError> {
        self.skip_ws();
        let start = self.i;
        let mut has = false;

        if self.i < self.bytes.len() && matches!(self.bytes[self.i], b'+' | b'-') {
            self.i += 1;
        }
        while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
            self.i += 1;
            has = true;
        }
        if self.i < self.bytes.len() && self.bytes[self.i] == b'.' {
            let dot = self.i;
            self.i += 1;
            let mut fraction = false;
            while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
                self.i += 1;
                fraction = true;
            }
            if !fraction && !has {
                self.i = dot;
            }
            has |= fraction;
        }
        if has && self.i < self.bytes.len() && matches!(self.bytes[self.i], b'e' | b'E') {
            // Only an exponent when digits follow; "1em" stays 1 + "em".
            let mut j = self.i + 1;
            if j < self.bytes.len() && matches!(self.bytes[j], b'+' | b'-') {
                j += 1;
            }
            if j < self.bytes.len() && self.bytes[j].is_ascii_digit() {
                while j < self.bytes.len() && self.bytes[j].is_ascii_digit() {
                    j += 1;
                }
                self.i = j;
            }
        }

        if !has {
            self.i = start;
            return Err(self.error("expected number"));
        }

        match self.text[start..self.i].parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => {
                self.i = start;
                Err(self.error("expected number"))
            }
        }
    }

    /// `NN%` as a fraction.
    pub fn scan_percentage(&mut self) -> Result<f32, ParseError> {
        let start = self.i;
        let value = self.scan_float()?;
        if self.bytes.get(self.i) == Some(&b'%') {
            self.i += 1;
            Ok(value / 100.0)
        } else {
            self.i = start;
            Err(self.error("expected percentage"))
        }
    }

    /// A bare float restricted to 0..=1.
    pub fn scan_percentage_float(&mut self) -> Result<f32, ParseError> {
        let start = self.i;
        let value = self.scan_float()?;
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            self.i = start;
            Err(self.error("expected value between 0 and 1"))
        }
    }

    pub fn scan_u8(&mut self) -> Result<u8, ParseError> {
        self.skip_ws();
        let start = self.i;
        while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
            self.i += 1;
        }
        match self.text[start..self.i].parse::<u8>() {
            Ok(value) => Ok(value),
            Err(_) => {
                self.i = start;
                Err(self.error("expected integer 0-255"))
            }
        }
    }

    /// Single-character `0`/`1` flags (path arcs allow them unseparated),
    /// or the words `true`/`false`.
    pub fn scan_bool(&mut self) -> Result<bool, ParseError> {
        match self.peek() {
            Some(b'0') => {
                self.i += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.i += 1;
                Ok(true)
            }
            _ if self.scan_string_if_possible("true") => Ok(true),
            _ if self.scan_string_if_possible("false") => Ok(false),
            _ => Err(self.error("expected flag")),
        }
    }

    fn error(&self, expected: &str) -> ParseError {
        ParseError::invalid(format!("{expected} at offset {} in '{}'", self.i, self.text))
    }
}
