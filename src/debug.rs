use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticKind {
    UnsupportedFilter,
    UnsupportedGradient,
    UnsupportedMask,
    DroppedElement,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnsupportedFilter => "unsupported_filter",
            DiagnosticKind::UnsupportedGradient => "unsupported_gradient",
            DiagnosticKind::UnsupportedMask => "unsupported_mask",
            DiagnosticKind::DroppedElement => "dropped_element",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Warnings collected during one run of the pipeline.
///
/// Owned by a single generator or builder; never shared between runs, so
/// the "logged once" state of one render cannot silence another.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
    counters: HashMap<DiagnosticKind, u64>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the condition and records/logs it the first time it is seen.
    /// Returns true when this call produced the record.
    pub fn warn_once(&mut self, kind: DiagnosticKind, message: impl FnOnce() -> String) -> bool {
        let entry = self.counters.entry(kind).or_insert(0);
        *entry = entry.saturating_add(1);
        if *entry > 1 {
            return false;
        }
        let message = message();
        tracing::warn!(kind = kind.as_str(), "Warning: {message}");
        self.records.push(Diagnostic { kind, message });
        true
    }

    /// Records every occurrence.
    pub fn record(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        let entry = self.counters.entry(kind).or_insert(0);
        *entry = entry.saturating_add(1);
        tracing::warn!(kind = kind.as_str(), "{message}");
        self.records.push(Diagnostic { kind, message });
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// How many times the condition was hit, including suppressed repeats.
    pub fn count(&self, kind: DiagnosticKind) -> u64 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    pub fn merge(&mut self, other: Diagnostics) {
        for (kind, count) in other.counters {
            let entry = self.counters.entry(kind).or_insert(0);
            *entry = entry.saturating_add(count);
        }
        self.records.extend(other.records);
    }

    /// One JSON object per record followed by a summary line.
    pub fn to_json_lines(&self, context: &str) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&format!(
                "{{\"type\":\"diagnostic\",\"kind\":\"{}\",\"message\":\"{}\"}}\n",
                record.kind.as_str(),
                json_escape(&record.message)
            ));
        }
        let mut counters: Vec<(DiagnosticKind, u64)> =
            self.counters.iter().map(|(k, v)| (*k, *v)).collect();
        counters.sort_by(|a, b| a.0.cmp(&b.0));
        let mut counts_json = String::from("{");
        for (idx, (kind, value)) in counters.iter().enumerate() {
            if idx > 0 {
                counts_json.push(',');
            }
            counts_json.push_str(&format!("\"{}\":{}", kind.as_str(), value));
        }
        counts_json.push('}');
        out.push_str(&format!(
            "{{\"type\":\"diagnostic.summary\",\"context\":\"{}\",\"counts\":{}}}\n",
            json_escape(context),
            counts_json
        ));
        out
    }
}

pub(crate) fn json_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
