//! Presentation model for a successful analysis.

use emolens_models::{AnalysisResponse, CostEstimate};
use serde_json::Value;

/// Shown wherever a value is missing.
pub const PLACEHOLDER: &str = "Not available";

/// One displayable value: a link when it looks like a URL, text otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayValue {
    pub text: String,
    pub href: Option<String>,
}

impl DisplayValue {
    fn placeholder() -> Self {
        Self {
            text: PLACEHOLDER.to_string(),
            href: None,
        }
    }

    fn from_optional_link(value: Option<&str>) -> Self {
        match value {
            Some(url) => Self::from_text(url),
            None => Self::placeholder(),
        }
    }

    fn from_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            href: looks_like_url(text).then(|| text.to_string()),
        }
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::placeholder(),
            Value::String(s) if s.trim().is_empty() => Self::placeholder(),
            Value::String(s) => Self::from_text(s),
            other => Self {
                text: other.to_string(),
                href: None,
            },
        }
    }

    pub fn is_link(&self) -> bool {
        self.href.is_some()
    }
}

/// A labeled entry for one of the remaining result keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultField {
    pub key: String,
    pub label: String,
    pub value: DisplayValue,
}

/// State of the embedded combined visualization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// No `combined_html_path` in the result; nothing was fetched
    Absent,
    /// Fetched document, embedded through `srcdoc`
    Embedded(String),
    /// The fetch failed; a warning notice carries the reason
    Unavailable,
}

impl Preview {
    /// Document to embed, if one was fetched.
    pub fn html(&self) -> Option<&str> {
        match self {
            Preview::Embedded(html) => Some(html),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub result_video: DisplayValue,
    pub combined_html: DisplayValue,
    pub cost: CostEstimate,
    pub elapsed_display: String,
    pub cost_display: String,
    /// Remaining keys in key order
    pub fields: Vec<ResultField>,
    pub preview: Preview,
}

impl ResultView {
    pub fn new(response: &AnalysisResponse, preview: Preview) -> Self {
        let result = &response.result;
        let cost = CostEstimate::from_run_time_ms(response.run_time_ms);

        let fields = result
            .extra
            .iter()
            .map(|(key, value)| ResultField {
                key: key.clone(),
                label: field_label(key),
                value: DisplayValue::from_json(value),
            })
            .collect();

        Self {
            result_video: DisplayValue::from_optional_link(result.result_video_path.as_deref()),
            combined_html: DisplayValue::from_optional_link(result.combined_html_path.as_deref()),
            elapsed_display: cost.elapsed_display(),
            cost_display: cost.cost_display(),
            cost,
            fields,
            preview,
        }
    }
}

/// `emotion_csv_path` -> `Emotion Csv Path`.
pub fn field_label(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn looks_like_url(s: &str) -> bool {
    let s = s.trim();
    (s.starts_with("https://") || s.starts_with("http://")) && !s.contains(char::is_whitespace)
}
