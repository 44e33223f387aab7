//! Wire types for the analysis endpoint.
//!
//! Field names follow the service's JSON. Decoding is lenient wherever the
//! renderer has a sensible default (missing lists, unknown severities) and
//! strict only about the `analysis` object itself.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// SEVERITY
// =============================================================================

/// Three-level scale shared by the overall risk level and each flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    /// Case-insensitive parse. `critical` folds into High, anything else
    /// unrecognised into Medium.
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" | "critical" => Self::High,
            _ => Self::Medium,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Lowercase token used in style classes (`risk-high`, `severity-low`).
    pub fn slug(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::from_label).unwrap_or_default())
    }
}

// =============================================================================
// ANALYSIS PAYLOAD
// =============================================================================

/// One detected anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudFlag {
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub severity: Severity,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub evidence: String,

    /// 0.0 to 1.0
    #[serde(default)]
    pub confidence: f64,

    #[serde(default)]
    pub amount_involved: Option<f64>,
}

/// Outcome of the optional report email.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmailDelivery {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub recipient: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

/// Document-level fraud analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub risk_level: Severity,

    #[serde(default)]
    pub summary: String,

    #[serde(default, rename = "list_of_flags", alias = "flags", deserialize_with = "null_as_default")]
    pub flags: Vec<FraudFlag>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,

    #[serde(default)]
    pub total_flagged_amount: Option<f64>,

    /// Label to image path, in the order the service listed them.
    #[serde(default, deserialize_with = "ordered_string_pairs")]
    pub visualizations: Vec<(String, String)>,

    #[serde(default, rename = "email_sent", alias = "email_delivery")]
    pub email_delivery: Option<EmailDelivery>,

    /// Raw timestamp as sent; the service emits naive UTC.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl AnalysisResult {
    pub fn flagged_amount(&self) -> f64 {
        self.total_flagged_amount.unwrap_or(0.0)
    }
}

/// Full success body of `POST /api/v1/upload/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub filename: Option<String>,

    #[serde(default)]
    pub file_type: Option<String>,

    #[serde(default)]
    pub file_size_bytes: Option<u64>,

    #[serde(default)]
    pub extracted_text_length: Option<u64>,

    pub analysis: AnalysisResult,
}

impl AnalysisResponse {
    /// Wrap a bare analysis with no document metadata.
    pub fn from_analysis(analysis: AnalysisResult) -> Self {
        Self {
            filename: None,
            file_type: None,
            file_size_bytes: None,
            extracted_text_length: None,
            analysis,
        }
    }
}

/// Failure body. `detail` is a string for handled errors and a list of
/// `{loc, msg, type}` objects for request validation failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }
}

// =============================================================================
// SERDE HELPERS
// =============================================================================

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a JSON object of string values into pairs, keeping key order.
/// Non-string values are skipped; `null` yields no pairs.
fn ordered_string_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of labels to image paths")
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_map(self)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((label, value)) = map.next_entry::<String, serde_json::Value>()? {
                if let serde_json::Value::String(path) = value {
                    pairs.push((label, path));
                }
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_option(PairsVisitor)
}
