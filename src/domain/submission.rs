use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::category::FALLBACK_CATEGORY;
use crate::domain::priority::DEFAULT_PRIORITY_LABEL;

pub const PLACEHOLDER_NAME: &str = "Anonymous Requester";
pub const PLACEHOLDER_EMAIL: &str = "no-email@unknown.invalid";
pub const PLACEHOLDER_DESCRIPTION: &str = "No description provided.";

/// A form row as delivered by the spreadsheet trigger.
///
/// Cells may arrive as numbers, booleans or single-value arrays; those are
/// read as text, and any other shape counts as a missing cell.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmission {
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub request_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub category: String,
    pub description: String,
    pub priority: String,
}

impl Submission {
    /// Fills every missing field with its default. Blank cells count as missing.
    pub fn normalize(raw: RawSubmission) -> Self {
        Self {
            first_name: present(raw.first_name).unwrap_or_default(),
            last_name: present(raw.last_name).unwrap_or_default(),
            email: present(raw.email).unwrap_or_else(|| PLACEHOLDER_EMAIL.to_string()),
            category: present(raw.request_type).unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
            description: present(raw.description)
                .unwrap_or_else(|| PLACEHOLDER_DESCRIPTION.to_string()),
            priority: present(raw.priority).unwrap_or_else(|| DEFAULT_PRIORITY_LABEL.to_string()),
        }
    }

    pub fn full_name(&self) -> String {
        let joined = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            PLACEHOLDER_NAME.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(cell_text(Value::deserialize(deserializer)?))
}

fn cell_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(mut items) if items.len() == 1 => items.pop().and_then(cell_text),
        _ => None,
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
