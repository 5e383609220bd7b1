use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

pub const DEFAULT_PRIORITY_LABEL: &str = "Medium";

const KNOWN_LABELS: [&str; 4] = ["Low", "Medium", "High", "Urgent"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PriorityValue(pub String);

impl PriorityValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Maps submitted priority labels onto the tracker's priority values.
///
/// `Urgent` shares the `High` value unless it is configured explicitly.
#[derive(Debug, Clone)]
pub struct PriorityMapping {
    values: HashMap<String, PriorityValue>,
    default: PriorityValue,
}

impl PriorityMapping {
    pub fn builtin() -> Self {
        Self::from_overrides(&BTreeMap::new())
    }

    /// An exactly matching key wins over keys that differ only in case.
    pub fn from_overrides(overrides: &BTreeMap<String, String>) -> Self {
        for label in unknown_labels(overrides) {
            tracing::warn!(label, "ignoring unknown priority label in config");
        }

        let configured = |label: &str, fallback: &str| {
            overrides
                .get(label)
                .or_else(|| {
                    overrides
                        .iter()
                        .find(|(key, _)| key.trim().eq_ignore_ascii_case(label))
                        .map(|(_, value)| value)
                })
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };

        let low = configured("Low", "low");
        let medium = configured("Medium", "medium");
        let high = configured("High", "high");
        let urgent = configured("Urgent", &high);

        let mut values = HashMap::new();
        values.insert("Low".to_string(), PriorityValue(low));
        values.insert("Medium".to_string(), PriorityValue(medium.clone()));
        values.insert("High".to_string(), PriorityValue(high));
        values.insert("Urgent".to_string(), PriorityValue(urgent));

        Self {
            values,
            default: PriorityValue(medium),
        }
    }

    pub fn resolve(&self, label: &str) -> &PriorityValue {
        let label = label.trim();
        self.values
            .get(label)
            .or_else(|| {
                self.values
                    .iter()
                    .find(|(known, _)| known.eq_ignore_ascii_case(label))
                    .map(|(_, value)| value)
            })
            .unwrap_or(&self.default)
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, &PriorityValue)> {
        self.values.iter().map(|(label, value)| (label.as_str(), value))
    }
}

/// Override keys that do not name any known priority label.
pub fn unknown_labels(overrides: &BTreeMap<String, String>) -> Vec<&str> {
    overrides
        .keys()
        .map(String::as_str)
        .filter(|key| {
            !KNOWN_LABELS
                .iter()
                .any(|label| key.trim().eq_ignore_ascii_case(label))
        })
        .collect()
}

impl Default for PriorityMapping {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgent_collapses_onto_high() {
        let mapping = PriorityMapping::builtin();
        assert_eq!(mapping.resolve("Urgent"), mapping.resolve("High"));
    }

    #[test]
    fn unknown_labels_fall_back_to_medium() {
        let mapping = PriorityMapping::builtin();
        assert_eq!(mapping.resolve("Critical"), mapping.resolve("Medium"));
        assert_eq!(mapping.resolve("").as_str(), "medium");
    }

    #[test]
    fn matches_labels_case_insensitively() {
        let mapping = PriorityMapping::builtin();
        assert_eq!(mapping.resolve(" low ").as_str(), "low");
        assert_eq!(mapping.resolve("HIGH").as_str(), "high");
    }

    #[test]
    fn urgent_follows_configured_high_unless_set() {
        let mut overrides = BTreeMap::new();
        overrides.insert("high".to_string(), "1207".to_string());
        let mapping = PriorityMapping::from_overrides(&overrides);
        assert_eq!(mapping.resolve("Urgent").as_str(), "1207");

        overrides.insert("Urgent".to_string(), "1208".to_string());
        let mapping = PriorityMapping::from_overrides(&overrides);
        assert_eq!(mapping.resolve("Urgent").as_str(), "1208");
        assert_eq!(mapping.resolve("High").as_str(), "1207");
    }

    #[test]
    fn exact_key_wins_over_case_variants() {
        let overrides: BTreeMap<String, String> = [
            ("HIGH".to_string(), "1".to_string()),
            ("High".to_string(), "2".to_string()),
            ("high".to_string(), "3".to_string()),
        ]
        .into_iter()
        .collect();
        for _ in 0..8 {
            let mapping = PriorityMapping::from_overrides(&overrides);
            assert_eq!(mapping.resolve("High").as_str(), "2");
        }
    }

    #[test]
    fn reports_unrecognised_override_keys() {
        let overrides: BTreeMap<String, String> = [
            ("Critical".to_string(), "9".to_string()),
            ("urgent".to_string(), "8".to_string()),
            ("P1".to_string(), "7".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(unknown_labels(&overrides), vec!["Critical", "P1"]);

        let mapping = PriorityMapping::from_overrides(&overrides);
        assert_eq!(mapping.resolve("Urgent").as_str(), "8");
        assert_eq!(mapping.resolve("Critical").as_str(), "medium");
    }
}
