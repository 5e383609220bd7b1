use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::category::{CategoryMapping, CategoryRoute, FALLBACK_CATEGORY};
use crate::domain::priority::PriorityMapping;
use crate::error::{AppError, AppResult};

const CONFIG_DIR_NAME: &str = "intake";
const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_TRACKER_BASE_URL: &str = "https://app.asana.com/api/1.0";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tracker_base_url: String,
    pub tracker_token: Option<String>,
    pub project_id: Option<String>,
    pub bucket_strategy: BucketStrategy,
    pub priority_field_id: Option<String>,
    pub bind_addr: String,
    pub categories: CategoryMapping,
    pub priorities: PriorityMapping,
}

/// How the bucket refs in the category table are turned into section ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketStrategy {
    /// Refs are section ids already.
    Static,
    /// Refs are section names, resolved against the project's section list.
    Lookup,
}

impl BucketStrategy {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "static" => Ok(BucketStrategy::Static),
            "lookup" => Ok(BucketStrategy::Lookup),
            other => Err(AppError::Configuration(format!(
                "unknown bucket strategy '{other}' (expected 'static' or 'lookup')"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketStrategy::Static => "static",
            BucketStrategy::Lookup => "lookup",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub marker: Option<String>,
    /// An empty string removes the bucket for this category.
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    pub tracker_base_url: Option<String>,
    pub tracker_token: Option<String>,
    pub project_id: Option<String>,
    pub bucket_strategy: Option<String>,
    pub priority_field_id: Option<String>,
    pub bind_addr: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub priorities: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, CategoryEntry>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn parse(contents: &str) -> AppResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = toml::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(&path, data)?;
        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::resolve(stored, |key| env::var(key).ok())
    }

    /// Layers `INTAKE_*` variables from `lookup_env` over the stored file.
    pub fn resolve(
        stored: StoredConfig,
        lookup_env: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let pick = |key: &str, file_value: Option<String>| {
            lookup_env(key)
                .or(file_value)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bucket_strategy = match pick("INTAKE_BUCKET_STRATEGY", stored.bucket_strategy) {
            Some(value) => BucketStrategy::parse(&value)?,
            None => BucketStrategy::Lookup,
        };

        Ok(Self {
            tracker_base_url: pick("INTAKE_TRACKER_BASE_URL", stored.tracker_base_url)
                .unwrap_or_else(|| DEFAULT_TRACKER_BASE_URL.to_string()),
            tracker_token: pick("INTAKE_TRACKER_TOKEN", stored.tracker_token),
            project_id: pick("INTAKE_PROJECT_ID", stored.project_id),
            bucket_strategy,
            priority_field_id: pick("INTAKE_PRIORITY_FIELD_ID", stored.priority_field_id),
            bind_addr: pick("INTAKE_BIND_ADDR", stored.bind_addr)
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            categories: category_mapping(&stored.categories),
            priorities: PriorityMapping::from_overrides(&stored.priorities),
        })
    }

    /// Static-strategy bucket refs that do not look like tracker ids, such as
    /// the section names of the built-in table.
    pub fn non_id_static_buckets(&self) -> Vec<(&str, &str)> {
        if self.bucket_strategy != BucketStrategy::Static {
            return Vec::new();
        }
        let mut suspicious = self
            .categories
            .categories()
            .filter_map(|category| {
                let bucket = self.categories.lookup(category).bucket?;
                (!bucket.chars().all(|c| c.is_ascii_digit())).then_some((category, bucket))
            })
            .collect::<Vec<_>>();
        suspicious.sort_unstable();
        suspicious
    }
}

fn category_mapping(entries: &BTreeMap<String, CategoryEntry>) -> CategoryMapping {
    let builtin = CategoryMapping::builtin();
    let fallback_marker = entries
        .get(FALLBACK_CATEGORY)
        .and_then(|entry| entry.marker.clone())
        .unwrap_or_else(|| builtin.lookup(FALLBACK_CATEGORY).marker.to_string());

    let mut mapping = builtin.clone();
    for (category, entry) in entries {
        let existing = builtin.get(category);
        let marker = entry
            .marker
            .clone()
            .or_else(|| existing.map(|route| route.marker.clone()))
            .unwrap_or_else(|| fallback_marker.clone());
        let bucket = match &entry.bucket {
            Some(bucket) if bucket.trim().is_empty() => None,
            Some(bucket) => Some(bucket.trim().to_string()),
            None => existing.and_then(|route| route.bucket.clone()),
        };
        mapping = mapping.with_route(category.clone(), CategoryRoute { marker, bucket });
    }
    mapping
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| AppError::Configuration("unable to locate a config directory".to_string()))
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
