use std::collections::HashMap;

pub const FALLBACK_CATEGORY: &str = "General Inquiry";

const BUILTIN_ROUTES: &[(&str, &str, &str)] = &[
    ("Bug Reports", "🐛", "Bug Reports"),
    ("Feature Requests", "✨", "Feature Requests"),
    ("Technical Support", "🛠️", "Technical Support"),
    ("Account Issues", "👤", "Account Issues"),
    (FALLBACK_CATEGORY, "💬", FALLBACK_CATEGORY),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRoute {
    pub marker: String,
    /// Section id or section name, depending on the configured bucket strategy.
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryLookup<'a> {
    pub marker: &'a str,
    pub bucket: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct CategoryMapping {
    routes: HashMap<String, CategoryRoute>,
}

impl CategoryMapping {
    pub fn builtin() -> Self {
        let routes = BUILTIN_ROUTES
            .iter()
            .map(|(category, marker, bucket)| {
                (
                    category.to_string(),
                    CategoryRoute {
                        marker: marker.to_string(),
                        bucket: Some(bucket.to_string()),
                    },
                )
            })
            .collect();
        Self { routes }
    }

    pub fn with_route(mut self, category: impl Into<String>, route: CategoryRoute) -> Self {
        self.routes.insert(category.into(), route);
        self
    }

    pub fn get(&self, category: &str) -> Option<&CategoryRoute> {
        self.routes.get(category)
    }

    /// Exact match only. Unknown categories borrow the fallback marker and get no bucket.
    pub fn lookup(&self, category: &str) -> CategoryLookup<'_> {
        match self.routes.get(category) {
            Some(route) => CategoryLookup {
                marker: &route.marker,
                bucket: route.bucket.as_deref(),
            },
            None => CategoryLookup {
                marker: self.fallback_marker(),
                bucket: None,
            },
        }
    }

    fn fallback_marker(&self) -> &str {
        self.routes
            .get(FALLBACK_CATEGORY)
            .map(|route| route.marker.as_str())
            .unwrap_or("💬")
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

impl Default for CategoryMapping {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_category() {
        let mapping = CategoryMapping::builtin();
        let lookup = mapping.lookup("Feature Requests");
        assert_eq!(lookup.marker, "✨");
        assert_eq!(lookup.bucket, Some("Feature Requests"));
    }

    #[test]
    fn unknown_category_uses_fallback_marker_without_bucket() {
        let mapping = CategoryMapping::builtin();
        for category in ["Billing", "feature requests", "", "Feature Requests "] {
            let lookup = mapping.lookup(category);
            assert_eq!(lookup.marker, "💬", "category {category:?}");
            assert_eq!(lookup.bucket, None, "category {category:?}");
        }
    }

    #[test]
    fn overridden_fallback_marker_applies_to_unknown_categories() {
        let mapping = CategoryMapping::builtin().with_route(
            FALLBACK_CATEGORY,
            CategoryRoute {
                marker: "📨".to_string(),
                bucket: None,
            },
        );
        assert_eq!(mapping.lookup("Billing").marker, "📨");
        assert_eq!(mapping.lookup(FALLBACK_CATEGORY).bucket, None);
    }
}
