//! Localized string bundles.
//!
//! Lookups never fail: a missing locale or key returns the raw key and logs a
//! warning, so untranslated UI still renders something recognizable.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::warn;

pub const DEFAULT_LOCALE: &str = "en";

pub type Bundle = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("string bundle for locale {locale} is not a flat object of strings: {source}")]
    Malformed {
        locale: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Registered bundles keyed by locale. Always contains the built-in English
/// bundle.
#[derive(Debug, Clone)]
pub struct StringBundles {
    bundles: BTreeMap<String, Bundle>,
}

impl Default for StringBundles {
    fn default() -> Self {
        let mut bundles = BTreeMap::new();
        bundles.insert(DEFAULT_LOCALE.to_string(), english());
        Self { bundles }
    }
}

impl StringBundles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the bundle for `locale`.
    pub fn register_bundle(&mut self, locale: impl Into<String>, bundle: Bundle) {
        self.bundles.insert(locale.into(), bundle);
    }

    pub fn register_json(
        &mut self,
        locale: &str,
        json: serde_json::Value,
    ) -> Result<(), BundleError> {
        let bundle: Bundle =
            serde_json::from_value(json).map_err(|source| BundleError::Malformed {
                locale: locale.to_string(),
                source,
            })?;
        self.register_bundle(locale, bundle);
        Ok(())
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.bundles.contains_key(locale)
    }

    /// Localized string for `key`, with `{name}` placeholders substituted from
    /// `args`.
    pub fn tr(&self, key: &str, locale: &str, args: &[(&str, &str)]) -> String {
        let Some(bundle) = self.bundles.get(locale) else {
            warn!("no such string bundle for locale: {locale}");
            return key.to_string();
        };
        match bundle.get(key).filter(|s| !s.is_empty()) {
            Some(s) => fmt(s, args),
            None => {
                warn!("string bundle for locale ({locale}) is missing localized string for key: {key}");
                key.to_string()
            }
        }
    }
}

/// Replaces every `{name}` in `format` with its value from `args`.
pub fn fmt(format: &str, args: &[(&str, &str)]) -> String {
    let mut out = format.to_string();
    for (name, value) in args {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

fn english() -> Bundle {
    [
        ("ERROR", "Error"),
        ("UNKNOWN_WIDGET", "This widget ({widget}) is either unknown or unsupported"),
        ("UNKNOWN_COMMAND_REFERENCE", "Unknown command reference: {command}"),
        (
            "INIT_ERROR_MISSING_RESOURCE_PARAM",
            "Missing required 'resource' parameter in the query string",
        ),
        (
            "INIT_ERROR_UNKNOWN_RESOURCE_TYPE",
            "Unsupported resource type for resource: {resourceId}",
        ),
        (
            "INIT_ERROR_UNSUPPORTED_COORD_SYS",
            "The map definition ({mapDefinition}) uses a coordinate system that cannot be converted to a known EPSG code",
        ),
        (
            "INIT_ERROR_UNREGISTERED_EPSG_CODE",
            "The map definition ({mapDefinition}) uses EPSG:{epsg}, which could not be resolved to a projection definition",
        ),
        (
            "INIT_ERROR_NO_MAP_DEFINITION",
            "No Map Definition found in Application Definition",
        ),
        ("MEASUREMENT_START_DRAWING", "Click to start drawing"),
        (
            "MEASUREMENT_CONTINUE_POLYGON",
            "Click to continue drawing the polygon. Double-click to finish.",
        ),
        (
            "MEASUREMENT_CONTINUE_LINE",
            "Click to continue drawing the line. Double-click to finish.",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
