//! Configuration for [`crate::Converter`] and its conversion calls.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;
use unic_langid::LanguageIdentifier;

use crate::{error::Error, flatten::DEFAULT_MAX_DEPTH, units::UnitStyle};

pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";
pub const DEFAULT_TARGET_LANGUAGE: &str = "fr";
pub const DEFAULT_DATATYPE: &str = "plaintext";
pub const DEFAULT_ORIGINAL: &str = "messages";
pub const DEFAULT_PRODUCT_NAME: &str = "messages";

/// Settings fixed for the lifetime of a [`crate::Converter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Template text replacing the built-in XLIFF skeleton.
    pub template: Option<String>,
    /// Iterate source keys instead of translation keys when building units.
    pub use_sources: bool,
    /// Timestamp written to the `date` attribute; `None` means "now".
    pub date: Option<DateTime<Utc>>,
    /// Recursion ceiling for flatten and unflatten walks.
    pub max_depth: usize,
    pub unit_style: UnitStyle,
    /// Treat arrays as single leaves instead of indexing into them.
    pub safe_arrays: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            template: None,
            use_sources: false,
            date: None,
            max_depth: DEFAULT_MAX_DEPTH,
            unit_style: UnitStyle::default(),
            safe_arrays: false,
        }
    }
}

impl ConverterConfig {
    /// Creates default converter settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the rendering template.
    pub fn with_template(mut self, template: Option<String>) -> Self {
        self.template = template;
        self
    }

    /// Enables/disables building units from source keys.
    pub fn with_use_sources(mut self, use_sources: bool) -> Self {
        self.use_sources = use_sources;
        self
    }

    /// Pins the rendered timestamp.
    pub fn with_date(mut self, date: Option<DateTime<Utc>>) -> Self {
        self.date = date;
        self
    }

    /// Sets the recursion ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Selects how keys map to unit ids.
    pub fn with_unit_style(mut self, unit_style: UnitStyle) -> Self {
        self.unit_style = unit_style;
        self
    }

    /// Enables/disables treating arrays as leaves.
    pub fn with_safe_arrays(mut self, safe_arrays: bool) -> Self {
        self.safe_arrays = safe_arrays;
        self
    }
}

/// Per-call options. Unset file attributes fall back to the `DEFAULT_*` constants.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConvertOptions {
    /// Wrap the produced bundle under the target language key.
    pub language_header: bool,
    /// Destination skeleton that units are written into.
    pub bundle: Option<Value>,
    pub dest_language: Option<String>,
    pub src_language: Option<String>,
    pub data_type: Option<String>,
    pub original: Option<String>,
    pub product_name: Option<String>,
    /// Source strings; defaults to the bundle's `""` entry.
    pub sources: Option<Value>,
}

impl ConvertOptions {
    /// Creates default per-call options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language_header(mut self, language_header: bool) -> Self {
        self.language_header = language_header;
        self
    }

    /// Sets the destination skeleton.
    pub fn with_bundle(mut self, bundle: Value) -> Self {
        self.bundle = Some(bundle);
        self
    }

    pub fn with_dest_language(mut self, language: impl Into<String>) -> Self {
        self.dest_language = Some(language.into());
        self
    }

    pub fn with_src_language(mut self, language: impl Into<String>) -> Self {
        self.src_language = Some(language.into());
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original = Some(original.into());
        self
    }

    pub fn with_product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = Some(product_name.into());
        self
    }

    /// Sets the source strings tree.
    pub fn with_sources(mut self, sources: Value) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn dest_language(&self) -> &str {
        self.dest_language
            .as_deref()
            .unwrap_or(DEFAULT_TARGET_LANGUAGE)
    }

    pub fn src_language(&self) -> &str {
        self.src_language
            .as_deref()
            .unwrap_or(DEFAULT_SOURCE_LANGUAGE)
    }

    pub fn data_type(&self) -> &str {
        self.data_type.as_deref().unwrap_or(DEFAULT_DATATYPE)
    }

    pub fn original(&self) -> &str {
        self.original.as_deref().unwrap_or(DEFAULT_ORIGINAL)
    }

    pub fn product_name(&self) -> &str {
        self.product_name
            .as_deref()
            .unwrap_or(DEFAULT_PRODUCT_NAME)
    }

    /// Checks that both languages are well-formed language tags.
    pub fn validate_languages(&self) -> Result<(), Error> {
        validate_language(self.src_language())?;
        validate_language(self.dest_language())
    }
}

/// Accepts BCP-47 tags, tolerating `_` as the subtag separator.
pub(crate) fn validate_language(code: &str) -> Result<(), Error> {
    let canonical = code.trim().replace('_', "-");
    if canonical.is_empty() || LanguageIdentifier::from_str(&canonical).is_err() {
        return Err(Error::invalid_input(format!(
            "`{code}` is not a valid language code"
        )));
    }
    Ok(())
}
