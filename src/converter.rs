//! Conversion between JSON bundles and XLIFF text.
//!
//! A [`Converter`] holds the immutable settings of a conversion job (template,
//! timestamp, unit style). Each call builds fresh output and never mutates the
//! bundles passed in.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::{
    error::Error,
    flatten::{FlattenOptions, flatten},
    options::{ConvertOptions, ConverterConfig},
    template::Template,
    traits::Parser,
    units::{UnitStyle, build_sequential_units, build_units, rebuild_bundle, rebuild_sequential},
    xliff::{XLIFF_VERSION, XliffDocument, XliffFile},
};

/// Key of the source-language strings inside a multi-language bundle.
const SOURCE_BUNDLE_KEY: &str = "";
/// Top-level sources key excluded from unit generation.
const META_KEY: &str = "meta";

/// Converts bundles to XLIFF and back with a fixed configuration.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use xliff2json::{ConvertOptions, Converter};
///
/// let converter = Converter::new();
/// let bundle = json!({"": {"greeting": "Hello"}, "fr": {"greeting": "Bonjour"}});
/// let xml = converter.bundle_to_xliff(&bundle, &ConvertOptions::new().with_dest_language("fr"))?;
///
/// let options = ConvertOptions::new().with_bundle(json!({"greeting": "Hello"}));
/// assert_eq!(converter.xliff_to_bundle(&xml, &options)?, json!({"greeting": "Bonjour"}));
/// # Ok::<(), xliff2json::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConverterConfig,
    template: Template,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// Creates a converter with default settings and the built-in template.
    pub fn new() -> Self {
        Converter {
            config: ConverterConfig::default(),
            template: Template::builtin().clone(),
        }
    }

    /// Creates a converter, parsing the template override if one is configured.
    pub fn with_config(config: ConverterConfig) -> Result<Self, Error> {
        let template = match &config.template {
            Some(text) => Template::parse(text)?,
            None => Template::builtin().clone(),
        };
        Ok(Converter { config, template })
    }

    /// Creates a converter whose template is read from `path`.
    pub fn with_template_file<P: AsRef<Path>>(
        path: P,
        config: ConverterConfig,
    ) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::with_config(config.with_template(Some(text)))
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Parses XLIFF text and writes its units into a bundle.
    ///
    /// With [`UnitStyle::PathIds`], `options.bundle` is the destination
    /// skeleton: units whose id does not address one of its leaves are dropped.
    pub fn xliff_to_bundle(&self, xml: &str, options: &ConvertOptions) -> Result<Value, Error> {
        let document = XliffDocument::from_str(xml)?;
        self.document_to_bundle(&document, options)
    }

    /// Writes the units of an already parsed document into a bundle.
    pub fn document_to_bundle(
        &self,
        document: &XliffDocument,
        options: &ConvertOptions,
    ) -> Result<Value, Error> {
        let file = document.first_file()?;
        let language = if file.target_language.is_empty() {
            options.dest_language()
        } else {
            file.target_language.as_str()
        };
        let header = options.language_header.then_some(language);

        match self.config.unit_style {
            UnitStyle::PathIds => {
                let skeleton = options.bundle.clone().ok_or_else(|| {
                    Error::invalid_input("a destination bundle is required to place path-id units")
                })?;
                rebuild_bundle(&file.units, skeleton, header, self.config.max_depth)
            }
            UnitStyle::Sequential => Ok(rebuild_sequential(&file.units, header)),
        }
    }

    /// Builds the intermediate XLIFF document for `bundle`.
    ///
    /// Translations are read from `bundle[dest_language]` when present, otherwise
    /// from the bundle itself.
    pub fn bundle_to_document(
        &self,
        bundle: &Value,
        options: &ConvertOptions,
    ) -> Result<XliffDocument, Error> {
        let bundle = bundle
            .as_object()
            .ok_or_else(|| Error::invalid_input("bundle must be a JSON object"))?;
        options.validate_languages()?;

        let translations = match bundle.get(options.dest_language()) {
            Some(Value::Object(translations)) => translations.clone(),
            _ => {
                let mut translations = bundle.clone();
                translations.remove(SOURCE_BUNDLE_KEY);
                translations
            }
        };

        let units = match self.config.unit_style {
            UnitStyle::PathIds => {
                let mut sources = self.sources(bundle, options)?;
                sources.remove(META_KEY);

                let flatten_options = FlattenOptions::new()
                    .with_safe_arrays(self.config.safe_arrays)
                    .with_max_depth(self.config.max_depth);
                let translations = flatten(&Value::Object(translations), &flatten_options)?;
                let sources = flatten(&Value::Object(sources), &flatten_options)?;
                build_units(&translations, &sources, self.config.use_sources)
            }
            UnitStyle::Sequential => build_sequential_units(&translations),
        };
        tracing::debug!(units = units.len(), language = options.dest_language(), "built units");

        let date = self
            .config
            .date
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        Ok(XliffDocument {
            version: XLIFF_VERSION.to_string(),
            files: vec![XliffFile {
                source_language: options.src_language().to_string(),
                target_language: options.dest_language().to_string(),
                datatype: options.data_type().to_string(),
                original: options.original().to_string(),
                product_name: options.product_name().to_string(),
                date: Some(date),
                units,
            }],
        })
    }

    /// Converts `bundle` to XLIFF text using the configured template.
    pub fn bundle_to_xliff(
        &self,
        bundle: &Value,
        options: &ConvertOptions,
    ) -> Result<String, Error> {
        let document = self.bundle_to_document(bundle, options)?;
        self.template.render(&document)
    }

    fn sources(
        &self,
        bundle: &Map<String, Value>,
        options: &ConvertOptions,
    ) -> Result<Map<String, Value>, Error> {
        let sources = options
            .sources
            .as_ref()
            .or_else(|| bundle.get(SOURCE_BUNDLE_KEY))
            .ok_or_else(|| {
                Error::invalid_input(
                    "source strings are required (options.sources or bundle[\"\"])",
                )
            })?;
        sources
            .as_object()
            .cloned()
            .ok_or_else(|| Error::invalid_input("source strings must be a JSON object"))
    }
}
