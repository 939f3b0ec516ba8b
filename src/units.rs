//! Translation units: the bridge between flat bundle maps and XLIFF `trans-unit`s.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::Error,
    flatten::{FlatMap, write_into_skeleton},
    path_codec::{
        PATH_DELIMITER, decode_id, decode_scalar, encode_id, encode_optional_scalar, encode_scalar,
    },
};

/// Key that never becomes a unit, wherever it appears at the top level.
const RESERVED_BUNDLE_KEY: &str = "bundle";
/// Second-level segment reserved for metadata (`<key>/meta/...`).
const META_SEGMENT: &str = "meta";
/// Plural-form suffix consulted when a source has no plain string.
const PLURAL_OTHER: &str = "other";

/// One `trans-unit`: an id plus source and target text, already encoded for XLIFF.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslationUnit {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl TranslationUnit {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        TranslationUnit {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// How bundle keys map onto trans-unit ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitStyle {
    /// Ids are encoded bundle paths; reading back needs a destination skeleton.
    #[default]
    PathIds,
    /// Ids are `1..n`, the top-level key travels in `<source>`.
    Sequential,
}

/// Builds units from flattened translations and sources.
///
/// Keys are taken from `sources` when `use_sources` is set, otherwise from
/// `translations`, in map order. A translation that is missing, `null` or empty
/// falls back to the source value.
pub fn build_units(
    translations: &FlatMap,
    sources: &FlatMap,
    use_sources: bool,
) -> Vec<TranslationUnit> {
    let keys = if use_sources {
        sources.keys()
    } else {
        translations.keys()
    };

    let mut units = Vec::new();
    for key in keys {
        if key == RESERVED_BUNDLE_KEY || is_meta_path(key) {
            continue;
        }
        let source = sources.get(key);
        if source.is_some_and(Value::is_object) {
            continue;
        }

        let translation = translations.get(key);
        let Some(target) = translation
            .filter(|value| !is_untranslated(value))
            .or(source)
            .or(translation)
        else {
            continue;
        };
        if target.is_object() {
            tracing::debug!(key = key.as_str(), "nested object leaf skipped");
            continue;
        }

        let source = source.filter(|value| !value.is_null()).or_else(|| {
            let plural = format!("{key}{PATH_DELIMITER}{PLURAL_OTHER}");
            sources.get(&plural).filter(|value| !value.is_null())
        });
        units.push(TranslationUnit {
            id: encode_id(key),
            source: encode_optional_scalar(source),
            target: encode_scalar(target),
        });
    }
    units
}

/// Builds numbered units from the top-level keys of a bundle.
pub fn build_sequential_units(translations: &Map<String, Value>) -> Vec<TranslationUnit> {
    translations
        .iter()
        .enumerate()
        .map(|(i, (key, value))| {
            TranslationUnit::new((i + 1).to_string(), key, encode_scalar(value))
        })
        .collect()
}

/// Writes unit targets into `skeleton` and returns it.
///
/// Units whose id does not resolve to an existing leaf are dropped. With a
/// `language_header`, the populated bundle is wrapped under that language key.
pub fn rebuild_bundle(
    units: &[TranslationUnit],
    mut skeleton: Value,
    language_header: Option<&str>,
    max_depth: usize,
) -> Result<Value, Error> {
    if !skeleton.is_object() && !skeleton.is_array() {
        return Err(Error::invalid_input(
            "destination bundle must be a JSON object or array",
        ));
    }

    let mut dropped = 0usize;
    for unit in units {
        let segments = decode_id(&unit.id);
        if write_into_skeleton(&mut skeleton, &segments, &unit.target, max_depth)? {
            tracing::trace!(id = unit.id.as_str(), "unit applied");
        } else {
            dropped += 1;
            tracing::debug!(id = unit.id.as_str(), "unknown or stale unit dropped");
        }
    }
    if dropped > 0 {
        tracing::debug!(dropped, total = units.len(), "units without a destination key");
    }

    Ok(wrap_language(skeleton, language_header))
}

/// Rebuilds a flat bundle from numbered units, keyed by each unit's source.
pub fn rebuild_sequential(units: &[TranslationUnit], language_header: Option<&str>) -> Value {
    let bundle = units
        .iter()
        .map(|unit| (unit.source.clone(), decode_scalar(&unit.target)))
        .collect::<Map<String, Value>>();
    wrap_language(Value::Object(bundle), language_header)
}

fn wrap_language(bundle: Value, language_header: Option<&str>) -> Value {
    match language_header {
        Some(language) => {
            let mut wrapped = Map::new();
            wrapped.insert(language.to_string(), bundle);
            Value::Object(wrapped)
        }
        None => bundle,
    }
}

fn is_meta_path(key: &str) -> bool {
    let mut segments = key.split(PATH_DELIMITER);
    segments.next();
    segments.next() == Some(META_SEGMENT)
}

fn is_untranslated(value: &Value) -> bool {
    value.is_null() || value.as_str().is_some_and(str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(pairs: &[(&str, Value)]) -> FlatMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_build_units_basic() {
        let translations = flat(&[("greeting", json!("Bonjour"))]);
        let sources = flat(&[("greeting", json!("Hello"))]);
        let units = build_units(&translations, &sources, false);
        assert_eq!(units, vec![TranslationUnit::new("greeting", "Hello", "Bonjour")]);
    }

    #[test]
    fn test_build_units_encodes_ids_and_scalars() {
        let translations = flat(&[("app/v1.0/count", json!(42))]);
        let sources = flat(&[("app/v1.0/count", json!(1))]);
        let units = build_units(&translations, &sources, false);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id, "app.v1_$DOT$_0.count");
        assert_eq!(units[0].source, "_$number$_1");
        assert_eq!(units[0].target, "_$number$_42");
    }

    #[test]
    fn test_build_units_skips_reserved_keys() {
        let translations = flat(&[
            ("bundle", json!("x")),
            ("widget/meta", json!("m")),
            ("widget/meta/x", json!(1)),
            ("widget/metadata", json!("kept")),
            ("meta", json!("top")),
        ]);
        let units = build_units(&translations, &FlatMap::new(), false);
        let ids: Vec<&str> = units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["widget.metadata", "meta"]);
    }

    #[test]
    fn test_build_units_skips_object_leaves() {
        let translations = flat(&[("empty", json!({})), ("list", json!(["a", "b"]))]);
        let sources = flat(&[("empty", json!({})), ("list", json!(["a", "b"]))]);
        let units = build_units(&translations, &sources, false);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id, "list");
        assert_eq!(units[0].target, r#"_$object$_["a","b"]"#);
    }

    #[test]
    fn test_build_units_use_sources_fills_missing_translations() {
        let translations = flat(&[("a", json!("A-fr"))]);
        let sources = flat(&[("a", json!("A")), ("b", json!("B"))]);

        let units = build_units(&translations, &sources, true);
        assert_eq!(
            units,
            vec![
                TranslationUnit::new("a", "A", "A-fr"),
                TranslationUnit::new("b", "B", "B"),
            ]
        );

        let units = build_units(&translations, &sources, false);
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn test_build_units_empty_translation_falls_back() {
        let translations = flat(&[("a", json!("")), ("b", json!(false)), ("c", json!(""))]);
        let sources = flat(&[("a", json!("A")), ("b", json!(true))]);
        let units = build_units(&translations, &sources, false);
        assert_eq!(units[0].target, "A");
        assert_eq!(units[1].target, "_$boolean$_false");
        assert_eq!(units[2].target, "");
        assert_eq!(units[2].source, "");
    }

    #[test]
    fn test_build_units_plural_other_source() {
        let translations = flat(&[("items", json!("{n} éléments"))]);
        let sources = flat(&[
            ("items/one", json!("{n} item")),
            ("items/other", json!("{n} items")),
        ]);
        let units = build_units(&translations, &sources, false);
        assert_eq!(units[0].source, "{n} items");
    }

    #[test]
    fn test_build_units_null_source_uses_plural_other() {
        let translations = flat(&[("items", json!("{n} éléments")), ("title", json!("Titre"))]);
        let sources = flat(&[
            ("items", json!(null)),
            ("items/other", json!("{n} items")),
            ("title", json!(null)),
        ]);
        let units = build_units(&translations, &sources, false);
        assert_eq!(
            units,
            vec![
                TranslationUnit::new("items", "{n} items", "{n} éléments"),
                TranslationUnit::new("title", "", "Titre"),
            ]
        );
    }

    #[test]
    fn test_build_sequential_units() {
        let bundle = json!({"Hello": "Bonjour", "Count": 3});
        let units = build_sequential_units(bundle.as_object().unwrap());
        assert_eq!(
            units,
            vec![
                TranslationUnit::new("1", "Hello", "Bonjour"),
                TranslationUnit::new("2", "Count", "_$number$_3"),
            ]
        );
    }

    #[test]
    fn test_rebuild_bundle_applies_known_units() {
        let units = vec![
            TranslationUnit::new("menu.open", "Open", "Ouvrir"),
            TranslationUnit::new("menu.size", "", "_$number$_12"),
        ];
        let skeleton = json!({"menu": {"open": "Open", "size": 10}});
        let bundle = rebuild_bundle(&units, skeleton, None, 32).unwrap();
        assert_eq!(bundle, json!({"menu": {"open": "Ouvrir", "size": 12}}));
    }

    #[test]
    fn test_rebuild_bundle_drops_stale_units() {
        let units = vec![
            TranslationUnit::new("a.b.c", "", "stale"),
            TranslationUnit::new("a.x", "", "kept"),
        ];
        let skeleton = json!({"a": {"x": "old"}});
        let bundle = rebuild_bundle(&units, skeleton, None, 32).unwrap();
        assert_eq!(bundle, json!({"a": {"x": "kept"}}));
    }

    #[test]
    fn test_rebuild_bundle_language_header() {
        let units = vec![TranslationUnit::new("greeting", "Hello", "Hallo")];
        let bundle = rebuild_bundle(&units, json!({"greeting": "Hello"}), Some("de"), 32).unwrap();
        assert_eq!(bundle, json!({"de": {"greeting": "Hallo"}}));
    }

    #[test]
    fn test_rebuild_bundle_rejects_scalar_skeleton() {
        let result = rebuild_bundle(&[], json!("nope"), None, 32);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rebuild_sequential() {
        let units = vec![
            TranslationUnit::new("1", "Hello", "Bonjour"),
            TranslationUnit::new("2", "Count", "_$number$_3"),
        ];
        assert_eq!(
            rebuild_sequential(&units, None),
            json!({"Hello": "Bonjour", "Count": 3})
        );
        assert_eq!(
            rebuild_sequential(&units[..1], Some("fr")),
            json!({"fr": {"Hello": "Bonjour"}})
        );
    }
}
