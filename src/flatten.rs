//! Conversion between nested bundles and flat path-keyed maps.
//!
//! [`flatten`] walks a bundle depth-first and records every leaf under its
//! delimiter-joined path. [`unflatten`] rebuilds a fresh tree from such a map,
//! while [`write_into_skeleton`] only overwrites leaves that already exist in a
//! destination bundle, so units for unknown keys fall away silently.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{error::Error, path_codec::decode_scalar};

/// Default ceiling for how deep a walk may go before failing.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Flat representation of a bundle: joined path → leaf value, in walk order.
pub type FlatMap = IndexMap<String, Value>;

/// Policy for a flatten/unflatten walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Joins path segments. Keys containing it cannot round-trip.
    pub delimiter: String,
    /// Treat arrays as opaque leaves instead of recursing into their items.
    pub safe_arrays: bool,
    /// Maximum nesting depth; deeper input fails with [`Error::MaxDepthExceeded`].
    pub max_depth: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            delimiter: "/".to_string(),
            safe_arrays: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FlattenOptions {
    /// Creates default flatten options (`/` delimiter, arrays recursed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the segment delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Enables/disables treating arrays as leaves.
    pub fn with_safe_arrays(mut self, safe_arrays: bool) -> Self {
        self.safe_arrays = safe_arrays;
        self
    }

    /// Sets the recursion ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn recurses_into(&self, value: &Value) -> bool {
        match value {
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty() && !self.safe_arrays,
            _ => false,
        }
    }
}

/// Flattens a nested bundle into a [`FlatMap`].
///
/// Empty objects and arrays are kept as leaves holding the empty container.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use xliff2json::flatten::{FlattenOptions, flatten};
///
/// let flat = flatten(&json!({"menu": {"open": "Open"}}), &FlattenOptions::new())?;
/// assert_eq!(flat["menu/open"], json!("Open"));
/// # Ok::<(), xliff2json::Error>(())
/// ```
pub fn flatten(tree: &Value, options: &FlattenOptions) -> Result<FlatMap, Error> {
    if !tree.is_object() && !tree.is_array() {
        return Err(Error::invalid_input(
            "only objects and arrays can be flattened",
        ));
    }
    let mut out = FlatMap::new();
    flatten_value(tree, None, 0, options, &mut out)?;
    Ok(out)
}

fn flatten_value(
    value: &Value,
    prefix: Option<&str>,
    depth: usize,
    options: &FlattenOptions,
    out: &mut FlatMap,
) -> Result<(), Error> {
    if depth > options.max_depth {
        return Err(Error::MaxDepthExceeded(options.max_depth));
    }
    let join = |key: &str| match prefix {
        Some(p) => format!("{p}{}{key}", options.delimiter),
        None => key.to_string(),
    };

    match value {
        Value::Object(map) if options.recurses_into(value) => {
            for (key, child) in map {
                flatten_value(child, Some(&join(key)), depth + 1, options, out)?;
            }
        }
        Value::Array(items) if options.recurses_into(value) => {
            for (index, child) in items.iter().enumerate() {
                let key = join(&index.to_string());
                flatten_value(child, Some(&key), depth + 1, options, out)?;
            }
        }
        leaf => {
            if let Some(key) = prefix {
                out.insert(key.to_string(), leaf.clone());
            }
        }
    }
    Ok(())
}

/// Rebuilds a nested bundle from a [`FlatMap`].
///
/// When arrays were recursed (`safe_arrays == false`), a numeric segment under a
/// path that does not exist yet creates an array rather than an object.
pub fn unflatten(flat: &FlatMap, options: &FlattenOptions) -> Result<Value, Error> {
    let mut root = Value::Object(Map::new());
    for (path, value) in flat {
        let segments: Vec<&str> = path.split(options.delimiter.as_str()).collect();
        if segments.len() > options.max_depth {
            return Err(Error::MaxDepthExceeded(options.max_depth));
        }
        if !insert_path(&mut root, &segments, value.clone(), options.safe_arrays) {
            tracing::debug!(path = path.as_str(), "conflicting flat key skipped");
        }
    }
    Ok(root)
}

fn insert_path(root: &mut Value, segments: &[&str], value: Value, safe_arrays: bool) -> bool {
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };

    let mut cursor = root;
    for (i, segment) in parents.iter().enumerate() {
        let next_is_index = !safe_arrays && segments[i + 1].parse::<usize>().is_ok();
        let make = || {
            if next_is_index {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            }
        };
        let Some(next) = child_or_insert(cursor, segment, make) else {
            return false;
        };
        if !next.is_object() && !next.is_array() {
            return false;
        }
        cursor = next;
    }

    match child_or_insert(cursor, last, || Value::Null) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

fn child_or_insert<'a>(
    cursor: &'a mut Value,
    segment: &str,
    make: impl FnOnce() -> Value,
) -> Option<&'a mut Value> {
    match cursor {
        Value::Object(map) => Some(map.entry(segment).or_insert_with(make)),
        Value::Array(items) => {
            let index = segment.parse::<usize>().ok()?;
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            let slot = &mut items[index];
            if slot.is_null() {
                *slot = make();
            }
            Some(slot)
        }
        _ => None,
    }
}

/// Writes a translated text into the existing leaf addressed by `segments`.
///
/// Every segment must already exist in `skeleton`; the leaf is matched by key
/// presence, so seeded `false`, `0` or `""` values are still overwritten. The
/// text is decoded with [`decode_scalar`] only once the leaf is found. Returns
/// `Ok(false)` when the path does not resolve.
pub fn write_into_skeleton(
    skeleton: &mut Value,
    segments: &[String],
    text: &str,
    max_depth: usize,
) -> Result<bool, Error> {
    if segments.len() > max_depth {
        return Err(Error::MaxDepthExceeded(max_depth));
    }
    let Some((last, parents)) = segments.split_last() else {
        return Ok(false);
    };

    let mut cursor = skeleton;
    for segment in parents {
        match existing_child(cursor, segment) {
            Some(next) => cursor = next,
            None => return Ok(false),
        }
    }

    match existing_child(cursor, last) {
        Some(slot) => {
            *slot = decode_scalar(text);
            Ok(true)
        }
        None => Ok(false),
    }
}

fn existing_child<'a>(cursor: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match cursor {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get_mut(index)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segments(path: &str) -> Vec<String> {
        path.split('/').map(String::from).collect()
    }

    #[test]
    fn test_flatten_nested() {
        let tree = json!({"a": {"b": "x", "c": {"d": 1}}, "e": true});
        let flat = flatten(&tree, &FlattenOptions::new()).unwrap();
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a/b", "a/c/d", "e"]);
        assert_eq!(flat["a/c/d"], json!(1));
    }

    #[test]
    fn test_flatten_custom_delimiter() {
        let tree = json!({"a": {"b": "x"}});
        let options = FlattenOptions::new().with_delimiter(".");
        let flat = flatten(&tree, &options).unwrap();
        assert_eq!(flat["a.b"], json!("x"));
    }

    #[test]
    fn test_flatten_empty_containers_are_leaves() {
        let tree = json!({"a": {}, "b": []});
        let flat = flatten(&tree, &FlattenOptions::new()).unwrap();
        assert_eq!(flat["a"], json!({}));
        assert_eq!(flat["b"], json!([]));
    }

    #[test]
    fn test_flatten_recurses_arrays_by_default() {
        let tree = json!({"days": ["Mon", "Tue"]});
        let flat = flatten(&tree, &FlattenOptions::new()).unwrap();
        assert_eq!(flat["days/0"], json!("Mon"));
        assert_eq!(flat["days/1"], json!("Tue"));
    }

    #[test]
    fn test_flatten_safe_arrays_are_leaves() {
        let tree = json!({"days": ["Mon", "Tue"]});
        let options = FlattenOptions::new().with_safe_arrays(true);
        let flat = flatten(&tree, &options).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["days"], json!(["Mon", "Tue"]));
    }

    #[test]
    fn test_flatten_rejects_scalar_root() {
        let result = flatten(&json!("text"), &FlattenOptions::new());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_flatten_max_depth_exceeded() {
        let tree = json!({"a": {"b": {"c": "deep"}}});
        let options = FlattenOptions::new().with_max_depth(2);
        let result = flatten(&tree, &options);
        assert!(matches!(result, Err(Error::MaxDepthExceeded(2))));

        let options = FlattenOptions::new().with_max_depth(3);
        assert!(flatten(&tree, &options).is_ok());
    }

    #[test]
    fn test_unflatten_rebuilds_tree() {
        let tree = json!({"a": {"b": "x", "c": {"d": 1}}, "list": ["p", {"q": false}]});
        let options = FlattenOptions::new();
        let flat = flatten(&tree, &options).unwrap();
        assert_eq!(unflatten(&flat, &options).unwrap(), tree);
    }

    #[test]
    fn test_unflatten_safe_arrays_keeps_numeric_keys() {
        let mut flat = FlatMap::new();
        flat.insert("codes/404".to_string(), json!("Not found"));
        let options = FlattenOptions::new().with_safe_arrays(true);
        assert_eq!(
            unflatten(&flat, &options).unwrap(),
            json!({"codes": {"404": "Not found"}})
        );
    }

    #[test]
    fn test_write_into_skeleton_existing_leaf() {
        let mut skeleton = json!({"a": {"b": "source"}});
        let written = write_into_skeleton(&mut skeleton, &segments("a/b"), "cible", 32).unwrap();
        assert!(written);
        assert_eq!(skeleton, json!({"a": {"b": "cible"}}));
    }

    #[test]
    fn test_write_into_skeleton_decodes_scalar() {
        let mut skeleton = json!({"count": 0});
        write_into_skeleton(&mut skeleton, &segments("count"), "_$number$_7", 32).unwrap();
        assert_eq!(skeleton, json!({"count": 7}));
    }

    #[test]
    fn test_write_into_skeleton_falsy_leaf_is_present() {
        let mut skeleton = json!({"enabled": false, "label": ""});
        let enabled = segments("enabled");
        assert!(write_into_skeleton(&mut skeleton, &enabled, "_$boolean$_true", 32).unwrap());
        let label = segments("label");
        assert!(write_into_skeleton(&mut skeleton, &label, "Nom", 32).unwrap());
        assert_eq!(skeleton, json!({"enabled": true, "label": "Nom"}));
    }

    #[test]
    fn test_write_into_skeleton_missing_paths_dropped() {
        let mut skeleton = json!({"a": {"b": "x"}, "s": "scalar"});
        let before = skeleton.clone();
        assert!(!write_into_skeleton(&mut skeleton, &segments("a/c"), "y", 32).unwrap());
        assert!(!write_into_skeleton(&mut skeleton, &segments("z/b"), "y", 32).unwrap());
        assert!(!write_into_skeleton(&mut skeleton, &segments("s/inner"), "y", 32).unwrap());
        assert_eq!(skeleton, before);
    }

    #[test]
    fn test_write_into_skeleton_array_index() {
        let mut skeleton = json!({"days": ["Mon", "Tue"]});
        assert!(write_into_skeleton(&mut skeleton, &segments("days/1"), "Mardi", 32).unwrap());
        assert!(!write_into_skeleton(&mut skeleton, &segments("days/5"), "x", 32).unwrap());
        assert_eq!(skeleton, json!({"days": ["Mon", "Mardi"]}));
    }

    #[test]
    fn test_write_into_skeleton_max_depth() {
        let mut skeleton = json!({});
        let result = write_into_skeleton(&mut skeleton, &segments("a/b/c"), "x", 2);
        assert!(matches!(result, Err(Error::MaxDepthExceeded(2))));
    }
}
