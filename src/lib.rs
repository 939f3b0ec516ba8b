#![forbid(unsafe_code)]
//! Convert nested JSON translation bundles to XLIFF 1.0 and back.
//!
//! Bundle keys become dotted `trans-unit` ids (`menu/open` → `menu.open`, with
//! literal dots escaped as `_$DOT$_`), and non-string values travel inline as
//! tagged text such as `_$number$_42`.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use xliff2json::{ConvertOptions, Converter};
//!
//! let converter = Converter::new();
//! let bundle = json!({"fr": {"cart": {"items": 3, "title": "Panier"}}});
//! let options = ConvertOptions::new()
//!     .with_dest_language("fr")
//!     .with_sources(json!({"cart": {"items": 0, "title": "Cart"}}));
//! let xml = converter.bundle_to_xliff(&bundle, &options)?;
//! assert!(xml.contains("<target>_$number$_3</target>"));
//!
//! // Units are written back into a skeleton of known keys.
//! let skeleton = json!({"cart": {"items": 0, "title": "Cart"}});
//! let restored = converter.xliff_to_bundle(&xml, &ConvertOptions::new().with_bundle(skeleton))?;
//! assert_eq!(restored, json!({"cart": {"items": 3, "title": "Panier"}}));
//! # Ok::<(), xliff2json::Error>(())
//! ```

pub mod converter;
pub mod error;
pub mod flatten;
pub mod options;
pub mod path_codec;
pub mod template;
pub mod traits;
pub mod units;
pub mod xliff;

// Re-export most used types for easy consumption
pub use crate::{
    converter::Converter,
    error::Error,
    flatten::{FlatMap, FlattenOptions, flatten, unflatten},
    options::{ConvertOptions, ConverterConfig},
    path_codec::{decode_id, decode_scalar, encode_id, encode_scalar},
    template::Template,
    units::{TranslationUnit, UnitStyle},
    xliff::{XliffDocument, XliffFile},
};
