//! XLIFF 1.0 document model and reader.
//!
//! Only the parts of XLIFF this crate exchanges are modelled: the `<file>`
//! attributes and the `id`/`<source>`/`<target>` of each `trans-unit`. Inline
//! markup inside `<source>`/`<target>` is dropped and its text kept.

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, Read, Write},
    path::Path,
};

use crate::{error::Error, template::Template, traits::Parser, units::TranslationUnit};

/// XLIFF version written by this crate.
pub const XLIFF_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XliffDocument {
    pub version: String,
    pub files: Vec<XliffFile>,
}

/// One `<file>` element with its attributes and translation units.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XliffFile {
    pub source_language: String,
    pub target_language: String,
    pub datatype: String,
    pub original: String,
    pub product_name: String,
    /// ISO-8601 timestamp, without sub-second digits.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub units: Vec<TranslationUnit>,
}

impl XliffDocument {
    /// Returns the first `<file>`, the only one conversions look at.
    pub fn first_file(&self) -> Result<&XliffFile, Error> {
        self.files
            .first()
            .ok_or_else(|| Error::malformed("xliff document has no <file> element"))
    }
}

impl Parser for XliffDocument {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = Reader::from_reader(reader);
        let mut buf = Vec::new();
        let mut builder = DocumentBuilder::default();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => builder.start(&e, false)?,
                Event::Empty(e) => builder.start(&e, true)?,
                Event::End(e) => builder.end(e.local_name().as_ref())?,
                Event::Text(e) => {
                    if builder.capturing() {
                        builder.push_text(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if builder.capturing() {
                        builder.push_text(&String::from_utf8_lossy(&e));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        builder.finish()
    }

    /// Renders with the built-in template.
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let rendered = Template::builtin().render(self)?;
        writer.write_all(rendered.as_bytes()).map_err(Error::Io)
    }

    /// Decodes UTF-16 and other BOM-marked exports before parsing.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path).map_err(Error::Io)?;
        // Auto-detect BOM, decode to UTF-8; passthrough UTF-8
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(file);

        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).map_err(Error::Io)?;

        Self::from_str(&decoded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Source,
    Target,
}

#[derive(Debug, Default)]
struct PendingUnit {
    id: String,
    source: Option<String>,
    target: Option<String>,
}

/// Event-driven accumulator for [`XliffDocument::from_reader`].
#[derive(Debug, Default)]
struct DocumentBuilder {
    version: Option<String>,
    files: Vec<XliffFile>,
    unit: Option<PendingUnit>,
    /// Open elements below the current `trans-unit`.
    depth: usize,
    field: Option<Field>,
    text: String,
}

impl DocumentBuilder {
    fn capturing(&self) -> bool {
        self.field.is_some()
    }

    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn start(&mut self, e: &BytesStart, empty: bool) -> Result<(), Error> {
        let in_unit = self.unit.is_some();
        match e.local_name().as_ref() {
            b"xliff" => {
                self.version = Some(attribute(e, b"version")?.unwrap_or_default());
            }
            b"file" => {
                self.files.push(XliffFile {
                    source_language: attribute(e, b"source-language")?.unwrap_or_default(),
                    target_language: attribute(e, b"target-language")?.unwrap_or_default(),
                    datatype: attribute(e, b"datatype")?.unwrap_or_default(),
                    original: attribute(e, b"original")?.unwrap_or_default(),
                    product_name: attribute(e, b"product-name")?.unwrap_or_default(),
                    date: attribute(e, b"date")?.filter(|date| !date.is_empty()),
                    units: Vec::new(),
                });
            }
            b"trans-unit" => {
                let id = attribute(e, b"id")?
                    .ok_or_else(|| Error::malformed("trans-unit missing 'id'"))?;
                self.unit = Some(PendingUnit {
                    id,
                    ..PendingUnit::default()
                });
                self.depth = 0;
                if empty {
                    self.finish_unit()?;
                }
                return Ok(());
            }
            // Only direct children count; `alt-trans` carries its own source/target.
            name @ (b"source" | b"target")
                if in_unit && self.depth == 0 && self.field.is_none() =>
            {
                let field = if name == b"source" {
                    Field::Source
                } else {
                    Field::Target
                };
                self.field = Some(field);
                self.text.clear();
                if empty {
                    self.finish_field();
                }
            }
            _ => {}
        }
        if in_unit && !empty {
            self.depth += 1;
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) -> Result<(), Error> {
        if self.unit.is_none() {
            return Ok(());
        }
        if self.depth == 0 {
            if name == b"trans-unit" {
                self.finish_unit()?;
            }
            return Ok(());
        }
        self.depth -= 1;
        if self.depth == 0 && self.capturing() && matches!(name, b"source" | b"target") {
            self.finish_field();
        }
        Ok(())
    }

    fn finish_field(&mut self) {
        let text = std::mem::take(&mut self.text);
        if let (Some(unit), Some(field)) = (self.unit.as_mut(), self.field.take()) {
            match field {
                Field::Source => unit.source = Some(text),
                Field::Target => unit.target = Some(text),
            }
        }
    }

    fn finish_unit(&mut self) -> Result<(), Error> {
        let Some(unit) = self.unit.take() else {
            return Ok(());
        };
        let file = self
            .files
            .last_mut()
            .ok_or_else(|| Error::malformed("trans-unit outside of a <file> element"))?;
        match unit.target {
            Some(target) => file.units.push(TranslationUnit {
                id: unit.id,
                source: unit.source.unwrap_or_default(),
                target,
            }),
            None => tracing::debug!(id = unit.id.as_str(), "untranslated unit skipped"),
        }
        Ok(())
    }

    fn finish(self) -> Result<XliffDocument, Error> {
        if self.unit.is_some() {
            return Err(Error::malformed("unexpected EOF inside trans-unit"));
        }
        let version = self
            .version
            .ok_or_else(|| Error::malformed("missing <xliff> root element"))?;
        if self.files.is_empty() {
            return Err(Error::malformed("xliff document has no <file> element"));
        }
        Ok(XliffDocument {
            version,
            files: self.files,
        })
    }
}

fn attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>, Error> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::malformed(e.to_string()))?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}
