//! Text templates for rendering an [`XliffDocument`] as XML.
//!
//! Syntax: `{{name}}` inserts an XML-escaped file attribute (`version`,
//! `source_language`, `target_language`, `datatype`, `original`,
//! `product_name`, `date`), and `{{#units}}...{{/units}}` repeats its body for
//! every trans-unit, where `{{id}}`, `{{source}}` and `{{target}}` are available.
//! Templates are checked when parsed, so rendering only fails for documents
//! without a `<file>`.

use std::str::FromStr;

use lazy_static::lazy_static;
use quick_xml::escape::partial_escape;

use crate::{error::Error, units::TranslationUnit, xliff::XliffDocument, xliff::XliffFile};

/// The XLIFF skeleton used when no template override is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!("xliff_template.xml");

const UNITS_BLOCK: &str = "units";

lazy_static! {
    static ref BUILTIN_TEMPLATE: Template = Template::parse(DEFAULT_TEMPLATE).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileField {
    Version,
    SourceLanguage,
    TargetLanguage,
    Datatype,
    Original,
    ProductName,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitField {
    Id,
    Source,
    Target,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Literal(String),
    File(FileField),
    Unit(UnitField),
    Units(Vec<Node>),
}

/// A parsed, validated template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Returns the built-in XLIFF 1.0 template.
    pub fn builtin() -> &'static Template {
        &BUILTIN_TEMPLATE
    }

    /// Parses template text, rejecting unknown placeholders and unbalanced blocks.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut nodes = Vec::new();
        let mut block: Option<Vec<Node>> = None;
        let mut rest = text;

        while let Some(open) = rest.find("{{") {
            let literal = &rest[..open];
            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or_else(|| Error::Template("unterminated `{{` placeholder".to_string()))?;
            let tag = after_open[..close].trim();
            rest = &after_open[close + 2..];

            let in_block = block.is_some();
            let target = block.as_mut().unwrap_or(&mut nodes);
            if !literal.is_empty() {
                target.push(Node::Literal(literal.to_string()));
            }

            if let Some(name) = tag.strip_prefix('#') {
                if name.trim() != UNITS_BLOCK {
                    return Err(Error::Template(format!("unknown block `{}`", name.trim())));
                }
                if in_block {
                    return Err(Error::Template("`units` blocks cannot nest".to_string()));
                }
                block = Some(Vec::new());
            } else if let Some(name) = tag.strip_prefix('/') {
                if name.trim() != UNITS_BLOCK {
                    return Err(Error::Template(format!("unknown block `{}`", name.trim())));
                }
                let body = block
                    .take()
                    .ok_or_else(|| {
                        Error::Template("`{{/units}}` without opening block".to_string())
                    })?;
                nodes.push(Node::Units(body));
            } else {
                let node = placeholder(tag)?;
                if matches!(node, Node::Unit(_)) && !in_block {
                    return Err(Error::Template(format!(
                        "`{tag}` is only available inside a units block"
                    )));
                }
                target.push(node);
            }
        }

        if block.is_some() {
            return Err(Error::Template("unclosed `{{#units}}` block".to_string()));
        }
        if !rest.is_empty() {
            nodes.push(Node::Literal(rest.to_string()));
        }
        Ok(Template { nodes })
    }

    /// Renders the first `<file>` of `document`.
    pub fn render(&self, document: &XliffDocument) -> Result<String, Error> {
        let file = document.first_file()?;
        let mut out = String::new();
        render_nodes(&self.nodes, document, file, None, &mut out);
        Ok(out)
    }
}

impl FromStr for Template {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::parse(s)
    }
}

fn placeholder(tag: &str) -> Result<Node, Error> {
    let node = match tag {
        "version" => Node::File(FileField::Version),
        "source_language" => Node::File(FileField::SourceLanguage),
        "target_language" => Node::File(FileField::TargetLanguage),
        "datatype" => Node::File(FileField::Datatype),
        "original" => Node::File(FileField::Original),
        "product_name" => Node::File(FileField::ProductName),
        "date" => Node::File(FileField::Date),
        "id" => Node::Unit(UnitField::Id),
        "source" => Node::Unit(UnitField::Source),
        "target" => Node::Unit(UnitField::Target),
        other => return Err(Error::Template(format!("unknown placeholder `{other}`"))),
    };
    Ok(node)
}

fn render_nodes(
    nodes: &[Node],
    document: &XliffDocument,
    file: &XliffFile,
    unit: Option<&TranslationUnit>,
    out: &mut String,
) {
    for node in nodes {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::File(field) => {
                let value = match field {
                    FileField::Version => document.version.as_str(),
                    FileField::SourceLanguage => file.source_language.as_str(),
                    FileField::TargetLanguage => file.target_language.as_str(),
                    FileField::Datatype => file.datatype.as_str(),
                    FileField::Original => file.original.as_str(),
                    FileField::ProductName => file.product_name.as_str(),
                    FileField::Date => file.date.as_deref().unwrap_or_default(),
                };
                out.push_str(&partial_escape(value));
            }
            Node::Unit(field) => {
                if let Some(unit) = unit {
                    let value = match field {
                        UnitField::Id => unit.id.as_str(),
                        UnitField::Source => unit.source.as_str(),
                        UnitField::Target => unit.target.as_str(),
                    };
                    out.push_str(&partial_escape(value));
                }
            }
            Node::Units(body) => {
                for unit in &file.units {
                    render_nodes(body, document, file, Some(unit), out);
                }
            }
        }
    }
}
