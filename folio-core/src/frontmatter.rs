//! Splitting a source file into its front-matter block and body, and
//! decoding the block into a neutral key/value table.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ParseErrorKind;

pub type Table = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `---` delimited YAML
    Yaml,
    /// `+++` delimited TOML
    Toml,
}

impl Format {
    pub fn delimiter(self) -> &'static str {
        match self {
            Format::Yaml => "---",
            Format::Toml => "+++",
        }
    }

    fn from_line(line: &str) -> Option<Self> {
        match line.trim_end() {
            "---" => Some(Format::Yaml),
            "+++" => Some(Format::Toml),
            _ => None,
        }
    }
}

/// A source file cut at its front-matter delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub format: Format,
    pub block: &'a str,
    pub body: &'a str,
}

/// Cut `source` into front matter and body.
///
/// The first line must be a delimiter. The block runs until the next line
/// that is exactly the same delimiter; the body is everything after that
/// line, untouched.
pub fn split(source: &str) -> Result<Split<'_>, ParseErrorKind> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let mut lines = source.split_inclusive('\n');
    let opening = lines.next().ok_or(ParseErrorKind::MissingFrontMatter)?;
    let format = Format::from_line(opening).ok_or(ParseErrorKind::MissingFrontMatter)?;

    let block_start = opening.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim_end() == format.delimiter() {
            return Ok(Split {
                format,
                block: &source[block_start..offset],
                body: &source[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(ParseErrorKind::UnterminatedFrontMatter(format.delimiter()))
}

/// Decode a front-matter block into a table. An empty block is an empty table.
pub fn decode(format: Format, block: &str) -> Result<Table, ParseErrorKind> {
    if block.trim().is_empty() {
        return Ok(Table::new());
    }

    match format {
        Format::Yaml => match serde_yaml::from_str::<Value>(block)? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            Value::Null => Ok(Table::new()),
            _ => Err(ParseErrorKind::NotATable),
        },
        Format::Toml => {
            let table: toml::Table = toml::from_str(block)?;
            Ok(table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect())
        }
    }
}

/// Encode a table as a YAML front-matter block, delimiters included.
pub fn encode_yaml<T: serde::Serialize>(front_matter: &T) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(front_matter)?;
    Ok(format!("---\n{yaml}---\n"))
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        // Dates travel as their TOML text, which is ISO-8601.
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}
