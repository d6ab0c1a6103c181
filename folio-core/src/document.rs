use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Component, Path};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DateParseError, ParseError, ParseErrorKind, PipelineError};
use crate::frontmatter::{self, Table};
use crate::slug::slugify;

/// Where a document came from: its path relative to the content root,
/// always with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into().replace('\\', "/");
        let trimmed = path.trim_start_matches("./");
        Self(trimmed.to_string())
    }

    /// Identity of `path` relative to `root`.
    pub fn from_path(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        (!parts.is_empty()).then(|| Self(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Identity::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub identity: Identity,
    pub title: String,
    pub date: NaiveDate,
    pub tags: BTreeSet<String>,
    pub draft: bool,
    pub series: Option<String>,
    pub summary: Option<String>,
    /// Front-matter keys folio does not interpret, kept as written.
    pub extra: BTreeMap<String, Value>,
    pub body: String,
}

impl Document {
    /// Parse a raw source (front matter + body) into a document.
    pub fn parse(identity: Identity, source: &str) -> Result<Self, ParseError> {
        let fail = |kind: ParseErrorKind| ParseError::new(identity.clone(), kind);

        let split = frontmatter::split(source).map_err(fail)?;
        let mut table = frontmatter::decode(split.format, split.block).map_err(fail)?;

        let title = take_title(&mut table).map_err(fail)?;
        let date = take_date(&mut table).map_err(fail)?;
        let tags = take_tags(&mut table).map_err(fail)?;
        let draft = take_draft(&mut table).map_err(fail)?;
        let series = take_optional_string(&mut table, "series").map_err(fail)?;
        let summary = take_optional_string(&mut table, "summary").map_err(fail)?;

        Ok(Document {
            identity,
            title,
            date,
            tags,
            draft,
            series,
            summary,
            extra: table,
            body: split.body.to_string(),
        })
    }

    /// Render the document back to source form with YAML front matter.
    pub fn to_source(&self) -> Result<String, PipelineError> {
        let front_matter = FrontMatterOut {
            title: &self.title,
            date: self.date.format("%Y-%m-%d").to_string(),
            tags: &self.tags,
            draft: self.draft,
            series: self.series.as_deref(),
            summary: self.summary.as_deref(),
            extra: &self.extra,
        };

        let block = frontmatter::encode_yaml(&front_matter).map_err(|e| {
            PipelineError::Parse(ParseError::new(self.identity.clone(), e.into()))
        })?;
        Ok(format!("{block}{}", self.body))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Newest first; same-day documents by identity so the order is total.
pub fn newest_first(a: &Document, b: &Document) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| a.identity.cmp(&b.identity))
}

#[derive(Serialize)]
struct FrontMatterOut<'a> {
    title: &'a str,
    date: String,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    tags: &'a BTreeSet<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    draft: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    series: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    #[serde(flatten)]
    extra: &'a BTreeMap<String, Value>,
}

fn take_title(table: &mut Table) -> Result<String, ParseErrorKind> {
    match table.remove("title") {
        None | Some(Value::Null) => Err(ParseErrorKind::MissingField("title")),
        Some(Value::String(title)) => {
            let title = title.trim();
            if title.is_empty() {
                Err(ParseErrorKind::EmptyField("title"))
            } else {
                Ok(title.to_string())
            }
        }
        Some(other) => Err(ParseErrorKind::MalformedField {
            field: "title",
            reason: format!("expected a string, found {other}"),
        }),
    }
}

fn take_date(table: &mut Table) -> Result<NaiveDate, ParseErrorKind> {
    match table.remove("date") {
        None | Some(Value::Null) => Err(ParseErrorKind::MissingField("date")),
        Some(Value::String(value)) => Ok(parse_date(&value)?),
        Some(other) => Err(DateParseError {
            value: other.to_string(),
        }
        .into()),
    }
}

/// Parse an ISO-8601 date, or a timestamp reduced to its calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, DateParseError> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime.date());
        }
    }

    Err(DateParseError {
        value: value.to_string(),
    })
}

fn take_tags(table: &mut Table) -> Result<BTreeSet<String>, ParseErrorKind> {
    let malformed = |reason: &str| ParseErrorKind::MalformedField {
        field: "tags",
        reason: reason.to_string(),
    };

    match table.remove("tags") {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(tag) if tag.trim().is_empty() => {
                    Err(malformed("tags must not be empty strings"))
                }
                Value::String(tag) if slugify(&tag).is_empty() => Err(malformed(&format!(
                    "tag `{tag}` has no letters or digits to build a URL from"
                ))),
                Value::String(tag) => Ok(tag.trim().to_string()),
                _ => Err(malformed("every tag must be a string")),
            })
            .collect(),
        Some(_) => Err(malformed("expected a list of strings")),
    }
}

fn take_draft(table: &mut Table) -> Result<bool, ParseErrorKind> {
    match table.remove("draft") {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(draft)) => Ok(draft),
        Some(other) => Err(ParseErrorKind::MalformedField {
            field: "draft",
            reason: format!("expected true or false, found {other}"),
        }),
    }
}

fn take_optional_string(
    table: &mut Table,
    field: &'static str,
) -> Result<Option<String>, ParseErrorKind> {
    match table.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => {
            let value = value.trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
        Some(other) => Err(ParseErrorKind::MalformedField {
            field,
            reason: format!("expected a string, found {other}"),
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal published document for tests in other modules.
    pub(crate) fn doc(identity: &str, date: &str) -> Document {
        Document {
            identity: Identity::new(identity),
            title: identity.to_string(),
            date: parse_date(date).unwrap(),
            tags: BTreeSet::new(),
            draft: false,
            series: None,
            summary: None,
            extra: BTreeMap::new(),
            body: String::new(),
        }
    }

    pub(crate) fn tagged(identity: &str, date: &str, tags: &[&str]) -> Document {
        Document {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..doc(identity, date)
        }
    }

    fn parse(source: &str) -> Result<Document, ParseError> {
        Document::parse(Identity::new("posts/post.md"), source)
    }

    #[test]
    fn test_parse_full_document() {
        let source = r#"---
title: "EF Core Triggers"
date: 2021-04-23
tags:
  - efcore
  - dotnet
draft: true
series: EF Core
author: koen
---
Some *markdown* body.
"#;
        let doc = parse(source).unwrap();
        assert_eq!(doc.title, "EF Core Triggers");
        assert_eq!(doc.date, NaiveDate::from_ymd_opt(2021, 4, 23).unwrap());
        assert!(doc.has_tag("efcore") && doc.has_tag("dotnet"));
        assert!(doc.draft);
        assert_eq!(doc.series.as_deref(), Some("EF Core"));
        assert_eq!(doc.extra["author"], Value::String("koen".into()));
        assert_eq!(doc.body, "Some *markdown* body.\n");
    }

    #[test]
    fn test_optional_fields_default() {
        let doc = parse("---\ntitle: Hi\ndate: 2021-04-22\n---\n").unwrap();
        assert!(doc.tags.is_empty());
        assert!(!doc.draft);
        assert!(doc.extra.is_empty());
    }

    #[test]
    fn test_toml_front_matter() {
        let source = "+++\ntitle = \"Projectables\"\ndate = 2021-05-03\ntags = [\"efcore\"]\n+++\nbody";
        let doc = parse(source).unwrap();
        assert_eq!(doc.title, "Projectables");
        assert_eq!(doc.date, NaiveDate::from_ymd_opt(2021, 5, 3).unwrap());
        assert!(doc.has_tag("efcore"));
    }

    #[test]
    fn test_missing_title_names_title() {
        let err = parse("---\ndate: 2021-04-22\n---\nbody").unwrap_err();
        assert_eq!(err.field(), Some("title"));
        assert!(matches!(err.kind, ParseErrorKind::MissingField("title")));
        assert_eq!(err.identity.as_str(), "posts/post.md");
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let err = parse("---\ntitle: \"   \"\ndate: 2021-04-22\n---\n").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::EmptyField("title")));
    }

    #[test]
    fn test_missing_date() {
        let err = parse("---\ntitle: Hi\n---\n").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MissingField("date")));
    }

    #[test]
    fn test_bad_date_is_a_date_error() {
        let err = parse("---\ntitle: Hi\ndate: 2021-02-30\n---\n").unwrap_err();
        assert!(err.is_date_error());
        assert_eq!(err.field(), Some("date"));

        let err = parse("---\ntitle: Hi\ndate: 20210222\n---\n").unwrap_err();
        assert!(err.is_date_error());
    }

    #[test]
    fn test_timestamps_reduce_to_dates() {
        let expected = NaiveDate::from_ymd_opt(2021, 4, 22).unwrap();
        assert_eq!(parse_date("2021-04-22T10:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_date("2021-04-22T10:30:00Z").unwrap(), expected);
        assert_eq!(parse_date("2021-04-22 10:30:00").unwrap(), expected);
        assert_eq!(parse_date("2021-04-22T10:30:00").unwrap(), expected);
    }

    #[test]
    fn test_tags_must_be_a_list_of_strings() {
        let err = parse("---\ntitle: Hi\ndate: 2021-04-22\ntags: efcore\n---\n").unwrap_err();
        assert_eq!(err.field(), Some("tags"));

        let err = parse("---\ntitle: Hi\ndate: 2021-04-22\ntags: [1, 2]\n---\n").unwrap_err();
        assert_eq!(err.field(), Some("tags"));

        let err = parse("---\ntitle: Hi\ndate: 2021-04-22\ntags: [\"\"]\n---\n").unwrap_err();
        assert_eq!(err.field(), Some("tags"));
    }

    #[test]
    fn test_punctuation_only_tag_is_rejected() {
        let err = parse("---\ntitle: Hi\ndate: 2021-04-22\ntags: [dotnet, \"#\"]\n---\n").unwrap_err();
        assert_eq!(err.field(), Some("tags"));
        assert!(err.to_string().contains("`#`"));

        let doc = parse("---\ntitle: Hi\ndate: 2021-04-22\ntags: [\"C#\"]\n---\n").unwrap();
        assert!(doc.has_tag("C#"));
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let doc = parse("---\ntitle: Hi\ndate: 2021-04-22\ntags: [a, a, \" a \"]\n---\n").unwrap();
        assert_eq!(doc.tags.len(), 1);
    }

    #[test]
    fn test_draft_must_be_boolean() {
        let err = parse("---\ntitle: Hi\ndate: 2021-04-22\ndraft: maybe\n---\n").unwrap_err();
        assert_eq!(err.field(), Some("draft"));
    }

    #[test]
    fn test_round_trip() {
        let source = r#"---
title: "true"
date: 2021-04-22
tags: [di, "C#"]
draft: true
summary: "Line one\n---\nline three"
weight: 3
cover: { src: a.png, alt: null }
---
# ActivatorUtilities

Body with --- inside.
"#;
        let doc = parse(source).unwrap();
        let again = Document::parse(doc.identity.clone(), &doc.to_source().unwrap()).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn test_round_trip_minimal() {
        let doc = doc("posts/a.md", "2021-04-22");
        let again = Document::parse(doc.identity.clone(), &doc.to_source().unwrap()).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn test_identity_normalizes_separators() {
        assert_eq!(Identity::new(".\\posts\\a.md").as_str(), "posts/a.md");
        let id = Identity::from_path(Path::new("/site"), Path::new("/site/posts/a/index.md"));
        assert_eq!(id.unwrap().as_str(), "posts/a/index.md");
        assert_eq!(Identity::from_path(Path::new("/site"), Path::new("/other/a.md")), None);
    }

    #[test]
    fn test_newest_first_breaks_ties_by_identity() {
        let a = doc("b.md", "2021-04-22");
        let b = doc("a.md", "2021-04-22");
        let c = doc("c.md", "2021-05-03");
        let mut docs = vec![a, b, c];
        docs.sort_by(newest_first);
        let ids: Vec<_> = docs.iter().map(|d| d.identity.as_str()).collect();
        assert_eq!(ids, ["c.md", "a.md", "b.md"]);
    }
}
