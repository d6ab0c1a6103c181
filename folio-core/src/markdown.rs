use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::document::Document;
use crate::slug::slugify;

const EXCERPT_CHARS: usize = 280;
const WORDS_PER_MINUTE: usize = 200;

/// What the rendering layer needs to know about a body without rendering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub excerpt: String,
    pub word_count: usize,
    pub reading_minutes: usize,
    pub outline: Vec<Heading>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u32,
    pub text: String,
    pub anchor: String,
}

pub fn digest(document: &Document) -> Digest {
    digest_markdown(&document.body, document.summary.as_deref())
}

pub fn digest_markdown(body: &str, summary: Option<&str>) -> Digest {
    let parser = Parser::new_ext(body, Options::all());

    let mut word_count = 0;
    let mut outline = Vec::new();
    let mut first_paragraph: Option<String> = None;

    let mut heading: Option<(u32, String)> = None;
    let mut paragraph: Option<String> = None;
    let mut in_code_block = false;

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((level as u32, String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = heading.take() {
                    let text = text.trim().to_string();
                    // The only H1 should be the page title.
                    if level >= 2 && !text.is_empty() {
                        outline.push(Heading {
                            level,
                            anchor: slugify(&text),
                            text,
                        });
                    }
                }
            }
            Event::Start(Tag::Paragraph) if first_paragraph.is_none() => {
                paragraph = Some(String::new());
            }
            Event::End(TagEnd::Paragraph) => {
                if let Some(text) = paragraph.take() {
                    let text = collapse_whitespace(&text);
                    if !text.is_empty() {
                        first_paragraph = Some(text);
                    }
                }
            }
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) | Event::Code(text) => {
                if in_code_block {
                    continue;
                }
                word_count += text.split_whitespace().count();
                if let Some((_, buf)) = heading.as_mut() {
                    buf.push_str(&text);
                }
                if let Some(buf) = paragraph.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(buf) = paragraph.as_mut() {
                    buf.push(' ');
                }
            }
            _ => continue,
        }
    }

    let excerpt = match summary {
        Some(summary) => summary.to_string(),
        None => truncate_words(&first_paragraph.unwrap_or_default(), EXCERPT_CHARS),
    };

    Digest {
        excerpt,
        word_count,
        reading_minutes: word_count.div_ceil(WORDS_PER_MINUTE).max(1),
        outline,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max` characters on a word boundary, marking the cut.
fn truncate_words(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let cut: String = text.chars().take(max).collect();
    let kept = match cut.rfind(char::is_whitespace) {
        Some(end) => &cut[..end],
        None => cut.as_str(),
    };
    format!("{}…", kept.trim_end())
}
