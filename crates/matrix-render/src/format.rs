//! Description formatting
//!
//! Corpus texts are loosely structured prose. Formatting drops embedded
//! `=== N АРКАН ... ===` banners, splits paragraphs on blank lines and picks
//! out `Heading: body` lead-ins that start with a number or an emoji.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static BANNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*={2,}.*АРКАН.*={2,}\s*$").expect("banner pattern compiles"));

static LEAD_IN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^([🔥💰🌟🛑🚀💼💎📱🎨🗣⚠🏁🎯🌊❄🔗❤🌫🤱👶👑💔🛠📢👹🤝🕸🎭\x{FE0F}\d]+\.?\s*[^:\n]+?):\s*(.*)$",
    )
    .expect("lead-in pattern compiles")
});

/// One paragraph, optionally with a bold lead-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    /// Lead-in before the colon
    pub heading: Option<String>,
    /// Paragraph text; single line breaks preserved
    pub body: String,
}

/// Formatted description ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedText {
    /// Arcana title shown first
    pub title: String,
    /// Body paragraphs
    pub paragraphs: Vec<Paragraph>,
}

/// Title used when the corpus has none
#[must_use]
pub fn fallback_title(arcana: u32) -> String {
    format!("Аркан {arcana}")
}

/// Format raw corpus text under `title`
#[must_use]
pub fn format_description(text: &str, title: &str) -> FormattedText {
    let cleaned: Vec<&str> = text.lines().filter(|line| !BANNER.is_match(line)).collect();

    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in cleaned.into_iter().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(split_lead_in(&current.join("\n")));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }

    FormattedText {
        title: title.to_string(),
        paragraphs,
    }
}

fn split_lead_in(paragraph: &str) -> Paragraph {
    let paragraph = paragraph.trim();
    match LEAD_IN.captures(paragraph) {
        Some(caps) => Paragraph {
            heading: Some(caps[1].trim().to_string()),
            body: caps[2].trim().to_string(),
        },
        None => Paragraph {
            heading: None,
            body: paragraph.to_string(),
        },
    }
}

impl fmt::Display for FormattedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        for p in &self.paragraphs {
            f.write_str("\n\n")?;
            match &p.heading {
                Some(heading) => write!(f, "{heading}: {}", p.body)?,
                None => f.write_str(&p.body)?,
            }
        }
        Ok(())
    }
}
